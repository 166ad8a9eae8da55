use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// ========================================
/// Gateway request/response data model
/// ========================================

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A short list of compact candidate ideas.
    #[default]
    Suggestions,
    /// One fully detailed plan for a chosen title.
    Blueprint,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Suggestions => f.write_str("suggestions"),
            Mode::Blueprint => f.write_str("blueprint"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    const LADDER: [SkillLevel; 3] = [SkillLevel::Beginner, SkillLevel::Intermediate, SkillLevel::Advanced];

    fn rank(self) -> usize {
        Self::LADDER.iter().position(|l| *l == self).unwrap_or(0)
    }

    /// One step up, saturating at Advanced.
    pub fn harder(self) -> Self {
        Self::LADDER[(self.rank() + 1).min(2)]
    }

    /// One step down, saturating at Beginner.
    pub fn easier(self) -> Self {
        Self::LADDER[self.rank().saturating_sub(1)]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

impl<'de> Deserialize<'de> for SkillLevel {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        SkillLevel::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown skill level `{raw}`")))
    }
}

/// Direction of a refinement pass over an existing profile.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stretch {
    Harder,
    Easier,
}

/// Questionnaire answers. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_stretch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    /// Legacy: older clients sent interests instead of a single domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    /// Legacy spelling of `timeAvailability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment: Option<String>,
}

impl UserInputs {
    /// Shift the skill level one step. An unset level is treated as Intermediate.
    pub fn stretch(&mut self, dir: Stretch) {
        let current = self.skill_level.unwrap_or(SkillLevel::Intermediate);
        self.skill_level = Some(match dir {
            Stretch::Harder => current.harder(),
            Stretch::Easier => current.easier(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_project_title: Option<String>,
    #[serde(flatten)]
    pub inputs: UserInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feasibility {
    High,
    Medium,
    Low,
}

impl<'de> Deserialize<'de> for Feasibility {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Feasibility::High),
            "medium" => Ok(Feasibility::Medium),
            "low" => Ok(Feasibility::Low),
            _ => Err(serde::de::Error::custom(format!("unknown feasibility `{raw}`"))),
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Feasibility::High => "High",
            Feasibility::Medium => "Medium",
            Feasibility::Low => "Low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechStack {
    pub primary: Vec<String>,
    pub alternative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    #[serde(deserialize_with = "string_or_number")]
    pub phase: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A project idea as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProject {
    pub title: String,
    pub difficulty: String,
    pub description: String,
    pub reasoning: String,
    pub features: Vec<String>,
    pub tech_stack: TechStack,
    pub roadmap: Vec<RoadmapPhase>,
    pub skill_outcomes: Vec<String>,
    pub feasibility: Feasibility,
    #[serde(deserialize_with = "string_or_number")]
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationResult {
    Suggestions(Vec<GeneratedProject>),
    Blueprint(Box<GeneratedProject>),
}

impl GenerationResult {
    pub fn projects(&self) -> Vec<&GeneratedProject> {
        match self {
            GenerationResult::Suggestions(list) => list.iter().collect(),
            GenerationResult::Blueprint(p) => vec![p.as_ref()],
        }
    }
}

// Models sometimes emit `"phase": 1` or `"confidence": 95`.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        S(String),
        I(i64),
        F(f64),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::S(s) => s,
        Raw::I(i) => i.to_string(),
        Raw::F(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_lowercase_skill_and_defaults_mode() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "skillLevel": "beginner",
            "domain": "Web Development",
            "timeAvailability": "2 weeks"
        }))
        .unwrap();
        assert_eq!(req.mode, Mode::Suggestions);
        assert_eq!(req.inputs.skill_level, Some(SkillLevel::Beginner));
        assert_eq!(req.inputs.time_availability.as_deref(), Some("2 weeks"));
    }

    #[test]
    fn request_accepts_null_skill_and_blueprint_title() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "skillLevel": null,
            "mode": "blueprint",
            "selectedProjectTitle": "Habit Tracker"
        }))
        .unwrap();
        assert_eq!(req.mode, Mode::Blueprint);
        assert_eq!(req.inputs.skill_level, None);
        assert_eq!(req.selected_project_title.as_deref(), Some("Habit Tracker"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let res = serde_json::from_value::<GenerateRequest>(json!({ "mode": "freestyle" }));
        assert!(res.is_err());
    }

    #[test]
    fn stretch_saturates_at_both_ends() {
        assert_eq!(SkillLevel::Advanced.harder(), SkillLevel::Advanced);
        assert_eq!(SkillLevel::Beginner.easier(), SkillLevel::Beginner);
        assert_eq!(SkillLevel::Beginner.harder(), SkillLevel::Intermediate);

        let mut inputs = UserInputs::default();
        inputs.stretch(Stretch::Easier);
        assert_eq!(inputs.skill_level, Some(SkillLevel::Beginner));
    }

    #[test]
    fn project_accepts_numeric_phase_and_confidence() {
        let p: GeneratedProject = serde_json::from_value(json!({
            "title": "T", "difficulty": "Beginner", "description": "d", "reasoning": "r",
            "features": ["a"], "techStack": { "primary": ["Rust"], "alternative": [] },
            "roadmap": [{ "phase": 1, "title": "Start" }],
            "skillOutcomes": [], "feasibility": "medium", "confidence": 80
        }))
        .unwrap();
        assert_eq!(p.roadmap[0].phase, "1");
        assert_eq!(p.confidence, "80");
        assert_eq!(p.feasibility, Feasibility::Medium);
    }

    #[test]
    fn optional_roadmap_fields_are_not_emitted() {
        let phase = RoadmapPhase { phase: "1".into(), title: "Start".into(), description: None, duration: None };
        assert_eq!(serde_json::to_value(&phase).unwrap(), json!({ "phase": "1", "title": "Start" }));
    }
}
