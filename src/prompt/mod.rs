use serde_json::{json, Value};

use crate::wire::{GenerateRequest, Mode, SkillLevel, UserInputs};

pub const DEFAULT_SKILL: SkillLevel = SkillLevel::Intermediate;
pub const DEFAULT_DOMAIN: &str = "General Web Development";
pub const DEFAULT_TIME: &str = "Flexible";
pub const DEFAULT_GOAL: &str = "Build a portfolio piece";
pub const DEFAULT_TECH: &str = "Modern Stack";
pub const DEFAULT_DEPLOYMENT: &str = "Standard";
pub const DEFAULT_ARCHITECTURE: &str = "Any";
pub const DEFAULT_SCALABILITY: &str = "Not a concern";
pub const DEFAULT_CONSTRAINTS: &str = "None";
pub const DEFAULT_STRETCH: &str = "None";
pub const DEFAULT_TEAM: &str = "Solo";
pub const DEFAULT_TITLE: &str = "Custom Project";

/// System + user instruction pair handed to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// `json_object` must match whether the upstream is held to `response_format: json_object`,
/// since that mode cannot return a bare array.
pub fn build(req: &GenerateRequest, json_object: bool) -> PromptPair {
    let user = match req.mode {
        Mode::Suggestions => user_prompt_suggestions(&req.inputs, json_object),
        Mode::Blueprint => user_prompt_blueprint(&req.inputs, req.selected_project_title.as_deref()),
    };
    PromptPair { system: system_prompt(), user }
}

pub fn system_prompt() -> String {
    "You are an expert senior mentor for developers. Return ONLY valid JSON \
     (no markdown, no prose, no code fences)."
        .to_string()
}

/// Profile values with every gap filled.
struct Profile<'a> {
    skill: SkillLevel,
    domain: String,
    goal: &'a str,
    time: &'a str,
    tech: String,
    deployment: &'a str,
    architecture: &'a str,
    scalability: &'a str,
    constraints: &'a str,
    stretch: &'a str,
    team: &'a str,
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn joined(v: &Option<Vec<String>>) -> Option<String> {
    let items: Vec<&str> = v
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    (!items.is_empty()).then(|| items.join(", "))
}

impl<'a> Profile<'a> {
    fn from_inputs(i: &'a UserInputs) -> Self {
        Self {
            skill: i.skill_level.unwrap_or(DEFAULT_SKILL),
            domain: present(&i.domain)
                .map(str::to_string)
                .or_else(|| joined(&i.interests))
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            goal: present(&i.learning_goal).unwrap_or(DEFAULT_GOAL),
            time: present(&i.time_availability)
                .or_else(|| present(&i.time_commitment))
                .unwrap_or(DEFAULT_TIME),
            tech: joined(&i.technologies).unwrap_or_else(|| DEFAULT_TECH.to_string()),
            deployment: present(&i.deployment).unwrap_or(DEFAULT_DEPLOYMENT),
            architecture: present(&i.architecture).unwrap_or(DEFAULT_ARCHITECTURE),
            scalability: present(&i.scalability).unwrap_or(DEFAULT_SCALABILITY),
            constraints: present(&i.constraints).unwrap_or(DEFAULT_CONSTRAINTS),
            stretch: present(&i.difficulty_stretch).unwrap_or(DEFAULT_STRETCH),
            team: present(&i.team_size).unwrap_or(DEFAULT_TEAM),
        }
    }

    fn lines(&self) -> String {
        format!(
"Skill Level: {skill}
Preferred Domain: {domain}
Time Available: {time}
Learning Goals: {goal}
Preferred Tech: {tech}
Deployment: {deployment}
Architecture: {architecture}
Scalability: {scalability}
Constraints: {constraints}
Difficulty Stretch: {stretch}
Team Size: {team}",
            skill = self.skill,
            domain = self.domain,
            time = self.time,
            goal = self.goal,
            tech = self.tech,
            deployment = self.deployment,
            architecture = self.architecture,
            scalability = self.scalability,
            constraints = self.constraints,
            stretch = self.stretch,
            team = self.team,
        )
    }
}

/// Shape example for suggestions mode: an array holding one compact idea.
pub fn suggestions_example(inputs: &UserInputs) -> Value {
    let skill = inputs.skill_level.unwrap_or(DEFAULT_SKILL).to_string();
    json!([
        {
            "title": "Project Title",
            "difficulty": skill,
            "description": "2-3 sentences exciting description",
            "reasoning": "A single sentence explaining why this is a good match.",
            "features": ["Feature 1 teaser", "Feature 2 teaser", "Feature 3 teaser"],
            "techStack": { "primary": ["Main Tech"], "alternative": ["Alt Tech"] },
            "roadmap": [
                { "phase": "1", "title": "Phase 1" },
                { "phase": "2", "title": "Phase 2" },
                { "phase": "3", "title": "Phase 3" }
            ],
            "skillOutcomes": ["Outcome 1", "Outcome 2"],
            "feasibility": "High",
            "confidence": "95%"
        }
    ])
}

/// Shape example for blueprint mode: one fully detailed object.
pub fn blueprint_example(inputs: &UserInputs, title: Option<&str>) -> Value {
    let skill = inputs.skill_level.unwrap_or(DEFAULT_SKILL).to_string();
    json!({
        "title": blueprint_title(title),
        "difficulty": skill,
        "description": "Detailed description...",
        "reasoning": "Deep explanation of matches...",
        "features": ["Feature 1", "Feature 2", "Feature 3", "Feature 4", "Feature 5"],
        "techStack": {
            "primary": ["Tech 1", "Tech 2"],
            "alternative": ["Alt 1", "Alt 2"]
        },
        "roadmap": [
            { "phase": "Phase 1", "title": "Planning", "description": "...", "duration": "2 days" },
            { "phase": "Phase 2", "title": "Foundation", "description": "...", "duration": "1 week" }
        ],
        "skillOutcomes": ["Outcome 1", "Outcome 2"],
        "feasibility": "High",
        "confidence": "95%"
    })
}

fn blueprint_title(title: Option<&str>) -> &str {
    title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TITLE)
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_default()
}

pub fn user_prompt_suggestions(inputs: &UserInputs, json_object: bool) -> String {
    let profile = Profile::from_inputs(inputs);
    let ideas = suggestions_example(inputs);
    let (container, example) = if json_object {
        (
            "The JSON must be an object with a single key \"projects\" holding an ARRAY of exactly two objects, \
             matching this structure:",
            json!({ "projects": ideas }),
        )
    } else {
        (
            "The JSON must be an ARRAY of exactly two objects matching this structure. \
             Do not wrap the array in another object:",
            ideas,
        )
    };
    format!(
"Generate exactly TWO (2) unique, exciting, and practical coding project ideas based on this user profile:

{lines}

{container}
{example}

Every \"difficulty\" must be \"{skill}\". \"feasibility\" is one of High, Medium, Low.",
        lines = profile.lines(),
        example = pretty(&example),
        skill = profile.skill,
    )
}

pub fn user_prompt_blueprint(inputs: &UserInputs, title: Option<&str>) -> String {
    let profile = Profile::from_inputs(inputs);
    format!(
"Generate a FULL DETAILED implementation blueprint for the project titled \"{title}\" based on this user context:

{lines}

Provide a highly detailed 4-5 phase roadmap (every phase with a description and a duration), 5-8 core features, and specific skill outcomes.

The JSON must be a single object matching this structure exactly:
{example}",
        title = blueprint_title(title),
        lines = profile.lines(),
        example = pretty(&blueprint_example(inputs, title)),
    )
}
