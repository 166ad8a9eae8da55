use colored::Colorize;

use crate::wire::{Feasibility, GeneratedProject, GenerationResult};

fn feasibility_badge(f: Feasibility) -> colored::ColoredString {
    let label = format!("[{f} feasibility]");
    match f {
        Feasibility::High => label.green().bold(),
        Feasibility::Medium => label.yellow().bold(),
        Feasibility::Low => label.red().bold(),
    }
}

/// Render one project as a text card.
pub fn project_card(p: &GeneratedProject) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}  {}  {}\n",
        p.title.bold(),
        format!("({})", p.difficulty).cyan(),
        feasibility_badge(p.feasibility),
        format!("confidence {}", p.confidence).dimmed()
    ));
    out.push_str(&format!("{}\n", p.description));
    out.push_str(&format!("{} {}\n", "Why:".bold(), p.reasoning));

    if !p.features.is_empty() {
        out.push_str(&format!("{}\n", "Features".bold()));
        for f in &p.features {
            out.push_str(&format!("  • {f}\n"));
        }
    }

    out.push_str(&format!(
        "{} {}",
        "Stack:".bold(),
        p.tech_stack.primary.join(", ").green()
    ));
    if !p.tech_stack.alternative.is_empty() {
        out.push_str(&format!("  (alt: {})", p.tech_stack.alternative.join(", ")));
    }
    out.push('\n');

    if !p.roadmap.is_empty() {
        out.push_str(&format!("{}\n", "Roadmap".bold()));
        for phase in &p.roadmap {
            out.push_str(&format!("  {}. {}", phase.phase, phase.title));
            if let Some(d) = &phase.duration {
                out.push_str(&format!(" {}", format!("[{d}]").dimmed()));
            }
            out.push('\n');
            if let Some(desc) = &phase.description {
                out.push_str(&format!("     {desc}\n"));
            }
        }
    }

    if !p.skill_outcomes.is_empty() {
        out.push_str(&format!("{} {}\n", "You'll learn:".bold(), p.skill_outcomes.join(", ")));
    }
    out
}

pub fn show_result(result: &GenerationResult) {
    let projects = result.projects();
    let heading = match result {
        GenerationResult::Suggestions(_) => format!("=== {} IDEAS ===", projects.len()),
        GenerationResult::Blueprint(_) => "=== BLUEPRINT ===".to_string(),
    };
    println!("\n{}\n", heading.bold());
    for (i, p) in projects.iter().enumerate() {
        if projects.len() > 1 {
            println!("{}", format!("#{}", i + 1).magenta().bold());
        }
        println!("{}", project_card(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{RoadmapPhase, TechStack};

    #[test]
    fn card_lists_every_section() {
        colored::control::set_override(false);
        let p = GeneratedProject {
            title: "Habit Tracker".into(),
            difficulty: "Beginner".into(),
            description: "Track habits.".into(),
            reasoning: "Small scope.".into(),
            features: vec!["Streaks".into()],
            tech_stack: TechStack { primary: vec!["Rust".into()], alternative: vec!["Go".into()] },
            roadmap: vec![RoadmapPhase {
                phase: "Phase 1".into(),
                title: "Planning".into(),
                description: Some("Sketch the data model".into()),
                duration: Some("2 days".into()),
            }],
            skill_outcomes: vec!["Persistence".into()],
            feasibility: Feasibility::Low,
            confidence: "70%".into(),
        };
        let card = project_card(&p);
        assert!(card.contains("Habit Tracker  (Beginner)  [Low feasibility]  confidence 70%"));
        assert!(card.contains("  • Streaks"));
        assert!(card.contains("Stack: Rust  (alt: Go)"));
        assert!(card.contains("  Phase 1. Planning [2 days]"));
        assert!(card.contains("     Sketch the data model"));
        assert!(card.contains("You'll learn: Persistence"));
    }
}
