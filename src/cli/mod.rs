use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::provider::ProviderKind;
use crate::wire::{GenerateRequest, Mode, SkillLevel, Stretch, UserInputs};

#[derive(Parser, Debug)]
#[command(name = "ideazen", version, about = "Project idea generator backed by a hosted LLM")]
pub struct Args {
    /// TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (default).
    Serve(ServeArgs),
    /// Generate once and print the result.
    Generate(GenerateArgs),
    /// Check that the API key and endpoint work.
    Verify,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    #[arg(long, value_enum, default_value_t = Mode::Suggestions)]
    pub mode: Mode,

    /// Title to expand in blueprint mode.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_enum)]
    pub skill: Option<SkillLevel>,

    #[arg(long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub deployment: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub tech: Vec<String>,

    #[arg(long)]
    pub architecture: Option<String>,

    #[arg(long)]
    pub scalability: Option<String>,

    #[arg(long)]
    pub constraints: Option<String>,

    #[arg(long)]
    pub team_size: Option<String>,

    /// Shift the skill level one step before generating.
    #[arg(long, value_enum)]
    pub stretch: Option<Stretch>,

    /// Print raw JSON instead of cards.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Save request/response artifacts under DIR/<run id>/.
    #[arg(long)]
    pub save_dir: Option<PathBuf>,
}

impl Args {
    /// CLI flags win over the config file.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = self.provider {
            cfg.provider = p;
        }
        if let Some(m) = &self.model {
            cfg.model = Some(m.clone());
        }
        if let Some(t) = self.timeout_secs {
            cfg.timeout_secs = Some(t);
        }
        if let Some(Command::Serve(s)) = &self.command {
            if let Some(h) = &s.host {
                cfg.host = h.clone();
            }
            if let Some(p) = s.port {
                cfg.port = p;
            }
        }
    }
}

impl GenerateArgs {
    pub fn to_request(&self) -> GenerateRequest {
        let mut inputs = UserInputs {
            skill_level: self.skill,
            domain: self.domain.clone(),
            learning_goal: self.goal.clone(),
            time_availability: self.time.clone(),
            deployment: self.deployment.clone(),
            technologies: (!self.tech.is_empty()).then(|| self.tech.clone()),
            architecture: self.architecture.clone(),
            scalability: self.scalability.clone(),
            constraints: self.constraints.clone(),
            team_size: self.team_size.clone(),
            ..Default::default()
        };
        if let Some(dir) = self.stretch {
            inputs.stretch(dir);
            inputs.difficulty_stretch = Some(match dir {
                Stretch::Harder => "Make it more challenging than last time".into(),
                Stretch::Easier => "Make it simpler than last time".into(),
            });
        }
        GenerateRequest {
            mode: self.mode,
            selected_project_title: self.title.clone(),
            inputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_flags_build_request() {
        let args = Args::parse_from([
            "ideazen", "generate", "--skill", "beginner", "--domain", "Web Development",
            "--tech", "React,Rust", "--stretch", "harder",
        ]);
        let Some(Command::Generate(g)) = &args.command else { panic!("expected generate") };
        let req = g.to_request();
        assert_eq!(req.mode, Mode::Suggestions);
        assert_eq!(req.inputs.skill_level, Some(SkillLevel::Intermediate));
        assert_eq!(req.inputs.technologies, Some(vec!["React".to_string(), "Rust".to_string()]));
        assert!(req.inputs.difficulty_stretch.is_some());
    }

    #[test]
    fn serve_flags_override_config() {
        let args = Args::parse_from(["ideazen", "--provider", "openai", "serve", "--port", "9000"]);
        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn blueprint_mode_with_title() {
        let args = Args::parse_from(["ideazen", "generate", "--mode", "blueprint", "--title", "Habit Tracker"]);
        let Some(Command::Generate(g)) = &args.command else { panic!("expected generate") };
        let req = g.to_request();
        assert_eq!(req.mode, Mode::Blueprint);
        assert_eq!(req.selected_project_title.as_deref(), Some("Habit Tracker"));
        assert_eq!(req.inputs.technologies, None);
    }
}
