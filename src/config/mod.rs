use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::provider::ProviderKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: ProviderKind,
    /// Overrides the provider's default endpoint base.
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Name of the environment variable holding the API secret.
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
    /// Unset means the HTTP client's own default.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3001,
            provider: ProviderKind::Groq,
            base_url: None,
            model: None,
            api_key_env: None,
            temperature: 0.7,
            max_tokens: 4096,
            json_mode: true,
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let s = fs::read_to_string(p)?;
                toml::from_str(&s).with_context(|| format!("parsing {}", p.display()))
            }
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.provider.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider.default_model())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(self.provider.default_key_env())
    }

    /// Reads the secret from the process environment. Empty counts as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.api_key_env()).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Loads `.env.local` from the working directory if present. Existing
/// environment variables win.
pub fn load_dotenv() {
    match dotenv::from_filename(".env.local") {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring .env.local: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_follow_provider() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url(), "https://api.groq.com/openai/v1");
        assert_eq!(cfg.model(), "llama-3.3-70b-versatile");
        assert_eq!(cfg.api_key_env(), "GROQ_API_KEY");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3001");

        let cfg = Config { provider: ProviderKind::OpenAI, ..Config::default() };
        assert_eq!(cfg.api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
port = 8080
provider = "openai"
model = "gpt-4.1-mini"
json_mode = false
timeout_secs = 30
"#
        )
        .unwrap();
        let cfg = Config::load(Some(f.path())).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.provider, ProviderKind::OpenAI);
        assert_eq!(cfg.model(), "gpt-4.1-mini");
        assert!(!cfg.json_mode);
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(cfg.host, "127.0.0.1");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "prot = 1").unwrap();
        assert!(Config::load(Some(f.path())).is_err());
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let cfg = Config { api_key_env: Some("IDEAZEN_TEST_EMPTY_KEY".into()), ..Config::default() };
        std::env::set_var("IDEAZEN_TEST_EMPTY_KEY", "  ");
        assert_eq!(cfg.api_key(), None);
        std::env::set_var("IDEAZEN_TEST_EMPTY_KEY", "gsk_123");
        assert_eq!(cfg.api_key().as_deref(), Some("gsk_123"));
    }
}
