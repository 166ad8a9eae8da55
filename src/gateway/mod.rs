use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{GatewayError, GatewayResult};
use crate::normalize;
use crate::prompt;
use crate::provider::{ChatRequest, DynProvider};
use crate::wire::{GenerateRequest, GenerationResult};

/// Model parameters applied to every completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
    /// Used in error messages when the secret is missing.
    pub api_key_env: String,
}

impl From<&Config> for GenerationSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            model: cfg.model().to_string(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            json_mode: cfg.json_mode,
            api_key_env: cfg.api_key_env().to_string(),
        }
    }
}

/// Prompt in, validated projects out. One upstream call per request.
pub struct Gateway {
    provider: DynProvider,
    settings: GenerationSettings,
    api_key: Option<String>,
}

impl Gateway {
    pub fn new(provider: DynProvider, settings: GenerationSettings, api_key: Option<String>) -> Self {
        Self { provider, settings, api_key }
    }

    pub fn from_config(cfg: &Config, provider: DynProvider) -> Self {
        let api_key = cfg.api_key();
        if api_key.is_none() {
            warn!("{} is not set; generation requests will fail", cfg.api_key_env());
        }
        Self::new(provider, GenerationSettings::from(cfg), api_key)
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Fails with a configuration error when no API key was provided.
    pub fn check_key(&self) -> GatewayResult<()> {
        self.key().map(|_| ())
    }

    /// The prompt pair `generate` sends for `req`.
    pub fn prompt(&self, req: &GenerateRequest) -> prompt::PromptPair {
        prompt::build(req, self.settings.json_mode)
    }

    fn key(&self) -> GatewayResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Config(format!("Missing API key ({})", self.settings.api_key_env)))
    }

    fn chat(&self, system: String, user: String) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            system,
            user,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            json_mode: self.settings.json_mode,
        }
    }

    pub async fn generate(&self, req: &GenerateRequest) -> GatewayResult<GenerationResult> {
        let key = self.key()?;
        let pair = self.prompt(req);
        debug!(mode = %req.mode, chars = pair.user.len(), "prompt built");

        info!(mode = %req.mode, provider = self.provider.name(), model = %self.settings.model, "requesting completion");
        let content = self.provider.complete(key, &self.chat(pair.system, pair.user)).await?;

        let result = normalize::normalize(req.mode, &content).map_err(|e| {
            warn!(mode = %req.mode, "unusable model output: {e}");
            e
        })?;
        info!(mode = %req.mode, projects = result.projects().len(), "generation finished");
        Ok(result)
    }

    /// Cheap round trip proving the key and endpoint work.
    pub async fn verify(&self) -> GatewayResult<String> {
        let key = self.key()?;
        let req = ChatRequest {
            max_tokens: 64,
            ..self.chat(
                "You are a helpful assistant. Return JSON.".into(),
                "Reply with the JSON object {\"status\": \"ok\"}.".into(),
            )
        };
        let content = self.provider.complete(key, &req).await?;
        normalize::parse_content(&content)?;
        Ok(content)
    }
}
