use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::errors::GatewayResult;

pub mod openai;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::OpenAI => "OpenAI",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::OpenAI => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Groq => "llama-3.3-70b-versatile",
            ProviderKind::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_key_env(self) -> &'static str {
        match self {
            ProviderKind::Groq => "GROQ_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// One chat-completion call: a system/user pair plus generation knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the upstream for `response_format: json_object`.
    pub json_mode: bool,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns `choices[0].message.content` verbatim.
    async fn complete(&self, api_key: &str, req: &ChatRequest) -> GatewayResult<String>;

    fn name(&self) -> &str;
}

pub type DynProvider = Arc<dyn CompletionProvider>;

pub fn make_provider(cfg: &Config) -> anyhow::Result<DynProvider> {
    let provider = openai::OpenAiCompatible::new(
        cfg.provider.label(),
        cfg.base_url(),
        cfg.timeout_secs.map(Duration::from_secs),
    )?;
    Ok(Arc::new(provider))
}
