//! Player agent contract and its HTTP backends.
//!
//! ```text
//!   Bridge ──▶ AgentClient (attempt budget) ──▶ dyn PlayerAgent ──▶ HTTP
//!                    │
//!                    └── grimoire::response::parse (schema + whitelist)
//! ```
//!
//! Backends only move text; validation and retry live in [`AgentClient`].

pub mod client;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use grimoire::{ActionKind, ChatTurn};

pub use client::AgentClient;
pub use gemini::GeminiAgent;
pub use openai::OpenAiAgent;

use crate::config::{AgentConfig, Backend};
use crate::errors::GameError;

/// One request to a player's agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    pub player: &'a str,
    pub system_instruction: &'a str,
    /// Everything exchanged with this player so far, oldest first.
    pub history: &'a [ChatTurn],
    pub prompt: &'a str,
    pub allowed_actions: &'a [ActionKind],
}

impl AgentRequest<'_> {
    pub fn allowed_names(&self) -> Vec<&'static str> {
        self.allowed_actions.iter().map(|a| a.as_str()).collect()
    }
}

/// Produces the raw text of a player's decision.
#[async_trait]
pub trait PlayerAgent: Send + Sync {
    /// Short backend name for logs and errors.
    fn backend(&self) -> &str;

    async fn generate(&self, request: &AgentRequest<'_>) -> Result<String, GameError>;
}

/// Build the agent selected by `config.backend`.
pub fn from_config(config: &AgentConfig) -> Result<Box<dyn PlayerAgent>, GameError> {
    Ok(match config.backend {
        Backend::Gemini => Box::new(GeminiAgent::new(config)?),
        Backend::Openai => Box::new(OpenAiAgent::new(config)?),
    })
}

pub(crate) fn http_client(config: &AgentConfig) -> Result<reqwest::Client, GameError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| GameError::Configuration(format!("Failed to create HTTP client: {e}")))
}
