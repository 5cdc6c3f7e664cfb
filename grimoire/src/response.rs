//! Schema for what a player agent sends back.
//!
//! The raw text is strict JSON: `reasoning` and `action` are required and
//! non-empty, `message` and `players` are optional, anything else is
//! rejected. Failures here are the agent's fault and worth a retry; see
//! [`crate::actions::validate`] for the stricter per-action checks that are
//! not.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::{join_actions, ActionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerResponse {
    pub reasoning: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Response is not valid JSON for the player schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response has an empty 'reasoning' field")]
    EmptyReasoning,

    #[error("Response has an empty 'action' field")]
    EmptyAction,

    #[error("Invalid action '{action}' (allowed: {allowed})")]
    ActionNotAllowed { action: String, allowed: String },
}

/// Parse raw agent output and check its action against the whitelist.
pub fn parse(raw: &str, allowed: &[ActionKind]) -> Result<PlayerResponse, ResponseError> {
    let response: PlayerResponse = serde_json::from_str(strip_code_fence(raw))?;

    if response.reasoning.trim().is_empty() {
        return Err(ResponseError::EmptyReasoning);
    }
    if response.action.trim().is_empty() {
        return Err(ResponseError::EmptyAction);
    }

    let offered = allowed.iter().any(|a| a.as_str() == response.action.trim());
    if !offered {
        return Err(ResponseError::ActionNotAllowed {
            action: response.action.clone(),
            allowed: join_actions(allowed),
        });
    }

    Ok(response)
}

/// Drop a surrounding ```` ```json ```` fence if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
