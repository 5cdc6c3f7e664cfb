//! Game error taxonomy with retry classification.
//!
//! Only agent-side generation problems are retried; everything else ends the
//! run. Moderator typos never reach this type: menus re-prompt instead.
//!
//! | Category          | Retriable | Max retries |
//! |-------------------|-----------|-------------|
//! | Transient         | yes       | 2           |
//! | ParseFailure      | yes       | 2           |
//! | ProtocolViolation | no        | —           |
//! | InvalidReference  | no        | —           |
//! | Exhausted         | no        | —           |
//! | Fatal             | no        | —           |

use std::fmt;

use grimoire::{GrimoireError, ProtocolViolation, ResponseError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Network or backend failure while generating.
    Transient,
    /// Output did not match the response schema or whitelist.
    ParseFailure,
    /// A well-formed response broke the per-action contract.
    ProtocolViolation,
    /// A name that does not match any seated player.
    InvalidReference,
    /// The attempt budget ran out.
    Exhausted,
    Fatal,
}

impl RetryCategory {
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Transient | Self::ParseFailure)
    }

    /// Suggested retries after the first attempt; `None` when not retriable.
    pub fn default_max_retries(self) -> Option<u32> {
        match self {
            Self::Transient | Self::ParseFailure => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::ParseFailure => write!(f, "parse_failure"),
            Self::ProtocolViolation => write!(f, "protocol_violation"),
            Self::InvalidReference => write!(f, "invalid_reference"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    // ── Retriable ─────────────────────────────────────────────────────────
    /// The backend call itself failed.
    #[error("Generation failed via {backend}: {message}")]
    Generation { backend: String, message: String },

    #[error("Malformed agent response: {0}")]
    MalformedResponse(#[from] ResponseError),

    // ── Fatal ─────────────────────────────────────────────────────────────
    #[error("Protocol violation by {player}: {violation}")]
    ProtocolViolation {
        player: String,
        #[source]
        violation: ProtocolViolation,
    },

    #[error("Failed to generate a response for {player} after {attempts} attempts: {last}")]
    RetriesExhausted {
        player: String,
        attempts: u32,
        last: String,
    },

    #[error("Invalid player reference {name:?} from {context}")]
    InvalidPlayer { name: String, context: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Moderator input closed")]
    ModeratorClosed,

    #[error(transparent)]
    Rules(#[from] GrimoireError),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GameError {
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::Generation { .. } => RetryCategory::Transient,
            Self::MalformedResponse(_) => RetryCategory::ParseFailure,
            Self::ProtocolViolation { .. } => RetryCategory::ProtocolViolation,
            Self::InvalidPlayer { .. } => RetryCategory::InvalidReference,
            Self::RetriesExhausted { .. } => RetryCategory::Exhausted,
            Self::Configuration(_)
            | Self::ModeratorClosed
            | Self::Rules(_)
            | Self::Transcript(_)
            | Self::Internal(_) => RetryCategory::Fatal,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.retry_category().is_retriable()
    }

    pub fn generation(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn violation(player: impl Into<String>, violation: ProtocolViolation) -> Self {
        Self::ProtocolViolation {
            player: player.into(),
            violation,
        }
    }

    pub fn invalid_player(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidPlayer {
            name: name.into(),
            context: context.into(),
        }
    }
}

impl From<csv::Error> for GameError {
    fn from(err: csv::Error) -> Self {
        Self::Transcript(err.to_string())
    }
}
