//! Error types for rule evaluation.
//!
//! Two families live here:
//! - [`GrimoireError`]: data-integrity problems with the roster, the role
//!   catalog, or the phase machine. These are never recoverable at runtime.
//! - [`ProtocolViolation`]: an agent claimed an action it was not offered, or
//!   omitted a field the action requires.

use std::path::PathBuf;

use thiserror::Error;

use crate::actions::ActionKind;
use crate::phase::GamePhase;

/// Result alias for rule operations.
pub type GrimoireResult<T> = Result<T, GrimoireError>;

#[derive(Debug, Error)]
pub enum GrimoireError {
    #[error("Player name {0:?} appears more than once in the seating")]
    DuplicatePlayer(String),

    #[error("No player named {0:?} is seated")]
    UnknownPlayer(String),

    #[error("Role {0:?} is not in the role catalog")]
    UnknownRole(String),

    #[error("The roster has no players")]
    EmptyRoster,

    #[error("Failed to read role file {path}: {source}")]
    RoleIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse role file {path}: {source}")]
    RoleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Illegal phase transition: {from} → {to}")]
    IllegalTransition { from: GamePhase, to: GamePhase },
}

/// A breach of the per-turn action contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("Action '{0}' is not a known action")]
    UnknownAction(String),

    #[error("Action '{action}' is not allowed right now (allowed: {allowed})")]
    NotAllowed { action: ActionKind, allowed: String },

    #[error("Action '{0}' requires a message but none was given")]
    MissingMessage(ActionKind),

    #[error("Action '{action}' requires {expected} target(s), got {got}")]
    TargetCount {
        action: ActionKind,
        expected: &'static str,
        got: usize,
    },
}
