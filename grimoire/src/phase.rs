//! Game phase state machine with legal-transition guards.
//!
//! ```text
//!   Setup ──▶ Night ──▶ Dawn ──▶ Discussion ──▶ Nominations ──▶ Execution
//!               ▲                     │                             │
//!               │                     └─────────────────────────────┤
//!               └───────────────────────────────────────────────────┘
//!
//!   any non-terminal phase ──▶ Finished   (no exits)
//! ```
//!
//! `Execution` is the day-resolution step. It is entered from `Discussion`
//! directly when no nominations were ever opened.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GrimoireError, GrimoireResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Players seated and introduced, no night has happened yet.
    Setup,
    /// The moderator wakes players and marks kills.
    Night,
    /// Morning announcement before discussion.
    Dawn,
    /// Open floor with nominations closed.
    Discussion,
    /// Open floor with nominations open.
    Nominations,
    /// Day resolution: confirm or skip the standing nomination.
    Execution,
    /// A winner has been declared.
    Finished,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Whether the phase belongs to the daytime half of a cycle.
    pub fn is_day(self) -> bool {
        matches!(
            self,
            Self::Dawn | Self::Discussion | Self::Nominations | Self::Execution
        )
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "Setup"),
            Self::Night => write!(f, "Night"),
            Self::Dawn => write!(f, "Dawn"),
            Self::Discussion => write!(f, "Discussion"),
            Self::Nominations => write!(f, "Nominations"),
            Self::Execution => write!(f, "Execution"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

fn is_legal_transition(from: GamePhase, to: GamePhase) -> bool {
    use GamePhase::*;

    if to == Finished && !from.is_terminal() {
        return true;
    }

    matches!(
        (from, to),
        (Setup, Night)
            | (Night, Dawn)
            | (Dawn, Discussion)
            | (Discussion, Nominations)
            // Nobody opened nominations: resolve the day with nothing standing
            | (Discussion, Execution)
            | (Nominations, Execution)
            | (Execution, Night)
    )
}

/// A single recorded phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: GamePhase,
    pub to: GamePhase,
    /// Day number at the time of transition (0 before the first dawn).
    pub day: u32,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Tracks the current phase, the day counter, and every transition taken.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    current: GamePhase,
    day: u32,
    transitions: Vec<TransitionRecord>,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self {
            current: GamePhase::Setup,
            day: 0,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> GamePhase {
        self.current
    }

    /// Current day number; incremented on every `Night → Dawn`.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Move to `to`, or fail with [`GrimoireError::IllegalTransition`].
    pub fn advance(&mut self, to: GamePhase, reason: Option<&str>) -> GrimoireResult<()> {
        if !is_legal_transition(self.current, to) {
            return Err(GrimoireError::IllegalTransition {
                from: self.current,
                to,
            });
        }

        if self.current == GamePhase::Night && to == GamePhase::Dawn {
            self.day += 1;
        }

        debug!(from = %self.current, to = %to, day = self.day, "Phase transition");

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            day: self.day,
            at: Utc::now(),
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    /// Enter `Finished`. Legal from every non-terminal phase.
    pub fn finish(&mut self, reason: &str) -> GrimoireResult<()> {
        self.advance(GamePhase::Finished, Some(reason))
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// `Setup → Night → Dawn (day 1) → … → Finished (7 transitions)`
    pub fn summary(&self) -> String {
        let path: Vec<String> = self.transitions.iter().map(|t| t.to.to_string()).collect();
        if path.is_empty() {
            return format!("{} (no transitions)", self.current);
        }
        format!(
            "{} → {} (day {}, {} transitions)",
            GamePhase::Setup,
            path.join(" → "),
            self.day,
            self.transitions.len()
        )
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sub-state of the night controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightState {
    AwaitingModeratorChoice,
    /// 1:1 conversation with a woken player.
    Conversing,
    Ended,
}
