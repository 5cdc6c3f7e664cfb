//! Grimoire: deterministic rules for a moderated hidden-role game.
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! reading role files. Orchestration (agents, moderator, transcripts) lives
//! in the `storyteller` crate and drives these types.
//!
//! ```text
//!   RoleCatalog ──▶ compute_status ◀── Roster ──▶ pick_active / vote_order
//!                                         │
//!   actions (legality table) ──▶ response::parse ──▶ actions::validate
//!                                         │
//!   nomination (threshold, tally) ◀───────┘        cadence ──▶ checkpoints
//!                                                  phase   ──▶ PhaseMachine
//! ```

pub mod actions;
pub mod cadence;
pub mod error;
pub mod nomination;
pub mod phase;
pub mod player;
pub mod response;
pub mod role;
pub mod roster;
pub mod status;

pub use actions::{ActionKind, DayContext, Decision};
pub use cadence::{CheckpointCadence, CheckpointGate, NominationCadence};
pub use error::{GrimoireError, GrimoireResult, ProtocolViolation};
pub use nomination::{NominationOutcome, NominationResult, VoteTally};
pub use phase::{GamePhase, NightState, PhaseMachine};
pub use player::{ChatRole, ChatTurn, Player, PlayerStatus};
pub use response::{PlayerResponse, ResponseError};
pub use role::{Role, RoleCatalog, Team};
pub use roster::{KillOutcome, Roster, Seat};
pub use status::{compute_status, GameStatus};

/// Join items as `a, b and c` using the given final word.
pub fn join_with_word<S: AsRef<str>>(items: &[S], word: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} {word} {}", head.join(", "), last.as_ref())
        }
    }
}
