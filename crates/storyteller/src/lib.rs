//! Storyteller: runs a moderated social deduction game with LLM players.
//!
//! ```text
//!   main ──▶ Game::run ──▶ night / discussion / nomination controllers
//!                │                 │
//!                │                 ├──▶ Moderator (human on stdin)
//!                │                 └──▶ Bridge ──▶ AgentClient ──▶ PlayerAgent (HTTP)
//!                │                                  └──▶ TranscriptSink (CSV)
//!                └──▶ grimoire (rules, roster, status, nomination arithmetic)
//! ```

pub mod agent;
pub mod bridge;
pub mod config;
pub mod errors;
pub mod game;
pub mod moderator;
pub mod prompts;
pub mod transcript;

pub use errors::GameError;
pub use game::{Flow, Game, GameOptions};
