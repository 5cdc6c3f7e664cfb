//! A seated player and the histories kept for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;

/// Life and voting state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Alive,
    /// Dead, but still holding the single ghost vote.
    DeadWithVote,
    DeadWithoutVote,
}

impl PlayerStatus {
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Whether this player may be asked to vote.
    pub fn can_vote(self) -> bool {
        !matches!(self, Self::DeadWithoutVote)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "Alive"),
            Self::DeadWithVote => write!(f, "Dead with Ghost Vote"),
            Self::DeadWithoutVote => write!(f, "Dead without Ghost Vote"),
        }
    }
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Everything the orchestrator tells the agent.
    User,
    /// The agent's own raw replies.
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A seated player.
///
/// Histories are append-only: there is no way to remove or rewrite an entry
/// once pushed.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    actual_role: String,
    token_shown: Option<String>,
    status: PlayerStatus,
    chat_history: Vec<ChatTurn>,
    action_history: Vec<ActionKind>,
}

impl Player {
    pub fn new(name: impl Into<String>, actual_role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actual_role: actual_role.into(),
            token_shown: None,
            status: PlayerStatus::Alive,
            chat_history: Vec::new(),
            action_history: Vec::new(),
        }
    }

    /// Show this player a different token than their actual role.
    pub fn with_token_shown(mut self, token: impl Into<String>) -> Self {
        self.token_shown = Some(token.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actual_role(&self) -> &str {
        &self.actual_role
    }

    pub fn token_shown(&self) -> Option<&str> {
        self.token_shown.as_deref()
    }

    /// The role this player believes they have.
    pub fn token(&self) -> &str {
        self.token_shown.as_deref().unwrap_or(&self.actual_role)
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    pub(crate) fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat_history
    }

    pub fn action_history(&self) -> &[ActionKind] {
        &self.action_history
    }

    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.chat_history.push(turn);
    }

    pub fn push_action(&mut self, action: ActionKind) {
        self.action_history.push(action);
    }

    pub fn last_action(&self) -> Option<ActionKind> {
        self.action_history.last().copied()
    }

    /// Whether the most recent history entry is `idle`.
    pub fn just_idled(&self) -> bool {
        self.last_action() == Some(ActionKind::Idle)
    }
}
