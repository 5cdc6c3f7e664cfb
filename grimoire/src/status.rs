//! Win-condition evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GrimoireResult;
use crate::role::{RoleCatalog, Team};
use crate::roster::Roster;

/// Derived game outcome; recompute it, never store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    GoodWins,
    EvilWins,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::GoodWins => write!(f, "good wins"),
            Self::EvilWins => write!(f, "evil wins"),
        }
    }
}

/// Good wins once no demon is alive; evil wins when a demon survives with at
/// most two players left alive.
///
/// Roles are resolved by the player's actual role. A role missing from the
/// catalog is an error.
pub fn compute_status(roster: &Roster, catalog: &RoleCatalog) -> GrimoireResult<GameStatus> {
    let mut alive = 0usize;
    let mut alive_demons = 0usize;
    for player in roster.players().iter().filter(|p| p.is_alive()) {
        alive += 1;
        if catalog.team_of(player.actual_role())? == Team::Demon {
            alive_demons += 1;
        }
    }

    Ok(if alive_demons == 0 {
        GameStatus::GoodWins
    } else if alive <= 2 {
        GameStatus::EvilWins
    } else {
        GameStatus::Ongoing
    })
}
