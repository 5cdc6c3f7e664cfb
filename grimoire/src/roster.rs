//! The seated, ordered set of players.
//!
//! Seat order is clockwise. For a player in seat `i` of `n`:
//!
//! ```text
//!   left neighbour  = seat (i + 1) % n      (next clockwise)
//!   right neighbour = seat (i + n - 1) % n
//! ```
//!
//! Players are addressed by [`Seat`] once resolved, so names are only
//! matched at the boundary where agents or the moderator type them.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::actions::ActionKind;
use crate::error::{GrimoireError, GrimoireResult};
use crate::player::{ChatTurn, Player, PlayerStatus};

/// Index of a player in clockwise seating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Seat(pub usize);

/// Result of a kill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    Died,
    AlreadyDead,
}

#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Seat the given players in order. Names must be unique (compared
    /// case-insensitively, since that is how they are typed back).
    pub fn new(players: Vec<Player>) -> GrimoireResult<Self> {
        if players.is_empty() {
            return Err(GrimoireError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for p in &players {
            if !seen.insert(p.name().to_lowercase()) {
                return Err(GrimoireError::DuplicatePlayer(p.name().to_string()));
            }
        }
        Ok(Self { players })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn seats(&self) -> impl Iterator<Item = Seat> {
        (0..self.players.len()).map(Seat)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, seat: Seat) -> &Player {
        &self.players[seat.0]
    }

    pub fn get_mut(&mut self, seat: Seat) -> &mut Player {
        &mut self.players[seat.0]
    }

    pub fn name(&self, seat: Seat) -> &str {
        self.players[seat.0].name()
    }

    /// Exact-match lookup.
    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        self.players.iter().position(|p| p.name() == name).map(Seat)
    }

    /// Case-insensitive lookup, ignoring surrounding whitespace.
    pub fn find(&self, name: &str) -> Option<Seat> {
        let wanted = name.trim().to_lowercase();
        self.players
            .iter()
            .position(|p| p.name().to_lowercase() == wanted)
            .map(Seat)
    }

    /// Case-insensitive lookup that fails on an unknown name.
    pub fn resolve(&self, name: &str) -> GrimoireResult<Seat> {
        self.find(name)
            .ok_or_else(|| GrimoireError::UnknownPlayer(name.to_string()))
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn left_of(&self, seat: Seat) -> Seat {
        Seat((seat.0 + 1) % self.len())
    }

    pub fn right_of(&self, seat: Seat) -> Seat {
        Seat((seat.0 + self.len() - 1) % self.len())
    }

    /// Every seat, starting immediately clockwise of `nominee` and ending on
    /// `nominee` itself.
    pub fn vote_order(&self, nominee: Seat) -> Vec<Seat> {
        let n = self.len();
        (1..=n).map(|offset| Seat((nominee.0 + offset) % n)).collect()
    }

    /// Give the floor to someone in `group` who has not just passed.
    ///
    /// Draws uniformly from the group. When the drawn player's last action was
    /// `idle`, redraws from only the players whose last action was not; if
    /// there are none the floor is closed and `None` is returned.
    pub fn pick_active<R: Rng + ?Sized>(&self, group: &[Seat], rng: &mut R) -> Option<Seat> {
        let drawn = *group.choose(rng)?;
        if !self.get(drawn).just_idled() {
            return Some(drawn);
        }
        let eligible: Vec<Seat> = group
            .iter()
            .copied()
            .filter(|s| !self.get(*s).just_idled())
            .collect();
        eligible.choose(rng).copied()
    }

    /// Flip an alive player to dead-with-vote.
    pub fn kill(&mut self, seat: Seat) -> KillOutcome {
        let player = self.get_mut(seat);
        if !player.is_alive() {
            return KillOutcome::AlreadyDead;
        }
        player.set_status(PlayerStatus::DeadWithVote);
        info!(player = player.name(), "Player died");
        KillOutcome::Died
    }

    /// Spend a dead player's ghost vote. No effect on anyone else.
    pub fn spend_ghost_vote(&mut self, seat: Seat) -> bool {
        let player = self.get_mut(seat);
        if player.status() == PlayerStatus::DeadWithVote {
            player.set_status(PlayerStatus::DeadWithoutVote);
            true
        } else {
            false
        }
    }

    /// Record a message heard by one player.
    pub fn record_heard(&mut self, seat: Seat, text: &str) {
        let player = self.get_mut(seat);
        player.push_turn(ChatTurn::user(text));
        player.push_action(ActionKind::HearMessage);
    }

    /// Append the same orchestrator action to every player's history.
    pub fn mark_all(&mut self, action: ActionKind) {
        for player in &mut self.players {
            player.push_action(action);
        }
    }
}
