//! Nomination arithmetic: vote threshold, running tally, verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NominationOutcome {
    OnTheBlock,
    /// Same tally as the standing nomination; nobody is on the block.
    Tie,
    InsufficientVotes,
}

impl fmt::Display for NominationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTheBlock => write!(f, "on-the-block"),
            Self::Tie => write!(f, "tie"),
            Self::InsufficientVotes => write!(f, "insufficient-votes"),
        }
    }
}

/// A completed nomination. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationResult {
    pub result: NominationOutcome,
    pub votes: u32,
    pub nominator: String,
    pub nominee: String,
}

/// Votes needed to put a nominee on the block.
///
/// Beating a standing nomination takes one more vote than it got; otherwise
/// a majority of alive players (rounded up) is required.
pub fn vote_threshold(alive_count: usize, standing: Option<&NominationResult>) -> u32 {
    match standing {
        Some(existing) => existing.votes + 1,
        None => alive_count.div_ceil(2) as u32,
    }
}

/// Running count of yes votes for one nomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    votes: u32,
    threshold: u32,
}

impl VoteTally {
    pub fn new(threshold: u32) -> Self {
        Self {
            votes: 0,
            threshold,
        }
    }

    pub fn record(&mut self, voted: bool) {
        if voted {
            self.votes += 1;
        }
    }

    pub fn votes(&self) -> u32 {
        self.votes
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn reached(&self) -> bool {
        self.votes >= self.threshold
    }

    /// Final verdict against the standing nomination, if any.
    pub fn outcome(&self, standing: Option<&NominationResult>) -> NominationOutcome {
        match standing {
            Some(existing) if existing.votes == self.votes => NominationOutcome::Tie,
            _ if !self.reached() => NominationOutcome::InsufficientVotes,
            _ => NominationOutcome::OnTheBlock,
        }
    }
}

/// How a finished nomination changes the day's standing nomination.
///
/// `OnTheBlock` replaces it, `Tie` clears it, `InsufficientVotes` leaves it.
pub fn apply_outcome(
    standing: Option<NominationResult>,
    result: NominationResult,
) -> Option<NominationResult> {
    match result.result {
        NominationOutcome::OnTheBlock => Some(result),
        NominationOutcome::Tie => None,
        NominationOutcome::InsufficientVotes => standing,
    }
}
