//! When the open floor pauses to ask the moderator what to do next.
//!
//! Each loop keeps a turn counter that only advances on non-idle turns. A
//! checkpoint is due when the counter hits the configured cadence, and fires
//! at most once per counter value so a run of idles cannot re-prompt.

use serde::{Deserialize, Serialize};

/// Checkpoint cadence once nominations are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NominationCadence {
    /// Every `n`th turn.
    EveryNth(u32),
    /// Every turn while nothing is on the block, otherwise every even turn.
    NoStandingOrEven,
}

impl Default for NominationCadence {
    fn default() -> Self {
        Self::EveryNth(4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointCadence {
    /// Turns between checkpoints while nominations are closed.
    pub discussion_every: u32,
    pub nominations: NominationCadence,
    /// Turns between checkpoints in the open floor of a single nomination.
    pub nomination_discussion_every: u32,
}

impl Default for CheckpointCadence {
    fn default() -> Self {
        Self {
            discussion_every: 6,
            nominations: NominationCadence::default(),
            nomination_discussion_every: 3,
        }
    }
}

fn every(count: u32, n: u32) -> bool {
    n > 0 && count >= n && count % n == 0
}

impl CheckpointCadence {
    pub fn discussion_due(&self, count: u32) -> bool {
        every(count, self.discussion_every)
    }

    pub fn nominations_due(&self, count: u32, has_standing: bool) -> bool {
        match self.nominations {
            NominationCadence::EveryNth(n) => every(count, n),
            NominationCadence::NoStandingOrEven => {
                count > 0 && (!has_standing || count % 2 == 0)
            }
        }
    }

    pub fn nomination_discussion_due(&self, count: u32) -> bool {
        every(count, self.nomination_discussion_every)
    }
}

/// Remembers which counter value last triggered a checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckpointGate {
    last: Option<u32>,
}

impl CheckpointGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` (and remembers `count`) when `due` and this count has
    /// not fired yet.
    pub fn fire(&mut self, count: u32, due: bool) -> bool {
        if !due || self.last == Some(count) {
            return false;
        }
        self.last = Some(count);
        true
    }

    /// Treat `count` as already checkpointed.
    pub fn mark(&mut self, count: u32) {
        self.last = Some(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discussion_every_six() {
        let c = CheckpointCadence::default();
        let due: Vec<u32> = (0..20).filter(|n| c.discussion_due(*n)).collect();
        assert_eq!(due, [6, 12, 18]);
    }

    #[test]
    fn test_nominations_every_fourth() {
        let c = CheckpointCadence::default();
        let due: Vec<u32> = (0..13).filter(|n| c.nominations_due(*n, true)).collect();
        assert_eq!(due, [4, 8, 12]);
    }

    #[test]
    fn test_no_standing_or_even() {
        let c = CheckpointCadence {
            nominations: NominationCadence::NoStandingOrEven,
            ..Default::default()
        };
        assert!(c.nominations_due(3, false));
        assert!(!c.nominations_due(3, true));
        assert!(c.nominations_due(4, true));
        assert!(!c.nominations_due(0, false));
    }

    #[test]
    fn test_nomination_discussion_every_three() {
        let c = CheckpointCadence::default();
        assert!(!c.nomination_discussion_due(0));
        assert!(c.nomination_discussion_due(3));
        assert!(!c.nomination_discussion_due(4));
        assert!(c.nomination_discussion_due(6));
    }

    #[test]
    fn test_zero_disables() {
        let c = CheckpointCadence {
            discussion_every: 0,
            nominations: NominationCadence::EveryNth(0),
            nomination_discussion_every: 0,
        };
        assert!((0..20).all(|n| !c.discussion_due(n)));
        assert!((0..20).all(|n| !c.nominations_due(n, false)));
        assert!((0..20).all(|n| !c.nomination_discussion_due(n)));
    }

    #[test]
    fn test_gate_fires_once_per_count() {
        let mut gate = CheckpointGate::new();
        assert!(gate.fire(6, true));
        assert!(!gate.fire(6, true));
        assert!(!gate.fire(7, false));
        assert!(gate.fire(12, true));

        gate.mark(0);
        assert!(!gate.fire(0, true));
    }
}
