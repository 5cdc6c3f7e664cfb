//! Game orchestration: one [`Game`] owns the table and drives it to an end.
//!
//! ```text
//!   run ──▶ Night ──▶ Dawn ──▶ Discussion ──┬──▶ Execution ──▶ Night ...
//!                                           └──▶ Nominations ──▶ Execution
//!    any phase ──(status terminal)──▶ Finished
//! ```
//!
//! Everything is strictly sequential: at most one agent request or moderator
//! prompt is outstanding at any time, and roster mutations happen between
//! those suspension points.

mod cycle;
mod discussion;
mod night;
mod nomination;
mod private_chat;
mod public_ability;

pub use cycle::grimoire_listing;

use std::collections::HashSet;

use grimoire::actions::STORYTELLER_CHAT_ACTIONS;
use grimoire::phase::TransitionRecord;
use grimoire::{
    compute_status, Decision, GamePhase, GameStatus, KillOutcome, PhaseMachine, RoleCatalog,
    Roster, Seat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::bridge::Bridge;
use crate::config::{Pacing, RulesConfig};
use crate::errors::GameError;
use crate::moderator::{self, Moderator};
use crate::prompts;

/// Whether the caller should keep going after a step that can end the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    GameOver,
}

/// Knobs that do not come from the table itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameOptions {
    pub rules: RulesConfig,
    pub pacing: Pacing,
    /// Fixed seed for turn selection and pacing.
    pub seed: Option<u64>,
}

pub struct Game {
    roster: Roster,
    catalog: RoleCatalog,
    bridge: Bridge,
    moderator: Box<dyn Moderator>,
    rules: RulesConfig,
    pacing: Pacing,
    rng: StdRng,
    phases: PhaseMachine,
    outcome: Option<GameStatus>,
    nominated_today: HashSet<Seat>,
}

impl Game {
    pub fn new(
        roster: Roster,
        catalog: RoleCatalog,
        bridge: Bridge,
        moderator: Box<dyn Moderator>,
        options: GameOptions,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            roster,
            catalog,
            bridge,
            moderator,
            rules: options.rules,
            pacing: options.pacing,
            rng,
            phases: PhaseMachine::new(),
            outcome: None,
            nominated_today: HashSet::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Final result once the game has finished.
    pub fn outcome(&self) -> Option<GameStatus> {
        self.outcome
    }

    pub fn phase(&self) -> GamePhase {
        self.phases.current()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        self.phases.transitions()
    }

    pub fn phase_summary(&self) -> String {
        self.phases.summary()
    }

    // ── Phase bookkeeping ─────────────────────────────────────────────────

    pub fn advance_phase(&mut self, to: GamePhase, reason: &str) -> Result<(), GameError> {
        self.phases.advance(to, Some(reason))?;
        info!(phase = %to, day = self.phases.day(), "Phase transition: {reason}");
        Ok(())
    }

    /// Recompute the status and finish the game if it is terminal.
    pub(crate) fn check_status(&mut self) -> Result<Flow, GameError> {
        let status = compute_status(&self.roster, &self.catalog)?;
        if status.is_terminal() {
            self.finish_game(status)?;
            return Ok(Flow::GameOver);
        }
        Ok(Flow::Continue)
    }

    /// Announce the winner. Calling this again is a no-op.
    pub(crate) fn finish_game(&mut self, status: GameStatus) -> Result<(), GameError> {
        if self.outcome.is_some() || !status.is_terminal() {
            return Ok(());
        }
        let text = match status {
            GameStatus::GoodWins => "The good team wins! Congratulations!",
            _ => "The evil team wins! Congratulations!",
        };
        self.moderator.narrate(text);
        self.phases.finish(&status.to_string())?;
        self.outcome = Some(status);
        info!(%status, day = self.phases.day(), "Game finished");
        Ok(())
    }

    // ── Shared storyteller primitives ─────────────────────────────────────

    /// Ask the moderator who dies and flip them to dead.
    pub(crate) async fn kill_player(&mut self) -> Result<(), GameError> {
        let seat = moderator::select_player(
            self.moderator.as_mut(),
            &self.roster,
            "Enter the name of the player to kill",
        )
        .await?;
        let name = self.roster.name(seat).to_string();
        match self.roster.kill(seat) {
            KillOutcome::Died => self.moderator.narrate(&format!("{name} has died.")),
            KillOutcome::AlreadyDead => {
                warn!(player = %name, "Kill requested for a dead player");
                self.moderator.narrate(&format!("{name} is already dead."));
            }
        }
        Ok(())
    }

    /// One-to-one exchange with the storyteller, until the player idles.
    pub(crate) async fn converse_with_storyteller(
        &mut self,
        seat: Seat,
        opening: String,
    ) -> Result<(), GameError> {
        let name = self.roster.name(seat).to_string();
        let mut message = opening;
        loop {
            let prompt = prompts::storyteller_chat(&message);
            let decision = self
                .bridge
                .send(&mut self.roster, seat, &prompt, STORYTELLER_CHAT_ACTIONS)
                .await?;
            match decision {
                Decision::TalkToStoryteller { message: said } => {
                    self.moderator.narrate(&format!("{name}: {said}"));
                    message = self
                        .moderator
                        .ask(&format!("How would you like to respond to {name}? "))
                        .await?;
                }
                _ => {
                    self.moderator
                        .narrate(&format!("{name} has chosen not to respond."));
                    return Ok(());
                }
            }
        }
    }

    /// Free-text announcement from the storyteller to everyone.
    pub(crate) async fn moderator_announcement(&mut self) -> Result<(), GameError> {
        let text = self
            .moderator
            .ask("What would you like to announce to the town? ")
            .await?;
        self.bridge.broadcast(&mut self.roster, &text, &[])
    }

    /// Random pause before an open-floor turn.
    pub(crate) async fn pace(&mut self) {
        let delay = self.pacing.sample(&mut self.rng);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
