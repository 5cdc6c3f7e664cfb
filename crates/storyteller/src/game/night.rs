use grimoire::NightState;
use tracing::debug;

use super::{Flow, Game};
use crate::errors::GameError;
use crate::moderator;

impl Game {
    /// Moderator-led night: wake players, kill players, or end the night.
    ///
    /// A kill that ends the game stops the night immediately.
    pub async fn run_night(&mut self) -> Result<Flow, GameError> {
        let mut state = NightState::AwaitingModeratorChoice;
        while state != NightState::Ended {
            debug!(?state, "Night state");
            let choice = moderator::choose(
                self.moderator.as_mut(),
                "Would you like to [W]ake a player, [K]ill a player or [E]nd the night? ",
                &['W', 'K', 'E'],
            )
            .await?;

            state = match choice {
                'W' => NightState::Conversing,
                'K' => {
                    self.kill_player().await?;
                    if self.check_status()? == Flow::GameOver {
                        return Ok(Flow::GameOver);
                    }
                    NightState::AwaitingModeratorChoice
                }
                _ => NightState::Ended,
            };

            if state == NightState::Conversing {
                let seat = moderator::select_player(
                    self.moderator.as_mut(),
                    &self.roster,
                    "Enter the name of the player that you want to wake up",
                )
                .await?;
                let message = self
                    .moderator
                    .ask("What do you want to say to the player? ")
                    .await?;
                self.converse_with_storyteller(
                    seat,
                    format!("The storyteller wakes you in the night to tell you: \"{message}\""),
                )
                .await?;
                state = NightState::AwaitingModeratorChoice;
            }
        }
        Ok(Flow::Continue)
    }
}
