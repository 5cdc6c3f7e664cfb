use grimoire::{GamePhase, GameStatus, Roster};
use tracing::info;

use super::{Flow, Game};
use crate::errors::GameError;

/// The moderator's view of the table: seat order, status, real and shown
/// roles.
pub fn grimoire_listing(roster: &Roster) -> Vec<String> {
    let mut lines = vec![
        "These are the players in the game in clockwise order, starting at the top of the circle:"
            .to_string(),
    ];
    for player in roster.players() {
        let mut line = if player.is_alive() {
            format!(" - {}: {}", player.name(), player.actual_role())
        } else {
            format!(
                " - {} ({}): {}",
                player.name(),
                player.status(),
                player.actual_role()
            )
        };
        if let Some(token) = player.token_shown() {
            line.push_str(&format!(" (Shown {token})"));
        }
        lines.push(line);
    }
    lines
}

impl Game {
    /// Introduce the players, then alternate night and day until a team wins.
    pub async fn run(&mut self) -> Result<GameStatus, GameError> {
        self.moderator.narrate("Setting up the game...");
        self.bridge.initialize_players(&mut self.roster).await?;

        loop {
            if self.check_status()? == Flow::GameOver {
                break;
            }

            self.advance_phase(GamePhase::Night, "nightfall")?;
            self.moderator
                .narrate("It is now the night. All players close their eyes.");
            for line in grimoire_listing(&self.roster) {
                self.moderator.narrate(&line);
            }
            if self.run_night().await? == Flow::GameOver {
                break;
            }

            self.advance_phase(GamePhase::Dawn, "night ended")?;
            let morning = self
                .moderator
                .ask("The night phase is now over. What would you like to say to the town as they wake in the morning: ")
                .await?;
            self.bridge.broadcast(&mut self.roster, &morning, &[])?;

            self.advance_phase(GamePhase::Discussion, "town wakes")?;
            if self.run_discussion().await? == Flow::GameOver {
                break;
            }
        }

        info!(summary = %self.phase_summary(), "Game loop finished");
        self.outcome
            .ok_or_else(|| GameError::Internal(anyhow::anyhow!("game ended without a result")))
    }
}
