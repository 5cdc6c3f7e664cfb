use grimoire::{GameStatus, Seat};
use tracing::info;

use super::{Flow, Game};
use crate::errors::GameError;
use crate::moderator;

impl Game {
    /// A player claims a public ability; the moderator rules on it.
    pub async fn use_public_ability(
        &mut self,
        seat: Seat,
        message: &str,
        target: Option<&str>,
    ) -> Result<Flow, GameError> {
        let name = self.roster.name(seat).to_string();
        info!(player = %name, target = target.unwrap_or("-"), "Public ability claimed");

        let narration = match target {
            Some(t) => format!("{name} wants to use a public ability on {t}: {message}"),
            None => format!("{name} wants to use a public ability: {message}"),
        };
        self.moderator.narrate(&narration);
        self.bridge.broadcast(
            &mut self.roster,
            &format!("{name} has used a public ability: {message}"),
            &[seat],
        )?;

        let choice = moderator::choose(
            self.moderator.as_mut(),
            &format!(
                "{name} has tried to use a public ability. Would you like to [S]end a message, [K]ill a player or [E]nd the game? "
            ),
            &['S', 'K', 'E'],
        )
        .await?;

        match choice {
            'K' => {
                self.kill_player().await?;
                if self.check_status()? == Flow::GameOver {
                    return Ok(Flow::GameOver);
                }
            }
            'E' => {
                let team = moderator::choose(
                    self.moderator.as_mut(),
                    "What team should win the game? [G]ood or [E]vil? ",
                    &['G', 'E'],
                )
                .await?;
                let status = if team == 'G' {
                    GameStatus::GoodWins
                } else {
                    GameStatus::EvilWins
                };
                self.finish_game(status)?;
                return Ok(Flow::GameOver);
            }
            _ => {}
        }

        let reply = self
            .moderator
            .ask("How would you respond to the town: ")
            .await?;
        self.bridge.broadcast(&mut self.roster, &reply, &[])?;
        Ok(Flow::Continue)
    }
}
