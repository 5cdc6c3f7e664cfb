//! The day's open floor, nominations included, and its resolution.

use grimoire::actions::{discussion_actions, join_actions};
use grimoire::nomination::apply_outcome;
use grimoire::{
    join_with_word, CheckpointGate, DayContext, Decision, GamePhase, NominationResult,
    ProtocolViolation, Seat,
};
use tracing::{debug, info};

use super::{Flow, Game};
use crate::errors::GameError;
use crate::moderator;
use crate::prompts;

/// What a single discussion turn amounted to.
#[derive(Debug)]
enum TurnOutcome {
    Idled,
    Acted,
    Nominated(NominationResult),
    GameOver,
}

impl Game {
    /// Run the day until the moderator or the players end it.
    pub async fn run_discussion(&mut self) -> Result<Flow, GameError> {
        let everyone: Vec<Seat> = self.roster.seats().collect();
        let cadence = self.rules.cadence;
        let mut count: u32 = 0;
        let mut open = false;
        let mut standing: Option<NominationResult> = None;
        let mut gate = CheckpointGate::new();
        self.nominated_today.clear();

        loop {
            if !open {
                if gate.fire(count, cadence.discussion_due(count)) {
                    let choice = moderator::choose(
                        self.moderator.as_mut(),
                        "Would you like to [C]ontinue discussion, [M]ake an announcement or [O]pen nominations: ",
                        &['C', 'M', 'O'],
                    )
                    .await?;
                    match choice {
                        'O' => {
                            open = true;
                            count = 0;
                            gate.mark(0);
                            self.open_nominations()?;
                        }
                        'M' => self.moderator_announcement().await?,
                        _ => {}
                    }
                }
            } else if gate.fire(count, cadence.nominations_due(count, standing.is_some())) {
                let choice = moderator::choose(
                    self.moderator.as_mut(),
                    "Would you like to [C]ontinue nominations, [M]ake an announcement or [E]nd the day: ",
                    &['C', 'M', 'E'],
                )
                .await?;
                match choice {
                    'E' => return self.resolve_day(standing).await,
                    'M' => self.moderator_announcement().await?,
                    _ => {}
                }
            }

            self.pace().await;
            let Some(seat) = self.roster.pick_active(&everyone, &mut self.rng) else {
                debug!("Everyone idled, resolving the day");
                return self.resolve_day(standing).await;
            };

            match self.discussion_turn(seat, open, standing.as_ref()).await? {
                TurnOutcome::Idled => {}
                TurnOutcome::Acted => count += 1,
                TurnOutcome::Nominated(result) => {
                    standing = apply_outcome(standing, result);
                    count += 1;
                }
                TurnOutcome::GameOver => return Ok(Flow::GameOver),
            }
        }
    }

    fn open_nominations(&mut self) -> Result<(), GameError> {
        self.advance_phase(GamePhase::Nominations, "storyteller opened nominations")?;
        self.moderator.narrate("Nominations are now open!");
        self.bridge.broadcast(
            &mut self.roster,
            "The storyteller has opened nominations! Does anyone have a player that they wish to nominate for execution?",
            &[],
        )
    }

    async fn discussion_turn(
        &mut self,
        seat: Seat,
        nominations_open: bool,
        standing: Option<&NominationResult>,
    ) -> Result<TurnOutcome, GameError> {
        let name = self.roster.name(seat).to_string();
        let status = self.roster.get(seat).status();
        let ctx = DayContext {
            nominations_open,
            actor_status: status,
            has_nominated_today: self.rules.one_nomination_per_day
                && self.nominated_today.contains(&seat),
        };
        let allowed = discussion_actions(&ctx);
        let prompt = prompts::discussion(nominations_open, standing, status, &allowed);
        let decision = self
            .bridge
            .send(&mut self.roster, seat, &prompt, &allowed)
            .await?;

        match decision {
            Decision::Idle => Ok(TurnOutcome::Idled),
            Decision::Announcement { message } => {
                self.moderator.narrate(&format!("{name}: {message}"));
                self.bridge.broadcast(
                    &mut self.roster,
                    &format!("{name} has made the announcement: {message}"),
                    &[seat],
                )?;
                Ok(TurnOutcome::Acted)
            }
            Decision::PublicAbility { message, target } => {
                match self
                    .use_public_ability(seat, &message, target.as_deref())
                    .await?
                {
                    Flow::GameOver => Ok(TurnOutcome::GameOver),
                    Flow::Continue => Ok(TurnOutcome::Acted),
                }
            }
            Decision::TalkToStoryteller { message } => {
                self.moderator.narrate(&format!(
                    "{name} has requested to talk to the storyteller: {message}"
                ));
                let reply = self
                    .moderator
                    .ask(&format!("How would you like to respond to {name}: "))
                    .await?;
                self.converse_with_storyteller(seat, format!("The storyteller has answered: {reply}"))
                    .await?;
                Ok(TurnOutcome::Acted)
            }
            Decision::RequestPrivateChat { message, targets } => {
                self.moderator.narrate(&format!(
                    "{name} has requested a private chat with {}: {message}",
                    join_with_word(&targets, "and")
                ));
                self.bridge.broadcast(
                    &mut self.roster,
                    &format!("{name} has made the announcement: {message}"),
                    &[seat],
                )?;
                self.run_private_chat(seat, &targets).await?;
                Ok(TurnOutcome::Acted)
            }
            Decision::Nominate { message, nominee } => {
                let nominee_seat = self
                    .roster
                    .find(&nominee)
                    .ok_or_else(|| GameError::invalid_player(&nominee, "nomination"))?;
                self.nominated_today.insert(seat);
                let result = self
                    .run_nomination(seat, nominee_seat, &message, standing)
                    .await?;
                Ok(TurnOutcome::Nominated(result))
            }
            other @ (Decision::Vote | Decision::PrivateMessage { .. }) => Err(GameError::violation(
                name,
                ProtocolViolation::NotAllowed {
                    action: other.kind(),
                    allowed: join_actions(&allowed),
                },
            )),
        }
    }

    /// End the day: execute whoever is on the block, if anyone.
    pub async fn resolve_day(
        &mut self,
        standing: Option<NominationResult>,
    ) -> Result<Flow, GameError> {
        self.advance_phase(GamePhase::Execution, "day resolved")?;

        let Some(nomination) = standing else {
            let text = "The day is now over and no one made any nominations! Good night!";
            self.moderator.narrate(text);
            self.bridge.broadcast(&mut self.roster, text, &[])?;
            return Ok(Flow::Continue);
        };

        let nominee = &nomination.nominee;
        let seat = self
            .roster
            .find(nominee)
            .ok_or_else(|| GameError::invalid_player(nominee, "execution"))?;
        let dies = moderator::confirm(
            self.moderator.as_mut(),
            &format!(
                "Nominations are now closed. {nominee} was nominated by {} and received {} votes, which is enough for execution. Does {nominee} die [Y/n]? ",
                nomination.nominator, nomination.votes
            ),
        )
        .await?;

        let text = if dies {
            self.roster.kill(seat);
            format!("{nominee} is executed and dies! Goodnight!")
        } else {
            format!("{nominee} is executed, but does not die! Goodnight!")
        };
        info!(nominee = %nominee, dies, "Execution resolved");
        self.moderator.narrate(&text);
        self.bridge.broadcast(
            &mut self.roster,
            &format!("Nominations are now closed. {text}"),
            &[],
        )?;

        if dies {
            return self.check_status();
        }
        Ok(Flow::Continue)
    }
}
