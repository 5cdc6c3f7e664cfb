//! A single nomination: statements, open floor, then a clockwise vote.

use grimoire::actions::{NOMINATION_ACTIONS, VOTE_ACTIONS};
use grimoire::nomination::vote_threshold;
use grimoire::{
    ActionKind, CheckpointGate, Decision, NominationOutcome, NominationResult, PlayerStatus, Seat,
    VoteTally,
};
use tracing::info;

use super::Game;
use crate::errors::GameError;
use crate::moderator;
use crate::prompts;

impl Game {
    /// Run a nomination of `nominee` by `nominator` to its verdict.
    ///
    /// `standing` is whoever is already on the block today; it decides the
    /// threshold and whether an equal tally is a tie.
    pub async fn run_nomination(
        &mut self,
        nominator: Seat,
        nominee: Seat,
        message: &str,
        standing: Option<&NominationResult>,
    ) -> Result<NominationResult, GameError> {
        let nominator_name = self.roster.name(nominator).to_string();
        let nominee_name = self.roster.name(nominee).to_string();
        info!(nominator = %nominator_name, nominee = %nominee_name, "Nomination started");

        let announcement =
            format!("{nominator_name} has nominated {nominee_name} for execution: {message}");
        self.moderator.narrate(&announcement);
        self.bridge
            .broadcast(&mut self.roster, &announcement, &[nominator])?;
        self.roster.mark_all(ActionKind::StartNomination);

        self.moderator.narrate(&format!(
            "{nominator_name}, please give your reasoning for the nomination."
        ));
        self.bridge.broadcast(
            &mut self.roster,
            &format!(
                "The storyteller has requested {nominator_name} to explain the reason for the nomination."
            ),
            &[],
        )?;
        self.nomination_turn(nominator, &nominator_name, &nominee_name)
            .await?;

        self.moderator.narrate(&format!(
            "{nominee_name}, please give your defence for the nomination."
        ));
        self.bridge.broadcast(
            &mut self.roster,
            &format!("The storyteller has requested {nominee_name} to defend themselves."),
            &[],
        )?;
        self.nomination_turn(nominee, &nominator_name, &nominee_name)
            .await?;

        self.nomination_discussion(&nominator_name, &nominee_name)
            .await?;

        let tally = self.take_votes(nominee, standing).await?;
        let result = NominationResult {
            result: tally.outcome(standing),
            votes: tally.votes(),
            nominator: nominator_name,
            nominee: nominee_name,
        };
        self.announce_verdict(&result, standing)?;
        Ok(result)
    }

    /// One `idle`/`announcement` turn about the current nomination.
    /// Returns whether the player spoke.
    async fn nomination_turn(
        &mut self,
        seat: Seat,
        nominator_name: &str,
        nominee_name: &str,
    ) -> Result<bool, GameError> {
        let name = self.roster.name(seat).to_string();
        let prompt = prompts::nomination_turn(&name, nominator_name, nominee_name);
        let decision = self
            .bridge
            .send(&mut self.roster, seat, &prompt, NOMINATION_ACTIONS)
            .await?;

        let Decision::Announcement { message } = decision else {
            return Ok(false);
        };
        self.moderator.narrate(&format!("{name}: {message}"));
        self.bridge.broadcast(
            &mut self.roster,
            &format!("During the nomination for {nominee_name}, {name} says: {message}"),
            &[],
        )?;
        Ok(true)
    }

    async fn nomination_discussion(
        &mut self,
        nominator_name: &str,
        nominee_name: &str,
    ) -> Result<(), GameError> {
        let everyone: Vec<Seat> = self.roster.seats().collect();
        let mut count = 0;
        let mut gate = CheckpointGate::new();

        loop {
            if gate.fire(count, self.rules.cadence.nomination_discussion_due(count)) {
                let choice = moderator::choose(
                    self.moderator.as_mut(),
                    "Would you like to [C]ontinue discussion or [P]roceed to voting: ",
                    &['C', 'P'],
                )
                .await?;
                if choice == 'P' {
                    return Ok(());
                }
            }

            self.pace().await;
            let Some(seat) = self.roster.pick_active(&everyone, &mut self.rng) else {
                self.moderator.narrate("All players have chosen to idle");
                return Ok(());
            };
            if self
                .nomination_turn(seat, nominator_name, nominee_name)
                .await?
            {
                count += 1;
            }
        }
    }

    async fn take_votes(
        &mut self,
        nominee: Seat,
        standing: Option<&NominationResult>,
    ) -> Result<VoteTally, GameError> {
        let nominee_name = self.roster.name(nominee).to_string();
        let order = self.roster.vote_order(nominee);
        let alive = self.roster.alive_count();
        let threshold = vote_threshold(alive, standing);
        let first = self.roster.name(order[0]).to_string();

        let briefing = prompts::vote_briefing(&nominee_name, &first, alive, threshold, standing);
        self.moderator.narrate(&format!(
            "Votes will begin with {first} and end with {nominee_name}. At least {threshold} are required."
        ));
        self.bridge.broadcast(&mut self.roster, &briefing, &[])?;

        let mut tally = VoteTally::new(threshold);
        for seat in order {
            let status = self.roster.get(seat).status();
            if !status.can_vote() {
                continue;
            }
            let voter = self.roster.name(seat).to_string();
            let decision = self
                .bridge
                .send(
                    &mut self.roster,
                    seat,
                    &prompts::vote(&nominee_name, status),
                    VOTE_ACTIONS,
                )
                .await?;
            let voted = decision == Decision::Vote;
            tally.record(voted);

            if voted && status == PlayerStatus::DeadWithVote && self.rules.consume_ghost_votes {
                self.roster.spend_ghost_vote(seat);
                info!(player = %voter, "Ghost vote spent");
            }

            let (verb, towards) = if voted {
                ("voting", "to vote")
            } else {
                ("not voting", "not to vote")
            };
            self.moderator.narrate(&format!(
                "{voter} is {verb} ({}/{threshold})",
                tally.votes()
            ));
            let progress = if tally.reached() {
                format!("That's {} so far", tally.votes())
            } else {
                format!(
                    "That's {} out of {threshold} required votes so far",
                    tally.votes()
                )
            };
            self.bridge.broadcast(
                &mut self.roster,
                &format!("{voter} has chosen {towards} towards the execution of {nominee_name}. {progress}"),
                &[],
            )?;
        }
        Ok(tally)
    }

    fn announce_verdict(
        &mut self,
        result: &NominationResult,
        standing: Option<&NominationResult>,
    ) -> Result<(), GameError> {
        let votes = result.votes;
        let nominee = &result.nominee;
        let text = match (result.result, standing) {
            (NominationOutcome::Tie, Some(existing)) => format!(
                "{votes} players voted to execute {nominee}, which is a tie against the existing nomination for {}! Therefore, no one is on the block for execution now.",
                existing.nominee
            ),
            (NominationOutcome::InsufficientVotes, None) => format!(
                "Only {votes} players voted to execute {nominee}, which is not enough! The nomination is now over."
            ),
            (NominationOutcome::InsufficientVotes, Some(existing)) => format!(
                "Only {votes} players voted to execute {nominee}, which is not enough! The nomination is now over and {} is still on the block for execution.",
                existing.nominee
            ),
            (_, Some(existing)) => format!(
                "{votes} players voted to execute {nominee}, which is enough! {nominee} is now on the block for execution instead of {}.",
                existing.nominee
            ),
            (_, None) => format!(
                "{votes} players voted to execute {nominee}, which is enough! {nominee} is now on the block for execution."
            ),
        };
        info!(nominee = %nominee, votes, outcome = %result.result, "Nomination resolved");
        self.moderator.narrate(&text);
        self.bridge.broadcast(&mut self.roster, &text, &[])
    }
}
