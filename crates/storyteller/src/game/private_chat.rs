use grimoire::actions::PRIVATE_CHAT_ACTIONS;
use grimoire::{join_with_word, Decision, Seat};
use tracing::info;

use super::Game;
use crate::errors::GameError;
use crate::prompts;

impl Game {
    /// Resolve requested names into a chat group led by `requester`.
    ///
    /// Names match case-insensitively. The requester and repeats are dropped;
    /// an unknown name or nobody left to talk to is an invalid reference.
    pub(crate) fn chat_group(
        &self,
        requester: Seat,
        targets: &[String],
    ) -> Result<Vec<Seat>, GameError> {
        let mut group = vec![requester];
        for name in targets {
            let seat = self
                .roster
                .find(name)
                .ok_or_else(|| GameError::invalid_player(name, "private chat request"))?;
            if !group.contains(&seat) {
                group.push(seat);
            }
        }
        if group.len() < 2 {
            return Err(GameError::invalid_player(
                targets.join(", "),
                "private chat request with no one else",
            ));
        }
        Ok(group)
    }

    /// Run a private chat until every member has gone quiet.
    pub async fn run_private_chat(
        &mut self,
        requester: Seat,
        targets: &[String],
    ) -> Result<(), GameError> {
        let group = self.chat_group(requester, targets)?;
        let names: Vec<String> = group
            .iter()
            .map(|s| self.roster.name(*s).to_string())
            .collect();
        info!(members = %names.join(", "), "Private chat started");

        for (i, &seat) in group.iter().enumerate() {
            let others = others_of(&names, i);
            self.bridge.tell(
                &mut self.roster,
                seat,
                &format!("You are now in a private chat with {others}"),
            )?;
        }

        let mut turns = 0;
        let mut next = Some(requester);
        while let Some(seat) = next {
            let i = member_index(&group, seat)?;
            self.private_chat_turn(&group, &names, i, turns == 0).await?;
            turns += 1;
            self.pace().await;
            next = self.roster.pick_active(&group, &mut self.rng);
        }

        self.moderator.narrate("The private chat is now over!");
        for (i, &seat) in group.iter().enumerate() {
            let others = others_of(&names, i);
            self.bridge.tell(
                &mut self.roster,
                seat,
                &format!(
                    "You have now finished the private chat with {others} and rejoined the other players"
                ),
            )?;
        }
        info!(turns, "Private chat ended");
        Ok(())
    }

    async fn private_chat_turn(
        &mut self,
        group: &[Seat],
        names: &[String],
        member: usize,
        first_turn: bool,
    ) -> Result<(), GameError> {
        let seat = group[member];
        let name = &names[member];
        let other_names: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != member)
            .map(|(_, n)| n.as_str())
            .collect();
        let prompt = prompts::private_chat_turn(&other_names, first_turn);
        let decision = self
            .bridge
            .send(&mut self.roster, seat, &prompt, PRIVATE_CHAT_ACTIONS)
            .await?;

        if let Decision::PrivateMessage { message } = decision {
            self.moderator
                .narrate(&format!("{name} -> {}: {message}", join_with_word(&other_names, "and")));
            let listeners: Vec<Seat> = group.iter().copied().filter(|s| *s != seat).collect();
            self.bridge.broadcast_to(
                &mut self.roster,
                &listeners,
                &format!("In your private chat, {name} says: {message}"),
            )?;
        }
        Ok(())
    }
}

/// Position of `seat` in the chat group.
fn member_index(group: &[Seat], seat: Seat) -> Result<usize, GameError> {
    group.iter().position(|s| *s == seat).ok_or_else(|| {
        GameError::Internal(anyhow::anyhow!(
            "seat {} picked for a private chat it is not part of",
            seat.0
        ))
    })
}

fn others_of(names: &[String], member: usize) -> String {
    let others: Vec<&str> = names
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != member)
        .map(|(_, n)| n.as_str())
        .collect();
    join_with_word(&others, "and")
}
