//! Moves text between the orchestrator and players.
//!
//! Every prompt, reply and broadcast goes through here so that a player's
//! chat history, action history and transcript never disagree.

use grimoire::actions::{validate, INTRODUCTION_ACTIONS};
use grimoire::{ActionKind, ChatTurn, Decision, Roster, Seat};
use tracing::{debug, info};

use crate::agent::{AgentClient, AgentRequest};
use crate::errors::GameError;
use crate::prompts;
use crate::transcript::{TranscriptRecord, TranscriptSink};

pub struct Bridge {
    client: AgentClient,
    transcripts: Box<dyn TranscriptSink>,
    system_instruction: String,
}

impl Bridge {
    pub fn new(
        client: AgentClient,
        transcripts: Box<dyn TranscriptSink>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            client,
            transcripts,
            system_instruction: system_instruction.into(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Prompt one player and return their validated decision.
    ///
    /// The prompt and reply always go to the transcript. Only a valid reply
    /// is appended to the player's chat history and action history.
    pub async fn send(
        &mut self,
        roster: &mut Roster,
        seat: Seat,
        prompt: &str,
        allowed: &[ActionKind],
    ) -> Result<Decision, GameError> {
        let name = roster.name(seat).to_string();
        let response = {
            let player = roster.get(seat);
            let request = AgentRequest {
                player: &name,
                system_instruction: &self.system_instruction,
                history: player.chat_history(),
                prompt,
                allowed_actions: allowed,
            };
            self.client.respond(&request).await?
        };

        // The transcript keeps the exchange even when the reply breaks protocol.
        self.transcripts
            .append(&name, &TranscriptRecord::storyteller(prompt))?;
        self.transcripts.append(
            &name,
            &TranscriptRecord::action(
                response.message.as_deref(),
                &response.action,
                &response.reasoning,
            ),
        )?;

        let decision = validate(&response, allowed).map_err(|v| GameError::violation(&name, v))?;
        let reply = serde_json::to_string(&response)
            .map_err(|e| GameError::Internal(anyhow::anyhow!("Failed to serialize reply: {e}")))?;

        let player = roster.get_mut(seat);
        player.push_turn(ChatTurn::user(prompt));
        player.push_turn(ChatTurn::model(reply));
        player.push_action(decision.kind());

        debug!(player = %name, action = %decision.kind(), "Decision recorded");
        Ok(decision)
    }

    /// Deliver `text` to one player.
    pub fn tell(&mut self, roster: &mut Roster, seat: Seat, text: &str) -> Result<(), GameError> {
        roster.record_heard(seat, text);
        self.transcripts
            .append(roster.name(seat), &TranscriptRecord::heard(text))
    }

    /// Deliver `text` to every seated player not in `exclude`.
    pub fn broadcast(
        &mut self,
        roster: &mut Roster,
        text: &str,
        exclude: &[Seat],
    ) -> Result<(), GameError> {
        let recipients: Vec<Seat> = roster.seats().filter(|s| !exclude.contains(s)).collect();
        self.broadcast_to(roster, &recipients, text)
    }

    /// Deliver `text` to exactly the players in `group`.
    pub fn broadcast_to(
        &mut self,
        roster: &mut Roster,
        group: &[Seat],
        text: &str,
    ) -> Result<(), GameError> {
        for &seat in group {
            self.tell(roster, seat, text)?;
        }
        Ok(())
    }

    /// Open each player's transcript and introduce them to the table.
    pub async fn initialize_players(&mut self, roster: &mut Roster) -> Result<(), GameError> {
        let names: Vec<String> = roster.players().iter().map(|p| p.name().to_string()).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

        for seat in roster.seats().collect::<Vec<_>>() {
            self.transcripts.open(&names[seat.0])?;
            let prompt = prompts::introduction(&name_refs, seat.0, roster.get(seat).token());
            self.send(roster, seat, &prompt, INTRODUCTION_ACTIONS).await?;
            info!(player = %names[seat.0], token = roster.get(seat).token(), "Player introduced");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use grimoire::actions::VOTE_ACTIONS;
    use grimoire::{ChatRole, Player};

    use super::*;
    use crate::agent::PlayerAgent;
    use crate::transcript::{MemoryTranscript, RecordKind};

    struct Fixed(&'static str);

    #[async_trait]
    impl PlayerAgent for Fixed {
        fn backend(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _request: &AgentRequest<'_>) -> Result<String, GameError> {
            Ok(self.0.to_string())
        }
    }

    fn setup(reply: &'static str) -> (Bridge, Roster, MemoryTranscript) {
        let transcripts = MemoryTranscript::new();
        let bridge = Bridge::new(
            AgentClient::new(Box::new(Fixed(reply)), 1),
            Box::new(transcripts.clone()),
            "rules",
        );
        let roster = Roster::new(vec![
            Player::new("Maya", "Empath"),
            Player::new("Harper", "Baron"),
            Player::new("Anne", "Imp").with_token_shown("Sage"),
        ])
        .unwrap();
        (bridge, roster, transcripts)
    }

    #[tokio::test]
    async fn test_send_records_history_and_transcript() {
        let (mut bridge, mut roster, transcripts) =
            setup(r#"{"reasoning":"sure","action":"vote"}"#);
        let decision = bridge
            .send(&mut roster, Seat(0), "Vote for Anne?", VOTE_ACTIONS)
            .await
            .unwrap();
        assert_eq!(decision, Decision::Vote);

        let maya = roster.get(Seat(0));
        assert_eq!(maya.chat_history().len(), 2);
        assert_eq!(maya.chat_history()[0].text, "Vote for Anne?");
        assert_eq!(maya.chat_history()[1].role, ChatRole::Model);
        assert_eq!(maya.last_action(), Some(ActionKind::Vote));

        let records = transcripts.records("Maya");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RecordKind::Storyteller);
        assert_eq!(records[1].action, "vote");
        assert_eq!(records[1].reasoning, "sure");
    }

    #[tokio::test]
    async fn test_violation_leaves_history_untouched_but_is_transcribed() {
        let (mut bridge, mut roster, transcripts) =
            setup(r#"{"reasoning":"hm","action":"announcement"}"#);
        let err = bridge
            .send(
                &mut roster,
                Seat(1),
                "Speak",
                &[ActionKind::Announcement, ActionKind::Idle],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::ProtocolViolation { .. }));
        assert!(roster.get(Seat(1)).chat_history().is_empty());
        assert!(roster.get(Seat(1)).action_history().is_empty());

        let records = transcripts.records("Harper");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, RecordKind::Storyteller);
        assert_eq!(records[0].message, "Speak");
        assert_eq!(records[1].kind, RecordKind::Action);
        assert_eq!(records[1].action, "announcement");
        assert_eq!(records[1].reasoning, "hm");
    }

    #[tokio::test]
    async fn test_broadcast_excludes_actor() {
        let (mut bridge, mut roster, transcripts) = setup("{}");
        bridge
            .broadcast(&mut roster, "Maya has made the announcement: hi", &[Seat(0)])
            .unwrap();
        assert!(roster.get(Seat(0)).chat_history().is_empty());
        assert_eq!(
            roster.get(Seat(2)).last_action(),
            Some(ActionKind::HearMessage)
        );
        assert_eq!(transcripts.records("Harper")[0].kind, RecordKind::Message);
    }

    #[tokio::test]
    async fn test_initialize_uses_shown_token() {
        let (mut bridge, mut roster, transcripts) = setup(r#"{"reasoning":"ok","action":"idle"}"#);
        bridge.initialize_players(&mut roster).await.unwrap();
        let anne = &roster.get(Seat(2)).chat_history()[0].text;
        assert!(anne.contains("You have been given the Sage token."));
        assert!(roster.players().iter().all(|p| p.just_idled()));
        assert_eq!(transcripts.records("Harper").len(), 2);
    }
}
