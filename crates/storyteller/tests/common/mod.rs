//! Hand-written fakes for driving a whole game without a network or a human.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grimoire::{Player, Role, RoleCatalog, Roster, Team};
use serde_json::json;
use storyteller::agent::{AgentClient, AgentRequest, PlayerAgent};
use storyteller::bridge::Bridge;
use storyteller::config::{Pacing, RulesConfig};
use storyteller::moderator::Moderator;
use storyteller::transcript::MemoryTranscript;
use storyteller::{Game, GameError, GameOptions};

// ── Agent replies ──────────────────────────────────────────────────────

pub fn idle() -> String {
    reply("idle")
}

/// A reply that carries nothing but an action.
pub fn reply(action: &str) -> String {
    json!({ "reasoning": "Weighing it up.", "action": action }).to_string()
}

pub fn act(action: &str, message: &str) -> String {
    json!({ "reasoning": "Time to speak.", "action": action, "message": message }).to_string()
}

pub fn act_on(action: &str, message: &str, players: &[&str]) -> String {
    json!({
        "reasoning": "Acting on a player.",
        "action": action,
        "message": message,
        "players": players,
    })
    .to_string()
}

// ── Scripted agent ─────────────────────────────────────────────────────

/// Every prompt an agent received, as `(player, prompt)`.
#[derive(Clone, Default)]
pub struct PromptLog(Arc<Mutex<Vec<(String, String)>>>);

impl PromptLog {
    pub fn all(&self) -> Vec<(String, String)> {
        self.0.lock().unwrap().clone()
    }

    /// Players who were sent a prompt starting with `prefix`, in order.
    pub fn players_prompted(&self, prefix: &str) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(_, prompt)| prompt.starts_with(prefix))
            .map(|(player, _)| player)
            .collect()
    }
}

type Policy = dyn Fn(&str, &str) -> String + Send + Sync;

/// Answers each prompt with `policy(player, prompt)`.
pub struct ScriptedAgent {
    policy: Box<Policy>,
    log: PromptLog,
}

impl ScriptedAgent {
    pub fn new(policy: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> (Self, PromptLog) {
        let log = PromptLog::default();
        let agent = Self {
            policy: Box::new(policy),
            log: log.clone(),
        };
        (agent, log)
    }
}

#[async_trait]
impl PlayerAgent for ScriptedAgent {
    fn backend(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &AgentRequest<'_>) -> Result<String, GameError> {
        self.log
            .0
            .lock()
            .unwrap()
            .push((request.player.to_string(), request.prompt.to_string()));
        Ok((self.policy)(request.player, request.prompt))
    }
}

// ── Scripted moderator ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ModeratorLog {
    asked: Arc<Mutex<Vec<String>>>,
    narrated: Arc<Mutex<Vec<String>>>,
}

impl ModeratorLog {
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn narrated(&self) -> Vec<String> {
        self.narrated.lock().unwrap().clone()
    }

    pub fn heard(&self, text: &str) -> bool {
        self.narrated().iter().any(|line| line.contains(text))
    }
}

/// Plays back a fixed list of answers; running out closes the input.
pub struct ScriptedModerator {
    answers: VecDeque<String>,
    log: ModeratorLog,
}

impl ScriptedModerator {
    pub fn new(answers: &[&str]) -> (Self, ModeratorLog) {
        let log = ModeratorLog::default();
        let moderator = Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            log: log.clone(),
        };
        (moderator, log)
    }
}

#[async_trait]
impl Moderator for ScriptedModerator {
    async fn ask(&mut self, prompt: &str) -> Result<String, GameError> {
        self.log.asked.lock().unwrap().push(prompt.to_string());
        self.answers.pop_front().ok_or(GameError::ModeratorClosed)
    }

    fn narrate(&mut self, text: &str) {
        self.log.narrated.lock().unwrap().push(text.to_string());
    }
}

// ── Table ──────────────────────────────────────────────────────────────

pub fn catalog() -> RoleCatalog {
    RoleCatalog::from_roles([
        Role::new("Empath", Team::Townsfolk, "Learn how many evil neighbours you have."),
        Role::new("Chambermaid", Team::Townsfolk, "Learn who woke tonight."),
        Role::new("Investigator", Team::Townsfolk, "Learn one of two players is a Minion."),
        Role::new("Artist", Team::Townsfolk, "Ask the storyteller one question."),
        Role::new("Klutz", Team::Outsider, "When you learn you died, choose a player."),
        Role::new("Drunk", Team::Outsider, "You think you are a Townsfolk."),
        Role::new("Baron", Team::Minion, "There are extra Outsiders in play."),
        Role::new("Imp", Team::Demon, "Each night, choose a player: they die."),
    ])
}

/// `(name, role)` pairs in seat order.
pub fn roster(seats: &[(&str, &str)]) -> Roster {
    Roster::new(
        seats
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect(),
    )
    .unwrap()
}

pub fn six_players() -> Roster {
    roster(&[
        ("Maya", "Chambermaid"),
        ("Harper", "Baron"),
        ("Arun", "Klutz"),
        ("Anne", "Imp"),
        ("Ziggy", "Drunk"),
        ("Joanna", "Artist"),
    ])
}

pub struct Harness {
    pub game: Game,
    pub prompts: PromptLog,
    pub moderator: ModeratorLog,
    pub transcripts: MemoryTranscript,
}

pub fn harness(
    roster: Roster,
    rules: RulesConfig,
    answers: &[&str],
    policy: impl Fn(&str, &str) -> String + Send + Sync + 'static,
) -> Harness {
    let (agent, prompts) = ScriptedAgent::new(policy);
    let (moderator, moderator_log) = ScriptedModerator::new(answers);
    let transcripts = MemoryTranscript::new();
    let bridge = Bridge::new(
        AgentClient::new(Box::new(agent), 3),
        Box::new(transcripts.clone()),
        "You are playing a social deduction game.",
    );
    let game = Game::new(
        roster,
        catalog(),
        bridge,
        Box::new(moderator),
        GameOptions {
            rules,
            pacing: Pacing::none(),
            seed: Some(7),
        },
    );
    Harness {
        game,
        prompts,
        moderator: moderator_log,
        transcripts,
    }
}
