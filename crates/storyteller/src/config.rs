//! Runtime configuration: environment, setup file, rule switches, pacing.
//!
//! Environment variables (all optional except the Gemini key when that
//! backend is used):
//!
//! | Variable                | Default                     |
//! |-------------------------|-----------------------------|
//! | `GEMINI_API_KEY`        | —                           |
//! | `STORYTELLER_MODEL`     | per backend (see below)     |
//! | `STORYTELLER_BASE_URL`  | `http://localhost:8080/v1`  |
//! | `STORYTELLER_API_KEY`   | `local`                     |
//! | `STORYTELLER_DATA_DIR`  | `data`                      |
//!
//! Without `STORYTELLER_MODEL`, Gemini uses `gemini-2.0-flash` and the
//! OpenAI-compatible backend uses `local-model`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use grimoire::{role::role_slug, CheckpointCadence, GrimoireResult, Player, Roster};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ── Agent backend ──────────────────────────────────────────────────────

/// Which HTTP API the player agents talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Gemini `generateContent` with a response schema.
    Gemini,
    /// Any OpenAI-compatible `chat/completions` server in JSON mode.
    Openai,
}

impl Backend {
    /// Model used when `STORYTELLER_MODEL` is not set.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::Openai => "local-model",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Openai => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub backend: Backend,
    pub model: String,
    /// Base URL for the OpenAI-compatible backend.
    pub base_url: String,
    /// Gemini key, or bearer token for the OpenAI-compatible backend.
    pub api_key: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::for_backend(Backend::Gemini)
    }
}

impl AgentConfig {
    pub fn for_backend(backend: Backend) -> Self {
        let api_key = match backend {
            Backend::Gemini => std::env::var("GEMINI_API_KEY").ok(),
            Backend::Openai => Some(
                std::env::var("STORYTELLER_API_KEY").unwrap_or_else(|_| "local".into()),
            ),
        };
        Self {
            backend,
            model: std::env::var("STORYTELLER_MODEL")
                .unwrap_or_else(|_| backend.default_model().into()),
            base_url: std::env::var("STORYTELLER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
            api_key,
            temperature: 0.8,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            max_attempts: 3,
            timeout: Duration::from_secs(120),
        }
    }
}

// ── Rules and pacing ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesConfig {
    pub cadence: CheckpointCadence,
    /// Flip a dead voter to dead-without-vote after they vote.
    pub consume_ghost_votes: bool,
    /// Remove `nominate` from a player's whitelist once they have used it.
    pub one_nomination_per_day: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            cadence: CheckpointCadence::default(),
            consume_ghost_votes: false,
            one_nomination_per_day: true,
        }
    }
}

/// Random pause before each open-floor turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(8000),
        }
    }
}

impl Pacing {
    /// No delay at all.
    pub fn none() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Uniform in `[min_delay, max_delay]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

// ── Game setup file ────────────────────────────────────────────────────

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    pub role: String,
    /// Token shown to the player instead of their actual role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_shown: Option<String>,
}

/// Seating order and script, loaded from TOML:
///
/// ```toml
/// script = ["investigator", "empath", "imp"]
///
/// [[players]]
/// name = "Maya"
/// role = "Empath"
///
/// [[players]]
/// name = "Ziggy"
/// role = "Drunk"
/// token_shown = "Investigator"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub script: Vec<String>,
    pub players: Vec<SeatConfig>,
}

impl Default for GameSetup {
    fn default() -> Self {
        let seat = |name: &str, role: &str, token: Option<&str>| SeatConfig {
            name: name.into(),
            role: role.into(),
            token_shown: token.map(String::from),
        };
        Self {
            script: [
                "investigator",
                "clockmaker",
                "empath",
                "chambermaid",
                "artist",
                "sage",
                "drunk",
                "klutz",
                "baron",
                "scarlet-woman",
                "imp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            players: vec![
                seat("Maya", "Chambermaid", None),
                seat("Harper", "Baron", None),
                seat("Arun", "Klutz", None),
                seat("Anne", "Imp", None),
                seat("Ziggy", "Drunk", Some("Investigator")),
                seat("Joanna", "Artist", None),
            ],
        }
    }
}

impl GameSetup {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let setup: GameSetup = toml::from_str(content).context("Failed to parse game setup TOML")?;
        if setup.players.is_empty() {
            anyhow::bail!("Game setup has no players");
        }
        Ok(setup)
    }

    /// Every role the game needs from the catalog: the script, each actual
    /// role, and each shown token, deduplicated by slug.
    pub fn required_roles(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.script
            .iter()
            .chain(self.players.iter().map(|p| &p.role))
            .chain(self.players.iter().filter_map(|p| p.token_shown.as_ref()))
            .filter(|name| seen.insert(role_slug(name)))
            .cloned()
            .collect()
    }

    pub fn roster(&self) -> GrimoireResult<Roster> {
        Roster::new(
            self.players
                .iter()
                .map(|seat| {
                    let player = Player::new(&seat.name, &seat.role);
                    match &seat.token_shown {
                        Some(token) => player.with_token_shown(token),
                        None => player,
                    }
                })
                .collect(),
        )
    }
}

// ── Top-level ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Holds `roles/` and `prompts/`.
    pub data_dir: PathBuf,
    pub transcripts_dir: PathBuf,
    pub agent: AgentConfig,
    pub rules: RulesConfig,
    pub pacing: Pacing,
    pub seed: Option<u64>,
    /// Print a reminder when the moderator has been silent this long.
    pub moderator_reminder: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let data_dir =
            PathBuf::from(std::env::var("STORYTELLER_DATA_DIR").unwrap_or_else(|_| "data".into()));
        Self {
            transcripts_dir: data_dir.join("generated"),
            data_dir,
            agent: AgentConfig::default(),
            rules: RulesConfig::default(),
            pacing: Pacing::default(),
            seed: None,
            moderator_reminder: None,
        }
    }
}

impl GameConfig {
    pub fn roles_dir(&self) -> PathBuf {
        self.data_dir.join("roles")
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.data_dir.join("prompts")
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_default_setup_matches_script() {
        let setup = GameSetup::default();
        assert_eq!(setup.players.len(), 6);
        assert_eq!(setup.script.len(), 11);
        let roster = setup.roster().unwrap();
        let ziggy = roster.get(roster.find("ziggy").unwrap());
        assert_eq!(ziggy.token(), "Investigator");
        assert_eq!(ziggy.actual_role(), "Drunk");
    }

    #[test]
    fn test_required_roles_dedup_by_slug() {
        let setup = GameSetup::default();
        let roles = setup.required_roles();
        // Every player role and token is already on the script.
        assert_eq!(roles.len(), 11);
        assert!(roles.iter().any(|r| r == "scarlet-woman"));
    }

    #[test]
    fn test_parse_setup_toml() {
        let setup = GameSetup::from_toml(
            r#"
script = ["empath", "imp"]

[[players]]
name = "Maya"
role = "Empath"

[[players]]
name = "Anne"
role = "Imp"
token_shown = "Empath"
"#,
        )
        .unwrap();
        assert_eq!(setup.players.len(), 2);
        assert_eq!(setup.players[1].token_shown.as_deref(), Some("Empath"));
        assert_eq!(setup.required_roles(), ["empath", "imp"]);
    }

    #[test]
    fn test_setup_without_players_is_rejected() {
        let err = GameSetup::from_toml("script = [\"imp\"]\nplayers = []\n").unwrap_err();
        assert!(err.to_string().contains("no players"));
    }

    #[test]
    fn test_setup_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GameSetup::from_file(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_pacing_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let pacing = Pacing::default();
        for _ in 0..100 {
            let d = pacing.sample(&mut rng);
            assert!(d >= pacing.min_delay && d <= pacing.max_delay);
        }
        assert_eq!(Pacing::none().sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn test_model_default_follows_backend() {
        assert_eq!(Backend::Gemini.default_model(), "gemini-2.0-flash");
        assert_eq!(Backend::Openai.default_model(), "local-model");
        if std::env::var("STORYTELLER_MODEL").is_err() {
            assert_eq!(AgentConfig::for_backend(Backend::Openai).model, "local-model");
            assert_eq!(AgentConfig::for_backend(Backend::Gemini).model, "gemini-2.0-flash");
        }
    }

    #[test]
    fn test_rules_defaults() {
        let rules = RulesConfig::default();
        assert_eq!(rules.cadence.discussion_every, 6);
        assert_eq!(rules.cadence.nomination_discussion_every, 3);
        assert!(!rules.consume_ghost_votes);
        assert!(rules.one_nomination_per_day);
    }
}
