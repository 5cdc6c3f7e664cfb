use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use grimoire::{NominationCadence, RoleCatalog};
use storyteller::agent::{self, AgentClient};
use storyteller::bridge::Bridge;
use storyteller::config::{AgentConfig, Backend, GameConfig, GameSetup};
use storyteller::moderator::StdinModerator;
use storyteller::prompts;
use storyteller::transcript::CsvTranscript;
use storyteller::{Game, GameOptions};
use tracing::info;

/// How often the moderator is offered a checkpoint once nominations open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CadenceArg {
    /// Every `--nomination-checkpoint-every` non-idle turns.
    EveryNth,
    /// Every turn with nobody on the block, otherwise every other turn.
    NoStandingOrEven,
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game setup TOML (seating and script); the built-in table is used if omitted
    #[arg(long)]
    setup: Option<PathBuf>,

    /// Directory holding `roles/` and `prompts/` (overrides STORYTELLER_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Where per-player CSV transcripts are written (default: <data-dir>/generated)
    #[arg(long)]
    transcripts_dir: Option<PathBuf>,

    /// Player agent backend
    #[arg(long, value_enum, default_value_t = Backend::Gemini)]
    backend: Backend,

    /// Model name (overrides STORYTELLER_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Seed for turn selection and pacing
    #[arg(long)]
    seed: Option<u64>,

    /// Shortest pause before an open-floor turn
    #[arg(long)]
    min_delay_ms: Option<u64>,

    /// Longest pause before an open-floor turn
    #[arg(long)]
    max_delay_ms: Option<u64>,

    /// Checkpoint cadence once nominations are open
    #[arg(long, value_enum, default_value_t = CadenceArg::EveryNth)]
    nomination_cadence: CadenceArg,

    /// Turn interval for `--nomination-cadence every-nth`
    #[arg(long, default_value_t = 4)]
    nomination_checkpoint_every: u32,

    /// Dead players lose their ghost vote once they use it
    #[arg(long, default_value_t = false)]
    consume_ghost_votes: bool,

    /// Print a reminder after this many seconds without moderator input
    #[arg(long)]
    moderator_reminder_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> (GameConfig, Option<PathBuf>) {
        let mut config = GameConfig::default();
        if let Some(dir) = self.data_dir {
            config.transcripts_dir = dir.join("generated");
            config.data_dir = dir;
        }
        if let Some(dir) = self.transcripts_dir {
            config.transcripts_dir = dir;
        }

        config.agent = AgentConfig::for_backend(self.backend);
        if let Some(model) = self.model {
            config.agent.model = model;
        }

        config.rules.cadence.nominations = match self.nomination_cadence {
            CadenceArg::EveryNth => NominationCadence::EveryNth(self.nomination_checkpoint_every),
            CadenceArg::NoStandingOrEven => NominationCadence::NoStandingOrEven,
        };
        config.rules.consume_ghost_votes = self.consume_ghost_votes;

        if let Some(ms) = self.min_delay_ms {
            config.pacing.min_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            config.pacing.max_delay = Duration::from_millis(ms);
        }
        config.seed = self.seed;
        config.moderator_reminder = self.moderator_reminder_secs.map(Duration::from_secs);

        (config, self.setup)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, setup_path) = Args::parse().into_config();
    let setup = match &setup_path {
        Some(path) => GameSetup::from_file(path)?,
        None => GameSetup::default(),
    };

    let catalog = RoleCatalog::load(&config.roles_dir(), &setup.required_roles())
        .context("Failed to load role catalog")?;
    let roster = setup.roster().context("Invalid seating")?;
    let system_instruction =
        prompts::load_system_instruction(&config.prompts_dir(), &catalog, &setup.script)?;

    info!(
        backend = %config.agent.backend,
        model = %config.agent.model,
        players = roster.len(),
        roles = catalog.len(),
        transcripts = %config.transcripts_dir.display(),
        "Storyteller starting"
    );

    let client = AgentClient::new(agent::from_config(&config.agent)?, config.agent.max_attempts);
    let transcripts = CsvTranscript::new(&config.transcripts_dir)?;
    let bridge = Bridge::new(client, Box::new(transcripts), system_instruction);
    let moderator = StdinModerator::new(config.moderator_reminder);

    let mut game = Game::new(
        roster,
        catalog,
        bridge,
        Box::new(moderator),
        GameOptions {
            rules: config.rules,
            pacing: config.pacing,
            seed: config.seed,
        },
    );
    let status = game.run().await?;
    info!(%status, phases = %game.phase_summary(), "Game over");
    Ok(())
}
