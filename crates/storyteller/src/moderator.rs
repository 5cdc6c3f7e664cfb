//! The human storyteller: reads decisions and receives public narration.
//!
//! Menus re-prompt on anything unrecognised; nothing here ever picks a
//! default on the moderator's behalf.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use grimoire::{join_with_word, Roster, Seat};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

use crate::errors::GameError;

#[async_trait]
pub trait Moderator: Send {
    /// Show `prompt` and wait for one line of input.
    async fn ask(&mut self, prompt: &str) -> Result<String, GameError>;

    /// Public narration for the moderator's eyes.
    fn narrate(&mut self, text: &str);
}

// ── Menus ──────────────────────────────────────────────────────────────

/// Ask until the answer is one of `keys` (case-insensitive, single letter).
pub async fn choose(
    moderator: &mut dyn Moderator,
    prompt: &str,
    keys: &[char],
) -> Result<char, GameError> {
    loop {
        let answer = moderator.ask(prompt).await?;
        let mut chars = answer.trim().chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            let c = c.to_ascii_uppercase();
            if keys.contains(&c) {
                debug!(choice = %c, "Moderator chose");
                return Ok(c);
            }
        }
        let options: Vec<String> = keys.iter().map(|k| format!("[{k}]")).collect();
        let message = format!("You must choose {}!", join_with_word(&options, "or"));
        warn!(input = %answer.trim(), "Unrecognised moderator choice");
        moderator.narrate(&message);
    }
}

/// Ask for a yes/no answer.
pub async fn confirm(moderator: &mut dyn Moderator, prompt: &str) -> Result<bool, GameError> {
    Ok(choose(moderator, prompt, &['Y', 'N']).await? == 'Y')
}

/// Ask for a seated player's name until one matches.
pub async fn select_player(
    moderator: &mut dyn Moderator,
    roster: &Roster,
    prompt: &str,
) -> Result<Seat, GameError> {
    let names: Vec<&str> = roster.players().iter().map(|p| p.name()).collect();
    let full_prompt = format!("{prompt} ({}): ", join_with_word(&names, "or"));
    loop {
        let answer = moderator.ask(&full_prompt).await?;
        if let Some(seat) = roster.find(&answer) {
            return Ok(seat);
        }
        warn!(input = %answer.trim(), "Unknown player name from moderator");
        moderator.narrate(&format!(
            "Invalid player name \"{}\"! Please try again...",
            answer.trim()
        ));
    }
}

// ── Standard input ─────────────────────────────────────────────────────

/// Reads answers from stdin and prints narration to stdout.
pub struct StdinModerator {
    lines: Lines<BufReader<Stdin>>,
    reminder: Option<Duration>,
}

impl StdinModerator {
    pub fn new(reminder: Option<Duration>) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            reminder: reminder.filter(|d| !d.is_zero()),
        }
    }

    async fn next_line(&mut self) -> Result<String, GameError> {
        let Some(every) = self.reminder else {
            return read_line(&mut self.lines).await;
        };
        loop {
            // `next_line` is cancel safe, so a timed-out read loses nothing.
            match tokio::time::timeout(every, read_line(&mut self.lines)).await {
                Ok(line) => return line,
                Err(_) => println!("(The players are waiting for the storyteller...)"),
            }
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<String, GameError> {
    lines
        .next_line()
        .await
        .map_err(|e| GameError::Internal(anyhow::anyhow!("Failed to read stdin: {e}")))?
        .ok_or(GameError::ModeratorClosed)
}

/// Print the question and the input marker, flushed so the marker shows
/// before the read blocks.
fn write_prompt<W: Write>(out: &mut W, prompt: &str) -> Result<(), GameError> {
    writeln!(out, "{prompt}")
        .and_then(|_| write!(out, "> "))
        .and_then(|_| out.flush())
        .map_err(|e| GameError::Internal(anyhow::anyhow!("Failed to write prompt: {e}")))
}

#[async_trait]
impl Moderator for StdinModerator {
    async fn ask(&mut self, prompt: &str) -> Result<String, GameError> {
        write_prompt(&mut std::io::stdout().lock(), prompt)?;
        let line = self.next_line().await?;
        Ok(line.trim().to_string())
    }

    fn narrate(&mut self, text: &str) {
        println!("{text}");
    }
}
