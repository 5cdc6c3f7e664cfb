//! Per-player append-only transcripts.
//!
//! Each player gets one CSV file with the columns
//! `Type,Message,Action,Reasoning`. The orchestrator never reads these back.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use crate::errors::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    /// A prompt sent to the player's agent.
    Storyteller,
    /// The agent's reply.
    Action,
    /// A broadcast the player heard.
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptRecord {
    #[serde(rename = "Type")]
    pub kind: RecordKind,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Reasoning")]
    pub reasoning: String,
}

impl TranscriptRecord {
    pub fn storyteller(prompt: &str) -> Self {
        Self {
            kind: RecordKind::Storyteller,
            message: prompt.to_string(),
            action: String::new(),
            reasoning: String::new(),
        }
    }

    pub fn action(message: Option<&str>, action: &str, reasoning: &str) -> Self {
        Self {
            kind: RecordKind::Action,
            message: message.unwrap_or_default().to_string(),
            action: action.to_string(),
            reasoning: reasoning.to_string(),
        }
    }

    pub fn heard(message: &str) -> Self {
        Self {
            kind: RecordKind::Message,
            message: message.to_string(),
            action: String::new(),
            reasoning: String::new(),
        }
    }
}

/// Where transcript records go.
pub trait TranscriptSink: Send {
    /// Start a fresh transcript for `player`, discarding any previous one.
    fn open(&mut self, player: &str) -> Result<(), GameError>;

    fn append(&mut self, player: &str, record: &TranscriptRecord) -> Result<(), GameError>;
}

// ── CSV files ──────────────────────────────────────────────────────────

pub struct CsvTranscript {
    dir: PathBuf,
}

const HEADER: [&str; 4] = ["Type", "Message", "Action", "Reasoning"];

impl CsvTranscript {
    /// Write transcripts under `dir`, creating it if needed.
    pub fn new(dir: &Path) -> Result<Self, GameError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            GameError::Transcript(format!("Failed to create {}: {e}", dir.display()))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// File for `player`, always directly inside the transcript directory.
    pub fn path_for(&self, player: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(player)))
    }

    fn writer(&self, player: &str, truncate: bool) -> Result<csv::Writer<std::fs::File>, GameError> {
        let path = self.path_for(player);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(&path)
            .map_err(|e| GameError::Transcript(format!("Failed to open {}: {e}", path.display())))?;
        Ok(WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(file))
    }
}

/// Player name reduced to characters that are safe in a file name.
/// Separators and dots become `_`, so the name cannot leave the directory.
fn file_stem(player: &str) -> String {
    let stem: String = player
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "player".to_string()
    } else {
        stem
    }
}

impl TranscriptSink for CsvTranscript {
    fn open(&mut self, player: &str) -> Result<(), GameError> {
        let mut writer = self.writer(player, true)?;
        writer.write_record(HEADER)?;
        writer
            .flush()
            .map_err(|e| GameError::Transcript(e.to_string()))?;
        debug!(player, path = %self.path_for(player).display(), "Opened transcript");
        Ok(())
    }

    fn append(&mut self, player: &str, record: &TranscriptRecord) -> Result<(), GameError> {
        let mut writer = self.writer(player, false)?;
        writer.serialize(record)?;
        writer
            .flush()
            .map_err(|e| GameError::Transcript(e.to_string()))
    }
}

// ── In memory ──────────────────────────────────────────────────────────

/// Keeps records in memory. Clones share the same storage, so a handle can
/// be kept for inspection after the sink is moved into a game.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    records: Arc<Mutex<HashMap<String, Vec<TranscriptRecord>>>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one player's records.
    pub fn records(&self, player: &str) -> Vec<TranscriptRecord> {
        self.records
            .lock()
            .map(|map| map.get(player).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl TranscriptSink for MemoryTranscript {
    fn open(&mut self, player: &str) -> Result<(), GameError> {
        let mut map = self
            .records
            .lock()
            .map_err(|_| GameError::Transcript("transcript lock poisoned".into()))?;
        map.insert(player.to_string(), Vec::new());
        Ok(())
    }

    fn append(&mut self, player: &str, record: &TranscriptRecord) -> Result<(), GameError> {
        let mut map = self
            .records
            .lock()
            .map_err(|_| GameError::Transcript("transcript lock poisoned".into()))?;
        map.entry(player.to_string()).or_default().push(record.clone());
        Ok(())
    }
}
