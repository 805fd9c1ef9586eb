use super::document::{ComprehensiveSummary, FieldValue, SummaryField};
use crate::error::HistoryImportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Version tag written into, and required from, every exported history.
pub const HISTORY_VERSION: &str = "1.0";

/// One atomic edit of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementEntry {
    /// Epoch milliseconds; strictly increasing along the log.
    pub timestamp: i64,
    pub section: SummaryField,
    pub instruction: String,
    pub previous_content: FieldValue,
    pub updated_content: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedHistory {
    pub version: String,
    pub timestamp: i64,
    pub initial_summary: ComprehensiveSummary,
    pub history: Vec<RefinementEntry>,
    pub current_summary: ComprehensiveSummary,
}

/// Wire form with every field optional, so absence is reported by name.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExport {
    version: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    initial_summary: Option<ComprehensiveSummary>,
    history: Option<Vec<RefinementEntry>>,
    current_summary: Option<ComprehensiveSummary>,
}

impl ExportedHistory {
    pub fn from_json(raw: &str) -> Result<Self, HistoryImportError> {
        let parsed: RawExport = serde_json::from_str(raw)
            .map_err(|e| HistoryImportError::Malformed(e.to_string()))?;

        let version = parsed
            .version
            .ok_or(HistoryImportError::MissingField("version"))?;
        let snapshot = Self {
            version,
            timestamp: parsed.timestamp.unwrap_or_default(),
            initial_summary: parsed
                .initial_summary
                .ok_or(HistoryImportError::MissingField("initialSummary"))?,
            history: parsed
                .history
                .ok_or(HistoryImportError::MissingField("history"))?,
            current_summary: parsed
                .current_summary
                .ok_or(HistoryImportError::MissingField("currentSummary"))?,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed serializing refinement history")
    }

    /// Version match, per-entry value kinds, strictly increasing timestamps.
    pub fn validate(&self) -> Result<(), HistoryImportError> {
        if self.version != HISTORY_VERSION {
            return Err(HistoryImportError::VersionMismatch {
                expected: HISTORY_VERSION.to_string(),
                found: self.version.clone(),
            });
        }

        for entry in &self.history {
            let expected = entry.section.kind();
            if entry.previous_content.kind() != expected || entry.updated_content.kind() != expected
            {
                return Err(HistoryImportError::Malformed(format!(
                    "entry {} holds the wrong value kind for {}",
                    entry.timestamp, entry.section
                )));
            }
        }

        if self
            .history
            .windows(2)
            .any(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(HistoryImportError::NonMonotonicTimestamps);
        }

        Ok(())
    }
}

/// Write the snapshot as pretty JSON, replacing the target atomically.
pub fn save_history(path: &Path, snapshot: &ExportedHistory) -> Result<()> {
    let content = snapshot.to_json()?;
    write_atomic(path, &content)
}

pub fn load_history(path: &Path) -> Result<ExportedHistory> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading history: {}", path.display()))?;
    ExportedHistory::from_json(&raw)
        .with_context(|| format!("failed importing history: {}", path.display()))
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating history parent: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("failed writing history temp file: {}", temp_path.display()))?;

    if let Err(rename_error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(rename_error).with_context(|| {
            format!("failed replacing history file atomically: {}", path.display())
        });
    }

    Ok(())
}
