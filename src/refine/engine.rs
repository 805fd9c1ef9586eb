use super::document::{ComprehensiveSummary, SummaryField};
use super::history::{ExportedHistory, HISTORY_VERSION, RefinementEntry};
use super::prompt::{REFINE_SYSTEM_PROMPT, build_refine_prompt, field_shape};
use super::repair::repair_response;
use crate::error::{Result, StateError};
use crate::llm::TextGenerator;
use crate::observability::{Observer, ObserverEvent};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Versioned owner of one analysis document and its edit log.
///
/// Single-writer: callers serialize access to one engine themselves.
pub struct RefinementEngine {
    generator: Arc<dyn TextGenerator>,
    observer: Arc<dyn Observer>,
    initial: Option<ComprehensiveSummary>,
    current: Option<ComprehensiveSummary>,
    history: Vec<RefinementEntry>,
}

impl RefinementEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, observer: Arc<dyn Observer>) -> Self {
        Self {
            generator,
            observer,
            initial: None,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn with_summary(
        generator: Arc<dyn TextGenerator>,
        observer: Arc<dyn Observer>,
        initial: ComprehensiveSummary,
    ) -> Self {
        let mut engine = Self::new(generator, observer);
        engine.load_summary(initial);
        engine
    }

    /// Seed (or re-seed) the engine; the log starts empty.
    pub fn load_summary(&mut self, initial: ComprehensiveSummary) {
        self.current = Some(initial.clone());
        self.initial = Some(initial);
        self.history.clear();
    }

    pub fn current(&self) -> Option<&ComprehensiveSummary> {
        self.current.as_ref()
    }

    pub fn initial(&self) -> Option<&ComprehensiveSummary> {
        self.initial.as_ref()
    }

    pub fn history(&self) -> &[RefinementEntry] {
        &self.history
    }

    /// Rewrite one field from a free-text instruction.
    ///
    /// Nothing is written unless generation and repair both succeed.
    pub async fn refine_section(
        &mut self,
        section: SummaryField,
        instruction: &str,
    ) -> Result<&ComprehensiveSummary> {
        let started = Instant::now();
        let current = self.current.as_ref().ok_or(StateError::NoSummary)?;
        let previous_content = current.get(section);
        let prompt = build_refine_prompt(section, instruction, current, &self.history);
        let shape = field_shape(section);
        let field_name = section.to_string();

        let raw = match self
            .generator
            .generate(REFINE_SYSTEM_PROMPT, &prompt, &shape)
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                self.report_error(&err.to_string());
                return Err(err.into());
            }
        };

        let updated_content =
            match repair_response(&raw, &field_name).and_then(|v| v.into_field_value(section)) {
                Ok(value) => value,
                Err(err) => {
                    self.report_error(&err.to_string());
                    return Err(err.into());
                }
            };

        let mut next = current.clone();
        next.set(section, updated_content.clone())?;

        let entry = RefinementEntry {
            timestamp: self.next_timestamp(),
            section,
            instruction: instruction.to_string(),
            previous_content,
            updated_content,
        };
        self.history.push(entry);
        self.observer.record_event(&ObserverEvent::RefinementApplied {
            field: section,
            duration: started.elapsed(),
            history_len: self.history.len(),
        });

        Ok(&*self.current.insert(next))
    }

    /// Truncate the log after the entry stamped `timestamp` and rebuild the
    /// document by replaying the remaining entries over the initial summary.
    pub fn revert_to_timestamp(&mut self, timestamp: i64) -> Result<&ComprehensiveSummary> {
        let initial = self.initial.as_ref().ok_or(StateError::NoSummary)?;
        let position = self
            .history
            .iter()
            .position(|entry| entry.timestamp == timestamp)
            .ok_or(StateError::TimestampNotFound(timestamp))?;

        let kept = &self.history[..=position];
        let rebuilt = replay(initial, kept)?;

        self.history.truncate(position + 1);
        self.observer.record_event(&ObserverEvent::HistoryReverted {
            timestamp: Some(timestamp),
            history_len: self.history.len(),
        });
        Ok(&*self.current.insert(rebuilt))
    }

    /// Undo the newest entry by restoring its previous content.
    pub fn revert_last_change(&mut self) -> Result<&ComprehensiveSummary> {
        let current = self.current.as_ref().ok_or(StateError::NoSummary)?;
        let last = self.history.last().ok_or(StateError::EmptyHistory)?;

        let mut restored = current.clone();
        restored.set(last.section, last.previous_content.clone())?;

        self.history.pop();
        self.observer.record_event(&ObserverEvent::HistoryReverted {
            timestamp: None,
            history_len: self.history.len(),
        });
        Ok(&*self.current.insert(restored))
    }

    /// Back to the initial summary with an empty log.
    pub fn reset(&mut self) -> Option<&ComprehensiveSummary> {
        self.history.clear();
        self.current.clone_from(&self.initial);
        self.observer.record_event(&ObserverEvent::HistoryReset);
        self.current.as_ref()
    }

    pub fn export_history(&self) -> Result<ExportedHistory> {
        let (Some(initial), Some(current)) = (&self.initial, &self.current) else {
            return Err(StateError::NoSummary.into());
        };
        Ok(ExportedHistory {
            version: HISTORY_VERSION.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            initial_summary: initial.clone(),
            history: self.history.clone(),
            current_summary: current.clone(),
        })
    }

    /// Replace all engine state with a validated snapshot.
    pub fn import_history(&mut self, snapshot: ExportedHistory) -> Result<()> {
        snapshot.validate()?;
        self.initial = Some(snapshot.initial_summary);
        self.current = Some(snapshot.current_summary);
        self.history = snapshot.history;
        self.observer.record_event(&ObserverEvent::HistoryImported {
            history_len: self.history.len(),
        });
        Ok(())
    }

    pub fn import_history_json(&mut self, raw: &str) -> Result<()> {
        let snapshot = ExportedHistory::from_json(raw)?;
        self.import_history(snapshot)
    }

    /// Wall-clock millis, bumped past the newest entry to stay unique.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.history.last() {
            Some(last) if now <= last.timestamp => last.timestamp + 1,
            _ => now,
        }
    }

    fn report_error(&self, message: &str) {
        self.observer.record_event(&ObserverEvent::Error {
            component: "refine".into(),
            message: message.to_string(),
        });
    }
}

/// Apply every entry's updated content, in order, over `initial`.
pub fn replay(
    initial: &ComprehensiveSummary,
    entries: &[RefinementEntry],
) -> Result<ComprehensiveSummary> {
    let mut document = initial.clone();
    for entry in entries {
        document.set(entry.section, entry.updated_content.clone())?;
    }
    Ok(document)
}
