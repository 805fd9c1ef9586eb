use super::traits::{Observer, ObserverEvent};
use tracing::{info, warn};

/// Log-based observer — uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::SectionStarted { index, title } => {
                info!(index, title = %title, "section.started");
            }
            ObserverEvent::SectionCompleted {
                index,
                duration,
                flagged,
            } => {
                info!(
                    index,
                    duration_ms = millis(*duration),
                    flagged,
                    "section.completed"
                );
            }
            ObserverEvent::SectionFailed {
                index,
                title,
                message,
            } => {
                warn!(index, title = %title, error = %message, "section.failed");
            }
            ObserverEvent::PipelineFinished { sections, duration } => {
                info!(
                    sections,
                    duration_ms = millis(*duration),
                    "pipeline.finished"
                );
            }
            ObserverEvent::OverviewGenerated { duration } => {
                info!(duration_ms = millis(*duration), "overview.generated");
            }
            ObserverEvent::RefinementApplied {
                field,
                duration,
                history_len,
            } => {
                info!(
                    field = %field,
                    duration_ms = millis(*duration),
                    history_len,
                    "refinement.applied"
                );
            }
            ObserverEvent::HistoryReverted {
                timestamp,
                history_len,
            } => {
                info!(timestamp = ?timestamp, history_len, "history.reverted");
            }
            ObserverEvent::HistoryReset => {
                info!("history.reset");
            }
            ObserverEvent::HistoryImported { history_len } => {
                info!(history_len, "history.imported");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
