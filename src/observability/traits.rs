use crate::refine::SummaryField;
use std::time::Duration;

/// Events the pipeline and refinement engine report.
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    SectionStarted {
        index: usize,
        title: String,
    },
    SectionCompleted {
        index: usize,
        duration: Duration,
        flagged: bool,
    },
    SectionFailed {
        index: usize,
        title: String,
        message: String,
    },
    PipelineFinished {
        sections: usize,
        duration: Duration,
    },
    OverviewGenerated {
        duration: Duration,
    },
    RefinementApplied {
        field: SummaryField,
        duration: Duration,
        history_len: usize,
    },
    HistoryReverted {
        timestamp: Option<i64>,
        history_len: usize,
    },
    HistoryReset,
    HistoryImported {
        history_len: usize,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Structured sink injected into each component.
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &ObserverEvent);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
