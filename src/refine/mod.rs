pub mod document;
pub mod engine;
pub mod history;
pub mod prompt;
pub mod repair;

pub use document::{ComprehensiveSummary, FieldKind, FieldValue, SummaryField};
pub use engine::{RefinementEngine, replay};
pub use history::{
    ExportedHistory, HISTORY_VERSION, RefinementEntry, load_history, save_history,
};
pub use repair::{RepairedValue, parse_loose, repair_response, unwrap_field};
