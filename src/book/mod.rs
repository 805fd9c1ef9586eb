pub mod markdown;
pub mod source;
pub mod types;

pub use markdown::split_markdown;
pub use source::{load_sections, sections_from_json};
pub use types::{BookSummary, ModerationCategory, ModerationResult, Section, SectionSummary};
