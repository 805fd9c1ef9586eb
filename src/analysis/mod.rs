pub mod moderation;
pub mod overview;
pub mod pipeline;
pub mod prompts;

pub use moderation::{ModerationVerdict, aggregate_moderation};
pub use overview::generate_overview;
pub use pipeline::{DEFAULT_CONCURRENCY, SummaryPipeline};
