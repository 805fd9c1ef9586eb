pub mod schema;

pub use schema::{
    Config, DEFAULT_CONCURRENCY, HistoryConfig, ModerationConfig, ObservabilityConfig, PipelineConfig, ProviderConfig,
};
