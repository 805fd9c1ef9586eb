mod env_overrides;
mod loader;
mod types;

pub use types::{
    Config, DEFAULT_CONCURRENCY, HistoryConfig, ModerationConfig, ObservabilityConfig, PipelineConfig, ProviderConfig,
};
