use super::moderation::OpenAiModerator;
use super::openai::OpenAiGenerator;
use super::traits::{Moderator, TextGenerator};
use crate::config::Config;
use crate::error::ConfigError;
use std::sync::Arc;

fn check_provider(name: &str) -> Result<(), ConfigError> {
    match name {
        "openai" | "openai-compatible" | "compatible" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "unknown provider '{other}' (expected openai or openai-compatible)"
        ))),
    }
}

/// Build the configured generator. A missing key fails here, at construction.
pub fn create_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, ConfigError> {
    check_provider(&config.provider.name)?;
    let api_key = config.require_api_key()?;
    Ok(Arc::new(OpenAiGenerator::new(
        &config.provider,
        api_key,
        config.pipeline.concurrency,
    )))
}

/// `None` when moderation is disabled.
pub fn create_moderator(config: &Config) -> Result<Option<Arc<dyn Moderator>>, ConfigError> {
    if !config.moderation.enabled {
        return Ok(None);
    }
    check_provider(&config.provider.name)?;
    let api_key = config.require_api_key()?;
    Ok(Some(Arc::new(OpenAiModerator::new(
        &config.provider,
        &config.moderation,
        api_key,
        config.pipeline.concurrency,
    ))))
}
