use crate::book::ModerationResult;
use crate::error::GenerationError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub type GenerationFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, GenerationError>> + Send + 'a>>;

/// Target shape for a generation call, expressed as a JSON Schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseShape {
    pub name: String,
    pub schema: Value,
}

impl ResponseShape {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Text Generation Port: prompt + shape in, raw response text or a failure out.
pub trait TextGenerator: Send + Sync {
    /// Provider identifier (e.g. "openai").
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        prompt: &'a str,
        shape: &'a ResponseShape,
    ) -> GenerationFuture<'a, String>;
}

/// Moderation Port.
pub trait Moderator: Send + Sync {
    fn name(&self) -> &str;

    fn classify<'a>(&'a self, text: &'a str) -> GenerationFuture<'a, ModerationResult>;
}

/// Generate and decode into `T`; a response that does not decode is a failure.
pub async fn generate_typed<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    system_prompt: &str,
    prompt: &str,
    shape: &ResponseShape,
) -> Result<T, GenerationError> {
    let raw = generator.generate(system_prompt, prompt, shape).await?;
    decode_response(&raw, shape)
}

pub fn decode_response<T: DeserializeOwned>(
    raw: &str,
    shape: &ResponseShape,
) -> Result<T, GenerationError> {
    let trimmed = raw.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(first) => {
            let unfenced = strip_code_fence(trimmed);
            if unfenced == trimmed {
                return Err(GenerationError::Decode {
                    shape: shape.name.clone(),
                    message: first.to_string(),
                });
            }
            serde_json::from_str(unfenced).map_err(|e| GenerationError::Decode {
                shape: shape.name.clone(),
                message: e.to_string(),
            })
        }
    }
}

/// Content of a single surrounding ```` ``` ```` fence, or the input unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
