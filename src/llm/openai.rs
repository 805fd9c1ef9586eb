//! OpenAI-compatible chat completions generator.
//! Any endpoint that speaks `/chat/completions` with `response_format`
//! JSON Schema support works here.

use super::http_client::build_provider_client;
use super::scrub::{api_error, request_error, scrub_secrets};
use super::traits::{GenerationFuture, ResponseShape, TextGenerator};
use crate::config::ProviderConfig;
use crate::error::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub struct OpenAiGenerator {
    name: String,
    api_key: String,
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: String,
    /// Pre-computed chat completions URL.
    chat_url: String,
    model: String,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f64,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    r#type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

pub(crate) fn endpoint(base_url: &str, suffix: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if base_url.ends_with(suffix) {
        base_url.to_string()
    } else {
        format!("{base_url}/{suffix}")
    }
}

impl OpenAiGenerator {
    pub fn new(config: &ProviderConfig, api_key: &str, max_idle: usize) -> Self {
        Self {
            name: config.name.clone(),
            api_key: api_key.to_string(),
            cached_auth_header: format!("Bearer {api_key}"),
            chat_url: endpoint(&config.base_url, "chat/completions"),
            model: config.model.clone(),
            temperature: config.temperature,
            client: build_provider_client(config.timeout_secs, max_idle),
        }
    }

    fn build_request<'a>(
        &'a self,
        system_prompt: &'a str,
        prompt: &'a str,
        shape: &'a ResponseShape,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &shape.name,
                    schema: &shape.schema,
                    strict: true,
                },
            },
        }
    }

    fn extract_text(&self, response: ChatResponse) -> Result<String, GenerationError> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(GenerationError::EmptyResponse {
                provider: self.name.clone(),
            });
        };
        if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(GenerationError::Request {
                provider: self.name.clone(),
                message: format!("model refused: {}", scrub_secrets(&refusal, None)),
            });
        }
        choice
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse {
                provider: self.name.clone(),
            })
    }

    async fn call_api(
        &self,
        system_prompt: &str,
        prompt: &str,
        shape: &ResponseShape,
    ) -> Result<String, GenerationError> {
        let request = self.build_request(system_prompt, prompt, shape);
        let key = Some(self.api_key.as_str());

        let response = self
            .client
            .post(&self.chat_url)
            .header("Authorization", &self.cached_auth_header)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(&self.name, key, &e))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, key, response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| request_error(&self.name, key, &e))?;
        self.extract_text(chat_response)
    }
}

impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate<'a>(
        &'a self,
        system_prompt: &'a str,
        prompt: &'a str,
        shape: &'a ResponseShape,
    ) -> GenerationFuture<'a, String> {
        Box::pin(async move {
            tracing::debug!(
                provider = self.name.as_str(),
                shape = shape.name.as_str(),
                prompt_chars = prompt.len(),
                "generation.request"
            );
            self.call_api(system_prompt, prompt, shape).await
        })
    }
}
