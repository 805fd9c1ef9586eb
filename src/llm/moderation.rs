use super::http_client::build_provider_client;
use super::openai::endpoint;
use super::scrub::{api_error, request_error};
use super::traits::{GenerationFuture, Moderator};
use crate::book::{ModerationCategory, ModerationResult};
use crate::config::{ModerationConfig, ProviderConfig};
use crate::error::GenerationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// OpenAI `/moderations` client.
pub struct OpenAiModerator {
    name: String,
    api_key: String,
    cached_auth_header: String,
    moderations_url: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<RawModeration>,
}

/// Category keys outside the fixed set, and null values, are tolerated.
#[derive(Debug, Deserialize)]
struct RawModeration {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, Option<bool>>,
    #[serde(default)]
    category_scores: HashMap<String, Option<f64>>,
}

impl RawModeration {
    fn into_result(self) -> ModerationResult {
        let mut categories = ModerationCategory::cleared_map();
        for (key, value) in self.categories {
            if let Ok(category) = ModerationCategory::from_str(&key) {
                categories.insert(category, value.unwrap_or(false));
            }
        }
        let scores: BTreeMap<ModerationCategory, f64> = self
            .category_scores
            .into_iter()
            .filter_map(|(key, score)| {
                let category = ModerationCategory::from_str(&key).ok()?;
                Some((category, score?))
            })
            .collect();
        ModerationResult {
            flagged: self.flagged,
            categories,
            scores,
        }
    }
}

impl OpenAiModerator {
    pub fn new(
        provider: &ProviderConfig,
        moderation: &ModerationConfig,
        api_key: &str,
        max_idle: usize,
    ) -> Self {
        Self {
            name: format!("{}-moderation", provider.name),
            api_key: api_key.to_string(),
            cached_auth_header: format!("Bearer {api_key}"),
            moderations_url: endpoint(&provider.base_url, "moderations"),
            model: moderation.model.clone(),
            client: build_provider_client(provider.timeout_secs, max_idle),
        }
    }

    async fn call_api(&self, text: &str) -> Result<ModerationResult, GenerationError> {
        let key = Some(self.api_key.as_str());
        let response = self
            .client
            .post(&self.moderations_url)
            .header("Authorization", &self.cached_auth_header)
            .json(&ModerationRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| request_error(&self.name, key, &e))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, key, response).await);
        }

        let parsed: ModerationResponse = response
            .json()
            .await
            .map_err(|e| request_error(&self.name, key, &e))?;
        parsed
            .results
            .into_iter()
            .next()
            .map(RawModeration::into_result)
            .ok_or_else(|| GenerationError::Moderation("response contained no results".into()))
    }
}

impl Moderator for OpenAiModerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify<'a>(&'a self, text: &'a str) -> GenerationFuture<'a, ModerationResult> {
        Box::pin(async move { self.call_api(text).await })
    }
}
