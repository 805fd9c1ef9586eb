use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booklens::book::ModerationCategory;
use booklens::config::{ModerationConfig, ProviderConfig};
use booklens::error::GenerationError;
use booklens::llm::{Moderator, OpenAiModerator};

fn moderator(server: &MockServer) -> OpenAiModerator {
    let provider = ProviderConfig {
        base_url: format!("{}/v1", server.uri()),
        ..ProviderConfig::default()
    };
    OpenAiModerator::new(&provider, &ModerationConfig::default(), "test-key", 2)
}

#[tokio::test]
async fn classifies_text_into_the_fixed_category_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/moderations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "omni-moderation-latest",
            "input": "some passage",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "modr-1",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": true,
                "categories": {
                    "violence": true,
                    "violence/graphic": false,
                    "illicit": null
                },
                "category_scores": {
                    "violence": 0.91,
                    "violence/graphic": 0.12
                },
                "category_applied_input_types": { "violence": ["text"] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = moderator(&server).classify("some passage").await.unwrap();
    assert!(result.flagged);
    assert_eq!(result.categories.len(), 13);
    assert!(result.is_set(ModerationCategory::Violence));
    assert!(!result.is_set(ModerationCategory::Illicit));
    assert!((result.scores[&ModerationCategory::Violence] - 0.91).abs() < f64::EPSILON);
    server.verify().await;
}

#[tokio::test]
async fn empty_results_are_a_moderation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/moderations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let err = moderator(&server).classify("text").await.unwrap_err();
    assert!(matches!(err, GenerationError::Moderation(_)));
}

#[tokio::test]
async fn server_error_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/moderations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = moderator(&server).classify("text").await.unwrap_err();
    assert!(matches!(err, GenerationError::Api { status: 503, .. }));
}
