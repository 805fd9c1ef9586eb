use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booklens::config::ProviderConfig;
use booklens::error::GenerationError;
use booklens::llm::{OpenAiGenerator, ResponseShape, TextGenerator, generate_typed};

const KEY: &str = "sk-live-abcdef123456";

fn provider(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        base_url: format!("{}/v1", server.uri()),
        model: "test-model".into(),
        ..ProviderConfig::default()
    }
}

fn shape() -> ResponseShape {
    ResponseShape::new(
        "answer",
        json!({
            "type": "object",
            "properties": { "answer": { "type": "string" } },
            "required": ["answer"],
            "additionalProperties": false,
        }),
    )
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[derive(Debug, Deserialize)]
struct Answer {
    answer: String,
}

#[tokio::test]
async fn sends_schema_and_decodes_typed_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "test-model",
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "answer", "strict": true }
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!("{\"answer\":\"42\"}"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(&provider(&server), KEY, 2);
    let answer: Answer = generate_typed(&generator, "system", "question", &shape())
        .await
        .unwrap();
    assert_eq!(answer.answer, "42");

    let received = server
        .received_requests()
        .await
        .expect("mock server should record received requests");
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["messages"][0]["content"], "system");
    assert_eq!(body["messages"][1]["content"], "question");
    server.verify().await;
}

#[tokio::test]
async fn api_error_is_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(format!(
            "{{\"error\":{{\"message\":\"Incorrect API key provided: {KEY}\"}}}}"
        )))
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(&provider(&server), KEY, 2);
    let err = generator
        .generate("system", "question", &shape())
        .await
        .unwrap_err();
    match err {
        GenerationError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 401);
            assert!(!message.contains(KEY));
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn null_content_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(&provider(&server), KEY, 2);
    let err = generator
        .generate("system", "question", &shape())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse { .. }));
}

#[tokio::test]
async fn prose_reply_fails_typed_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!("Sure! The answer is 42."))),
        )
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(&provider(&server), KEY, 2);
    let err = generate_typed::<Answer>(&generator, "system", "question", &shape())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Decode { .. }));
}
