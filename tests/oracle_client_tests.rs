// HTTP-level tests for the Anthropic client against a mock server

use habitat_algo::services::oracle::{AnthropicClient, Oracle, OracleError};

#[tokio::test]
async fn test_successful_completion_parses_text_and_usage() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "content": [{"type": "text", "text": "  [{\"listing_id\": \"a\", \"score\": 80, \"explanation\": \"ok\"}]  "}],
                "usage": {"input_tokens": 1234, "output_tokens": 56}
            }"#,
        )
        .create_async()
        .await;

    let client = AnthropicClient::new(server.url(), "test-key".into(), "2023-06-01".into(), 5);
    let reply = client
        .complete("scoring-model", "system prompt", "user prompt", 2000)
        .await
        .unwrap();

    assert!(reply.text.starts_with('['));
    assert!(reply.text.ends_with(']'));
    assert_eq!(reply.input_tokens, 1234);
    assert_eq!(reply.output_tokens, 56);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_an_api_error() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/messages")
        .with_status(429)
        .with_body(r#"{"error": {"type": "rate_limit_error"}}"#)
        .create_async()
        .await;

    let client = AnthropicClient::new(server.url(), "test-key".into(), "2023-06-01".into(), 5);
    let err = client
        .complete("scoring-model", "system", "user", 2000)
        .await
        .unwrap_err();

    match err {
        OracleError::ApiError { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate_limit_error"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_content_text_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content": [], "usage": {"input_tokens": 10, "output_tokens": 1}}"#)
        .create_async()
        .await;

    let client = AnthropicClient::new(server.url(), "test-key".into(), "2023-06-01".into(), 5);
    let err = client
        .complete("scoring-model", "system", "user", 2000)
        .await
        .unwrap_err();

    assert!(matches!(err, OracleError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_missing_usage_defaults_to_zero() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content": [{"type": "text", "text": "réponse"}]}"#)
        .create_async()
        .await;

    let client = AnthropicClient::new(server.url(), "test-key".into(), "2023-06-01".into(), 5);
    let reply = client
        .complete("scoring-model", "system", "user", 2000)
        .await
        .unwrap();

    assert_eq!(reply.text, "réponse");
    assert_eq!(reply.input_tokens, 0);
    assert_eq!(reply.output_tokens, 0);
}
