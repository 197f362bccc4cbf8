use super::*;

fn test_config() -> EmbeddingConfig {
    EmbeddingConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 8080,
        model: "test-model".to_string(),
        batch_size: 16,
        dimension: 3,
        api_key_env: "TEST_API_KEY".to_string(),
    }
}

fn test_client() -> OpenAiClient {
    OpenAiClient::new(&test_config(), "sk-test".to_string()).expect("Failed to create client")
}

#[test]
fn client_configuration() {
    let client = test_client();

    assert_eq!(client.model, "test-model");
    assert_eq!(client.batch_size, 16);
    assert_eq!(client.dimension, 3);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(8080));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let client = test_client()
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn empty_api_key_is_rejected() {
    let result = OpenAiClient::new(&test_config(), "  ".to_string());
    assert!(matches!(result, Err(RagError::Config(_))));
}

#[test]
fn empty_batch_short_circuits() {
    let client = test_client();
    let vectors = client.embed_batch(&[]).expect("empty batch should succeed");
    assert!(vectors.is_empty());
}

#[test]
fn response_parsing_restores_input_order() {
    let client = test_client();
    let body = r#"{
        "object": "list",
        "data": [
            {"object": "embedding", "index": 1, "embedding": [0.4, 0.5, 0.6]},
            {"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}
        ],
        "model": "test-model"
    }"#;

    let vectors = client.parse_response(body, 2).expect("parse should succeed");
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0], vec![0.1, 0.2, 0.3]);
    assert_eq!(vectors[1], vec![0.4, 0.5, 0.6]);
}

#[test]
fn response_count_mismatch_is_an_error() {
    let client = test_client();
    let body = r#"{"data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}]}"#;

    let result = client.parse_response(body, 2);
    assert!(matches!(result, Err(RagError::Embedding(_))));
}

#[test]
fn duplicate_indices_are_an_error() {
    let client = test_client();
    let body = r#"{"data": [
        {"index": 0, "embedding": [0.1, 0.2, 0.3]},
        {"index": 0, "embedding": [0.4, 0.5, 0.6]}
    ]}"#;

    let result = client.parse_response(body, 2);
    assert!(matches!(result, Err(RagError::Embedding(_))));
}

#[test]
fn wrong_dimension_is_an_error() {
    let client = test_client();
    let body = r#"{"data": [{"index": 0, "embedding": [0.1, 0.2]}]}"#;

    let result = client.parse_response(body, 1);
    assert!(matches!(result, Err(RagError::Embedding(_))));
}

#[test]
fn malformed_body_is_an_error() {
    let client = test_client();
    let result = client.parse_response("not json", 1);
    assert!(matches!(result, Err(RagError::Embedding(_))));
}
