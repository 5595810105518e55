//! HTTP clients against mocked provider endpoints

use std::time::Duration;

use gikirag::config::LlmConfig;
use gikirag::config::VectorStoreConfig;
use gikirag::embeddings::Embedder;
use gikirag::embeddings::EmbeddingClient;
use gikirag::embeddings::EmbeddingProvider;
use gikirag::llm::BackendError;
use gikirag::llm::ChatCompletionsBackend;
use gikirag::llm::CompletionBackend;
use gikirag::llm::Prompt;
use gikirag::models::EmbeddingVector;
use gikirag::vector_store::Metric;
use gikirag::vector_store::PineconeStore;
use gikirag::vector_store::StoreProvider;
use gikirag::vector_store::VectorStore;
use gikirag::RagError;
use serde_json::json;
use wiremock::matchers::body_partial_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

fn llm_config(endpoint: &str) -> LlmConfig {
    LlmConfig {
        llm_endpoint: endpoint.to_string(),
        llm_key: "test-key".to_string(),
        llm_model: "gemma3:27b".to_string(),
        temperature: 0.3,
        timeout_secs: 5,
    }
}

fn prompt() -> Prompt {
    Prompt {
        system: "You answer questions about GIKI.".to_string(),
        user: "Context:\n[1] GIKI is in Topi.\n\nQuestion: Where is GIKI?".to_string(),
    }
}

fn store_config(endpoint: &str) -> VectorStoreConfig {
    VectorStoreConfig {
        provider: StoreProvider::Pinecone,
        endpoint: endpoint.to_string(),
        api_key: Some("pc-key".to_string()),
        namespace: Some("giki".to_string()),
        metric: Metric::Cosine,
        text_field: "text".to_string(),
        snapshot_path: None,
        timeout_secs: 5,
    }
}

// ====== Chat completions ======

#[tokio::test]
async fn test_chat_completion_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gemma3:27b",
            "max_tokens": 128,
            "stream": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "GIKI is in Topi."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend =
        ChatCompletionsBackend::new(&llm_config(&format!("{}/v1/", server.uri()))).unwrap();
    let text = backend.complete(&prompt(), 128).await.unwrap();

    assert_eq!(text, "GIKI is in Topi.");
    assert_eq!(backend.name(), "gemma3:27b");
}

#[tokio::test]
async fn test_chat_completion_rate_limited_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let backend = ChatCompletionsBackend::new(&llm_config(&server.uri())).unwrap();
    let err = backend.complete(&prompt(), 64).await.unwrap_err();

    assert_eq!(
        err,
        BackendError::RateLimited {
            retry_after: Some(Duration::from_secs(7))
        }
    );
}

#[tokio::test]
async fn test_chat_completion_payload_too_large() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let backend = ChatCompletionsBackend::new(&llm_config(&server.uri())).unwrap();
    let err = backend.complete(&prompt(), 64).await.unwrap_err();
    assert_eq!(err, BackendError::PayloadTooLarge);
}

#[tokio::test]
async fn test_chat_completion_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let backend = ChatCompletionsBackend::new(&llm_config(&server.uri())).unwrap();
    let err = backend.complete(&prompt(), 64).await.unwrap_err();
    assert!(matches!(err, BackendError::Authentication(_)));
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn test_chat_completion_without_choices_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let backend = ChatCompletionsBackend::new(&llm_config(&server.uri())).unwrap();
    let err = backend.complete(&prompt(), 64).await.unwrap_err();
    assert_eq!(err, BackendError::EmptyCompletion);
}

// ====== Vector store ======

#[tokio::test]
async fn test_pinecone_query_maps_matches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Api-Key", "pc-key"))
        .and(body_partial_json(json!({
            "topK": 2,
            "includeMetadata": true,
            "namespace": "giki",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {"id": "b", "score": 0.4, "metadata": {"text": "Hostel fees", "url": "https://giki.edu.pk/fees"}},
                {"id": "a", "score": 0.9, "metadata": {"text": "Admissions open in June", "url": "https://giki.edu.pk/admissions"}},
                {"id": "c", "score": 0.8, "metadata": {"url": "https://giki.edu.pk/empty"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = PineconeStore::new(&store_config(&server.uri()), 3, 50).unwrap();
    let matches = store
        .search(&EmbeddingVector::new(vec![0.1, 0.2, 0.3]), 2)
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].document.id, "a");
    assert_eq!(matches[0].document.text, "Admissions open in June");
    assert_eq!(
        matches[0].document.source_url(),
        Some("https://giki.edu.pk/admissions")
    );
    assert_eq!(matches[1].document.id, "b");
    assert!(!matches[0].document.metadata.contains_key("text"));
}

#[tokio::test]
async fn test_pinecone_missing_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"namespace": "giki"})))
        .mount(&server)
        .await;

    let store = PineconeStore::new(&store_config(&server.uri()), 3, 50).unwrap();
    let matches = store
        .search(&EmbeddingVector::new(vec![0.1, 0.2, 0.3]), 5)
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_pinecone_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index down"))
        .mount(&server)
        .await;

    let store = PineconeStore::new(&store_config(&server.uri()), 3, 50).unwrap();
    let result = store
        .search(&EmbeddingVector::new(vec![0.1, 0.2, 0.3]), 5)
        .await;
    assert!(matches!(result, Err(RagError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_pinecone_rejects_wrong_dimension_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = PineconeStore::new(&store_config(&server.uri()), 3, 50).unwrap();
    let result = store.search(&EmbeddingVector::new(vec![0.1; 4]), 5).await;
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 3,
            actual: 4
        })
    ));
}

// ====== Embeddings ======

fn embedding_client(provider: EmbeddingProvider, endpoint: &str, dimension: usize) -> EmbeddingClient {
    EmbeddingClient::new(
        provider,
        "all-minilm".to_string(),
        endpoint.to_string(),
        Some("emb-key".to_string()),
        dimension,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_ollama_embedding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({
            "model": "all-minilm",
            "prompt": "Where is GIKI?",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5, 0.25, 0.0]})))
        .mount(&server)
        .await;

    let client = embedding_client(EmbeddingProvider::Ollama, &server.uri(), 3);
    let vector = client.embed("  Where   is GIKI? ").await.unwrap();
    assert_eq!(vector.as_slice(), &[0.5, 0.25, 0.0]);
}

#[tokio::test]
async fn test_openai_embedding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer emb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [1.0, 0.0], "index": 0}]
        })))
        .mount(&server)
        .await;

    let client = embedding_client(EmbeddingProvider::OpenAI, &server.uri(), 2);
    let vector = client.embed("fees").await.unwrap();
    assert_eq!(vector.dimension(), 2);
}

#[tokio::test]
async fn test_embedding_wrong_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2]})))
        .mount(&server)
        .await;

    let client = embedding_client(EmbeddingProvider::Ollama, &server.uri(), 384);
    let result = client.embed("fees").await;
    assert!(matches!(
        result,
        Err(RagError::DimensionMismatch {
            expected: 384,
            actual: 2
        })
    ));
}

#[tokio::test]
async fn test_embedding_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = embedding_client(EmbeddingProvider::Ollama, &server.uri(), 3);
    assert!(matches!(
        client.embed("fees").await,
        Err(RagError::EmbeddingError(_))
    ));
}
