//! HTTP-level tests for `HttpEmbeddingClient` against a mockito server.

use embedding::{EmbeddingService, HttpEmbeddingClient};

fn client_for(server: &mockito::ServerGuard) -> HttpEmbeddingClient {
    HttpEmbeddingClient::new(
        "test-key".to_string(),
        "embedding-2".to_string(),
        server.url(),
    )
}

#[tokio::test]
async fn returns_first_embedding_from_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let embedding = client.embed("hello").await.unwrap();

    assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.embed("hello").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn body_level_error_object_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"quota exceeded"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.embed("hello").await.unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn empty_data_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.embed("hello").await.is_err());
}

#[tokio::test]
async fn unconfigured_url_is_an_error() {
    let client =
        HttpEmbeddingClient::new("k".to_string(), "m".to_string(), String::new());
    assert!(client.embed("hello").await.is_err());
}
