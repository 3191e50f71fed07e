//! HTTP-level tests for `HttpLlmClient` against a mockito server.

use llm_client::{HttpLlmClient, LlmClient};
use prompt::ChatMessage;

fn client_for(server: &mockito::ServerGuard) -> HttpLlmClient {
    HttpLlmClient::new(
        "test-key".to_string(),
        server.url(),
        "deepseek-chat".to_string(),
        0.7,
    )
}

#[tokio::test]
async fn returns_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "deepseek-chat",
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "be kind"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let reply = client
        .complete(&[ChatMessage::system("be kind"), ChatMessage::user("hi")])
        .await
        .unwrap();

    assert_eq!(reply, "hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn body_level_error_object_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"invalid api key"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .complete(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid api key"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .complete(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.complete(&[ChatMessage::user("hi")]).await.is_err());
}
