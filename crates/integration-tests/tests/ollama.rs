mod harness;

use std::sync::Arc;
use std::time::Duration;

use harness::loopback::Loopback;
use harness::mock_ollama::MockOllama;
use serde_json::Map;
use switchboard_client::{ClientError, LlmClient};
use switchboard_core::CallContext;
use switchboard_llm::types::{EmbedInput, EmbedRequest, EmbeddingRequest, GenerateRequest, ShowRequest, Tool, ToolCall};
use switchboard_llm::{ChatRequest, Message, OllamaBackend, OllamaHttp, TracingProgress};
use switchboard_service::Router;

fn router(mock: &MockOllama) -> Router {
    let http = Arc::new(OllamaHttp::new(mock.base_url()));
    Router::new(Some(Duration::from_secs(30))).with_backend(Arc::new(OllamaBackend::new(http, Arc::new(TracingProgress))))
}

fn client(mock: &MockOllama, model: &str) -> LlmClient<Loopback> {
    LlmClient::new(Loopback::new(router(mock)), "ollama", model)
}

fn time_tool() -> Tool {
    Tool::function("get_time", "Current wall-clock time")
}

#[tokio::test]
async fn get_time_round_trip_pulls_missing_model() {
    let mock = MockOllama::start().await.unwrap();
    let client = client(&mock, "llama3");
    let ctx = CallContext::with_timeout(Duration::from_secs(10));

    let mut history = vec![Message::user("What time is it?")];
    let first = client
        .chat(ChatRequest::new("", history.clone()).with_tools(vec![time_tool()]), &ctx)
        .await
        .unwrap();

    assert!(first.done);
    assert_eq!(first.message.tool_calls.len(), 1);
    assert_eq!(first.message.tool_calls[0].function.name, "get_time");
    assert_eq!(mock.pull_count(), 1);
    assert_eq!(mock.installed(), ["llama3:latest"]);

    history.push(Message::assistant("").with_tool_call(ToolCall::new("get_time", Map::new())));
    history.push(Message::tool(r#"{"time":"12:00"}"#));

    let second = client
        .chat(ChatRequest::new("", history).with_tools(vec![time_tool()]), &ctx)
        .await
        .unwrap();

    assert_eq!(second.message.content, "It is 12:00.");
    assert!(second.message.tool_calls.is_empty());
    assert_eq!(second.metrics.eval_count, Some(7));
    assert_eq!(mock.pull_count(), 1, "model is present for the second turn");

    let chats = mock.chats();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0]["model"], "llama3");
    assert_eq!(chats[0]["stream"], false);
    assert_eq!(chats[1]["messages"][2]["role"], "tool");
}

#[tokio::test]
async fn installed_model_is_not_pulled() {
    let mock = MockOllama::start_with_models(&["llama3:latest"]).await.unwrap();
    client(&mock, "llama3")
        .chat(ChatRequest::new("", vec![Message::user("hi")]), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(mock.pull_count(), 0);
}

#[tokio::test]
async fn concurrent_first_use_pulls_once() {
    let mock = MockOllama::start_with_slow_pull(Duration::from_millis(200)).await.unwrap();
    let client = client(&mock, "llama3");

    let ctx = CallContext::with_timeout(Duration::from_secs(10));
    let request = || ChatRequest::new("", vec![Message::user("hi")]);
    let (a, b, c) = tokio::join!(
        client.chat(request(), &ctx),
        client.chat(request(), &ctx),
        client.chat(request(), &ctx)
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(mock.pull_count(), 1);
}

#[tokio::test]
async fn failed_pull_is_a_server_error() {
    let mock = MockOllama::start_with_pull_error("pull model manifest: file does not exist")
        .await
        .unwrap();

    let err = client(&mock, "nonexistent")
        .chat(ChatRequest::new("", vec![Message::user("hi")]), &CallContext::new())
        .await
        .unwrap_err();

    let ClientError::Service { code, description } = err else {
        panic!("expected service error, got {err:?}");
    };
    assert_eq!(code, "500");
    assert!(description.contains("file does not exist"));
    assert!(mock.chats().is_empty());
}

#[tokio::test]
async fn trailing_assistant_is_rejected_before_any_backend_call() {
    let mock = MockOllama::start().await.unwrap();
    let err = client(&mock, "llama3")
        .chat(
            ChatRequest::new("", vec![Message::user("hi"), Message::assistant("hello")]),
            &CallContext::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert!(err.to_string().contains("but was 'assistant'"));
    assert_eq!(mock.pull_count(), 0);
    assert!(mock.chats().is_empty());
}

#[tokio::test]
async fn generate_and_embeddings_pass_through() {
    let mock = MockOllama::start_with_models(&["llama3:latest", "nomic-embed-text:latest"])
        .await
        .unwrap();
    let ctx = CallContext::new();

    let generated = client(&mock, "llama3")
        .generate(
            GenerateRequest {
                prompt: "Tell me a story".into(),
                ..GenerateRequest::default()
            },
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(generated.response, "Once upon a time.");

    let embedder = client(&mock, "nomic-embed-text");
    let batch = embedder
        .embed(
            EmbedRequest {
                input: EmbedInput::Multiple(vec!["a".into(), "b".into()]),
                ..EmbedRequest::default()
            },
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(batch.embeddings.len(), 2);

    let single = embedder
        .embedding(
            EmbeddingRequest {
                prompt: "a".into(),
                ..EmbeddingRequest::default()
            },
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(single.embedding, [0.5, 0.25]);
}

#[tokio::test]
async fn show_reports_model_metadata() {
    let mock = MockOllama::start_with_models(&["llama3:latest"]).await.unwrap();

    let show = client(&mock, "llama3")
        .show(
            ShowRequest {
                model: String::new(),
                verbose: None,
            },
            &CallContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(show.model, "llama3");
    assert_eq!(show.details.family, "llama");
    assert_eq!(show.context_length(), Some(8192));
    assert_eq!(show.capabilities, ["completion", "tools"]);
}
