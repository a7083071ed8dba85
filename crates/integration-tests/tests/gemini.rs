mod harness;

use std::sync::Arc;
use std::time::Duration;

use harness::loopback::Loopback;
use harness::mock_gemini::{API_KEY, MockGemini};
use secrecy::SecretString;
use serde_json::Map;
use switchboard_client::{ClientError, LlmClient};
use switchboard_core::CallContext;
use switchboard_llm::types::{EmbedInput, EmbedRequest, EmbeddingRequest, ShowRequest, Tool, ToolCall};
use switchboard_llm::{ChatRequest, GeminiBackend, GeminiHttp, Message, TracingProgress};
use switchboard_service::Router;

const MODEL: &str = "gemini-2.0-flash";

fn client_with_key(mock: &MockGemini, key: &str) -> LlmClient<Loopback> {
    let http = GeminiHttp::new(SecretString::from(key.to_owned()), Some(mock.base_url())).unwrap();
    let backend = GeminiBackend::new(Arc::new(http), Arc::new(TracingProgress));
    let router = Router::new(Some(Duration::from_secs(30))).with_backend(Arc::new(backend));

    LlmClient::new(Loopback::new(router), "gemini", MODEL)
}

fn client(mock: &MockGemini) -> LlmClient<Loopback> {
    client_with_key(mock, API_KEY)
}

fn time_request(history: Vec<Message>) -> ChatRequest {
    ChatRequest::new("", history).with_tools(vec![Tool::function("get_time", "Current wall-clock time")])
}

#[tokio::test]
async fn get_time_round_trip() {
    let mock = MockGemini::start().await.unwrap();
    let client = client(&mock);
    let ctx = CallContext::with_timeout(Duration::from_secs(10));

    let mut history = vec![Message::system("Answer briefly."), Message::user("What time is it?")];

    let first = client.chat(time_request(history.clone()), &ctx).await.unwrap();
    assert!(first.done);
    assert_eq!(first.model, MODEL);
    assert_eq!(first.message.content, "");
    assert_eq!(first.message.tool_calls.len(), 1);
    assert_eq!(first.message.tool_calls[0].function.name, "get_time");
    assert!(first.message.tool_calls[0].function.arguments.is_empty());

    history.push(Message::assistant("").with_tool_call(ToolCall::new("get_time", Map::new())));
    history.push(Message::tool(r#"{"name":"get_time","time":"12:00"}"#));

    let second = client.chat(time_request(history), &ctx).await.unwrap();
    assert_eq!(second.message.content, "It is 12:00.");
    assert!(second.message.tool_calls.is_empty());

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, format!("{MODEL}:generateContent"));

    let first_body = &requests[0].1;
    assert_eq!(first_body["systemInstruction"]["parts"][0]["text"], "Answer briefly.");
    assert_eq!(first_body["tools"][0]["functionDeclarations"][0]["name"], "get_time");
    assert_eq!(first_body["contents"].as_array().unwrap().len(), 1);

    let second_body = &requests[1].1;
    let contents = second_body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "get_time");
    assert_eq!(contents[2]["role"], "user");
    assert_eq!(contents[2]["parts"][0]["functionResponse"]["name"], "get_time");
}

#[tokio::test]
async fn two_candidates_are_a_server_error() {
    let mock = MockGemini::start_with_candidates(2).await.unwrap();

    let err = client(&mock)
        .chat(time_request(vec![Message::user("What time is it?")]), &CallContext::new())
        .await
        .unwrap_err();

    let ClientError::Service { code, .. } = err else {
        panic!("expected service error, got {err:?}");
    };
    assert_eq!(code, "500");
}

#[tokio::test]
async fn trailing_assistant_never_reaches_gemini() {
    let mock = MockGemini::start().await.unwrap();

    let err = client(&mock)
        .chat(
            time_request(vec![Message::user("hi"), Message::assistant("hello")]),
            &CallContext::new(),
        )
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn rejected_key_surfaces_backend_message() {
    let mock = MockGemini::start().await.unwrap();

    let err = client_with_key(&mock, "wrong-key")
        .chat(time_request(vec![Message::user("hi")]), &CallContext::new())
        .await
        .unwrap_err();

    let ClientError::Service { code, description } = err else {
        panic!("expected service error, got {err:?}");
    };
    assert_eq!(code, "500");
    assert!(description.contains("API key not valid"));
}

#[tokio::test]
async fn batch_embedding_keeps_input_order() {
    let mock = MockGemini::start().await.unwrap();

    let response = client(&mock)
        .embed(
            EmbedRequest {
                input: EmbedInput::Multiple(vec!["first".into(), "second".into(), "third".into()]),
                ..EmbedRequest::default()
            },
            &CallContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.embeddings.len(), 3);
    assert_eq!(response.embeddings[0], [0.25, 0.5, 0.75]);

    let requests = mock.requests();
    assert_eq!(requests[0].0, format!("{MODEL}:batchEmbedContents"));
    assert_eq!(requests[0].1["requests"][2]["content"]["parts"][0]["text"], "third");
}

#[tokio::test]
async fn legacy_embedding_has_no_gemini_endpoint() {
    let mock = MockGemini::start().await.unwrap();

    let err = client(&mock)
        .embedding(EmbeddingRequest::default(), &CallContext::new())
        .await
        .unwrap_err();

    assert!(err.is_client_error());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn show_reports_token_limit() {
    let mock = MockGemini::start().await.unwrap();

    let show = client(&mock)
        .show(
            ShowRequest {
                model: String::new(),
                verbose: None,
            },
            &CallContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(show.model, MODEL);
    assert_eq!(show.context_length(), Some(1_048_576));
    assert_eq!(show.capabilities, ["generateContent", "countTokens"]);
}
