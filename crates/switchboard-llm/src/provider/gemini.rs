//! Gemini backend

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::CallContext;

use super::{Backend, invoke, unsupported};
use crate::api::gemini::GeminiApi;
use crate::convert::gemini::{describe_model, embed_request, embed_response, translate_request, translate_response};
use crate::error::LlmError;
use crate::progress::ProgressReporter;
use crate::types::{ApiRequest, ApiResponse, Operation};

const OPERATIONS: &[Operation] = &[Operation::Chat, Operation::Embed, Operation::Show];

/// Gemini Generative Language API
///
/// Models are hosted remotely, so no readiness step runs.
pub struct GeminiBackend {
    api: Arc<dyn GeminiApi>,
    progress: Arc<dyn ProgressReporter>,
}

impl GeminiBackend {
    /// Backend over an API handle
    pub fn new(api: Arc<dyn GeminiApi>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self { api, progress }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn operations(&self) -> &'static [Operation] {
        OPERATIONS
    }

    async fn handle(&self, request: ApiRequest, context: &CallContext) -> Result<ApiResponse, LlmError> {
        let progress = self.progress.as_ref();

        match request {
            ApiRequest::Chat(chat) => {
                let call = translate_request(&chat)?;
                let model = call.model.clone();
                let native = call.into_request();

                let response = invoke(context, progress, self.api.generate_content(&model, &native)).await?;
                translate_response(&model, response).map(ApiResponse::Chat)
            }
            ApiRequest::Embed(embed) => {
                let native = embed_request(&embed);
                let expected = native.requests.len();

                let response = invoke(context, progress, self.api.batch_embed_contents(&embed.model, &native)).await?;
                embed_response(&embed.model, expected, response).map(ApiResponse::Embed)
            }
            ApiRequest::Show(show) => {
                let native = invoke(context, progress, self.api.get_model(&show.model)).await?;
                Ok(ApiResponse::Show(describe_model(&show.model, native)))
            }
            other => Err(unsupported(self.name(), other.operation())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::Map;

    use super::*;
    use crate::progress::TracingProgress;
    use crate::protocol::gemini::{
        BatchEmbedContentsRequest, BatchEmbedContentsResponse, Candidate, Content, ContentEmbedding,
        GenerateContentRequest, GenerateContentResponse, Model, Part,
    };
    use crate::types::{ChatRequest, EmbeddingRequest, Message, Tool};

    #[derive(Default)]
    struct FakeGemini {
        seen: Mutex<Vec<(String, GenerateContentRequest)>>,
        candidates: usize,
    }

    #[async_trait]
    impl GeminiApi for FakeGemini {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse, LlmError> {
            self.seen.lock().unwrap().push((model.to_owned(), request.clone()));
            let candidate = Candidate {
                content: Some(Content {
                    role: Some("model".into()),
                    parts: vec![Part::function_call("get_time", Map::new())],
                }),
                finish_reason: Some("STOP".into()),
                index: None,
            };
            Ok(GenerateContentResponse {
                candidates: vec![candidate; self.candidates],
                ..GenerateContentResponse::default()
            })
        }

        async fn batch_embed_contents(
            &self,
            _model: &str,
            request: &BatchEmbedContentsRequest,
        ) -> Result<BatchEmbedContentsResponse, LlmError> {
            Ok(BatchEmbedContentsResponse {
                embeddings: request
                    .requests
                    .iter()
                    .map(|_| ContentEmbedding { values: vec![0.25, 0.75] })
                    .collect(),
            })
        }

        async fn get_model(&self, _model: &str) -> Result<Model, LlmError> {
            Ok(Model {
                input_token_limit: Some(32_768),
                supported_generation_methods: vec!["generateContent".into()],
                ..Model::default()
            })
        }
    }

    fn backend(fake: &Arc<FakeGemini>) -> GeminiBackend {
        GeminiBackend::new(fake.clone(), Arc::new(TracingProgress))
    }

    fn time_request() -> ApiRequest {
        ApiRequest::Chat(
            ChatRequest::new("gemini-2.0-flash", vec![Message::user("What time is it?")])
                .with_tools(vec![Tool::function("get_time", "Current time")]),
        )
    }

    #[tokio::test]
    async fn function_call_comes_back_as_tool_call() {
        let fake = Arc::new(FakeGemini {
            candidates: 1,
            ..FakeGemini::default()
        });

        let ApiResponse::Chat(chat) = backend(&fake).handle(time_request(), &CallContext::new()).await.unwrap() else {
            panic!("expected chat response");
        };

        assert_eq!(chat.message.content, "");
        assert_eq!(chat.message.tool_calls.len(), 1);
        assert_eq!(chat.message.tool_calls[0].function.name, "get_time");
        assert!(chat.message.tool_calls[0].function.arguments.is_empty());

        let seen = fake.seen.lock().unwrap();
        assert_eq!(seen[0].0, "gemini-2.0-flash");
        assert_eq!(seen[0].1.tools[0].function_declarations[0].name, "get_time");
    }

    #[tokio::test]
    async fn several_candidates_fail_the_call() {
        let fake = Arc::new(FakeGemini {
            candidates: 2,
            ..FakeGemini::default()
        });

        let err = backend(&fake).handle(time_request(), &CallContext::new()).await.unwrap_err();
        assert!(matches!(err, LlmError::Translation(_)));
    }

    #[tokio::test]
    async fn invalid_chat_never_reaches_the_api() {
        let fake = Arc::new(FakeGemini::default());
        let request = ApiRequest::Chat(ChatRequest::new(
            "gemini-2.0-flash",
            vec![Message::user("hi"), Message::assistant("hello")],
        ));

        let err = backend(&fake).handle(request, &CallContext::new()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert!(fake.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_embedding_is_unsupported() {
        let request = ApiRequest::Embedding(EmbeddingRequest::default());
        let err = backend(&Arc::new(FakeGemini::default()))
            .handle(request, &CallContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn show_reports_context_length() {
        let request = ApiRequest::Show(crate::types::ShowRequest {
            model: "gemini-2.0-flash".into(),
            verbose: None,
        });

        let ApiResponse::Show(show) = backend(&Arc::new(FakeGemini::default()))
            .handle(request, &CallContext::new())
            .await
            .unwrap()
        else {
            panic!("expected show response");
        };

        assert_eq!(show.context_length(), Some(32_768));
        assert_eq!(show.capabilities, ["generateContent"]);
    }
}
