//! Conversion between canonical types and the Gemini wire format
//!
//! Gemini models a conversation as a session history plus one new turn, with
//! the system prompt carried separately. A canonical request is split
//! accordingly: the first system message becomes the system instruction, the
//! last message becomes the turn, and everything in between (minus system
//! messages) becomes history.

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content, EmbedContentRequest, FunctionDeclaration,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GeminiTool, Model, Part, Schema, SchemaType,
};
use crate::sniff::detect_content_type;
use crate::types::{
    ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, Message, Metrics, ModelDetails, Role, ShowResponse, Tool,
    ToolCall, ToolProperty,
};

/// Finish reason Gemini reports on a normal stop
pub const STOP_REASON: &str = "STOP";

/// Role Gemini uses for model-authored turns
const MODEL_ROLE: &str = "model";

/// Role Gemini uses for caller turns, including function responses
const USER_ROLE: &str = "user";

/// Family reported for every Gemini model
const FAMILY: &str = "gemini";

/// A chat call split into Gemini's session shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeminiChatCall {
    /// Model identifier, without the `models/` prefix
    pub model: String,
    /// System instruction from the first system message
    pub system_instruction: Option<Content>,
    /// Single tool container holding every declaration
    pub tools: Vec<GeminiTool>,
    /// Sampling settings lifted from `options`
    pub generation_config: Option<GenerationConfig>,
    /// Prior turns, oldest first
    pub history: Vec<Content>,
    /// Parts of the new turn
    pub turn: Vec<Part>,
}

impl GeminiChatCall {
    /// Flatten into a `generateContent` request body
    pub fn into_request(self) -> GenerateContentRequest {
        let mut contents = self.history;
        contents.push(Content {
            role: Some(USER_ROLE.to_owned()),
            parts: self.turn,
        });

        GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction,
            tools: self.tools,
            generation_config: self.generation_config,
        }
    }
}

/// Qualify a model identifier with the `models/` resource prefix
pub fn qualified_model(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_owned()
    } else {
        format!("models/{model}")
    }
}

// -- Outbound: canonical request -> Gemini wire request --

/// Split a canonical chat request into a Gemini call
///
/// The request is validated first; nothing reaches the backend otherwise.
pub fn translate_request(request: &ChatRequest) -> Result<GeminiChatCall, LlmError> {
    request.validate()?;

    let Some((last, earlier)) = request.messages.split_last() else {
        return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
    };

    let system_instruction = request.system_prompt().map(system_instruction);

    let history = earlier
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: Some(history_role(m.role).to_owned()),
            parts: at_least_one(content_parts(m)),
        })
        .collect();

    Ok(GeminiChatCall {
        model: request.model.clone(),
        system_instruction,
        tools: tool_schema(&request.tools),
        generation_config: request.options.as_ref().and_then(generation_config),
        history,
        turn: at_least_one(content_parts(last)),
    })
}

/// Gemini takes text-only system instructions; attachments are logged and dropped
fn system_instruction(system: &Message) -> Content {
    if !system.images.is_empty() || !system.tool_calls.is_empty() {
        tracing::warn!(
            images = system.images.len(),
            tool_calls = system.tool_calls.len(),
            "system message attachments are not sent to gemini"
        );
    }

    Content {
        role: None,
        parts: vec![Part::text(system.content.clone())],
    }
}

const fn history_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => MODEL_ROLE,
        Role::User | Role::Tool | Role::System => USER_ROLE,
    }
}

/// Native parts for one message, in canonical order
///
/// Text first (never for tool messages), then the function response, then
/// one function call per tool call, then one inline-data part per image.
pub fn content_parts(message: &Message) -> Vec<Part> {
    let mut parts = Vec::new();

    if message.role != Role::Tool && !message.content.is_empty() {
        parts.push(Part::text(message.content.clone()));
    }

    if message.role == Role::Tool
        && let Some(part) = function_response(message)
    {
        parts.push(part);
    }

    for call in &message.tool_calls {
        parts.push(Part::function_call(
            call.function.name.clone(),
            call.function.arguments.clone(),
        ));
    }

    for image in &message.images {
        parts.push(Part::inline_data(detect_content_type(image.as_bytes()), image.to_base64()));
    }

    parts
}

/// Parse a tool result into a function-response part
///
/// Best effort: a payload that is not a JSON object, or that names no
/// function, is omitted and logged.
fn function_response(message: &Message) -> Option<Part> {
    let payload = match serde_json::from_str::<Value>(&message.content) {
        Ok(Value::Object(payload)) => payload,
        Ok(other) => {
            tracing::warn!(tool_name = ?message.tool_name, kind = json_kind(&other), "tool result is not a JSON object, omitting function response");
            return None;
        }
        Err(e) => {
            tracing::warn!(tool_name = ?message.tool_name, error = %e, "tool result is not valid JSON, omitting function response");
            return None;
        }
    };

    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| message.tool_name.clone());

    let Some(name) = name else {
        tracing::warn!("tool result names no function, omitting function response");
        return None;
    };

    Some(Part::function_response(name, payload))
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn at_least_one(mut parts: Vec<Part>) -> Vec<Part> {
    if parts.is_empty() {
        parts.push(Part::text(String::new()));
    }
    parts
}

/// Merge every declaration into a single tool container
pub fn tool_schema(tools: &[Tool]) -> Vec<GeminiTool> {
    if tools.is_empty() {
        return Vec::new();
    }

    vec![GeminiTool {
        function_declarations: tools.iter().map(declaration).collect(),
    }]
}

fn declaration(tool: &Tool) -> FunctionDeclaration {
    let params = &tool.function.parameters;

    let parameters = (!params.properties.is_empty()).then(|| Schema {
        properties: params
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), property_schema(property)))
            .collect(),
        required: params.required.clone(),
        ..Schema::of(SchemaType::Object)
    });

    FunctionDeclaration {
        name: tool.function.name.clone(),
        description: tool.function.description.clone(),
        parameters,
    }
}

fn property_schema(property: &ToolProperty) -> Schema {
    Schema {
        description: (!property.description.is_empty()).then(|| property.description.clone()),
        values: property
            .values
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned))
            .collect(),
        items: property.items.as_deref().map(|items| Box::new(property_schema(items))),
        properties: property
            .properties
            .iter()
            .map(|(name, nested)| (name.clone(), property_schema(nested)))
            .collect(),
        required: property.required.clone(),
        ..Schema::of(schema_type(property.kind.primary()))
    }
}

/// Map a canonical type tag to a Gemini schema type
///
/// Total: unrecognized or missing tags become `TYPE_UNSPECIFIED`.
pub fn schema_type(tag: Option<&str>) -> SchemaType {
    match tag.map(str::to_ascii_lowercase).as_deref() {
        Some("string") => SchemaType::String,
        Some("number" | "float" | "double") => SchemaType::Number,
        Some("integer" | "int") => SchemaType::Integer,
        Some("boolean" | "bool") => SchemaType::Boolean,
        Some("array") => SchemaType::Array,
        Some("object") => SchemaType::Object,
        _ => SchemaType::TypeUnspecified,
    }
}

fn generation_config(options: &Map<String, Value>) -> Option<GenerationConfig> {
    let as_u32 = |key: &str| options.get(key).and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok());

    let config = GenerationConfig {
        temperature: options.get("temperature").and_then(Value::as_f64),
        top_p: options.get("top_p").and_then(Value::as_f64),
        top_k: as_u32("top_k"),
        max_output_tokens: as_u32("num_predict"),
        stop_sequences: options.get("stop").and_then(Value::as_array).map(|stops| {
            stops
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        }),
    };

    (config != GenerationConfig::default()).then_some(config)
}

// -- Inbound: Gemini wire response -> canonical types --

/// Translate a `generateContent` response into a canonical chat response
///
/// Exactly one candidate is required; the adapter never picks among several.
pub fn translate_response(model: &str, response: GenerateContentResponse) -> Result<ChatResponse, LlmError> {
    let [candidate] = <[_; 1]>::try_from(response.candidates).map_err(|candidates: Vec<_>| {
        LlmError::Translation(format!("expected exactly one candidate, got {}", candidates.len()))
    })?;

    let mut content = String::new();
    let mut thinking = String::new();
    let mut tool_calls = Vec::new();

    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(text) = part.text {
            if part.thought == Some(true) {
                thinking.push_str(&text);
            } else {
                content.push_str(&text);
            }
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCall::new(call.name, call.args));
        }
    }

    let done = candidate.finish_reason.as_deref() == Some(STOP_REASON);

    let metrics = response
        .usage_metadata
        .map(|usage| Metrics {
            prompt_eval_count: Some(usage.prompt_token_count),
            eval_count: Some(usage.candidates_token_count),
            ..Metrics::default()
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        model: model.to_owned(),
        created_at: Timestamp::now(),
        message: Message {
            thinking: (!thinking.is_empty()).then_some(thinking),
            tool_calls,
            ..Message::assistant(content)
        },
        done_reason: candidate.finish_reason,
        done,
        metrics,
    })
}

/// Translate native model metadata into a descriptor
///
/// Supported generation methods become capability tags unchanged.
pub fn describe_model(model: &str, native: Model) -> ShowResponse {
    let mut model_info = Map::new();
    model_info.insert("general.architecture".to_owned(), Value::from(FAMILY));
    if let Some(name) = native.display_name {
        model_info.insert("general.name".to_owned(), Value::from(name));
    }
    if let Some(description) = native.description {
        model_info.insert("general.description".to_owned(), Value::from(description));
    }
    if let Some(version) = native.version {
        model_info.insert("general.version".to_owned(), Value::from(version));
    }
    if let Some(limit) = native.input_token_limit {
        model_info.insert(format!("{FAMILY}.context_length"), Value::from(limit));
    }
    if let Some(limit) = native.output_token_limit {
        model_info.insert(format!("{FAMILY}.output_token_limit"), Value::from(limit));
    }

    ShowResponse {
        model: model.to_owned(),
        details: ModelDetails {
            parent_model: native.base_model_id.unwrap_or_default(),
            family: FAMILY.to_owned(),
            families: vec![FAMILY.to_owned()],
            ..ModelDetails::default()
        },
        model_info,
        capabilities: native.supported_generation_methods,
        ..ShowResponse::default()
    }
}

/// One batch embedding request covering every input, in order
pub fn embed_request(request: &EmbedRequest) -> BatchEmbedContentsRequest {
    let model = qualified_model(&request.model);

    BatchEmbedContentsRequest {
        requests: request
            .input
            .to_vec()
            .into_iter()
            .map(|text| EmbedContentRequest {
                model: model.clone(),
                content: Content {
                    role: None,
                    parts: vec![Part::text(text)],
                },
                output_dimensionality: request.dimensions,
            })
            .collect(),
    }
}

/// Translate a batch embedding response, checking one vector per input
pub fn embed_response(
    model: &str,
    expected: usize,
    response: BatchEmbedContentsResponse,
) -> Result<EmbedResponse, LlmError> {
    if response.embeddings.len() != expected {
        return Err(LlmError::Translation(format!(
            "expected {expected} embeddings, got {}",
            response.embeddings.len()
        )));
    }

    Ok(EmbedResponse {
        model: model.to_owned(),
        embeddings: response.embeddings.into_iter().map(|e| e.values).collect(),
        ..EmbedResponse::default()
    })
}
