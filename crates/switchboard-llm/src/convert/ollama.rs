//! Conversion between canonical types and the Ollama wire format
//!
//! The canonical schema uses Ollama's field names, so this is a
//! field-by-field copy. The only real work is the image encoding and role
//! parsing.

use jiff::Timestamp;

use crate::error::LlmError;
use crate::protocol::ollama::{
    OllamaChatRequest, OllamaChatResponse, OllamaMessage, OllamaShowRequest, OllamaShowResponse,
};
use crate::types::{ChatRequest, ChatResponse, ImageData, Message, Role, ShowRequest, ShowResponse};

/// Finish reason Ollama reports on a normal stop
pub const STOP_REASON: &str = "stop";

// -- Outbound: canonical request -> Ollama wire request --

/// Build the native chat request; streaming is always off
pub fn translate_request(request: ChatRequest) -> OllamaChatRequest {
    OllamaChatRequest {
        model: request.model,
        messages: request.messages.into_iter().map(to_native_message).collect(),
        tools: request.tools,
        stream: false,
        format: request.format,
        options: request.options,
        keep_alive: request.keep_alive,
        think: request.think,
    }
}

fn to_native_message(message: Message) -> OllamaMessage {
    OllamaMessage {
        role: message.role.as_str().to_owned(),
        content: message.content,
        thinking: message.thinking,
        images: message.images.iter().map(ImageData::to_base64).collect(),
        tool_calls: message.tool_calls,
        tool_name: message.tool_name,
    }
}

/// Build the native show request
pub fn show_request(request: ShowRequest) -> OllamaShowRequest {
    OllamaShowRequest {
        model: request.model,
        verbose: request.verbose,
    }
}

// -- Inbound: Ollama wire response -> canonical types --

/// Translate a native chat response
///
/// `done` is derived from `done_reason`, not copied from the native flag.
pub fn translate_response(response: OllamaChatResponse) -> Result<ChatResponse, LlmError> {
    let done = response.done_reason.as_deref() == Some(STOP_REASON);

    Ok(ChatResponse {
        model: response.model,
        created_at: parse_timestamp(response.created_at.as_deref())?.unwrap_or_else(Timestamp::now),
        message: from_native_message(response.message)?,
        done_reason: response.done_reason,
        done,
        metrics: response.metrics,
    })
}

fn from_native_message(message: OllamaMessage) -> Result<Message, LlmError> {
    let role = parse_role(&message.role)?;

    let images = message
        .images
        .iter()
        .map(|encoded| {
            ImageData::from_base64(encoded).map_err(|e| LlmError::Translation(format!("invalid image payload: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Message {
        role,
        content: message.content,
        thinking: message.thinking,
        images,
        tool_calls: message.tool_calls,
        tool_name: message.tool_name,
    })
}

fn parse_role(role: &str) -> Result<Role, LlmError> {
    match role {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        "tool" => Ok(Role::Tool),
        other => Err(LlmError::Translation(format!("unknown message role '{other}'"))),
    }
}

fn parse_timestamp(raw: Option<&str>) -> Result<Option<Timestamp>, LlmError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Timestamp>()
                .map_err(|e| LlmError::Translation(format!("invalid timestamp '{s}': {e}")))
        })
        .transpose()
}

/// Translate native model metadata into a descriptor
///
/// Capability identifiers are passed through untouched.
pub fn describe_model(model: &str, response: OllamaShowResponse) -> Result<ShowResponse, LlmError> {
    Ok(ShowResponse {
        model: model.to_owned(),
        license: response.license,
        modelfile: response.modelfile,
        parameters: response.parameters,
        template: response.template,
        system: response.system,
        details: response.details,
        model_info: response.model_info,
        capabilities: response.capabilities,
        modified_at: parse_timestamp(response.modified_at.as_deref())?,
    })
}
