//! JSON Schema descriptions published as endpoint metadata
//!
//! Advisory only: dispatch never consults them.

use schemars::schema_for;
use serde_json::json;

use crate::error::LlmError;
use crate::types::{
    ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse, GenerateRequest,
    GenerateResponse, Operation, ShowRequest, ShowResponse,
};

/// `{"request": <schema>, "response": <schema>}` for `operation`, as JSON text
pub fn endpoint_schema(operation: Operation) -> Result<String, LlmError> {
    let (request, response) = match operation {
        Operation::Chat => (schema_for!(ChatRequest), schema_for!(ChatResponse)),
        Operation::Generate => (schema_for!(GenerateRequest), schema_for!(GenerateResponse)),
        Operation::Embed => (schema_for!(EmbedRequest), schema_for!(EmbedResponse)),
        Operation::Embedding => (schema_for!(EmbeddingRequest), schema_for!(EmbeddingResponse)),
        Operation::Show => (schema_for!(ShowRequest), schema_for!(ShowResponse)),
    };

    serde_json::to_string(&json!({ "request": request, "response": response }))
        .map_err(|e| LlmError::Encode(e.to_string()))
}
