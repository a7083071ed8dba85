#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Caller-side stub for the Switchboard LLM services
//!
//! Encodes canonical requests, sends them to `<backend>.<operation>` on the
//! bus and decodes the canonical reply.

mod client;
pub mod error;
pub mod transport;

pub use client::{DEFAULT_TIMEOUT, LlmClient};
pub use error::{ClientError, Result};
pub use transport::Transport;
