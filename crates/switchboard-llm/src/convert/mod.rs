//! Translation between canonical types and native wire formats
//!
//! Translation is pure: no I/O, no clocks other than stamping `created_at`.
//! Each submodule handles one backend's protocol.

pub mod gemini;
pub mod ollama;
