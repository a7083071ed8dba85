//! Wire format types for the native backend APIs
//!
//! Each module contains pure serde structs matching the respective backend's
//! JSON API format. These types are only used at the HTTP boundary; the rest
//! of the crate speaks the canonical types.

pub mod gemini;
pub mod ollama;
