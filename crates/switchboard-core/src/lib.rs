//! Shared primitives for Switchboard
//!
//! Holds the per-call context that carries deadlines and cancellation
//! across the bus, and the trait that maps domain errors onto reply codes.

#![allow(clippy::must_use_candidate)]

mod context;
mod error;

pub use context::CallContext;
pub use error::{BAD_REQUEST, Interrupted, ReplyError, SERVER_ERROR};
