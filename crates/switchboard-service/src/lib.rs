//! NATS micro-service layer for Switchboard
//!
//! [`Router`] binds each (backend, operation) pair to a subject and turns a
//! request body into exactly one reply. [`Service`] registers the endpoints
//! on a NATS connection and drives the router until shutdown.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod router;
mod server;

pub use error::ServiceError;
pub use router::{DEFAULT_READINESS_TIMEOUT, Reply, Router};
pub use server::{SCHEMA_METADATA_KEY, Service, service_name};
