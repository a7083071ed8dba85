//! In-process transport that hands requests straight to a router

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use switchboard_client::{ClientError, Transport};
use switchboard_core::CallContext;
use switchboard_service::{Reply, Router};

/// Delivers each request to [`Router::route`] as if it had crossed the bus
#[derive(Clone)]
pub struct Loopback {
    router: Arc<Router>,
}

impl Loopback {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

#[async_trait]
impl Transport for Loopback {
    async fn request(&self, subject: String, payload: Bytes, timeout: Duration) -> Result<Bytes, ClientError> {
        let reply = self
            .router
            .route(&subject, &payload, &CallContext::with_timeout(timeout))
            .await;

        match reply {
            Reply::Success(body) => Ok(body),
            Reply::Failure { code, description } => Err(ClientError::Service {
                code: code.to_owned(),
                description,
            }),
        }
    }
}
