use std::collections::HashMap;
use std::sync::Arc;

use async_nats::service::ServiceExt;
use futures_util::stream::{self, BoxStream, StreamExt};
use switchboard_core::CallContext;
use switchboard_llm::schema::endpoint_schema;
use switchboard_llm::{Backend, Operation};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::ServiceError;
use crate::router::Router;

/// Endpoint metadata key holding the request/response schema
pub const SCHEMA_METADATA_KEY: &str = "schema";

type Inbound = (Arc<dyn Backend>, Operation, async_nats::service::Request);

/// Registers one NATS micro-service per backend and serves it
pub struct Service {
    client: async_nats::Client,
    router: Arc<Router>,
}

impl Service {
    /// Service over an established bus connection
    pub fn new(client: async_nats::Client, router: Router) -> Self {
        Self {
            client,
            router: Arc::new(router),
        }
    }

    /// Register every endpoint and serve requests until `shutdown` is cancelled
    ///
    /// Each request runs on its own task. On shutdown, in-flight requests are
    /// cancelled, their replies are sent, and the services are stopped.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), ServiceError> {
        let mut services = Vec::with_capacity(self.router.backends().len());
        let mut endpoints: Vec<BoxStream<'static, Inbound>> = Vec::new();

        for backend in self.router.backends() {
            let name = service_name(backend.name());
            let service = self
                .client
                .service_builder()
                .description(format!("{} backend for the canonical chat protocol", backend.name()))
                .start(name.as_str(), env!("CARGO_PKG_VERSION"))
                .await
                .map_err(|e| ServiceError::Register {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;

            let group = service.group(backend.name());

            for &operation in backend.operations() {
                let metadata = HashMap::from([(SCHEMA_METADATA_KEY.to_owned(), endpoint_schema(operation)?)]);
                let endpoint = group
                    .endpoint_builder()
                    .metadata(metadata)
                    .add(operation.as_str())
                    .await
                    .map_err(|e| ServiceError::Endpoint {
                        subject: operation.subject(backend.name()),
                        reason: e.to_string(),
                    })?;

                tracing::info!(subject = %operation.subject(backend.name()), service = %name, "endpoint registered");

                let owner = backend.clone();
                endpoints.push(
                    endpoint
                        .map(move |request| (owner.clone(), operation, request))
                        .boxed(),
                );
            }

            services.push(service);
        }

        let mut inbound = stream::select_all(endpoints);
        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("shutdown requested, draining in-flight requests");
                    break;
                }
                next = inbound.next() => {
                    let Some((backend, operation, request)) = next else {
                        tracing::warn!("all endpoints closed");
                        break;
                    };

                    let router = self.router.clone();
                    let context = CallContext::new().cancelled_by(shutdown.child_token());

                    tracker.spawn(async move {
                        let reply = router
                            .dispatch(backend.as_ref(), operation, &request.message.payload, &context)
                            .await;

                        if let Err(e) = request.respond(reply.into_service_result()).await {
                            tracing::warn!(backend = backend.name(), %operation, error = %e, "failed to send reply");
                        }
                    });
                }
            }
        }

        tracker.close();
        tracker.wait().await;

        for service in services {
            if let Err(e) = service.stop().await {
                tracing::warn!(error = %e, "failed to stop service");
            }
        }

        tracing::info!("services stopped");
        Ok(())
    }
}

/// Service name for a backend (`ollama` -> `NatsOllama`)
pub fn service_name(backend: &str) -> String {
    let mut chars = backend.chars();
    let capitalized: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    format!("Nats{capitalized}")
}
