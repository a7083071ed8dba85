use std::sync::Arc;
use std::time::Duration;

use async_nats::RequestErrorKind;
use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ClientError, Result};

/// Header carrying the numeric code of an error reply
pub const SERVICE_ERROR_CODE: &str = "Nats-Service-Error-Code";
/// Header carrying the description of an error reply
pub const SERVICE_ERROR: &str = "Nats-Service-Error";

/// One request/reply exchange on the bus
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `payload` to `subject` and wait up to `timeout` for the reply body
    ///
    /// Error replies must surface as [`ClientError::Service`].
    async fn request(&self, subject: String, payload: Bytes, timeout: Duration) -> Result<Bytes>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, subject: String, payload: Bytes, timeout: Duration) -> Result<Bytes> {
        (**self).request(subject, payload, timeout).await
    }
}

#[async_trait]
impl Transport for async_nats::Client {
    async fn request(&self, subject: String, payload: Bytes, timeout: Duration) -> Result<Bytes> {
        let request = async_nats::Request::new()
            .payload(payload)
            .timeout(Some(timeout));

        let message = self
            .send_request(subject, request)
            .await
            .map_err(|e| match e.kind() {
                RequestErrorKind::TimedOut => ClientError::Timeout(timeout),
                RequestErrorKind::NoResponders => ClientError::Transport("no responders on subject".into()),
                _ => ClientError::Transport(e.to_string()),
            })?;

        if let Some(headers) = &message.headers
            && let Some(code) = headers.get(SERVICE_ERROR_CODE)
        {
            let description = headers
                .get(SERVICE_ERROR)
                .map(|value| value.as_str().to_owned())
                .unwrap_or_default();

            return Err(ClientError::Service {
                code: code.as_str().to_owned(),
                description,
            });
        }

        Ok(message.payload)
    }
}
