//! HTTP transport to the lead-scanning service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

/// Transport seam between the view and the remote service.
///
/// Implementations POST `body` to `path` and hand back the raw 2xx body;
/// anything else is a [`TransportError`].
#[async_trait]
pub trait LeadBackend: Send + Sync {
    async fn post_json(&self, path: &str, body: &Value) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed transport against one backend origin.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    origin: String,
}

impl HttpBackend {
    /// Build a transport for `origin`. `timeout` of `None` waits indefinitely.
    pub fn new(origin: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            client: builder.build()?,
            origin: origin.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.origin, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl LeadBackend for HttpBackend {
    async fn post_json(&self, path: &str, body: &Value) -> Result<Vec<u8>, TransportError> {
        let url = self.endpoint(path);
        debug!(%url, "dispatching scan request");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(%url, bytes = bytes.len(), "scan response received");
        Ok(bytes.to_vec())
    }
}
