//! HTTP API client for the poker node's gateway.
//!
//! The gateway is the authoritative game engine; this client only moves JSON
//! in and out of it. It is a plain value constructed from a base URL so that
//! stores and dispatchers can be given independent instances.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::entities::{
    ActionRequest, ActionResponse, Chips, ConnectRequest, HealthResponse, PlayersSnapshot,
    TableState,
};

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request produced no response at all (refused, DNS, timeout).
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// A success response carried a body we could not decode.
    #[error("Failed to parse gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Transport failures are the only failures safe to retry for reads.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Error body shape the node uses for rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// The fixed set of operations the remote node exposes.
///
/// The store and dispatcher depend on this trait rather than on a concrete
/// HTTP client, so tests can drive them with an in-process implementation.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, GatewayError>;
    async fn table_state(&self) -> Result<TableState, GatewayError>;
    async fn players(&self) -> Result<PlayersSnapshot, GatewayError>;
    async fn ready(&self) -> Result<ActionResponse, GatewayError>;
    async fn fold(&self) -> Result<ActionResponse, GatewayError>;
    async fn check(&self) -> Result<ActionResponse, GatewayError>;
    async fn call(&self) -> Result<ActionResponse, GatewayError>;
    async fn bet(&self, value: Chips) -> Result<ActionResponse, GatewayError>;
    async fn raise(&self, value: Chips) -> Result<ActionResponse, GatewayError>;
    /// Ask the node to join a peer. The ack body is node-defined, so only
    /// success or failure is reported.
    async fn connect_peer(&self, addr: &str) -> Result<(), GatewayError>;
}

/// Reqwest-backed [`Gateway`] implementation.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        log::debug!("GET {path}");
        let response = self
            .client
            .get(self.url(path))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> Result<T, GatewayError> {
        log::debug!("POST {path}");
        let mut request = self.client.post(self.url(path)).timeout(REQUEST_TIMEOUT);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        decode(response).await
    }
}

/// Turn a response into `T`, surfacing the node's `error` field on rejection.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("Connection failed: {}", status.as_u16()));
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait]
impl Gateway for ApiClient {
    async fn health(&self) -> Result<HealthResponse, GatewayError> {
        self.get_json("/api/health").await
    }

    async fn table_state(&self) -> Result<TableState, GatewayError> {
        self.get_json("/api/table").await
    }

    async fn players(&self) -> Result<PlayersSnapshot, GatewayError> {
        self.get_json("/api/players").await
    }

    async fn ready(&self) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/ready", None::<&ActionRequest>).await
    }

    async fn fold(&self) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/fold", None::<&ActionRequest>).await
    }

    async fn check(&self) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/check", None::<&ActionRequest>).await
    }

    async fn call(&self) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/call", None::<&ActionRequest>).await
    }

    async fn bet(&self, value: Chips) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/bet", Some(&ActionRequest { value }))
            .await
    }

    async fn raise(&self, value: Chips) -> Result<ActionResponse, GatewayError> {
        self.post_json("/api/raise", Some(&ActionRequest { value }))
            .await
    }

    async fn connect_peer(&self, addr: &str) -> Result<(), GatewayError> {
        // The ack body is node-defined; only the status matters.
        let _: serde_json::Value = self
            .post_json(
                "/api/connect",
                Some(&ConnectRequest {
                    addr: addr.to_string(),
                }),
            )
            .await?;
        Ok(())
    }
}
