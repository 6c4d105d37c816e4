//! Request client: assembly, the identity header contract, fault mapping.
//!
//! Every outbound call attaches the session id header; the bearer header is
//! attached only when the identity resolved *for that call* carries a token.
//! The client is stateless per request - no retry, no backoff, no coalescing
//! (read coalescing is the cache's job).

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument};
use url::Url;

use crate::fault::Fault;
use crate::identity::{Identity, IdentityVault, ProfileError};

/// Session id header, attached to every call.
pub const SESSION_HEADER: &str = "x-session-id";

/// Bearer token header, attached only when authenticated.
pub const AUTH_HEADER: &str = "authorization";

/// Log no more than this much of an unexpected response body.
const BODY_LOG_LIMIT: usize = 500;

/// An assembled outbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: reqwest::Method,
    /// Fully resolved URL including query parameters.
    pub url: Url,
    /// Headers in attach order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

/// A raw response from the transport.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl ApiResponse {
    const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport seam between request assembly and the wire.
///
/// Production uses [`HttpTransport`]; tests substitute a double to observe
/// assembled requests or script responses without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request, resolving transport-level failure to a fault.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, Fault>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns a fault if the underlying client cannot be constructed.
    pub fn new(timeout: std::time::Duration) -> Result<Self, Fault> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, Fault> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

/// Headers implied by an identity: session id always, bearer when present.
#[must_use]
pub fn identity_headers(identity: &Identity) -> Vec<(String, String)> {
    let mut headers = vec![(SESSION_HEADER.to_string(), identity.session_id.clone())];
    if let Some(token) = identity.token() {
        headers.push((AUTH_HEADER.to_string(), format!("Bearer {token}")));
    }
    headers
}

/// Builds and executes calls against the configured backend.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    vault: IdentityVault,
}

impl RequestClient {
    /// Create a client over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, base_url: Url, vault: IdentityVault) -> Self {
        Self {
            transport,
            base_url,
            vault,
        }
    }

    fn resolve_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, Fault> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Fault::internal(format!("invalid request path {path:?}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Execute a call and decode the JSON payload.
    ///
    /// The identity is resolved per call, so a token written by a login on
    /// the shared profile store takes effect on the very next request.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] for transport failure, a non-2xx response, or an
    /// undecodable success body.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, Fault> {
        let identity = self.vault.resolve().map_err(ProfileError::into_fault)?;
        let request = ApiRequest {
            method,
            url: self.resolve_url(path, query)?,
            headers: identity_headers(&identity),
            body,
        };

        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            debug!(
                status = response.status,
                body = %truncate(&response.body),
                "backend returned non-success status"
            );
            return Err(Fault::from_status(response.status, &response.body));
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&response.body),
                "failed to decode backend response"
            );
            Fault::from(e)
        })
    }

    /// GET and decode into `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Fault> {
        let value = self.call(reqwest::Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST a JSON body and decode into `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, Fault> {
        let value = self
            .call(reqwest::Method::POST, path, &[], Some(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// PUT a JSON body and decode into `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, Fault> {
        let value = self
            .call(reqwest::Method::PUT, path, &[], Some(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// DELETE and decode into `T` (use `Value` and ignore for empty bodies).
    ///
    /// # Errors
    ///
    /// See [`Self::call`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Fault> {
        let value = self.call(reqwest::Method::DELETE, path, &[], None).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl ProfileError {
    pub(crate) fn into_fault(self) -> Fault {
        Fault::Internal(self.to_string())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(BODY_LOG_LIMIT).collect()
}
