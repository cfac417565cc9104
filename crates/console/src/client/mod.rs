//! HTTP client adapter for the portfolio backend.
//!
//! All requests go to a single base origin. Each request:
//! - resolves the bearer credential afresh and attaches
//!   `Authorization: Bearer <token>` when one exists
//! - carries a fresh `x-request-id`
//! - decodes a success body (bare or wrapped in `{"data": ...}`)
//! - turns any failure into a normalized [`ApiError`]
//!
//! There are no retries, no token refresh and no request queueing.

mod error;
mod form;

pub use error::{ApiError, GENERIC_ERROR_MESSAGE, extract_message};
pub use form::{Body, encode_field};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ConsoleConfig;
use crate::credential::CredentialSource;

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_AGENT_VALUE: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// Success body, either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Portfolio backend client.
///
/// Cheap to clone; clones share the connection pool and credential source.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    credential: CredentialSource,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("credential", &self.inner.credential)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client fails to build.
    pub fn new(
        base_url: Url,
        credential: CredentialSource,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::from_transport(&e))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                credential,
            }),
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client fails to build.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::new(
            config.api_url.clone(),
            config.credential.clone(),
            config.timeout,
        )
    }

    /// The configured base origin.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the absolute URL for a route with optional query pairs.
    ///
    /// Each entry of `route` becomes one percent-encoded path segment appended
    /// to the base URL's path, so a base of `https://host/backend` keeps its
    /// `/backend` prefix and an identifier containing `/`, `?` or `#` cannot
    /// reach another route.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty, `.` or `..` segment, or
    /// if the base URL cannot take a path.
    pub fn endpoint(&self, route: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        if let Some(segment) = route
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(ApiError::Validation(format!("Invalid path segment {segment:?}")));
        }

        let mut url = self.inner.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Validation(format!("Base URL {} cannot take a path", self.base_url()))
            })?
            .pop_if_empty()
            .extend(route);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Perform a request and decode the response body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] for transport failures, non-success
    /// statuses, and undecodable success bodies.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &[&str],
        query: &[(&str, String)],
        body: Option<Body>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(route, query)?;
        let bytes = self.send(method, &url, body).await?;
        decode::<Envelope<T>>(&url, &bytes).map(Envelope::into_inner)
    }

    /// Perform a request and decode the whole response body as `T`, without
    /// unwrapping a `{"data": ...}` envelope.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`].
    pub async fn request_document<T: DeserializeOwned>(
        &self,
        method: Method,
        route: &[&str],
        query: &[(&str, String)],
        body: Option<Body>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(route, query)?;
        let bytes = self.send(method, &url, body).await?;
        decode(&url, &bytes)
    }

    /// Perform a request whose success body is ignored.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] for transport failures and
    /// non-success statuses.
    pub async fn request_empty(
        &self,
        method: Method,
        route: &[&str],
        body: Option<Body>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(route, &[])?;
        self.send(method, &url, body).await.map(|_| ())
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        route: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, route, query, None).await
    }

    /// Execute a POST request.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        route: &[&str],
        body: Body,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, route, &[], Some(body)).await
    }

    /// Execute a PUT request.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        route: &[&str],
        body: Body,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, route, &[], Some(body)).await
    }

    /// Execute a DELETE request, ignoring the response body.
    pub(crate) async fn delete(&self, route: &[&str]) -> Result<(), ApiError> {
        self.request_empty(Method::DELETE, route, None).await
    }

    /// Send the request and return the raw success body.
    #[instrument(
        skip_all,
        fields(
            method = %method,
            path = %url.path(),
            request_id = tracing::field::Empty,
            status = tracing::field::Empty,
        )
    )]
    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<Body>,
    ) -> Result<Vec<u8>, ApiError> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        let mut request = self
            .inner
            .http
            .request(method, url.clone())
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(token) = self.inner.credential.resolve().await {
            request = request.bearer_auth(token.expose_secret());
        } else {
            debug!("No credential available, sending without Authorization header");
        }

        request = match body {
            Some(Body::Json(value)) => request.json(&value),
            Some(Body::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response was received");
            ApiError::from_transport(&e)
        })?;

        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if status.is_success() {
            debug!(bytes = bytes.len(), "Request succeeded");
            return Ok(bytes.to_vec());
        }

        let err = ApiError::from_status(status, extract_message(&bytes));
        warn!(kind = err.kind(), error = %err, "Backend returned an error");
        Err(err)
    }
}

/// Decode a success body.
fn decode<T: DeserializeOwned>(url: &Url, bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        warn!(path = %url.path(), error = %e, "Failed to decode response body");
        ApiError::Decode(format!("Unexpected response from server: {e}"))
    })
}
