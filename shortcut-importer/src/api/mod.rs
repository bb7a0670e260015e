//! Rate-limited JSON client for the Shortcut and ZenHub REST APIs.
//!
//! Every call waits for a slot in the client's [`SlidingWindow`] before it is
//! sent, so bursts sleep instead of being rejected by the remote service.

mod error;

pub use error::ApiError;

use crate::rate_limit::{RateLimit, SlidingWindow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::trace;
use url::Url;

/// Authenticated JSON client bound to one service's base URL.
#[derive(Debug)]
pub struct ApiClient {
    service: &'static str,
    http: reqwest::Client,
    base_url: Url,
    window: Mutex<SlidingWindow>,
}

impl ApiClient {
    /// Builds a client that sends `token` in the `auth_header` header on every request.
    ///
    /// `auth_header` must be a lowercase header name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the base URL or token is invalid, or the client cannot be built.
    pub fn new(
        service: &'static str,
        base_url: &str,
        auth_header: &'static str,
        token: &str,
        limit: RateLimit,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let mut auth = HeaderValue::from_str(token)
            .map_err(|source| ApiError::InvalidToken { service, source })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(auth_header), auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("shortcut-importer/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            service,
            http,
            base_url,
            window: Mutex::new(SlidingWindow::new(limit)),
        })
    }

    /// Name of the remote service, used in error messages.
    #[must_use]
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Sends a GET request with optional query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] on non-2xx responses, or a transport error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(request).await
    }

    /// Sends a POST request. Null-valued top-level fields are removed from the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] on non-2xx responses, or a transport error.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = strip_nulls(serde_json::to_value(body)?);
        let request = self.request(Method::POST, path)?.json(&body);
        self.send(request).await
    }

    /// Sends a PUT request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Remote`] on non-2xx responses, or a transport error.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path)?.json(body);
        self.send(request).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })?;
        trace!(service = self.service, %method, %url, "Sending request");
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.window.lock().await.acquire().await;

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote {
                service: self.service,
                status: status.as_u16(),
                message: remote_message(&body),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Parses a base URL, making sure relative paths join beneath it.
fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Url::parse(&normalized).map_err(|source| ApiError::InvalidUrl {
        url: base_url.to_string(),
        source,
    })
}

/// Removes null-valued fields from a JSON object; other values pass through.
///
/// The Shortcut API rejects explicit nulls for optional fields.
pub(crate) fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}

/// Extracts the remote `message` field from an error body, falling back to the raw text.
pub(crate) fn remote_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
