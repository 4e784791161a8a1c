//! Minimal HTTP transport used by every backend client.
//!
//! Clients never talk to `reqwest` directly: they hand an [`HttpRequest`]
//! (method, path relative to a base URL, optional JSON body) to a
//! [`Transport`] and get back an [`HttpResponse`] with status, body and
//! headers. This keeps the clients testable with scripted transports.
//!
//! The transport performs no retries and sets no timeout.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Boxed future returned by [`Transport::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors produced at the transport level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Upstream answered with a status outside `200..=299`.
    #[error("HTTP request failed with status code {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response (connect/IO failure).
    #[error("HTTP request to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client init failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single request relative to the transport's base URL.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// Already-serialized JSON body.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Response returned by a [`Transport`], regardless of status.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    /// Method and full URL of the originating request, for diagnostics.
    pub request_method: String,
    pub request_url: String,
}

impl HttpResponse {
    /// Builds a response with only status and body set.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Self::default()
        }
    }

    /// Records the originating request, as [`ReqwestTransport`] does.
    pub fn for_request(mut self, method: &Method, url: impl Into<String>) -> Self {
        self.request_method = method.to_string();
        self.request_url = url.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx response into [`TransportError::Status`].
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Sends a request and returns the raw response.
///
/// Implementations must not interpret the status code: a 404 is a valid
/// response, not an error.
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// `reqwest`-backed transport bound to a single base URL.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url` (e.g. `http://localhost:6333`).
    ///
    /// # Errors
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    #[instrument(level = "debug", skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        let resp = builder.send().await.map_err(|source| {
            warn!(%url, error = %source, "request failed before a response was received");
            TransportError::Connect {
                url: url.clone(),
                source,
            }
        })?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = resp.text().await.map_err(|source| TransportError::Connect {
            url: url.clone(),
            source,
        })?;

        debug!(status, body_len = body.len(), "response received");

        Ok(HttpResponse {
            status,
            body,
            headers,
            ..HttpResponse::default()
        }
        .for_request(&request.method, url))
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(self.perform(request))
    }
}

/// Joins a base URL and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
