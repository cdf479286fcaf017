//! Transport layer abstraction for cluster requests.
//!
//! The store speaks to the cluster only through [`Transport`], so tests can
//! script responses with [`MockTransport`] and deployments can plug in any
//! HTTP client. An implementation on the official `elasticsearch` client
//! lives behind the `http` feature.

use jstore_core::StoreError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// HTTP method of a cluster request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// A request relative to the cluster base URL.
///
/// The path is kept as raw segments; transports percent-encode them, so
/// document ids may contain any character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Unencoded path segments.
    pub segments: Vec<String>,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<String>,
}

impl Request {
    /// Creates a request without query or body.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a body that is already serialized JSON.
    #[must_use]
    pub fn with_body(mut self, json: impl Into<String>) -> Self {
        self.body = Some(json.into());
        self
    }

    /// Returns the value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the path as `/segment/segment`, unencoded.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

/// A cluster response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl Response {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Returns the cluster's error type, e.g. `index_not_found_exception`.
    pub fn error_type(&self) -> Option<String> {
        let body: Value = self.json().ok()?;
        body.get("error")?
            .get("type")?
            .as_str()
            .map(str::to_string)
    }

    /// Returns a human-readable error description.
    pub fn error_reason(&self) -> String {
        let reason = self.json::<Value>().ok().and_then(|body| {
            let error = body.get("error")?;
            match error.get("reason").and_then(Value::as_str) {
                Some(reason) => Some(reason.to_string()),
                None => error.as_str().map(str::to_string),
            }
        });
        reason.unwrap_or_else(|| self.body.clone())
    }
}

/// Failure to exchange a request with the cluster.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The cluster could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// A response arrived but could not be read.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<TransportError> for StoreError {
    fn from(err: TransportError) -> Self {
        StoreError::transport(err.to_string())
    }
}

/// Sends requests to a cluster.
pub trait Transport: Send + Sync {
    /// Sends one request and returns the response, whatever its status.
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

/// A transport answering from a script, for tests.
///
/// Responses are returned in the order they were pushed. Every request is
/// recorded. Sending with an empty script fails with
/// [`TransportError::Connection`].
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Response, TransportError>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Creates a mock transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a raw body.
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script.lock().push_back(Ok(Response::new(status, body)));
    }

    /// Queues a response with a JSON body.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(status, body.to_string());
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.script.lock().push_back(Err(error));
    }

    /// Returns every request sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }

    /// Returns the number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.script.lock().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        self.requests.lock().push(request.clone());
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(TransportError::Connection(format!(
                "no scripted response for {request}"
            )))
        })
    }
}

#[cfg(feature = "http")]
pub use self::http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::{Method, Request, Response, Transport, TransportError};
    use elasticsearch::http::headers::HeaderMap;
    use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
    use elasticsearch::Elasticsearch;
    use jstore_core::{StoreError, StoreResult};
    use std::time::Duration;
    use tokio::runtime::Runtime;
    use url::Url;

    /// Blocking transport on the official `elasticsearch` client.
    ///
    /// The transport owns the runtime that drives the client, so it must not
    /// be used from inside another async runtime.
    #[derive(Debug)]
    pub struct HttpTransport {
        base_url: Url,
        client: Elasticsearch,
        runtime: Runtime,
    }

    impl HttpTransport {
        /// Creates a transport for the cluster at `base_url`.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::InvalidConfig`] if the client or its runtime
        /// cannot be built.
        pub fn new(mut base_url: Url, timeout: Duration) -> StoreResult<Self> {
            if base_url.cannot_be_a_base() {
                return Err(StoreError::invalid_config(format!(
                    "cluster url {base_url} cannot hold a path"
                )));
            }
            if !base_url.path().ends_with('/') {
                let path = format!("{}/", base_url.path());
                base_url.set_path(&path);
            }

            let pool = SingleNodeConnectionPool::new(base_url.clone());
            let transport = TransportBuilder::new(pool)
                .timeout(timeout)
                .build()
                .map_err(|e| StoreError::invalid_config(format!("elasticsearch client: {e}")))?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("jstore-elastic")
                .enable_all()
                .build()
                .map_err(|e| StoreError::invalid_config(format!("client runtime: {e}")))?;

            Ok(Self {
                base_url,
                client: Elasticsearch::new(transport),
                runtime,
            })
        }

        /// Returns the cluster base URL.
        pub fn base_url(&self) -> &Url {
            &self.base_url
        }

        /// Percent-encoded path of `request`, relative to the base URL.
        fn path(&self, request: &Request) -> Result<String, TransportError> {
            let mut scratch = self.base_url.clone();
            scratch
                .path_segments_mut()
                .map_err(|()| {
                    TransportError::Connection(format!("bad base url {}", self.base_url))
                })?
                .clear()
                .extend(&request.segments);
            Ok(scratch.path().trim_start_matches('/').to_string())
        }
    }

    impl Transport for HttpTransport {
        fn send(&self, request: &Request) -> Result<Response, TransportError> {
            let method = match request.method {
                Method::Get => elasticsearch::http::Method::Get,
                Method::Put => elasticsearch::http::Method::Put,
                Method::Post => elasticsearch::http::Method::Post,
                Method::Delete => elasticsearch::http::Method::Delete,
            };
            let path = self.path(request)?;
            let query = (!request.query.is_empty()).then_some(&request.query);

            self.runtime.block_on(async {
                let response = self
                    .client
                    .send(
                        method,
                        &path,
                        HeaderMap::new(),
                        query,
                        request.body.clone(),
                        None,
                    )
                    .await
                    .map_err(|e| {
                        if e.is_timeout() {
                            TransportError::Timeout
                        } else {
                            TransportError::Connection(e.to_string())
                        }
                    })?;
                let status = response.status_code().as_u16();
                let body = response
                    .text()
                    .await
                    .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;
                Ok(Response { status, body })
            })
        }
    }

}
