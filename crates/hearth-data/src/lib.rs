//! Outbound HTTP client utilities for Hearth.
//!
//! A thin builder over `reqwest` used to reach the payment gateway and the
//! image host. Every response is buffered, so callers inspect status and
//! body synchronously once `send` resolves.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_data::FetchClient;
//!
//! let client = FetchClient::new()?.with_base_url("https://api.razorpay.com");
//! let order: GatewayOrder = client
//!     .post("/v1/orders")
//!     .basic_auth(&key_id, Some(&key_secret))
//!     .json(&body)?
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;

pub use error::FetchError;
pub use request::{Body, FilePart, Method, MultipartForm, RequestBuilder};
pub use response::Response;

use std::time::{Duration, Instant};

/// Outbound request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for making outbound requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::Client,
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl FetchClient {
    /// Create a client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hearth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            inner,
            base_url: None,
            default_headers: Vec::new(),
        })
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let full_url = self.resolve_url(url.into());
        let builder =
            RequestBuilder::new(method, full_url).headers(self.default_headers.iter().cloned());
        ClientRequestBuilder {
            client: self.inner.clone(),
            builder,
        }
    }

    fn resolve_url(&self, url: String) -> String {
        match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        }
    }
}

/// A request builder bound to a client.
#[derive(Debug)]
pub struct ClientRequestBuilder {
    client: reqwest::Client,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set a url-encoded form body.
    pub fn form(mut self, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        self.builder = self.builder.form(fields);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Add a basic authorization header.
    pub fn basic_auth(mut self, username: impl AsRef<str>, password: Option<&str>) -> Self {
        self.builder = self.builder.basic_auth(username, password);
        self
    }

    /// The request as built so far.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and buffer the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        let method = self.builder.method();
        let url = self.builder.url().to_string();
        let started = Instant::now();
        let request = self.builder.into_reqwest(&self.client)?;
        let result = match request.send().await {
            Ok(response) => Response::from_reqwest(response).await,
            Err(e) => Err(e.into()),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => tracing::debug!(
                method = method.as_str(),
                %url,
                status = response.status,
                elapsed_ms,
                "outbound request"
            ),
            Err(e) => tracing::warn!(
                method = method.as_str(),
                %url,
                elapsed_ms,
                error = %e,
                "outbound request failed"
            ),
        }
        result
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, MultipartForm, Response};
}
