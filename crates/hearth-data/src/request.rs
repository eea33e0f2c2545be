//! HTTP request builder.

use crate::FetchError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// One file in a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A `multipart/form-data` body: text fields plus files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn into_reqwest(self) -> Result<reqwest::multipart::Form, FetchError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename);
            if let Some(ct) = file.content_type {
                part = part
                    .mime_str(&ct)
                    .map_err(|e| FetchError::RequestError(format!("invalid content type: {e}")))?;
            }
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bytes(Vec<u8>),
    /// `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<Body>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body_ref(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Get a header value, case-insensitively.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Add a header, replacing any existing value under the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Add multiple headers to the request.
    pub fn headers(self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        headers
            .into_iter()
            .fold(self, |builder, (k, v)| builder.header(k, v))
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Bytes(body.into()));
        self
    }

    /// Set the request body as a string.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        if self.header_value("Content-Type").is_none() {
            self = self.header("Content-Type", "text/plain");
        }
        self.body = Some(Body::Bytes(text.into().into_bytes()));
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self = self.header("Content-Type", "application/json");
        self.body = Some(Body::Bytes(json));
        Ok(self)
    }

    /// Set a url-encoded form body.
    pub fn form(mut self, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        self.body = Some(Body::Form(fields.into_iter().collect()));
        self
    }

    /// Set a multipart body. The client picks the boundary.
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(Body::Multipart(form));
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Add a basic authorization header.
    pub fn basic_auth(self, username: impl AsRef<str>, password: Option<&str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.unwrap_or(""));
        let encoded = STANDARD.encode(credentials.as_bytes());
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Set the Content-Type header.
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header("Content-Type", content_type)
    }

    pub(crate) fn into_reqwest(
        self,
        client: &reqwest::Client,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        let mut request = client.request(self.method.to_reqwest(), &self.url);
        for (key, value) in self.headers {
            request = request.header(key, value);
        }
        request = match self.body {
            None => request,
            Some(Body::Bytes(bytes)) => request.body(bytes),
            Some(Body::Form(fields)) => request.form(&fields),
            Some(Body::Multipart(form)) => request.multipart(form.into_reqwest()?),
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let req = RequestBuilder::new(Method::Post, "https://api.example.com/orders")
            .basic_auth("rzp_test_key", Some("secret"));
        assert_eq!(
            req.header_value("authorization"),
            Some("Basic cnpwX3Rlc3Rfa2V5OnNlY3JldA==")
        );
    }

    #[test]
    fn test_json_sets_content_type() {
        let req = RequestBuilder::new(Method::Post, "/orders")
            .content_type("text/plain")
            .json(&serde_json::json!({"amount": 95000}))
            .unwrap();
        assert_eq!(req.header_value("Content-Type"), Some("application/json"));
        assert_eq!(
            req.body_ref(),
            Some(&Body::Bytes(br#"{"amount":95000}"#.to_vec()))
        );
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let req = RequestBuilder::new(Method::Get, "/")
            .header("accept", "text/html")
            .accept("application/json");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("ACCEPT"), Some("application/json"));
    }

    #[test]
    fn test_text_keeps_explicit_content_type() {
        let req = RequestBuilder::new(Method::Post, "/")
            .content_type("text/csv")
            .text("a,b");
        assert_eq!(req.header_value("Content-Type"), Some("text/csv"));
    }

    #[test]
    fn test_multipart_fields() {
        let form = MultipartForm::new()
            .text("timestamp", "1700000000")
            .file(FilePart {
                field: "file".into(),
                filename: "jar.png".into(),
                content_type: Some("image/png".into()),
                bytes: vec![0x89, 0x50],
            });
        assert_eq!(form.field("timestamp"), Some("1700000000"));
        assert_eq!(form.field("missing"), None);
        let req = RequestBuilder::new(Method::Post, "/upload").multipart(form);
        assert!(matches!(req.body_ref(), Some(Body::Multipart(f)) if f.files.len() == 1));
    }
}
