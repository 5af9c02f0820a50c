//! Request Gateway
//!
//! The single async seam between the tracker and the backend. Controllers
//! only see `RequestGateway`; the HTTP implementation lives in `http`.

mod credentials;
mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::GatewayError;

pub use credentials::{CredentialProvider, SessionCredentials, SessionState};
pub use http::HttpGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file sent as one multipart part
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub field: &'static str,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(UploadForm),
}

/// Method, path (relative to the API base, query included) and body
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Body::Empty,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn multipart(mut self, form: UploadForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Async call to the backend.
///
/// Resolves to the response payload (`Value::Null` for empty bodies) or a
/// classified failure. Implementations enforce their own timeout and signal
/// credential invalidation on auth-class rejections.
#[async_trait]
pub trait RequestGateway: Send + Sync {
    async fn send(&self, request: Request) -> Result<Value, GatewayError>;
}
