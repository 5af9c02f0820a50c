//! HTTP transport for the request gateway.

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Body, CredentialProvider, Method, Request, RequestGateway, UploadForm};
use crate::error::GatewayError;

/// `RequestGateway` over `reqwest` with bearer auth and a fixed timeout
#[derive(Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::NetworkUnreachable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client, timeout, credentials))
    }

    /// Use a preconfigured client; `timeout` is only used to report timeouts
    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            timeout,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: Request) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.credentials.token() {
            builder = builder.bearer_auth(token);
        }
        match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => {
                let field = form.field;
                builder.multipart(Form::new().part(field, upload_part(form)))
            }
        }
    }

    fn classify(&self, err: &reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::NetworkUnreachable(err.to_string())
        }
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn send(&self, request: Request) -> Result<Value, GatewayError> {
        let label = request.to_string();
        let started = Instant::now();
        debug!("[GATEWAY] {} sending", label);

        let response = match self.build(request).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = self.classify(&e);
                warn!(
                    "[GATEWAY] {} failed: {} duration_ms={}",
                    label,
                    err,
                    started.elapsed().as_millis()
                );
                return Err(err);
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(&e))?;
        debug!(
            "[GATEWAY] {} status={} duration_ms={}",
            label,
            status,
            started.elapsed().as_millis()
        );

        if status.is_success() {
            return decode_body(&label, &text);
        }

        let message = error_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        warn!("[GATEWAY] {} rejected: status={} message=\"{}\"", label, status, message);
        let err = GatewayError::ServerRejected {
            status: status.as_u16(),
            message,
        };
        if err.is_auth_expired() {
            self.credentials.invalidate();
        }
        Err(err)
    }
}

fn upload_part(form: UploadForm) -> Part {
    let UploadForm {
        filename,
        content_type,
        bytes,
        ..
    } = form;
    let part = Part::bytes(bytes.clone()).file_name(filename.clone());
    match content_type {
        Some(ct) => part.mime_str(&ct).unwrap_or_else(|e| {
            warn!("[GATEWAY] ignoring content type {:?}: {}", ct, e);
            Part::bytes(bytes).file_name(filename)
        }),
        None => part,
    }
}

/// Empty bodies (204, or a bare 200) read as `null`
fn decode_body(label: &str, text: &str) -> Result<Value, GatewayError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        error!("[GATEWAY] {} returned a non-JSON body: {}", label, e);
        GatewayError::MalformedResponse(e.to_string())
    })
}

/// Message from an error body: `detail` (string or validation list),
/// then `message`, then the raw text
fn error_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(body) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };
    let from_json = match body.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
    .or_else(|| body.get("message").and_then(Value::as_str).map(str::to_string));
    Some(from_json.unwrap_or_else(|| trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{SessionCredentials, SessionState};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"detail": "Job not found"}"#).as_deref(), Some("Job not found"));
        assert_eq!(
            error_message(r#"{"detail": [{"loc": ["body", "title"], "msg": "field required"}]}"#).as_deref(),
            Some("field required")
        );
        assert_eq!(error_message(r#"{"message": "nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(decode_body("GET /x", ""), Ok(Value::Null));
        assert!(matches!(
            decode_body("GET /x", "<html>"),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    /// Serve one canned HTTP response on a local port
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}", addr)
    }

    fn gateway(base: String, creds: Arc<SessionCredentials>, timeout: Duration) -> HttpGateway {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpGateway::with_client(base, client, timeout, creds)
    }

    #[tokio::test]
    async fn test_success_returns_payload() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 9\r\nConnection: close\r\n\r\n{\"id\":42}",
        )
        .await;
        let creds = Arc::new(SessionCredentials::with_token("t"));
        let gw = gateway(base, creds, Duration::from_secs(5));
        let payload = gw.send(Request::new(Method::Get, "/api/jobs/get/42")).await.unwrap();
        assert_eq!(payload["id"], 42);
    }

    #[tokio::test]
    async fn test_unauthorized_invalidates_credentials() {
        let base = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: 27\r\nConnection: close\r\n\r\n{\"detail\":\"Invalid token\"}\n",
        )
        .await;
        let creds = Arc::new(SessionCredentials::with_token("stale"));
        let gw = gateway(base, creds.clone(), Duration::from_secs(5));
        let err = gw.send(Request::new(Method::Get, "/api/jobs/list")).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::ServerRejected { status: 401, message: "Invalid token".into() }
        );
        assert_eq!(creds.state(), SessionState::Invalidated);
        assert_eq!(creds.token(), None);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let creds = Arc::new(SessionCredentials::new());
        let gw = gateway(format!("http://{}", addr), creds, Duration::from_millis(100));
        let err = gw.send(Request::new(Method::Get, "/api/deadlines/list")).await.unwrap_err();
        assert_eq!(err, GatewayError::Timeout { after_ms: 100 });
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        // Bind then drop to get a port nobody listens on
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let creds = Arc::new(SessionCredentials::new());
        let gw = gateway(format!("http://{}", addr), creds, Duration::from_secs(2));
        let err = gw.send(Request::new(Method::Get, "/api/jobs/list")).await.unwrap_err();
        assert!(matches!(err, GatewayError::NetworkUnreachable(_)));
    }
}
