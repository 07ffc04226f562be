//! Transport trait and the `reqwest` implementation.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;

use super::error::TransportError;
use super::request::{ApiRequest, FormPart, Payload, TransportResponse};

/// Anti-forgery header required by the backend's session authentication.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const USER_AGENT: &str = concat!("tillpoint/", env!("CARGO_PKG_VERSION"));

/// Something that can execute an `ApiRequest`.
///
/// The returned future is dropped when the call is cancelled, so
/// implementations must not depend on it running to completion.
pub trait Transport: Send + Sync {
  fn send(&self, request: ApiRequest) -> BoxFuture<'static, Result<TransportResponse, TransportError>>;
}

/// Join an API-relative path onto the base URL.
///
/// Paths are written both with and without a leading slash across the
/// codebase; both resolve the same way. Absolute URLs pass through.
pub fn join_url(base_url: &str, path: &str) -> String {
  if path.starts_with("http://") || path.starts_with("https://") {
    return path.to_string();
  }
  format!(
    "{}/{}",
    base_url.trim_end_matches('/'),
    path.trim_start_matches('/')
  )
}

/// HTTP transport backed by `reqwest` with a session cookie store.
///
/// Clones share the connection pool and the cookie jar.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: String,
  origin: Url,
  jar: Arc<Jar>,
}

impl HttpTransport {
  /// Create a transport for the given base URL (e.g. `http://127.0.0.1:8000/api`).
  pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
    let base_url = base_url.into();
    let origin = Url::parse(&base_url)
      .map_err(|e| TransportError::Network(format!("Invalid base URL {}: {}", base_url, e)))?;

    let jar = Arc::new(Jar::default());
    let mut builder = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .cookie_provider(jar.clone());
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }

    Ok(Self {
      client: builder.build()?,
      base_url,
      origin,
      jar,
    })
  }

  pub fn from_config(config: &Config) -> Result<Self, TransportError> {
    let timeout = config.api.timeout_secs.map(Duration::from_secs);
    Self::new(config.api.base_url.clone(), timeout)
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Session cookies currently held for the backend, as a `Cookie` header value.
  pub fn session_cookies(&self) -> Option<String> {
    self
      .jar
      .cookies(&self.origin)
      .and_then(|value| value.to_str().ok().map(str::to_string))
  }

  /// Seed the jar from a `Cookie` header value saved by an earlier run.
  pub fn restore_session(&self, cookies: &str) {
    for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
      self.jar.add_cookie_str(&format!("{}; Path=/", pair), &self.origin);
    }
  }

  fn build(&self, request: ApiRequest) -> Result<reqwest::RequestBuilder, TransportError> {
    let url = join_url(&self.base_url, &request.url);
    let mut builder = self.client.request(request.method.into(), url);
    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }

    let builder = match request.payload {
      Payload::None => builder,
      Payload::Json(body) => builder.json(&body),
      Payload::Multipart(parts) => builder.multipart(build_form(parts)?),
    };
    Ok(builder)
  }
}

fn build_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
  let mut form = Form::new();
  for part in parts {
    form = match part {
      FormPart::Text { name, value } => form.text(name, value),
      FormPart::File {
        name,
        file_name,
        mime,
        bytes,
      } => {
        let part = Part::bytes(bytes)
          .file_name(file_name)
          .mime_str(&mime)
          .map_err(|e| TransportError::Network(format!("Invalid content type {}: {}", mime, e)))?;
        form.part(name, part)
      }
    };
  }
  Ok(form)
}

/// Decode a response body: empty means `Null`, anything else must be JSON.
fn decode_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Ok(Value::Null);
  }
  serde_json::from_slice(bytes)
}

impl Transport for HttpTransport {
  fn send(&self, request: ApiRequest) -> BoxFuture<'static, Result<TransportResponse, TransportError>> {
    let built = self.build(request);

    async move {
      let response = built?.send().await?;
      let status = response.status();
      let bytes = response.bytes().await?;

      if !status.is_success() {
        return Err(TransportError::Status {
          status: status.as_u16(),
          body: decode_body(&bytes).ok().filter(|v| !v.is_null()),
        });
      }

      let body = decode_body(&bytes)
        .map_err(|e| TransportError::Decode(format!("Failed to parse response: {}", e)))?;

      Ok(TransportResponse {
        status: status.as_u16(),
        body,
      })
    }
    .boxed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{Method, AUTH_MISSING_DETAIL};
  use serde_json::json;

  fn request(method: Method, url: &str, payload: Payload) -> ApiRequest {
    ApiRequest {
      method,
      url: url.to_string(),
      headers: vec![(CSRF_HEADER.to_string(), "token123".to_string())],
      payload,
    }
  }

  #[test]
  fn test_join_url() {
    let base = "http://127.0.0.1:8000/api";
    assert_eq!(
      join_url(base, "/restaurant/5/orders/"),
      "http://127.0.0.1:8000/api/restaurant/5/orders/"
    );
    assert_eq!(
      join_url("http://127.0.0.1:8000/api/", "supermarket/5/suppliers/"),
      "http://127.0.0.1:8000/api/supermarket/5/suppliers/"
    );
    assert_eq!(
      join_url(base, "https://cdn.example.com/x.png"),
      "https://cdn.example.com/x.png"
    );
  }

  #[test]
  fn test_decode_body() {
    assert_eq!(decode_body(b"").unwrap(), Value::Null);
    assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
    assert_eq!(decode_body(br#"{"id": 1}"#).unwrap(), json!({"id": 1}));
    assert!(decode_body(b"<html>").is_err());
  }

  #[tokio::test]
  async fn test_get_sends_csrf_header_and_decodes_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("GET", "/api/restaurant/5/menu-items/")
      .match_header("x-csrftoken", "token123")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"[{"id": 1, "name": "Margherita"}]"#)
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let response = transport
      .send(request(Method::Get, "/restaurant/5/menu-items/", Payload::None))
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!([{"id": 1, "name": "Margherita"}]));
  }

  #[tokio::test]
  async fn test_post_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/api/restaurant/5/orders/")
      .match_body(mockito::Matcher::Json(json!({"order_type": "in_house"})))
      .with_status(201)
      .with_body(r#"{"id": 42}"#)
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let response = transport
      .send(request(
        Method::Post,
        "/restaurant/5/orders/",
        Payload::Json(json!({"order_type": "in_house"})),
      ))
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"id": 42}));
  }

  #[tokio::test]
  async fn test_delete_with_empty_body() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("DELETE", "/api/restaurant/5/orders/9/")
      .with_status(204)
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let response = transport
      .send(request(Method::Delete, "/restaurant/5/orders/9/", Payload::None))
      .await
      .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.body, Value::Null);
  }

  #[tokio::test]
  async fn test_multipart_upload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("PUT", "/api/restaurant/5/menu-items/3/")
      .match_header(
        "content-type",
        mockito::Matcher::Regex("^multipart/form-data".to_string()),
      )
      .match_body(mockito::Matcher::Regex("Margherita".to_string()))
      .with_status(200)
      .with_body(r#"{"id": 3}"#)
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let parts = vec![
      FormPart::text("name", "Margherita"),
      FormPart::File {
        name: "image".to_string(),
        file_name: "pizza.png".to_string(),
        mime: "image/png".to_string(),
        bytes: b"fake image bytes".to_vec(),
      },
    ];
    transport
      .send(request(
        Method::Put,
        "/restaurant/5/menu-items/3/",
        Payload::Multipart(parts),
      ))
      .await
      .unwrap();

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_forbidden_carries_detail() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/core/systems/")
      .with_status(403)
      .with_body(format!(r#"{{"detail": "{}"}}"#, AUTH_MISSING_DETAIL))
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let err = transport
      .send(request(Method::Get, "/core/systems/", Payload::None))
      .await
      .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.is_auth_missing());
  }

  #[tokio::test]
  async fn test_server_error_with_html_body() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/core/systems/")
      .with_status(500)
      .with_body("<h1>Server Error</h1>")
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let err = transport
      .send(request(Method::Get, "/core/systems/", Payload::None))
      .await
      .unwrap_err();

    assert_eq!(
      err,
      TransportError::Status {
        status: 500,
        body: None
      }
    );
  }

  #[tokio::test]
  async fn test_success_with_invalid_json_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/api/core/systems/")
      .with_status(200)
      .with_body("not json")
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    let err = transport
      .send(request(Method::Get, "/core/systems/", Payload::None))
      .await
      .unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
  }

  #[tokio::test]
  async fn test_session_cookie_is_captured() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/api/core/login/")
      .with_status(200)
      .with_header("set-cookie", "sessionid=abc123; Path=/; HttpOnly")
      .with_body(r#"{"message": "Login successful"}"#)
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    assert_eq!(transport.session_cookies(), None);

    transport
      .send(request(Method::Post, "/core/login/", Payload::Json(json!({}))))
      .await
      .unwrap();

    assert_eq!(transport.session_cookies().as_deref(), Some("sessionid=abc123"));
  }

  #[tokio::test]
  async fn test_restored_session_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("GET", "/api/core/systems/")
      .match_header("cookie", mockito::Matcher::Regex("sessionid=abc123".to_string()))
      .with_status(200)
      .with_body("[]")
      .create_async()
      .await;

    let transport = HttpTransport::new(format!("{}/api", server.url()), None).unwrap();
    transport.restore_session("sessionid=abc123; csrftoken=t0k");
    transport
      .send(request(Method::Get, "/core/systems/", Payload::None))
      .await
      .unwrap();

    mock.assert_async().await;
  }
}
