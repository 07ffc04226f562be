//! Request and response types shared by the hook and its transports.

use serde_json::Value;

/// HTTP verbs the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  /// Lowercase name, as used in cache keys.
  pub fn as_str(self) -> &'static str {
    match self {
      Method::Get => "get",
      Method::Post => "post",
      Method::Put => "put",
      Method::Patch => "patch",
      Method::Delete => "delete",
    }
  }

  /// POST/PUT/PATCH/DELETE change server state; GET doesn't.
  pub fn is_mutation(self) -> bool {
    !matches!(self, Method::Get)
  }
}

impl From<Method> for reqwest::Method {
  fn from(method: Method) -> Self {
    match method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
  Text {
    name: String,
    value: String,
  },
  File {
    name: String,
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
  },
}

impl FormPart {
  pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
    FormPart::Text {
      name: name.into(),
      value: value.into(),
    }
  }

  pub fn file(
    name: impl Into<String>,
    file_name: impl Into<String>,
    mime: impl Into<String>,
    bytes: Vec<u8>,
  ) -> Self {
    FormPart::File {
      name: name.into(),
      file_name: file_name.into(),
      mime: mime.into(),
      bytes,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
    }
  }
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
  #[default]
  None,
  Json(Value),
  Multipart(Vec<FormPart>),
}

impl Payload {
  /// Serialize any value into a JSON payload.
  pub fn json(value: impl serde::Serialize) -> serde_json::Result<Self> {
    Ok(Payload::Json(serde_json::to_value(value)?))
  }

  pub fn is_multipart(&self) -> bool {
    matches!(self, Payload::Multipart(_))
  }
}

/// A fully-built request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  /// Path relative to the API base URL
  pub url: String,
  pub headers: Vec<(String, String)>,
  pub payload: Payload,
}

impl ApiRequest {
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, value)| value.as_str())
  }
}

/// A successful (2xx) response with its decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
  pub status: u16,
  /// `Value::Null` when the body is empty
  pub body: Value,
}
