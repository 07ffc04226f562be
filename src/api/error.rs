use serde_json::Value;
use thiserror::Error;

/// Fallback message when neither the server nor the transport says anything useful.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// `detail` value the backend sends with a 403 when the session cookie is missing.
pub const AUTH_MISSING_DETAIL: &str = "Authentication credentials were not provided.";

/// Errors reported by a transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
  /// Server answered with a non-2xx status
  #[error("Request failed with status code {status}")]
  Status { status: u16, body: Option<Value> },

  /// Connection, TLS, timeout or similar failure
  #[error("{0}")]
  Network(String),

  /// Response body could not be decoded
  #[error("{0}")]
  Decode(String),
}

impl TransportError {
  pub fn status(&self) -> Option<u16> {
    match self {
      TransportError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// The server-supplied `detail` string, if the body carried one.
  pub fn detail(&self) -> Option<&str> {
    match self {
      TransportError::Status {
        body: Some(body), ..
      } => body.get("detail").and_then(Value::as_str),
      _ => None,
    }
  }

  /// 403 with the "credentials were not provided" marker.
  pub fn is_auth_missing(&self) -> bool {
    self.status() == Some(403) && self.detail() == Some(AUTH_MISSING_DETAIL)
  }
}

impl From<reqwest::Error> for TransportError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      TransportError::Decode(err.to_string())
    } else {
      TransportError::Network(err.to_string())
    }
  }
}

/// Human-readable message for a transport error.
///
/// Precedence: server `detail`, then the transport's own message, then
/// [`UNKNOWN_ERROR_MESSAGE`].
pub fn error_message(err: &TransportError) -> String {
  if let Some(detail) = err.detail().filter(|d| !d.is_empty()) {
    return detail.to_string();
  }
  let message = err.to_string();
  if message.is_empty() {
    UNKNOWN_ERROR_MESSAGE.to_string()
  } else {
    message
  }
}

/// Errors returned by `ApiHook::call`.
///
/// Cancellation is not an error: a cancelled call resolves to `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
  /// Session missing or expired; the login redirect has been triggered
  #[error("{message}")]
  AuthExpired { message: String },

  /// Server rejected the request
  #[error("{message}")]
  Http { status: u16, message: String },

  /// Request never got a response
  #[error("{0}")]
  Network(String),

  /// Response did not match the expected shape
  #[error("{0}")]
  Decode(String),

  /// Request body could not be serialized
  #[error("Failed to encode request body: {0}")]
  Encode(String),
}

impl ApiError {
  pub fn message(&self) -> &str {
    match self {
      ApiError::AuthExpired { message } | ApiError::Http { message, .. } => message,
      ApiError::Network(message) | ApiError::Decode(message) | ApiError::Encode(message) => {
        message
      }
    }
  }

  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::AuthExpired { .. } => Some(403),
      ApiError::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_auth_expired(&self) -> bool {
    matches!(self, ApiError::AuthExpired { .. })
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(err: serde_json::Error) -> Self {
    ApiError::Encode(err.to_string())
  }
}

impl From<TransportError> for ApiError {
  fn from(err: TransportError) -> Self {
    let message = error_message(&err);
    if err.is_auth_missing() {
      return ApiError::AuthExpired { message };
    }
    match err {
      TransportError::Status { status, .. } => ApiError::Http { status, message },
      TransportError::Network(_) => ApiError::Network(message),
      TransportError::Decode(_) => ApiError::Decode(message),
    }
  }
}
