//! API access: the single path through which every service talks to the backend.

mod client;
mod error;
mod hook;
mod navigator;
mod request;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::{
  error_message, ApiError, TransportError, AUTH_MISSING_DETAIL, UNKNOWN_ERROR_MESSAGE,
};
pub use hook::{ApiHook, ApiState};
pub use navigator::{LogNavigator, Navigator};
pub use request::{ApiRequest, FormPart, Method, Payload, TransportResponse};
pub use transport::{join_url, HttpTransport, Transport, CSRF_HEADER};
