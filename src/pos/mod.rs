//! Feature services: one thin service per backend resource family.
//!
//! Each service owns an `ApiHook` (its own cancellation scope and state)
//! and the `SystemId` it is scoped to. Mutations invalidate the cached
//! collections they change once they succeed.

use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiError, FormPart};

mod de;
mod error;
#[cfg(test)]
mod fixtures;

pub mod analytics;
pub mod auth;
pub mod delivery;
pub mod employees;
pub mod inventory;
pub mod kitchen;
pub mod menu;
pub mod orders;
pub mod products;
pub mod purchasing;
pub mod sales;
pub mod suppliers;
pub mod systems;
pub mod waiter;

pub use error::{ServiceError, ValidationError};

/// Append form-encoded query parameters to an API path.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
  if params.is_empty() {
    return path.to_string();
  }
  let query = url::form_urlencoded::Serializer::new(String::new())
    .extend_pairs(params)
    .finish();
  format!("{}?{}", path, query)
}

/// Flatten a serializable record into multipart text fields.
///
/// Null fields are skipped; nested values are sent as JSON text.
pub(crate) fn form_fields(record: impl Serialize) -> Result<Vec<FormPart>, ApiError> {
  let Value::Object(fields) = serde_json::to_value(record)? else {
    return Err(ApiError::Encode("form record must be an object".into()));
  };

  Ok(
    fields
      .into_iter()
      .filter(|(_, value)| !value.is_null())
      .map(|(name, value)| {
        let value = match value {
          Value::String(s) => s,
          other => other.to_string(),
        };
        FormPart::text(name, value)
      })
      .collect(),
  )
}
