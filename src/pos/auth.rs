//! Owner and employee session login.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};

use super::employees::Role;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerCredentials {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeCredentials {
  pub email: String,
  pub password: String,
}

/// Who an employee login resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
  pub id: u64,
  pub name: String,
  pub email: String,
  pub role: Role,
  /// Name of the system the employee works in
  pub system: String,
  #[serde(default)]
  pub actions: Vec<String>,
}

impl EmployeeProfile {
  pub fn has_permission(&self, action: &str) -> bool {
    self.actions.iter().any(|granted| granted == action)
  }

  /// True if any one of `actions` is granted.
  pub fn has_any_permission(&self, actions: &[&str]) -> bool {
    actions.iter().any(|action| self.has_permission(action))
  }
}

/// New owner account. Names are optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
  pub username: String,
  pub password: String,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registered {
  #[serde(default)]
  pub message: Option<String>,
  pub user_id: u64,
  #[serde(default)]
  pub temp_session_id: Option<String>,
}

#[derive(Deserialize)]
struct EmployeeLogin {
  employee: EmployeeProfile,
}

pub struct AuthService {
  hook: ApiHook,
}

impl AuthService {
  pub fn new(client: &ApiClient) -> Self {
    Self { hook: client.hook() }
  }

  pub fn hook(&self) -> &ApiHook {
    &self.hook
  }

  pub async fn register(&self, registration: &Registration) -> Result<Option<Registered>, ApiError> {
    let registered: Option<Registered> = self
      .hook
      .call(Method::Post, "/core/register/", Payload::json(registration)?)
      .await?;
    if let Some(registered) = &registered {
      info!(username = %registration.username, user_id = registered.user_id, "owner registered");
    }
    Ok(registered)
  }

  /// Start an owner session. The session cookie is kept by the transport.
  pub async fn login(&self, credentials: &OwnerCredentials) -> Result<Option<Value>, ApiError> {
    let response = self
      .hook
      .call(Method::Post, "/core/login/", Payload::json(credentials)?)
      .await?;
    if response.is_some() {
      info!(username = %credentials.username, "owner logged in");
    }
    Ok(response)
  }

  pub async fn employee_login(
    &self,
    credentials: &EmployeeCredentials,
  ) -> Result<Option<EmployeeProfile>, ApiError> {
    let response: Option<EmployeeLogin> = self
      .hook
      .call(Method::Post, "/core/employee/login/", Payload::json(credentials)?)
      .await?;
    Ok(response.map(|login| {
      info!(email = %login.employee.email, role = ?login.employee.role, "employee logged in");
      login.employee
    }))
  }

  /// End the session and drop every cached response.
  pub async fn logout(&self) -> Result<(), ApiError> {
    let _: Option<Value> = self.hook.get("/core/logout/").await?;
    self.hook.clear_all_cache();
    info!("logged out");
    Ok(())
  }
}
