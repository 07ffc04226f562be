//! Staff of a system: listing, invitations and role changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Waiter,
  Chef,
  Delivery,
  Manager,
  HeadChef,
  Cashier,
  InventoryManager,
  CashierSupermarket,
  ManagerSupermarket,
  InventoryManagerSupermarket,
}

impl Role {
  pub fn label(self) -> &'static str {
    match self {
      Role::Waiter => "Waiter",
      Role::Chef => "Chef",
      Role::Delivery => "Delivery",
      Role::Manager => "Manager",
      Role::HeadChef => "Head Chef",
      Role::Cashier => "Cashier",
      Role::InventoryManager => "Inventory Manager",
      Role::CashierSupermarket => "Cashier (Supermarket)",
      Role::ManagerSupermarket => "Manager (Supermarket)",
      Role::InventoryManagerSupermarket => "Inventory Manager (Supermarket)",
    }
  }

  /// Roles that can be assigned in a system of the given category.
  pub fn for_category(category: &str) -> &'static [Role] {
    const RESTAURANT: &[Role] = &[
      Role::Waiter,
      Role::Chef,
      Role::HeadChef,
      Role::Delivery,
      Role::Cashier,
      Role::Manager,
      Role::InventoryManager,
    ];
    const SUPERMARKET: &[Role] = &[
      Role::CashierSupermarket,
      Role::ManagerSupermarket,
      Role::InventoryManagerSupermarket,
    ];

    if category.eq_ignore_ascii_case("supermarket") {
      SUPERMARKET
    } else {
      RESTAURANT
    }
  }
}

/// Phone and email are only returned to the system owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
  pub id: u64,
  pub name: String,
  pub role: Role,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeInvite {
  pub email: String,
  pub name: String,
  pub role: Role,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeUpdate {
  pub name: String,
  pub role: Role,
  pub phone: Option<String>,
}

pub struct EmployeeService {
  hook: ApiHook,
  system: SystemId,
}

impl EmployeeService {
  pub fn new(client: &ApiClient, system: SystemId) -> Self {
    Self {
      hook: client.hook(),
      system,
    }
  }

  pub fn hook(&self) -> &ApiHook {
    &self.hook
  }

  fn collection(&self) -> String {
    format!("/core/systems/{}/employees/", self.system)
  }

  fn employee_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  fn invalidate(&self, id: u64) {
    self.hook.clear_cache(&self.employee_url(id));
    self.hook.clear_cache(&self.collection());
  }

  pub async fn list(&self) -> Result<Option<Vec<Employee>>, ApiError> {
    self.hook.get(&self.collection()).await
  }

  pub async fn get(&self, id: u64) -> Result<Option<Employee>, ApiError> {
    self.hook.get(&self.employee_url(id)).await
  }

  /// Invite someone by email; the backend creates their account.
  pub async fn invite(&self, invite: &EmployeeInvite) -> Result<Option<Value>, ApiError> {
    let url = format!("{}invite/", self.collection());
    let mut body = serde_json::to_value(invite)?;
    if let Some(fields) = body.as_object_mut() {
      fields.insert("system".to_string(), Value::String(self.system.to_string()));
    }

    let created = self.hook.call(Method::Post, &url, Payload::Json(body)).await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  pub async fn update(&self, id: u64, update: &EmployeeUpdate) -> Result<Option<Employee>, ApiError> {
    let updated = self
      .hook
      .call(Method::Put, &self.employee_url(id), Payload::json(update)?)
      .await?;
    self.invalidate(id);
    Ok(updated)
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.employee_url(id), Payload::None)
      .await?;
    self.invalidate(id);
    Ok(())
  }
}
