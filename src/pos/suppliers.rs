//! Supermarket suppliers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplierDraft {
  pub name: String,
  pub phone: String,
  pub email: String,
}

pub struct SupplierService {
  hook: ApiHook,
  system: SystemId,
}

impl SupplierService {
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
    format!("/supermarket/{}/suppliers/", self.system)
  }

  fn supplier_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  pub async fn list(&self) -> Result<Option<Vec<Supplier>>, ApiError> {
    self.hook.get(&self.collection()).await
  }

  pub async fn create(&self, draft: &SupplierDraft) -> Result<Option<Supplier>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.collection(), Payload::json(draft)?)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  pub async fn update(&self, id: u64, draft: &SupplierDraft) -> Result<Option<Supplier>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.supplier_url(id), Payload::json(draft)?)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(updated)
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.supplier_url(id), Payload::None)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(())
  }
}
