//! Restaurant stock-room inventory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub id: u64,
  pub name: String,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub quantity: Option<f64>,
  #[serde(default)]
  pub unit: String,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub min_threshold: Option<f64>,
}

impl InventoryItem {
  /// At or under its minimum threshold. Items without a threshold never are.
  pub fn is_low(&self) -> bool {
    match (self.quantity, self.min_threshold) {
      (Some(quantity), Some(threshold)) => quantity <= threshold,
      _ => false,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewInventoryItem {
  pub name: String,
  pub quantity: Option<f64>,
  pub unit: String,
  pub min_threshold: Option<f64>,
}

pub struct InventoryService {
  hook: ApiHook,
  system: SystemId,
}

impl InventoryService {
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
    format!("/restaurant/{}/inventory/", self.system)
  }

  fn item_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  fn invalidate(&self, id: u64) {
    self.hook.clear_cache(&self.item_url(id));
    self.hook.clear_cache(&self.collection());
  }

  pub async fn list(&self) -> Result<Option<Vec<InventoryItem>>, ApiError> {
    self.hook.get(&self.collection()).await
  }

  pub async fn get(&self, id: u64) -> Result<Option<InventoryItem>, ApiError> {
    self.hook.get(&self.item_url(id)).await
  }

  pub async fn add(&self, item: &NewInventoryItem) -> Result<Option<InventoryItem>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.collection(), Payload::json(item)?)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  pub async fn update(&self, id: u64, changes: Value) -> Result<Option<InventoryItem>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.item_url(id), Payload::Json(changes))
      .await?;
    self.invalidate(id);
    Ok(updated)
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.item_url(id), Payload::None)
      .await?;
    self.invalidate(id);
    Ok(())
  }
}
