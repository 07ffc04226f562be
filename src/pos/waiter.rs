//! Waiter display: in-house orders that are ready or served, and table
//! occupancy.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::orders::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOrder {
  pub id: u64,
  #[serde(default)]
  pub customer_name: Option<String>,
  pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
  pub status: OrderStatus,
  #[serde(default)]
  pub current_order: Option<TableOrder>,
}

/// Table label to its current order.
pub type TablesMap = BTreeMap<String, TableStatus>;

pub struct WaiterService {
  hook: ApiHook,
  system: SystemId,
}

impl WaiterService {
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
    format!("/restaurant/{}/waiter/orders/", self.system)
  }

  fn tables_url(&self) -> String {
    format!("{}tables/", self.collection())
  }

  pub async fn orders(&self) -> Result<Option<Vec<Order>>, ApiError> {
    self.hook.get(&self.collection()).await
  }

  pub async fn tables(&self) -> Result<Option<TablesMap>, ApiError> {
    self.hook.get(&self.tables_url()).await
  }

  pub async fn order(&self, id: u64) -> Result<Option<Order>, ApiError> {
    let url = format!("{}{}/", self.collection(), id);
    self.hook.get(&url).await
  }

  pub async fn update_status(&self, id: u64, status: OrderStatus) -> Result<Option<Order>, ApiError> {
    let url = format!("{}{}/", self.collection(), id);
    let updated = self
      .hook
      .call(Method::Patch, &url, Payload::Json(json!({ "status": status })))
      .await?;
    self.hook.clear_cache(&url);
    self.hook.clear_cache(&self.collection());
    self.hook.clear_cache(&self.tables_url());
    Ok(updated)
  }

  /// Drop the cached board; the next fetch goes to the network.
  pub fn refresh(&self) {
    self.hook.clear_cache(&self.collection());
    self.hook.clear_cache(&self.tables_url());
  }
}
