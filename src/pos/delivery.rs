//! Delivery orders.

use serde_json::{json, Value};

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::orders::{Order, OrderStatus};
use super::with_query;

pub struct DeliveryService {
  hook: ApiHook,
  system: SystemId,
}

impl DeliveryService {
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
    format!("/restaurant/{}/delivery/orders/", self.system)
  }

  fn order_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  pub async fn list(&self, status: Option<OrderStatus>) -> Result<Option<Vec<Order>>, ApiError> {
    let url = match status {
      Some(status) => with_query(&self.collection(), &[("status", status.as_str())]),
      None => self.collection(),
    };
    self.hook.get(&url).await
  }

  pub async fn get(&self, id: u64) -> Result<Option<Order>, ApiError> {
    self.hook.get(&self.order_url(id)).await
  }

  /// Create a delivery order from a free-form body (customer, address,
  /// phone and so on).
  pub async fn create(&self, order: Value) -> Result<Option<Order>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.collection(), Payload::Json(order))
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  pub async fn update_status(&self, id: u64, status: OrderStatus) -> Result<Option<Order>, ApiError> {
    let url = self.order_url(id);
    let updated = self
      .hook
      .call(Method::Patch, &url, Payload::Json(json!({ "status": status })))
      .await?;
    self.hook.clear_cache(&self.collection());
    self.hook.clear_cache(&url);
    Ok(updated)
  }
}
