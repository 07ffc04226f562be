//! Restaurant orders and their line items.
//!
//! [`Order`] is also what the kitchen, waiter and delivery boards receive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::{de, ServiceError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Preparing,
  Ready,
  Served,
  OutForDelivery,
  Completed,
  Canceled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Preparing => "preparing",
      OrderStatus::Ready => "ready",
      OrderStatus::Served => "served",
      OrderStatus::OutForDelivery => "out_for_delivery",
      OrderStatus::Completed => "completed",
      OrderStatus::Canceled => "canceled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
  #[default]
  InHouse,
  Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  #[serde(default)]
  pub id: Option<u64>,
  pub menu_item: u64,
  #[serde(default)]
  pub menu_item_name: Option<String>,
  pub quantity: u32,
  #[serde(default)]
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: u64,
  #[serde(default)]
  pub system: Option<u64>,
  #[serde(default)]
  pub customer_name: Option<String>,
  #[serde(default, deserialize_with = "de::opt_label")]
  pub table_number: Option<String>,
  #[serde(default)]
  pub waiter: Option<u64>,
  pub status: OrderStatus,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub total_price: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub profit: Option<f64>,
  #[serde(default)]
  pub order_items: Vec<OrderItem>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub order_type: Option<OrderType>,
  #[serde(default)]
  pub delivery_address: Option<String>,
  #[serde(default)]
  pub customer_phone: Option<String>,
}

/// Body of a new order; items are added afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewOrder {
  pub customer_name: Option<String>,
  pub table_number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub waiter: Option<u64>,
  pub order_type: OrderType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
  pub menu_item: u64,
  pub quantity: u32,
}

/// Orders in `status`, most recently updated first.
pub fn with_status(orders: &[Order], status: OrderStatus) -> Vec<&Order> {
  let mut matching: Vec<&Order> = orders.iter().filter(|o| o.status == status).collect();
  matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
  matching
}

pub struct OrderService {
  hook: ApiHook,
  system: SystemId,
}

impl OrderService {
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
    format!("/restaurant/{}/orders/", self.system)
  }

  fn order_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  fn items_url(&self, order_id: u64) -> String {
    format!("{}items/", self.order_url(order_id))
  }

  fn invalidate_order(&self, id: u64) {
    self.hook.clear_cache(&self.order_url(id));
    self.hook.clear_cache(&self.collection());
  }

  fn invalidate_items(&self, order_id: u64) {
    self.hook.clear_cache(&self.items_url(order_id));
    self.hook.clear_cache(&self.order_url(order_id));
  }

  pub async fn list(&self) -> Result<Option<Vec<Order>>, ApiError> {
    self.hook.get(&self.collection()).await
  }

  pub async fn details(&self, id: u64) -> Result<Option<Order>, ApiError> {
    self.hook.get(&self.order_url(id)).await
  }

  pub async fn create(&self, order: &NewOrder) -> Result<Option<Order>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.collection(), Payload::json(order)?)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  pub async fn update_status(
    &self,
    id: u64,
    status: OrderStatus,
  ) -> Result<Option<Order>, ApiError> {
    self
      .update(id, serde_json::json!({ "status": status }))
      .await
  }

  /// Partial update of any order fields.
  pub async fn update(&self, id: u64, changes: Value) -> Result<Option<Order>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.order_url(id), Payload::Json(changes))
      .await?;
    self.invalidate_order(id);
    Ok(updated)
  }

  pub async fn items(&self, order_id: u64) -> Result<Option<Vec<OrderItem>>, ApiError> {
    self.hook.get(&self.items_url(order_id)).await
  }

  /// Add a line item. Both `menu_item` and `quantity` must be non-zero.
  pub async fn add_item(
    &self,
    order_id: u64,
    item: NewOrderItem,
  ) -> Result<Option<OrderItem>, ServiceError> {
    if item.menu_item == 0 || item.quantity == 0 {
      return Err(ValidationError::MissingOrderItemFields.into());
    }

    let created = self
      .hook
      .call(Method::Post, &self.items_url(order_id), Payload::json(item).map_err(ApiError::from)?)
      .await?;
    self.invalidate_items(order_id);
    Ok(created)
  }

  pub async fn delete_item(&self, order_id: u64, item_id: u64) -> Result<(), ApiError> {
    let url = format!("{}{}/", self.items_url(order_id), item_id);
    let _: Option<Value> = self.hook.call(Method::Delete, &url, Payload::None).await?;
    self.invalidate_items(order_id);
    Ok(())
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.order_url(id), Payload::None)
      .await?;
    self.invalidate_order(id);
    Ok(())
  }
}
