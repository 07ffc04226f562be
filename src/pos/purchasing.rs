//! Supermarket purchase orders and goods receiving.
//!
//! Receiving records are validated against their purchase order before
//! they are sent: the received date may not precede the order date and
//! the quantity may not exceed what is still outstanding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::{de, with_query, ServiceError, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
  pub id: u64,
  #[serde(default)]
  pub supplier: Option<u64>,
  #[serde(default)]
  pub supplier_name: Option<String>,
  #[serde(default)]
  pub product: Option<u64>,
  #[serde(default)]
  pub product_name: Option<String>,
  pub quantity: i64,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub cost: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_date")]
  pub order_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "de::opt_date")]
  pub expected_delivery_date: Option<NaiveDate>,
  #[serde(default)]
  pub status: String,
  /// Sum of all receiving records so far
  #[serde(default, alias = "total_received")]
  pub received_quantity: Option<i64>,
}

impl PurchaseOrder {
  pub fn received(&self) -> i64 {
    self.received_quantity.unwrap_or(0)
  }

  pub fn remaining(&self) -> i64 {
    self.quantity - self.received()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewPurchaseOrder {
  pub supplier_id: u64,
  pub product_id: u64,
  pub quantity: u32,
  pub cost: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsReceiving {
  pub id: u64,
  #[serde(alias = "purchase_order_id")]
  pub purchase_order: u64,
  pub received_quantity: i64,
  #[serde(deserialize_with = "de::date")]
  pub received_date: NaiveDate,
  #[serde(default, deserialize_with = "de::opt_date")]
  pub expiry_date: Option<NaiveDate>,
  #[serde(default)]
  pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGoodsReceiving {
  pub purchase_order_id: u64,
  pub received_quantity: u32,
  pub received_date: NaiveDate,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expiry_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
}

/// Partial update of a receiving record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceivingChanges {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub received_quantity: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub received_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expiry_date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
}

fn check_date(order: &PurchaseOrder, received: NaiveDate) -> Result<(), ValidationError> {
  match order.order_date {
    Some(ordered) if received < ordered => Err(ValidationError::ReceivedBeforeOrder),
    _ => Ok(()),
  }
}

fn check_remaining(received: u32, remaining: i64) -> Result<(), ValidationError> {
  if i64::from(received) > remaining {
    return Err(ValidationError::ExceedsRemaining { received, remaining });
  }
  Ok(())
}

fn check_quantity(received: u32, remaining: i64) -> Result<(), ValidationError> {
  check_remaining(received, remaining)?;
  if received == 0 {
    return Err(ValidationError::NonPositiveQuantity);
  }
  Ok(())
}

pub struct PurchasingService {
  hook: ApiHook,
  system: SystemId,
}

impl PurchasingService {
  pub fn new(client: &ApiClient, system: SystemId) -> Self {
    Self {
      hook: client.hook(),
      system,
    }
  }

  pub fn hook(&self) -> &ApiHook {
    &self.hook
  }

  fn orders_url(&self) -> String {
    format!("/supermarket/{}/purchase-orders/", self.system)
  }

  fn order_url(&self, id: u64) -> String {
    format!("{}{}/", self.orders_url(), id)
  }

  fn receiving_url(&self) -> String {
    format!("/supermarket/{}/goods-receiving/", self.system)
  }

  fn record_url(&self, id: u64) -> String {
    format!("{}{}/", self.receiving_url(), id)
  }

  fn invalidate_order(&self, id: u64) {
    self.hook.clear_cache(&self.order_url(id));
    self.hook.clear_cache(&self.orders_url());
  }

  pub async fn orders(&self) -> Result<Option<Vec<PurchaseOrder>>, ApiError> {
    self.hook.get(&self.orders_url()).await
  }

  pub async fn pending(&self) -> Result<Option<Vec<PurchaseOrder>>, ApiError> {
    let url = format!("{}pending/", self.orders_url());
    self.hook.get(&url).await
  }

  pub async fn partially_received(&self) -> Result<Option<Vec<PurchaseOrder>>, ApiError> {
    let url = format!("{}partially-received/", self.orders_url());
    self.hook.get(&url).await
  }

  pub async fn order(&self, id: u64) -> Result<Option<PurchaseOrder>, ApiError> {
    self.hook.get(&self.order_url(id)).await
  }

  pub async fn create_order(
    &self,
    order: &NewPurchaseOrder,
  ) -> Result<Option<PurchaseOrder>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.orders_url(), Payload::json(order)?)
      .await?;
    self.hook.clear_cache(&self.orders_url());
    Ok(created)
  }

  pub async fn update_order(
    &self,
    id: u64,
    changes: Value,
  ) -> Result<Option<PurchaseOrder>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.order_url(id), Payload::Json(changes))
      .await?;
    self.invalidate_order(id);
    Ok(updated)
  }

  pub async fn delete_order(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.order_url(id), Payload::None)
      .await?;
    self.invalidate_order(id);
    Ok(())
  }

  pub async fn receivings(&self) -> Result<Option<Vec<GoodsReceiving>>, ApiError> {
    self.hook.get(&self.receiving_url()).await
  }

  pub async fn receiving(&self, id: u64) -> Result<Option<GoodsReceiving>, ApiError> {
    self.hook.get(&self.record_url(id)).await
  }

  pub async fn receivings_for_order(
    &self,
    purchase_order_id: u64,
  ) -> Result<Option<Vec<GoodsReceiving>>, ApiError> {
    let path = format!("{}by-purchase-order/", self.receiving_url());
    let url = with_query(&path, &[("purchase_order_id", &purchase_order_id.to_string())]);
    self.hook.get(&url).await
  }

  /// A `null` body or a cancelled lookup both count as missing.
  async fn require_order(&self, id: u64) -> Result<PurchaseOrder, ServiceError> {
    let order: Option<Option<PurchaseOrder>> = self.hook.get(&self.order_url(id)).await?;
    order
      .flatten()
      .ok_or_else(|| ValidationError::PurchaseOrderNotFound.into())
  }

  async fn require_record(&self, id: u64) -> Result<GoodsReceiving, ServiceError> {
    let record: Option<Option<GoodsReceiving>> = self.hook.get(&self.record_url(id)).await?;
    record
      .flatten()
      .ok_or_else(|| ValidationError::ReceivingNotFound.into())
  }

  /// Record a delivery against a purchase order.
  pub async fn receive(
    &self,
    record: &NewGoodsReceiving,
  ) -> Result<Option<GoodsReceiving>, ServiceError> {
    let order = self.require_order(record.purchase_order_id).await?;
    debug!(
      purchase_order = order.id,
      remaining = order.remaining(),
      "validating goods receiving"
    );

    check_date(&order, record.received_date)?;
    check_quantity(record.received_quantity, order.remaining())?;

    let created = self
      .hook
      .call(
        Method::Post,
        &self.receiving_url(),
        Payload::json(record).map_err(ApiError::from)?,
      )
      .await?;
    self.hook.clear_cache(&self.receiving_url());
    self.invalidate_order(record.purchase_order_id);
    Ok(created)
  }

  /// Update a receiving record. A changed quantity is checked against the
  /// order's remaining quantity with this record's own quantity excluded.
  /// A zero quantity is sent unchecked.
  pub async fn update_receiving(
    &self,
    id: u64,
    changes: &ReceivingChanges,
  ) -> Result<Option<GoodsReceiving>, ServiceError> {
    let quantity = changes.received_quantity.filter(|q| *q > 0);
    if changes.received_date.is_some() || quantity.is_some() {
      let existing = self.require_record(id).await?;
      let order = self.require_order(existing.purchase_order).await?;

      if let Some(date) = changes.received_date {
        check_date(&order, date)?;
      }
      if let Some(quantity) = quantity {
        let received_elsewhere = order.received() - existing.received_quantity;
        check_remaining(quantity, order.quantity - received_elsewhere)?;
      }
    }

    let updated = self
      .hook
      .call(
        Method::Patch,
        &self.record_url(id),
        Payload::json(changes).map_err(ApiError::from)?,
      )
      .await?;
    self.hook.clear_cache(&self.record_url(id));
    self.hook.clear_cache(&self.receiving_url());
    Ok(updated)
  }

  pub async fn delete_receiving(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.record_url(id), Payload::None)
      .await?;
    self.hook.clear_cache(&self.record_url(id));
    self.hook.clear_cache(&self.receiving_url());
    Ok(())
  }
}
