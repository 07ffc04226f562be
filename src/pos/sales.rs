//! Supermarket checkout sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::de;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
  Cash,
  Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
  #[serde(default)]
  pub id: Option<u64>,
  pub product: u64,
  #[serde(default)]
  pub product_name: Option<String>,
  pub quantity: u32,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub unit_price: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub discount_amount: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub total_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
  pub id: u64,
  #[serde(default)]
  pub receipt_number: String,
  #[serde(default)]
  pub cashier_name: Option<String>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub total_price: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub discount_amount: Option<f64>,
  #[serde(default)]
  pub payment_type: Option<PaymentType>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub vat_amount: Option<f64>,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub vat_rate: Option<f64>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub items: Vec<SaleLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewSaleLine {
  pub product: u64,
  pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSale {
  pub payment_type: PaymentType,
  pub items: Vec<NewSaleLine>,
}

pub struct SalesService {
  hook: ApiHook,
  system: SystemId,
}

impl SalesService {
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
    format!("/supermarket/{}/sales/", self.system)
  }

  fn sale_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  pub async fn create(&self, sale: &NewSale) -> Result<Option<Sale>, ApiError> {
    let created = self
      .hook
      .call(Method::Post, &self.collection(), Payload::json(sale)?)
      .await?;
    self.hook.clear_cache(&self.collection());
    Ok(created)
  }

  /// Replace an open sale (PUT).
  pub async fn update(&self, id: u64, sale: &NewSale) -> Result<Option<Sale>, ApiError> {
    let updated = self
      .hook
      .call(Method::Put, &self.sale_url(id), Payload::json(sale)?)
      .await?;
    self.hook.clear_cache(&self.sale_url(id));
    self.hook.clear_cache(&self.collection());
    Ok(updated)
  }

  pub async fn apply_discount(&self, id: u64, discount_id: u64) -> Result<Option<Sale>, ApiError> {
    let url = format!("{}apply_discount/", self.sale_url(id));
    let updated = self
      .hook
      .call(Method::Patch, &url, Payload::Json(json!({ "discount_id": discount_id })))
      .await?;
    self.hook.clear_cache(&self.sale_url(id));
    self.hook.clear_cache(&self.collection());
    Ok(updated)
  }

  /// API path of the printable (HTML) receipt.
  pub fn receipt_path(&self, id: u64) -> String {
    format!("{}receipt/", self.sale_url(id))
  }
}
