//! Supermarket products and stock levels.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiClient, ApiError, ApiHook, FormPart, Method, Payload};
use crate::tenant::SystemId;

use super::{de, form_fields};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub barcode: Option<String>,
  #[serde(deserialize_with = "de::decimal")]
  pub price: f64,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub cost: Option<f64>,
  #[serde(default)]
  pub stock_quantity: i64,
  #[serde(default)]
  pub minimum_stock: Option<i64>,
  #[serde(default)]
  pub expiry_date: Option<NaiveDate>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
}

/// Fields sent when creating or replacing a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDraft {
  pub name: String,
  pub price: f64,
  pub cost: f64,
  pub stock_quantity: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub minimum_stock: Option<i64>,
  pub expiry_date: Option<NaiveDate>,
  pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
  pub id: u64,
  pub product: u64,
  pub quantity_changed: i64,
  #[serde(default)]
  pub change_type: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

/// Which slice of the catalogue to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductFilter {
  #[default]
  All,
  LowStock,
  ExpiringSoon,
  Expired,
}

impl ProductFilter {
  fn path(self) -> &'static str {
    match self {
      ProductFilter::All => "",
      ProductFilter::LowStock => "low-stock/",
      ProductFilter::ExpiringSoon => "expiring-soon/",
      ProductFilter::Expired => "expired/",
    }
  }
}

pub struct ProductService {
  hook: ApiHook,
  system: SystemId,
}

impl ProductService {
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
    format!("/supermarket/{}/products/", self.system)
  }

  fn product_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  /// Every product view that a stock or catalogue change can affect.
  fn invalidate(&self, id: Option<u64>) {
    if let Some(id) = id {
      self.hook.clear_cache(&self.product_url(id));
    }
    let collection = self.collection();
    self.hook.clear_cache(&collection);
    for filter in [
      ProductFilter::LowStock,
      ProductFilter::ExpiringSoon,
      ProductFilter::Expired,
    ] {
      self.hook.clear_cache(&format!("{}{}", collection, filter.path()));
    }
  }

  pub async fn list(&self, filter: ProductFilter) -> Result<Option<Vec<Product>>, ApiError> {
    let url = format!("{}{}", self.collection(), filter.path());
    self.hook.get(&url).await
  }

  pub async fn low_stock(&self) -> Result<Option<Vec<Product>>, ApiError> {
    self.list(ProductFilter::LowStock).await
  }

  pub async fn expiring_soon(&self) -> Result<Option<Vec<Product>>, ApiError> {
    self.list(ProductFilter::ExpiringSoon).await
  }

  pub async fn get(&self, id: u64) -> Result<Option<Product>, ApiError> {
    self.hook.get(&self.product_url(id)).await
  }

  pub async fn stock_history(&self) -> Result<Option<Vec<StockChange>>, ApiError> {
    let url = format!("{}stock-history/", self.collection());
    self.hook.get(&url).await
  }

  /// Create a product; multipart when an image is attached.
  pub async fn create(
    &self,
    draft: &ProductDraft,
    image: Option<FormPart>,
  ) -> Result<Option<Product>, ApiError> {
    let payload = Self::payload(draft, image)?;
    let created = self.hook.call(Method::Post, &self.collection(), payload).await?;
    self.invalidate(None);
    Ok(created)
  }

  pub async fn update(
    &self,
    id: u64,
    draft: &ProductDraft,
    image: Option<FormPart>,
  ) -> Result<Option<Product>, ApiError> {
    let payload = Self::payload(draft, image)?;
    let updated = self.hook.call(Method::Put, &self.product_url(id), payload).await?;
    self.invalidate(Some(id));
    Ok(updated)
  }

  pub async fn patch(&self, id: u64, changes: Value) -> Result<Option<Product>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.product_url(id), Payload::Json(changes))
      .await?;
    self.invalidate(Some(id));
    Ok(updated)
  }

  /// Set the on-hand quantity through the dedicated stock endpoint.
  pub async fn set_stock(&self, id: u64, stock_quantity: i64) -> Result<Option<Value>, ApiError> {
    let url = format!("{}stock/", self.product_url(id));
    let updated = self
      .hook
      .call(
        Method::Patch,
        &url,
        Payload::Json(json!({ "stock_quantity": stock_quantity })),
      )
      .await?;
    self.invalidate(Some(id));
    Ok(updated)
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.product_url(id), Payload::None)
      .await?;
    self.invalidate(Some(id));
    Ok(())
  }

  fn payload(draft: &ProductDraft, image: Option<FormPart>) -> Result<Payload, ApiError> {
    match image {
      None => Ok(Payload::json(draft)?),
      Some(image) => {
        let mut parts = form_fields(draft)?;
        parts.push(image);
        Ok(Payload::Multipart(parts))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{Reply, ScriptedTransport};
  use crate::api::ApiRequest;

  fn milk() -> Value {
    json!({
      "id": 10,
      "name": "Milk",
      "barcode": "1234567890123",
      "price": "1.20",
      "cost": "0.80",
      "stock_quantity": 4,
      "minimum_stock": 10,
      "expiry_date": "2024-06-01",
      "image": null,
      "category": "dairy",
      "batches": [],
    })
  }

  fn service(transport: &ScriptedTransport) -> ProductService {
    ProductService::new(&ApiClient::new(transport.clone()), SystemId::from(8))
  }

  #[test]
  fn test_product_decodes_backend_shape() {
    let product: Product = serde_json::from_value(milk()).unwrap();
    assert_eq!(product.price, 1.2);
    assert_eq!(product.expiry_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    assert_eq!(product.minimum_stock, Some(10));
  }

  #[tokio::test]
  async fn test_filtered_lists_use_sub_paths() {
    let transport = ScriptedTransport::new(|_: &ApiRequest| Reply::ok(json!([milk()])));
    let products = service(&transport);

    products.list(ProductFilter::All).await.unwrap();
    products.low_stock().await.unwrap();
    products.expiring_soon().await.unwrap();
    products.list(ProductFilter::Expired).await.unwrap();

    assert_eq!(
      transport.urls(Method::Get),
      vec![
        "/supermarket/8/products/",
        "/supermarket/8/products/low-stock/",
        "/supermarket/8/products/expiring-soon/",
        "/supermarket/8/products/expired/",
      ]
    );
  }

  #[tokio::test]
  async fn test_set_stock_invalidates_filtered_views() {
    let transport = ScriptedTransport::new(|request: &ApiRequest| match request.method {
      Method::Get => Reply::ok(json!([milk()])),
      _ => Reply::ok(json!({"stock_quantity": 40})),
    });
    let products = service(&transport);

    products.low_stock().await.unwrap();
    products.set_stock(10, 40).await.unwrap();
    products.low_stock().await.unwrap();

    assert_eq!(transport.urls(Method::Get).len(), 2);
    let patch = &transport.requests()[1];
    assert_eq!(patch.url, "/supermarket/8/products/10/stock/");
    assert_eq!(patch.payload, Payload::Json(json!({"stock_quantity": 40})));
  }

  #[tokio::test]
  async fn test_create_with_image_is_multipart() {
    let transport = ScriptedTransport::new(|_: &ApiRequest| Reply::ok(milk()));
    let products = service(&transport);

    let draft = ProductDraft {
      name: "Milk".into(),
      price: 1.2,
      cost: 0.8,
      stock_quantity: 4,
      category: "dairy".into(),
      ..Default::default()
    };
    let image = FormPart::file("image", "milk.jpg", "image/jpeg", vec![0xff, 0xd8]);
    products.create(&draft, Some(image)).await.unwrap();

    let request = &transport.requests()[0];
    assert!(request.payload.is_multipart());
    let Payload::Multipart(parts) = &request.payload else {
      unreachable!();
    };
    assert!(parts.contains(&FormPart::text("name", "Milk")));
    assert!(!parts.iter().any(|p| p.name() == "expiry_date"));
  }

  #[tokio::test]
  async fn test_stock_history() {
    let transport = ScriptedTransport::new(|_: &ApiRequest| {
      Reply::ok(json!([{
        "id": 1,
        "product": 10,
        "quantity_changed": -2,
        "change_type": "sale",
        "created_at": "2024-05-01T08:30:00Z",
      }]))
    });
    let products = service(&transport);

    let history = products.stock_history().await.unwrap().unwrap();
    assert_eq!(history[0].quantity_changed, -2);
    assert_eq!(transport.urls(Method::Get), vec!["/supermarket/8/products/stock-history/"]);
  }
}
