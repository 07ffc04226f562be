//! Kitchen display: pending and in-preparation orders.

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;

use crate::api::{ApiClient, ApiError, ApiHook, Method, Payload};
use crate::tenant::SystemId;

use super::orders::{Order, OrderStatus};

/// Transitions the kitchen is allowed to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitchenStep {
  Preparing,
  Ready,
}

impl From<KitchenStep> for OrderStatus {
  fn from(step: KitchenStep) -> Self {
    match step {
      KitchenStep::Preparing => OrderStatus::Preparing,
      KitchenStep::Ready => OrderStatus::Ready,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KitchenStats {
  pub total: usize,
  pub pending: usize,
  pub preparing: usize,
}

/// Board filters; empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct KitchenFilter {
  pub search: String,
  pub statuses: Vec<OrderStatus>,
  pub table: String,
}

fn on_board(order: &Order) -> bool {
  matches!(order.status, OrderStatus::Pending | OrderStatus::Preparing)
}

/// Pending first, then newest first within the same status.
pub fn sort_orders(orders: &mut [Order]) {
  orders.sort_by(|a, b| {
    let a_pending = a.status == OrderStatus::Pending;
    let b_pending = b.status == OrderStatus::Pending;
    b_pending
      .cmp(&a_pending)
      .then_with(|| b.created_at.cmp(&a.created_at))
  });
}

/// Keep only board orders, sorted for display.
pub fn board(orders: Vec<Order>) -> Vec<Order> {
  let mut orders: Vec<Order> = orders.into_iter().filter(on_board).collect();
  sort_orders(&mut orders);
  orders
}

/// Apply a status change locally; orders that leave the board drop out.
pub fn apply_step(orders: Vec<Order>, id: u64, step: KitchenStep) -> Vec<Order> {
  let status = OrderStatus::from(step);
  board(
    orders
      .into_iter()
      .map(|mut order| {
        if order.id == id {
          order.status = status;
        }
        order
      })
      .collect(),
  )
}

pub fn filter_orders<'a>(orders: &'a [Order], filter: &KitchenFilter) -> Vec<&'a Order> {
  let needle = filter.search.to_lowercase();
  orders
    .iter()
    .filter(|order| {
      needle.is_empty()
        || order
          .customer_name
          .as_deref()
          .is_some_and(|name| name.to_lowercase().contains(&needle))
        || order
          .table_number
          .as_deref()
          .is_some_and(|table| table.to_lowercase().contains(&needle))
        || order.id.to_string().contains(&filter.search)
    })
    .filter(|order| filter.statuses.is_empty() || filter.statuses.contains(&order.status))
    .filter(|order| filter.table.is_empty() || order.table_number.as_deref() == Some(filter.table.as_str()))
    .collect()
}

pub fn stats(orders: &[Order]) -> KitchenStats {
  KitchenStats {
    total: orders.len(),
    pending: orders.iter().filter(|o| o.status == OrderStatus::Pending).count(),
    preparing: orders.iter().filter(|o| o.status == OrderStatus::Preparing).count(),
  }
}

/// Distinct non-empty table labels, sorted.
pub fn unique_tables(orders: &[Order]) -> Vec<String> {
  orders
    .iter()
    .filter_map(|order| order.table_number.clone())
    .filter(|table| !table.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

pub struct KitchenService {
  hook: ApiHook,
  system: SystemId,
}

impl KitchenService {
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
    format!("/restaurant/{}/kitchen/orders/", self.system)
  }

  /// Current board, always fetched fresh.
  pub async fn orders(&self) -> Result<Option<Vec<Order>>, ApiError> {
    let url = self.collection();
    self.hook.clear_cache(&url);
    let orders: Option<Vec<Order>> = self.hook.get(&url).await?;
    Ok(orders.map(board))
  }

  pub async fn update_status(&self, id: u64, step: KitchenStep) -> Result<Option<Order>, ApiError> {
    let url = format!("{}{}/", self.collection(), id);
    let body = json!({ "status": OrderStatus::from(step) });
    self.hook.call(Method::Patch, &url, Payload::Json(body)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{Reply, ScriptedTransport};
  use crate::api::ApiRequest;
  use crate::pos::fixtures::{order, order_at_table};
  use serde_json::Value;

  fn decode(values: Vec<Value>) -> Vec<Order> {
    serde_json::from_value(Value::Array(values)).unwrap()
  }

  fn sample() -> Vec<Order> {
    decode(vec![
      order_at_table(1, "preparing", "2024-05-01T10:00:00Z", Some("T2")),
      order_at_table(2, "pending", "2024-05-01T09:00:00Z", Some("T1")),
      order_at_table(3, "ready", "2024-05-01T11:00:00Z", Some("T3")),
      order_at_table(4, "pending", "2024-05-01T12:00:00Z", None),
      order_at_table(5, "preparing", "2024-05-01T13:00:00Z", Some("T2")),
    ])
  }

  fn ids(orders: &[Order]) -> Vec<u64> {
    orders.iter().map(|o| o.id).collect()
  }

  #[test]
  fn test_board_keeps_pending_first_then_newest() {
    assert_eq!(ids(&board(sample())), vec![4, 2, 5, 1]);
  }

  #[test]
  fn test_apply_step_moves_or_drops_order() {
    let current = board(sample());

    let preparing = apply_step(current.clone(), 4, KitchenStep::Preparing);
    assert_eq!(ids(&preparing), vec![2, 5, 4, 1]);

    let ready = apply_step(current, 5, KitchenStep::Ready);
    assert_eq!(ids(&ready), vec![4, 2, 1]);
  }

  #[test]
  fn test_filters_stats_and_tables() {
    let orders = board(sample());

    let by_table = filter_orders(
      &orders,
      &KitchenFilter {
        table: "T2".into(),
        ..Default::default()
      },
    );
    assert_eq!(by_table.len(), 2);

    let by_search = filter_orders(
      &orders,
      &KitchenFilter {
        search: "guest 2".into(),
        statuses: vec![OrderStatus::Pending],
        ..Default::default()
      },
    );
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].id, 2);

    assert_eq!(
      stats(&orders),
      KitchenStats {
        total: 4,
        pending: 2,
        preparing: 2
      }
    );
    assert_eq!(unique_tables(&orders), vec!["T1", "T2"]);
  }

  #[tokio::test]
  async fn test_orders_always_refetch() {
    let transport = ScriptedTransport::new(|_: &ApiRequest| {
      Reply::ok(Value::Array(vec![
        order(1, "ready", "2024-05-01T10:00:00Z"),
        order(2, "pending", "2024-05-01T09:00:00Z"),
      ]))
    });
    let kitchen = KitchenService::new(&ApiClient::new(transport.clone()), SystemId::from(5));

    let first = kitchen.orders().await.unwrap().unwrap();
    kitchen.orders().await.unwrap();

    assert_eq!(ids(&first), vec![2]);
    assert_eq!(
      transport.urls(Method::Get),
      vec!["/restaurant/5/kitchen/orders/"; 2]
    );
  }

  #[tokio::test]
  async fn test_update_status_body() {
    let transport =
      ScriptedTransport::new(|_: &ApiRequest| Reply::ok(order(7, "ready", "2024-05-01T10:00:00Z")));
    let kitchen = KitchenService::new(&ApiClient::new(transport.clone()), SystemId::from(5));

    let updated = kitchen.update_status(7, KitchenStep::Ready).await.unwrap().unwrap();

    assert_eq!(updated.status, OrderStatus::Ready);
    let request = &transport.requests()[0];
    assert_eq!(request.url, "/restaurant/5/kitchen/orders/7/");
    assert_eq!(request.payload, Payload::Json(json!({"status": "ready"})));
  }
}
