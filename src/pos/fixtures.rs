//! Backend-shaped JSON records shared by the service tests.

use serde_json::{json, Value};

pub fn order(id: u64, status: &str, created_at: &str) -> Value {
  json!({
    "id": id,
    "system": 5,
    "customer_name": format!("Guest {}", id),
    "table_number": "T1",
    "status": status,
    "total_price": "24.00",
    "profit": 10.5,
    "order_items": [{"id": 1, "menu_item": 3, "menu_item_name": "Pizza", "quantity": 2}],
    "created_at": created_at,
    "updated_at": created_at,
    "order_type": "in_house",
  })
}

pub fn order_at_table(id: u64, status: &str, created_at: &str, table: Option<&str>) -> Value {
  let mut value = order(id, status, created_at);
  value["table_number"] = json!(table);
  value
}
