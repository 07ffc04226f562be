//! Restaurant financial dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::{ApiClient, ApiError, ApiHook};
use crate::tenant::SystemId;

use super::{de, with_query};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendView {
  #[default]
  Daily,
  Monthly,
}

impl TrendView {
  pub fn as_str(self) -> &'static str {
    match self {
      TrendView::Daily => "daily",
      TrendView::Monthly => "monthly",
    }
  }

  fn label_format(self) -> &'static str {
    match self {
      TrendView::Daily => "%b %-d",
      TrendView::Monthly => "%b %y",
    }
  }
}

impl fmt::Display for TrendView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Profit for the current day, week and month, each with its change
/// against the previous period in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitSummary {
  #[serde(deserialize_with = "de::decimal")]
  pub day_profit: f64,
  #[serde(deserialize_with = "de::decimal")]
  pub day_change: f64,
  #[serde(deserialize_with = "de::decimal")]
  pub week_profit: f64,
  #[serde(deserialize_with = "de::decimal")]
  pub week_change: f64,
  #[serde(deserialize_with = "de::decimal")]
  pub month_profit: f64,
  #[serde(deserialize_with = "de::decimal")]
  pub month_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
  pub today_orders: u64,
  #[serde(deserialize_with = "de::decimal")]
  pub today_change: f64,
  pub week_orders: u64,
  #[serde(deserialize_with = "de::decimal")]
  pub week_change: f64,
  pub month_orders: u64,
  #[serde(deserialize_with = "de::decimal")]
  pub month_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitTrendPoint {
  #[serde(deserialize_with = "de::date")]
  pub date: NaiveDate,
  #[serde(deserialize_with = "de::decimal")]
  pub profit: f64,
}

/// Chart-ready trend: one label per point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
  pub labels: Vec<String>,
  pub values: Vec<f64>,
}

impl TrendSeries {
  /// Labels read "May 1" for daily points and "May 24" for monthly ones.
  pub fn from_points(points: &[ProfitTrendPoint], view: TrendView) -> Self {
    Self {
      labels: points
        .iter()
        .map(|p| p.date.format(view.label_format()).to_string())
        .collect(),
      values: points.iter().map(|p| p.profit).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub profit: ProfitSummary,
  pub orders: OrderSummary,
  pub trend: TrendSeries,
}

/// The three dashboard requests run concurrently, so each gets its own
/// hook and cannot cancel the others.
pub struct AnalyticsService {
  profit: ApiHook,
  orders: ApiHook,
  trend: ApiHook,
  system: SystemId,
}

impl AnalyticsService {
  pub fn new(client: &ApiClient, system: SystemId) -> Self {
    Self {
      profit: client.hook(),
      orders: client.hook(),
      trend: client.hook(),
      system,
    }
  }

  fn url(&self, path: &str) -> String {
    format!("/restaurant/{}/orders/analytics/{}", self.system, path)
  }

  pub async fn profit_summary(&self) -> Result<Option<ProfitSummary>, ApiError> {
    self.profit.get(&self.url("profit-summary/")).await
  }

  pub async fn order_summary(&self) -> Result<Option<OrderSummary>, ApiError> {
    self.orders.get(&self.url("order-summary/")).await
  }

  pub async fn profit_trend(&self, view: TrendView) -> Result<Option<Vec<ProfitTrendPoint>>, ApiError> {
    let url = with_query(&self.url("profit-trend/"), &[("view", view.as_str())]);
    self.trend.get(&url).await
  }

  /// Load every dashboard panel from the server, bypassing the cache.
  ///
  /// `Ok(None)` if any of the requests was cancelled.
  pub async fn dashboard(&self, view: TrendView) -> Result<Option<Dashboard>, ApiError> {
    self.profit.clear_all_cache();

    let (profit, orders, trend) = tokio::try_join!(
      self.profit_summary(),
      self.order_summary(),
      self.profit_trend(view),
    )?;

    Ok(match (profit, orders, trend) {
      (Some(profit), Some(orders), Some(points)) => Some(Dashboard {
        profit,
        orders,
        trend: TrendSeries::from_points(&points, view),
      }),
      _ => None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{Reply, ScriptedTransport};
  use crate::api::{ApiRequest, Method, TransportError};
  use serde_json::{json, Value};

  fn backend(request: &ApiRequest) -> Reply {
    if request.url.contains("profit-summary") {
      Reply::ok(json!({
        "day_profit": "120.50",
        "day_change": 5.0,
        "week_profit": 800,
        "week_change": -2.5,
        "month_profit": 3100,
        "month_change": 12,
      }))
    } else if request.url.contains("order-summary") {
      Reply::ok(json!({
        "today_orders": 14,
        "today_change": 7.1,
        "week_orders": 90,
        "week_change": 0,
        "month_orders": 402,
        "month_change": 3.3,
      }))
    } else {
      Reply::ok(json!([
        {"date": "2024-05-01", "profit": 100},
        {"date": "2024-05-02", "profit": "80.25"},
      ]))
    }
  }

  #[test]
  fn test_trend_labels() {
    let points: Vec<ProfitTrendPoint> = serde_json::from_value(json!([
      {"date": "2024-05-01", "profit": 10},
      {"date": "2024-06", "profit": 20},
    ]))
    .unwrap();

    let daily = TrendSeries::from_points(&points, TrendView::Daily);
    assert_eq!(daily.labels, vec!["May 1", "Jun 1"]);
    assert_eq!(daily.values, vec![10.0, 20.0]);

    let monthly = TrendSeries::from_points(&points, TrendView::Monthly);
    assert_eq!(monthly.labels, vec!["May 24", "Jun 24"]);
  }

  #[tokio::test]
  async fn test_dashboard_loads_all_panels_fresh() {
    let transport = ScriptedTransport::new(backend);
    let client = ApiClient::new(transport.clone());
    let analytics = AnalyticsService::new(&client, SystemId::from(5));

    let first = analytics.dashboard(TrendView::Monthly).await.unwrap().unwrap();
    analytics.dashboard(TrendView::Monthly).await.unwrap();

    assert_eq!(first.profit.day_profit, 120.5);
    assert_eq!(first.orders.month_orders, 402);
    assert_eq!(first.trend.values, vec![100.0, 80.25]);

    let urls = transport.urls(Method::Get);
    assert_eq!(urls.len(), 6);
    assert!(urls.contains(&"/restaurant/5/orders/analytics/profit-trend/?view=monthly".to_string()));
  }

  #[tokio::test]
  async fn test_dashboard_fails_when_any_panel_fails() {
    let transport = ScriptedTransport::new(|request: &ApiRequest| {
      if request.url.contains("order-summary") {
        Reply::err(TransportError::Status {
          status: 500,
          body: Some(json!({"detail": "boom"})),
        })
      } else {
        backend(request)
      }
    });
    let analytics = AnalyticsService::new(&ApiClient::new(transport), SystemId::from(5));

    let err = analytics.dashboard(TrendView::Daily).await.unwrap_err();
    assert_eq!(err.message(), "boom");
  }

  #[tokio::test]
  async fn test_single_panels_are_cached() {
    let transport = ScriptedTransport::new(backend);
    let analytics = AnalyticsService::new(&ApiClient::new(transport.clone()), SystemId::from(5));

    analytics.profit_summary().await.unwrap();
    let summary: Option<Value> = analytics.profit.data();
    analytics.profit_summary().await.unwrap();

    assert!(summary.is_some());
    assert_eq!(transport.request_count(), 1);
  }
}
