//! In-memory transport and navigator for tests.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::TransportError;
use super::navigator::Navigator;
use super::request::{ApiRequest, TransportResponse};
use super::transport::Transport;

/// Scripted answer to one request.
pub struct Reply {
  result: Result<TransportResponse, TransportError>,
  delay: Option<Duration>,
}

impl Reply {
  pub fn ok(body: Value) -> Self {
    Self {
      result: Ok(TransportResponse { status: 200, body }),
      delay: None,
    }
  }

  pub fn err(err: TransportError) -> Self {
    Self {
      result: Err(err),
      delay: None,
    }
  }

  /// Resolve only after `delay` (use with a paused clock).
  pub fn after(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }
}

type Responder = dyn Fn(&ApiRequest) -> Reply + Send + Sync;

/// Transport that answers from a closure and records every request.
#[derive(Clone)]
pub struct ScriptedTransport {
  responder: Arc<Responder>,
  requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
  pub fn new<F>(responder: F) -> Self
  where
    F: Fn(&ApiRequest) -> Reply + Send + Sync + 'static,
  {
    Self {
      responder: Arc::new(responder),
      requests: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// Transport that answers every request with `null`.
  pub fn empty() -> Self {
    Self::new(|_: &ApiRequest| Reply::ok(Value::Null))
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn request_count(&self) -> usize {
    self.requests.lock().unwrap().len()
  }

  /// URLs requested with the given method, in order.
  pub fn urls(&self, method: super::Method) -> Vec<String> {
    self
      .requests()
      .into_iter()
      .filter(|r| r.method == method)
      .map(|r| r.url)
      .collect()
  }
}

impl Transport for ScriptedTransport {
  fn send(&self, request: ApiRequest) -> BoxFuture<'static, Result<TransportResponse, TransportError>> {
    let reply = (self.responder)(&request);
    self.requests.lock().unwrap().push(request);

    async move {
      if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
      }
      reply.result
    }
    .boxed()
  }
}

/// Navigator that remembers every route it was sent to.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
  routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
  pub fn routes(&self) -> Vec<String> {
    self.routes.lock().unwrap().clone()
  }
}

impl Navigator for RecordingNavigator {
  fn navigate(&self, route: &str) {
    self.routes.lock().unwrap().push(route.to_string());
  }
}
