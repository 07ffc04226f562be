//! Per-component API hook: cancellation scope, reactive state and the
//! read-through cache.
//!
//! Every call goes through [`ApiHook::call`], which:
//! - Cancels the hook's previous in-flight call, unless that call is a
//!   mutation and the new one is a read
//! - Serves fresh cached payloads for GET without touching the network
//! - Stores successful GET payloads in the shared cache
//! - Publishes `{data, loading, error}` on a watch channel
//! - Redirects to the login route when the session is missing

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::cache_key;

use super::client::ApiClient;
use super::error::ApiError;
use super::request::{Method, Payload};

/// Reactive state of a hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiState {
  /// Payload of the last successful call (kept on failure)
  pub data: Option<Value>,
  pub loading: bool,
  /// Message of the last failure, cleared when a call starts
  pub error: Option<String>,
}

struct InFlight {
  generation: u64,
  method: Method,
  token: CancellationToken,
}

#[derive(Default)]
struct Slot {
  /// Generation of the most recently issued call
  latest: u64,
  current: Option<InFlight>,
}

/// How a call that reached the transport ended.
enum Outcome<T> {
  Cancelled,
  Finished(T),
}

/// A single cancellation scope over a shared `ApiClient`.
///
/// Dropping the hook cancels whatever it still has in flight.
pub struct ApiHook {
  client: ApiClient,
  slot: Mutex<Slot>,
  state: watch::Sender<ApiState>,
}

impl ApiHook {
  pub(crate) fn new(client: ApiClient) -> Self {
    let (state, _) = watch::channel(ApiState::default());
    Self {
      client,
      slot: Mutex::new(Slot::default()),
      state,
    }
  }

  pub fn client(&self) -> &ApiClient {
    &self.client
  }

  /// Issue a call and decode the payload into `R`.
  ///
  /// Returns `Ok(None)` when the call was cancelled before it settled.
  pub async fn call<R: DeserializeOwned>(
    &self,
    method: Method,
    url: &str,
    payload: Payload,
  ) -> Result<Option<R>, ApiError> {
    let (generation, token) = self.begin(method);

    match self.execute(generation, &token, method, url, payload).await {
      Ok(Some(value)) => serde_json::from_value(value).map(Some).map_err(|e| {
        let err = ApiError::Decode(format!("Unexpected response from {}: {}", url, e));
        self.apply(generation, |state| state.error = Some(err.to_string()));
        err
      }),
      Ok(None) => Ok(None),
      Err(err) => Err(err),
    }
  }

  /// Shorthand for `call(Method::Get, url, Payload::None)`.
  pub async fn get<R: DeserializeOwned>(&self, url: &str) -> Result<Option<R>, ApiError> {
    self.call(Method::Get, url, Payload::None).await
  }

  async fn execute(
    &self,
    generation: u64,
    token: &CancellationToken,
    method: Method,
    url: &str,
    payload: Payload,
  ) -> Result<Option<Value>, ApiError> {
    let key = cache_key(Method::Get, url);

    if method == Method::Get {
      if let Some(cached) = self.client.cache().lookup(&key) {
        debug!(url, "cache hit");
        self.apply(generation, |state| {
          state.data = Some(cached.clone());
          state.loading = false;
          state.error = None;
        });
        self.release(generation);
        return Ok(Some(cached));
      }
      debug!(url, "cache miss");
    }

    // Keep the previous data visible while loading
    self.apply(generation, |state| {
      state.loading = true;
      state.error = None;
    });

    let request = self.client.request(method, url, payload);
    let send = self.client.transport().send(request);

    let outcome = tokio::select! {
      biased;
      _ = token.cancelled() => Outcome::Cancelled,
      result = send => Outcome::Finished(result),
    };

    let result = match outcome {
      Outcome::Finished(result) if !token.is_cancelled() => result,
      _ => {
        debug!(method = method.as_str(), url, "call cancelled");
        self.settle_cancelled(generation);
        return Ok(None);
      }
    };

    match result {
      Ok(response) => {
        if method == Method::Get {
          self.client.cache().store(&key, response.body.clone());
        } else {
          info!(method = method.as_str(), url, status = response.status, "mutation succeeded");
        }
        self.apply(generation, |state| {
          state.data = Some(response.body.clone());
          state.loading = false;
          state.error = None;
        });
        self.release(generation);
        Ok(Some(response.body))
      }
      Err(err) => {
        let err = ApiError::from(err);
        warn!(method = method.as_str(), url, error = %err, "call failed");
        if err.is_auth_expired() {
          self.client.redirect_to_login();
        }
        self.record_failure(generation, err.message());
        self.release(generation);
        Err(err)
      }
    }
  }

  /// Register a new call, cancelling the previous one where allowed.
  fn begin(&self, method: Method) -> (u64, CancellationToken) {
    let mut slot = self.slot();
    slot.latest += 1;
    let generation = slot.latest;

    if let Some(previous) = slot.current.take() {
      if previous.method.is_mutation() && method == Method::Get {
        // A navigation read must not kill a pending write
        debug!(
          pending = previous.method.as_str(),
          "leaving mutation in flight"
        );
      } else {
        previous.token.cancel();
      }
    }

    let token = CancellationToken::new();
    slot.current = Some(InFlight {
      generation,
      method,
      token: token.clone(),
    });
    (generation, token)
  }

  /// Apply a state change if `generation` is still the latest call.
  fn apply(&self, generation: u64, change: impl FnOnce(&mut ApiState)) {
    let slot = self.slot();
    if slot.latest == generation {
      self.state.send_modify(change);
    }
  }

  /// Record a failed call. Only a call that reached the transport gets
  /// here, so a superseded one is a mutation left running by a later read:
  /// its error is still recorded, but loading belongs to the newer call.
  fn record_failure(&self, generation: u64, message: &str) {
    let latest = self.slot().latest == generation;
    self.state.send_modify(|state| {
      if latest {
        state.loading = false;
      }
      state.error = Some(message.to_string());
    });
  }

  /// Forget the in-flight handle if it still belongs to `generation`.
  fn release(&self, generation: u64) {
    let mut slot = self.slot();
    if slot
      .current
      .as_ref()
      .is_some_and(|current| current.generation == generation)
    {
      slot.current = None;
    }
  }

  fn settle_cancelled(&self, generation: u64) {
    self.apply(generation, |state| state.loading = false);
    self.release(generation);
  }

  fn slot(&self) -> MutexGuard<'_, Slot> {
    self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Cancel the call currently in flight, if any.
  pub fn abort(&self) {
    if let Some(current) = self.slot().current.take() {
      current.token.cancel();
    }
  }

  /// Delete the cached GET response for `url`.
  pub fn clear_cache(&self, url: &str) {
    self.client.cache().invalidate(&cache_key(Method::Get, url));
  }

  /// Empty the whole shared cache.
  pub fn clear_all_cache(&self) {
    self.client.cache().clear();
  }

  /// Current state snapshot.
  pub fn state(&self) -> ApiState {
    self.state.borrow().clone()
  }

  /// Subscribe to state changes.
  pub fn subscribe(&self) -> watch::Receiver<ApiState> {
    self.state.subscribe()
  }

  pub fn is_loading(&self) -> bool {
    self.state.borrow().loading
  }

  pub fn error(&self) -> Option<String> {
    self.state.borrow().error.clone()
  }

  /// Decode the current data into `T`.
  pub fn data<T: DeserializeOwned>(&self) -> Option<T> {
    let state = self.state.borrow();
    let value = state.data.as_ref()?;
    serde_json::from_value(value.clone()).ok()
  }
}

impl Drop for ApiHook {
  fn drop(&mut self) {
    self.abort();
  }
}
