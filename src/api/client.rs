//! Shared API client: transport, response cache and navigation in one handle.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::{CacheLayer, MemoryStorage, NoopStorage};
use crate::config::{Config, DEFAULT_LOGIN_ROUTE};

use super::error::TransportError;
use super::hook::ApiHook;
use super::navigator::{LogNavigator, Navigator};
use super::request::{ApiRequest, Method, Payload};
use super::transport::{HttpTransport, Transport, CSRF_HEADER};

/// Backend client shared by every hook in the process.
///
/// Cloning is cheap and clones share the transport, the response cache and
/// the navigator. Cancellation scope is per hook, not per client.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
  cache: CacheLayer,
  navigator: Arc<dyn Navigator>,
  csrf_token: Option<String>,
  login_route: String,
}

impl ApiClient {
  /// Create a client over any transport, with an in-memory cache and a
  /// logging navigator.
  pub fn new(transport: impl Transport + 'static) -> Self {
    Self {
      transport: Arc::new(transport),
      cache: CacheLayer::default(),
      navigator: Arc::new(LogNavigator),
      csrf_token: None,
      login_route: DEFAULT_LOGIN_ROUTE.to_string(),
    }
  }

  /// Create an HTTP client from configuration.
  pub fn from_config(config: &Config) -> Result<Self, TransportError> {
    Ok(Self::configured(HttpTransport::from_config(config)?, config))
  }

  /// Apply the cache, login route and CSRF settings to a client over `transport`.
  pub fn configured(transport: impl Transport + 'static, config: &Config) -> Self {
    let cache = if config.cache.enabled {
      CacheLayer::new(MemoryStorage::new())
    } else {
      CacheLayer::new(NoopStorage)
    }
    .with_stale_time(Duration::from_secs(config.cache.stale_secs));

    let mut client = Self::new(transport)
      .with_cache(cache)
      .with_login_route(config.login_route.clone());
    if let Some(token) = config.csrf_token() {
      client = client.with_csrf_token(token);
    }
    client
  }

  pub fn with_cache(mut self, cache: CacheLayer) -> Self {
    self.cache = cache;
    self
  }

  pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
    self.navigator = Arc::new(navigator);
    self
  }

  pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
    self.csrf_token = Some(token.into());
    self
  }

  pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
    self.login_route = route.into();
    self
  }

  /// Create a new hook with its own cancellation scope and state.
  pub fn hook(&self) -> ApiHook {
    ApiHook::new(self.clone())
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
    &self.transport
  }

  /// Build a request with the headers every call carries.
  pub(crate) fn request(&self, method: Method, url: &str, payload: Payload) -> ApiRequest {
    let headers = self
      .csrf_token
      .iter()
      .map(|token| (CSRF_HEADER.to_string(), token.clone()))
      .collect();

    ApiRequest {
      method,
      url: url.to_string(),
      headers,
      payload,
    }
  }

  pub(crate) fn redirect_to_login(&self) {
    info!(route = %self.login_route, "redirecting to login");
    self.navigator.navigate(&self.login_route);
  }
}
