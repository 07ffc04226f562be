//! Navigation side effects triggered by the API layer.

use tracing::warn;

/// Receives client-side redirects, e.g. to the login screen after the
/// session expires.
pub trait Navigator: Send + Sync {
  fn navigate(&self, route: &str);
}

/// Navigator for headless use: logs the redirect instead of performing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
  fn navigate(&self, route: &str) {
    warn!(route, "session expired, sign in again");
  }
}
