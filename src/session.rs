//! Backend session cookies kept between command-line runs.

use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::HttpTransport;

pub struct SessionStore {
  path: PathBuf,
}

impl SessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn in_dir(data_dir: &Path) -> Self {
    Self::new(data_dir.join("session"))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Saved `Cookie` header value, if any.
  pub fn load(&self) -> Result<Option<String>> {
    if !self.path.exists() {
      return Ok(None);
    }
    let contents = std::fs::read_to_string(&self.path)
      .map_err(|e| eyre!("Failed to read {}: {}", self.path.display(), e))?;
    let contents = contents.trim();
    Ok((!contents.is_empty()).then(|| contents.to_string()))
  }

  /// Seed `transport` with the saved session. Returns whether one existed.
  pub fn restore(&self, transport: &HttpTransport) -> Result<bool> {
    match self.load()? {
      Some(cookies) => {
        debug!(path = %self.path.display(), "restoring session");
        transport.restore_session(&cookies);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Persist whatever session `transport` currently holds.
  pub fn save(&self, transport: &HttpTransport) -> Result<()> {
    let Some(cookies) = transport.session_cookies() else {
      return self.clear();
    };
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create {}: {}", parent.display(), e))?;
    }
    std::fs::write(&self.path, cookies)
      .map_err(|e| eyre!("Failed to write {}: {}", self.path.display(), e))
  }

  pub fn clear(&self) -> Result<()> {
    if self.path.exists() {
      std::fs::remove_file(&self.path)
        .map_err(|e| eyre!("Failed to remove {}: {}", self.path.display(), e))?;
    }
    Ok(())
  }
}
