//! Tenant ("selected system") identity and its persisted selection.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::ApiClient;

/// Identifier of a restaurant or supermarket system; scopes every API path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(String);

impl SystemId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for SystemId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SystemId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl From<u64> for SystemId {
  fn from(id: u64) -> Self {
    Self(id.to_string())
  }
}

/// The two persisted keys, named as the backend's web client names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
  #[serde(rename = "selectedSystemId", default)]
  pub system_id: Option<SystemId>,
  #[serde(rename = "selectedSystemCategory", default)]
  pub system_category: Option<String>,
}

/// File-backed store for the selected system. No validation, no expiry.
pub struct SelectionStore {
  path: PathBuf,
}

impl SelectionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Store under the given data directory.
  pub fn in_dir(data_dir: &Path) -> Self {
    Self::new(data_dir.join("selection.json"))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Read the current selection; a missing file is an empty selection.
  pub fn load(&self) -> Result<Selection> {
    if !self.path.exists() {
      return Ok(Selection::default());
    }
    let contents = std::fs::read_to_string(&self.path)
      .map_err(|e| eyre!("Failed to read {}: {}", self.path.display(), e))?;
    serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse {}: {}", self.path.display(), e))
  }

  fn save(&self, selection: &Selection) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create {}: {}", parent.display(), e))?;
    }
    let contents = serde_json::to_string_pretty(selection)?;
    std::fs::write(&self.path, contents)
      .map_err(|e| eyre!("Failed to write {}: {}", self.path.display(), e))
  }

  pub fn system_id(&self) -> Result<Option<SystemId>> {
    Ok(self.load()?.system_id)
  }

  pub fn system_category(&self) -> Result<Option<String>> {
    Ok(self.load()?.system_category)
  }

  pub fn set_system_id(&self, id: SystemId) -> Result<()> {
    let mut selection = self.load()?;
    selection.system_id = Some(id);
    self.save(&selection)
  }

  pub fn set_system_category(&self, category: impl Into<String>) -> Result<()> {
    let mut selection = self.load()?;
    selection.system_category = Some(category.into());
    self.save(&selection)
  }

  /// Switch to another system. Responses cached for the previous tenant
  /// are dropped.
  pub fn switch_system(
    &self,
    client: &ApiClient,
    id: SystemId,
    category: Option<String>,
  ) -> Result<()> {
    let mut selection = self.load()?;
    info!(system = %id, "switching system");
    selection.system_id = Some(id);
    if category.is_some() {
      selection.system_category = category;
    }
    self.save(&selection)?;
    client.cache().clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::ScriptedTransport;
  use serde_json::json;

  #[test]
  fn test_missing_file_is_empty_selection() {
    let dir = tempfile::tempdir().unwrap();
    let store = SelectionStore::in_dir(dir.path());
    assert_eq!(store.load().unwrap(), Selection::default());
    assert_eq!(store.system_id().unwrap(), None);
  }

  #[test]
  fn test_set_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = SelectionStore::in_dir(&dir.path().join("nested"));

    store.set_system_id(SystemId::from(5)).unwrap();
    store.set_system_category("restaurant").unwrap();

    assert_eq!(store.system_id().unwrap(), Some(SystemId::new("5")));
    assert_eq!(store.system_category().unwrap().as_deref(), Some("restaurant"));
  }

  #[test]
  fn test_file_uses_web_client_key_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = SelectionStore::in_dir(dir.path());
    store.set_system_id(SystemId::new("12")).unwrap();

    let raw: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["selectedSystemId"], json!("12"));
  }

  #[test]
  fn test_switch_system_clears_cache() {
    let dir = tempfile::tempdir().unwrap();
    let store = SelectionStore::in_dir(dir.path());
    let client = ApiClient::new(ScriptedTransport::empty());
    client.cache().store("get:/restaurant/5/orders/", json!([]));

    store
      .switch_system(&client, SystemId::new("7"), Some("supermarket".to_string()))
      .unwrap();

    assert_eq!(client.cache().status().entries, 0);
    let selection = store.load().unwrap();
    assert_eq!(selection.system_id, Some(SystemId::new("7")));
    assert_eq!(selection.system_category.as_deref(), Some("supermarket"));
  }

  #[test]
  fn test_system_id_display() {
    assert_eq!(format!("/restaurant/{}/orders/", SystemId::from(5)), "/restaurant/5/orders/");
  }
}
