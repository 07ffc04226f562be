use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Route the client is sent to when the session is missing.
pub const DEFAULT_LOGIN_ROUTE: &str = "/ownerLogin";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  /// Route used for the session-expired redirect
  pub login_route: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api: ApiConfig::default(),
      cache: CacheConfig::default(),
      login_route: DEFAULT_LOGIN_ROUTE.to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL all API paths are resolved against
  pub base_url: String,
  /// Anti-forgery token sent as `X-CSRFToken` on every request
  pub csrf_token: Option<String>,
  /// Request timeout; unset means no client-side deadline
  pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      csrf_token: None,
      timeout_secs: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// Seconds before a cached GET response is considered stale
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      stale_secs: 300,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./tillpoint.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/tillpoint/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("tillpoint.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("tillpoint").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not a mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Anti-forgery token: `TILLPOINT_CSRF_TOKEN` wins over the config file.
  pub fn csrf_token(&self) -> Option<String> {
    std::env::var("TILLPOINT_CSRF_TOKEN")
      .ok()
      .filter(|token| !token.is_empty())
      .or_else(|| self.api.csrf_token.clone())
  }

  /// Directory for persistent client state (tenant selection, logs).
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("tillpoint"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
    assert!(config.cache.enabled);
    assert_eq!(config.cache.stale_secs, 300);
    assert_eq!(config.login_route, "/ownerLogin");
  }

  #[test]
  fn test_parse_partial_file_keeps_defaults() {
    let config = Config::parse(
      "api:\n  base_url: https://pos.example.com/api\n  csrf_token: abc\ncache:\n  stale_secs: 60\n",
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://pos.example.com/api");
    assert_eq!(config.api.csrf_token.as_deref(), Some("abc"));
    assert_eq!(config.api.timeout_secs, None);
    assert_eq!(config.cache.stale_secs, 60);
    assert!(config.cache.enabled);
    assert_eq!(config.login_route, "/ownerLogin");
  }

  #[test]
  fn test_parse_empty_file() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000/api");
  }

  #[test]
  fn test_load_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "login_route: /login").unwrap();
    writeln!(file, "cache:\n  enabled: false").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.login_route, "/login");
    assert!(!config.cache.enabled);
  }

  #[test]
  fn test_load_missing_explicit_path_fails() {
    let err = Config::load(Some(Path::new("/nonexistent/tillpoint.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_invalid_yaml_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache: [not, a, mapping]").unwrap();
    assert!(Config::load(Some(file.path())).is_err());
  }
}
