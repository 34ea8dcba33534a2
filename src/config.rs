use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_STORE_URL: &str = "http://localhost:3001";

/// Environment variable overriding `store.url`
pub const STORE_URL_ENV: &str = "BLOGDESK_STORE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for the header (defaults to "blogdesk" if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub store: StoreConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Base URL of the record store
  #[serde(default = "default_store_url")]
  pub url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      url: default_store_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl StoreConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds before a successful result is refetched on the next subscribe
  #[serde(default = "default_stale_secs")]
  pub stale_secs: u64,
  /// Seconds an unobserved entry is kept before eviction
  #[serde(default = "default_gc_secs")]
  pub gc_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_secs: default_stale_secs(),
      gc_secs: default_gc_secs(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_secs)
  }

  pub fn gc_time(&self) -> Duration {
    Duration::from_secs(self.gc_secs)
  }
}

fn default_store_url() -> String {
  DEFAULT_STORE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_stale_secs() -> u64 {
  60
}

fn default_gc_secs() -> u64 {
  300
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./blogdesk.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/blogdesk/config.yaml
  ///
  /// Falls back to defaults when no file is found. `BLOGDESK_STORE_URL`
  /// overrides the store URL either way.
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

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var(STORE_URL_ENV) {
      config.store.url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("blogdesk.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("blogdesk").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.store.url, DEFAULT_STORE_URL);
    assert_eq!(config.store.timeout(), Duration::from_secs(10));
    assert_eq!(config.cache.stale_time(), Duration::from_secs(60));
    assert_eq!(config.cache.gc_time(), Duration::from_secs(300));
    assert!(config.title.is_none());
  }

  #[test]
  fn test_parse_partial() {
    let config = Config::parse("store:\n  url: http://example.com:8080\ncache:\n  gc_secs: 0\n")
      .unwrap();
    assert_eq!(config.store.url, "http://example.com:8080");
    assert_eq!(config.store.timeout_secs, 10);
    assert_eq!(config.cache.stale_secs, 60);
    assert_eq!(config.cache.gc_secs, 0);
  }

  #[test]
  fn test_parse_empty() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.store.url, DEFAULT_STORE_URL);
  }

  #[test]
  fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "title: My Blogs").unwrap();
    writeln!(file, "store:").unwrap();
    writeln!(file, "  timeout_secs: 3").unwrap();

    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.title.as_deref(), Some("My Blogs"));
    assert_eq!(config.store.timeout_secs, 3);
  }

  #[test]
  fn test_load_from_path_rejects_bad_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "store: [unclosed").unwrap();

    let err = Config::load_from_path(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/blogdesk.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
