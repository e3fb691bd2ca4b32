//! Runtime server configuration.

use std::path::PathBuf;

use catalog_core::store::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page};
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml` and `CATALOG_*`
/// environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  /// SQLite database file. A leading `~/` is expanded by the binary.
  pub database_path:     PathBuf,
  /// `limit` used when a list request does not supply one.
  pub default_page_size: u64,
  /// Upper bound on any requested `limit`.
  pub max_page_size:     u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              8000,
      database_path:     PathBuf::from("catalog.db"),
      default_page_size: DEFAULT_PAGE_SIZE,
      max_page_size:     MAX_PAGE_SIZE,
    }
  }
}

impl ServerConfig {
  /// Resolve optional `skip`/`limit` query values into a clamped [`Page`].
  pub fn page(&self, skip: Option<u64>, limit: Option<u64>) -> Page {
    Page::new(skip.unwrap_or(0), limit.unwrap_or(self.default_page_size))
      .clamped(self.max_page_size)
  }
}
