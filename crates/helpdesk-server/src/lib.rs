//! Process wiring for the help-desk server: configuration and the top-level
//! router.

use std::path::{Path, PathBuf};

use axum::Router;
use config::ConfigError;
use helpdesk_api::{SharedService, api_router};
use helpdesk_core::{clock::Clock, store::DeskStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HELPDESK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("helpdesk.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Load configuration from an optional TOML file at `path`, overridden by
/// the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
  load_from(config::File::from(path).required(false))
}

fn load_from<F>(file: F) -> Result<ServerConfig, ConfigError>
where
  F: config::Source + Send + Sync + 'static,
{
  config::Config::builder()
    .add_source(file)
    .add_source(config::Environment::with_prefix("HELPDESK"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S, C>(service: SharedService<S, C>) -> Router
where
  S: DeskStore + 'static,
  C: Clock + 'static,
  helpdesk_core::Error: From<S::Error>,
{
  api_router(service).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use helpdesk_core::service::HierarchyService;
  use helpdesk_store_sqlite::SqliteStore;
  use tower::ServiceExt;

  use super::*;

  fn from_toml(toml: &'static str) -> ServerConfig {
    load_from(config::File::from_str(toml, FileFormat::Toml)).unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    assert_eq!(from_toml(""), ServerConfig::default());
    assert_eq!(ServerConfig::default().address(), "127.0.0.1:8080");
  }

  #[test]
  fn file_overrides_defaults() {
    let cfg = from_toml("port = 9000\nstore_path = \"/var/lib/helpdesk.db\"");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/helpdesk.db"));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = load_config(Path::new("/nonexistent/helpdesk.toml")).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("helpdesk.db"));
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(expand_tilde(Path::new("~/desk.db")), PathBuf::from(home).join("desk.db"));
    assert_eq!(expand_tilde(Path::new("data/~/desk.db")), PathBuf::from("data/~/desk.db"));
  }

  #[tokio::test]
  async fn app_serves_the_api() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = app(Arc::new(HierarchyService::new(Arc::new(store))));

    let req = Request::builder().uri("/roles").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
