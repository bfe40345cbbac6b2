//! Runtime configuration, layered from an optional TOML file and `BULLETIN_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 7001 }

fn default_store_path() -> PathBuf { PathBuf::from("bulletin.db") }

impl ServerConfig {
  /// Read `path` if it exists, then apply environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    let settings = builder
      .add_source(Environment::with_prefix("BULLETIN"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
