//! Bulletin server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP. Account bootstrap commands work
//! directly on the store.
//!
//! # Creating the first admin
//!
//! ```text
//! cargo run -p bulletin-server -- add-account admin_user --role admin
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use bulletin_api::{Backend, auth::hash_password};
use bulletin_core::{
  ModerationEngine,
  account::{NewAccount, Role},
  memory::MemoryStore,
  store::AccountDirectory,
};
use bulletin_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Bulletin moderation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve {
    /// Keep everything in memory instead of opening `store_path`.
    #[arg(long)]
    in_memory: bool,
  },
  /// Create an account; the password is read from stdin.
  AddAccount {
    username: String,
    #[arg(long, default_value_t = Role::User)]
    role:     Role,
  },
  /// Stop an account from authenticating. Its content is kept.
  DeactivateAccount { username: String },
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  match cli.command.unwrap_or(Command::Serve { in_memory: false }) {
    Command::Serve { in_memory: true } => {
      tracing::warn!("serving from an in-memory store; nothing will be persisted");
      serve(MemoryStore::new(), &server_cfg).await
    }
    Command::Serve { in_memory: false } => serve(open_store(&server_cfg).await?, &server_cfg).await,
    Command::AddAccount { username, role } => {
      let store = open_store(&server_cfg).await?;
      let engine = ModerationEngine::new(store.clone(), store);
      let hash = hash_password(&read_password()?)?;
      let account = engine
        .register(NewAccount::new(username, hash, role))
        .await
        .context("failed to create account")?;
      tracing::info!(account_id = %account.account_id, role = %account.role, "account created");
      println!("{}", account.account_id);
      Ok(())
    }
    Command::DeactivateAccount { username } => {
      let store = open_store(&server_cfg).await?;
      let stored = store
        .find_by_username(&username)
        .await
        .context("failed to look up account")?
        .with_context(|| format!("no account named {username:?}"))?;
      let engine = ModerationEngine::new(store.clone(), store);
      engine
        .set_account_active(stored.account.account_id, false)
        .await
        .context("failed to deactivate account")?;
      tracing::info!(account_id = %stored.account.account_id, "account deactivated");
      Ok(())
    }
    Command::HashPassword => {
      println!("{}", hash_password(&read_password()?)?);
      Ok(())
    }
  }
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = cfg.resolved_store_path();
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve<S: Backend + Clone>(store: S, cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = bulletin_api::api_router(store).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
