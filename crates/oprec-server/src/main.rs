//! oprec server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the recruitment API over HTTP.
//!
//! # First run
//!
//! Seed the hierarchy catalog (and the admin account, when `admin_email`
//! and `admin_password` are configured):
//!
//! ```
//! cargo run -p oprec-server --bin server -- --seed
//! ```
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string for manual database edits:
//!
//! ```
//! cargo run -p oprec-server --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use oprec_core::{
  applicant::{Registration, Role},
  store::RecruitStore,
};
use oprec_server::{
  AppState, ServerConfig,
  auth::AuthConfig,
  files::DiskFileStore,
  gateway::SnapGateway,
};
use oprec_store_sqlite::{SqliteStore, seed::seed_hierarchy};
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Recruitment backend server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Seed the hierarchy catalog (and admin account) and exit.
  #[arg(long)]
  seed: bool,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("OPREC"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in filesystem paths.
  let store_path = expand_tilde(&server_cfg.store_path);
  let upload_dir = expand_tilde(&server_cfg.upload_dir);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.seed {
    seed_hierarchy(&store).await.context("failed to seed hierarchy")?;
    seed_admin(&store, &server_cfg).await?;
    tracing::info!("seeding complete");
    return Ok(());
  }

  tokio::fs::create_dir_all(&upload_dir)
    .await
    .with_context(|| format!("failed to create upload dir {upload_dir:?}"))?;

  // Build application state.
  let state = AppState {
    store:   Arc::new(store),
    gateway: Arc::new(SnapGateway::new(
      server_cfg.gateway_base_url.clone(),
      server_cfg.gateway_server_key.clone(),
    )),
    files:   Arc::new(DiskFileStore::new(upload_dir)),
    auth:    Arc::new(AuthConfig {
      token_secret: server_cfg.token_secret.clone(),
      token_ttl:    chrono::Duration::hours(server_cfg.token_ttl_hours),
    }),
    config:  Arc::new(server_cfg.clone()),
  };

  let app = oprec_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Create the configured admin account if it does not exist yet.
async fn seed_admin(
  store: &SqliteStore,
  cfg:   &ServerConfig,
) -> anyhow::Result<()> {
  let (Some(email), Some(password)) =
    (cfg.admin_email.as_deref(), cfg.admin_password.as_deref())
  else {
    return Ok(());
  };

  if store.applicant_by_email(email).await?.is_some() {
    tracing::info!(email, "admin account already exists");
    return Ok(());
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();

  store
    .register_applicant(Registration {
      email: email.to_string(),
      password_hash,
      role: Role::Admin,
      full_name: "Administrator".to_string(),
      nim: "ADMIN-0001".to_string(),
    })
    .await?;
  tracing::info!(email, "admin account created");
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
