//! CLI command implementations
//!
//! `init` and `create-admin` print a single JSON object on stdout.
//! `start` blocks serving HTTP until the process is stopped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::args::Command;
use super::config::{BootstrapAdmin, Config};
use super::errors::{CliError, CliResult};
use crate::http_server::{AppState, HttpServer};
use crate::model::User;
use crate::observability::init_logging;
use crate::repository::StorageConfig;
use crate::services::{CreateUser, HbnbFacade};

/// Directory created next to the config file by `init`
const DEFAULT_DATA_DIR: &str = "hbnb-data";

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
        Command::CreateAdmin {
            config,
            email,
            password,
            first_name,
            last_name,
        } => {
            let admin = BootstrapAdmin {
                first_name,
                last_name,
                email,
                password,
            };
            create_admin(&config, admin)
        }
    }
}

fn write_json(value: Value) -> CliResult<()> {
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

/// Write a default config with durable storage and create its data directory.
///
/// Refuses to overwrite an existing config file.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = init_config(config_path)?;
    let data_dir = config
        .data_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    write_json(json!({
        "initialized": true,
        "config": config_path.display().to_string(),
        "data_dir": data_dir,
    }))
}

fn init_config(config_path: &Path) -> CliResult<Config> {
    if config_path.exists() {
        return Err(CliError::already_initialized(config_path));
    }

    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let data_dir: PathBuf = base.join(DEFAULT_DATA_DIR);

    fs::create_dir_all(data_dir.join("tables")).map_err(|e| {
        CliError::io_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;

    let config = Config::initial(data_dir);
    fs::write(config_path, serde_json::to_string_pretty(&config)?).map_err(|e| {
        CliError::io_error(format!("Failed to write {}: {}", config_path.display(), e))
    })?;

    Ok(config)
}

/// Open the repositories named by the config
fn open_facade(config: &Config) -> CliResult<HbnbFacade> {
    HbnbFacade::new(&config.storage)
        .map_err(|e| CliError::boot_failed(format!("Failed to open storage: {}", e)))
}

/// Create the configured admin unless a user with that email exists.
///
/// Returns the created user, or `None` when the email was already taken.
pub fn seed_admin(facade: &HbnbFacade, admin: &BootstrapAdmin) -> CliResult<Option<User>> {
    if facade.get_user_by_email(&admin.email)?.is_some() {
        return Ok(None);
    }
    let user = facade.create_user(CreateUser {
        first_name: admin.first_name.clone(),
        last_name: admin.last_name.clone(),
        email: admin.email.clone(),
        password: admin.password.clone(),
        is_admin: true,
    })?;
    Ok(Some(user))
}

/// Boot storage, seed the bootstrap admin and serve the API.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    init_logging(config.log_format);

    if config.uses_default_secret() {
        warn!("jwt.secret is the built-in placeholder; set HBNB_JWT_SECRET in production");
    }

    let facade = Arc::new(open_facade(&config)?);
    match &config.storage {
        StorageConfig::Memory => info!("using in-memory storage; data is lost on exit"),
        StorageConfig::File { data_dir } => {
            info!(data_dir = %data_dir.display(), "using file storage")
        }
    }

    if let Some(admin) = &config.bootstrap_admin {
        if let Some(user) = seed_admin(&facade, admin)? {
            info!(user_id = %user.record.id, email = %user.email, "bootstrap admin created");
        }
    }

    let state = AppState::new(facade, config.jwt.clone());
    let server = HttpServer::new(config.http_config(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Create an admin directly in the durable store.
pub fn create_admin(config_path: &Path, admin: BootstrapAdmin) -> CliResult<()> {
    let config = Config::load(config_path)?;
    if config.data_path().is_none() {
        return Err(CliError::config_error(
            "create-admin needs file storage; an in-memory admin would be lost on exit",
        ));
    }

    let facade = open_facade(&config)?;
    let user = seed_admin(&facade, &admin)?.ok_or_else(|| {
        CliError::from(crate::services::FacadeError::validation(
            "Email already registered",
        ))
    })?;

    write_json(json!({ "created": user.view() }))
}
