//! Clara console - binary entry point.
//!
//! ```text
//! main() -> init_tracing() -> load_config() -> ApiClient -> Session::run()
//!                                                              |
//!                                                              v
//!                                          greeting, onboarding dialogue, screens
//! ```
//!
//! Logs go to a file so the console stays readable.

mod location;
mod session;

use std::{
    fs::{self, File, OpenOptions},
    io::{self, stdout},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Result;
use tokio::io::{BufReader, stdin};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use clara_api::{ApiClient, ClientOptions};
use clara_config::{ClaraConfig, ResolvedConfig};

use crate::session::Session;

const LOG_FILE_NAME: &str = "clara.log";

struct LogTarget {
    path: PathBuf,
    file: File,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut failures = Vec::new();
    let Some(target) = open_log_file(&mut failures) else {
        // Stdout belongs to the session.
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(target.file)))
        .with(env_filter)
        .init();

    tracing::info!(path = %target.path.display(), "Logging initialized");
    for failure in failures {
        tracing::warn!("Skipped log location {failure}");
    }
}

/// First writable log location. Locations that fail are recorded in `failures`.
fn open_log_file(failures: &mut Vec<String>) -> Option<LogTarget> {
    log_dirs().into_iter().find_map(|dir| {
        let path = dir.join(LOG_FILE_NAME);
        match append_to(&path) {
            Ok(file) => Some(LogTarget { path, file }),
            Err(e) => {
                failures.push(format!("{}: {e}", path.display()));
                None
            }
        }
    })
}

fn append_to(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `logs/` beside the config file, then `./.clara/logs`.
fn log_dirs() -> Vec<PathBuf> {
    let beside_config = ClaraConfig::path()
        .and_then(|path| path.parent().map(|dir| dir.join("logs")));
    beside_config
        .into_iter()
        .chain([PathBuf::from(".clara").join("logs")])
        .collect()
}

fn load_config() -> Result<ResolvedConfig> {
    let config = match ClaraConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            ClaraConfig::default()
        }
    };

    match config.resolved() {
        Ok(resolved) => Ok(resolved),
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            Ok(ClaraConfig::default().resolved()?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config()?;
    let client = ApiClient::new(
        &config.api_url,
        ClientOptions {
            request_timeout: Some(config.request_timeout),
            ..ClientOptions::default()
        },
    )?;
    tracing::info!(api_url = %client.base_url(), "Starting Clara");

    let mut session = Session::new(BufReader::new(stdin()), stdout(), config, client);
    session.run().await
}
