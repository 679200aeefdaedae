//! Log sink setup for `cpc-server`.
//!
//! Events are written to `<dir>/<app_name>.log.<YYYY-MM-DD>`, one file per
//! local day. `<dir>` is `logging.dir` from the config file, else
//! `CPC_LOG_DIR`, else `~/.local/share/<app_name>`. Lines are plain text or
//! JSON objects per `logging.format`, and with `logging.stderr` set the same
//! events also go to the terminal in that format.
//!
//! Event names are dotted by origin. `server.*` covers startup and shutdown,
//! `http.server.request` is the access line for each inbound request, other
//! `http.*` events trace outbound page and API calls, `analyze.*` follows one
//! URL analysis through its stages and `llm.*` comes from the model client.
//! `RUST_LOG` overrides `logging.filter`.
//!
//! Only the first [`init_logging`] call installs anything. Later calls return
//! the same file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "CPC_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File name stem and default directory name.
    pub app_name: &'static str,
    /// Takes precedence over `CPC_LOG_DIR`.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "cpc-optimizer",
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the concrete log file path for the current day.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let resolved_dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&resolved_dir)
        .with_context(|| format!("failed to create log directory: {}", resolved_dir.display()))?;

    let log_filename = format!("{}.log", config.app_name);
    let today = Local::now().format("%Y-%m-%d").to_string();
    let full_path = resolved_dir.join(format!("{log_filename}.{today}"));

    let appender = rolling::daily(&resolved_dir, &log_filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let installed = match (config.format, config.emit_stderr) {
        (LogFormat::Text, false) => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .try_init(),
        (LogFormat::Text, true) => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Json, false) => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        (LogFormat::Json, true) => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    default_data_dir(app_name)
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(app_name)
    } else {
        PathBuf::from(".").join(app_name)
    }
}
