//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources are merged in order: an optional YAML file, inline YAML (tests),
//! then `CPC__SECTION__KEY` environment variables. String values may
//! reference the environment as `${VAR}`; references are expanded
//! recursively (bounded depth) after merging. The LLM credential defaults to
//! `${OPENAI_API_KEY}` so it is always supplied out of band.
//!
//! ```yaml
//! server:  { host: 127.0.0.1, port: 8080 }
//! llm:     { provider: openai, model: gpt-4o-mini, auth_token: "${OPENAI_API_KEY}" }
//! fetch:   { timeout_secs: 15, max_text_chars: 8000 }
//! logging: { format: json, stderr: true, filter: "info,cpc_http=debug" }
//! ```
use config::{Config, ConfigError, Environment, File};
use cpc_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CPC";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; AdSenseCPCOptimizer/1.0)";
pub const DEFAULT_MAX_TEXT_CHARS: usize = 8000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Openai,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub auth_token: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Openai,
            model: "gpt-4o-mini".into(),
            auth_token: "${OPENAI_API_KEY}".into(),
            endpoint: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_text_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: 15,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

impl AppConfig {
    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let token = self.llm.auth_token.trim();
        if token.is_empty() {
            return Err(ConfigError::Message("llm.auth_token is empty".into()));
        }
        if token.contains("${") {
            return Err(ConfigError::Message(format!(
                "llm.auth_token references an unset variable: {token}"
            )));
        }
        if self.fetch.max_text_chars == 0 {
            return Err(ConfigError::Message(
                "fetch.max_text_chars must be positive".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(ConfigError::Message("timeouts must be positive".into()));
        }
        Ok(())
    }
}

fn expand_env_str(s: &str) -> String {
    let mut cur = s.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let expanded = match shellexpand::env(&cur) {
            Ok(cow) => cow.into_owned(),
            Err(_) => cur.clone(),
        };
        if expanded == cur {
            break;
        }
        cur = expanded;
    }
    cur
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                *s = expand_env_str(s);
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct AppConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for AppConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigLoader {
    /// Start with no file sources; `CPC__` env overrides are always applied last.
    ///
    /// ```
    /// use cpc_config::AppConfigLoader;
    ///
    /// let config = AppConfigLoader::new()
    ///     .with_yaml_str("server:\n  port: 9000\nllm:\n  auth_token: sk-test")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.port, 9000);
    /// assert_eq!(config.llm.model, "gpt-4o-mini");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so deployments can rely on env vars alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use cpc_config::AppConfigLoader;
    ///
    /// let config = AppConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   model: "gpt-4o"
    ///   auth_token: "${HOME}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.model, "gpt-4o");
    /// assert!(!config.llm.auth_token.contains("${"));
    /// ```
    pub fn load(self) -> Result<AppConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: AppConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        // Serde defaults are applied after the value pass, so expand them here.
        typed.llm.auth_token = expand_env_str(&typed.llm.auth_token);

        Ok(typed)
    }
}
