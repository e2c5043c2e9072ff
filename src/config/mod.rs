//! Configuration system (layered: defaults > config file > env).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentryError, Result};

/// Default bound on generate/tool rounds per invocation.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

const ENV_MAX_ITERATIONS: &str = "AGENTRY_MAX_ITERATIONS";
const ENV_STREAMABLE: &str = "AGENTRY_STREAMABLE";
const ENV_RESUMABLE: &str = "AGENTRY_RESUMABLE";
const ENV_RETRY_MAX_ATTEMPTS: &str = "AGENTRY_RETRY_MAX_ATTEMPTS";

/// Engine defaults.
///
/// Resolution order, lowest to highest precedence:
/// 1. Built-in defaults
/// 2. `~/.agentry/config.toml` (or an explicit file)
/// 3. `AGENTRY_*` environment variables (a `.env` file is loaded if present)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentryConfig {
    pub max_iterations: usize,
    /// Whether the runner's streaming entry point asks the provider for chunks.
    pub streamable: bool,
    /// Whether runner-built invocations opt into resumability.
    pub resumable: bool,
    pub retry: RetrySettings,
}

impl Default for AgentryConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            streamable: true,
            resumable: false,
            retry: RetrySettings::default(),
        }
    }
}

/// Settings for the retry middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl AgentryConfig {
    /// Parse TOML configuration.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| AgentryError::Configuration(format!("invalid config: {e}")))?;
        config.validate()
    }

    /// Load a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AgentryError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Full layered load: default file (if it exists), then environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// `~/.agentry/config.toml`, when a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".agentry").join("config.toml"))
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ITERATIONS) {
            self.max_iterations = parse_env(ENV_MAX_ITERATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STREAMABLE) {
            self.streamable = parse_bool(ENV_STREAMABLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RESUMABLE) {
            self.resumable = parse_bool(ENV_RESUMABLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RETRY_MAX_ATTEMPTS) {
            self.retry.max_attempts = parse_env(ENV_RETRY_MAX_ATTEMPTS, &raw)?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.max_iterations == 0 {
            return Err(AgentryError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AgentryError::Configuration(format!("{key}: cannot parse '{raw}'")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentryError::Configuration(format!(
            "{key}: expected a boolean, got '{raw}'"
        ))),
    }
}
