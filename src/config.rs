//! Application-level configuration loading: admin secret, question timing,
//! and SSE channel capacities.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIVE_QUIZ_BACK_CONFIG_PATH";
/// Environment variable that overrides the configured admin secret.
const ADMIN_SECRET_ENV: &str = "LIVE_QUIZ_BACK_ADMIN_SECRET";

const DEFAULT_ADMIN_SECRET: &str = "change-me";
const DEFAULT_QUESTION_TIME_LIMIT_SECS: u64 = 20;
const DEFAULT_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    admin_secret: String,
    question_time_limit_secs: u64,
    sse_capacity: usize,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to baked-in defaults.
    ///
    /// The admin secret can always be overridden through the environment so
    /// deployments never have to write it to disk.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Ok(secret) = env::var(ADMIN_SECRET_ENV)
            && !secret.is_empty()
        {
            config.admin_secret = secret;
        }

        if config.admin_secret == DEFAULT_ADMIN_SECRET {
            warn!("admin secret left at its default value; set {ADMIN_SECRET_ENV}");
        }

        config
    }

    /// Shared secret admin clients must present.
    pub fn admin_secret(&self) -> &str {
        &self.admin_secret
    }

    /// Seconds a participant has to answer a released question.
    pub fn question_time_limit_secs(&self) -> u64 {
        self.question_time_limit_secs
    }

    /// Capacity of the SSE broadcast channels.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            question_time_limit_secs: DEFAULT_QUESTION_TIME_LIMIT_SECS,
            sse_capacity: DEFAULT_SSE_CAPACITY,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    admin_secret: Option<String>,
    question_time_limit_secs: Option<u64>,
    sse_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            admin_secret: raw.admin_secret.unwrap_or(defaults.admin_secret),
            question_time_limit_secs: raw
                .question_time_limit_secs
                .unwrap_or(defaults.question_time_limit_secs),
            sse_capacity: raw.sse_capacity.unwrap_or(defaults.sse_capacity),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
