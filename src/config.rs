//! Console configuration: where flows live, where plans go, how publishing treats
//! warnings, and how logs look.
//!
//! Values come from an optional JSON file and are then overridden by environment
//! variables:
//! - `URA_STORE_ROOT`: directory of the JSON flow store
//! - `URA_PLAN_DIR`: directory published plans are written to
//! - `URA_PUBLISH_POLICY`: `allow-warnings` or `reject-warnings`
//! - `URA_LOG_FORMAT`: `json`, `pretty` or `compact`
//! - `URA_LOG_LEVEL` or `RUST_LOG`: log filter string

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Whether a flow whose report holds only warnings may be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishPolicy {
    #[default]
    AllowWarnings,
    RejectWarnings,
}

impl FromStr for PublishPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "allow-warnings" | "allow" => Ok(Self::AllowWarnings),
            "reject-warnings" | "reject" => Ok(Self::RejectWarnings),
            other => Err(ConfigError::Invalid(format!(
                "unknown publish policy '{}'",
                other
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Multi-line, human-readable.
    Pretty,
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ConfigError::Invalid(format!("unknown log format '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `info` or `warn,ura=debug`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConsoleConfig {
    pub store_root: PathBuf,
    pub plan_dir: PathBuf,
    pub publish_policy: PublishPolicy,
    pub log: LogConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("flows"),
            plan_dir: PathBuf::from("plans"),
            publish_policy: PublishPolicy::default(),
            log: LogConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Reads `path` when given (defaults otherwise) and applies the process
    /// environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| env::var(key).ok())
    }

    /// Applies the `URA_*` overrides, reading variables through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("URA_STORE_ROOT") {
            self.store_root = PathBuf::from(root);
        }
        if let Some(dir) = lookup("URA_PLAN_DIR") {
            self.plan_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup("URA_PUBLISH_POLICY") {
            self.publish_policy = policy.parse()?;
        }
        if let Some(format) = lookup("URA_LOG_FORMAT") {
            self.log.format = format.parse()?;
        }
        if let Some(filter) = lookup("URA_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.log.filter = filter;
        }
        Ok(self)
    }
}
