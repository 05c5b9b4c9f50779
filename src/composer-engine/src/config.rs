//! Composer configuration.
//!
//! Loaded from a TOML file and overridden by environment variables:
//!
//! ```toml
//! [assistant]
//! command = "claude"
//! timeout_secs = 120
//! extra_args = []
//!
//! [mentions]
//! cache_ttl_secs = 10
//! max_entries = 8000
//! max_results = 20
//!
//! [skills]
//! home_dir = "/home/me"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use composer_mentions::{CacheConfig, DEFAULT_MAX_ENTRIES, MAX_RESULTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on a single external assistant call.
pub const DEFAULT_ASSISTANT_TIMEOUT_SECS: u64 = 120;

/// Lifetime of a workspace mention index.
pub const DEFAULT_INDEX_TTL_SECS: u64 = 10;

/// Executable invoked for assistant requests.
pub const DEFAULT_ASSISTANT_COMMAND: &str = "claude";

/// Environment variable overriding `assistant.command`.
pub const ASSISTANT_COMMAND_ENV: &str = "COMPOSER_ASSISTANT_COMMAND";

/// Environment variable overriding `assistant.timeout_secs`.
pub const ASSISTANT_TIMEOUT_ENV: &str = "COMPOSER_ASSISTANT_TIMEOUT_SECS";

/// Environment variable overriding `mentions.cache_ttl_secs`.
pub const CACHE_TTL_ENV: &str = "COMPOSER_CACHE_TTL_SECS";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub assistant: AssistantConfig,
    pub mentions: MentionsConfig,
    pub skills: SkillsConfig,
}

/// External assistant invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub command: String,
    pub timeout_secs: u64,
    /// Arguments appended after the fixed invocation flags.
    pub extra_args: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_ASSISTANT_COMMAND.to_string(),
            timeout_secs: DEFAULT_ASSISTANT_TIMEOUT_SECS,
            extra_args: Vec::new(),
        }
    }
}

/// Mention index settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionsConfig {
    pub cache_ttl_secs: u64,
    pub max_entries: usize,
    pub max_results: usize,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_INDEX_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_results: MAX_RESULTS,
        }
    }
}

/// Skill discovery settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Overrides the home directory searched for global skills.
    pub home_dir: Option<PathBuf>,
}

impl ComposerConfig {
    /// Loads a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Invalid numbers are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(command) = lookup(ASSISTANT_COMMAND_ENV).filter(|v| !v.trim().is_empty()) {
            self.assistant.command = command;
        }
        if let Some(secs) = parse_secs(ASSISTANT_TIMEOUT_ENV, lookup(ASSISTANT_TIMEOUT_ENV)) {
            self.assistant.timeout_secs = secs;
        }
        if let Some(secs) = parse_secs(CACHE_TTL_ENV, lookup(CACHE_TTL_ENV)) {
            self.mentions.cache_ttl_secs = secs;
        }
    }

    pub fn assistant_timeout(&self) -> Duration {
        Duration::from_secs(self.assistant.timeout_secs)
    }

    /// Index cache settings derived from the mentions section.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.mentions.cache_ttl_secs),
            max_entries: self.mentions.max_entries,
        }
    }
}

fn parse_secs(key: &str, value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, value);
            None
        }
    }
}
