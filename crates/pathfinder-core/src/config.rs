//! Pathfinder configuration
//!
//! Loaded from TOML; every section and key is optional. Environment
//! variables override the file for deploy-time settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `store.path`
pub const ENV_STORE_PATH: &str = "PATHFINDER_STORE_PATH";
/// Overrides `llm.base_url`
pub const ENV_LLM_BASE_URL: &str = "PATHFINDER_LLM_BASE_URL";
/// Overrides `llm.model`
pub const ENV_LLM_MODEL: &str = "PATHFINDER_LLM_MODEL";
/// Overrides `logging.filter`
pub const ENV_LOG: &str = "PATHFINDER_LOG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// Dotted key
        key: &'static str,
        /// What is wrong
        message: String,
    },
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Pipeline tuning
    pub pipeline: PipelineConfig,
    /// Store backend
    pub store: StoreConfig,
    /// Generative service endpoint
    pub llm: LlmConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl PathfinderConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `PATHFINDER_*` environment overrides
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (blank values are ignored)
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_STORE_PATH) {
            self.store.path = PathBuf::from(path);
        }
        if let Some(url) = get(ENV_LLM_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = model;
        }
        if let Some(filter) = get(ENV_LOG) {
            self.logging.filter = filter;
        }
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad key
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "llm.timeout_secs",
                message: "must be at least 1".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid {
                key: "llm.temperature",
                message: format!("{} is outside 0.0..=2.0", self.llm.temperature),
            });
        }
        Ok(())
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Read-modify-write attempts for list and slot writers
    pub max_merge_attempts: usize,
    /// Ideas kept per generation
    pub max_ideas: usize,
    /// Ideas below which a warning is logged
    pub min_ideas: usize,
}

impl PipelineConfig {
    /// With merge attempts
    #[inline]
    #[must_use]
    pub fn with_max_merge_attempts(mut self, attempts: usize) -> Self {
        self.max_merge_attempts = attempts;
        self
    }

    /// With idea bounds
    #[inline]
    #[must_use]
    pub fn with_idea_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_ideas = min;
        self.max_ideas = max;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_merge_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "pipeline.max_merge_attempts",
                message: "must be at least 1".into(),
            });
        }
        if self.max_ideas == 0 {
            return Err(ConfigError::Invalid {
                key: "pipeline.max_ideas",
                message: "must be at least 1".into(),
            });
        }
        if self.min_ideas > self.max_ideas {
            return Err(ConfigError::Invalid {
                key: "pipeline.min_ideas",
                message: format!("{} exceeds max_ideas {}", self.min_ideas, self.max_ideas),
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_merge_attempts: 3,
            max_ideas: 5,
            min_ideas: 3,
        }
    }
}

/// Store backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory, lost on exit
    Memory,
    /// JSON documents under `path`
    #[default]
    File,
}

/// Store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend
    pub backend: StoreBackend,
    /// Root directory of the file backend
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: PathBuf::from("./pathfinder-data"),
        }
    }
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL, with or without a trailing `/v1`
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "PATHFINDER_API_KEY".into(),
            timeout_secs: 60,
            temperature: 0.7,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub filter: String,
    /// JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}
