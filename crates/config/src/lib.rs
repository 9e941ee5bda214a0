//! Configuration loading and validation for Loresmith.
//!
//! Loads `~/.loresmith/config.toml` with environment variable
//! overrides. A missing file means defaults, which point at a local
//! Ollama instance.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("failed to parse config at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// The root configuration structure.
///
/// Maps directly to `~/.loresmith/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Which LLM endpoint to talk to.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend name, for logs ("ollama", "openai", "openrouter", ...)
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; `LORESMITH_API_KEY` / `OPENAI_API_KEY` override this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

/// Settings fed into the reasoning loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_true")]
    pub enable_reflection: bool,

    #[serde(default)]
    pub enable_planning: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Conversation turns fed into each prompt
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

/// Settings for the built-in tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Directory of text/markdown files loaded into the document corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,

    /// Roots the file tools may touch. Empty = unrestricted.
    #[serde(default)]
    pub allowed_roots: Vec<PathBuf>,
}

fn default_backend_name() -> String {
    "ollama".into()
}
fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "qwen2.5:7b".into()
}
fn default_max_iterations() -> u32 {
    10
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}
fn default_history_turns() -> usize {
    5
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "***",
        None => "<not set>",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend", &self.backend)
            .field("agent", &self.agent)
            .field("tools", &self.tools)
            .finish()
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            temperature: default_temperature(),
            enable_reflection: true,
            enable_planning: false,
            max_tokens: None,
            history_turns: default_history_turns(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            docs_dir: None,
            allowed_roots: Vec::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            agent: AgentSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with environment
    /// overrides:
    /// - `LORESMITH_API_KEY` then `OPENAI_API_KEY` for the key
    /// - `LORESMITH_BASE_URL` for the endpoint
    /// - `LORESMITH_MODEL` for the model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.backend.api_key.is_none() {
            config.backend.api_key = std::env::var("LORESMITH_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if let Ok(base_url) = std::env::var("LORESMITH_BASE_URL") {
            config.backend.base_url = base_url;
        }
        if let Ok(model) = std::env::var("LORESMITH_MODEL") {
            config.backend.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".loresmith")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ConfigError::ValidationError(
                "agent.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// A default config TOML string for first-time setup.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_ollama() {
        let config = AppConfig::default();
        assert_eq!(config.backend.name, "ollama");
        assert!(config.backend.base_url.contains("11434"));
        assert_eq!(config.agent.max_iterations, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.backend.model, default_model());
    }

    #[test]
    fn parses_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            "[backend]\nmodel = \"llama3:8b\"\n\n[agent]\nmax_iterations = 4\n"
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.backend.model, "llama3:8b");
        assert_eq!(config.agent.max_iterations, 4);
        // Untouched sections keep defaults.
        assert!(config.agent.enable_reflection);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent]\ntemperature = 3.5\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_iterations_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[agent]\nmax_iterations = 0\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("sk-secret".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.backend.model, default_model());
    }
}
