//! Configuration loading, validation, and management for Solace.
//!
//! Loads configuration from `solace.toml` (or a path given on the
//! command line) with environment variable overrides, and validates
//! all settings at startup. Every tunable of the turn pipeline lives
//! here: stage timeouts, cache TTLs, memory caps and retention
//! windows, and the language-model backend settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure. Maps directly to `solace.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Language-model backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Stage timeouts and pipeline limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Cache TTLs
    #[serde(default)]
    pub cache: CacheConfig,

    /// Context memory caps and retention windows
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Crisis guardrail settings
    #[serde(default)]
    pub guardrail: GuardrailConfig,
}

/// Which language-model backend to run against.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// "openai_compat" or "scripted" (offline)
    #[serde(default = "default_backend_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for generation prompts. Classification and critic
    /// prompts always run at low temperature regardless.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_backend_kind() -> String {
    "openai_compat".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Per-stage timeouts (milliseconds) and request limits.
///
/// Total turn latency is bounded by the sum of the timeouts of the
/// stages actually invoked on a branch; there are no pipeline-level
/// retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_crisis_model_check_ms")]
    pub crisis_model_check_ms: u64,

    #[serde(default = "default_classify_ms")]
    pub classify_ms: u64,

    #[serde(default = "default_tool_ms")]
    pub tool_ms: u64,

    #[serde(default = "default_compose_ms")]
    pub compose_ms: u64,

    #[serde(default = "default_critique_ms")]
    pub critique_ms: u64,

    /// Messages longer than this are rejected as malformed input.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Fast path applies to quick_tip intents above this confidence.
    #[serde(default = "default_fastpath_confidence")]
    pub fastpath_confidence: f32,
}

fn default_crisis_model_check_ms() -> u64 {
    1_500
}
fn default_classify_ms() -> u64 {
    2_000
}
fn default_tool_ms() -> u64 {
    1_500
}
fn default_compose_ms() -> u64 {
    4_000
}
fn default_critique_ms() -> u64 {
    2_500
}
fn default_max_message_chars() -> usize {
    4_000
}
fn default_fastpath_confidence() -> f32 {
    0.7
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crisis_model_check_ms: default_crisis_model_check_ms(),
            classify_ms: default_classify_ms(),
            tool_ms: default_tool_ms(),
            compose_ms: default_compose_ms(),
            critique_ms: default_critique_ms(),
            max_message_chars: default_max_message_chars(),
            fastpath_confidence: default_fastpath_confidence(),
        }
    }
}

impl PipelineConfig {
    pub fn crisis_model_check_timeout(&self) -> Duration {
        Duration::from_millis(self.crisis_model_check_ms)
    }
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_ms)
    }
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_ms)
    }
    pub fn compose_timeout(&self) -> Duration {
        Duration::from_millis(self.compose_ms)
    }
    pub fn critique_timeout(&self) -> Duration {
        Duration::from_millis(self.critique_ms)
    }
}

/// Cache TTLs (seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Compiled prompt templates. Eager sweeper runs on this cache.
    #[serde(default = "default_template_ttl_secs")]
    pub template_ttl_secs: u64,

    /// Full generated responses.
    #[serde(default = "default_response_ttl_secs")]
    pub response_ttl_secs: u64,

    /// Intent classifications.
    #[serde(default = "default_intent_ttl_secs")]
    pub intent_ttl_secs: u64,

    /// How often the template-cache sweeper wakes up.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_template_ttl_secs() -> u64 {
    86_400
}
fn default_response_ttl_secs() -> u64 {
    300
}
fn default_intent_ttl_secs() -> u64 {
    120
}
fn default_sweep_interval_secs() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            template_ttl_secs: default_template_ttl_secs(),
            response_ttl_secs: default_response_ttl_secs(),
            intent_ttl_secs: default_intent_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheConfig {
    pub fn template_ttl(&self) -> Duration {
        Duration::from_secs(self.template_ttl_secs)
    }
    pub fn response_ttl(&self) -> Duration {
        Duration::from_secs(self.response_ttl_secs)
    }
    pub fn intent_ttl(&self) -> Duration {
        Duration::from_secs(self.intent_ttl_secs)
    }
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Context memory caps and retention windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Per-user turn log cap; oldest turns evicted FIFO.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// General history window for summary recomputation.
    #[serde(default = "default_context_retention_days")]
    pub context_retention_days: i64,

    /// Crisis entries are retained longer than general history.
    #[serde(default = "default_crisis_retention_days")]
    pub crisis_retention_days: i64,

    /// A cached summary older than this is recomputed on read.
    #[serde(default = "default_summary_staleness_secs")]
    pub summary_staleness_secs: u64,
}

fn default_max_turns() -> usize {
    50
}
fn default_context_retention_days() -> i64 {
    30
}
fn default_crisis_retention_days() -> i64 {
    90
}
fn default_summary_staleness_secs() -> u64 {
    3_600
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_retention_days: default_context_retention_days(),
            crisis_retention_days: default_crisis_retention_days(),
            summary_staleness_secs: default_summary_staleness_secs(),
        }
    }
}

/// Crisis guardrail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Whether the optional model-based check runs at all.
    #[serde(default = "default_true")]
    pub model_check_enabled: bool,

    /// Helpline text per language code, overriding the built-in
    /// directory (e.g. `en = "Call or text 988"`).
    #[serde(default)]
    pub helpline_overrides: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            model_check_enabled: true,
            helpline_overrides: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with the standard precedence:
    /// 1. `solace.toml` in the working directory (if present)
    /// 2. Environment overrides: `SOLACE_API_KEY`, `SOLACE_MODEL`,
    ///    `SOLACE_BACKEND`, `SOLACE_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("solace.toml"))?;

        if config.backend.api_key.is_none() {
            config.backend.api_key = std::env::var("SOLACE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if let Ok(model) = std::env::var("SOLACE_MODEL") {
            config.backend.model = model;
        }
        if let Ok(kind) = std::env::var("SOLACE_BACKEND") {
            config.backend.kind = kind;
        }
        if let Ok(url) = std::env::var("SOLACE_BASE_URL") {
            config.backend.base_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path. A missing file is
    /// not an error; defaults apply.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ConfigError::Validation(
                "backend.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.fastpath_confidence) {
            return Err(ConfigError::Validation(
                "pipeline.fastpath_confidence must be between 0.0 and 1.0".into(),
            ));
        }
        if self.memory.max_turns == 0 {
            return Err(ConfigError::Validation("memory.max_turns must be at least 1".into()));
        }
        if self.memory.crisis_retention_days < self.memory.context_retention_days {
            return Err(ConfigError::Validation(
                "memory.crisis_retention_days must be >= context_retention_days".into(),
            ));
        }
        for ms in [
            self.pipeline.classify_ms,
            self.pipeline.tool_ms,
            self.pipeline.compose_ms,
            self.pipeline.critique_ms,
        ] {
            if ms == 0 {
                return Err(ConfigError::Validation("pipeline timeouts must be non-zero".into()));
            }
        }
        Ok(())
    }

    /// Generate a default config TOML string (for onboarding).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend", &self.backend)
            .field("pipeline", &self.pipeline)
            .field("cache", &self.cache)
            .field("memory", &self.memory)
            .field("guardrail", &self.guardrail)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.memory.max_turns, 50);
        assert_eq!(config.cache.intent_ttl_secs, 120);
        assert_eq!(config.memory.crisis_retention_days, 90);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pipeline.classify_ms, config.pipeline.classify_ms);
        assert_eq!(parsed.backend.model, config.backend.model);
    }

    #[test]
    fn partial_file_gets_defaults() {
        let toml_str = r#"
            [memory]
            max_turns = 10
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.max_turns, 10);
        assert_eq!(config.memory.context_retention_days, 30);
        assert_eq!(config.cache.template_ttl_secs, 86_400);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/solace.toml")).unwrap();
        assert_eq!(config.pipeline.max_message_chars, 4_000);
    }

    #[test]
    fn rejects_inverted_retention_windows() {
        let mut config = AppConfig::default();
        config.memory.crisis_retention_days = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.pipeline.classify_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "[backend]\nkind = \"scripted\"\n[pipeline]\nclassify_ms = 750"
        )
        .unwrap();
        let config = AppConfig::load_from(f.path()).unwrap();
        assert_eq!(config.backend.kind, "scripted");
        assert_eq!(config.pipeline.classify_ms, 750);
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
