//! Configuration loading, validation, and management for planexec.
//!
//! Loads configuration from `~/.planexec/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Keywords that mark a task as creating or editing the draft document.
pub const DEFAULT_DOCUMENT_KEYWORDS: &[&str] = &[
    "draft",
    "report",
    "summary",
    "document",
    "review",
    "refine",
    "generate",
    "write",
    "add to",
    "organize",
    "create",
    "compile",
    "structure",
];

/// The root configuration structure.
///
/// Maps directly to `~/.planexec/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model (or Azure deployment) for every role
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature for every role
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// HTTP timeout for a single provider call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Planner role overrides
    #[serde(default)]
    pub planner: RoleConfig,

    /// Executor role overrides and ReAct limits
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Replanner role overrides
    #[serde(default)]
    pub replanner: RoleConfig,

    /// Control-loop settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Document task classification
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Search tool settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("planner", &self.planner)
            .field("executor", &self.executor)
            .field("replanner", &self.replanner)
            .field("session", &self.session)
            .field("classifier", &self.classifier)
            .field("search", &self.search)
            .field("providers", &self.providers)
            .finish()
    }
}

/// Which of the three model-backed roles a setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Planner,
    Executor,
    Replanner,
}

/// Per-role model and temperature overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Reason/act/observe iterations allowed per task
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    10
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            max_iterations: default_max_iterations(),
        }
    }
}

/// What the session hands back once it terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerPolicy {
    /// The replanner's final response
    #[default]
    Response,
    /// The accumulated draft, falling back to the response when no draft exists
    Draft,
}

impl std::str::FromStr for AnswerPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "response" => Ok(Self::Response),
            "draft" => Ok(Self::Draft),
            other => Err(ConfigError::ValidationError(format!(
                "unknown answer policy '{other}' (expected 'response' or 'draft')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Executor/replanner rounds before the session is aborted (0 = unlimited)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    #[serde(default)]
    pub answer: AnswerPolicy,
}

fn default_max_rounds() -> u32 {
    12
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            answer: AnswerPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Case-insensitive substrings that mark a document-bearing task
    #[serde(default = "default_document_keywords")]
    pub document_keywords: Vec<String>,
}

fn default_document_keywords() -> Vec<String> {
    DEFAULT_DOCUMENT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            document_keywords: default_document_keywords(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackendKind {
    /// Tavily search API
    #[default]
    Tavily,
    /// Deterministic canned results, no network
    Offline,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub backend: SearchBackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackendKind::default(),
            api_key: None,
            max_results: default_max_results(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("backend", &self.backend)
            .field("api_key", &redact(&self.api_key))
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Azure OpenAI `api-version` query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default location, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        config.validate()?;
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

    /// Apply environment overrides through `lookup` (injected so tests
    /// don't touch the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("PLANEXEC_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("AZURE_OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("PLANEXEC_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("PLANEXEC_MODEL") {
            self.default_model = model;
        }

        // Azure OpenAI: endpoint, api version and per-role deployments.
        if let Some(endpoint) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.providers.entry("azure".into()).or_default().api_url = Some(endpoint);
        }
        if let Some(version) = lookup("AZURE_OPENAI_API_VERSION") {
            self.providers.entry("azure".into()).or_default().api_version = Some(version);
        }
        if let Some(key) = lookup("AZURE_OPENAI_API_KEY") {
            let azure = self.providers.entry("azure".into()).or_default();
            if azure.api_key.is_none() {
                azure.api_key = Some(key);
            }
        }
        if let Some(deployment) = lookup("AZURE_OPENAI_DEPLOYMENT_NAME_PLANNER") {
            self.planner.model = Some(deployment);
        }
        if let Some(deployment) = lookup("AZURE_OPENAI_DEPLOYMENT_NAME_EXECUTOR") {
            self.executor.model = Some(deployment);
        }
        if let Some(deployment) = lookup("AZURE_OPENAI_DEPLOYMENT_NAME_REPLANNER") {
            self.replanner.model = Some(deployment);
        }

        if self.search.api_key.is_none() {
            self.search.api_key = lookup("TAVILY_API_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".planexec")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let temperatures = [
            Some(self.default_temperature),
            self.planner.temperature,
            self.executor.temperature,
            self.replanner.temperature,
        ];
        if temperatures
            .iter()
            .flatten()
            .any(|t| !(0.0..=2.0).contains(t))
        {
            return Err(ConfigError::ValidationError(
                "temperatures must be between 0.0 and 2.0".into(),
            ));
        }

        if self.classifier.document_keywords.is_empty()
            || self
                .classifier
                .document_keywords
                .iter()
                .any(|k| k.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "classifier.document_keywords must be a non-empty list of non-blank keywords"
                    .into(),
            ));
        }

        if !(1..=20).contains(&self.search.max_results) {
            return Err(ConfigError::ValidationError(
                "search.max_results must be between 1 and 20".into(),
            ));
        }

        if self.executor.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "executor.max_iterations must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// The model (or deployment) a role should call.
    pub fn model_for(&self, role: AgentRole) -> &str {
        let model = match role {
            AgentRole::Planner => self.planner.model.as_deref(),
            AgentRole::Executor => self.executor.model.as_deref(),
            AgentRole::Replanner => self.replanner.model.as_deref(),
        };
        model.unwrap_or(&self.default_model)
    }

    /// The sampling temperature a role should use.
    pub fn temperature_for(&self, role: AgentRole) -> f32 {
        let temperature = match role {
            AgentRole::Planner => self.planner.temperature,
            AgentRole::Executor => self.executor.temperature,
            AgentRole::Replanner => self.replanner.temperature,
        };
        temperature.unwrap_or(self.default_temperature)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            planner: RoleConfig::default(),
            executor: ExecutorConfig::default(),
            replanner: RoleConfig::default(),
            session: SessionConfig::default(),
            classifier: ClassifierConfig::default(),
            search: SearchConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
