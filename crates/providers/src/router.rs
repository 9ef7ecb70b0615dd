//! Provider router: selects the correct LLM provider based on config.

use planexec_config::AppConfig;
use planexec_core::error::ProviderError;
use planexec_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;

use crate::openai_compat::OpenAiCompatProvider;

/// Azure OpenAI API version used when none is configured.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build providers from configuration.
///
/// Every `[providers.<name>]` entry is registered, and the default provider
/// is always present. Azure needs an endpoint, so a default `azure`
/// provider without one is a configuration error.
pub fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        let provider = if name == "azure" {
            let Some(endpoint) = provider_config.api_url.as_deref() else {
                if name == &config.default_provider {
                    return Err(ProviderError::NotConfigured(
                        "azure requires providers.azure.api_url or AZURE_OPENAI_ENDPOINT".into(),
                    ));
                }
                tracing::warn!("Skipping azure provider without an endpoint");
                continue;
            };
            let api_version = provider_config
                .api_version
                .as_deref()
                .unwrap_or(DEFAULT_AZURE_API_VERSION);
            OpenAiCompatProvider::azure(endpoint, &api_key, api_version)
        } else {
            let base_url = provider_config
                .api_url
                .clone()
                .unwrap_or_else(|| default_base_url(name));
            OpenAiCompatProvider::new(name, &base_url, &api_key)
        };

        router.register(
            name.clone(),
            Arc::new(provider.with_timeout(config.request_timeout_secs)),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        if config.default_provider == "azure" {
            return Err(ProviderError::NotConfigured(
                "azure requires providers.azure.api_url or AZURE_OPENAI_ENDPOINT".into(),
            ));
        }
        let api_key = config.api_key.clone().unwrap_or_default();
        let base_url = default_base_url(&config.default_provider);
        let provider = OpenAiCompatProvider::new(&config.default_provider, &base_url, &api_key)
            .with_timeout(config.request_timeout_secs);
        router.register(config.default_provider.clone(), Arc::new(provider));
    }

    Ok(router)
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
