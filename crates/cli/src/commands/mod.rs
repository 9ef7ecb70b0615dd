pub mod onboard;
pub mod plan;
pub mod run;

use planexec_agent::PlanExecuteAgent;
use planexec_config::{AgentRole, AppConfig};
use planexec_core::event::EventBus;
use planexec_core::provider::Provider;
use planexec_core::tool::ToolRegistry;
use std::sync::Arc;

/// Load config and refuse to continue without credentials.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!("No API key configured for provider '{}'.", config.default_provider);
        eprintln!("  Set PLANEXEC_API_KEY (or OPENAI_API_KEY / AZURE_OPENAI_API_KEY),");
        eprintln!(
            "  or add api_key to {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        return Err("missing API key".into());
    }

    Ok(config)
}

/// Wire the provider, the search tool and the control loop from `config`.
pub(crate) fn build_agent(
    config: &AppConfig,
    event_bus: Arc<EventBus>,
) -> Result<PlanExecuteAgent, Box<dyn std::error::Error>> {
    let router = planexec_providers::build_from_config(config)?;
    let provider: Arc<dyn Provider> = router
        .default()
        .ok_or_else(|| format!("Provider '{}' is not available", config.default_provider))?;
    let tools: Arc<ToolRegistry> = Arc::new(planexec_tools::default_registry(&config.search));

    tracing::debug!(
        provider = provider.name(),
        planner = config.model_for(AgentRole::Planner),
        executor = config.model_for(AgentRole::Executor),
        replanner = config.model_for(AgentRole::Replanner),
        "Agent wired"
    );

    Ok(PlanExecuteAgent::from_config(config, provider, tools, event_bus))
}
