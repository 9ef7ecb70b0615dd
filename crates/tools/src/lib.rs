//! Tool implementations for the planexec executor.
//!
//! The executor's ReAct agent sees the web through exactly one tool,
//! `web_search`. The backend is picked from configuration: Tavily for real
//! searches, or a deterministic offline backend for tests and air-gapped runs.

pub mod web_search;

use planexec_config::{SearchBackendKind, SearchConfig};
use planexec_core::tool::ToolRegistry;

pub use web_search::{SearchBackend, SearchHit, WebSearchTool};

/// Create the tool registry the executor runs with.
///
/// A Tavily backend without an API key falls back to offline results so a
/// session can still run end to end.
pub fn default_registry(config: &SearchConfig) -> ToolRegistry {
    let backend = match (config.backend, config.api_key.as_deref()) {
        (SearchBackendKind::Tavily, Some(key)) => SearchBackend::tavily(key),
        (SearchBackendKind::Tavily, None) => {
            tracing::warn!("No Tavily API key configured, web_search will return offline results");
            SearchBackend::Offline
        }
        (SearchBackendKind::Offline, _) => SearchBackend::Offline,
    };

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(backend, config.max_results)));
    registry
}
