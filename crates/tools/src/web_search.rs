//! Web search tool.
//!
//! Calls the Tavily search API, or returns deterministic results from the
//! offline backend so the agent loop can be exercised without network access.

use async_trait::async_trait;
use planexec_core::error::ToolError;
use planexec_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TAVILY_URL: &str = "https://api.tavily.com/search";

/// Where search results come from.
pub enum SearchBackend {
    Tavily {
        api_key: String,
        endpoint: String,
        client: reqwest::Client,
    },
    Offline,
}

impl SearchBackend {
    pub fn tavily(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self::Tavily {
            api_key: api_key.into(),
            endpoint: TAVILY_URL.into(),
            client,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Tavily { .. } => "tavily",
            Self::Offline => "offline",
        }
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        match self {
            Self::Tavily {
                api_key,
                endpoint,
                client,
            } => tavily_search(client, endpoint, api_key, query, max_results).await,
            Self::Offline => Ok(offline_results(query, max_results)),
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

pub struct WebSearchTool {
    backend: SearchBackend,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(backend: SearchBackend, max_results: usize) -> Self {
        Self {
            backend,
            max_results: max_results.max(1),
        }
    }

    pub fn offline() -> Self {
        Self::new(SearchBackend::Offline, 5)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns ranked results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": format!("Number of results to return (default {})", self.max_results),
                    "minimum": 1
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let max_results = arguments["max_results"]
            .as_u64()
            .map_or(self.max_results, |n| n as usize)
            .clamp(1, self.max_results);

        tracing::debug!(backend = self.backend.label(), query, max_results, "Searching");
        let hits = self.backend.search(query, max_results).await?;

        let output = if hits.is_empty() {
            format!("No results found for '{query}'.")
        } else {
            serde_json::to_string_pretty(&hits).unwrap_or_default()
        };

        Ok(ToolResult {
            success: true,
            output,
            data: serde_json::to_value(&hits).ok(),
        })
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

async fn tavily_search(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: &str,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, ToolError> {
    let failed = |reason: String| ToolError::ExecutionFailed {
        tool_name: "web_search".into(),
        reason,
    };

    let response = client
        .post(endpoint)
        .json(&TavilyRequest {
            api_key,
            query,
            max_results,
        })
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(failed(format!("search API returned {status}: {body}")));
    }

    let parsed: TavilyResponse = response
        .json()
        .await
        .map_err(|e| failed(format!("unreadable search response: {e}")))?;

    Ok(parsed
        .results
        .into_iter()
        .take(max_results)
        .map(|r| SearchHit {
            title: r.title,
            url: r.url,
            snippet: r.content,
        })
        .collect())
}

/// Deterministic results keyed on the query text.
fn offline_results(query: &str, count: usize) -> Vec<SearchHit> {
    let slug: String = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("+");

    (1..=count)
        .map(|rank| SearchHit {
            title: format!("Result {rank} for: {query}"),
            url: format!("https://search.invalid/?q={slug}&rank={rank}"),
            snippet: format!("Offline search result {rank} about '{query}'."),
        })
        .collect()
}
