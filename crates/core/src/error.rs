//! Error types for the planexec domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Capability failures (provider, tool) are kept in their own enums and
//! folded into the top-level [`Error`] with `#[from]`.

use thiserror::Error;

/// The top-level error type for all planexec operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Capability invocation failures ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Capability contract violations ---
    /// A structured-generation capability returned a value that does not
    /// match the declared output schema.
    #[error("{capability} returned output that violates its schema: {reason}")]
    ContractViolation { capability: String, reason: String },

    /// The replanner returned neither a final response nor a usable plan.
    #[error("Replanner returned an unexpected action: {0}")]
    UnexpectedAction(String),

    // --- Control loop ---
    #[error("Session cancelled")]
    Cancelled,

    #[error("Session did not finish within {limit} rounds")]
    RoundLimitExceeded { limit: u32 },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a [`Error::ContractViolation`].
    pub fn contract(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            capability: capability.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from calling an external capability
    /// (as opposed to a malformed answer or a control-loop decision).
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Tool(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
