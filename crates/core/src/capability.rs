//! Capability traits consumed by the plan-and-execute loop.
//!
//! The loop depends on exactly two external services:
//!
//! - [`StructuredGenerator`]: given a prompt and a JSON Schema, return a
//!   value conforming to that schema (planner and replanner).
//! - [`TaskAgent`]: given a system prompt and one user turn, run a
//!   tool-using agent to completion and return its final text (executor).
//!
//! Both are injected as trait objects so the loop runs against scripted
//! fakes in tests and against real providers in production.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::provider::OutputSchema;
use crate::state::StateUpdate;

/// A structured-generation request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Output schema name, also used in error messages
    pub name: String,

    /// System prompt (policy + context)
    pub system: String,

    /// Conversation turns after the system prompt (may be empty)
    pub messages: Vec<Message>,

    /// JSON Schema the reply must conform to
    pub schema: serde_json::Value,
}

impl StructuredRequest {
    /// Build a request whose schema is derived from `T`.
    pub fn for_type<T: JsonSchema>(
        name: impl Into<String>,
        system: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self> {
        let schema = serde_json::to_value(schemars::schema_for!(T))?;
        Ok(Self {
            name: name.into(),
            system: system.into(),
            messages,
            schema,
        })
    }

    pub fn output_schema(&self) -> OutputSchema {
        OutputSchema {
            name: self.name.clone(),
            schema: self.schema.clone(),
        }
    }
}

/// "Given a structured prompt, return a structured result conforming to a
/// declared schema."
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Returns the raw JSON value. Callers decode it into the typed output
    /// and report a contract violation if that fails.
    async fn generate(&self, request: StructuredRequest) -> Result<serde_json::Value>;
}

/// A tool-using agent that runs one task to completion.
#[async_trait]
pub trait TaskAgent: Send + Sync {
    /// Run a single task. The agent may loop internally any number of
    /// times; the caller only sees the final text.
    async fn run_task(&self, system_prompt: &str, task_input: &str) -> Result<String>;
}

/// Plan to follow in future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    /// Different steps to follow, in the order they should run.
    pub steps: Vec<String>,
}

/// What the replanner decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Act {
    /// Action to perform. Use a response to answer the user, or a plan if
    /// more work is needed.
    pub action: Action,
}

/// The replanner's two-way decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Action {
    /// Final answer to the user.
    Response { response: String },
    /// Remaining steps.
    Plan { steps: Vec<String> },
}

impl Action {
    /// The state change this decision implies: a response ends the
    /// session and clears the plan, a plan replaces the old one and clears
    /// any stale response.
    pub fn into_update(self) -> StateUpdate {
        match self {
            Action::Response { response } => StateUpdate::finished(response),
            Action::Plan { steps } => StateUpdate::replanned(steps),
        }
    }
}
