//! ReAct pattern: Thought → Action → Observation loop.
//!
//! The executor's tool-using agent. It reasons step by step, calls tools to
//! gather information, and stops when the model answers without asking for
//! a tool. Every step is recorded in a trace.
//!
//! Tool failures are fed back to the model as observations, so a task the
//! agent cannot finish still ends in text. Provider failures propagate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use planexec_core::capability::TaskAgent;
use planexec_core::error::Result;
use planexec_core::event::{DomainEvent, EventBus};
use planexec_core::message::{Conversation, Message};
use planexec_core::provider::{Provider, ProviderRequest};
use planexec_core::tool::{ToolCall, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single entry in the reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
}

/// Configuration for the ReAct agent.
pub struct ReactAgent {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    /// Temperature.
    temperature: f32,
    /// Default max tokens per response.
    max_tokens: Option<u32>,
    /// Tool registry.
    tools: Arc<ToolRegistry>,
    /// Maximum reasoning iterations.
    max_iterations: u32,
    /// Event bus.
    event_bus: Arc<EventBus>,
}

/// The result of a ReAct execution.
#[derive(Debug, Clone)]
pub struct ReactResult {
    /// The final answer text.
    pub answer: String,
    /// Complete reasoning trace.
    pub trace: Vec<TraceEntry>,
    /// Number of iterations used.
    pub iterations: u32,
    /// Total tool calls made.
    pub tool_calls_made: usize,
    /// False when the iteration limit cut the loop short.
    pub completed: bool,
}

impl ReactAgent {
    /// Create a new ReAct agent.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: 10,
            event_bus,
        }
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Execute the ReAct loop for one system prompt and one user turn.
    pub async fn run(&self, system_prompt: &str, user_message: &str) -> Result<ReactResult> {
        let mut conversation = Conversation::seeded(system_prompt, user_message);
        let tool_defs = self.tools.definitions();
        let mut trace = Vec::new();
        let mut total_tool_calls = 0usize;

        info!(model = %self.model, max_iter = self.max_iterations, "ReAct loop starting");

        for iteration in 1..=self.max_iterations {
            debug!(
                iteration,
                approx_tokens = conversation.estimated_tokens(),
                "ReAct iteration"
            );

            let mut request = ProviderRequest::new(
                &self.model,
                conversation.messages.clone(),
                self.temperature,
            );
            request.max_tokens = self.max_tokens;
            request.tools = tool_defs.clone();

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: Utc::now(),
                });
            }

            // ── Record thought ──
            if !response.message.content.is_empty() {
                trace.push(entry(TraceKind::Thought, &response.message.content));
            }

            // ── Check for final answer ──
            if response.message.tool_calls.is_empty() {
                let answer = response.message.content.clone();
                conversation.push(response.message);

                info!(
                    iterations = iteration,
                    tool_calls = total_tool_calls,
                    "ReAct loop completed"
                );

                return Ok(ReactResult {
                    answer,
                    trace,
                    iterations: iteration,
                    tool_calls_made: total_tool_calls,
                    completed: true,
                });
            }

            // ── Execute tool calls ──
            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                total_tool_calls += 1;
                trace.push(entry(
                    TraceKind::Action,
                    &format!("{}({})", tc.name, tc.arguments),
                ));

                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                let start = std::time::Instant::now();
                let result = self.tools.execute(&call).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let (observation, success) = match result {
                    Ok(tool_result) => (tool_result.output, tool_result.success),
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool call failed");
                        (format!("Error: {e}"), false)
                    }
                };

                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: tc.name.clone(),
                    success,
                    duration_ms,
                    timestamp: Utc::now(),
                });

                trace.push(entry(TraceKind::Observation, &observation));
                conversation.push(Message::tool_result(&tc.id, observation));
            }
        }

        warn!("ReAct: max iterations reached ({})", self.max_iterations);

        Ok(ReactResult {
            answer: format!(
                "I could not finish this task within {} reasoning steps. \
                 The information gathered so far is incomplete.",
                self.max_iterations
            ),
            trace,
            iterations: self.max_iterations,
            tool_calls_made: total_tool_calls,
            completed: false,
        })
    }
}

#[async_trait]
impl TaskAgent for ReactAgent {
    async fn run_task(&self, system_prompt: &str, task_input: &str) -> Result<String> {
        Ok(self.run(system_prompt, task_input).await?.answer)
    }
}

fn entry(kind: TraceKind, content: &str) -> TraceEntry {
    TraceEntry {
        kind,
        content: content.to_string(),
        timestamp: Utc::now(),
    }
}
