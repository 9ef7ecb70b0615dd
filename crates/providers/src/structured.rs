//! Structured generation over any chat provider.
//!
//! The planner and replanner only know [`StructuredGenerator`]. This adapter
//! sends their prompt with a JSON Schema attached and hands back the JSON
//! object found in the reply. Decoding into the typed output stays with the
//! caller; a reply with no JSON object at all is reported here.

use async_trait::async_trait;
use planexec_core::capability::{StructuredGenerator, StructuredRequest};
use planexec_core::error::{Error, Result};
use planexec_core::event::{DomainEvent, EventBus};
use planexec_core::message::Message;
use planexec_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::debug;

/// A [`StructuredGenerator`] backed by one provider and one model.
pub struct ProviderStructuredGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    event_bus: Option<Arc<EventBus>>,
}

impl ProviderStructuredGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            event_bus: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Publish a `ResponseGenerated` event after every call.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }
}

#[async_trait]
impl StructuredGenerator for ProviderStructuredGenerator {
    async fn generate(&self, request: StructuredRequest) -> Result<serde_json::Value> {
        let output_schema = request.output_schema();
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(Message::system(request.system));
        messages.extend(request.messages);

        let mut provider_request = ProviderRequest::new(&self.model, messages, self.temperature);
        provider_request.max_tokens = self.max_tokens;
        provider_request.output_schema = Some(output_schema);

        let response = self.provider.complete(provider_request).await?;

        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::ResponseGenerated {
                model: response.model.clone(),
                tokens_used: response.usage.as_ref().map_or(0, |u| u.total_tokens),
                timestamp: chrono::Utc::now(),
            });
        }

        debug!(
            schema = %request.name,
            reply_chars = response.message.content.len(),
            "Structured reply received"
        );

        extract_json(&response.message.content).ok_or_else(|| {
            Error::contract(
                &request.name,
                format!(
                    "reply contains no JSON object: {}",
                    planexec_core::event::preview(&response.message.content, 120)
                ),
            )
        })
    }
}

/// Find the JSON object in a model reply: the whole reply, a fenced code
/// block, or the outermost `{…}` span, in that order.
fn extract_json(reply: &str) -> Option<serde_json::Value> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidates = [Some(trimmed), fenced_block(trimmed), brace_span(trimmed)];
    candidates
        .into_iter()
        .flatten()
        .filter_map(|c| serde_json::from_str::<serde_json::Value>(c).ok())
        .find(serde_json::Value::is_object)
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    // Skip an optional language tag on the opening fence.
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
