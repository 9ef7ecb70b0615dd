//! Planner: turns the objective into the initial task list.

use planexec_core::capability::{Plan, StructuredGenerator, StructuredRequest};
use planexec_core::error::{Error, Result};
use planexec_core::message::Message;
use planexec_core::state::TimeContext;
use std::sync::Arc;
use tracing::debug;

use crate::prompts;

/// Schema name the planner declares to the generator.
pub const PLAN_SCHEMA: &str = "plan";

pub struct Planner {
    generator: Arc<dyn StructuredGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Produce the ordered task list for `objective`.
    ///
    /// The reply must decode as a [`Plan`]; anything else is a contract
    /// violation. An empty list is passed through as-is.
    pub async fn plan(&self, objective: &str, time: &TimeContext) -> Result<Vec<String>> {
        let request = StructuredRequest::for_type::<Plan>(
            PLAN_SCHEMA,
            prompts::planner_system(time),
            vec![Message::user(objective)],
        )?;

        let value = self.generator.generate(request).await?;
        let plan: Plan =
            serde_json::from_value(value).map_err(|e| Error::contract("planner", e.to_string()))?;

        debug!(steps = plan.steps.len(), "Planner produced plan");
        Ok(plan.steps)
    }
}
