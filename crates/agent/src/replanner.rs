//! Replanner: decides whether the session is done.
//!
//! Reads the whole session state and returns either a final response
//! (plan cleared) or the remaining tasks (stale response cleared). Any other
//! reply is fatal: looping on with an empty plan would never terminate.

use planexec_core::capability::{Act, Action, StructuredGenerator, StructuredRequest};
use planexec_core::error::{Error, Result};
use planexec_core::event::preview;
use planexec_core::message::Message;
use planexec_core::state::SessionState;
use std::sync::Arc;
use tracing::debug;

use crate::prompts;

/// Schema name the replanner declares to the generator.
pub const ACT_SCHEMA: &str = "act";

pub struct Replanner {
    generator: Arc<dyn StructuredGenerator>,
}

impl Replanner {
    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self { generator }
    }

    /// Ask for the next action given everything the session knows.
    pub async fn replan(&self, state: &SessionState) -> Result<Action> {
        let request = StructuredRequest::for_type::<Act>(
            ACT_SCHEMA,
            prompts::replanner_system(state.time()),
            vec![Message::user(prompts::replanner_input(state))],
        )?;

        let value = self.generator.generate(request).await?;
        let action = decode_action(value)?;

        debug!(
            session_id = %state.id(),
            finished = matches!(action, Action::Response { .. }),
            "Replanner decided"
        );
        Ok(action)
    }
}

/// Decode the generator's reply into exactly one of the two actions.
///
/// A reply without an `action` object breaks the declared schema. An
/// `action` that is neither variant, carries both, or is degenerate (blank
/// response, empty plan) is an unexpected action.
fn decode_action(value: serde_json::Value) -> Result<Action> {
    let Some(action) = value.get("action").filter(|a| a.is_object()) else {
        return Err(Error::contract(
            "replanner",
            format!("expected an object with an `action` field, got {}", preview(&value.to_string(), 200)),
        ));
    };

    // A `null` in the other branch does not count as carrying it.
    let carries = |field: &str| action.get(field).is_some_and(|v| !v.is_null());
    if carries("response") && carries("steps") {
        return Err(Error::UnexpectedAction(
            "action carries both a response and a plan".into(),
        ));
    }

    match serde_json::from_value::<Action>(action.clone()) {
        Ok(Action::Response { response }) if response.trim().is_empty() => Err(
            Error::UnexpectedAction("final response is empty".into()),
        ),
        Ok(Action::Plan { steps }) if steps.is_empty() => Err(Error::UnexpectedAction(
            "plan has no steps and no final response was given".into(),
        )),
        Ok(action) => Ok(action),
        Err(_) => Err(Error::UnexpectedAction(format!(
            "neither a response nor a plan: {}",
            preview(&action.to_string(), 200)
        ))),
    }
}
