//! Executor: runs the task at the head of the plan.
//!
//! One call appends exactly one history entry. Document tasks see the
//! current draft and their output replaces it wholesale; other tasks leave
//! the draft alone. The executed task is popped from the plan.

use planexec_core::capability::TaskAgent;
use planexec_core::error::Result;
use planexec_core::state::{PastStep, SessionState, StateUpdate};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classifier::TaskClassifier;
use crate::prompts;

/// History task recorded when the executor runs with nothing planned.
pub const EMPTY_PLAN_TASK: &str = "No task to execute";
/// History outcome recorded when the executor runs with nothing planned.
pub const EMPTY_PLAN_OUTCOME: &str = "Plan was empty.";

pub struct Executor {
    agent: Arc<dyn TaskAgent>,
    classifier: TaskClassifier,
}

impl Executor {
    pub fn new(agent: Arc<dyn TaskAgent>, classifier: TaskClassifier) -> Self {
        Self { agent, classifier }
    }

    pub fn classifier(&self) -> &TaskClassifier {
        &self.classifier
    }

    /// Execute `state.plan[0]` and describe the result as a [`StateUpdate`].
    ///
    /// Agent failures propagate unchanged; an agent that merely *says* it
    /// could not do the task is a normal outcome.
    pub async fn execute(&self, state: &SessionState) -> Result<StateUpdate> {
        let Some(task) = state.current_task() else {
            warn!(session_id = %state.id(), "Executor invoked with an empty plan");
            return Ok(StateUpdate {
                past_steps: vec![PastStep::new(EMPTY_PLAN_TASK, EMPTY_PLAN_OUTCOME)],
                ..StateUpdate::default()
            });
        };

        let document_task = self.classifier.is_document_task(task);
        let draft = state.draft.as_deref().filter(|d| !d.is_empty());
        let system_prompt = prompts::executor_system(&state.time().describe());
        let input = prompts::task_input(task, document_task, draft);

        debug!(
            session_id = %state.id(),
            document_task,
            has_draft = draft.is_some(),
            input_chars = input.len(),
            "Executing task"
        );

        let outcome = self.agent.run_task(&system_prompt, &input).await?;

        Ok(StateUpdate {
            plan: Some(state.plan[1..].to_vec()),
            draft: document_task.then(|| outcome.clone()),
            past_steps: vec![PastStep::new(task, outcome)],
            response: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_helpers::ScriptedAgent;
    use crate::prompts::{DRAFT_BEGIN, DRAFT_END, NO_DRAFT_NOTE};
    use planexec_core::error::{Error, ProviderError};
    use planexec_core::state::TimeContext;

    fn state_with(plan: &[&str], draft: Option<&str>) -> SessionState {
        let mut state = SessionState::new(
            "Write a two-sentence bio of Ada Lovelace",
            TimeContext::new("2025-03-14", "09:26:53", 2025),
        );
        state.apply(StateUpdate::planned(plan.iter().map(|s| s.to_string()).collect()));
        state.draft = draft.map(String::from);
        state
    }

    fn executor(agent: Arc<ScriptedAgent>) -> Executor {
        Executor::new(agent, TaskClassifier::default())
    }

    #[tokio::test]
    async fn empty_plan_records_placeholder_and_keeps_draft() {
        let agent = Arc::new(ScriptedAgent::new(vec![]));
        let mut state = state_with(&[], Some("v1"));

        let update = executor(agent.clone()).execute(&state).await.unwrap();
        state.apply(update);

        assert_eq!(
            state.past_steps,
            vec![PastStep::new(EMPTY_PLAN_TASK, EMPTY_PLAN_OUTCOME)]
        );
        assert_eq!(state.draft.as_deref(), Some("v1"));
        assert!(state.plan.is_empty());
        assert!(agent.calls().is_empty());
    }

    #[tokio::test]
    async fn document_task_replaces_draft() {
        let agent = Arc::new(ScriptedAgent::new(vec![Ok("v2".into())]));
        let mut state = state_with(&["Refine the current draft", "Search more"], Some("v1"));

        let update = executor(agent).execute(&state).await.unwrap();
        state.apply(update);

        assert_eq!(state.draft.as_deref(), Some("v2"));
        assert_eq!(state.plan, vec!["Search more"]);
        assert_eq!(state.past_steps[0].outcome, "v2");
    }

    #[tokio::test]
    async fn non_document_task_leaves_draft() {
        let agent = Arc::new(ScriptedAgent::new(vec![Ok("Born 1815.".into())]));
        let mut state = state_with(&["Use web_search to find her birth year"], Some("v1"));

        let update = executor(agent.clone()).execute(&state).await.unwrap();
        state.apply(update);

        assert_eq!(state.draft.as_deref(), Some("v1"));
        assert!(state.plan.is_empty());
        let (_, input) = agent.calls().remove(0);
        assert_eq!(input, "Use web_search to find her birth year");
    }

    #[tokio::test]
    async fn existing_draft_is_injected_verbatim() {
        let agent = Arc::new(ScriptedAgent::new(vec![Ok("longer draft".into())]));
        let state = state_with(
            &["Add a section on early computing machines to the current draft"],
            Some("Ada Lovelace was a mathematician."),
        );

        executor(agent.clone()).execute(&state).await.unwrap();

        let (system, input) = agent.calls().remove(0);
        assert!(system.contains(&state.time().describe()));
        assert!(input.contains(&format!(
            "{DRAFT_BEGIN}\nAda Lovelace was a mathematician.\n{DRAFT_END}"
        )));
    }

    #[tokio::test]
    async fn first_document_task_notes_missing_draft() {
        let agent = Arc::new(ScriptedAgent::new(vec![Ok("Ada was...".into())]));
        let mut state = state_with(&["Generate an initial draft of the bio"], None);

        let update = executor(agent.clone()).execute(&state).await.unwrap();
        state.apply(update);

        let (_, input) = agent.calls().remove(0);
        assert!(input.contains(NO_DRAFT_NOTE));
        assert_eq!(state.draft.as_deref(), Some("Ada was..."));
    }

    #[tokio::test]
    async fn inability_text_is_an_ordinary_outcome() {
        let agent = Arc::new(ScriptedAgent::new(vec![Ok(
            "I cannot access external files for this task.".into(),
        )]));
        let mut state = state_with(&["Open the attached spreadsheet"], None);

        let update = executor(agent).execute(&state).await.unwrap();
        state.apply(update);
        assert_eq!(
            state.past_steps[0].outcome,
            "I cannot access external files for this task."
        );
    }

    #[tokio::test]
    async fn agent_failure_propagates_without_update() {
        let agent = Arc::new(ScriptedAgent::new(vec![Err(Error::Provider(
            ProviderError::Network("connection reset".into()),
        ))]));
        let state = state_with(&["Search"], None);

        let err = executor(agent).execute(&state).await.unwrap_err();
        assert!(err.is_invocation_failure());
    }
}
