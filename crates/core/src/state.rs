//! Session state: the single record threaded through every round.
//!
//! A session starts with an objective and a frozen [`TimeContext`]. The
//! planner seeds `plan`, each executor round appends exactly one
//! [`PastStep`] and may replace the draft, and the replanner either swaps
//! in a new plan or sets the final response. Nodes never mutate the state
//! directly; they return a [`StateUpdate`] which [`SessionState::apply`]
//! merges field by field.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wall-clock grounding captured once at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeContext {
    /// UTC date, `YYYY-MM-DD`
    pub date: String,
    /// UTC time, `HH:MM:SS`
    pub time: String,
    pub year: i32,
}

impl TimeContext {
    pub fn new(date: impl Into<String>, time: impl Into<String>, year: i32) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            year,
        }
    }

    /// Capture the current UTC instant.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            date: instant.format("%Y-%m-%d").to_string(),
            time: instant.format("%H:%M:%S").to_string(),
            year: instant.year(),
        }
    }

    /// The sentence injected into the executor's system prompt.
    pub fn describe(&self) -> String {
        format!(
            "Current UTC Date is {}, Current UTC Time is {} (Year: {}).",
            self.date, self.time, self.year
        )
    }
}

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One executed task and the text the agent produced for it.
///
/// Failures are not typed: an agent that could not do the task says so
/// in `outcome`, and the replanner reads it as prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastStep {
    pub task: String,
    pub outcome: String,
}

impl PastStep {
    pub fn new(task: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            outcome: outcome.into(),
        }
    }
}

/// The canonical per-session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    id: SessionId,
    objective: String,
    time: TimeContext,

    /// Remaining tasks, head first.
    pub plan: Vec<String>,

    /// Append-only execution history.
    pub past_steps: Vec<PastStep>,

    /// The evolving document, verbatim output of the last document task.
    pub draft: Option<String>,

    /// Set by the replanner when the objective is met.
    pub response: Option<String>,
}

impl SessionState {
    /// Create a fresh session. Every optional field starts empty.
    pub fn new(objective: impl Into<String>, time: TimeContext) -> Self {
        Self {
            id: SessionId::new(),
            objective: objective.into(),
            time,
            plan: Vec::new(),
            past_steps: Vec::new(),
            draft: None,
            response: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn time(&self) -> &TimeContext {
        &self.time
    }

    /// The task the executor will run next, if any.
    pub fn current_task(&self) -> Option<&str> {
        self.plan.first().map(String::as_str)
    }

    /// The final response, if the session has reached it.
    pub fn final_response(&self) -> Option<&str> {
        self.response.as_deref().filter(|r| !r.is_empty())
    }

    /// A non-empty final response is the only termination signal.
    pub fn is_terminal(&self) -> bool {
        self.final_response().is_some()
    }

    /// Shallow per-field merge. `past_steps` is appended; every other
    /// field is replaced only when the update carries a value for it.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(plan) = update.plan {
            self.plan = plan;
        }
        self.past_steps.extend(update.past_steps);
        if let Some(draft) = update.draft {
            self.draft = Some(draft);
        }
        if let Some(response) = update.response {
            self.response = response;
        }
    }
}

/// A partial state produced by one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    /// Replacement plan (`None` leaves the plan untouched)
    pub plan: Option<Vec<String>>,

    /// Steps to append to the history
    pub past_steps: Vec<PastStep>,

    /// Replacement draft (`None` leaves the draft untouched)
    pub draft: Option<String>,

    /// `Some(None)` clears the response, `Some(Some(_))` sets it
    pub response: Option<Option<String>>,
}

impl StateUpdate {
    /// Planner output: the initial task list.
    pub fn planned(steps: Vec<String>) -> Self {
        Self {
            plan: Some(steps),
            ..Self::default()
        }
    }

    /// Replanner decided to continue: new plan, stale response cleared.
    pub fn replanned(steps: Vec<String>) -> Self {
        Self {
            plan: Some(steps),
            response: Some(None),
            ..Self::default()
        }
    }

    /// Replanner decided to stop: plan cleared, response set.
    pub fn finished(response: impl Into<String>) -> Self {
        Self {
            plan: Some(Vec::new()),
            response: Some(Some(response.into())),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time() -> TimeContext {
        TimeContext::new("2025-03-14", "09:26:53", 2025)
    }

    #[test]
    fn describe_matches_executor_format() {
        assert_eq!(
            time().describe(),
            "Current UTC Date is 2025-03-14, Current UTC Time is 09:26:53 (Year: 2025)."
        );
    }

    #[test]
    fn time_context_from_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 1).unwrap();
        let ctx = TimeContext::at(instant);
        assert_eq!(ctx.date, "2024-12-31");
        assert_eq!(ctx.time, "23:59:01");
        assert_eq!(ctx.year, 2024);
    }

    #[test]
    fn new_state_starts_empty() {
        let state = SessionState::new("Write a bio", time());
        assert_eq!(state.objective(), "Write a bio");
        assert!(state.plan.is_empty());
        assert!(state.past_steps.is_empty());
        assert!(state.draft.is_none());
        assert!(!state.is_terminal());
    }

    #[test]
    fn apply_appends_history_and_keeps_untouched_fields() {
        let mut state = SessionState::new("obj", time());
        state.apply(StateUpdate::planned(vec!["a".into(), "b".into()]));
        state.draft = Some("v1".into());

        state.apply(StateUpdate {
            past_steps: vec![PastStep::new("a", "done")],
            ..StateUpdate::default()
        });

        assert_eq!(state.plan, vec!["a", "b"]);
        assert_eq!(state.past_steps.len(), 1);
        assert_eq!(state.draft.as_deref(), Some("v1"));

        state.apply(StateUpdate {
            past_steps: vec![PastStep::new("b", "done too")],
            ..StateUpdate::default()
        });
        assert_eq!(state.past_steps[0].task, "a");
        assert_eq!(state.past_steps[1].task, "b");
    }

    #[test]
    fn finished_clears_plan_and_terminates() {
        let mut state = SessionState::new("obj", time());
        state.apply(StateUpdate::planned(vec!["a".into()]));
        state.apply(StateUpdate::finished("answer"));
        assert!(state.plan.is_empty());
        assert!(state.is_terminal());
        assert_eq!(state.final_response(), Some("answer"));
    }

    #[test]
    fn replanned_clears_stale_response() {
        let mut state = SessionState::new("obj", time());
        state.response = Some("stale".into());
        state.apply(StateUpdate::replanned(vec!["next".into()]));
        assert_eq!(state.response, None);
        assert_eq!(state.current_task(), Some("next"));
    }

    #[test]
    fn empty_response_is_not_terminal() {
        let mut state = SessionState::new("obj", time());
        state.response = Some(String::new());
        assert!(!state.is_terminal());
    }
}
