//! The plan-and-execute control loop.
//!
//! ```text
//!   Planning ──► Executing ──► Replanning ──► Terminated
//!                    ▲              │
//!                    └──────────────┘  (new plan)
//! ```
//!
//! Planning runs once per session. Each round is one Executing visit
//! followed by one Replanning visit; the loop ends when the replanner sets a
//! non-empty final response. Cancellation is checked before every phase.
//! Fatal errors end the session with the accumulated state attached.

use planexec_config::{AgentRole, AnswerPolicy, AppConfig};
use planexec_core::capability::{StructuredGenerator, TaskAgent};
use planexec_core::error::{Error, Result};
use planexec_core::event::{DomainEvent, EventBus, preview};
use planexec_core::provider::Provider;
use planexec_core::state::{SessionState, StateUpdate, TimeContext};
use planexec_core::tool::ToolRegistry;
use planexec_providers::ProviderStructuredGenerator;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classifier::TaskClassifier;
use crate::executor::Executor;
use crate::patterns::ReactAgent;
use crate::planner::Planner;
use crate::replanner::Replanner;

/// Where a session is in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Planning,
    Executing,
    Replanning,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Planning => "planning",
            Phase::Executing => "executing",
            Phase::Replanning => "replanning",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// A session that reached its final response.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// The answer chosen by the [`AnswerPolicy`]
    pub answer: String,
    /// Final state, including the full history and draft
    pub state: SessionState,
    /// Completed Executing→Replanning rounds
    pub rounds: u32,
}

/// A session that ended on a fatal error. The state accumulated up to the
/// failure is kept for diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct SessionFailure {
    pub error: Error,
    pub state: SessionState,
    pub rounds: u32,
}

/// Drives one or more independent sessions.
///
/// Holds no per-session state, so a single instance can run many sessions
/// concurrently.
pub struct PlanExecuteAgent {
    planner: Planner,
    executor: Executor,
    replanner: Replanner,
    /// Rounds before giving up (0 = unlimited)
    max_rounds: u32,
    answer_policy: AnswerPolicy,
    event_bus: Arc<EventBus>,
}

impl PlanExecuteAgent {
    pub fn new(planner: Planner, executor: Executor, replanner: Replanner) -> Self {
        Self {
            planner,
            executor,
            replanner,
            max_rounds: 12,
            answer_policy: AnswerPolicy::Response,
            event_bus: Arc::new(EventBus::default()),
        }
    }

    /// Wire planner and replanner to one generator and the executor to one
    /// agent, with the default document keywords.
    pub fn from_capabilities(
        generator: Arc<dyn StructuredGenerator>,
        agent: Arc<dyn TaskAgent>,
    ) -> Self {
        Self::new(
            Planner::new(generator.clone()),
            Executor::new(agent, TaskClassifier::default()),
            Replanner::new(generator),
        )
    }

    /// Build the production loop: per-role models over one provider, the
    /// ReAct agent over `tools`, and session settings from `config`.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let generator = |role: AgentRole| -> Arc<dyn StructuredGenerator> {
            Arc::new(
                ProviderStructuredGenerator::new(
                    provider.clone(),
                    config.model_for(role),
                    config.temperature_for(role),
                )
                .with_max_tokens(config.default_max_tokens)
                .with_event_bus(event_bus.clone()),
            )
        };

        let react = ReactAgent::new(
            provider.clone(),
            config.model_for(AgentRole::Executor),
            config.temperature_for(AgentRole::Executor),
            tools,
            event_bus.clone(),
        )
        .with_max_iterations(config.executor.max_iterations)
        .with_max_tokens(config.default_max_tokens);

        Self::new(
            Planner::new(generator(AgentRole::Planner)),
            Executor::new(
                Arc::new(react),
                TaskClassifier::from_config(&config.classifier),
            ),
            Replanner::new(generator(AgentRole::Replanner)),
        )
        .with_max_rounds(config.session.max_rounds)
        .with_answer_policy(config.session.answer)
        .with_event_bus(event_bus)
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_answer_policy(mut self, policy: AnswerPolicy) -> Self {
        self.answer_policy = policy;
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = bus;
        self
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Run the Planner alone and return the initial plan.
    pub async fn plan_only(&self, objective: &str, time: &TimeContext) -> Result<Vec<String>> {
        self.planner.plan(objective, time).await
    }

    /// Run a full session for `objective`.
    pub async fn run(
        &self,
        objective: impl Into<String>,
        time: TimeContext,
        cancel: &CancellationToken,
    ) -> std::result::Result<SessionOutcome, SessionFailure> {
        let mut state = SessionState::new(objective, time);
        let mut rounds = 0u32;

        info!(session_id = %state.id(), objective = %state.objective(), "Session started");
        self.event_bus.publish(DomainEvent::SessionStarted {
            session_id: state.id().to_string(),
            objective: state.objective().to_string(),
            timestamp: chrono::Utc::now(),
        });

        match self.drive(&mut state, &mut rounds, cancel).await {
            Ok(()) => {
                let answer = self.choose_answer(&state);
                info!(session_id = %state.id(), rounds, "Session completed");
                self.event_bus.publish(DomainEvent::SessionCompleted {
                    session_id: state.id().to_string(),
                    rounds: rounds as usize,
                    timestamp: chrono::Utc::now(),
                });
                Ok(SessionOutcome {
                    answer,
                    state,
                    rounds,
                })
            }
            Err(error) => {
                warn!(session_id = %state.id(), rounds, error = %error, "Session failed");
                self.event_bus.publish(DomainEvent::SessionFailed {
                    session_id: state.id().to_string(),
                    rounds: rounds as usize,
                    error_message: error.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(SessionFailure {
                    error,
                    state,
                    rounds,
                })
            }
        }
    }

    /// Step the state machine until it terminates or fails.
    async fn drive(
        &self,
        state: &mut SessionState,
        rounds: &mut u32,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut phase = Phase::Planning;

        while phase != Phase::Terminated {
            if cancel.is_cancelled() {
                info!(session_id = %state.id(), %phase, "Session cancelled");
                return Err(Error::Cancelled);
            }

            debug!(session_id = %state.id(), round = *rounds, %phase, "Entering phase");

            phase = match phase {
                Phase::Planning => {
                    let steps = self.planner.plan(state.objective(), state.time()).await?;
                    info!(session_id = %state.id(), steps = steps.len(), "Plan created");
                    self.event_bus.publish(DomainEvent::PlanCreated {
                        session_id: state.id().to_string(),
                        steps: steps.clone(),
                        timestamp: chrono::Utc::now(),
                    });
                    state.apply(StateUpdate::planned(steps));
                    Phase::Executing
                }

                Phase::Executing => {
                    let task = state.current_task().map(str::to_string);
                    let update = self.executor.execute(state).await?;
                    state.apply(update);
                    *rounds += 1;

                    if let Some(step) = state.past_steps.last() {
                        self.event_bus.publish(DomainEvent::StepExecuted {
                            session_id: state.id().to_string(),
                            round: *rounds as usize,
                            task: step.task.clone(),
                            document_task: task
                                .as_deref()
                                .is_some_and(|t| self.executor.classifier().is_document_task(t)),
                            outcome_preview: preview(&step.outcome, 160),
                            timestamp: chrono::Utc::now(),
                        });
                    }
                    Phase::Replanning
                }

                Phase::Replanning => {
                    let action = self.replanner.replan(state).await?;
                    state.apply(action.into_update());

                    if state.is_terminal() {
                        Phase::Terminated
                    } else {
                        if self.max_rounds > 0 && *rounds >= self.max_rounds {
                            return Err(Error::RoundLimitExceeded {
                                limit: self.max_rounds,
                            });
                        }
                        info!(
                            session_id = %state.id(),
                            round = *rounds,
                            remaining = state.plan.len(),
                            "Replanned"
                        );
                        self.event_bus.publish(DomainEvent::Replanned {
                            session_id: state.id().to_string(),
                            round: *rounds as usize,
                            steps: state.plan.clone(),
                            timestamp: chrono::Utc::now(),
                        });
                        Phase::Executing
                    }
                }

                Phase::Terminated => Phase::Terminated,
            };
        }

        Ok(())
    }

    fn choose_answer(&self, state: &SessionState) -> String {
        let response = state.final_response().unwrap_or_default();
        match self.answer_policy {
            AnswerPolicy::Response => response.to_string(),
            AnswerPolicy::Draft => state
                .draft
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(response)
                .to_string(),
        }
    }
}
