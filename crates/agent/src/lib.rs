//! The plan-and-execute agent.
//!
//! A session runs a fixed cycle:
//!
//! 1. **Plan**: the planner turns the objective into an ordered task list
//! 2. **Execute**: the executor hands the head task to a tool-using ReAct
//!    agent, records the outcome, and updates the draft for document tasks
//! 3. **Replan**: the replanner reads everything so far and either returns
//!    the remaining tasks (back to 2) or a final response (done)
//!
//! Planner and replanner talk to a [`StructuredGenerator`]; the executor
//! talks to a [`TaskAgent`]. Both are traits, so the loop runs the same
//! against real providers and against scripted fakes.
//!
//! [`StructuredGenerator`]: planexec_core::StructuredGenerator
//! [`TaskAgent`]: planexec_core::TaskAgent

pub mod classifier;
pub mod executor;
pub mod graph;
pub mod patterns;
pub mod planner;
pub mod prompts;
pub mod replanner;

pub use classifier::TaskClassifier;
pub use executor::Executor;
pub use graph::{Phase, PlanExecuteAgent, SessionFailure, SessionOutcome};
pub use patterns::{ReactAgent, ReactResult, TraceEntry, TraceKind};
pub use planexec_config::AnswerPolicy;
pub use planner::Planner;
pub use replanner::Replanner;
