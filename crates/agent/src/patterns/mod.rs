//! Agent patterns: structured reasoning strategies.
//!
//! **ReAct** (Thought → Action → Observation with a visible trace) is the
//! tool-using agent the executor hands each task to.

pub mod react;

pub use react::{ReactAgent, ReactResult, TraceEntry, TraceKind};

#[cfg(test)]
pub(crate) mod test_helpers;
