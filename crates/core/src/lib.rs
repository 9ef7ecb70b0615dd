//! # planexec core
//!
//! Domain types, capability traits, and error definitions for the
//! planexec plan-and-execute runtime. This crate does no I/O: it defines
//! the session state and the contracts every other crate implements.
//!
//! ## Design Philosophy
//!
//! Every external service is a trait here (`Provider`, `Tool`,
//! `StructuredGenerator`, `TaskAgent`). Implementations live in their
//! respective crates, which keeps the control loop testable with scripted
//! fakes and keeps every crate depending inward on core.

pub mod capability;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod state;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use capability::{Act, Action, Plan, StructuredGenerator, StructuredRequest, TaskAgent};
pub use error::{Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use provider::{OutputSchema, Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use state::{PastStep, SessionId, SessionState, StateUpdate, TimeContext};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
