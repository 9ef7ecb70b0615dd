//! LLM Provider implementations for planexec.
//!
//! All providers implement the `planexec_core::Provider` trait.
//! The router selects the correct provider based on configuration, and
//! [`ProviderStructuredGenerator`] turns any provider into the
//! structured-generation capability the planner and replanner consume.

pub mod openai_compat;
pub mod router;
pub mod structured;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
pub use structured::ProviderStructuredGenerator;
