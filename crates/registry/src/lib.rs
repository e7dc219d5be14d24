//! Agent registry, semantic validator, and validation orchestrator.
//!
//! This crate is the natural home for the orchestrator (C6): it is the
//! one piece that needs both the registry-independent structural rules
//! (from `agentforge-core`) and the registry-dependent semantic rules
//! defined here, so it lives wherever the registry does rather than
//! forcing a dependency in either direction between core and registry.

pub mod orchestrator;
pub mod registry;
pub mod semantic;

pub use orchestrator::{validate, validate_fail_fast};
pub use registry::{AgentRegistry, InMemoryAgentRegistry};
