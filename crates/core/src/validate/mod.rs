//! Structural validation (C3). See [`structural`] for the individual
//! rules; composing them with the semantic validator into a single
//! orchestrated result (C6) is `agentforge-registry`'s job, since that is
//! the first point where both the registry-independent and
//! registry-dependent rules are in scope together.

pub mod structural;

pub use structural::{cycle_detected, duplicate_edge, invalid_edge_reference, no_entry_node, orphan_node};
