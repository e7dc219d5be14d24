//! Validation Orchestrator (C6): composes the structural validator (S1–S5,
//! from `agentforge-core`) with the semantic validator (M1–M2, above) into
//! a single pass/fail result, in a fixed rule order.
//!
//! Order: S2 (stop on failure) → S3 (accumulate) → S4 (accumulate) → S1
//! (stop on failure) → S5 (accumulate) → M1, M2 if a registry was
//! supplied (accumulate). `S2` and `S1` stop the pipeline outright on
//! failure because every rule after them assumes edges resolve to real
//! nodes (S2) and that the graph is acyclic (S1); running S5's
//! reachability search, the planner, or the semantic rules on a graph
//! that fails either precondition would not produce meaningful errors.
//! Without a registry, the semantic rules are skipped entirely rather
//! than treated as failures.

use agentforge_core::{plan, ErrorCode, GraphIndex, PlanOutcome, ValidationError, ValidationOutcome, Workflow};
use agentforge_core::validate::structural;

use crate::registry::AgentRegistry;
use crate::semantic;

/// Run every rule and accumulate every failure it can find before
/// deciding the outcome. This is what API callers should use by default.
pub fn validate(workflow: &Workflow, registry: Option<&dyn AgentRegistry>) -> ValidationOutcome {
    run(workflow, registry, false)
}

/// Run rules in the same fixed order, but stop and return as soon as any
/// single rule reports a non-empty set of errors.
pub fn validate_fail_fast(workflow: &Workflow, registry: Option<&dyn AgentRegistry>) -> ValidationOutcome {
    run(workflow, registry, true)
}

fn run(workflow: &Workflow, registry: Option<&dyn AgentRegistry>, fail_fast: bool) -> ValidationOutcome {
    let index = GraphIndex::build(workflow);
    let mut errors = Vec::new();

    let s2 = structural::invalid_edge_reference(workflow);
    if !s2.is_empty() {
        errors.extend(s2);
        return finalize(workflow, &index, errors);
    }

    errors.extend(structural::duplicate_edge(workflow));
    if fail_fast && !errors.is_empty() {
        return finalize(workflow, &index, errors);
    }

    errors.extend(structural::no_entry_node(workflow, &index));
    if fail_fast && !errors.is_empty() {
        return finalize(workflow, &index, errors);
    }

    let s1 = structural::cycle_detected(workflow, &index);
    if !s1.is_empty() {
        errors.extend(s1);
        return finalize(workflow, &index, errors);
    }

    errors.extend(structural::orphan_node(workflow, &index));
    if fail_fast && !errors.is_empty() {
        return finalize(workflow, &index, errors);
    }

    match registry {
        Some(registry) => {
            errors.extend(semantic::type_mismatch(workflow, registry));
            if fail_fast && !errors.is_empty() {
                return finalize(workflow, &index, errors);
            }
            errors.extend(semantic::missing_required_input(workflow, registry));
        }
        None if !errors.is_empty() => return finalize(workflow, &index, errors),
        None => {}
    }

    finalize(workflow, &index, errors)
}

fn finalize(workflow: &Workflow, index: &GraphIndex, errors: Vec<ValidationError>) -> ValidationOutcome {
    if !errors.is_empty() {
        return ValidationOutcome::Invalid { errors };
    }

    match plan(workflow, index) {
        PlanOutcome::Success { execution_order, .. } => ValidationOutcome::Valid { execution_order },
        PlanOutcome::CycleDetected => ValidationOutcome::Invalid {
            errors: vec![ValidationError::new(
                ErrorCode::CycleDetected,
                "planner detected a cycle the structural validator did not",
            )],
        },
    }
}
