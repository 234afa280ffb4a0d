// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node catalog.
//!
//! Executable nodes share one pin layout: input 0 is the `Exec` input and
//! output 0 the `Exec` output, so data pins start at index 1. Literal nodes
//! have no exec pins and keep their value on output 0.

pub mod events;
pub mod literals;
pub mod math;
pub mod matrix;
pub mod time;
pub mod vector;

use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeRegistry};
use crate::pin::PinSpec;

/// Type IDs of the non-operator built-ins
pub mod ids {
    /// Start event
    pub const START: &str = "start";
    /// Per-tick event
    pub const UPDATE: &str = "update";
    /// Print a value
    pub const PRINT: &str = "print";
    /// If/else branch
    pub const BRANCH: &str = "branch";
    /// Float literal
    pub const FLOAT: &str = "float";
    /// Int literal
    pub const INT: &str = "int";
    /// Bool literal
    pub const BOOL: &str = "bool";
    /// String literal
    pub const STRING: &str = "string";
    /// Elapsed-time accumulator
    pub const TIMER: &str = "timer";
    /// Periodic exec gate
    pub const DELAY: &str = "delay";
}

/// Create the registry holding every built-in node
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Events and flow
    // ========================================================================

    events::register(&mut registry);

    // ========================================================================
    // Literals
    // ========================================================================

    literals::register(&mut registry);

    // ========================================================================
    // Math, vectors and matrices
    // ========================================================================

    for op in math::FloatOp::ALL {
        registry.register(op.definition());
    }
    for op in math::UnaryOp::ALL {
        registry.register(op.definition());
    }
    for op in math::IntOp::ALL {
        registry.register(op.definition());
    }
    registry.register(math::clamp_definition());
    registry.register(math::lerp_definition());

    for op in vector::VectorOp::ALL {
        registry.register(op.definition());
    }
    for op in matrix::MatrixOp::ALL {
        registry.register(op.definition());
    }

    // ========================================================================
    // Time
    // ========================================================================

    time::register(&mut registry);

    registry
}

/// Definition with the standard `Exec` input and output already in place
pub(crate) fn executable(
    type_id: &str,
    title: &str,
    category: NodeCategory,
    behavior: impl NodeBehavior + 'static,
) -> NodeDefinition {
    NodeDefinition::new(type_id, title, category, behavior)
        .input(PinSpec::exec_in("Exec"))
        .output(PinSpec::exec_out("Exec"))
}
