// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant value nodes.
//!
//! A literal keeps its value on output 0. The value is set at creation
//! (override or pin default) or edited later through
//! [`Graph::set_output_value`](crate::graph::Graph::set_output_value).

use super::ids;
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeInstance, NodeRegistry};
use crate::pin::PinSpec;
use crate::value::Value;

/// Holds a constant; executing it changes nothing
pub struct Literal;

impl NodeBehavior for Literal {
    fn execute(&self, _node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        ExecFlow::Continue
    }
}

fn literal(type_id: &str, title: &str, default: Value) -> NodeDefinition {
    NodeDefinition::new(type_id, title, NodeCategory::Literal, Literal)
        .with_description(format!("Constant {} value", default.value_type().name()))
        .output(PinSpec::data_out("Value").with_default(default))
}

/// Register literal nodes
pub fn register(registry: &mut NodeRegistry) {
    registry.register(literal(ids::FLOAT, "Float", Value::Float(0.0)));
    registry.register(literal(ids::INT, "Int", Value::Int(0)));
    registry.register(literal(ids::BOOL, "Bool", Value::Bool(false)));
    registry.register(literal(ids::STRING, "String", Value::String(String::new())));
}
