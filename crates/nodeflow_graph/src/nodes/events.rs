// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event, flow-control and print nodes.

use super::{executable, ids};
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{EntryPoint, NodeBehavior, NodeCategory, NodeDefinition, NodeInstance, NodeRegistry};
use crate::pin::PinSpec;

/// Entry point of the graph
pub struct Start;

impl NodeBehavior for Start {
    fn execute(&self, _node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        ExecFlow::Continue
    }
}

/// Pulse fired every tick, exposing the tick's delta time
pub struct Update;

impl NodeBehavior for Update {
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow {
        node.set_output(1, ctx.delta_time());
        ExecFlow::Continue
    }
}

/// If/else on a bool input
pub struct Branch;

impl NodeBehavior for Branch {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        if node.input(1, false) {
            ExecFlow::pin(0)
        } else {
            ExecFlow::pin(1)
        }
    }
}

/// Prints its message input, whatever its type
pub struct Print;

impl NodeBehavior for Print {
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow {
        let line = node
            .input_value(1)
            .map(ToString::to_string)
            .unwrap_or_default();
        ctx.print(line);
        ExecFlow::Continue
    }
}

/// Register event and flow nodes
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        NodeDefinition::new(ids::START, "Start", NodeCategory::Event, Start)
            .with_description("Entry point; runs when the graph is executed")
            .output(PinSpec::exec_out("Exec"))
            .entry_point(EntryPoint::Start),
    );

    registry.register(
        NodeDefinition::new(ids::UPDATE, "Update", NodeCategory::Event, Update)
            .with_description("Triggered every tick")
            .output(PinSpec::exec_out("Exec"))
            .output(PinSpec::data_out("Delta Time").with_default(0.0f32))
            .entry_point(EntryPoint::Update),
    );

    registry.register(
        NodeDefinition::new(ids::BRANCH, "Branch", NodeCategory::Flow, Branch)
            .with_description("If/else branching")
            .input(PinSpec::exec_in("Exec"))
            .input(PinSpec::data_in("Condition").with_default(false))
            .output(PinSpec::exec_out("True"))
            .output(PinSpec::exec_out("False")),
    );

    registry.register(
        executable(ids::PRINT, "Print", NodeCategory::Utility, Print)
            .with_description("Print a value to the output log")
            .input(PinSpec::data_in("Message").with_default("Hello World")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::node::Overrides;
    use crate::nodes::builtin_registry;

    #[test]
    fn test_print_renders_any_value() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let start = graph.create_node(registry.get(ids::START).unwrap(), Overrides::new());
        let hello = graph.create_node(registry.get(ids::PRINT).unwrap(), Overrides::new());
        let number = graph.create_node(
            registry.get(ids::PRINT).unwrap(),
            Overrides::new().input(1, 42i32),
        );
        graph.add_connection(start, 0, hello, 0).unwrap();
        graph.add_connection(hello, 0, number, 0).unwrap();

        let report = graph.execute_graph().unwrap();
        assert_eq!(report.printed, vec!["Hello World".to_string(), "42".to_string()]);
    }

    #[test]
    fn test_branch() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let start = graph.create_node(registry.get(ids::START).unwrap(), Overrides::new());
        let branch = graph.create_node(registry.get(ids::BRANCH).unwrap(), Overrides::new());
        let yes = graph.create_node(registry.get(ids::PRINT).unwrap(), Overrides::new().input(1, "yes"));
        let no = graph.create_node(registry.get(ids::PRINT).unwrap(), Overrides::new().input(1, "no"));
        graph.add_connection(start, 0, branch, 0).unwrap();
        graph.add_connection(branch, 0, yes, 0).unwrap();
        graph.add_connection(branch, 1, no, 0).unwrap();

        assert_eq!(graph.execute_graph().unwrap().printed, vec!["no".to_string()]);

        graph.set_input_value(branch, 1, true).unwrap();
        assert_eq!(graph.execute_graph().unwrap().printed, vec!["yes".to_string()]);
    }
}
