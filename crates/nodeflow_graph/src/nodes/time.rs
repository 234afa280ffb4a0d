// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timer and delay nodes.
//!
//! Both keep their elapsed time in the node's local state under
//! [`ELAPSED`], advanced by the pass delta time each time they execute.

use super::{executable, ids};
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeInstance, NodeRegistry};
use crate::pin::PinSpec;

/// Local state key holding elapsed seconds
pub const ELAPSED: &str = "elapsed";

/// Accumulates elapsed time across ticks
pub struct Timer;

impl NodeBehavior for Timer {
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow {
        let elapsed = if node.input(1, false) {
            0.0
        } else {
            node.state(ELAPSED, 0.0f32) + ctx.delta_time()
        };
        node.set_state(ELAPSED, elapsed);
        node.set_output(1, elapsed);
        ExecFlow::Continue
    }
}

/// Fires its exec output once every `Duration` seconds
pub struct Delay;

impl NodeBehavior for Delay {
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow {
        let duration = node.input(1, 1.0f32);
        let elapsed = node.state(ELAPSED, 0.0f32) + ctx.delta_time();

        if elapsed >= duration {
            node.set_state(ELAPSED, 0.0f32);
            node.set_output(1, 0.0f32);
            ExecFlow::Continue
        } else {
            node.set_state(ELAPSED, elapsed);
            node.set_output(1, duration - elapsed);
            ExecFlow::Halt
        }
    }
}

/// Register time nodes
pub fn register(registry: &mut NodeRegistry) {
    registry.register(
        executable(ids::TIMER, "Timer", NodeCategory::Time, Timer)
            .with_description("Seconds accumulated over the ticks this node ran")
            .input(PinSpec::data_in("Reset").with_default(false))
            .output(PinSpec::data_out("Elapsed").with_default(0.0f32)),
    );

    registry.register(
        NodeDefinition::new(ids::DELAY, "Delay", NodeCategory::Time, Delay)
            .with_description("Continue once the duration has elapsed")
            .input(PinSpec::exec_in("Exec"))
            .input(PinSpec::data_in("Duration").with_default(1.0f32))
            .output(PinSpec::exec_out("Completed"))
            .output(PinSpec::data_out("Remaining")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::node::{NodeId, Overrides};
    use crate::nodes::builtin_registry;

    fn update_chain(type_id: &str, overrides: Overrides) -> (Graph, NodeId, NodeId) {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let update = graph.create_node(registry.get(ids::UPDATE).unwrap(), Overrides::new());
        let node = graph.create_node(registry.get(type_id).unwrap(), overrides);
        let print = graph.create_node(registry.get(ids::PRINT).unwrap(), Overrides::new().input(1, "fired"));
        graph.add_connection(update, 0, node, 0).unwrap();
        graph.add_connection(node, 0, print, 0).unwrap();
        (graph, node, print)
    }

    #[test]
    fn test_timer_accumulates_and_resets() {
        let (mut graph, timer, _) = update_chain(ids::TIMER, Overrides::new());

        graph.tick(0.25).unwrap();
        graph.tick(0.5).unwrap();
        assert_eq!(graph.node(timer).unwrap().output::<f32>(1, 0.0), 0.75);

        graph.set_input_value(timer, 1, true).unwrap();
        graph.tick(0.5).unwrap();
        assert_eq!(graph.node(timer).unwrap().output::<f32>(1, -1.0), 0.0);
    }

    #[test]
    fn test_delay_fires_once_per_duration() {
        let (mut graph, delay, _) = update_chain(ids::DELAY, Overrides::new().input(1, 1.0f32));

        let fired: Vec<usize> = (0..8)
            .map(|_| graph.tick(0.25).unwrap().printed.len())
            .collect();
        assert_eq!(fired, vec![0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(graph.node(delay).unwrap().output::<f32>(1, -1.0), 0.0);
    }

    #[test]
    fn test_delay_reports_remaining() {
        let (mut graph, delay, _) = update_chain(ids::DELAY, Overrides::new().input(1, 2.0f32));
        graph.tick(0.5).unwrap();
        assert_eq!(graph.node(delay).unwrap().output::<f32>(1, 0.0), 1.5);
    }
}
