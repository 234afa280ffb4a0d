// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end graph scenarios
//!
//! Exercises connection rules, default restoration, propagation and exec
//! ordering through the public API only.

use nodeflow_graph::nodes::{builtin_registry, ids};
use nodeflow_graph::{
    Connection, ConnectionError, ExecContext, ExecEvent, ExecFlow, Graph, NodeCategory,
    NodeDefinition, NodeId, NodeInstance, NodeRegistry, Overrides, PinSpec, Value,
};
use std::sync::{Arc, Mutex};

fn spawn(graph: &mut Graph, registry: &NodeRegistry, type_id: &str, overrides: Overrides) -> NodeId {
    graph.create_node(registry.get(type_id).expect("built-in node type"), overrides)
}

/// Exec pass-through node that records its id into `log` when run
fn recorder(log: Arc<Mutex<Vec<NodeId>>>) -> Arc<NodeDefinition> {
    Arc::new(
        NodeDefinition::new(
            "recorder",
            "Recorder",
            NodeCategory::Custom,
            move |node: &mut NodeInstance, _ctx: &mut ExecContext| {
                log.lock().unwrap().push(node.id());
                ExecFlow::Continue
            },
        )
        .input(PinSpec::exec_in("Exec"))
        .output(PinSpec::exec_out("Exec")),
    )
}

mod connection_rules {
    use super::*;

    #[test]
    fn test_single_writer_per_input() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let a = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new());
        let b = spawn(&mut graph, &registry, ids::STRING, Overrides::new());
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());

        graph.add_connection(a, 0, print, 1).unwrap();
        for source in [a, b] {
            assert!(matches!(
                graph.add_connection(source, 0, print, 1),
                Err(ConnectionError::InputOccupied { node, pin: 1 }) if node == print
            ));
        }
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected_for_matching_pins() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let add = spawn(&mut graph, &registry, "add", Overrides::new());

        // exec -> exec and data -> data on the same node
        for (from_pin, to_pin) in [(0, 0), (1, 1), (1, 2)] {
            assert!(matches!(
                graph.add_connection(add, from_pin, add, to_pin),
                Err(ConnectionError::SelfLoop(node)) if node == add
            ));
        }
        // Mixed pin kinds fail the earlier kind check
        assert!(matches!(
            graph.add_connection(add, 0, add, 1),
            Err(ConnectionError::KindMismatch { .. })
        ));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_cascade_delete_keeps_other_connections() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let start = spawn(&mut graph, &registry, ids::START, Overrides::new());
        let first = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());
        let second = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());
        let text = spawn(&mut graph, &registry, ids::STRING, Overrides::new().output(0, "hi"));

        graph.add_connection(start, 0, first, 0).unwrap();
        graph.add_connection(first, 0, second, 0).unwrap();
        graph.add_connection(text, 0, first, 1).unwrap();
        let kept = graph.add_connection(text, 0, second, 1).unwrap();

        graph.delete_node(first).unwrap();

        assert!(graph.node(first).is_none());
        assert!(graph.connections().iter().all(|c| !c.involves_node(first)));
        assert_eq!(graph.connections(), &[kept]);
        assert_eq!(kept, Connection::new(text, 0, second, 1));
    }
}

mod values {
    use super::*;

    #[test]
    fn test_default_restored_after_disconnect() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let number = spawn(&mut graph, &registry, ids::INT, Overrides::new().output(0, 42));
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());

        graph.add_connection(number, 0, print, 1).unwrap();
        graph.propagate();
        assert_eq!(graph.node(print).unwrap().input_value(1), Some(&Value::Int(42)));

        assert_eq!(graph.remove_connections_on_pin(print, 1, true).unwrap(), 1);
        assert_eq!(
            graph.node(print).unwrap().input_value(1),
            Some(&Value::from("Hello World"))
        );
    }

    #[test]
    fn test_output_side_disconnect_keeps_downstream_value() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let float = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 2.5f32));
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());

        graph.add_connection(float, 0, print, 1).unwrap();
        assert_eq!(graph.remove_connections_on_pin(float, 0, false).unwrap(), 1);

        assert!(!graph.is_pin_connected(print, 1, true));
        assert_eq!(graph.node(print).unwrap().input_value(1), Some(&Value::Float(2.5)));
    }

    #[test]
    fn test_propagate_is_idempotent() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let a = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 2.0f32));
        let b = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 5.0f32));
        let add = spawn(&mut graph, &registry, "add", Overrides::new());
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());
        graph.add_connection(a, 0, add, 1).unwrap();
        graph.add_connection(b, 0, add, 2).unwrap();
        graph.add_connection(add, 1, print, 1).unwrap();

        let snapshot = |graph: &Graph| -> Vec<Vec<(usize, Value)>> {
            graph
                .nodes()
                .map(|n| {
                    let mut inputs: Vec<_> =
                        n.input_values().map(|(pin, v)| (pin, v.clone())).collect();
                    inputs.sort_by_key(|(pin, _)| *pin);
                    inputs
                })
                .collect()
        };

        graph.propagate();
        let once = snapshot(&graph);
        graph.propagate();
        assert_eq!(snapshot(&graph), once);
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_float_into_print_and_back() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let float = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 3.14f32));
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());

        graph.add_connection(float, 0, print, 1).unwrap();
        // Visible without a propagation pass
        assert_eq!(
            graph.node(print).unwrap().input_value(1),
            Some(&Value::Float(3.14))
        );

        graph.remove_connections_on_pin(print, 1, true).unwrap();
        let node = graph.node(print).unwrap();
        assert_eq!(node.input_value(1), Some(&Value::from("Hello World")));
        assert_eq!(node.input(1, String::new()), "Hello World");
        assert_eq!(node.input(1, -1.0f32), -1.0);
    }
}

mod execution {
    use super::*;

    #[test]
    fn test_exec_chain_runs_in_order_once() {
        let registry = builtin_registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        let definition = recorder(Arc::clone(&log));

        let mut graph = Graph::default();
        let start = spawn(&mut graph, &registry, ids::START, Overrides::new());
        let a = graph.create_node(Arc::clone(&definition), Overrides::new());
        let b = graph.create_node(definition, Overrides::new());
        graph.add_connection(start, 0, a, 0).unwrap();
        graph.add_connection(a, 0, b, 0).unwrap();

        graph.execute_graph().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_start_then_print_activation_trace() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let start = spawn(&mut graph, &registry, ids::START, Overrides::new());
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());
        graph.add_connection(start, 0, print, 0).unwrap();

        let report = graph.execute_graph().unwrap();
        assert_eq!(
            report.events,
            vec![
                ExecEvent::Activated(start),
                ExecEvent::Activated(print),
                ExecEvent::Deactivated(print),
                ExecEvent::Deactivated(start),
            ]
        );
        assert_eq!(report.printed, vec!["Hello World".to_string()]);
        assert!(graph.nodes().all(|n| !n.is_active()));
    }

    #[test]
    fn test_tick_propagates_before_running() {
        let registry = builtin_registry();
        let mut graph = Graph::default();
        let update = spawn(&mut graph, &registry, ids::UPDATE, Overrides::new());
        let a = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 1.5f32));
        let b = spawn(&mut graph, &registry, ids::FLOAT, Overrides::new().output(0, 2.0f32));
        let mul = spawn(&mut graph, &registry, "multiply", Overrides::new());
        let print = spawn(&mut graph, &registry, ids::PRINT, Overrides::new());
        graph.add_connection(update, 0, mul, 0).unwrap();
        graph.add_connection(mul, 0, print, 0).unwrap();
        graph.add_connection(a, 0, mul, 1).unwrap();
        graph.add_connection(b, 0, mul, 2).unwrap();
        graph.add_connection(mul, 1, print, 1).unwrap();

        // The product reaches Print on the following tick
        let first = graph.tick(0.1).unwrap();
        assert_eq!(first.printed, vec!["Hello World".to_string()]);
        let second = graph.tick(0.1).unwrap();
        assert_eq!(second.printed, vec!["3".to_string()]);
    }
}
