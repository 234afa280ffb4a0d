// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation: data propagation and exec-flow execution.
//!
//! One tick is [`Graph::propagate`] followed by an execution pass. A pass
//! walks exec connections depth-first from its entry nodes, in connection
//! order, using an explicit worklist. A node reachable along two exec paths
//! runs twice; cycles are cut off by the depth and step limits from
//! [`EngineConfig`](crate::config::EngineConfig).
//!
//! Node behaviors cannot reach the graph while a pass is running. Mutations
//! they need are queued with [`ExecContext::defer`] and applied once the
//! pass completes.

use crate::graph::{Graph, GraphCommand};
use crate::node::{EntryPoint, NodeId};
use crate::pin::PinKind;
use crate::value::Value;
use std::sync::Arc;

/// Which exec outputs fire after a node executes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecFlow {
    /// Follow every exec output
    #[default]
    Continue,
    /// Follow only the listed exec output pins
    Pins(Vec<usize>),
    /// Follow no exec output
    Halt,
}

impl ExecFlow {
    /// Follow a single exec output pin
    pub fn pin(pin: usize) -> Self {
        Self::Pins(vec![pin])
    }

    fn fires(&self, pin: usize) -> bool {
        match self {
            Self::Continue => true,
            Self::Pins(pins) => pins.contains(&pin),
            Self::Halt => false,
        }
    }
}

/// Per-pass context handed to node behaviors
#[derive(Debug, Default)]
pub struct ExecContext {
    delta_time: f32,
    printed: Vec<String>,
    commands: Vec<GraphCommand>,
}

impl ExecContext {
    /// Create a context for a pass
    pub fn new(delta_time: f32) -> Self {
        Self {
            delta_time,
            ..Self::default()
        }
    }

    /// Seconds since the previous tick
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Emit a line of program output
    pub fn print(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "nodeflow::print", "{}", line);
        self.printed.push(line);
    }

    /// Queue a graph mutation to run after the pass
    pub fn defer(&mut self, command: GraphCommand) {
        self.commands.push(command);
    }
}

/// Observable node state change during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecEvent {
    /// Node became active and its behavior ran
    Activated(NodeId),
    /// Node and everything it triggered finished
    Deactivated(NodeId),
}

/// Result of an execution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    /// Activation trace in order
    pub events: Vec<ExecEvent>,
    /// Lines emitted by print nodes
    pub printed: Vec<String>,
    /// Deferred commands applied after the pass
    pub applied_commands: usize,
}

impl ExecutionReport {
    /// Nodes in the order their behaviors ran
    pub fn executed(&self) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ExecEvent::Activated(id) => Some(*id),
                ExecEvent::Deactivated(_) => None,
            })
            .collect()
    }

    /// Whether nothing ran
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Error during an execution pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// Exec nesting exceeded the configured depth
    #[error("Exec depth {depth} exceeded at node {node}; the exec graph likely contains a cycle")]
    CycleDetected {
        /// Node that would have run
        node: NodeId,
        /// Depth reached
        depth: usize,
    },

    /// Too many node executions in one pass
    #[error("Execution pass exceeded {0} node executions")]
    StepBudgetExceeded(usize),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

enum Frame {
    Enter { node: NodeId, depth: usize },
    Exit(NodeId),
}

impl Graph {
    /// Copy every data output into the inputs connected to it.
    ///
    /// Returns the number of values copied.
    pub fn propagate(&mut self) -> usize {
        let writes: Vec<(NodeId, usize, Value)> = self
            .connections
            .iter()
            .filter(|c| self.source_kind(c) == Some(PinKind::DataOut))
            .filter_map(|c| {
                let value = self.nodes.get(&c.from_node)?.output_value(c.from_pin)?;
                Some((c.to_node, c.to_pin, value.clone()))
            })
            .collect();

        let copied = writes.len();
        for (node_id, pin, value) in writes {
            if let Some(target) = self.node_mut(node_id) {
                target.set_input(pin, value);
            }
        }
        copied
    }

    /// Run the graph from its Start node.
    ///
    /// Does nothing when the graph has no Start node.
    pub fn execute_graph(&mut self) -> Result<ExecutionReport, ExecutionError> {
        let starts: Vec<NodeId> = self.entry_nodes(EntryPoint::Start).collect();
        let Some(&entry) = starts.first() else {
            return Ok(ExecutionReport::default());
        };
        if starts.len() > 1 {
            tracing::warn!("Graph '{}' has several Start nodes; using {}", self.name, entry);
        }
        self.run_pass(&[entry], 0.0)
    }

    /// Run every entry node of one kind, in creation order
    pub fn execute_event(
        &mut self,
        entry: EntryPoint,
        delta_time: f32,
    ) -> Result<ExecutionReport, ExecutionError> {
        let entries: Vec<NodeId> = self.entry_nodes(entry).collect();
        self.run_pass(&entries, delta_time)
    }

    /// Run one node and everything its exec outputs reach
    pub fn execute_from(
        &mut self,
        node_id: NodeId,
        delta_time: f32,
    ) -> Result<ExecutionReport, ExecutionError> {
        if self.node(node_id).is_none() {
            return Err(ExecutionError::NodeNotFound(node_id));
        }
        self.run_pass(&[node_id], delta_time)
    }

    /// Ask the next tick to run the Start node
    pub fn request_start(&mut self) {
        self.start_requested = true;
    }

    /// Run one evaluation tick.
    ///
    /// Propagates data, then runs the Start node if a start was requested
    /// since the last tick, then every Update node.
    pub fn tick(&mut self, delta_time: f32) -> Result<ExecutionReport, ExecutionError> {
        self.propagate();

        let mut entries = Vec::new();
        if std::mem::take(&mut self.start_requested) {
            entries.extend(self.entry_nodes(EntryPoint::Start).next());
        }
        entries.extend(self.entry_nodes(EntryPoint::Update));

        self.run_pass(&entries, delta_time)
    }

    fn run_pass(
        &mut self,
        entries: &[NodeId],
        delta_time: f32,
    ) -> Result<ExecutionReport, ExecutionError> {
        let max_depth = self.config().max_exec_depth;
        let max_steps = self.config().max_exec_steps;

        let mut ctx = ExecContext::new(delta_time);
        let mut report = ExecutionReport::default();
        let mut outcome = Ok(());
        let mut steps = 0usize;
        let mut stack: Vec<Frame> = entries
            .iter()
            .rev()
            .map(|&node| Frame::Enter { node, depth: 0 })
            .collect();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Exit(node_id) => {
                    if let Some(node) = self.node_mut(node_id) {
                        node.set_active(false);
                    }
                    report.events.push(ExecEvent::Deactivated(node_id));
                }
                Frame::Enter { node: node_id, depth } => {
                    if depth > max_depth {
                        outcome = Err(ExecutionError::CycleDetected { node: node_id, depth });
                        break;
                    }
                    steps += 1;
                    if steps > max_steps {
                        outcome = Err(ExecutionError::StepBudgetExceeded(max_steps));
                        break;
                    }

                    let Some(node) = self.node_mut(node_id) else {
                        tracing::warn!("Skipping missing node {}", node_id);
                        continue;
                    };
                    node.set_active(true);
                    report.events.push(ExecEvent::Activated(node_id));

                    let definition = Arc::clone(node.definition());
                    let flow = definition.behavior().execute(node, &mut ctx);

                    stack.push(Frame::Exit(node_id));
                    // Snapshot before descending
                    let targets = self.exec_targets(node_id, &flow);
                    stack.extend(
                        targets
                            .into_iter()
                            .rev()
                            .map(|node| Frame::Enter { node, depth: depth + 1 }),
                    );
                }
            }
        }

        if let Err(err) = &outcome {
            tracing::warn!("Execution pass on '{}' aborted: {}", self.name, err);
            for node in self.nodes.values_mut() {
                node.set_active(false);
            }
        }

        for command in std::mem::take(&mut ctx.commands) {
            match self.apply_command(command) {
                Ok(()) => report.applied_commands += 1,
                Err(err) => tracing::warn!("Deferred graph command failed: {}", err),
            }
        }

        report.printed = ctx.printed;
        outcome.map(|()| report)
    }

    /// Targets of the exec connections leaving `node_id` that `flow` fires,
    /// in connection order
    fn exec_targets(&self, node_id: NodeId, flow: &ExecFlow) -> Vec<NodeId> {
        self.connections
            .iter()
            .filter(|c| c.from_node == node_id && flow.fires(c.from_pin))
            .filter(|c| self.source_kind(c) == Some(PinKind::ExecOut))
            .map(|c| c.to_node)
            .collect()
    }
}
