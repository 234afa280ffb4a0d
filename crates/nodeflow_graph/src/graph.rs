// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::config::EngineConfig;
use crate::connection::Connection;
use crate::node::{EntryPoint, NodeDefinition, NodeId, NodeInstance, Overrides};
use crate::pin::PinKind;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// A node graph
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    config: EngineConfig,
    /// Next node ID to hand out
    next_id: u64,
    /// Nodes in creation order
    pub(crate) nodes: IndexMap<NodeId, NodeInstance>,
    /// Connections in creation order
    pub(crate) connections: Vec<Connection>,
    /// Set by `request_start`, consumed by the next tick
    pub(crate) start_requested: bool,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, EngineConfig::default())
    }

    /// Create a new empty graph with a configuration
    pub fn with_config(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            config,
            next_id: 1,
            nodes: IndexMap::new(),
            connections: Vec::new(),
            start_requested: false,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a node from a definition
    pub fn create_node(&mut self, definition: Arc<NodeDefinition>, overrides: Overrides) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        tracing::debug!("Creating node {} ({})", id, definition.type_id);
        self.nodes.insert(id, NodeInstance::new(id, definition, overrides));
        id
    }

    /// Remove a node and its connections
    pub fn delete_node(&mut self, node_id: NodeId) -> Result<NodeInstance, GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        self.remove_connections_where(|c| c.involves_node(node_id), true);
        tracing::debug!("Deleting node {}", node_id);
        // Keep creation order for the remaining nodes
        self.nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&NodeInstance> {
        self.nodes.get(&node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut NodeInstance> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeInstance> {
        self.nodes.values()
    }

    /// Get all node IDs in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get nodes whose definition is marked with `entry`, in creation order
    pub fn entry_nodes(&self, entry: EntryPoint) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .values()
            .filter(move |n| n.definition().entry == Some(entry))
            .map(NodeInstance::id)
    }

    /// Connect an output pin to an input pin.
    ///
    /// Checks run in order: node existence, pin bounds, pin kind, self-loop,
    /// occupied input, and (if configured) exec cycles. The graph is left
    /// untouched when a check fails.
    ///
    /// The first failing check wins, so a same-node connection between an
    /// exec pin and a data pin reports `KindMismatch` rather than `SelfLoop`.
    /// Any same-node connection with matching pin kinds is a `SelfLoop`.
    pub fn add_connection(
        &mut self,
        from_node: NodeId,
        from_pin: usize,
        to_node: NodeId,
        to_pin: usize,
    ) -> Result<Connection, ConnectionError> {
        let source = self.nodes.get(&from_node)
            .ok_or(ConnectionError::UnknownNode(from_node))?;
        let target = self.nodes.get(&to_node)
            .ok_or(ConnectionError::UnknownNode(to_node))?;

        let source_kind = source.definition().output_pin(from_pin)
            .ok_or(ConnectionError::InvalidIndex { node: from_node, pin: from_pin, is_input: false })?
            .kind;
        let target_kind = target.definition().input_pin(to_pin)
            .ok_or(ConnectionError::InvalidIndex { node: to_node, pin: to_pin, is_input: true })?
            .kind;

        if source_kind.is_exec() != target_kind.is_exec() {
            return Err(ConnectionError::KindMismatch { from: source_kind, to: target_kind });
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop(from_node));
        }

        // An input pin has a single writer
        if self.connection_to(to_node, to_pin).is_some() {
            return Err(ConnectionError::InputOccupied { node: to_node, pin: to_pin });
        }

        if source_kind.is_exec()
            && self.config.reject_exec_cycles
            && self.has_exec_path(to_node, from_node)
        {
            return Err(ConnectionError::WouldCreateCycle { from: from_node, to: to_node });
        }

        let eager_value = if source_kind == PinKind::DataOut && self.config.eager_connect_sync {
            source.output_value(from_pin).cloned()
        } else {
            None
        };

        let connection = Connection::new(from_node, from_pin, to_node, to_pin);
        self.connections.push(connection);

        if let Some(value) = eager_value {
            if let Some(target) = self.nodes.get_mut(&to_node) {
                target.set_input(to_pin, value);
            }
        }

        tracing::debug!(
            "Connected {}:{} -> {}:{}",
            from_node, from_pin, to_node, to_pin
        );
        Ok(connection)
    }

    /// Remove every connection attached to one pin.
    ///
    /// Only input-side removal restores the input to its default snapshot;
    /// inputs downstream of an output pin keep their last value.
    /// Returns the number of removed connections.
    pub fn remove_connections_on_pin(
        &mut self,
        node_id: NodeId,
        pin: usize,
        is_input: bool,
    ) -> Result<usize, GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        Ok(self.remove_connections_where(|c| c.touches_pin(node_id, pin, is_input), is_input))
    }

    /// Remove every connection touching a node.
    ///
    /// Every data input that loses its writer is restored, on this node and
    /// downstream of it. Returns the number of removed connections.
    pub fn remove_all_connections(&mut self, node_id: NodeId) -> Result<usize, GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        Ok(self.remove_connections_where(|c| c.involves_node(node_id), true))
    }

    /// Remove matching connections, keeping the order of the rest. With
    /// `restore`, every data input that lost its writer is reset.
    fn remove_connections_where(
        &mut self,
        predicate: impl Fn(&Connection) -> bool,
        restore: bool,
    ) -> usize {
        let (removed, kept): (Vec<Connection>, Vec<Connection>) =
            std::mem::take(&mut self.connections)
                .into_iter()
                .partition(|c| predicate(c));
        self.connections = kept;

        if restore {
            for connection in &removed {
                let Some(target) = self.nodes.get_mut(&connection.to_node) else {
                    continue;
                };
                let is_data_input = target
                    .definition()
                    .input_pin(connection.to_pin)
                    .is_some_and(|pin| pin.kind == PinKind::DataIn);
                if is_data_input {
                    target.restore_input(connection.to_pin);
                }
            }
        }

        if !removed.is_empty() {
            tracing::debug!("Removed {} connection(s)", removed.len());
        }
        removed.len()
    }

    /// Set the value of a data input pin
    pub fn set_input_value(
        &mut self,
        node_id: NodeId,
        pin: usize,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let node = self.checked_pin(node_id, pin, true)?;
        node.set_input(pin, value.into());
        Ok(())
    }

    /// Set the value of a data output pin
    pub fn set_output_value(
        &mut self,
        node_id: NodeId,
        pin: usize,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let node = self.checked_pin(node_id, pin, false)?;
        node.set_output(pin, value);
        Ok(())
    }

    fn checked_pin(
        &mut self,
        node_id: NodeId,
        pin: usize,
        is_input: bool,
    ) -> Result<&mut NodeInstance, GraphError> {
        let node = self.nodes.get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let spec = node.definition().pin(pin, is_input)
            .ok_or(GraphError::InvalidPin { node: node_id, pin })?;
        if !spec.kind.is_data() {
            return Err(GraphError::NotDataPin { node: node_id, pin });
        }
        Ok(node)
    }

    /// Move a node in the editor
    pub fn set_node_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        Ok(())
    }

    /// Get all connections in creation order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get connections leaving an output pin
    pub fn connections_from(&self, node_id: NodeId, pin: usize) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches_pin(node_id, pin, false))
    }

    /// Get the connection writing to an input pin
    pub fn connection_to(&self, node_id: NodeId, pin: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.touches_pin(node_id, pin, true))
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Check whether a pin has any connection
    pub fn is_pin_connected(&self, node_id: NodeId, pin: usize, is_input: bool) -> bool {
        self.connections.iter().any(|c| c.touches_pin(node_id, pin, is_input))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Kind of the source pin of a connection
    pub(crate) fn source_kind(&self, connection: &Connection) -> Option<PinKind> {
        self.nodes
            .get(&connection.from_node)?
            .definition()
            .output_pin(connection.from_pin)
            .map(|pin| pin.kind)
    }

    /// Check if `to` is reachable from `from` along exec connections
    pub fn has_exec_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(node_id) = stack.pop() {
            if node_id == to {
                return true;
            }
            if !visited.insert(node_id) {
                continue;
            }
            for connection in self.connections.iter().filter(|c| c.from_node == node_id) {
                if self.source_kind(connection) == Some(PinKind::ExecOut) {
                    stack.push(connection.to_node);
                }
            }
        }

        false
    }

    /// Apply a mutation queued during an execution pass
    pub fn apply_command(&mut self, command: GraphCommand) -> Result<(), GraphError> {
        match command {
            GraphCommand::CreateNode { definition, overrides } => {
                self.create_node(definition, overrides);
            }
            GraphCommand::DeleteNode(node_id) => {
                self.delete_node(node_id)?;
            }
            GraphCommand::AddConnection { from_node, from_pin, to_node, to_pin } => {
                self.add_connection(from_node, from_pin, to_node, to_pin)?;
            }
            GraphCommand::RemoveConnectionsOnPin { node, pin, is_input } => {
                self.remove_connections_on_pin(node, pin, is_input)?;
            }
            GraphCommand::RemoveAllConnections(node_id) => {
                self.remove_all_connections(node_id)?;
            }
            GraphCommand::SetOutputValue { node, pin, value } => {
                self.set_output_value(node, pin, value)?;
            }
        }
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Graph mutation deferred until the running pass completes
#[derive(Debug, Clone)]
pub enum GraphCommand {
    /// Create a node
    CreateNode {
        /// Definition to instantiate
        definition: Arc<NodeDefinition>,
        /// Initial values
        overrides: Overrides,
    },
    /// Delete a node
    DeleteNode(NodeId),
    /// Add a connection
    AddConnection {
        /// Source node
        from_node: NodeId,
        /// Source output pin
        from_pin: usize,
        /// Target node
        to_node: NodeId,
        /// Target input pin
        to_pin: usize,
    },
    /// Remove connections on one pin
    RemoveConnectionsOnPin {
        /// Node owning the pin
        node: NodeId,
        /// Pin index
        pin: usize,
        /// Input side if true, output side otherwise
        is_input: bool,
    },
    /// Remove every connection touching a node
    RemoveAllConnections(NodeId),
    /// Write a data output on another node
    SetOutputValue {
        /// Target node
        node: NodeId,
        /// Output pin
        pin: usize,
        /// New value
        value: Value,
    },
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Pin index out of range
    #[error("Invalid pin index {pin} on node {node} (input side: {is_input})")]
    InvalidIndex {
        /// Node addressed
        node: NodeId,
        /// Pin index
        pin: usize,
        /// Input side if true
        is_input: bool,
    },

    /// Exec pin wired to data pin or vice versa
    #[error("Cannot connect {from:?} pin to {to:?} pin")]
    KindMismatch {
        /// Source pin kind
        from: PinKind,
        /// Target pin kind
        to: PinKind,
    },

    /// Self-loop not allowed
    #[error("Self-loop not allowed on node {0}")]
    SelfLoop(NodeId),

    /// Input pin already has a writer
    #[error("Input pin {pin} on node {node} is already connected")]
    InputOccupied {
        /// Target node
        node: NodeId,
        /// Target pin
        pin: usize,
    },

    /// Exec connection would close a cycle
    #[error("Exec connection {from} -> {to} would create a cycle")]
    WouldCreateCycle {
        /// Source node
        from: NodeId,
        /// Target node
        to: NodeId,
    },
}

/// Error from graph mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Pin index out of range
    #[error("Invalid pin {pin} on node {node}")]
    InvalidPin {
        /// Node addressed
        node: NodeId,
        /// Pin index
        pin: usize,
    },

    /// Exec pins hold no value
    #[error("Pin {pin} on node {node} is not a data pin")]
    NotDataPin {
        /// Node addressed
        node: NodeId,
        /// Pin index
        pin: usize,
    },

    /// Connection rejected
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{ExecContext, ExecFlow};
    use crate::node::NodeCategory;
    use crate::pin::PinSpec;

    fn noop(_: &mut NodeInstance, _: &mut ExecContext) -> ExecFlow {
        ExecFlow::Continue
    }

    /// Exec in/out plus one data in/out
    fn relay() -> Arc<NodeDefinition> {
        Arc::new(
            NodeDefinition::new("relay", "Relay", NodeCategory::Utility, noop)
                .input(PinSpec::exec_in("Exec"))
                .input(PinSpec::data_in("In").with_default(1.0f32))
                .output(PinSpec::exec_out("Exec"))
                .output(PinSpec::data_out("Out").with_default(2.0f32)),
        )
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());
        graph.delete_node(b).unwrap();
        let c = graph.create_node(relay(), Overrides::new());

        assert!(a < b && b < c);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_connection_validation_order() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());

        assert_eq!(
            graph.add_connection(NodeId(99), 0, b, 0),
            Err(ConnectionError::UnknownNode(NodeId(99)))
        );
        assert_eq!(
            graph.add_connection(a, 5, b, 0),
            Err(ConnectionError::InvalidIndex { node: a, pin: 5, is_input: false })
        );
        assert_eq!(
            graph.add_connection(a, 0, b, 1),
            Err(ConnectionError::KindMismatch { from: PinKind::ExecOut, to: PinKind::DataIn })
        );
        // Kind mismatch is checked before self-loop
        assert!(matches!(
            graph.add_connection(a, 1, a, 0),
            Err(ConnectionError::KindMismatch { .. })
        ));
        assert_eq!(graph.add_connection(a, 1, a, 1), Err(ConnectionError::SelfLoop(a)));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_eager_sync_on_connect() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());

        graph.add_connection(a, 1, b, 1).unwrap();
        assert_eq!(graph.node(b).unwrap().input::<f32>(1, 0.0), 2.0);
    }

    #[test]
    fn test_eager_sync_disabled() {
        let config = EngineConfig { eager_connect_sync: false, ..EngineConfig::default() };
        let mut graph = Graph::with_config("g", config);
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());

        graph.add_connection(a, 1, b, 1).unwrap();
        assert_eq!(graph.node(b).unwrap().input::<f32>(1, 0.0), 1.0);
    }

    #[test]
    fn test_output_side_removal_keeps_downstream_inputs() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());
        let c = graph.create_node(relay(), Overrides::new());
        graph.add_connection(a, 1, b, 1).unwrap();
        graph.add_connection(a, 1, c, 1).unwrap();

        assert_eq!(graph.remove_connections_on_pin(a, 1, false), Ok(2));
        // Last synced value survives; only input-side removal restores
        assert_eq!(graph.node(b).unwrap().input_value(1), Some(&Value::Float(2.0)));
        assert_eq!(graph.node(c).unwrap().input_value(1), Some(&Value::Float(2.0)));
        assert!(!graph.is_pin_connected(a, 1, false));

        graph.add_connection(a, 1, b, 1).unwrap();
        assert_eq!(graph.remove_connections_on_pin(b, 1, true), Ok(1));
        assert_eq!(graph.node(b).unwrap().input_value(1), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_remove_all_connections_restores_inputs() {
        let mixer = Arc::new(
            NodeDefinition::new("mixer", "Mixer", NodeCategory::Utility, noop)
                .input(PinSpec::exec_in("Exec"))
                .input(PinSpec::data_in("Gain").with_default(1.0f32))
                .input(PinSpec::data_in("Bias"))
                .output(PinSpec::exec_out("Exec")),
        );
        let mut graph = Graph::default();
        let source = graph.create_node(relay(), Overrides::new());
        let m = graph.create_node(mixer, Overrides::new());
        graph.add_connection(source, 1, m, 1).unwrap();
        graph.add_connection(source, 1, m, 2).unwrap();
        graph.add_connection(source, 0, m, 0).unwrap();
        assert_eq!(graph.node(m).unwrap().input_value(2), Some(&Value::Float(2.0)));

        assert_eq!(graph.remove_all_connections(m), Ok(3));
        let node = graph.node(m).unwrap();
        assert_eq!(node.input_value(1), Some(&Value::Float(1.0)));
        assert_eq!(node.input_value(2), None);
        assert_eq!(node.input::<f32>(2, -1.0), -1.0);
        // The source side is untouched
        assert_eq!(graph.node(source).unwrap().output_value(1), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_remove_all_connections_preserves_order() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());
        let c = graph.create_node(relay(), Overrides::new());
        let first = graph.add_connection(a, 0, c, 0).unwrap();
        graph.add_connection(b, 1, a, 1).unwrap();
        let last = graph.add_connection(b, 0, a, 0).unwrap();
        graph.add_connection(a, 1, b, 1).unwrap();
        let kept = graph.add_connection(b, 1, c, 1).unwrap();

        assert_eq!(graph.remove_all_connections(a), Ok(4));
        assert_eq!(graph.connections(), &[kept]);
        assert!(!graph.connections().contains(&first));
        assert!(!graph.connections().contains(&last));
    }

    #[test]
    fn test_unknown_node_is_noop() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());
        graph.add_connection(a, 0, b, 0).unwrap();

        let missing = NodeId(42);
        assert_eq!(graph.delete_node(missing).err(), Some(GraphError::NodeNotFound(missing)));
        assert_eq!(graph.remove_all_connections(missing), Err(GraphError::NodeNotFound(missing)));
        assert_eq!(
            graph.remove_connections_on_pin(missing, 0, true),
            Err(GraphError::NodeNotFound(missing))
        );
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_set_values() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());

        graph.set_output_value(a, 1, 5.0f32).unwrap();
        graph.set_input_value(a, 1, 6.0f32).unwrap();
        let node = graph.node(a).unwrap();
        assert_eq!(node.output::<f32>(1, 0.0), 5.0);
        assert_eq!(node.input::<f32>(1, 0.0), 6.0);

        assert_eq!(
            graph.set_input_value(a, 0, 1.0f32),
            Err(GraphError::NotDataPin { node: a, pin: 0 })
        );
        assert_eq!(
            graph.set_output_value(a, 9, 1.0f32),
            Err(GraphError::InvalidPin { node: a, pin: 9 })
        );
    }

    #[test]
    fn test_reject_exec_cycles() {
        let config = EngineConfig { reject_exec_cycles: true, ..EngineConfig::default() };
        let mut graph = Graph::with_config("g", config);
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());
        let c = graph.create_node(relay(), Overrides::new());

        graph.add_connection(a, 0, b, 0).unwrap();
        graph.add_connection(b, 0, c, 0).unwrap();
        assert!(graph.has_exec_path(a, c));
        assert_eq!(
            graph.add_connection(c, 0, a, 0),
            Err(ConnectionError::WouldCreateCycle { from: c, to: a })
        );
        // Data edges never count as cycles
        assert!(graph.add_connection(c, 1, a, 1).is_ok());
    }

    #[test]
    fn test_apply_command() {
        let mut graph = Graph::default();
        let a = graph.create_node(relay(), Overrides::new());
        let b = graph.create_node(relay(), Overrides::new());

        graph
            .apply_command(GraphCommand::AddConnection { from_node: a, from_pin: 0, to_node: b, to_pin: 0 })
            .unwrap();
        assert!(graph.is_pin_connected(b, 0, true));

        let err = graph.apply_command(GraphCommand::AddConnection {
            from_node: a,
            from_pin: 0,
            to_node: b,
            to_pin: 0,
        });
        assert_eq!(
            err,
            Err(GraphError::Connection(ConnectionError::InputOccupied { node: b, pin: 0 }))
        );

        graph.apply_command(GraphCommand::DeleteNode(a)).unwrap();
        assert_eq!(graph.connection_count(), 0);
    }
}
