// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed connection from an output pin to an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from_node: NodeId,
    /// Source output pin index
    pub from_pin: usize,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input pin index
    pub to_pin: usize,
}

impl Connection {
    /// Create a new connection
    pub fn new(from_node: NodeId, from_pin: usize, to_node: NodeId, to_pin: usize) -> Self {
        Self {
            from_node,
            from_pin,
            to_node,
            to_pin,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection is attached to a pin.
    ///
    /// `is_input` selects the target side, otherwise the source side.
    pub fn touches_pin(&self, node_id: NodeId, pin: usize, is_input: bool) -> bool {
        if is_input {
            self.to_node == node_id && self.to_pin == pin
        } else {
            self.from_node == node_id && self.from_pin == pin
        }
    }
}
