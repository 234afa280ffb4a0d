// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual node-graph engine.
//!
//! Small programs are assembled from nodes with typed pins and run by a
//! hybrid control-flow/data-flow model:
//! - Data pins carry [`Value`]s, copied along connections by
//!   [`Graph::propagate`] once per tick
//! - Exec pins sequence side effects; [`Graph::execute_graph`] walks them
//!   depth-first from the Start node
//!
//! ## Architecture
//!
//! The engine is built on:
//! - Immutable [`NodeDefinition`]s, shared from a [`NodeRegistry`]
//! - Live [`NodeInstance`]s owned by a [`Graph`]
//! - Connection validation (single writer per input, no self-loops, exec
//!   to exec and data to data only)
//! - A worklist executor with depth and step limits
//! - A built-in catalog in [`nodes`]
//!
//! ```
//! use nodeflow_graph::nodes::{builtin_registry, ids};
//! use nodeflow_graph::{Graph, Overrides};
//!
//! let registry = builtin_registry();
//! let mut graph = Graph::default();
//! let start = graph.create_node(registry.get(ids::START).unwrap(), Overrides::new());
//! let print = graph.create_node(registry.get(ids::PRINT).unwrap(), Overrides::new());
//! graph.add_connection(start, 0, print, 0).unwrap();
//!
//! let report = graph.execute_graph().unwrap();
//! assert_eq!(report.printed, vec!["Hello World".to_string()]);
//! ```

pub mod config;
pub mod connection;
pub mod evaluation;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod pin;
pub mod shared;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use connection::Connection;
pub use evaluation::{ExecContext, ExecEvent, ExecFlow, ExecutionError, ExecutionReport};
pub use graph::{ConnectionError, Graph, GraphCommand, GraphError};
pub use node::{
    EntryPoint, NodeBehavior, NodeCategory, NodeDefinition, NodeId, NodeInstance, NodeRegistry,
    Overrides,
};
pub use pin::{PinKind, PinSpec};
pub use shared::SharedGraph;
pub use value::{FromValue, Value, ValueType};
