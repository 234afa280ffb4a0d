// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and live node instances.

use crate::evaluation::{ExecContext, ExecFlow};
use crate::pin::{PinKind, PinSpec};
use crate::value::{FromValue, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a node.
///
/// Assigned by the owning graph from a monotonic counter; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node category (presentation only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Event nodes (start, update)
    Event,
    /// Constant values
    Literal,
    /// Scalar math
    Math,
    /// Trigonometry
    Trigonometry,
    /// Vector algebra
    Vector,
    /// Matrix construction and products
    Matrix,
    /// Timers and delays
    Time,
    /// Flow control
    Flow,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// Marks a definition as a place where an execution pass may begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    /// Runs once when the graph is started
    Start,
    /// Runs every tick
    Update,
}

/// Behavior invoked when a node executes
pub trait NodeBehavior: Send + Sync {
    /// Read inputs, write outputs and local state, and choose which exec
    /// outputs fire.
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow;
}

impl<F> NodeBehavior for F
where
    F: Fn(&mut NodeInstance, &mut ExecContext) -> ExecFlow + Send + Sync,
{
    fn execute(&self, node: &mut NodeInstance, ctx: &mut ExecContext) -> ExecFlow {
        self(node, ctx)
    }
}

/// Node template
pub struct NodeDefinition {
    /// Unique type identifier
    pub type_id: String,
    /// Display title
    pub title: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Input pins
    pub inputs: Vec<PinSpec>,
    /// Output pins
    pub outputs: Vec<PinSpec>,
    /// Entry point marker
    pub entry: Option<EntryPoint>,
    behavior: Arc<dyn NodeBehavior>,
}

impl NodeDefinition {
    /// Create a new definition with no pins
    pub fn new(
        type_id: impl Into<String>,
        title: impl Into<String>,
        category: NodeCategory,
        behavior: impl NodeBehavior + 'static,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            title: title.into(),
            category,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            entry: None,
            behavior: Arc::new(behavior),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an input pin.
    ///
    /// Only `ExecIn` and `DataIn` pins belong on the input side.
    pub fn input(mut self, pin: PinSpec) -> Self {
        debug_assert!(pin.kind.is_input(), "'{}' is not an input pin", pin.name);
        self.inputs.push(pin);
        self
    }

    /// Append an output pin
    pub fn output(mut self, pin: PinSpec) -> Self {
        debug_assert!(pin.kind.is_output(), "'{}' is not an output pin", pin.name);
        self.outputs.push(pin);
        self
    }

    /// Mark as an entry point
    pub fn entry_point(mut self, entry: EntryPoint) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Get the behavior
    pub fn behavior(&self) -> &Arc<dyn NodeBehavior> {
        &self.behavior
    }

    /// Get an input pin by index
    pub fn input_pin(&self, index: usize) -> Option<&PinSpec> {
        self.inputs.get(index)
    }

    /// Get an output pin by index
    pub fn output_pin(&self, index: usize) -> Option<&PinSpec> {
        self.outputs.get(index)
    }

    /// Get a pin by index and side
    pub fn pin(&self, index: usize, is_input: bool) -> Option<&PinSpec> {
        if is_input {
            self.input_pin(index)
        } else {
            self.output_pin(index)
        }
    }
}

impl fmt::Debug for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDefinition")
            .field("type_id", &self.type_id)
            .field("title", &self.title)
            .field("category", &self.category)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Explicit initial values used when creating a node
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    inputs: Vec<(usize, Value)>,
    outputs: Vec<(usize, Value)>,
}

impl Overrides {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the initial value of a data input pin
    pub fn input(mut self, pin: usize, value: impl Into<Value>) -> Self {
        self.inputs.push((pin, value.into()));
        self
    }

    /// Override the initial value of a data output pin
    pub fn output(mut self, pin: usize, value: impl Into<Value>) -> Self {
        self.outputs.push((pin, value.into()));
        self
    }
}

/// A live node in a graph
#[derive(Debug, Clone)]
pub struct NodeInstance {
    id: NodeId,
    definition: Arc<NodeDefinition>,
    inputs: HashMap<usize, Value>,
    outputs: HashMap<usize, Value>,
    defaults: HashMap<usize, Value>,
    local_state: HashMap<String, Value>,
    active: bool,
    /// Position in the editor (presentation only)
    pub position: [f32; 2],
}

impl NodeInstance {
    /// Create a node, seeding pin values from defaults and overrides.
    ///
    /// The seeded input values become the node's default snapshot.
    pub(crate) fn new(id: NodeId, definition: Arc<NodeDefinition>, overrides: Overrides) -> Self {
        let mut inputs = seed_values(&definition.inputs, PinKind::DataIn);
        let mut outputs = seed_values(&definition.outputs, PinKind::DataOut);

        for (pin, value) in overrides.inputs {
            apply_override(&definition, &mut inputs, pin, value, true);
        }
        for (pin, value) in overrides.outputs {
            apply_override(&definition, &mut outputs, pin, value, false);
        }

        Self {
            id,
            defaults: inputs.clone(),
            definition,
            inputs,
            outputs,
            local_state: HashMap::new(),
            active: false,
            position: [0.0, 0.0],
        }
    }

    /// Get the node ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the definition
    pub fn definition(&self) -> &Arc<NodeDefinition> {
        &self.definition
    }

    /// Get the display title
    pub fn title(&self) -> &str {
        &self.definition.title
    }

    /// Get the category
    pub fn category(&self) -> NodeCategory {
        self.definition.category
    }

    /// Whether the node is currently executing
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Read an input as `T`, falling back when unset or of another type
    pub fn input<T: FromValue>(&self, pin: usize, fallback: T) -> T {
        match self.inputs.get(&pin) {
            Some(value) => value.read_as(fallback),
            None => fallback,
        }
    }

    /// Get the raw input value
    pub fn input_value(&self, pin: usize) -> Option<&Value> {
        self.inputs.get(&pin)
    }

    /// Get the raw output value
    pub fn output_value(&self, pin: usize) -> Option<&Value> {
        self.outputs.get(&pin)
    }

    /// Read an output as `T`, falling back when unset or of another type
    pub fn output<T: FromValue>(&self, pin: usize, fallback: T) -> T {
        match self.outputs.get(&pin) {
            Some(value) => value.read_as(fallback),
            None => fallback,
        }
    }

    /// Write an output value
    pub fn set_output(&mut self, pin: usize, value: impl Into<Value>) {
        self.outputs.insert(pin, value.into());
    }

    /// Get the default snapshot for an input pin
    pub fn default_value(&self, pin: usize) -> Option<&Value> {
        self.defaults.get(&pin)
    }

    /// Read a local state entry as `T`
    pub fn state<T: FromValue>(&self, key: &str, fallback: T) -> T {
        match self.local_state.get(key) {
            Some(value) => value.read_as(fallback),
            None => fallback,
        }
    }

    /// Write a local state entry
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.local_state.insert(key.into(), value.into());
    }

    /// Iterate over input values by pin index
    pub fn input_values(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.inputs.iter().map(|(pin, value)| (*pin, value))
    }

    /// Iterate over output values by pin index
    pub fn output_values(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.outputs.iter().map(|(pin, value)| (*pin, value))
    }

    pub(crate) fn set_input(&mut self, pin: usize, value: Value) {
        self.inputs.insert(pin, value);
    }

    /// Restore an input to its default snapshot, or clear it if it has none
    pub(crate) fn restore_input(&mut self, pin: usize) {
        match self.defaults.get(&pin) {
            Some(default) => {
                self.inputs.insert(pin, default.clone());
            }
            None => {
                self.inputs.remove(&pin);
            }
        }
    }
}

fn seed_values(pins: &[PinSpec], kind: PinKind) -> HashMap<usize, Value> {
    pins.iter()
        .enumerate()
        .filter(|(_, pin)| pin.kind == kind)
        .filter_map(|(index, pin)| pin.default.clone().map(|value| (index, value)))
        .collect()
}

fn apply_override(
    definition: &NodeDefinition,
    values: &mut HashMap<usize, Value>,
    pin: usize,
    value: Value,
    is_input: bool,
) {
    match definition.pin(pin, is_input) {
        Some(spec) if spec.kind.is_data() => {
            values.insert(pin, value);
        }
        _ => tracing::warn!(
            "Ignoring override for pin {} on '{}': not a data pin",
            pin,
            definition.type_id
        ),
    }
}

/// Registry of available node definitions
#[derive(Debug)]
pub struct NodeRegistry {
    /// Registered definitions by type ID
    definitions: indexmap::IndexMap<String, Arc<NodeDefinition>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            definitions: indexmap::IndexMap::new(),
        }
    }

    /// Register a definition
    pub fn register(&mut self, definition: NodeDefinition) {
        self.definitions
            .insert(definition.type_id.clone(), Arc::new(definition));
    }

    /// Get a definition by type ID
    pub fn get(&self, type_id: &str) -> Option<Arc<NodeDefinition>> {
        self.definitions.get(type_id).cloned()
    }

    /// Get all registered definitions
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<NodeDefinition>> {
        self.definitions.values()
    }

    /// Get definitions by category
    pub fn in_category(
        &self,
        category: NodeCategory,
    ) -> impl Iterator<Item = &Arc<NodeDefinition>> {
        self.definitions
            .values()
            .filter(move |d| d.category == category)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
