// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Pin kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinKind {
    /// "Run this node"
    ExecIn,
    /// "This node ran"
    ExecOut,
    /// Value read by the node
    DataIn,
    /// Value produced by the node
    DataOut,
}

impl PinKind {
    /// Check if this pin carries control flow
    pub fn is_exec(&self) -> bool {
        matches!(self, Self::ExecIn | Self::ExecOut)
    }

    /// Check if this pin carries a value
    pub fn is_data(&self) -> bool {
        !self.is_exec()
    }

    /// Check if this is an input pin
    pub fn is_input(&self) -> bool {
        matches!(self, Self::ExecIn | Self::DataIn)
    }

    /// Check if this is an output pin
    pub fn is_output(&self) -> bool {
        !self.is_input()
    }
}

/// Static description of one pin slot on a node definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    /// Pin name
    pub name: String,
    /// Pin kind
    pub kind: PinKind,
    /// Default value (data pins only)
    pub default: Option<Value>,
}

impl PinSpec {
    /// Create a new pin
    pub fn new(name: impl Into<String>, kind: PinKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Create an exec input pin
    pub fn exec_in(name: impl Into<String>) -> Self {
        Self::new(name, PinKind::ExecIn)
    }

    /// Create an exec output pin
    pub fn exec_out(name: impl Into<String>) -> Self {
        Self::new(name, PinKind::ExecOut)
    }

    /// Create a data input pin
    pub fn data_in(name: impl Into<String>) -> Self {
        Self::new(name, PinKind::DataIn)
    }

    /// Create a data output pin
    pub fn data_out(name: impl Into<String>) -> Self {
        Self::new(name, PinKind::DataOut)
    }

    /// Set the default value.
    ///
    /// Exec pins never carry a value, so the default is dropped for them.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if self.kind.is_data() {
            self.default = Some(value.into());
        } else {
            tracing::warn!("Ignoring default on exec pin '{}'", self.name);
        }
        self
    }
}
