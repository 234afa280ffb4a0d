// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar arithmetic and trigonometry nodes.

use super::executable;
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeInstance};
use crate::pin::PinSpec;

/// Binary float operation: `Result = op(A, B)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatOp {
    /// A + B
    Add,
    /// A - B
    Subtract,
    /// A * B
    Multiply,
    /// A / B, 0 when B is 0
    Divide,
    /// Remainder of A / B, 0 when B is 0
    Modulo,
    /// A raised to B
    Power,
    /// Smaller of A and B
    Min,
    /// Larger of A and B
    Max,
    /// Four-quadrant arctangent of Y (A) over X (B)
    Atan2,
}

impl FloatOp {
    /// Every binary float operation
    pub const ALL: [FloatOp; 9] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::Power,
        Self::Min,
        Self::Max,
        Self::Atan2,
    ];

    /// Apply the operation
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide if b == 0.0 => 0.0,
            Self::Divide => a / b,
            Self::Modulo if b == 0.0 => 0.0,
            Self::Modulo => a % b,
            Self::Power => a.powf(b),
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Atan2 => a.atan2(b),
        }
    }

    fn info(self) -> (&'static str, &'static str, [&'static str; 2], f32) {
        // (type id, title, input names, default for B)
        match self {
            Self::Add => ("add", "Add", ["A", "B"], 0.0),
            Self::Subtract => ("subtract", "Subtract", ["A", "B"], 0.0),
            Self::Multiply => ("multiply", "Multiply", ["A", "B"], 1.0),
            Self::Divide => ("divide", "Divide", ["A", "B"], 1.0),
            Self::Modulo => ("modulo", "Modulo", ["A", "B"], 1.0),
            Self::Power => ("power", "Power", ["Base", "Exponent"], 1.0),
            Self::Min => ("min", "Min", ["A", "B"], 0.0),
            Self::Max => ("max", "Max", ["A", "B"], 0.0),
            Self::Atan2 => ("atan2", "Atan2", ["Y", "X"], 1.0),
        }
    }

    /// Build the node definition
    pub fn definition(self) -> NodeDefinition {
        let (type_id, title, [a, b], b_default) = self.info();
        let category = match self {
            Self::Atan2 => NodeCategory::Trigonometry,
            _ => NodeCategory::Math,
        };
        executable(type_id, title, category, self)
            .input(PinSpec::data_in(a).with_default(0.0f32))
            .input(PinSpec::data_in(b).with_default(b_default))
            .output(PinSpec::data_out("Result"))
    }
}

impl NodeBehavior for FloatOp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        let a = node.input(1, 0.0f32);
        let b = node.input(2, 0.0f32);
        node.set_output(1, self.apply(a, b));
        ExecFlow::Continue
    }
}

/// Unary float operation: `Result = op(Value)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Absolute value
    Abs,
    /// -Value
    Negate,
    /// Square root, 0 for negative input
    Sqrt,
    /// Sine (radians)
    Sin,
    /// Cosine (radians)
    Cos,
    /// Tangent (radians)
    Tan,
    /// Arcsine, input clamped to [-1, 1]
    Asin,
    /// Arccosine, input clamped to [-1, 1]
    Acos,
    /// Degrees to radians
    ToRadians,
    /// Radians to degrees
    ToDegrees,
}

impl UnaryOp {
    /// Every unary float operation
    pub const ALL: [UnaryOp; 10] = [
        Self::Abs,
        Self::Negate,
        Self::Sqrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::ToRadians,
        Self::ToDegrees,
    ];

    /// Apply the operation
    pub fn apply(self, v: f32) -> f32 {
        match self {
            Self::Abs => v.abs(),
            Self::Negate => -v,
            Self::Sqrt => v.max(0.0).sqrt(),
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Asin => v.clamp(-1.0, 1.0).asin(),
            Self::Acos => v.clamp(-1.0, 1.0).acos(),
            Self::ToRadians => v.to_radians(),
            Self::ToDegrees => v.to_degrees(),
        }
    }

    /// Build the node definition
    pub fn definition(self) -> NodeDefinition {
        let (type_id, title, category) = match self {
            Self::Abs => ("abs", "Abs", NodeCategory::Math),
            Self::Negate => ("negate", "Negate", NodeCategory::Math),
            Self::Sqrt => ("sqrt", "Square Root", NodeCategory::Math),
            Self::Sin => ("sin", "Sin", NodeCategory::Trigonometry),
            Self::Cos => ("cos", "Cos", NodeCategory::Trigonometry),
            Self::Tan => ("tan", "Tan", NodeCategory::Trigonometry),
            Self::Asin => ("asin", "Asin", NodeCategory::Trigonometry),
            Self::Acos => ("acos", "Acos", NodeCategory::Trigonometry),
            Self::ToRadians => ("to_radians", "Degrees to Radians", NodeCategory::Trigonometry),
            Self::ToDegrees => ("to_degrees", "Radians to Degrees", NodeCategory::Trigonometry),
        };
        executable(type_id, title, category, self)
            .input(PinSpec::data_in("Value").with_default(0.0f32))
            .output(PinSpec::data_out("Result"))
    }
}

impl NodeBehavior for UnaryOp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        let v = node.input(1, 0.0f32);
        node.set_output(1, self.apply(v));
        ExecFlow::Continue
    }
}

/// Binary integer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntOp {
    /// Wrapping A + B
    Add,
    /// Wrapping A - B
    Subtract,
    /// Wrapping A * B
    Multiply,
    /// A / B rounded toward zero, 0 when B is 0
    Divide,
}

impl IntOp {
    /// Every integer operation
    pub const ALL: [IntOp; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Apply the operation
    pub fn apply(self, a: i32, b: i32) -> i32 {
        match self {
            Self::Add => a.wrapping_add(b),
            Self::Subtract => a.wrapping_sub(b),
            Self::Multiply => a.wrapping_mul(b),
            Self::Divide => a.checked_div(b).unwrap_or(0),
        }
    }

    /// Build the node definition
    pub fn definition(self) -> NodeDefinition {
        let (type_id, title, b_default) = match self {
            Self::Add => ("int_add", "Int Add", 0),
            Self::Subtract => ("int_subtract", "Int Subtract", 0),
            Self::Multiply => ("int_multiply", "Int Multiply", 1),
            Self::Divide => ("int_divide", "Int Divide", 1),
        };
        executable(type_id, title, NodeCategory::Math, self)
            .input(PinSpec::data_in("A").with_default(0i32))
            .input(PinSpec::data_in("B").with_default(b_default))
            .output(PinSpec::data_out("Result"))
    }
}

impl NodeBehavior for IntOp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        let a = node.input(1, 0i32);
        let b = node.input(2, 0i32);
        node.set_output(1, self.apply(a, b));
        ExecFlow::Continue
    }
}

/// Clamp a value into `[Min, Max]`
pub struct Clamp;

impl NodeBehavior for Clamp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        let value = node.input(1, 0.0f32);
        let min = node.input(2, 0.0f32);
        let max = node.input(3, 1.0f32);
        // f32::clamp panics when min > max
        node.set_output(1, value.max(min).min(max));
        ExecFlow::Continue
    }
}

/// Clamp node definition
pub fn clamp_definition() -> NodeDefinition {
    executable("clamp", "Clamp", NodeCategory::Math, Clamp)
        .input(PinSpec::data_in("Value").with_default(0.0f32))
        .input(PinSpec::data_in("Min").with_default(0.0f32))
        .input(PinSpec::data_in("Max").with_default(1.0f32))
        .output(PinSpec::data_out("Result"))
}

/// Linear interpolation `A + (B - A) * Alpha`
pub struct Lerp;

impl NodeBehavior for Lerp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        let a = node.input(1, 0.0f32);
        let b = node.input(2, 1.0f32);
        let alpha = node.input(3, 0.5f32);
        node.set_output(1, a + (b - a) * alpha);
        ExecFlow::Continue
    }
}

/// Lerp node definition
pub fn lerp_definition() -> NodeDefinition {
    executable("lerp", "Lerp", NodeCategory::Math, Lerp)
        .input(PinSpec::data_in("A").with_default(0.0f32))
        .input(PinSpec::data_in("B").with_default(1.0f32))
        .input(PinSpec::data_in("Alpha").with_default(0.5f32))
        .output(PinSpec::data_out("Result"))
}
