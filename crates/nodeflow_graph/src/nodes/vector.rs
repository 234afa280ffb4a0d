// SPDX-License-Identifier: MIT OR Apache-2.0
//! 2D/3D vector algebra nodes.

use super::executable;
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeInstance};
use crate::pin::PinSpec;

/// 2D vector
pub type Vec2 = [f32; 2];

/// 3D vector
pub type Vec3 = [f32; 3];

const ZERO2: Vec2 = [0.0; 2];
const ZERO3: Vec3 = [0.0; 3];

/// Vector node operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOp {
    /// (X, Y) -> Vec2
    MakeVec2,
    /// Vec2 -> (X, Y)
    BreakVec2,
    /// (X, Y, Z) -> Vec3
    MakeVec3,
    /// Vec3 -> (X, Y, Z)
    BreakVec3,
    /// A + B
    Add2,
    /// A - B
    Subtract2,
    /// V * S
    Scale2,
    /// A . B
    Dot2,
    /// |V|
    Length2,
    /// V / |V|; the zero vector stays zero
    Normalize2,
    /// A + B
    Add3,
    /// A - B
    Subtract3,
    /// V * S
    Scale3,
    /// A . B
    Dot3,
    /// A x B
    Cross,
    /// |V|
    Length3,
    /// V / |V|; the zero vector stays zero
    Normalize3,
    /// |A - B|
    Distance3,
}

impl VectorOp {
    /// Every vector operation
    pub const ALL: [VectorOp; 18] = [
        Self::MakeVec2,
        Self::BreakVec2,
        Self::MakeVec3,
        Self::BreakVec3,
        Self::Add2,
        Self::Subtract2,
        Self::Scale2,
        Self::Dot2,
        Self::Length2,
        Self::Normalize2,
        Self::Add3,
        Self::Subtract3,
        Self::Scale3,
        Self::Dot3,
        Self::Cross,
        Self::Length3,
        Self::Normalize3,
        Self::Distance3,
    ];

    /// Build the node definition
    pub fn definition(self) -> NodeDefinition {
        let def = |type_id: &str, title: &str| {
            executable(type_id, title, NodeCategory::Vector, self)
        };
        let v2 = |name: &str| PinSpec::data_in(name).with_default(ZERO2);
        let v3 = |name: &str| PinSpec::data_in(name).with_default(ZERO3);
        let scalar = |name: &str| PinSpec::data_in(name).with_default(0.0f32);

        match self {
            Self::MakeVec2 => def("make_vec2", "Make Vec2")
                .input(scalar("X"))
                .input(scalar("Y"))
                .output(PinSpec::data_out("Vector")),
            Self::BreakVec2 => def("break_vec2", "Break Vec2")
                .input(v2("Vector"))
                .output(PinSpec::data_out("X"))
                .output(PinSpec::data_out("Y")),
            Self::MakeVec3 => def("make_vec3", "Make Vec3")
                .input(scalar("X"))
                .input(scalar("Y"))
                .input(scalar("Z"))
                .output(PinSpec::data_out("Vector")),
            Self::BreakVec3 => def("break_vec3", "Break Vec3")
                .input(v3("Vector"))
                .output(PinSpec::data_out("X"))
                .output(PinSpec::data_out("Y"))
                .output(PinSpec::data_out("Z")),
            Self::Add2 => def("vec2_add", "Vec2 Add")
                .input(v2("A"))
                .input(v2("B"))
                .output(PinSpec::data_out("Result")),
            Self::Subtract2 => def("vec2_subtract", "Vec2 Subtract")
                .input(v2("A"))
                .input(v2("B"))
                .output(PinSpec::data_out("Result")),
            Self::Scale2 => def("vec2_scale", "Vec2 Scale")
                .input(v2("Vector"))
                .input(PinSpec::data_in("Scale").with_default(1.0f32))
                .output(PinSpec::data_out("Result")),
            Self::Dot2 => def("vec2_dot", "Vec2 Dot")
                .input(v2("A"))
                .input(v2("B"))
                .output(PinSpec::data_out("Result")),
            Self::Length2 => def("vec2_length", "Vec2 Length")
                .input(v2("Vector"))
                .output(PinSpec::data_out("Length")),
            Self::Normalize2 => def("vec2_normalize", "Vec2 Normalize")
                .input(v2("Vector"))
                .output(PinSpec::data_out("Result")),
            Self::Add3 => def("vec3_add", "Vec3 Add")
                .input(v3("A"))
                .input(v3("B"))
                .output(PinSpec::data_out("Result")),
            Self::Subtract3 => def("vec3_subtract", "Vec3 Subtract")
                .input(v3("A"))
                .input(v3("B"))
                .output(PinSpec::data_out("Result")),
            Self::Scale3 => def("vec3_scale", "Vec3 Scale")
                .input(v3("Vector"))
                .input(PinSpec::data_in("Scale").with_default(1.0f32))
                .output(PinSpec::data_out("Result")),
            Self::Dot3 => def("vec3_dot", "Vec3 Dot")
                .input(v3("A"))
                .input(v3("B"))
                .output(PinSpec::data_out("Result")),
            Self::Cross => def("vec3_cross", "Vec3 Cross")
                .input(v3("A"))
                .input(v3("B"))
                .output(PinSpec::data_out("Result")),
            Self::Length3 => def("vec3_length", "Vec3 Length")
                .input(v3("Vector"))
                .output(PinSpec::data_out("Length")),
            Self::Normalize3 => def("vec3_normalize", "Vec3 Normalize")
                .input(v3("Vector"))
                .output(PinSpec::data_out("Result")),
            Self::Distance3 => def("vec3_distance", "Vec3 Distance")
                .input(v3("A"))
                .input(v3("B"))
                .output(PinSpec::data_out("Distance")),
        }
    }
}

impl NodeBehavior for VectorOp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        match self {
            Self::MakeVec2 => {
                let v = [node.input(1, 0.0f32), node.input(2, 0.0f32)];
                node.set_output(1, v);
            }
            Self::BreakVec2 => {
                let [x, y] = node.input(1, ZERO2);
                node.set_output(1, x);
                node.set_output(2, y);
            }
            Self::MakeVec3 => {
                let v = [node.input(1, 0.0f32), node.input(2, 0.0f32), node.input(3, 0.0f32)];
                node.set_output(1, v);
            }
            Self::BreakVec3 => {
                let [x, y, z] = node.input(1, ZERO3);
                node.set_output(1, x);
                node.set_output(2, y);
                node.set_output(3, z);
            }
            Self::Add2 => {
                let (a, b) = (node.input(1, ZERO2), node.input(2, ZERO2));
                node.set_output(1, zip2(a, b, |x, y| x + y));
            }
            Self::Subtract2 => {
                let (a, b) = (node.input(1, ZERO2), node.input(2, ZERO2));
                node.set_output(1, zip2(a, b, |x, y| x - y));
            }
            Self::Scale2 => {
                let (v, s) = (node.input(1, ZERO2), node.input(2, 1.0f32));
                node.set_output(1, v.map(|x| x * s));
            }
            Self::Dot2 => {
                let (a, b) = (node.input(1, ZERO2), node.input(2, ZERO2));
                node.set_output(1, dot2(a, b));
            }
            Self::Length2 => {
                let v = node.input(1, ZERO2);
                node.set_output(1, dot2(v, v).sqrt());
            }
            Self::Normalize2 => {
                let v = node.input(1, ZERO2);
                let len = dot2(v, v).sqrt();
                node.set_output(1, if len > 0.0 { v.map(|x| x / len) } else { ZERO2 });
            }
            Self::Add3 => {
                let (a, b) = (node.input(1, ZERO3), node.input(2, ZERO3));
                node.set_output(1, zip3(a, b, |x, y| x + y));
            }
            Self::Subtract3 => {
                let (a, b) = (node.input(1, ZERO3), node.input(2, ZERO3));
                node.set_output(1, zip3(a, b, |x, y| x - y));
            }
            Self::Scale3 => {
                let (v, s) = (node.input(1, ZERO3), node.input(2, 1.0f32));
                node.set_output(1, v.map(|x| x * s));
            }
            Self::Dot3 => {
                let (a, b) = (node.input(1, ZERO3), node.input(2, ZERO3));
                node.set_output(1, dot3(a, b));
            }
            Self::Cross => {
                let (a, b) = (node.input(1, ZERO3), node.input(2, ZERO3));
                node.set_output(1, cross(a, b));
            }
            Self::Length3 => {
                let v = node.input(1, ZERO3);
                node.set_output(1, length3(v));
            }
            Self::Normalize3 => {
                let v = node.input(1, ZERO3);
                node.set_output(1, normalize3(v));
            }
            Self::Distance3 => {
                let (a, b) = (node.input(1, ZERO3), node.input(2, ZERO3));
                node.set_output(1, length3(zip3(a, b, |x, y| x - y)));
            }
        }
        ExecFlow::Continue
    }
}

fn zip2(a: Vec2, b: Vec2, f: impl Fn(f32, f32) -> f32) -> Vec2 {
    [f(a[0], b[0]), f(a[1], b[1])]
}

fn zip3(a: Vec3, b: Vec3, f: impl Fn(f32, f32) -> f32) -> Vec3 {
    [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])]
}

fn dot2(a: Vec2, b: Vec2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

/// Dot product
pub fn dot3(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length
pub fn length3(v: Vec3) -> f32 {
    dot3(v, v).sqrt()
}

/// Unit vector in the direction of `v`, or zero
pub fn normalize3(v: Vec3) -> Vec3 {
    let len = length3(v);
    if len > 0.0 {
        v.map(|x| x / len)
    } else {
        ZERO3
    }
}
