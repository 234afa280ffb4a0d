// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matrix construction and product nodes.
//!
//! Matrices are row-major and act on column vectors, so a translation sits
//! in the last column.

use super::executable;
use super::vector::Vec3;
use crate::evaluation::{ExecContext, ExecFlow};
use crate::node::{NodeBehavior, NodeCategory, NodeDefinition, NodeInstance};
use crate::pin::PinSpec;
use crate::value::{Mat3, Mat4};

/// Matrix node operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOp {
    /// 3x3 identity
    Identity3,
    /// 4x4 identity
    Identity4,
    /// 3x3 matrix from three row vectors
    Mat3FromRows,
    /// Translation by a Vec3
    Translation,
    /// Non-uniform scale by a Vec3
    Scale,
    /// Rotation about X (radians)
    RotationX,
    /// Rotation about Y (radians)
    RotationY,
    /// Rotation about Z (radians)
    RotationZ,
    /// A * B (3x3)
    Multiply3,
    /// A * B (4x4)
    Multiply4,
    /// Transpose (4x4)
    Transpose4,
    /// M * (P, 1) with perspective divide
    TransformPoint,
}

impl MatrixOp {
    /// Every matrix operation
    pub const ALL: [MatrixOp; 12] = [
        Self::Identity3,
        Self::Identity4,
        Self::Mat3FromRows,
        Self::Translation,
        Self::Scale,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::Multiply3,
        Self::Multiply4,
        Self::Transpose4,
        Self::TransformPoint,
    ];

    /// Build the node definition
    pub fn definition(self) -> NodeDefinition {
        let def = |type_id: &str, title: &str| {
            executable(type_id, title, NodeCategory::Matrix, self)
        };
        let angle = || PinSpec::data_in("Angle").with_default(0.0f32);

        match self {
            Self::Identity3 => def("mat3_identity", "Identity Mat3")
                .output(PinSpec::data_out("Matrix").with_default(identity::<3>())),
            Self::Identity4 => def("mat4_identity", "Identity Mat4")
                .output(PinSpec::data_out("Matrix").with_default(identity::<4>())),
            Self::Mat3FromRows => def("mat3_from_rows", "Mat3 From Rows")
                .input(PinSpec::data_in("Row 0").with_default([1.0f32, 0.0, 0.0]))
                .input(PinSpec::data_in("Row 1").with_default([0.0f32, 1.0, 0.0]))
                .input(PinSpec::data_in("Row 2").with_default([0.0f32, 0.0, 1.0]))
                .output(PinSpec::data_out("Matrix")),
            Self::Translation => def("mat4_translation", "Translation")
                .input(PinSpec::data_in("Offset").with_default([0.0f32; 3]))
                .output(PinSpec::data_out("Matrix")),
            Self::Scale => def("mat4_scale", "Scale")
                .input(PinSpec::data_in("Scale").with_default([1.0f32; 3]))
                .output(PinSpec::data_out("Matrix")),
            Self::RotationX => def("mat4_rotation_x", "Rotation X")
                .input(angle())
                .output(PinSpec::data_out("Matrix")),
            Self::RotationY => def("mat4_rotation_y", "Rotation Y")
                .input(angle())
                .output(PinSpec::data_out("Matrix")),
            Self::RotationZ => def("mat4_rotation_z", "Rotation Z")
                .input(angle())
                .output(PinSpec::data_out("Matrix")),
            Self::Multiply3 => def("mat3_multiply", "Mat3 Multiply")
                .input(PinSpec::data_in("A").with_default(identity::<3>()))
                .input(PinSpec::data_in("B").with_default(identity::<3>()))
                .output(PinSpec::data_out("Result")),
            Self::Multiply4 => def("mat4_multiply", "Mat4 Multiply")
                .input(PinSpec::data_in("A").with_default(identity::<4>()))
                .input(PinSpec::data_in("B").with_default(identity::<4>()))
                .output(PinSpec::data_out("Result")),
            Self::Transpose4 => def("mat4_transpose", "Mat4 Transpose")
                .input(PinSpec::data_in("Matrix").with_default(identity::<4>()))
                .output(PinSpec::data_out("Result")),
            Self::TransformPoint => def("mat4_transform_point", "Transform Point")
                .input(PinSpec::data_in("Matrix").with_default(identity::<4>()))
                .input(PinSpec::data_in("Point").with_default([0.0f32; 3]))
                .output(PinSpec::data_out("Result")),
        }
    }
}

impl NodeBehavior for MatrixOp {
    fn execute(&self, node: &mut NodeInstance, _ctx: &mut ExecContext) -> ExecFlow {
        match self {
            Self::Identity3 => node.set_output(1, identity::<3>()),
            Self::Identity4 => node.set_output(1, identity::<4>()),
            Self::Mat3FromRows => {
                let rows: Mat3 = [
                    node.input(1, [1.0, 0.0, 0.0]),
                    node.input(2, [0.0, 1.0, 0.0]),
                    node.input(3, [0.0, 0.0, 1.0]),
                ];
                node.set_output(1, rows);
            }
            Self::Translation => node.set_output(1, translation(node.input(1, [0.0; 3]))),
            Self::Scale => node.set_output(1, scale(node.input(1, [1.0; 3]))),
            Self::RotationX => node.set_output(1, rotation_x(node.input(1, 0.0f32))),
            Self::RotationY => node.set_output(1, rotation_y(node.input(1, 0.0f32))),
            Self::RotationZ => node.set_output(1, rotation_z(node.input(1, 0.0f32))),
            Self::Multiply3 => {
                let a: Mat3 = node.input(1, identity());
                let b: Mat3 = node.input(2, identity());
                node.set_output(1, multiply(a, b));
            }
            Self::Multiply4 => {
                let a: Mat4 = node.input(1, identity());
                let b: Mat4 = node.input(2, identity());
                node.set_output(1, multiply(a, b));
            }
            Self::Transpose4 => {
                let m: Mat4 = node.input(1, identity());
                node.set_output(1, transpose(m));
            }
            Self::TransformPoint => {
                let m: Mat4 = node.input(1, identity());
                let p: Vec3 = node.input(2, [0.0; 3]);
                node.set_output(1, transform_point(m, p));
            }
        }
        ExecFlow::Continue
    }
}

/// N x N identity
pub fn identity<const N: usize>() -> [[f32; N]; N] {
    let mut m = [[0.0; N]; N];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Matrix product `a * b`
pub fn multiply<const N: usize>(a: [[f32; N]; N], b: [[f32; N]; N]) -> [[f32; N]; N] {
    let mut m = [[0.0; N]; N];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..N).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    m
}

/// Transpose
pub fn transpose<const N: usize>(a: [[f32; N]; N]) -> [[f32; N]; N] {
    let mut m = [[0.0; N]; N];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[j][i];
        }
    }
    m
}

/// Translation matrix
pub fn translation([x, y, z]: Vec3) -> Mat4 {
    let mut m = identity::<4>();
    m[0][3] = x;
    m[1][3] = y;
    m[2][3] = z;
    m
}

/// Scale matrix
pub fn scale([x, y, z]: Vec3) -> Mat4 {
    let mut m = identity::<4>();
    m[0][0] = x;
    m[1][1] = y;
    m[2][2] = z;
    m
}

/// Rotation about the X axis
pub fn rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, -s, 0.0],
        [0.0, s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Y axis
pub fn rotation_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Z axis
pub fn rotation_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [c, -s, 0.0, 0.0],
        [s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Transform a point, dividing by `w` when it is neither 0 nor 1
pub fn transform_point(m: Mat4, [x, y, z]: Vec3) -> Vec3 {
    let v = [x, y, z, 1.0];
    let row = |i: usize| -> f32 { (0..4).map(|k| m[i][k] * v[k]).sum() };
    let w = row(3);
    let p = [row(0), row(1), row(2)];
    if w == 0.0 || w == 1.0 {
        p
    } else {
        p.map(|c| c / w)
    }
}
