// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values carried by data pins.
//!
//! A [`Value`] is a detached snapshot: it never refers back to a node or a
//! connection. Reads go through [`Value::read_as`], which falls back to a
//! caller-supplied value when the stored variant is not the requested one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 3x3 matrix, row-major
pub type Mat3 = [[f32; 3]; 3];

/// 4x4 matrix, row-major
pub type Mat4 = [[f32; 4]; 4];

/// Type tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Floating point value
    Float,
    /// Integer value
    Int,
    /// Boolean value
    Bool,
    /// String value
    String,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 3x3 matrix
    Mat3,
    /// 4x4 matrix
    Mat4,
}

impl ValueType {
    /// Get the color for this value type (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Float => [80, 200, 80],
            Self::Int => [80, 200, 200],
            Self::Bool => [200, 80, 80],
            Self::String => [200, 180, 150],
            Self::Vec2 => [200, 200, 80],
            Self::Vec3 => [200, 150, 80],
            Self::Mat3 => [120, 100, 200],
            Self::Mat4 => [150, 100, 200],
        }
    }

    /// Get a short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Vec2 => "Vec2",
            Self::Vec3 => "Vec3",
            Self::Mat3 => "Mat3",
            Self::Mat4 => "Mat4",
        }
    }
}

/// Value that can be stored on a pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Float
    Float(f32),
    /// Integer
    Int(i32),
    /// Boolean
    Bool(bool),
    /// String
    String(String),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 3x3 matrix
    Mat3(Mat3),
    /// 4x4 matrix
    Mat4(Mat4),
}

impl Value {
    /// Get the type tag for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float(_) => ValueType::Float,
            Self::Int(_) => ValueType::Int,
            Self::Bool(_) => ValueType::Bool,
            Self::String(_) => ValueType::String,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Mat3(_) => ValueType::Mat3,
            Self::Mat4(_) => ValueType::Mat4,
        }
    }

    /// Read the value as `T`, returning `fallback` if the variant differs.
    ///
    /// There is no implicit conversion: an `Int` read as `f32` yields the
    /// fallback.
    pub fn read_as<T: FromValue>(&self, fallback: T) -> T {
        T::from_value(self).unwrap_or(fallback)
    }

    /// Read the value as `T` if the variant matches
    pub fn get<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

/// Types that can be read out of a [`Value`]
pub trait FromValue: Sized {
    /// Extract `Self` if `value` holds the matching variant
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_conversions! {
    f32 => Float,
    i32 => Int,
    bool => Bool,
    String => String,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Vec2([x, y]) => write!(f, "({x}, {y})"),
            Self::Vec3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::Mat3(m) => write_rows(f, m),
            Self::Mat4(m) => write_rows(f, m),
        }
    }
}

fn write_rows<const N: usize>(f: &mut fmt::Formatter<'_>, rows: &[[f32; N]; N]) -> fmt::Result {
    f.write_str("[")?;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str("[")?;
        for (j, v) in row.iter().enumerate() {
            if j > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_as_matching_variant() {
        assert_eq!(Value::Float(3.5).read_as(0.0f32), 3.5);
        assert_eq!(Value::from("hi").read_as(String::new()), "hi");
        assert!(Value::Bool(true).read_as(false));
    }

    #[test]
    fn test_read_as_mismatch_returns_fallback() {
        assert_eq!(Value::Int(7).read_as(1.5f32), 1.5);
        assert_eq!(Value::Float(2.0).read_as(9i32), 9);
        assert_eq!(
            Value::Float(3.5).read_as(String::from("fallback")),
            "fallback"
        );
        assert_eq!(Value::Vec2([1.0, 2.0]).read_as([0.0f32; 3]), [0.0; 3]);
    }

    #[test]
    fn test_value_type_tags() {
        assert_eq!(Value::from(1.0f32).value_type(), ValueType::Float);
        assert_eq!(Value::from([0.0f32; 3]).value_type(), ValueType::Vec3);
        assert_eq!(Value::Mat4([[0.0; 4]; 4]).value_type(), ValueType::Mat4);
        assert_ne!(ValueType::Float.color(), ValueType::Int.color());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(3.25).to_string(), "3.25");
        assert_eq!(Value::Int(-2).to_string(), "-2");
        assert_eq!(Value::from("Hello World").to_string(), "Hello World");
        assert_eq!(Value::Vec2([1.0, 2.5]).to_string(), "(1, 2.5)");
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert_eq!(
            Value::Mat3(identity).to_string(),
            "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]"
        );
    }
}
