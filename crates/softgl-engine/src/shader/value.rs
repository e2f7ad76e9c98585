use std::fmt;

use softgl_math::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Declared type of a shader field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    /// Texture unit index.
    Sampler2D,
}

impl ValueKind {
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            ValueKind::Float | ValueKind::Int | ValueKind::Sampler2D => 4,
            ValueKind::Vec2 => 8,
            ValueKind::Vec3 => 12,
            ValueKind::Vec4 => 16,
            ValueKind::Mat3 => 36,
            ValueKind::Mat4 => 64,
        }
    }

    /// Number of `f32` slots for float-based kinds; `None` for integers.
    #[inline]
    pub const fn float_count(self) -> Option<usize> {
        match self {
            ValueKind::Int | ValueKind::Sampler2D => None,
            _ => Some(self.byte_size() / 4),
        }
    }

    /// Kinds a vertex attribute can be fetched into.
    #[inline]
    pub const fn is_vector(self) -> bool {
        matches!(self, ValueKind::Float | ValueKind::Vec2 | ValueKind::Vec3 | ValueKind::Vec4)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "float",
            ValueKind::Int => "int",
            ValueKind::Vec2 => "vec2",
            ValueKind::Vec3 => "vec3",
            ValueKind::Vec4 => "vec4",
            ValueKind::Mat3 => "mat3",
            ValueKind::Mat4 => "mat4",
            ValueKind::Sampler2D => "sampler2D",
        };
        f.write_str(name)
    }
}

/// The current value of one shader field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Sampler2D(i32),
}

impl Value {
    pub fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Int => Value::Int(0),
            ValueKind::Vec2 => Value::Vec2(Vec2::ZERO),
            ValueKind::Vec3 => Value::Vec3(Vec3::ZERO),
            ValueKind::Vec4 => Value::Vec4(Vec4::ZERO),
            ValueKind::Mat3 => Value::Mat3(Mat3::IDENTITY),
            ValueKind::Mat4 => Value::Mat4(Mat4::IDENTITY),
            ValueKind::Sampler2D => Value::Sampler2D(0),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Mat3(_) => ValueKind::Mat3,
            Value::Mat4(_) => ValueKind::Mat4,
            Value::Sampler2D(_) => ValueKind::Sampler2D,
        }
    }

    /// Reads `kind.byte_size()` bytes from the front of `bytes`
    /// (native endian). `None` when `bytes` is too short.
    pub fn from_bytes(kind: ValueKind, bytes: &[u8]) -> Option<Value> {
        let b = bytes.get(..kind.byte_size())?;
        Some(match kind {
            ValueKind::Float => Value::Float(bytemuck::pod_read_unaligned(b)),
            ValueKind::Int => Value::Int(bytemuck::pod_read_unaligned(b)),
            ValueKind::Vec2 => Value::Vec2(bytemuck::pod_read_unaligned(b)),
            ValueKind::Vec3 => Value::Vec3(bytemuck::pod_read_unaligned(b)),
            ValueKind::Vec4 => Value::Vec4(bytemuck::pod_read_unaligned(b)),
            ValueKind::Mat3 => Value::Mat3(bytemuck::pod_read_unaligned(b)),
            ValueKind::Mat4 => Value::Mat4(bytemuck::pod_read_unaligned(b)),
            ValueKind::Sampler2D => Value::Sampler2D(bytemuck::pod_read_unaligned(b)),
        })
    }

    /// Rebuilds a float-based value from its flattened slots.
    pub fn from_floats(kind: ValueKind, floats: &[f32]) -> Option<Value> {
        let n = kind.float_count()?;
        Value::from_bytes(kind, bytemuck::cast_slice(floats.get(..n)?))
    }

    /// Flattens a float-based value into `out`; integer kinds write nothing.
    pub fn write_floats(&self, out: &mut [f32]) {
        match self {
            Value::Float(v) => out[0] = *v,
            Value::Vec2(v) => out[..2].copy_from_slice(&v.to_array()),
            Value::Vec3(v) => out[..3].copy_from_slice(&v.to_array()),
            Value::Vec4(v) => out[..4].copy_from_slice(&v.to_array()),
            Value::Mat3(m) => out[..9].copy_from_slice(&m.to_cols_array()),
            Value::Mat4(m) => out[..16].copy_from_slice(&m.to_cols_array()),
            Value::Int(_) | Value::Sampler2D(_) => {}
        }
    }

    /// Narrows a fetched attribute to the declared vector kind.
    pub(crate) fn from_attribute(kind: ValueKind, v: Vec4) -> Value {
        match kind {
            ValueKind::Float => Value::Float(v.x),
            ValueKind::Vec2 => Value::Vec2(v.xy()),
            ValueKind::Vec3 => Value::Vec3(v.xyz()),
            _ => Value::Vec4(v),
        }
    }

    /// Matrices are transposed; other values are returned unchanged.
    pub fn transposed(self) -> Value {
        match self {
            Value::Mat3(m) => Value::Mat3(m.transpose()),
            Value::Mat4(m) => Value::Mat4(m.transpose()),
            other => other,
        }
    }
}
