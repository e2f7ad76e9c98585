use softgl_math::{Mat3, Mat4, Vec2, Vec3, Vec4};

use super::descriptor::ShaderDescriptor;
use super::value::Value;

/// Per-program storage for one shader stage: one [`Value`] per declared
/// field, addressed by the field's index.
///
/// Typed reads of the wrong kind return the type's default; typed writes of
/// the wrong kind are ignored. A field never changes kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Registers {
    values: Vec<Value>,
}

macro_rules! typed_access {
    ($($get:ident, $set:ident, $variant:ident, $ty:ty;)*) => {
        $(
            #[inline]
            pub fn $get(&self, field: usize) -> $ty {
                match self.values.get(field) {
                    Some(Value::$variant(v)) => *v,
                    _ => <$ty>::default(),
                }
            }

            #[inline]
            pub fn $set(&mut self, field: usize, value: $ty) {
                if let Some(Value::$variant(v)) = self.values.get_mut(field) {
                    *v = value;
                }
            }
        )*
    };
}

impl Registers {
    pub fn new(descriptor: &ShaderDescriptor) -> Self {
        Self {
            values: descriptor.fields().iter().map(|f| Value::zero(f.kind)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, field: usize) -> Option<Value> {
        self.values.get(field).copied()
    }

    /// Replaces a field's value. Returns `false` (and changes nothing) when
    /// the field does not exist or `value` has a different kind.
    pub fn set(&mut self, field: usize, value: Value) -> bool {
        match self.values.get_mut(field) {
            Some(slot) if slot.kind() == value.kind() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    typed_access! {
        float, set_float, Float, f32;
        int, set_int, Int, i32;
        vec2, set_vec2, Vec2, Vec2;
        vec3, set_vec3, Vec3, Vec3;
        vec4, set_vec4, Vec4, Vec4;
        mat3, set_mat3, Mat3, Mat3;
        mat4, set_mat4, Mat4, Mat4;
        sampler, set_sampler, Sampler2D, i32;
    }
}
