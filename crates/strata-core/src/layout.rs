// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value layout descriptors shared by the memory arena, the semantics catalog
//! and the shader node graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of a value: scalar, vector or square matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompositionType {
    /// A single component.
    Scalar,
    /// Two components.
    Vec2,
    /// Three components.
    Vec3,
    /// Four components.
    Vec4,
    /// A 2x2 matrix, stored column-major.
    Mat2,
    /// A 3x3 matrix, stored column-major.
    Mat3,
    /// A 4x4 matrix, stored column-major.
    Mat4,
}

impl CompositionType {
    /// Number of components in one element of this shape.
    pub const fn component_count(self) -> usize {
        match self {
            CompositionType::Scalar => 1,
            CompositionType::Vec2 => 2,
            CompositionType::Vec3 => 3,
            CompositionType::Vec4 | CompositionType::Mat2 => 4,
            CompositionType::Mat3 => 9,
            CompositionType::Mat4 => 16,
        }
    }

    /// Number of 16-byte vec4 slots one element occupies once padded for GPU
    /// consumption (matrices take one slot per column).
    pub const fn vec4_slots(self) -> usize {
        match self {
            CompositionType::Scalar
            | CompositionType::Vec2
            | CompositionType::Vec3
            | CompositionType::Vec4 => 1,
            CompositionType::Mat2 => 2,
            CompositionType::Mat3 => 3,
            CompositionType::Mat4 => 4,
        }
    }

    /// Returns `true` for the matrix shapes.
    pub const fn is_matrix(self) -> bool {
        matches!(
            self,
            CompositionType::Mat2 | CompositionType::Mat3 | CompositionType::Mat4
        )
    }

    /// Number of rows of a matrix column, or the component count of a vector.
    pub const fn column_length(self) -> usize {
        match self {
            CompositionType::Mat2 => 2,
            CompositionType::Mat3 => 3,
            CompositionType::Mat4 => 4,
            other => other.component_count(),
        }
    }

    /// Returns the vector shape with `n` components, if one exists.
    pub const fn vector_of(n: usize) -> Option<Self> {
        match n {
            1 => Some(CompositionType::Scalar),
            2 => Some(CompositionType::Vec2),
            3 => Some(CompositionType::Vec3),
            4 => Some(CompositionType::Vec4),
            _ => None,
        }
    }
}

impl fmt::Display for CompositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositionType::Scalar => "SCALAR",
            CompositionType::Vec2 => "VEC2",
            CompositionType::Vec3 => "VEC3",
            CompositionType::Vec4 => "VEC4",
            CompositionType::Mat2 => "MAT2",
            CompositionType::Mat3 => "MAT3",
            CompositionType::Mat4 => "MAT4",
        };
        f.write_str(name)
    }
}

/// The numeric encoding of each component of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit IEEE float.
    F32,
}

impl ComponentType {
    /// Size in bytes of one component.
    pub const fn byte_size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::I32 | ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    /// Returns `true` for the integer encodings.
    pub const fn is_integer(self) -> bool {
        !matches!(self, ComponentType::F32)
    }

    /// Returns `true` for the signed integer encodings.
    pub const fn is_signed_integer(self) -> bool {
        matches!(
            self,
            ComponentType::I8 | ComponentType::I16 | ComponentType::I32
        )
    }

    /// The largest magnitude representable, used by normalized encodings.
    pub const fn normalization_range(self) -> f64 {
        match self {
            ComponentType::I8 => i8::MAX as f64,
            ComponentType::U8 => u8::MAX as f64,
            ComponentType::I16 => i16::MAX as f64,
            ComponentType::U16 => u16::MAX as f64,
            ComponentType::I32 => i32::MAX as f64,
            ComponentType::U32 => u32::MAX as f64,
            ComponentType::F32 => 1.0,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::I8 => "BYTE",
            ComponentType::U8 => "UNSIGNED_BYTE",
            ComponentType::I16 => "SHORT",
            ComponentType::U16 => "UNSIGNED_SHORT",
            ComponentType::I32 => "INT",
            ComponentType::U32 => "UNSIGNED_INT",
            ComponentType::F32 => "FLOAT",
        };
        f.write_str(name)
    }
}

/// Byte size of one element with the given shape and encoding.
pub const fn element_byte_size(composition: CompositionType, component: ComponentType) -> usize {
    composition.component_count() * component.byte_size()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(
            element_byte_size(CompositionType::Vec3, ComponentType::F32),
            12
        );
        assert_eq!(
            element_byte_size(CompositionType::Mat4, ComponentType::F32),
            64
        );
        assert_eq!(
            element_byte_size(CompositionType::Vec2, ComponentType::U16),
            4
        );
    }

    #[test]
    fn test_vec4_slots() {
        assert_eq!(CompositionType::Scalar.vec4_slots(), 1);
        assert_eq!(CompositionType::Mat3.vec4_slots(), 3);
        assert_eq!(CompositionType::Mat4.vec4_slots(), 4);
        assert_eq!(CompositionType::Mat3.column_length(), 3);
    }

    #[test]
    fn test_vector_of() {
        assert_eq!(CompositionType::vector_of(3), Some(CompositionType::Vec3));
        assert_eq!(CompositionType::vector_of(5), None);
    }
}
