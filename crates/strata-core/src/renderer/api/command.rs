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

//! Draw submission types.

use super::pipeline::PipelineState;
use super::resource::{BufferId, ProgramId, TextureId};
use crate::layout::{ComponentType, CompositionType};

/// A value written to a named uniform of a program.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// A signed integer scalar.
    Int(i32),
    /// A float scalar.
    Float(f32),
    /// A float vec2.
    Vec2([f32; 2]),
    /// A float vec3.
    Vec3([f32; 3]),
    /// A float vec4.
    Vec4([f32; 4]),
    /// A column-major 3x3 matrix.
    Mat3([f32; 9]),
    /// A column-major 4x4 matrix.
    Mat4([f32; 16]),
    /// A uniform array, elements of `composition` laid end to end.
    Array {
        /// Shape of each element.
        composition: CompositionType,
        /// Flattened element components.
        values: Vec<f32>,
    },
}

impl UniformValue {
    /// Builds a uniform value from flat float components.
    ///
    /// Integer component types produce [`UniformValue::Int`] for scalars; every
    /// other shape is sent as floats. Returns `None` when `values` does not hold
    /// exactly one element of `composition` and `array_length` is 1.
    pub fn from_components(
        composition: CompositionType,
        component: ComponentType,
        array_length: usize,
        values: &[f32],
    ) -> Option<Self> {
        let n = composition.component_count();
        if array_length > 1 {
            if values.len() != n * array_length {
                return None;
            }
            return Some(UniformValue::Array {
                composition,
                values: values.to_vec(),
            });
        }
        if values.len() != n {
            return None;
        }
        let value = match composition {
            CompositionType::Scalar if component.is_integer() => {
                UniformValue::Int(values[0] as i32)
            }
            CompositionType::Scalar => UniformValue::Float(values[0]),
            CompositionType::Vec2 => UniformValue::Vec2([values[0], values[1]]),
            CompositionType::Vec3 => UniformValue::Vec3([values[0], values[1], values[2]]),
            CompositionType::Vec4 => {
                UniformValue::Vec4([values[0], values[1], values[2], values[3]])
            }
            CompositionType::Mat2 => UniformValue::Array {
                composition,
                values: values.to_vec(),
            },
            CompositionType::Mat3 => {
                let mut m = [0.0; 9];
                m.copy_from_slice(values);
                UniformValue::Mat3(m)
            }
            CompositionType::Mat4 => {
                let mut m = [0.0; 16];
                m.copy_from_slice(values);
                UniformValue::Mat4(m)
            }
        };
        Some(value)
    }
}

/// Binds one vertex attribute stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferBinding {
    /// Attribute location in the program.
    pub location: u32,
    /// Source buffer.
    pub buffer: BufferId,
    /// Element shape.
    pub composition: CompositionType,
    /// Element component encoding.
    pub component: ComponentType,
    /// Whether integer components are normalized to [0, 1] / [-1, 1].
    pub normalized: bool,
    /// Distance in bytes between consecutive elements.
    pub byte_stride: u32,
    /// Offset in bytes of the first element.
    pub byte_offset: u64,
}

/// Binds an index stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBufferBinding {
    /// Source buffer.
    pub buffer: BufferId,
    /// Index encoding (`U16` or `U32`).
    pub component: ComponentType,
    /// Offset in bytes of the first index.
    pub byte_offset: u64,
}

/// Binds a texture to a named sampler slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    /// Sampler name in the program.
    pub name: String,
    /// Bound texture.
    pub texture: TextureId,
}

/// Binds a storage or uniform buffer to a named slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferBinding {
    /// Binding name in the program.
    pub name: String,
    /// Bound buffer.
    pub buffer: BufferId,
}

/// A render pass draw calls are recorded into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    /// Debug label.
    pub label: String,
    /// Clear color applied when the pass begins, if any.
    pub clear_color: Option<[f32; 4]>,
}

impl RenderPass {
    /// A pass that loads the existing framebuffer contents.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            clear_color: None,
        }
    }
}

/// One fully resolved draw submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Label of the pass this call belongs to.
    pub pass: String,
    /// Program to draw with.
    pub program: ProgramId,
    /// Vertex attribute streams.
    pub vertex_buffers: Vec<VertexBufferBinding>,
    /// Optional index stream.
    pub index_buffer: Option<IndexBufferBinding>,
    /// Number of vertices (or indices, when indexed) to draw.
    pub element_count: u32,
    /// Instance slot the draw reads its per-instance data from.
    pub instance_index: u32,
    /// Slot of the material in its type's parameter columns.
    pub material_slot: u32,
    /// Bound textures.
    pub textures: Vec<TextureBinding>,
    /// Bound storage and uniform buffers.
    pub buffers: Vec<BufferBinding>,
    /// Fixed-function state.
    pub pipeline: PipelineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_from_components() {
        assert_eq!(
            UniformValue::from_components(CompositionType::Scalar, ComponentType::I32, 1, &[3.0]),
            Some(UniformValue::Int(3))
        );
        assert_eq!(
            UniformValue::from_components(
                CompositionType::Vec3,
                ComponentType::F32,
                1,
                &[1.0, 2.0, 3.0]
            ),
            Some(UniformValue::Vec3([1.0, 2.0, 3.0]))
        );
        assert!(matches!(
            UniformValue::from_components(CompositionType::Vec4, ComponentType::F32, 2, &[0.0; 8]),
            Some(UniformValue::Array { .. })
        ));
        assert_eq!(
            UniformValue::from_components(CompositionType::Vec2, ComponentType::F32, 1, &[1.0]),
            None
        );
    }
}
