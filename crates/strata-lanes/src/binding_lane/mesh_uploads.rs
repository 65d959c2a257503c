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

//! One-time device resources of drawable primitives, shared by all strategies.

use super::context::StrategyContext;
use super::error::StrategyError;
use ahash::AHashMap;
use strata_core::renderer::{
    BufferDescriptor, DeviceBufferUsage, DrawCall, IndexBufferBinding, ProgramId, RenderPass,
    ShaderLanguage, TextureBinding, VertexBufferBinding,
};
use strata_data::instance_data::InstanceSlot;
use strata_data::material::Material;
use strata_data::mesh::{MeshComponent, PrimitiveId};

/// Vertex and index buffers of one loaded primitive.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GpuPrimitive {
    pub vertex_buffers: Vec<VertexBufferBinding>,
    pub index_buffer: Option<IndexBufferBinding>,
    pub element_count: u32,
}

impl GpuPrimitive {
    /// A draw of this primitive with the material's textures and pipeline
    /// state. Strategies append their own bindings.
    pub fn draw_call(
        &self,
        pass: &RenderPass,
        program: ProgramId,
        instance: InstanceSlot,
        material: &Material,
        language: ShaderLanguage,
    ) -> DrawCall {
        let textures = material
            .texture_bindings()
            .into_iter()
            .map(|(semantic, texture)| TextureBinding {
                name: texture_binding_name(language, semantic),
                texture,
            })
            .collect();
        DrawCall {
            pass: pass.label.clone(),
            program,
            vertex_buffers: self.vertex_buffers.clone(),
            index_buffer: self.index_buffer.clone(),
            element_count: self.element_count,
            instance_index: instance.0,
            material_slot: material.slot() as u32,
            textures,
            buffers: Vec::new(),
            pipeline: *material.pipeline(),
        }
    }
}

/// Name of the sampler slot a material texture is bound to.
pub(crate) fn texture_binding_name(language: ShaderLanguage, semantic: &str) -> String {
    match language {
        ShaderLanguage::Glsl => format!("u_{semantic}"),
        ShaderLanguage::Wgsl => format!("t_{semantic}"),
    }
}

#[derive(Debug, Default)]
pub(crate) struct MeshUploads {
    primitives: AHashMap<PrimitiveId, GpuPrimitive>,
}

impl MeshUploads {
    /// Creates buffers for every primitive of the component's mesh not loaded
    /// yet. Returns the number of primitives uploaded.
    pub fn load(
        &mut self,
        ctx: &StrategyContext<'_>,
        component: &MeshComponent,
    ) -> Result<usize, StrategyError> {
        let mesh = ctx
            .meshes
            .mesh(component.mesh)
            .ok_or(StrategyError::MissingMesh(component.mesh))?;
        let mut uploaded = 0;
        for &id in &mesh.primitives {
            if self.primitives.contains_key(&id) {
                continue;
            }
            let primitive = ctx
                .meshes
                .primitive(id)
                .ok_or(StrategyError::MissingPrimitive(id))?;

            let mut vertex_buffers = Vec::new();
            for (attribute, accessor) in primitive.attributes() {
                let bytes = accessor.to_bytes();
                let buffer = ctx.device.create_buffer(
                    &BufferDescriptor {
                        label: format!("{}:{}", mesh.name, attribute.name()),
                        size: bytes.len() as u64,
                        usage: DeviceBufferUsage::Vertex,
                    },
                    &bytes,
                )?;
                vertex_buffers.push(VertexBufferBinding {
                    location: attribute.location(),
                    buffer,
                    composition: accessor.composition(),
                    component: accessor.component(),
                    normalized: accessor.normalized(),
                    byte_stride: accessor.byte_stride() as u32,
                    byte_offset: 0,
                });
            }

            let index_buffer = match primitive.indices() {
                Some(indices) => {
                    let bytes = indices.to_bytes();
                    let buffer = ctx.device.create_buffer(
                        &BufferDescriptor {
                            label: format!("{}:indices", mesh.name),
                            size: bytes.len() as u64,
                            usage: DeviceBufferUsage::Index,
                        },
                        &bytes,
                    )?;
                    Some(IndexBufferBinding {
                        buffer,
                        component: indices.component(),
                        byte_offset: 0,
                    })
                }
                None => None,
            };

            self.primitives.insert(
                id,
                GpuPrimitive {
                    vertex_buffers,
                    index_buffer,
                    element_count: primitive.element_count() as u32,
                },
            );
            uploaded += 1;
        }
        if uploaded > 0 {
            log::debug!("Loaded {uploaded} primitive(s) of mesh '{}'", mesh.name);
        }
        Ok(uploaded)
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&GpuPrimitive> {
        self.primitives.get(&id)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }
}

