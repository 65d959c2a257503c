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

//! Arena contents mirrored into read-only storage buffers.

use super::context::StrategyContext;
use super::error::StrategyError;
use super::mesh_uploads::MeshUploads;
use super::prelude::{arena_getter, IndexTerms, ShaderPrelude};
use super::version::{collect_dirty, VersionTracker};
use super::{draw_items, BindingStrategy, DrawItem, PrerenderReport, RenderReport};
use crate::shader_lane::syntax::syntax_for;
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{
    BufferBinding, BufferDescriptor, BufferId, DeviceBufferUsage, RenderPass, ShaderLanguage,
    StrategyKind,
};
use strata_data::layout::{DataLayout, DataScope};
use strata_data::memory::BufferUse;
use strata_data::mesh::MeshComponent;

const INSTANCE_BUFFER: &str = "storageData";
const GLOBAL_BUFFER: &str = "globalData";

const DECLARATIONS: &str = "\
struct DrawParams {
    instance_index: u32,
    material_slot: u32,
    padding0: u32,
    padding1: u32,
};

@group(0) @binding(0) var<storage, read> storageData: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read> globalData: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> drawParams: DrawParams;
";

#[derive(Debug)]
struct StorageMirror {
    arena: BufferUse,
    buffer: BufferId,
}

/// Binding through storage buffers.
///
/// The per-draw `drawParams` uniform is filled by the backend from
/// [`DrawCall::instance_index`](strata_core::renderer::DrawCall::instance_index)
/// and `material_slot`.
#[derive(Debug)]
pub struct StorageBufferStrategy {
    instance: StorageMirror,
    global: StorageMirror,
    tracker: VersionTracker,
    meshes: MeshUploads,
}

impl StorageBufferStrategy {
    /// Creates one storage buffer per uploaded arena.
    pub fn new(ctx: &StrategyContext<'_>) -> Result<Self, StrategyError> {
        let caps = ctx.device.capabilities();
        if caps.shading_language != ShaderLanguage::Wgsl {
            return Err(StrategyError::LanguageMismatch {
                strategy: StrategyKind::StorageBuffer,
                language: caps.shading_language,
            });
        }
        if !caps.supports_storage_buffers {
            return Err(StrategyError::Unsupported {
                strategy: StrategyKind::StorageBuffer,
                reason: "storage buffers are not available".to_string(),
            });
        }
        let create = |arena: BufferUse, label: &str| -> Result<StorageMirror, StrategyError> {
            let size = ctx.memory.buffer(arena).byte_length() as u64;
            if size > caps.max_storage_buffer_binding_size {
                return Err(StrategyError::Unsupported {
                    strategy: StrategyKind::StorageBuffer,
                    reason: format!(
                        "{label} needs {size} bytes, the device binds at most {}",
                        caps.max_storage_buffer_binding_size
                    ),
                });
            }
            let buffer = ctx.device.create_buffer(
                &BufferDescriptor {
                    label: label.to_string(),
                    size,
                    usage: DeviceBufferUsage::Storage,
                },
                &[],
            )?;
            Ok(StorageMirror { arena, buffer })
        };
        let instance = create(BufferUse::GpuInstanceData, INSTANCE_BUFFER)?;
        let global = create(BufferUse::UniformBlock, GLOBAL_BUFFER)?;
        log::info!("Storage buffer strategy ready");
        Ok(Self {
            instance,
            global,
            tracker: VersionTracker::new(),
            meshes: MeshUploads::default(),
        })
    }

    /// Last-seen update counts.
    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    /// The buffers mirroring the instance and the global arena.
    pub fn buffers(&self) -> (BufferId, BufferId) {
        (self.instance.buffer, self.global.buffer)
    }

    fn upload(ctx: &StrategyContext<'_>, mirror: &StorageMirror) -> Result<u64, StrategyError> {
        let buffer = ctx.memory.buffer(mirror.arena);
        let bytes = buffer.used_bytes();
        ctx.device.write_buffer(mirror.buffer, 0, &bytes)?;
        log::trace!("Uploaded {} bytes of {:?}", bytes.len(), mirror.arena);
        Ok(buffer.write_version())
    }
}

impl BindingStrategy for StorageBufferStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StorageBuffer
    }

    fn load(
        &mut self,
        ctx: &StrategyContext<'_>,
        component: &MeshComponent,
    ) -> Result<(), StrategyError> {
        self.meshes.load(ctx, component).map(|_| ())
    }

    fn prerender(
        &mut self,
        ctx: &StrategyContext<'_>,
        counts: &UpdateCounts,
    ) -> Result<PrerenderReport, StrategyError> {
        let dirty = collect_dirty(&mut self.tracker, counts, ctx);
        let mut uploads = 0;
        for mirror in [&self.instance, &self.global] {
            if dirty.is_dirty(mirror.arena) {
                let version = Self::upload(ctx, mirror)?;
                self.tracker.mark_encoded(mirror.arena, version);
                uploads += 1;
            }
        }
        Ok(PrerenderReport {
            uploads,
            advanced: dirty.advanced,
        })
    }

    fn render(
        &mut self,
        ctx: &StrategyContext<'_>,
        items: &[DrawItem],
        pass: &RenderPass,
        tick: FrameTick,
    ) -> Result<RenderReport, StrategyError> {
        let buffers = [
            BufferBinding {
                name: INSTANCE_BUFFER.to_string(),
                buffer: self.instance.buffer,
            },
            BufferBinding {
                name: GLOBAL_BUFFER.to_string(),
                buffer: self.global.buffer,
            },
        ];
        let report = draw_items(ctx, &self.meshes, items, |item, gpu, material| {
            let mut call =
                gpu.draw_call(pass, item.program, item.instance, material, ShaderLanguage::Wgsl);
            call.buffers.extend(buffers.iter().cloned());
            ctx.device.draw(&call)?;
            Ok(())
        })?;
        log::trace!("Frame {}: {} storage-buffer draws", tick.index, report.draws);
        Ok(report)
    }

    fn shader_prelude(&self, layout: &DataLayout) -> Result<ShaderPrelude, StrategyError> {
        let syntax = syntax_for(ShaderLanguage::Wgsl);
        let mut prelude = ShaderPrelude::default();
        prelude.declare(DECLARATIONS);
        let terms = IndexTerms {
            index_type: "u32",
            literal_suffix: "u",
            instance: "drawParams.instance_index",
            material_slot: "drawParams.material_slot",
            element: "u32(index)",
        };
        for entry in &layout.entries {
            let buffer = match entry.scope {
                DataScope::Global => GLOBAL_BUFFER,
                DataScope::Instance | DataScope::Material => INSTANCE_BUFFER,
            };
            let getter = arena_getter(syntax, entry, &terms, |index| format!("{buffer}[{index}]"));
            prelude.add_getter(entry, &getter);
        }
        Ok(prelude)
    }
}
