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

//! Arena contents encoded as texels of RGBA32F textures.
//!
//! Each vec4 of an arena becomes one texel, laid out row-major in a texture
//! `data_texture_width` texels wide. Shader getters compute the texel index
//! from the semantic's offset, the draw's instance and material slots and the
//! element index, then decode the value from one or more texels.

use super::context::StrategyContext;
use super::error::StrategyError;
use super::mesh_uploads::MeshUploads;
use super::prelude::{arena_getter, IndexTerms, ShaderPrelude};
use super::uniform::uniform_getter;
use super::version::{collect_dirty, VersionTracker};
use super::{draw_items, BindingStrategy, DrawItem, PrerenderReport, RenderReport};
use crate::shader_lane::syntax::syntax_for;
use ahash::AHashMap;
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{
    ProgramId, RenderPass, ShaderLanguage, StrategyKind, TextureBinding, TextureDescriptor,
    TextureFormat, TextureId, TextureRegion, UniformValue,
};
use strata_data::layout::{DataLayout, DataScope};
use strata_data::memory::BufferUse;
use strata_data::mesh::MeshComponent;

const INSTANCE_TEXTURE: &str = "u_instanceData";
const GLOBAL_TEXTURE: &str = "u_globalData";
const INSTANCE_INDEX: &str = "u_instanceIndex";
const MATERIAL_SLOT: &str = "u_materialSlot";
const TEXEL_BYTES: usize = 16;

/// One arena mirrored into a float texture.
#[derive(Debug)]
struct DataTexture {
    arena: BufferUse,
    texture: TextureId,
    rows: u32,
}

/// Binding through pixel-encoded float textures.
#[derive(Debug)]
pub struct DataTextureStrategy {
    width: u32,
    instance: DataTexture,
    global: DataTexture,
    tracker: VersionTracker,
    meshes: MeshUploads,
    global_epoch: u64,
    globals_sent: AHashMap<ProgramId, u64>,
}

impl DataTextureStrategy {
    /// Creates the two data textures, sized to hold their whole arena.
    pub fn new(ctx: &StrategyContext<'_>) -> Result<Self, StrategyError> {
        let caps = ctx.device.capabilities();
        if caps.shading_language != ShaderLanguage::Glsl {
            return Err(StrategyError::LanguageMismatch {
                strategy: StrategyKind::DataTexture,
                language: caps.shading_language,
            });
        }
        if !caps.supports_float_textures {
            return Err(StrategyError::Unsupported {
                strategy: StrategyKind::DataTexture,
                reason: "float textures are not available".to_string(),
            });
        }
        let width = ctx.limits.data_texture_width.max(1);
        if width > caps.max_texture_size {
            return Err(StrategyError::Unsupported {
                strategy: StrategyKind::DataTexture,
                reason: format!(
                    "data texture width {width} exceeds the device limit {}",
                    caps.max_texture_size
                ),
            });
        }
        let mut create = |arena: BufferUse, label: &str| -> Result<DataTexture, StrategyError> {
            let bytes = ctx.memory.buffer(arena).byte_length();
            let rows = rows_for(bytes, width);
            if rows > caps.max_texture_size {
                return Err(StrategyError::Unsupported {
                    strategy: StrategyKind::DataTexture,
                    reason: format!(
                        "{label} needs {rows} rows, the device allows {}",
                        caps.max_texture_size
                    ),
                });
            }
            let texture = ctx.device.create_texture(&TextureDescriptor {
                label: label.to_string(),
                width,
                height: rows,
                format: TextureFormat::Rgba32Float,
            })?;
            Ok(DataTexture {
                arena,
                texture,
                rows,
            })
        };
        let instance = create(BufferUse::GpuInstanceData, INSTANCE_TEXTURE)?;
        let global = create(BufferUse::UniformBlock, GLOBAL_TEXTURE)?;
        log::info!(
            "Data texture strategy: {width} texels wide, {} + {} rows",
            instance.rows,
            global.rows
        );
        Ok(Self {
            width,
            instance,
            global,
            tracker: VersionTracker::new(),
            meshes: MeshUploads::default(),
            global_epoch: 0,
            globals_sent: AHashMap::new(),
        })
    }

    /// Last-seen update counts.
    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    /// Width of both data textures, in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The textures holding the instance and the global arena.
    pub fn textures(&self) -> (TextureId, TextureId) {
        (self.instance.texture, self.global.texture)
    }

    /// Copies the used part of `texture`'s arena, padded to whole rows.
    fn upload(
        &self,
        ctx: &StrategyContext<'_>,
        texture: &DataTexture,
    ) -> Result<u64, StrategyError> {
        let buffer = ctx.memory.buffer(texture.arena);
        let mut bytes = buffer.used_bytes();
        let rows = rows_for(bytes.len(), self.width).min(texture.rows);
        bytes.resize(rows as usize * self.width as usize * TEXEL_BYTES, 0);
        ctx.device.write_texture(
            texture.texture,
            TextureRegion::rows(self.width, rows),
            &bytes,
        )?;
        log::trace!("Uploaded {rows} row(s) of {:?}", texture.arena);
        Ok(buffer.write_version())
    }
}

/// Rows needed to hold `bytes`, at least one.
fn rows_for(bytes: usize, width: u32) -> u32 {
    let row_bytes = width as usize * TEXEL_BYTES;
    bytes.div_ceil(row_bytes).max(1) as u32
}

impl BindingStrategy for DataTextureStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DataTexture
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
        if dirty.instance {
            let version = self.upload(ctx, &self.instance)?;
            self.tracker.mark_encoded(BufferUse::GpuInstanceData, version);
            uploads += 1;
        }
        if dirty.global {
            let version = self.upload(ctx, &self.global)?;
            self.tracker.mark_encoded(BufferUse::UniformBlock, version);
            self.global_epoch += 1;
            uploads += 1;
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
        let textures = [
            TextureBinding {
                name: INSTANCE_TEXTURE.to_string(),
                texture: self.instance.texture,
            },
            TextureBinding {
                name: GLOBAL_TEXTURE.to_string(),
                texture: self.global.texture,
            },
        ];
        let globals_sent = &mut self.globals_sent;
        let global_epoch = self.global_epoch;
        let report = draw_items(ctx, &self.meshes, items, |item, gpu, material| {
            let program = item.program;
            ctx.device
                .set_uniform(program, INSTANCE_INDEX, &UniformValue::Int(item.instance.0 as i32))?;
            ctx.device
                .set_uniform(program, MATERIAL_SLOT, &UniformValue::Int(material.slot() as i32))?;
            if globals_sent.get(&program) != Some(&global_epoch) {
                let values = ctx
                    .globals
                    .uniform_values(|info| info.needs_uniform_in_data_texture_mode);
                for (name, value) in values {
                    ctx.device.set_uniform(program, &name, &value)?;
                }
                globals_sent.insert(program, global_epoch);
            }
            let mut call =
                gpu.draw_call(pass, program, item.instance, material, ShaderLanguage::Glsl);
            call.textures.extend(textures.iter().cloned());
            ctx.device.draw(&call)?;
            Ok(())
        })?;
        log::trace!("Frame {}: {} data-texture draws", tick.index, report.draws);
        Ok(report)
    }

    fn shader_prelude(&self, layout: &DataLayout) -> Result<ShaderPrelude, StrategyError> {
        let syntax = syntax_for(ShaderLanguage::Glsl);
        let mut prelude = ShaderPrelude::default();
        prelude.declare(&format!(
            "uniform highp sampler2D {INSTANCE_TEXTURE};\n\
             uniform highp sampler2D {GLOBAL_TEXTURE};\n\
             uniform int {INSTANCE_INDEX};\n\
             uniform int {MATERIAL_SLOT};\n\
             \n\
             vec4 fetchElement(highp sampler2D tex, int index, int width) {{\n    \
             return texelFetch(tex, ivec2(index % width, index / width), 0);\n\
             }}\n"
        ));
        let terms = IndexTerms {
            index_type: "int",
            literal_suffix: "",
            instance: INSTANCE_INDEX,
            material_slot: MATERIAL_SLOT,
            element: "index",
        };
        let width = self.width;
        for entry in &layout.entries {
            if entry.uniform_in_data_texture {
                prelude.add_getter(entry, &uniform_getter(syntax, entry));
                continue;
            }
            let texture = match entry.scope {
                DataScope::Global => GLOBAL_TEXTURE,
                DataScope::Instance | DataScope::Material => INSTANCE_TEXTURE,
            };
            let getter = arena_getter(syntax, entry, &terms, |index| {
                format!("fetchElement({texture}, {index}, {width})")
            });
            prelude.add_getter(entry, &getter);
        }
        Ok(prelude)
    }
}
