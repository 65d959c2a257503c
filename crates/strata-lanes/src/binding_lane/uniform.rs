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

//! One uniform variable per semantic, written per draw.
//!
//! Usable only when every value a program reads fits the device's uniform
//! vector limits, which bounds how many lights, bones and cameras the engine
//! may be configured with.

use super::context::StrategyContext;
use super::error::StrategyError;
use super::mesh_uploads::MeshUploads;
use super::prelude::{getter_definition, ShaderPrelude};
use super::version::{collect_dirty, VersionTracker};
use super::{draw_items, BindingStrategy, DrawItem, PrerenderReport, RenderReport};
use crate::shader_lane::syntax::{syntax_for, LanguageSyntax};
use ahash::AHashMap;
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{
    DeviceCapabilities, ProgramId, RenderPass, ShaderLanguage, ShaderStage, StrategyKind,
};
use strata_data::instance_data::InstanceSlot;
use strata_data::layout::{DataLayout, LayoutEntry};
use strata_data::memory::BufferUse;
use strata_data::mesh::MeshComponent;

/// Declaration and getter of `entry` as a plain uniform.
pub(crate) fn uniform_getter(syntax: &dyn LanguageSyntax, entry: &LayoutEntry) -> String {
    let ty = syntax.type_name(entry.composition, entry.component);
    let name = entry.uniform_name();
    let (declaration, read) = if entry.is_array() {
        (
            format!("uniform {ty} {name}[{}];", entry.array_length),
            format!("{name}[index]"),
        )
    } else {
        (format!("uniform {ty} {name};"), name.clone())
    };
    format!(
        "{declaration}\n{}",
        getter_definition(syntax, entry, &[], &read)
    )
}

/// Which values a program currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundValues {
    instance: InstanceSlot,
    material: u32,
    epoch: u64,
}

/// Binding through uniform variables.
#[derive(Debug)]
pub struct UniformStrategy {
    capabilities: DeviceCapabilities,
    tracker: VersionTracker,
    meshes: MeshUploads,
    global_epoch: u64,
    instance_epoch: u64,
    globals_sent: AHashMap<ProgramId, u64>,
    bound: AHashMap<ProgramId, BoundValues>,
}

impl UniformStrategy {
    /// Creates the strategy for a device with `capabilities`.
    pub fn new(capabilities: &DeviceCapabilities) -> Result<Self, StrategyError> {
        if capabilities.shading_language != ShaderLanguage::Glsl {
            return Err(StrategyError::LanguageMismatch {
                strategy: StrategyKind::Uniform,
                language: capabilities.shading_language,
            });
        }
        Ok(Self {
            capabilities: capabilities.clone(),
            tracker: VersionTracker::new(),
            meshes: MeshUploads::default(),
            global_epoch: 0,
            instance_epoch: 0,
            globals_sent: AHashMap::new(),
            bound: AHashMap::new(),
        })
    }

    /// Last-seen update counts.
    pub fn tracker(&self) -> &VersionTracker {
        &self.tracker
    }

    /// Checks that `layout` fits the uniform limits of both stages.
    pub fn check_limits(&self, layout: &DataLayout) -> Result<(), StrategyError> {
        for (stage, available) in [
            (ShaderStage::Vertex, self.capabilities.max_vertex_uniform_vectors),
            (ShaderStage::Pixel, self.capabilities.max_fragment_uniform_vectors),
        ] {
            let needed: usize = layout
                .entries
                .iter()
                .filter(|e| e.stage.includes(stage))
                .map(LayoutEntry::uniform_vectors)
                .sum();
            if needed > available as usize {
                return Err(StrategyError::TooManyUniforms {
                    stage,
                    needed,
                    available: available as usize,
                });
            }
        }
        Ok(())
    }
}

impl BindingStrategy for UniformStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Uniform
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
        // Nothing is copied here: advancing an epoch makes the next draw of
        // every program re-send the affected uniforms.
        if dirty.global {
            self.global_epoch += 1;
            uploads += 1;
        }
        if dirty.instance {
            self.instance_epoch += 1;
            uploads += 1;
        }
        for arena in [BufferUse::GpuInstanceData, BufferUse::UniformBlock] {
            if dirty.is_dirty(arena) {
                self.tracker
                    .mark_encoded(arena, ctx.memory.buffer(arena).write_version());
            }
        }
        if uploads > 0 {
            log::trace!("Uniform strategy invalidated {uploads} region(s)");
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
        let globals_sent = &mut self.globals_sent;
        let bound = &mut self.bound;
        let (global_epoch, instance_epoch) = (self.global_epoch, self.instance_epoch);
        let report = draw_items(ctx, &self.meshes, items, |item, gpu, material| {
            let program = item.program;
            if globals_sent.get(&program) != Some(&global_epoch) {
                for (name, value) in ctx.globals.uniform_values(|_| true) {
                    ctx.device.set_uniform(program, &name, &value)?;
                }
                globals_sent.insert(program, global_epoch);
            }
            let values = BoundValues {
                instance: item.instance,
                material: material.instance_id(),
                epoch: instance_epoch,
            };
            if bound.get(&program) != Some(&values) {
                for (name, value) in ctx.instances.uniform_values(item.instance) {
                    ctx.device.set_uniform(program, &name, &value)?;
                }
                for (name, value) in ctx.materials.uniform_values(material) {
                    ctx.device.set_uniform(program, &name, &value)?;
                }
                bound.insert(program, values);
            }
            let call = gpu.draw_call(pass, program, item.instance, material, ShaderLanguage::Glsl);
            ctx.device.draw(&call)?;
            Ok(())
        })?;
        log::trace!("Frame {}: {} uniform-mode draws", tick.index, report.draws);
        Ok(report)
    }

    fn shader_prelude(&self, layout: &DataLayout) -> Result<ShaderPrelude, StrategyError> {
        self.check_limits(layout)?;
        let syntax = syntax_for(ShaderLanguage::Glsl);
        let mut prelude = ShaderPrelude::default();
        for entry in &layout.entries {
            prelude.add_getter(entry, &uniform_getter(syntax, entry));
        }
        Ok(prelude)
    }
}
