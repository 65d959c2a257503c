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

//! Defines the RenderAgent, which drives the active binding strategy through
//! the process stages and keeps every drawn material's program resolved.

use super::program_builder::{ProgramBuilder, ShaderErrorCallback};
use super::selection::{program_layout, select_strategy};
use ahash::AHashMap;
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{GraphicsDevice, RenderPass, StrategyKind};
use strata_data::mesh::MeshComponent;
use strata_data::{GlobalDataRepository, InstanceDataRepository, MaterialRepository, MeshRepository};
use strata_lanes::{
    ActiveStrategy, BindingStrategy, DrawItem, ShaderPrelude, StrategyContext, StrategyError,
};

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame counter at the time of the render.
    pub frame: u64,
    /// Re-encode passes performed during PreRender.
    pub uploads: usize,
    /// Draw calls submitted.
    pub draw_calls: usize,
    /// Primitives not drawn: no program, unloaded, or material gone.
    pub skipped_draws: usize,
    /// Programs compiled this frame.
    pub programs_built: usize,
    /// Program builds that failed this frame.
    pub program_failures: usize,
}

/// The agent responsible for the GPU data path of every drawable.
#[derive(Debug)]
pub struct RenderAgent {
    // The one strategy chosen at startup.
    strategy: ActiveStrategy,
    // Node graphs by material type and the compile-failure hook.
    programs: ProgramBuilder,
    // Drawables loaded through `load`, in load order.
    drawables: Vec<MeshComponent>,
    // Data prelude per material type; a type's layout is fixed once registered.
    preludes: AHashMap<String, Result<ShaderPrelude, StrategyError>>,
    // Counters of the frame being assembled.
    pending: FrameStats,
    // Counters of the last rendered frame.
    last_frame: FrameStats,
    // Total number of frames rendered since agent creation.
    frame_count: u64,
}

impl RenderAgent {
    /// Creates the agent with the strategy the device can host.
    ///
    /// # Arguments
    ///
    /// * `ctx`: The repositories and the device, as seen during Create.
    /// * `requested`: A strategy forced by configuration, if any.
    pub fn new(ctx: &StrategyContext<'_>, requested: Option<StrategyKind>) -> Result<Self, StrategyError> {
        Ok(Self::with_strategy(select_strategy(ctx, requested)?))
    }

    /// Creates the agent around an already built strategy.
    pub fn with_strategy(strategy: ActiveStrategy) -> Self {
        Self {
            strategy,
            programs: ProgramBuilder::new(),
            drawables: Vec::new(),
            preludes: AHashMap::new(),
            pending: FrameStats::default(),
            last_frame: FrameStats::default(),
            frame_count: 0,
        }
    }

    /// The active strategy.
    pub fn strategy(&self) -> &ActiveStrategy {
        &self.strategy
    }

    /// Which strategy is active.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// The program builder holding the node graphs.
    pub fn programs(&self) -> &ProgramBuilder {
        &self.programs
    }

    /// Mutable access to the program builder, to register graphs.
    ///
    /// Cached preludes stay valid: they depend on a type's layout, not on its
    /// graph.
    pub fn programs_mut(&mut self) -> &mut ProgramBuilder {
        &mut self.programs
    }

    /// Installs the hook called on every compilation failure.
    pub fn set_shader_error_callback(&mut self, callback: ShaderErrorCallback) {
        self.programs.set_shader_error_callback(callback);
    }

    /// The data prelude programs of `type_name` are generated against.
    pub fn prelude_for(
        &mut self,
        globals: &GlobalDataRepository,
        instances: &InstanceDataRepository,
        materials: &MaterialRepository,
        type_name: &str,
    ) -> Result<&ShaderPrelude, StrategyError> {
        let strategy = &self.strategy;
        let prelude = self.preludes.entry(type_name.to_string()).or_insert_with(|| {
            let layout = program_layout(globals, instances, materials, Some(type_name));
            let prelude = strategy.shader_prelude(&layout);
            if let Err(err) = &prelude {
                log::warn!("Material type '{type_name}' cannot be drawn with {}: {err}", strategy.kind());
            }
            prelude
        });
        prelude.as_ref().map_err(Clone::clone)
    }

    // --- Load / Unmount ---

    /// Creates the device resources of a drawable and schedules it for
    /// drawing. Loading the same component twice is a no-op.
    pub fn load(&mut self, ctx: &StrategyContext<'_>, component: MeshComponent) -> Result<(), StrategyError> {
        if self.drawables.contains(&component) {
            return Ok(());
        }
        self.strategy.load(ctx, &component)?;
        self.drawables.push(component);
        Ok(())
    }

    /// Stops drawing `component`. Returns `false` if it was not loaded.
    pub fn unmount(&mut self, component: &MeshComponent) -> bool {
        let before = self.drawables.len();
        self.drawables.retain(|c| c != component);
        self.drawables.len() != before
    }

    /// Drawables currently scheduled.
    pub fn drawables(&self) -> &[MeshComponent] {
        &self.drawables
    }

    // --- PreRender ---

    /// Uploads whatever advanced since the last frame.
    pub fn prerender(&mut self, ctx: &StrategyContext<'_>, counts: &UpdateCounts) -> Result<usize, StrategyError> {
        let report = self.strategy.prerender(ctx, counts)?;
        self.pending.uploads += report.uploads;
        Ok(report.uploads)
    }

    /// Resolves the program of every scheduled primitive, building missing
    /// ones.
    ///
    /// Runs between PreRender and Render; the only stage that needs the
    /// materials mutably. Primitives without a program are left out and
    /// counted as skipped.
    pub fn resolve_draws(
        &mut self,
        device: &dyn GraphicsDevice,
        globals: &GlobalDataRepository,
        instances: &InstanceDataRepository,
        meshes: &MeshRepository,
        materials: &mut MaterialRepository,
    ) -> Vec<DrawItem> {
        let kind = self.strategy.kind();
        let language = self.strategy.language();
        let built_before = self.programs.built();
        let failed_before = self.programs.failed();
        let mut items = Vec::new();

        for component in self.drawables.clone() {
            let Some(mesh) = meshes.mesh(component.mesh) else {
                log::debug!("Mesh {:?} is gone, skipping", component.mesh);
                self.pending.skipped_draws += 1;
                continue;
            };
            for &primitive_id in &mesh.primitives {
                let Some(primitive) = meshes.primitive(primitive_id) else {
                    self.pending.skipped_draws += 1;
                    continue;
                };
                let handle = primitive.material();
                let Some(material) = materials.get(handle) else {
                    self.pending.skipped_draws += 1;
                    continue;
                };

                if let Some(program) = material.get_shader_program_uid(primitive, kind) {
                    items.push(DrawItem {
                        primitive: primitive_id,
                        instance: component.instance,
                        program,
                    });
                    continue;
                }

                let type_name = material.type_name().to_string();
                if self.prelude_for(globals, instances, materials, &type_name).is_err() {
                    self.pending.skipped_draws += 1;
                    continue;
                }
                let (Some(Ok(prelude)), Some(material)) =
                    (self.preludes.get(&type_name), materials.get_mut(handle))
                else {
                    self.pending.skipped_draws += 1;
                    continue;
                };
                let mut factory = self.programs.factory(device, prelude, language);
                match material.get_or_create_program(primitive, kind, &mut factory) {
                    Ok(Some(program)) => items.push(DrawItem {
                        primitive: primitive_id,
                        instance: component.instance,
                        program,
                    }),
                    Ok(None) => {
                        log::trace!("No program for {primitive_id:?} yet");
                        self.pending.skipped_draws += 1;
                    }
                    Err(err) => {
                        log::error!("Cannot build a program for {primitive_id:?}: {err}");
                        self.pending.skipped_draws += 1;
                    }
                }
            }
        }

        self.pending.programs_built += self.programs.built() - built_before;
        self.pending.program_failures += self.programs.failed() - failed_before;
        items
    }

    // --- Render ---

    /// Draws `items` and closes the frame.
    pub fn render(
        &mut self,
        ctx: &StrategyContext<'_>,
        items: &[DrawItem],
        pass: &RenderPass,
        tick: FrameTick,
    ) -> Result<FrameStats, StrategyError> {
        let report = self.strategy.render(ctx, items, pass, tick)?;
        let mut stats = std::mem::take(&mut self.pending);
        stats.frame = tick.index;
        stats.draw_calls = report.draws;
        stats.skipped_draws += report.skipped;
        self.frame_count += 1;
        self.last_frame = stats;
        log::trace!("Frame {}: {stats:?}", tick.index);
        Ok(stats)
    }

    /// Counters of the last rendered frame.
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Frames rendered since creation.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
