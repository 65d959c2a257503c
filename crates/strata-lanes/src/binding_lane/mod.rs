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

//! The binding strategies: the only code that moves arena data to the device.
//!
//! Exactly one strategy is active per engine. Each one implements
//! [`BindingStrategy`] and is wrapped in the closed [`ActiveStrategy`] enum,
//! so dispatch is a `match` the compiler checks for exhaustiveness.

mod context;
mod data_texture;
mod error;
mod mesh_uploads;
mod prelude;
mod storage;
mod uniform;
mod version;

pub use context::StrategyContext;
pub use data_texture::DataTextureStrategy;
pub use error::StrategyError;
pub use prelude::{GetterSignature, ShaderPrelude, StagePrelude};
pub use storage::StorageBufferStrategy;
pub use uniform::UniformStrategy;
pub use version::{DataSource, VersionTracker};

use mesh_uploads::{GpuPrimitive, MeshUploads};
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{ProgramId, RenderPass, ShaderLanguage, StrategyKind};
use strata_data::instance_data::InstanceSlot;
use strata_data::layout::DataLayout;
use strata_data::material::Material;
use strata_data::mesh::{MeshComponent, PrimitiveId};

/// One primitive of one entity, with the program resolved for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    /// What to draw.
    pub primitive: PrimitiveId,
    /// Whose instance values to draw it with.
    pub instance: InstanceSlot,
    /// Program of the primitive's material for the active strategy.
    pub program: ProgramId,
}

/// Outcome of a pre-render step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerenderReport {
    /// Re-encode passes performed, one per dirty arena.
    pub uploads: usize,
    /// Sources whose update count advanced.
    pub advanced: Vec<DataSource>,
}

/// Outcome of a render step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Draw calls submitted.
    pub draws: usize,
    /// Items skipped because their primitive or material is unavailable.
    pub skipped: usize,
}

/// The contract every binding strategy implements.
///
/// Strategies are driven through the process stages in order: `load` during
/// Load, `prerender` during PreRender, `render` during Render.
pub trait BindingStrategy {
    /// Returns which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// The language programs for this strategy must be written in.
    fn language(&self) -> ShaderLanguage {
        self.kind().language()
    }

    /// Creates the device resources of a drawable, once.
    ///
    /// # Arguments
    ///
    /// * `ctx`: The repositories and the device.
    /// * `component`: The mesh and instance slot of the drawable.
    fn load(
        &mut self,
        ctx: &StrategyContext<'_>,
        component: &MeshComponent,
    ) -> Result<(), StrategyError>;

    /// Re-encodes and uploads the data whose sources advanced since the last
    /// call. This is the only place uploads of arena data happen.
    ///
    /// # Arguments
    ///
    /// * `ctx`: The repositories and the device.
    /// * `counts`: Update counts published by the scene collaborators.
    fn prerender(
        &mut self,
        ctx: &StrategyContext<'_>,
        counts: &UpdateCounts,
    ) -> Result<PrerenderReport, StrategyError>;

    /// Issues one draw call per item.
    ///
    /// Items whose primitive is not loaded or whose material no longer exists
    /// are skipped and counted, never drawn half-bound.
    fn render(
        &mut self,
        ctx: &StrategyContext<'_>,
        items: &[DrawItem],
        pass: &RenderPass,
        tick: FrameTick,
    ) -> Result<RenderReport, StrategyError>;

    /// The data-access code programs for `layout` start with.
    fn shader_prelude(&self, layout: &DataLayout) -> Result<ShaderPrelude, StrategyError>;
}

/// The strategy chosen at startup.
#[derive(Debug)]
pub enum ActiveStrategy {
    /// Uniform variables.
    Uniform(UniformStrategy),
    /// Pixel-encoded float textures.
    DataTexture(DataTextureStrategy),
    /// Read-only storage buffers.
    StorageBuffer(StorageBufferStrategy),
}

impl ActiveStrategy {
    fn inner(&self) -> &dyn BindingStrategy {
        match self {
            ActiveStrategy::Uniform(s) => s,
            ActiveStrategy::DataTexture(s) => s,
            ActiveStrategy::StorageBuffer(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BindingStrategy {
        match self {
            ActiveStrategy::Uniform(s) => s,
            ActiveStrategy::DataTexture(s) => s,
            ActiveStrategy::StorageBuffer(s) => s,
        }
    }
}

impl BindingStrategy for ActiveStrategy {
    fn kind(&self) -> StrategyKind {
        self.inner().kind()
    }

    fn load(
        &mut self,
        ctx: &StrategyContext<'_>,
        component: &MeshComponent,
    ) -> Result<(), StrategyError> {
        self.inner_mut().load(ctx, component)
    }

    fn prerender(
        &mut self,
        ctx: &StrategyContext<'_>,
        counts: &UpdateCounts,
    ) -> Result<PrerenderReport, StrategyError> {
        self.inner_mut().prerender(ctx, counts)
    }

    fn render(
        &mut self,
        ctx: &StrategyContext<'_>,
        items: &[DrawItem],
        pass: &RenderPass,
        tick: FrameTick,
    ) -> Result<RenderReport, StrategyError> {
        self.inner_mut().render(ctx, items, pass, tick)
    }

    fn shader_prelude(&self, layout: &DataLayout) -> Result<ShaderPrelude, StrategyError> {
        self.inner().shader_prelude(layout)
    }
}

/// Walks `items`, handing each drawable one to `draw` and counting the rest.
pub(crate) fn draw_items<'a>(
    ctx: &StrategyContext<'a>,
    meshes: &MeshUploads,
    items: &[DrawItem],
    mut draw: impl FnMut(&DrawItem, &GpuPrimitive, &'a Material) -> Result<(), StrategyError>,
) -> Result<RenderReport, StrategyError> {
    let mut report = RenderReport::default();
    for item in items {
        let material = ctx
            .meshes
            .primitive(item.primitive)
            .and_then(|p| ctx.materials.get(p.material()));
        let (Some(material), Some(gpu)) = (material, meshes.get(item.primitive)) else {
            log::debug!("Skipping draw of {:?}: not loaded or material gone", item.primitive);
            report.skipped += 1;
            continue;
        };
        draw(item, gpu, material)?;
        report.draws += 1;
    }
    Ok(report)
}

#[cfg(test)]
pub(crate) mod test_support;
