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

//! The engine context: owns every repository and drives the process stages.

use crate::config::EngineConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use strata_agents::{FrameStats, RenderAgent, ShaderErrorCallback};
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{GraphicsDevice, RenderPass, StrategyKind};
use strata_core::{ProcessStage, StageCursor};
use strata_data::material::{MaterialHandle, MaterialTypeDescriptor};
use strata_data::mesh::{MeshComponent, MeshId, Primitive, VertexAttribute};
use strata_data::{
    EngineLimits, GlobalDataRepository, InstanceDataRepository, MaterialRepository, MemoryManager,
    MeshRepository, SemanticsRegistry,
};
use strata_lanes::{DrawItem, ShaderGraph, SortedGraph, StrategyContext};

/// Arenas and repositories, kept apart from the agent so both can be
/// borrowed at once.
struct Repositories {
    limits: EngineLimits,
    memory: MemoryManager,
    registry: SemanticsRegistry,
    globals: GlobalDataRepository,
    instances: InstanceDataRepository,
    materials: MaterialRepository,
    meshes: MeshRepository,
}

impl Repositories {
    fn ctx<'a>(&'a self, device: &'a dyn GraphicsDevice) -> StrategyContext<'a> {
        StrategyContext {
            device,
            memory: &self.memory,
            globals: &self.globals,
            instances: &self.instances,
            materials: &self.materials,
            meshes: &self.meshes,
            limits: &self.limits,
        }
    }
}

/// One running engine.
///
/// There are no global singletons: every repository lives here and is
/// reached through the accessors.
pub struct Engine {
    device: Arc<dyn GraphicsDevice>,
    data: Repositories,
    agent: RenderAgent,
    stages: StageCursor,
    pending_loads: Vec<MeshComponent>,
    draw_items: Vec<DrawItem>,
    pass: RenderPass,
    frame_index: u64,
    started: Instant,
}

impl Engine {
    /// Sizes the arenas from `config`, builds the repositories and picks the
    /// binding strategy for `device`.
    pub fn new(config: &EngineConfig, device: Arc<dyn GraphicsDevice>) -> Result<Self> {
        let mut stages = StageCursor::new();
        stages.enter(ProcessStage::Create)?;

        let limits = config.limits.clone();
        let mut memory = MemoryManager::new(&limits).context("Cannot allocate the arenas")?;
        let registry = SemanticsRegistry::with_builtins(&limits);
        let globals = GlobalDataRepository::initialize(&mut memory, &registry, &limits)
            .context("Cannot lay out the global data")?;
        let instances = InstanceDataRepository::initialize(&mut memory, &registry, &limits)
            .context("Cannot lay out the instance data")?;
        let data = Repositories {
            materials: MaterialRepository::new(&limits),
            meshes: MeshRepository::new(),
            limits,
            memory,
            registry,
            globals,
            instances,
        };

        let agent = RenderAgent::new(&data.ctx(device.as_ref()), config.strategy_override)
            .context("No binding strategy fits the device")?;
        log::info!(
            "Engine created on '{}' with the {} strategy",
            device.capabilities().backend_name,
            agent.strategy_kind()
        );
        Ok(Self {
            device,
            data,
            agent,
            stages,
            pending_loads: Vec::new(),
            draw_items: Vec::new(),
            pass: RenderPass::new("main"),
            frame_index: 0,
            started: Instant::now(),
        })
    }

    // --- Content ---

    /// Registers a material type and the node graph its programs are
    /// generated from.
    pub fn register_material_type(
        &mut self,
        descriptor: MaterialTypeDescriptor,
        graph: SortedGraph,
    ) -> Result<()> {
        let type_name = descriptor.type_name.clone();
        let data = &mut self.data;
        data.materials
            .register_type(&mut data.memory, &data.registry, descriptor)
            .with_context(|| format!("Cannot register material type '{type_name}'"))?;
        self.agent.programs_mut().register_graph(type_name, graph);
        Ok(())
    }

    /// Like [`Self::register_material_type`], with the graph given as JSON.
    pub fn register_material_type_json(
        &mut self,
        descriptor: MaterialTypeDescriptor,
        graph_json: &str,
    ) -> Result<()> {
        let graph = ShaderGraph::from_json(graph_json)
            .with_context(|| format!("Invalid node graph for '{}'", descriptor.type_name))?;
        self.register_material_type(descriptor, graph)
    }

    /// Creates a material of a registered type.
    pub fn create_material(&mut self, type_name: &str) -> Result<MaterialHandle> {
        Ok(self.data.materials.create_material(type_name)?)
    }

    /// Copies vertex data into the vertex arena as a new primitive.
    pub fn create_primitive(
        &mut self,
        label: &str,
        material: MaterialHandle,
        attributes: &[(VertexAttribute, &[f32])],
        indices: Option<&[u32]>,
    ) -> Result<Primitive> {
        Primitive::from_vertex_data(&mut self.data.memory, label, material, attributes, indices)
            .with_context(|| format!("Cannot store the vertex data of '{label}'"))
    }

    /// Adds a mesh made of `primitives`.
    pub fn add_mesh(&mut self, name: impl Into<String>, primitives: Vec<Primitive>) -> MeshId {
        self.data.meshes.add_mesh(name, primitives)
    }

    /// Creates a drawable entity of `mesh`. Its device resources are created
    /// during the next frame's Load stage.
    pub fn spawn(&mut self, mesh: MeshId) -> Result<MeshComponent> {
        if self.data.meshes.mesh(mesh).is_none() {
            anyhow::bail!("Unknown mesh {mesh:?}");
        }
        let instance = self.data.instances.take_instance()?;
        let component = MeshComponent { mesh, instance };
        self.pending_loads.push(component);
        Ok(component)
    }

    /// Removes a drawable and frees its instance slot.
    pub fn despawn(&mut self, component: MeshComponent) -> bool {
        self.pending_loads.retain(|c| *c != component);
        self.agent.unmount(&component);
        self.data.instances.release_instance(component.instance)
    }

    /// Installs the hook called on every shader compilation failure.
    pub fn set_shader_error_callback(&mut self, callback: ShaderErrorCallback) {
        self.agent.set_shader_error_callback(callback);
    }

    // --- Process stages ---

    /// Runs one frame: Load and Mount if entities were spawned, then Logic,
    /// PreRender and Render.
    pub fn tick(&mut self, counts: UpdateCounts) -> Result<FrameStats> {
        if !self.pending_loads.is_empty() {
            self.load()?;
        }
        self.logic()?;
        self.prerender(counts)?;
        self.render()
    }

    /// Load and Mount: creates the device resources of spawned entities.
    pub fn load(&mut self) -> Result<()> {
        self.stages.enter(ProcessStage::Load)?;
        let ctx = self.data.ctx(self.device.as_ref());
        for component in std::mem::take(&mut self.pending_loads) {
            self.agent
                .load(&ctx, component)
                .with_context(|| format!("Cannot load {component:?}"))?;
        }
        self.stages.enter(ProcessStage::Mount)?;
        Ok(())
    }

    /// Logic: flushes staged material values into the arena.
    ///
    /// Hosts write globals and instance values before calling this (or
    /// [`Self::tick`]).
    pub fn logic(&mut self) -> Result<()> {
        self.stages.enter(ProcessStage::Logic)?;
        let written = self.data.materials.flush();
        log::trace!("Logic: {written} material values flushed");
        Ok(())
    }

    /// PreRender: uploads whatever advanced and resolves the programs of
    /// every drawable.
    pub fn prerender(&mut self, counts: UpdateCounts) -> Result<()> {
        self.stages.enter(ProcessStage::PreRender)?;
        self.agent
            .prerender(&self.data.ctx(self.device.as_ref()), &counts)?;
        let data = &mut self.data;
        self.draw_items = self.agent.resolve_draws(
            self.device.as_ref(),
            &data.globals,
            &data.instances,
            &data.meshes,
            &mut data.materials,
        );
        Ok(())
    }

    /// Render: issues the draws resolved in PreRender.
    pub fn render(&mut self) -> Result<FrameStats> {
        self.stages.enter(ProcessStage::Render)?;
        let tick = FrameTick::new(self.frame_index, self.started.elapsed().as_secs_f32());
        let items = std::mem::take(&mut self.draw_items);
        let stats = self
            .agent
            .render(&self.data.ctx(self.device.as_ref()), &items, &self.pass, tick)?;
        self.frame_index += 1;
        Ok(stats)
    }

    /// Unmount and Discard: stops drawing everything. The engine accepts no
    /// further frames.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stages.enter(ProcessStage::Unmount)?;
        for component in self.agent.drawables().to_vec() {
            self.agent.unmount(&component);
        }
        self.stages.enter(ProcessStage::Discard)?;
        log::info!("Engine shut down after {} frames", self.frame_index);
        Ok(())
    }

    // --- Accessors ---

    /// The stage last entered.
    pub fn stage(&self) -> Option<ProcessStage> {
        self.stages.current()
    }

    /// Frames rendered so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The active binding strategy.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.agent.strategy_kind()
    }

    /// The device sink.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// The capacities the arenas were sized from.
    pub fn limits(&self) -> &EngineLimits {
        &self.data.limits
    }

    /// The render agent.
    pub fn agent(&self) -> &RenderAgent {
        &self.agent
    }

    /// Mutable access to the render agent.
    pub fn agent_mut(&mut self) -> &mut RenderAgent {
        &mut self.agent
    }

    /// The semantics catalog.
    pub fn registry(&self) -> &SemanticsRegistry {
        &self.data.registry
    }

    /// The arenas.
    pub fn memory(&self) -> &MemoryManager {
        &self.data.memory
    }

    /// Frame-global values.
    pub fn globals(&self) -> &GlobalDataRepository {
        &self.data.globals
    }

    /// Mutable frame-global values, written by the camera and light systems.
    pub fn globals_mut(&mut self) -> &mut GlobalDataRepository {
        &mut self.data.globals
    }

    /// Per-entity values.
    pub fn instances(&self) -> &InstanceDataRepository {
        &self.data.instances
    }

    /// Mutable per-entity values, written by the transform system.
    pub fn instances_mut(&mut self) -> &mut InstanceDataRepository {
        &mut self.data.instances
    }

    /// Materials.
    pub fn materials(&self) -> &MaterialRepository {
        &self.data.materials
    }

    /// Mutable materials.
    pub fn materials_mut(&mut self) -> &mut MaterialRepository {
        &mut self.data.materials
    }

    /// Meshes and primitives.
    pub fn meshes(&self) -> &MeshRepository {
        &self.data.meshes
    }
}
