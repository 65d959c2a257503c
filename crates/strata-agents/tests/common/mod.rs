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

//! A small scene over a headless device, shared by the agent tests.

#![allow(dead_code)]

use strata_agents::{FrameStats, RenderAgent};
use strata_core::frame::{FrameTick, UpdateCounts};
use strata_core::renderer::{DeviceCapabilities, RenderPass, StrategyKind};
use strata_data::material::{MaterialHandle, MaterialTypeDescriptor};
use strata_data::mesh::{MeshComponent, Primitive, VertexAttribute};
use strata_data::semantics::builtin;
use strata_data::{
    EngineLimits, GlobalDataRepository, InstanceDataRepository, MaterialRepository, MemoryManager,
    MeshRepository, SemanticsRegistry,
};
use strata_infra::HeadlessDevice;
use strata_lanes::{StrategyContext, StrategyError};

/// World-space position, flat base color.
pub const UNLIT_GRAPH: &str = r#"{
    "nodes": [
        { "id": 0, "kind": { "type": "Attribute", "attribute": "Position" }, "stage": "Vertex" },
        { "id": 1, "kind": { "type": "Vec3ToVec4" }, "stage": "Vertex" },
        { "id": 2, "kind": { "type": "UniformData", "semantic": "WorldMatrix", "composition": "Mat4" }, "stage": "Vertex" },
        { "id": 3, "kind": { "type": "Transform", "matrix": "Mat4" }, "stage": "Vertex" },
        { "id": 4, "kind": { "type": "OutPosition" }, "stage": "Vertex" },
        { "id": 5, "kind": { "type": "UniformData", "semantic": "BaseColorFactor", "composition": "Vec4" }, "stage": "Pixel" },
        { "id": 6, "kind": { "type": "OutColor" }, "stage": "Pixel" }
    ],
    "connections": [
        { "source": 0, "output": "value", "target": 1, "input": "xyz" },
        { "source": 2, "output": "value", "target": 3, "input": "matrix" },
        { "source": 1, "output": "value", "target": 3, "input": "vector" },
        { "source": 3, "output": "result", "target": 4, "input": "position" },
        { "source": 5, "output": "value", "target": 6, "input": "color" }
    ]
}"#;

pub struct Scene {
    pub device: HeadlessDevice,
    pub limits: EngineLimits,
    pub memory: MemoryManager,
    pub globals: GlobalDataRepository,
    pub instances: InstanceDataRepository,
    pub materials: MaterialRepository,
    pub meshes: MeshRepository,
}

impl Scene {
    pub fn new(device: HeadlessDevice) -> Self {
        let limits = EngineLimits::small();
        let mut memory = MemoryManager::new(&limits).unwrap();
        let registry = SemanticsRegistry::with_builtins(&limits);
        let globals = GlobalDataRepository::initialize(&mut memory, &registry, &limits).unwrap();
        let instances = InstanceDataRepository::initialize(&mut memory, &registry, &limits).unwrap();
        let mut materials = MaterialRepository::new(&limits);
        materials
            .register_type(
                &mut memory,
                &registry,
                MaterialTypeDescriptor::new("Unlit", &[builtin::BASE_COLOR_FACTOR]),
            )
            .unwrap();
        Self {
            device,
            limits,
            memory,
            globals,
            instances,
            materials,
            meshes: MeshRepository::new(),
        }
    }

    /// A GLSL device that cannot sample float textures.
    pub fn uniform_only() -> Self {
        let mut caps = DeviceCapabilities::glsl_es3();
        caps.supports_float_textures = false;
        Self::new(HeadlessDevice::new(caps))
    }

    pub fn ctx(&self) -> StrategyContext<'_> {
        StrategyContext {
            device: &self.device,
            memory: &self.memory,
            globals: &self.globals,
            instances: &self.instances,
            materials: &self.materials,
            meshes: &self.meshes,
            limits: &self.limits,
        }
    }

    /// An agent with the Unlit graph registered.
    pub fn agent(&self, requested: Option<StrategyKind>) -> Result<RenderAgent, StrategyError> {
        let mut agent = RenderAgent::new(&self.ctx(), requested)?;
        agent
            .programs_mut()
            .register_graph_json("Unlit", UNLIT_GRAPH)
            .unwrap();
        Ok(agent)
    }

    /// Adds a one-triangle entity drawn with a fresh Unlit material.
    pub fn spawn_triangle(&mut self) -> (MeshComponent, MaterialHandle) {
        let material = self.materials.create_material("Unlit").unwrap();
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let primitive = Primitive::from_vertex_data(
            &mut self.memory,
            "triangle",
            material,
            &[(VertexAttribute::Position, &positions[..])],
            Some(&[0u32, 1, 2][..]),
        )
        .unwrap();
        let mesh = self.meshes.add_mesh("triangle", vec![primitive]);
        let instance = self.instances.take_instance().unwrap();
        (MeshComponent { mesh, instance }, material)
    }

    /// Logic, PreRender and Render of one frame.
    pub fn frame(
        &mut self,
        agent: &mut RenderAgent,
        counts: UpdateCounts,
        index: u64,
    ) -> Result<FrameStats, StrategyError> {
        self.materials.flush();
        agent.prerender(&self.ctx(), &counts)?;
        let items = agent.resolve_draws(
            &self.device,
            &self.globals,
            &self.instances,
            &self.meshes,
            &mut self.materials,
        );
        agent.render(
            &self.ctx(),
            &items,
            &RenderPass::new("main"),
            FrameTick::new(index, index as f32 / 60.0),
        )
    }
}

pub fn transforms(n: u64) -> UpdateCounts {
    UpdateCounts {
        transforms: n,
        ..UpdateCounts::default()
    }
}
