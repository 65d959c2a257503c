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

use super::{DrawItem, StrategyContext};
use strata_core::renderer::{GraphicsDevice, ProgramDescriptor};
use strata_data::material::MaterialTypeDescriptor;
use strata_data::mesh::{MeshComponent, Primitive, VertexAttribute};
use strata_data::semantics::builtin;
use strata_data::{
    DataLayout, EngineLimits, GlobalDataRepository, InstanceDataRepository, MaterialRepository,
    MemoryManager, MeshRepository, SemanticsRegistry,
};
use strata_infra::HeadlessDevice;

/// Repositories over small limits plus a headless device.
pub(crate) struct Fixture {
    pub device: HeadlessDevice,
    pub limits: EngineLimits,
    pub memory: MemoryManager,
    pub globals: GlobalDataRepository,
    pub instances: InstanceDataRepository,
    pub materials: MaterialRepository,
    pub meshes: MeshRepository,
}

impl Fixture {
    pub fn glsl() -> Self {
        Self::with_device(HeadlessDevice::glsl_es3())
    }

    pub fn wgsl() -> Self {
        Self::with_device(HeadlessDevice::wgsl())
    }

    pub fn with_device(device: HeadlessDevice) -> Self {
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
                MaterialTypeDescriptor::new(
                    "Unlit",
                    &[
                        builtin::BASE_COLOR_FACTOR,
                        builtin::ALPHA_CUTOFF,
                        builtin::BASE_COLOR_TEXTURE,
                    ],
                ),
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

    /// Everything an "Unlit" program can read.
    pub fn layout(&self) -> DataLayout {
        let mut layout = self.globals.layout();
        layout.extend(self.instances.layout());
        if let Some(materials) = self.materials.layout_for("Unlit") {
            layout.extend(materials);
        }
        layout
    }

    /// Adds a one-triangle mesh drawn with a fresh "Unlit" material.
    pub fn quad(&mut self) -> (MeshComponent, DrawItem) {
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
        self.materials.flush();
        let program = self
            .device
            .create_program(&ProgramDescriptor {
                label: "Unlit@test".to_string(),
                language: self.device.capabilities().shading_language,
                vertex_source: "vertex".to_string(),
                pixel_source: "pixel".to_string(),
            })
            .unwrap();
        let primitive = self.meshes.mesh(mesh).unwrap().primitives[0];
        (
            MeshComponent { mesh, instance },
            DrawItem {
                primitive,
                instance,
                program,
            },
        )
    }
}
