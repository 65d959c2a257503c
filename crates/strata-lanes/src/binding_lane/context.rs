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

use strata_core::renderer::GraphicsDevice;
use strata_data::{
    EngineLimits, GlobalDataRepository, InstanceDataRepository, MaterialRepository, MemoryManager,
    MeshRepository,
};

/// Everything a strategy reads during a process stage.
///
/// Borrowed immutably: strategies are the only readers of arena data for
/// upload and never write it.
#[derive(Clone, Copy)]
pub struct StrategyContext<'a> {
    /// The device sink.
    pub device: &'a dyn GraphicsDevice,
    /// Arenas.
    pub memory: &'a MemoryManager,
    /// Frame-global values.
    pub globals: &'a GlobalDataRepository,
    /// Per-entity values.
    pub instances: &'a InstanceDataRepository,
    /// Materials and their parameter columns.
    pub materials: &'a MaterialRepository,
    /// Primitives and meshes.
    pub meshes: &'a MeshRepository,
    /// Capacity configuration.
    pub limits: &'a EngineLimits,
}
