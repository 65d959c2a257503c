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

//! Per-entity values written by the transform system.

use crate::config::EngineLimits;
use crate::error::{ParameterError, RegistryError};
use crate::global_data::check_element;
use crate::layout::{take_column, DataLayout, DataScope, LayoutEntry};
use crate::memory::{Accessor, AccessorDescriptor, BufferUse, MemoryManager};
use crate::semantics::{builtin, SemanticsInfo, SemanticsRegistry};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use strata_core::math::{Mat3, Mat4};
use strata_core::renderer::UniformValue;

/// The slot of one drawable entity in the instance arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceSlot(pub u32);

impl InstanceSlot {
    /// The slot as an element index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct InstanceEntry {
    info: SemanticsInfo,
    accessor: Accessor,
    vec4_offset: usize,
}

/// Column-per-semantic storage of every entity's instance values.
///
/// Each semantic gets `max_entity_count` vec4-padded elements in the
/// `GpuInstanceData` arena, so shader code reads instance `i` of a semantic at
/// `offset + i * stride` vec4s.
#[derive(Debug)]
pub struct InstanceDataRepository {
    entries: Vec<InstanceEntry>,
    by_name: AHashMap<String, usize>,
    capacity: usize,
}

impl InstanceDataRepository {
    /// Takes the instance columns of every built-in instance semantic.
    pub fn initialize(
        memory: &mut MemoryManager,
        registry: &SemanticsRegistry,
        limits: &EngineLimits,
    ) -> Result<Self, RegistryError> {
        let capacity = limits.max_entity_count;
        let mut infos = Vec::new();
        for declared in builtin::instance_semantics() {
            infos.push(registry.require(&declared.name)?.clone());
        }
        let descriptors: Vec<AccessorDescriptor> = infos
            .iter()
            .map(|info| AccessorDescriptor::new(info.composition, info.component, capacity).vec4_columns())
            .collect();
        let total = descriptors
            .iter()
            .map(|d| d.element_byte_size() * d.count)
            .sum();
        let mut view = memory.take_buffer_view(BufferUse::GpuInstanceData, "InstanceData", total, 0)?;

        let mut entries = Vec::with_capacity(infos.len());
        let mut by_name = AHashMap::new();
        for (info, descriptor) in infos.into_iter().zip(&descriptors) {
            let (mut accessor, vec4_offset) = take_column(&mut view, &info, descriptor)?;
            for slot in 0..capacity {
                accessor.set_components(slot, &info.initial);
            }
            by_name.insert(info.name.clone(), entries.len());
            entries.push(InstanceEntry {
                info,
                accessor,
                vec4_offset,
            });
        }
        log::debug!("Instance data repository: {capacity} slots, {total} bytes");
        Ok(Self {
            entries,
            by_name,
            capacity,
        })
    }

    fn slot_of(&self, semantic: &str) -> Result<usize, ParameterError> {
        self.by_name
            .get(semantic)
            .copied()
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))
    }

    /// Pooled on the world-matrix column; the other columns follow its slots.
    fn pool(&mut self) -> &mut Accessor {
        &mut self.entries[0].accessor
    }

    /// Reserves a slot for a new entity.
    pub fn take_instance(&mut self) -> Result<InstanceSlot, RegistryError> {
        let capacity = self.capacity;
        self.pool()
            .take_one()
            .map(|slot| InstanceSlot(slot as u32))
            .ok_or_else(|| RegistryError::CapacityExceeded {
                pool: "InstanceData".to_string(),
                capacity,
            })
    }

    /// Returns a slot and restores its default values.
    pub fn release_instance(&mut self, slot: InstanceSlot) -> bool {
        if !self.pool().release_one(slot.index()) {
            return false;
        }
        for entry in &mut self.entries {
            entry.accessor.set_components(slot.index(), &entry.info.initial);
        }
        true
    }

    /// Number of slots currently in use.
    pub fn live_instances(&self) -> usize {
        self.entries[0].accessor.slots_in_use()
    }

    /// Slots available in total.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes one semantic of one instance.
    pub fn set_value(
        &mut self,
        slot: InstanceSlot,
        semantic: &str,
        values: &[f32],
    ) -> Result<(), ParameterError> {
        let at = self.slot_of(semantic)?;
        let entry = &mut self.entries[at];
        check_element(&entry.info, 0, values)?;
        if slot.index() >= self.capacity {
            return Err(ParameterError::IndexOutOfRange {
                semantic: semantic.to_string(),
                index: slot.index(),
                count: self.capacity,
            });
        }
        entry.accessor.set_components(slot.index(), values);
        Ok(())
    }

    /// Reads one semantic of one instance.
    pub fn get_value(&self, slot: InstanceSlot, semantic: &str) -> Result<Vec<f32>, ParameterError> {
        let entry = &self.entries[self.slot_of(semantic)?];
        if slot.index() >= self.capacity {
            return Err(ParameterError::IndexOutOfRange {
                semantic: semantic.to_string(),
                index: slot.index(),
                count: self.capacity,
            });
        }
        Ok(entry.accessor.get_components(slot.index(), Default::default()))
    }

    /// Writes the world matrix and the matching normal matrix.
    pub fn set_world_matrix(&mut self, slot: InstanceSlot, world: &Mat4) -> Result<(), ParameterError> {
        self.set_value(slot, builtin::WORLD_MATRIX, &world.to_cols_array())?;
        let normal = Mat3::normal_matrix(world);
        self.set_value(slot, builtin::NORMAL_MATRIX, &normal.to_cols_array())
    }

    /// Reads the world matrix of `slot`.
    pub fn world_matrix(&self, slot: InstanceSlot) -> Result<Mat4, ParameterError> {
        let values = self.get_value(slot, builtin::WORLD_MATRIX)?;
        Ok(Mat4::from_cols_slice(&values))
    }

    /// Flags `slot` as a camera-facing billboard.
    pub fn set_billboard(&mut self, slot: InstanceSlot, billboard: bool) -> Result<(), ParameterError> {
        self.set_value(slot, builtin::IS_BILLBOARD, &[if billboard { 1.0 } else { 0.0 }])
    }

    /// Where each instance semantic lives in the instance arena.
    pub fn layout(&self) -> DataLayout {
        let entries = self
            .entries
            .iter()
            .map(|e| LayoutEntry::from_info(&e.info, DataScope::Instance, e.vec4_offset))
            .collect();
        DataLayout { entries }
    }

    /// Values of `slot` as uniform writes.
    pub fn uniform_values(&self, slot: InstanceSlot) -> Vec<(String, UniformValue)> {
        if slot.index() >= self.capacity {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter_map(|e| {
                let values = e.accessor.get_components(slot.index(), Default::default());
                UniformValue::from_components(e.info.composition, e.info.component, 1, &values)
                    .map(|value| (e.info.uniform_name(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strata_core::math::Vec3;

    fn repository() -> (MemoryManager, InstanceDataRepository) {
        let limits = EngineLimits::small();
        let mut memory = MemoryManager::new(&limits).unwrap();
        let registry = SemanticsRegistry::with_builtins(&limits);
        let repo = InstanceDataRepository::initialize(&mut memory, &registry, &limits).unwrap();
        (memory, repo)
    }

    #[test]
    fn test_take_and_release_reuses_slots() {
        let (_memory, mut repo) = repository();
        let a = repo.take_instance().unwrap();
        let b = repo.take_instance().unwrap();
        assert_eq!((a, b), (InstanceSlot(0), InstanceSlot(1)));
        assert!(repo.release_instance(a));
        assert!(!repo.release_instance(a));
        assert_eq!(repo.take_instance().unwrap(), InstanceSlot(0));
        assert_eq!(repo.live_instances(), 2);
    }

    #[test]
    fn test_capacity_exceeded() {
        let (_memory, mut repo) = repository();
        for _ in 0..repo.capacity() {
            repo.take_instance().unwrap();
        }
        assert!(matches!(
            repo.take_instance(),
            Err(RegistryError::CapacityExceeded { capacity: 16, .. })
        ));
    }

    #[test]
    fn test_world_matrix_updates_normal_matrix() {
        let (_memory, mut repo) = repository();
        let slot = repo.take_instance().unwrap();
        let world = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        repo.set_world_matrix(slot, &world).unwrap();
        assert_eq!(repo.world_matrix(slot).unwrap(), world);
        let normal = repo.get_value(slot, builtin::NORMAL_MATRIX).unwrap();
        assert_relative_eq!(normal[0], 0.5);
        assert_relative_eq!(normal[4], 0.5);
        assert_relative_eq!(normal[8], 0.5);
    }

    #[test]
    fn test_release_restores_defaults() {
        let (_memory, mut repo) = repository();
        let slot = repo.take_instance().unwrap();
        repo.set_world_matrix(slot, &Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        repo.release_instance(slot);
        assert_eq!(repo.world_matrix(slot).unwrap(), Mat4::IDENTITY);
    }

    #[test]
    fn test_layout_strides_by_slot() {
        let (memory, repo) = repository();
        let layout = repo.layout();
        let world = layout.find(builtin::WORLD_MATRIX).unwrap();
        let normal = layout.find(builtin::NORMAL_MATRIX).unwrap();
        assert_eq!(world.vec4_stride, 4);
        assert_eq!(normal.vec4_stride, 3);
        assert_eq!(normal.vec4_offset, world.vec4_offset + 4 * repo.capacity());
        assert!(memory.buffer(BufferUse::GpuInstanceData).taken_bytes() > 0);
    }

    #[test]
    fn test_uniform_values_of_slot() {
        let (_memory, mut repo) = repository();
        let slot = repo.take_instance().unwrap();
        repo.set_billboard(slot, true).unwrap();
        let values = repo.uniform_values(slot);
        assert!(values.contains(&("u_IsBillboard".to_string(), UniformValue::Float(1.0))));
        assert!(repo.uniform_values(InstanceSlot(999)).is_empty());
    }
}
