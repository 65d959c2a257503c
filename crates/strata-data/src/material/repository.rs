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

use super::instance::Material;
use super::value::TextureState;
use crate::config::EngineLimits;
use crate::error::{ParameterError, RegistryError};
use crate::layout::{take_column, DataLayout, DataScope, LayoutEntry};
use crate::memory::{Accessor, AccessorDescriptor, BufferUse, MemoryManager, SlotPool};
use crate::semantics::{SemanticsInfo, SemanticsRegistry};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use strata_core::renderer::UniformValue;

/// Declares a material type: its parameters and capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTypeDescriptor {
    /// Unique type name; node graphs are registered under the same name.
    pub type_name: String,
    /// Semantic names of the parameters, each registered in the catalog.
    pub parameters: Vec<String>,
    /// Feature flags every new material of the type starts with.
    #[serde(default)]
    pub default_definitions: Vec<String>,
    /// Live material capacity. Falls back to
    /// [`EngineLimits::max_material_instances_per_type`].
    #[serde(default)]
    pub max_instances: Option<usize>,
}

impl MaterialTypeDescriptor {
    /// A descriptor with no default definitions and the default capacity.
    pub fn new(type_name: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            type_name: type_name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            default_definitions: Vec::new(),
            max_instances: None,
        }
    }
}

/// Generational reference to a live material.
///
/// A handle whose material was destroyed resolves to `None` even after its
/// index is reused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct MaterialType {
    descriptor: MaterialTypeDescriptor,
    type_id: u32,
    infos: Vec<SemanticsInfo>,
    columns: AHashMap<String, Accessor>,
    // First vec4 of each column in the instance arena.
    offsets: AHashMap<String, usize>,
    slots: SlotPool,
    // Solo values staged since the last flush.
    pending_shared: AHashMap<String, Vec<f32>>,
}

impl MaterialType {
    fn shared_info(&self, semantic: &str) -> Option<&SemanticsInfo> {
        self.infos
            .iter()
            .find(|i| i.name == semantic && i.solo && !i.texture)
    }

    /// Every element of a solo column, end to end.
    fn shared_components(&self, info: &SemanticsInfo) -> Option<Vec<f32>> {
        let column = self.columns.get(&info.name)?;
        let mut values = Vec::with_capacity(info.component_count() * info.array_length);
        for element in 0..info.array_length {
            values.extend(column.get_components(element, Default::default()));
        }
        Some(values)
    }
}

#[derive(Debug, Default)]
struct MaterialEntry {
    generation: u32,
    material: Option<Material>,
}

/// Owns every material type and material.
///
/// Each type gets one parameter column per numeric semantic in the
/// `GpuInstanceData` arena, `max_instances` elements long. A material writes
/// its values at its slot. Solo semantics get a single element, owned by the
/// type and set with [`Self::set_shared_parameter`].
#[derive(Debug)]
pub struct MaterialRepository {
    types: Vec<MaterialType>,
    type_by_name: AHashMap<String, usize>,
    entries: Vec<MaterialEntry>,
    free_entries: Vec<u32>,
    next_instance_id: u32,
    default_capacity: usize,
    update_count: u64,
}

impl MaterialRepository {
    /// An empty repository.
    pub fn new(limits: &EngineLimits) -> Self {
        Self {
            types: Vec::new(),
            type_by_name: AHashMap::new(),
            entries: Vec::new(),
            free_entries: Vec::new(),
            next_instance_id: 0,
            default_capacity: limits.max_material_instances_per_type,
            update_count: 0,
        }
    }

    /// Registers a material type and takes its parameter columns.
    pub fn register_type(
        &mut self,
        memory: &mut MemoryManager,
        registry: &SemanticsRegistry,
        descriptor: MaterialTypeDescriptor,
    ) -> Result<u32, RegistryError> {
        if self.type_by_name.contains_key(&descriptor.type_name) {
            return Err(RegistryError::DuplicateMaterialType(descriptor.type_name));
        }
        let capacity = descriptor.max_instances.unwrap_or(self.default_capacity).max(1);
        let mut infos = Vec::with_capacity(descriptor.parameters.len());
        for name in &descriptor.parameters {
            infos.push(registry.require(name)?.clone());
        }

        let numeric: Vec<(&SemanticsInfo, AccessorDescriptor)> = infos
            .iter()
            .filter(|info| !info.texture)
            .map(|info| {
                let count = if info.solo { 1 } else { capacity } * info.array_length;
                let desc = AccessorDescriptor::new(info.composition, info.component, count).vec4_columns();
                (info, desc)
            })
            .collect();
        let total: usize = numeric
            .iter()
            .map(|(_, d)| d.element_byte_size() * d.count)
            .sum();

        let mut columns = AHashMap::new();
        let mut offsets = AHashMap::new();
        if total > 0 {
            let mut view = memory.take_buffer_view(
                BufferUse::GpuInstanceData,
                format!("Material:{}", descriptor.type_name),
                total,
                0,
            )?;
            for (info, desc) in &numeric {
                let (mut accessor, offset) = take_column(&mut view, info, desc)?;
                if info.initial.len() == info.component_count() {
                    for index in 0..accessor.count() {
                        accessor.set_components(index, &info.initial);
                    }
                }
                columns.insert(info.name.clone(), accessor);
                offsets.insert(info.name.clone(), offset);
            }
        }

        let type_id = self.types.len() as u32;
        log::info!(
            "Registered material type '{}' (id {type_id}): {} parameters, {capacity} instances, {total} bytes",
            descriptor.type_name,
            infos.len()
        );
        self.type_by_name.insert(descriptor.type_name.clone(), self.types.len());
        self.types.push(MaterialType {
            descriptor,
            type_id,
            infos,
            columns,
            offsets,
            slots: SlotPool::new(capacity),
            pending_shared: AHashMap::new(),
        });
        Ok(type_id)
    }

    fn type_index(&self, type_name: &str) -> Result<usize, RegistryError> {
        self.type_by_name
            .get(type_name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownMaterialType(type_name.to_string()))
    }

    /// Descriptor of a registered type.
    pub fn descriptor(&self, type_name: &str) -> Option<&MaterialTypeDescriptor> {
        let index = self.type_by_name.get(type_name)?;
        Some(&self.types[*index].descriptor)
    }

    /// Names of every registered type, in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.descriptor.type_name.as_str())
    }

    fn take_slot(&mut self, type_index: usize) -> Result<usize, RegistryError> {
        let ty = &mut self.types[type_index];
        ty.slots.take().ok_or_else(|| RegistryError::CapacityExceeded {
            pool: ty.descriptor.type_name.clone(),
            capacity: ty.slots.capacity(),
        })
    }

    /// Creates a material of `type_name` with every parameter at its default.
    pub fn create_material(&mut self, type_name: &str) -> Result<MaterialHandle, RegistryError> {
        let type_index = self.type_index(type_name)?;
        let slot = self.take_slot(type_index)?;
        let ty = &self.types[type_index];
        let instance_id = self.next_instance_id;
        self.next_instance_id += 1;
        let material = Material::new(
            type_name,
            ty.type_id,
            instance_id,
            slot,
            &ty.infos,
            ty.descriptor.default_definitions.iter().cloned(),
        );

        let index = match self.free_entries.pop() {
            Some(index) => index,
            None => {
                self.entries.push(MaterialEntry::default());
                (self.entries.len() - 1) as u32
            }
        };
        let entry = &mut self.entries[index as usize];
        entry.material = Some(material);
        self.update_count += 1;
        log::debug!("Created material '{type_name}' #{instance_id} in slot {slot}");
        Ok(MaterialHandle {
            index,
            generation: entry.generation,
        })
    }

    /// Destroys a material, returning its slot to the type's pool.
    pub fn destroy_material(&mut self, handle: MaterialHandle) -> bool {
        let Some(material) = self.get(handle) else {
            return false;
        };
        let (type_name, slot) = (material.type_name().to_string(), material.slot());
        if let Some(&type_index) = self.type_by_name.get(&type_name) {
            self.types[type_index].slots.release(slot);
        }
        let entry = &mut self.entries[handle.index as usize];
        entry.material = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_entries.push(handle.index);
        self.update_count += 1;
        true
    }

    /// Moves a material to another type in place.
    ///
    /// The handle and instance id survive. Explicit values whose semantic has
    /// the same layout in the new type are kept; everything else starts from
    /// the new type's defaults. The program cache is cleared.
    pub fn recreate_material(
        &mut self,
        handle: MaterialHandle,
        type_name: &str,
    ) -> Result<(), RegistryError> {
        let new_type = self.type_index(type_name)?;
        let material = self.get(handle).ok_or(RegistryError::StaleHandle)?;
        let old_type = self.type_index(material.type_name())?;
        let old_slot = material.slot();
        let slot = self.take_slot(new_type)?;
        self.types[old_type].slots.release(old_slot);

        let ty = &self.types[new_type];
        if let Some(material) = self.entries[handle.index as usize].material.as_mut() {
            material.reassign(type_name, ty.type_id, slot, &ty.infos);
            log::debug!(
                "Recreated material #{} as '{type_name}'",
                material.instance_id()
            );
        }
        self.update_count += 1;
        Ok(())
    }

    /// The material behind `handle`, if it is still alive.
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        let entry = self.entries.get(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.material.as_ref()
    }

    /// Mutable access to the material behind `handle`.
    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.material.as_mut()
    }

    /// Sets a numeric parameter of the material behind `handle`.
    ///
    /// A solo semantic is forwarded to [`Self::set_shared_parameter`] and so
    /// changes every material of the type.
    pub fn set_parameter(
        &mut self,
        handle: MaterialHandle,
        semantic: &str,
        values: &[f32],
    ) -> Result<(), ParameterError> {
        let material = self.get_mut(handle).ok_or(ParameterError::StaleHandle)?;
        if material.is_shared(semantic) {
            let type_name = material.type_name().to_string();
            return self.set_shared_parameter(&type_name, semantic, values);
        }
        material.set_parameter(semantic, values)
    }

    /// Stages the value of a solo semantic of `type_name`.
    ///
    /// Validated and clamped like a per-material value; written to the
    /// type's column by the next [`Self::flush`].
    pub fn set_shared_parameter(
        &mut self,
        type_name: &str,
        semantic: &str,
        values: &[f32],
    ) -> Result<(), ParameterError> {
        let index = self
            .type_by_name
            .get(type_name)
            .copied()
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))?;
        let ty = &mut self.types[index];
        let info = ty
            .shared_info(semantic)
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))?;
        if values.len() != info.component_count() * info.array_length {
            return Err(ParameterError::ShapeMismatch {
                semantic: semantic.to_string(),
                expected: info.shape(),
                found: format!("{} components", values.len()),
            });
        }
        let mut clamped = values.to_vec();
        info.clamp(&mut clamped);
        ty.pending_shared.insert(semantic.to_string(), clamped);
        Ok(())
    }

    /// Current value of a solo semantic, as the device will see it.
    pub fn shared_parameter(&self, type_name: &str, semantic: &str) -> Option<Vec<f32>> {
        let ty = &self.types[*self.type_by_name.get(type_name)?];
        ty.shared_components(ty.shared_info(semantic)?)
    }

    /// Sets a texture parameter of the material behind `handle`.
    pub fn set_texture(
        &mut self,
        handle: MaterialHandle,
        semantic: &str,
        state: TextureState,
    ) -> Result<(), ParameterError> {
        self.get_mut(handle)
            .ok_or(ParameterError::StaleHandle)?
            .set_texture(semantic, state)
    }

    /// Every live material.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            let handle = MaterialHandle {
                index: index as u32,
                generation: entry.generation,
            };
            entry.material.as_ref().map(|m| (handle, m))
        })
    }

    /// Number of live materials.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.material.is_some()).count()
    }

    /// Returns `true` if no material is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every staged value into the parameter columns.
    ///
    /// Runs in the logic stage. Returns the number of values written and
    /// bumps [`Self::update_count`] if there were any.
    pub fn flush(&mut self) -> usize {
        let mut written = 0;
        for entry in &mut self.entries {
            let Some(material) = entry.material.as_mut() else {
                continue;
            };
            let Some(&type_index) = self.type_by_name.get(material.type_name()) else {
                continue;
            };
            let slot = material.slot();
            let ty = &mut self.types[type_index];
            for (semantic, values) in material.take_dirty() {
                let Some(info) = ty.infos.iter().find(|i| i.name == semantic) else {
                    continue;
                };
                let Some(column) = ty.columns.get_mut(&semantic) else {
                    continue;
                };
                let first = slot * info.array_length;
                let n = info.component_count();
                for (i, element) in values.chunks_exact(n).enumerate() {
                    column.set_components(first + i, element);
                }
                written += 1;
            }
        }
        for ty in &mut self.types {
            for (semantic, values) in ty.pending_shared.drain() {
                let Some(info) = ty.infos.iter().find(|i| i.name == semantic) else {
                    continue;
                };
                let Some(column) = ty.columns.get_mut(&semantic) else {
                    continue;
                };
                for (element, chunk) in values.chunks_exact(info.component_count()).enumerate() {
                    column.set_components(element, chunk);
                }
                written += 1;
            }
        }
        if written > 0 {
            self.update_count += 1;
            log::trace!("Flushed {written} material values");
        }
        written
    }

    /// The "materials" update count read by binding strategies.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Where each numeric parameter of `type_name` lives in the instance arena.
    pub fn layout_for(&self, type_name: &str) -> Option<DataLayout> {
        let ty = &self.types[*self.type_by_name.get(type_name)?];
        let entries = ty
            .infos
            .iter()
            .filter_map(|info| {
                // Textures have no column.
                let offset = *ty.offsets.get(&info.name)?;
                let mut entry = LayoutEntry::from_info(info, DataScope::Material, offset);
                entry.vec4_stride = info.composition.vec4_slots() * info.array_length;
                Some(entry)
            })
            .collect();
        Some(DataLayout { entries })
    }

    /// Values of `material` as uniform writes: its own parameters followed
    /// by the solo values of its type, read from the type's columns.
    pub fn uniform_values(&self, material: &Material) -> Vec<(String, UniformValue)> {
        let mut values = material.uniform_values();
        let Some(&index) = self.type_by_name.get(material.type_name()) else {
            return values;
        };
        let ty = &self.types[index];
        for info in ty.infos.iter().filter(|i| i.solo && !i.texture) {
            let Some(components) = ty.shared_components(info) else {
                continue;
            };
            if let Some(value) = UniformValue::from_components(
                info.composition,
                info.component,
                info.array_length,
                &components,
            ) {
                values.push((info.uniform_name(), value));
            }
        }
        values
    }

    /// Values of the material behind `handle` as uniform writes.
    pub fn material_uniform_values(&self, handle: MaterialHandle) -> Vec<(String, UniformValue)> {
        self.get(handle)
            .map(|material| self.uniform_values(material))
            .unwrap_or_default()
    }

    /// Reads a parameter back from the arena, as the device will see it.
    pub fn arena_value(&self, handle: MaterialHandle, semantic: &str) -> Option<Vec<f32>> {
        let material = self.get(handle)?;
        let ty = &self.types[*self.type_by_name.get(material.type_name())?];
        let info = ty.infos.iter().find(|i| i.name == semantic)?;
        let column = ty.columns.get(semantic)?;
        let index = if info.solo { 0 } else { material.slot() * info.array_length };
        Some(column.get_components(index, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::builtin;

    fn setup() -> (MemoryManager, SemanticsRegistry, MaterialRepository) {
        let limits = EngineLimits::small();
        let memory = MemoryManager::new(&limits).unwrap();
        let registry = SemanticsRegistry::with_builtins(&limits);
        (memory, registry, MaterialRepository::new(&limits))
    }

    fn lit() -> MaterialTypeDescriptor {
        MaterialTypeDescriptor::new(
            "Lit",
            &[
                builtin::BASE_COLOR_FACTOR,
                builtin::BASE_COLOR_TEXTURE,
                builtin::ALPHA_CUTOFF,
            ],
        )
    }

    #[test]
    fn test_register_and_create() {
        let (mut memory, registry, mut repo) = setup();
        let type_id = repo.register_type(&mut memory, &registry, lit()).unwrap();
        let a = repo.create_material("Lit").unwrap();
        let b = repo.create_material("Lit").unwrap();
        let (ma, mb) = (repo.get(a).unwrap(), repo.get(b).unwrap());
        assert_eq!(ma.type_id(), type_id);
        assert_ne!(ma.instance_id(), mb.instance_id());
        assert_ne!(ma.slot(), mb.slot());
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_duplicate_and_unknown_types() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        assert_eq!(
            repo.register_type(&mut memory, &registry, lit()),
            Err(RegistryError::DuplicateMaterialType("Lit".to_string()))
        );
        assert!(matches!(
            repo.create_material("Unlit"),
            Err(RegistryError::UnknownMaterialType(_))
        ));
        let bad = MaterialTypeDescriptor::new("Bad", &["NotASemantic"]);
        assert!(matches!(
            repo.register_type(&mut memory, &registry, bad),
            Err(RegistryError::UnknownSemantic(_))
        ));
    }

    #[test]
    fn test_capacity_and_slot_reuse() {
        let (mut memory, registry, mut repo) = setup();
        let mut descriptor = lit();
        descriptor.max_instances = Some(2);
        repo.register_type(&mut memory, &registry, descriptor).unwrap();
        let a = repo.create_material("Lit").unwrap();
        let _b = repo.create_material("Lit").unwrap();
        assert!(matches!(
            repo.create_material("Lit"),
            Err(RegistryError::CapacityExceeded { capacity: 2, .. })
        ));
        assert!(repo.destroy_material(a));
        assert!(repo.get(a).is_none());
        assert!(!repo.destroy_material(a));
        let c = repo.create_material("Lit").unwrap();
        assert_ne!(c, a);
        assert!(repo.get(a).is_none());
        assert_eq!(repo.get(c).unwrap().slot(), 0);
    }

    #[test]
    fn test_flush_writes_arena_and_bumps_update_count() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        let _first = repo.create_material("Lit").unwrap();
        let handle = repo.create_material("Lit").unwrap();
        repo.flush();
        let count = repo.update_count();
        assert_eq!(repo.flush(), 0);
        assert_eq!(repo.update_count(), count);

        repo.set_parameter(handle, builtin::BASE_COLOR_FACTOR, &[0.5, 0.25, 0.0, 1.0])
            .unwrap();
        assert_eq!(
            repo.arena_value(handle, builtin::BASE_COLOR_FACTOR),
            Some(vec![1.0, 1.0, 1.0, 1.0])
        );
        assert_eq!(repo.flush(), 1);
        assert_eq!(repo.update_count(), count + 1);
        assert_eq!(
            repo.arena_value(handle, builtin::BASE_COLOR_FACTOR),
            Some(vec![0.5, 0.25, 0.0, 1.0])
        );
    }

    #[test]
    fn test_layout_offsets_and_solo_stride() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        let layout = repo.layout_for("Lit").unwrap();
        assert!(layout.find(builtin::BASE_COLOR_TEXTURE).is_none());
        let color = layout.find(builtin::BASE_COLOR_FACTOR).unwrap();
        let cutoff = layout.find(builtin::ALPHA_CUTOFF).unwrap();
        assert_eq!(color.scope, DataScope::Material);
        assert!(cutoff.solo);
        assert_eq!(cutoff.vec4_offset, color.vec4_offset + 8);
    }

    #[test]
    fn test_recreate_keeps_identity_and_compatible_values() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        repo.register_type(
            &mut memory,
            &registry,
            MaterialTypeDescriptor::new(
                "Emissive",
                &[builtin::BASE_COLOR_FACTOR, builtin::EMISSIVE_FACTOR],
            ),
        )
        .unwrap();
        let handle = repo.create_material("Lit").unwrap();
        repo.set_parameter(handle, builtin::BASE_COLOR_FACTOR, &[0.1, 0.2, 0.3, 1.0])
            .unwrap();
        let before = repo.get(handle).unwrap();
        let (instance_id, fingerprint) = (before.instance_id(), before.fingerprint().to_string());

        repo.recreate_material(handle, "Emissive").unwrap();
        let after = repo.get(handle).unwrap();
        assert_eq!(after.instance_id(), instance_id);
        assert_eq!(after.type_name(), "Emissive");
        assert_ne!(after.fingerprint(), fingerprint);
        assert_eq!(after.cached_programs(), 0);
        assert_eq!(
            after.get_parameter(builtin::BASE_COLOR_FACTOR).and_then(|v| v.as_numeric()),
            Some(&[0.1, 0.2, 0.3, 1.0][..])
        );
        assert!(after.get_parameter(builtin::ALPHA_CUTOFF).is_none());
    }

    #[test]
    fn test_solo_value_shared_across_materials() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        let a = repo.create_material("Lit").unwrap();
        repo.set_parameter(a, builtin::ALPHA_CUTOFF, &[0.9]).unwrap();
        repo.flush();
        assert_eq!(repo.arena_value(a, builtin::ALPHA_CUTOFF), Some(vec![0.9]));

        let b = repo.create_material("Lit").unwrap();
        repo.flush();
        for handle in [a, b] {
            assert_eq!(repo.arena_value(handle, builtin::ALPHA_CUTOFF), Some(vec![0.9]));
            assert!(repo
                .material_uniform_values(handle)
                .contains(&("u_AlphaCutoff".to_string(), UniformValue::Float(0.9))));
        }

        repo.set_shared_parameter("Lit", builtin::ALPHA_CUTOFF, &[2.0]).unwrap();
        assert_eq!(repo.shared_parameter("Lit", builtin::ALPHA_CUTOFF), Some(vec![0.9]));
        let count = repo.update_count();
        assert_eq!(repo.flush(), 1);
        assert_eq!(repo.update_count(), count + 1);
        assert_eq!(repo.shared_parameter("Lit", builtin::ALPHA_CUTOFF), Some(vec![1.0]));
        assert!(matches!(
            repo.set_shared_parameter("Lit", builtin::BASE_COLOR_FACTOR, &[1.0; 4]),
            Err(ParameterError::UnknownSemantic(_))
        ));
    }

    #[test]
    fn test_uniform_values_skip_textures() {
        let (mut memory, registry, mut repo) = setup();
        repo.register_type(&mut memory, &registry, lit()).unwrap();
        let handle = repo.create_material("Lit").unwrap();
        let values = repo.material_uniform_values(handle);
        assert_eq!(values.len(), 2);
        assert!(values.contains(&("u_AlphaCutoff".to_string(), UniformValue::Float(0.5))));
    }
}
