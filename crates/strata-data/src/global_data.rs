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

//! Values shared by every draw of a frame: camera, lights, time.

use crate::config::EngineLimits;
use crate::error::{ParameterError, RegistryError};
use crate::layout::{check_arena_component, take_column, DataLayout, DataScope, LayoutEntry};
use crate::memory::{Accessor, AccessorDescriptor, BufferUse, MemoryManager};
use crate::semantics::{builtin, SemanticsInfo, SemanticsRegistry};
use ahash::AHashMap;
use std::ops::Range;
use strata_core::math::{Mat4, Vec3, Vec4};
use strata_core::renderer::UniformValue;

#[derive(Debug)]
struct GlobalDataEntry {
    info: SemanticsInfo,
    accessor: Accessor,
    vec4_offset: usize,
}

/// One arena-backed slot set per global semantic, addressed by name and a
/// frame-local count index (camera, light or bone index).
///
/// All entries live in a single view of the uniform-block arena, each element
/// padded to whole vec4s so the arena can be uploaded verbatim.
#[derive(Debug)]
pub struct GlobalDataRepository {
    entries: Vec<GlobalDataEntry>,
    by_name: AHashMap<String, usize>,
    byte_range: Range<usize>,
    update_count: u64,
}

impl GlobalDataRepository {
    /// Takes one accessor per built-in global semantic and writes the
    /// declared defaults.
    pub fn initialize(
        memory: &mut MemoryManager,
        registry: &SemanticsRegistry,
        limits: &EngineLimits,
    ) -> Result<Self, RegistryError> {
        let mut infos = Vec::new();
        for declared in builtin::global_semantics(limits) {
            infos.push(registry.require(&declared.name)?.clone());
        }
        Self::with_semantics(memory, infos)
    }

    /// Builds a repository over an explicit semantic list.
    pub fn with_semantics(
        memory: &mut MemoryManager,
        infos: Vec<SemanticsInfo>,
    ) -> Result<Self, RegistryError> {
        for info in &infos {
            check_arena_component(info)?;
        }
        let descriptors: Vec<AccessorDescriptor> = infos
            .iter()
            .map(|info| {
                AccessorDescriptor::new(info.composition, info.component, info.array_length)
                    .vec4_columns()
            })
            .collect();
        let total: usize = descriptors
            .iter()
            .map(|d| d.element_byte_size() * d.count)
            .sum();
        let mut view = memory.take_buffer_view(BufferUse::UniformBlock, "GlobalData", total.max(16), 0)?;
        let start = view.byte_offset_in_buffer();

        let mut entries = Vec::with_capacity(infos.len());
        let mut by_name = AHashMap::new();
        for (info, descriptor) in infos.into_iter().zip(&descriptors) {
            let (mut accessor, vec4_offset) = take_column(&mut view, &info, descriptor)?;
            if info.initial.len() == info.component_count() {
                for index in 0..info.array_length {
                    accessor.set_components(index, &info.initial);
                }
            }
            by_name.insert(info.name.clone(), entries.len());
            entries.push(GlobalDataEntry {
                info,
                accessor,
                vec4_offset,
            });
        }
        log::debug!(
            "Global data repository: {} semantics in {} bytes",
            entries.len(),
            total
        );
        Ok(Self {
            entries,
            by_name,
            byte_range: start..start + view.byte_length(),
            update_count: 0,
        })
    }

    fn entry(&self, semantic: &str) -> Result<&GlobalDataEntry, ParameterError> {
        self.by_name
            .get(semantic)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))
    }

    /// Writes element `count_index` of `semantic`.
    pub fn set_value(
        &mut self,
        semantic: &str,
        count_index: usize,
        values: &[f32],
    ) -> Result<(), ParameterError> {
        let slot = *self
            .by_name
            .get(semantic)
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))?;
        let entry = &mut self.entries[slot];
        check_element(&entry.info, count_index, values)?;
        let mut clamped = values.to_vec();
        entry.info.clamp(&mut clamped);
        entry.accessor.set_components(count_index, &clamped);
        self.update_count += 1;
        Ok(())
    }

    /// Reads element `count_index` of `semantic`.
    pub fn get_value(&self, semantic: &str, count_index: usize) -> Result<Vec<f32>, ParameterError> {
        let entry = self.entry(semantic)?;
        if count_index >= entry.info.array_length {
            return Err(ParameterError::IndexOutOfRange {
                semantic: semantic.to_string(),
                index: count_index,
                count: entry.info.array_length,
            });
        }
        Ok(entry.accessor.get_components(count_index, Default::default()))
    }

    /// Writes a matrix element.
    pub fn set_mat4(&mut self, semantic: &str, count_index: usize, value: &Mat4) -> Result<(), ParameterError> {
        self.set_value(semantic, count_index, &value.to_cols_array())
    }

    /// Writes a vec3 element.
    pub fn set_vec3(&mut self, semantic: &str, count_index: usize, value: Vec3) -> Result<(), ParameterError> {
        self.set_value(semantic, count_index, &value.to_array())
    }

    /// Writes a vec4 element.
    pub fn set_vec4(&mut self, semantic: &str, count_index: usize, value: Vec4) -> Result<(), ParameterError> {
        self.set_value(semantic, count_index, &value.to_array())
    }

    /// Writes a scalar.
    pub fn set_scalar(&mut self, semantic: &str, value: f32) -> Result<(), ParameterError> {
        self.set_value(semantic, 0, &[value])
    }

    /// Bumped by every write; the "global data" update count.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Bytes of the uniform-block arena holding every entry.
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }

    /// First vec4 of `semantic` in the uniform-block arena.
    pub fn location_offset_of(&self, semantic: &str) -> Option<usize> {
        self.entry(semantic).ok().map(|e| e.vec4_offset)
    }

    /// Declarations of every global semantic.
    pub fn semantics(&self) -> impl Iterator<Item = &SemanticsInfo> {
        self.entries.iter().map(|e| &e.info)
    }

    /// Layout of every entry, as read by the data-texture and storage-buffer
    /// strategies.
    pub fn layout(&self) -> DataLayout {
        let entries = self
            .entries
            .iter()
            .map(|e| LayoutEntry::from_info(&e.info, DataScope::Global, e.vec4_offset))
            .collect();
        DataLayout { entries }
    }

    /// Current values as uniform writes, for entries accepted by `filter`.
    pub fn uniform_values(
        &self,
        filter: impl Fn(&SemanticsInfo) -> bool,
    ) -> Vec<(String, UniformValue)> {
        self.entries
            .iter()
            .filter(|e| filter(&e.info))
            .filter_map(|e| {
                let values = e.accessor.as_f32_vec();
                UniformValue::from_components(
                    e.info.composition,
                    e.info.component,
                    e.info.array_length,
                    &values,
                )
                .map(|value| (e.info.uniform_name(), value))
            })
            .collect()
    }
}

pub(crate) fn check_element(
    info: &SemanticsInfo,
    index: usize,
    values: &[f32],
) -> Result<(), ParameterError> {
    if index >= info.array_length {
        return Err(ParameterError::IndexOutOfRange {
            semantic: info.name.clone(),
            index,
            count: info.array_length,
        });
    }
    if values.len() != info.component_count() {
        return Err(ParameterError::ShapeMismatch {
            semantic: info.name.clone(),
            expected: format!("{}<{}>", info.composition, info.component),
            found: format!("{} components", values.len()),
        });
    }
    Ok(())
}
