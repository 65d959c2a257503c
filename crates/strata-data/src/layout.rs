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

//! Where each semantic lives once its arena is on the device.
//!
//! Binding strategies turn a [`DataLayout`] into the shader-side accessor
//! functions (`get_<Semantic>`) that node code calls, so generated node code
//! never depends on how data is delivered.

use crate::error::RegistryError;
use crate::memory::{Accessor, AccessorDescriptor, BufferView};
use crate::semantics::SemanticsInfo;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::renderer::StageVisibility;

/// Which arena and which index a semantic is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataScope {
    /// Uniform-block arena, addressed by array element.
    Global,
    /// Instance arena, addressed by the draw's instance slot.
    Instance,
    /// Instance arena, addressed by the draw's material slot.
    Material,
}

/// Location of one semantic in its arena, in vec4 (16-byte) units.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    /// Semantic name.
    pub semantic: String,
    /// Shape of one element.
    pub composition: CompositionType,
    /// Encoding of each component.
    pub component: ComponentType,
    /// Number of array elements addressable by shader code.
    pub array_length: usize,
    /// Addressing mode.
    pub scope: DataScope,
    /// Stages that read the value.
    pub stage: StageVisibility,
    /// First vec4 of the semantic in its arena.
    pub vec4_offset: usize,
    /// Vec4 slots between consecutive elements, instances or material slots.
    pub vec4_stride: usize,
    /// One value shared by every material of the type.
    pub solo: bool,
    /// Delivered as a plain uniform even in data-texture mode.
    pub uniform_in_data_texture: bool,
}

impl LayoutEntry {
    /// Builds an entry for `info` located at `vec4_offset`.
    pub fn from_info(info: &SemanticsInfo, scope: DataScope, vec4_offset: usize) -> Self {
        Self {
            semantic: info.name.clone(),
            composition: info.composition,
            component: info.component,
            array_length: info.array_length,
            scope,
            stage: info.stage,
            vec4_offset,
            vec4_stride: info.composition.vec4_slots(),
            solo: info.solo,
            uniform_in_data_texture: info.needs_uniform_in_data_texture_mode,
        }
    }

    /// Name of the generated getter.
    pub fn getter_name(&self) -> String {
        format!("get_{}", self.semantic)
    }

    /// Name of the uniform carrying the value in uniform mode.
    pub fn uniform_name(&self) -> String {
        format!("u_{}", self.semantic)
    }

    /// Returns `true` when shader code indexes the value explicitly.
    pub fn is_array(&self) -> bool {
        self.array_length > 1
    }

    /// Vec4 slots the value occupies when sent as a uniform.
    pub fn uniform_vectors(&self) -> usize {
        self.composition.vec4_slots() * self.array_length
    }
}

/// Rejects semantics whose components do not fill a 32-bit vec4 lane.
pub(crate) fn check_arena_component(info: &SemanticsInfo) -> Result<(), RegistryError> {
    if info.texture || info.component.byte_size() == 4 {
        Ok(())
    } else {
        Err(RegistryError::UnsupportedComponent {
            semantic: info.name.clone(),
            component: info.component,
        })
    }
}

/// Takes the vec4-column accessor of `info` from `view`.
///
/// Returns the accessor with its first vec4 in the arena. Fails when the
/// column would not start on a 16-byte boundary.
pub(crate) fn take_column(
    view: &mut BufferView,
    info: &SemanticsInfo,
    descriptor: &AccessorDescriptor,
) -> Result<(Accessor, usize), RegistryError> {
    check_arena_component(info)?;
    let accessor = view.take_accessor(descriptor)?;
    let offset = accessor
        .vec4_offset_in_buffer()
        .ok_or_else(|| RegistryError::MisalignedColumn(info.name.clone()))?;
    Ok((accessor, offset))
}

/// The full set of semantics visible to one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLayout {
    /// Entries in declaration order.
    pub entries: Vec<LayoutEntry>,
}

impl DataLayout {
    /// An empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every entry of `other`.
    pub fn extend(&mut self, other: DataLayout) {
        self.entries.extend(other.entries);
    }

    /// Looks up an entry by semantic name.
    pub fn find(&self, semantic: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.semantic == semantic)
    }

    /// Entries of one scope.
    pub fn scope(&self, scope: DataScope) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter().filter(move |e| e.scope == scope)
    }

    /// Vec4 uniform slots needed to send every entry as a uniform.
    pub fn uniform_vectors(&self) -> usize {
        self.entries.iter().map(LayoutEntry::uniform_vectors).sum()
    }
}
