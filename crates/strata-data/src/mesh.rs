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

//! Drawable geometry: primitives, meshes and the repository assigning their
//! ids.

use crate::instance_data::InstanceSlot;
use crate::material::MaterialHandle;
use crate::memory::{Accessor, AccessorDescriptor, AllocationError, BufferUse, MemoryManager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_core::layout::{ComponentType, CompositionType};

/// Identifies one primitive across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u32);

/// Identifies one mesh in the [`MeshRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// A per-vertex input of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexAttribute {
    /// Object-space position.
    Position,
    /// Object-space normal.
    Normal,
    /// First texture coordinate set.
    Texcoord0,
    /// First vertex color set.
    Color0,
}

impl VertexAttribute {
    /// Every attribute, in location order.
    pub const ALL: [VertexAttribute; 4] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::Texcoord0,
        VertexAttribute::Color0,
    ];

    /// Shader input location.
    pub const fn location(self) -> u32 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 1,
            VertexAttribute::Texcoord0 => 2,
            VertexAttribute::Color0 => 3,
        }
    }

    /// Shape the attribute is declared with in shaders.
    pub const fn composition(self) -> CompositionType {
        match self {
            VertexAttribute::Position | VertexAttribute::Normal => CompositionType::Vec3,
            VertexAttribute::Texcoord0 => CompositionType::Vec2,
            VertexAttribute::Color0 => CompositionType::Vec4,
        }
    }

    /// Identifier used for shader inputs.
    pub const fn name(self) -> &'static str {
        match self {
            VertexAttribute::Position => "a_position",
            VertexAttribute::Normal => "a_normal",
            VertexAttribute::Texcoord0 => "a_texcoord0",
            VertexAttribute::Color0 => "a_color0",
        }
    }
}

/// One draw-sized piece of a mesh: vertex attributes, optional indices and
/// the material used to draw it.
///
/// A primitive may hold several named material variants and switch between
/// them without losing the others.
#[derive(Debug)]
pub struct Primitive {
    attributes: BTreeMap<VertexAttribute, Accessor>,
    indices: Option<Accessor>,
    material: MaterialHandle,
    previous_material: Option<MaterialHandle>,
    variants: BTreeMap<String, MaterialHandle>,
    current_variant: Option<String>,
    fingerprint: String,
}

impl Primitive {
    /// A primitive without geometry, drawn with `material`.
    pub fn new(material: MaterialHandle) -> Self {
        let mut primitive = Self {
            attributes: BTreeMap::new(),
            indices: None,
            material,
            previous_material: None,
            variants: BTreeMap::new(),
            current_variant: None,
            fingerprint: String::new(),
        };
        primitive.update_fingerprint();
        primitive
    }

    /// Copies flat float vertex data and optional indices into the vertex
    /// arena and builds a primitive over them.
    pub fn from_vertex_data(
        memory: &mut MemoryManager,
        label: &str,
        material: MaterialHandle,
        attributes: &[(VertexAttribute, &[f32])],
        indices: Option<&[u32]>,
    ) -> Result<Self, AllocationError> {
        let mut primitive = Self::new(material);
        for (attribute, data) in attributes {
            let composition = attribute.composition();
            let n = composition.component_count();
            let count = data.len() / n;
            let desc = AccessorDescriptor::new(composition, ComponentType::F32, count);
            let mut view = memory.take_buffer_view(
                BufferUse::GpuVertexData,
                format!("{label}:{}", attribute.name()),
                desc.element_byte_size() * count,
                desc.element_byte_size(),
            )?;
            let mut accessor = view.take_accessor(&desc)?;
            for (i, element) in data.chunks_exact(n).enumerate() {
                accessor.set_components(i, element);
            }
            primitive.set_attribute(*attribute, accessor)?;
        }
        if let Some(indices) = indices {
            let desc = AccessorDescriptor::new(CompositionType::Scalar, ComponentType::U32, indices.len());
            let mut view = memory.take_buffer_view(
                BufferUse::GpuVertexData,
                format!("{label}:indices"),
                4 * indices.len(),
                4,
            )?;
            let mut accessor = view.take_accessor(&desc)?;
            for (i, index) in indices.iter().enumerate() {
                accessor.set_index(i, *index);
            }
            primitive.set_indices(accessor);
        }
        Ok(primitive)
    }

    /// Attaches a vertex attribute. The accessor must have the attribute's
    /// declared shape.
    pub fn set_attribute(&mut self, attribute: VertexAttribute, accessor: Accessor) -> Result<(), AllocationError> {
        if accessor.composition() != attribute.composition() {
            return Err(AllocationError::IncompatibleAccessor(format!(
                "{attribute:?} expects {}, got {}",
                attribute.composition(),
                accessor.composition()
            )));
        }
        self.attributes.insert(attribute, accessor);
        self.update_fingerprint();
        Ok(())
    }

    /// Attaches an index accessor.
    pub fn set_indices(&mut self, indices: Accessor) {
        self.indices = Some(indices);
        self.update_fingerprint();
    }

    /// Vertex attributes, in location order.
    pub fn attributes(&self) -> impl Iterator<Item = (VertexAttribute, &Accessor)> {
        self.attributes.iter().map(|(a, accessor)| (*a, accessor))
    }

    /// The accessor of `attribute`, if present.
    pub fn attribute(&self, attribute: VertexAttribute) -> Option<&Accessor> {
        self.attributes.get(&attribute)
    }

    /// The index accessor, if the primitive is indexed.
    pub fn indices(&self) -> Option<&Accessor> {
        self.indices.as_ref()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.attributes
            .get(&VertexAttribute::Position)
            .map(Accessor::count)
            .unwrap_or(0)
    }

    /// Number of elements a draw consumes.
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map(Accessor::count)
            .unwrap_or_else(|| self.vertex_count())
    }

    /// Describes the vertex layout; part of every program cache key.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn update_fingerprint(&mut self) {
        let mut parts: Vec<String> = self
            .attributes
            .iter()
            .map(|(attribute, accessor)| {
                format!("{}:{}:{}", attribute.name(), accessor.composition(), accessor.component())
            })
            .collect();
        if let Some(indices) = &self.indices {
            parts.push(format!("indices:{}", indices.component()));
        }
        self.fingerprint = parts.join(",");
    }

    // --- Materials ---

    /// The material currently used to draw.
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    /// Replaces the material, remembering the old one.
    pub fn set_material(&mut self, material: MaterialHandle) {
        if material != self.material {
            self.previous_material = Some(self.material);
            self.material = material;
        }
    }

    /// The material used before the last swap.
    pub fn previous_material(&self) -> Option<MaterialHandle> {
        self.previous_material
    }

    /// Swaps back to the previous material. Returns `false` if there is none.
    pub fn restore_previous_material(&mut self) -> bool {
        match self.previous_material.take() {
            Some(previous) => {
                self.previous_material = Some(self.material);
                self.material = previous;
                self.current_variant = None;
                true
            }
            None => false,
        }
    }

    /// Registers a named material variant.
    pub fn set_material_variant(&mut self, name: impl Into<String>, material: MaterialHandle) {
        self.variants.insert(name.into(), material);
    }

    /// Switches to a registered variant. Returns `false` for unknown names.
    pub fn apply_material_variant(&mut self, name: &str) -> bool {
        let Some(&material) = self.variants.get(name) else {
            return false;
        };
        self.set_material(material);
        self.current_variant = Some(name.to_string());
        true
    }

    /// Name of the applied variant, if any.
    pub fn current_variant(&self) -> Option<&str> {
        self.current_variant.as_deref()
    }

    /// Names of every registered variant, sorted.
    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.keys().map(String::as_str).collect()
    }
}

/// A named set of primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mesh {
    /// Display name.
    pub name: String,
    /// Ids of the primitives, in draw order.
    pub primitives: Vec<PrimitiveId>,
}

/// Attaches a mesh to an entity's instance slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshComponent {
    /// The mesh drawn.
    pub mesh: MeshId,
    /// Where the entity's instance values live.
    pub instance: InstanceSlot,
}

/// Owns every primitive and mesh and assigns their ids.
#[derive(Debug, Default)]
pub struct MeshRepository {
    meshes: Vec<Mesh>,
    primitives: Vec<Primitive>,
}

impl MeshRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mesh built from `primitives`.
    pub fn add_mesh(&mut self, name: impl Into<String>, primitives: Vec<Primitive>) -> MeshId {
        let first = self.primitives.len() as u32;
        let ids = (first..first + primitives.len() as u32).map(PrimitiveId).collect();
        self.primitives.extend(primitives);
        self.meshes.push(Mesh {
            name: name.into(),
            primitives: ids,
        });
        MeshId(self.meshes.len() as u32 - 1)
    }

    /// The mesh behind `id`.
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    /// The primitive behind `id`.
    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0 as usize)
    }

    /// Mutable access to the primitive behind `id`.
    pub fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.primitives.get_mut(id.0 as usize)
    }

    /// Every primitive with its id.
    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives
            .iter()
            .enumerate()
            .map(|(i, p)| (PrimitiveId(i as u32), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineLimits;

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    fn handles() -> (MaterialHandle, MaterialHandle) {
        let limits = EngineLimits::small();
        let registry = crate::semantics::SemanticsRegistry::with_builtins(&limits);
        let mut memory = MemoryManager::new(&limits).unwrap();
        let mut repo = crate::material::MaterialRepository::new(&limits);
        repo.register_type(
            &mut memory,
            &registry,
            crate::material::MaterialTypeDescriptor::new("Flat", &[]),
        )
        .unwrap();
        (repo.create_material("Flat").unwrap(), repo.create_material("Flat").unwrap())
    }

    #[test]
    fn test_from_vertex_data() {
        let mut memory = MemoryManager::new(&EngineLimits::small()).unwrap();
        let primitive = Primitive::from_vertex_data(
            &mut memory,
            "tri",
            MaterialHandle::default(),
            &[(VertexAttribute::Position, &TRIANGLE)],
            Some(&[0, 1, 2]),
        )
        .unwrap();
        assert_eq!(primitive.vertex_count(), 3);
        assert_eq!(primitive.element_count(), 3);
        assert_eq!(
            primitive.attribute(VertexAttribute::Position).unwrap().get_components(1, Default::default()),
            vec![1.0, 0.0, 0.0]
        );
        assert_eq!(primitive.fingerprint(), "a_position:VEC3:FLOAT,indices:UNSIGNED_INT");
    }

    #[test]
    fn test_attribute_shape_is_checked() {
        let mut memory = MemoryManager::new(&EngineLimits::small()).unwrap();
        let mut view = memory
            .take_buffer_view(BufferUse::GpuVertexData, "uv", 64, 0)
            .unwrap();
        let accessor = view
            .take_accessor(&AccessorDescriptor::new(CompositionType::Vec2, ComponentType::F32, 4))
            .unwrap();
        let mut primitive = Primitive::new(MaterialHandle::default());
        assert!(matches!(
            primitive.set_attribute(VertexAttribute::Normal, accessor),
            Err(AllocationError::IncompatibleAccessor(_))
        ));
    }

    #[test]
    fn test_material_variants() {
        let (plain, glossy) = handles();
        let mut primitive = Primitive::new(plain);
        primitive.set_material_variant("glossy", glossy);
        assert!(!primitive.apply_material_variant("matte"));
        assert!(primitive.apply_material_variant("glossy"));
        assert_eq!(primitive.material(), glossy);
        assert_eq!(primitive.current_variant(), Some("glossy"));
        assert_eq!(primitive.previous_material(), Some(plain));
        assert_eq!(primitive.variant_names(), vec!["glossy"]);

        assert!(primitive.restore_previous_material());
        assert_eq!(primitive.material(), plain);
        assert_eq!(primitive.current_variant(), None);
    }

    #[test]
    fn test_repository_assigns_ids() {
        let mut repo = MeshRepository::new();
        let a = repo.add_mesh("a", vec![Primitive::new(MaterialHandle::default())]);
        let b = repo.add_mesh(
            "b",
            vec![
                Primitive::new(MaterialHandle::default()),
                Primitive::new(MaterialHandle::default()),
            ],
        );
        assert_eq!(repo.mesh(a).unwrap().primitives, vec![PrimitiveId(0)]);
        assert_eq!(
            repo.mesh(b).unwrap().primitives,
            vec![PrimitiveId(1), PrimitiveId(2)]
        );
        assert_eq!(repo.primitives().count(), 3);
    }
}
