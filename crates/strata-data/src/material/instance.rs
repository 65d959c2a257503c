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

use super::value::{Parameter, ParameterValue, TextureState, ValueOrigin};
use crate::error::ParameterError;
use crate::mesh::Primitive;
use crate::semantics::SemanticsInfo;
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use strata_core::renderer::{
    AlphaMode, BlendState, ColorWriteMask, CullMode, PipelineState, ProgramId, StrategyKind,
    TextureId, UniformValue,
};

/// Cache key of one compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    /// Material fingerprint at compile time.
    pub fingerprint: String,
    /// Fingerprint of the primitive's vertex layout.
    pub primitive_fingerprint: String,
    /// Strategy the program's data prelude was generated for.
    pub strategy: StrategyKind,
}

/// Outcome of a program creation, cached per [`ProgramKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramSlot {
    /// The program compiled and linked.
    Ready(ProgramId),
    /// Creation failed; the key is not retried until the cache is cleared.
    Failed,
}

/// Everything a [`ProgramFactory`] needs to build a program.
#[derive(Debug, Clone, Copy)]
pub struct ProgramRequest<'a> {
    /// The material being drawn.
    pub material: &'a Material,
    /// The primitive being drawn.
    pub primitive: &'a Primitive,
    /// The active binding strategy.
    pub strategy: StrategyKind,
}

/// Builds programs on cache misses.
///
/// Implemented by the render agent, which resolves the material type's node
/// graph and compiles it on the device.
pub trait ProgramFactory {
    /// Error reported when a program cannot be built.
    type Error;

    /// Generates, compiles and links the program for `request`.
    fn create_program(&mut self, request: &ProgramRequest<'_>) -> Result<ProgramId, Self::Error>;
}

/// A per-draw parameter set over the semantics catalog.
///
/// Values written here are staged; the owning
/// [`MaterialRepository`](super::MaterialRepository) flushes them into the
/// instance arena during the logic stage. Solo semantics are not held per
/// material: the repository keeps one value per type.
#[derive(Debug)]
pub struct Material {
    type_name: String,
    type_id: u32,
    instance_id: u32,
    pub(crate) slot: usize,
    parameters: BTreeMap<String, Parameter>,
    shared: BTreeSet<String>,
    definitions: BTreeSet<String>,
    state_version: u64,
    fingerprint: String,
    program_cache: AHashMap<ProgramKey, ProgramSlot>,
    pipeline: PipelineState,
    pub(crate) dirty: BTreeSet<String>,
}

impl Material {
    pub(crate) fn new(
        type_name: impl Into<String>,
        type_id: u32,
        instance_id: u32,
        slot: usize,
        infos: &[SemanticsInfo],
        definitions: impl IntoIterator<Item = String>,
    ) -> Self {
        let (parameters, shared) = split_shared(infos);
        let dirty = parameters
            .values()
            .filter(|p| !p.info.texture)
            .map(|p| p.info.name.clone())
            .collect();
        let mut material = Self {
            type_name: type_name.into(),
            type_id,
            instance_id,
            slot,
            parameters,
            shared,
            definitions: definitions.into_iter().collect(),
            state_version: 0,
            fingerprint: String::new(),
            program_cache: AHashMap::new(),
            pipeline: PipelineState::default(),
            dirty,
        };
        material.fingerprint = material.compute_fingerprint();
        material
    }

    // --- Identity ---

    /// Name of the material type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Numeric id of the material type.
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    /// Unique id of this material, stable across recreation.
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Element index of this material in its type's parameter columns.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Incremented on every change that affects rendering.
    pub fn state_version(&self) -> u64 {
        self.state_version
    }

    // --- Parameters ---

    /// Whether `semantic` is a solo parameter, stored once for the whole type.
    pub fn is_shared(&self, semantic: &str) -> bool {
        self.shared.contains(semantic)
    }

    fn parameter_mut(&mut self, semantic: &str) -> Result<&mut Parameter, ParameterError> {
        if self.shared.contains(semantic) {
            return Err(ParameterError::SharedParameter(semantic.to_string()));
        }
        self.parameters
            .get_mut(semantic)
            .ok_or_else(|| ParameterError::UnknownSemantic(semantic.to_string()))
    }

    /// Sets a numeric parameter explicitly.
    ///
    /// The value must hold exactly `component_count * array_length` floats.
    /// Components are clamped to the declared range. Never changes the
    /// fingerprint.
    pub fn set_parameter(&mut self, semantic: &str, values: &[f32]) -> Result<(), ParameterError> {
        let parameter = self.parameter_mut(semantic)?;
        let expected = parameter.info.component_count() * parameter.info.array_length;
        if parameter.info.texture || values.len() != expected {
            return Err(ParameterError::ShapeMismatch {
                semantic: semantic.to_string(),
                expected: parameter.info.shape(),
                found: format!("{} components", values.len()),
            });
        }
        let mut clamped = values.to_vec();
        parameter.info.clamp(&mut clamped);
        parameter.value = ParameterValue::Numeric(clamped);
        parameter.origin = ValueOrigin::Explicit;
        self.dirty.insert(semantic.to_string());
        self.state_version += 1;
        Ok(())
    }

    /// Writes an engine-computed value unless the user set one explicitly.
    ///
    /// Returns `Ok(true)` when the value was stored.
    pub fn set_auto_parameter(&mut self, semantic: &str, values: &[f32]) -> Result<bool, ParameterError> {
        let parameter = self.parameter_mut(semantic)?;
        if parameter.origin == ValueOrigin::Explicit {
            return Ok(false);
        }
        self.set_parameter(semantic, values)?;
        if let Some(parameter) = self.parameters.get_mut(semantic) {
            parameter.origin = ValueOrigin::Auto;
        }
        Ok(true)
    }

    /// Restores the declared default of `semantic`.
    pub fn reset_parameter(&mut self, semantic: &str) -> Result<(), ParameterError> {
        let parameter = self.parameter_mut(semantic)?;
        parameter.value = ParameterValue::initial(&parameter.info);
        parameter.origin = ValueOrigin::Auto;
        let texture = parameter.info.texture;
        if texture {
            self.calc_fingerprint();
        } else {
            self.dirty.insert(semantic.to_string());
            self.state_version += 1;
        }
        Ok(())
    }

    /// Assigns or updates a texture parameter.
    ///
    /// Assigning the first texture to a slot changes the fingerprint; later
    /// load-state changes do not.
    pub fn set_texture(&mut self, semantic: &str, state: TextureState) -> Result<(), ParameterError> {
        let parameter = self.parameter_mut(semantic)?;
        if !parameter.info.texture {
            return Err(ParameterError::ShapeMismatch {
                semantic: semantic.to_string(),
                expected: parameter.info.shape(),
                found: "TEXTURE".to_string(),
            });
        }
        let before = parameter.value.variant_marker();
        parameter.value = ParameterValue::Texture(Some(state));
        parameter.origin = ValueOrigin::Explicit;
        let after = parameter.value.variant_marker();
        if before != after {
            self.calc_fingerprint();
        } else {
            self.state_version += 1;
        }
        Ok(())
    }

    /// Current value of `semantic`.
    pub fn get_parameter(&self, semantic: &str) -> Option<&ParameterValue> {
        self.parameters.get(semantic).map(|p| &p.value)
    }

    /// Origin of the current value of `semantic`.
    pub fn parameter_origin(&self, semantic: &str) -> Option<ValueOrigin> {
        self.parameters.get(semantic).map(|p| p.origin)
    }

    /// Every declared parameter, by semantic name.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Numeric parameters as uniform writes, as sent in uniform mode.
    pub fn uniform_values(&self) -> Vec<(String, UniformValue)> {
        self.parameters
            .values()
            .filter_map(|p| {
                let values = p.value.as_numeric()?;
                UniformValue::from_components(
                    p.info.composition,
                    p.info.component,
                    p.info.array_length,
                    values,
                )
                .map(|value| (p.info.uniform_name(), value))
            })
            .collect()
    }

    /// Textures that are on the device, by semantic.
    pub fn texture_bindings(&self) -> Vec<(&str, TextureId)> {
        self.parameters
            .values()
            .filter_map(|p| match p.value {
                ParameterValue::Texture(Some(TextureState::Ready(id))) => Some((p.info.name.as_str(), id)),
                _ => None,
            })
            .collect()
    }

    /// Texture semantics the program must declare a sampler for.
    pub fn assigned_textures(&self) -> Vec<&str> {
        self.parameters
            .values()
            .filter(|p| p.value.variant_marker().is_some())
            .map(|p| p.info.name.as_str())
            .collect()
    }

    pub(crate) fn take_dirty(&mut self) -> Vec<(String, Vec<f32>)> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|name| {
                let values = self.parameters.get(&name)?.value.as_numeric()?.to_vec();
                Some((name, values))
            })
            .collect()
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        self.dirty = self
            .parameters
            .values()
            .filter(|p| !p.info.texture)
            .map(|p| p.info.name.clone())
            .collect();
    }

    // --- Definitions and fingerprint ---

    /// Preprocessor-style feature flags.
    pub fn definitions(&self) -> &BTreeSet<String> {
        &self.definitions
    }

    /// Every define the generated program is compiled with: the explicit
    /// definitions plus one `HAS_<Semantic>` per assigned texture.
    pub fn shader_definitions(&self) -> Vec<String> {
        let mut defines: BTreeSet<String> = self.definitions.clone();
        for name in self.assigned_textures() {
            defines.insert(format!("HAS_{name}"));
        }
        defines.into_iter().collect()
    }

    /// Adds a feature flag. Returns `false` if it was already set.
    pub fn add_shader_define(&mut self, define: impl Into<String>) -> bool {
        let inserted = self.definitions.insert(define.into());
        if inserted {
            self.calc_fingerprint();
        }
        inserted
    }

    /// Removes a feature flag. Returns `false` if it was not set.
    pub fn remove_shader_define(&mut self, define: &str) -> bool {
        let removed = self.definitions.remove(define);
        if removed {
            self.calc_fingerprint();
        }
        removed
    }

    /// The program cache key of the material's current structure.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Recomputes the fingerprint and bumps the state version.
    pub fn calc_fingerprint(&mut self) {
        self.fingerprint = self.compute_fingerprint();
        self.state_version += 1;
    }

    fn compute_fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.type_name.as_bytes());
        hasher.update(b"\0defines");
        for define in &self.definitions {
            hasher.update(b"\0");
            hasher.update(define.as_bytes());
        }
        hasher.update(b"\0variants");
        for parameter in self.parameters.values() {
            if let Some(marker) = parameter.value.variant_marker() {
                hasher.update(b"\0");
                hasher.update(parameter.info.name.as_bytes());
                hasher.update(b"=");
                hasher.update(marker.as_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    // --- Programs ---

    /// `false` while any assigned texture is still loading.
    ///
    /// Abandoned textures count as ready: they carry no variant marker, so
    /// the program is built without their sampler.
    pub fn is_shader_program_ready(&self) -> bool {
        !self
            .parameters
            .values()
            .any(|p| p.value == ParameterValue::Texture(Some(TextureState::Pending)))
    }

    fn program_key(&self, primitive: &Primitive, strategy: StrategyKind) -> ProgramKey {
        ProgramKey {
            fingerprint: self.fingerprint.clone(),
            primitive_fingerprint: primitive.fingerprint().to_string(),
            strategy,
        }
    }

    /// Cached program for `primitive`, without creating one.
    ///
    /// `None` while the material is not ready, even if a program for its
    /// fingerprint was built before.
    pub fn get_shader_program_uid(&self, primitive: &Primitive, strategy: StrategyKind) -> Option<ProgramId> {
        if !self.is_shader_program_ready() {
            return None;
        }
        match self.program_cache.get(&self.program_key(primitive, strategy)) {
            Some(ProgramSlot::Ready(id)) => Some(*id),
            _ => None,
        }
    }

    /// Returns the cached program for `primitive`, creating it on a miss.
    ///
    /// Returns `Ok(None)` while the material is not ready, or when an earlier
    /// creation for the same key failed. A failure is reported once, as
    /// `Err`, and then cached.
    pub fn get_or_create_program<F: ProgramFactory>(
        &mut self,
        primitive: &Primitive,
        strategy: StrategyKind,
        factory: &mut F,
    ) -> Result<Option<ProgramId>, F::Error> {
        if !self.is_shader_program_ready() {
            return Ok(None);
        }
        let key = self.program_key(primitive, strategy);
        match self.program_cache.get(&key) {
            Some(ProgramSlot::Ready(id)) => return Ok(Some(*id)),
            Some(ProgramSlot::Failed) => return Ok(None),
            None => {}
        }
        let request = ProgramRequest {
            material: self,
            primitive,
            strategy,
        };
        match factory.create_program(&request) {
            Ok(id) => {
                log::debug!(
                    "Material '{}' #{}: program {:?} for {}",
                    self.type_name,
                    self.instance_id,
                    id,
                    strategy
                );
                self.program_cache.insert(key, ProgramSlot::Ready(id));
                Ok(Some(id))
            }
            Err(err) => {
                self.program_cache.insert(key, ProgramSlot::Failed);
                Err(err)
            }
        }
    }

    /// Number of cached program outcomes.
    pub fn cached_programs(&self) -> usize {
        self.program_cache.len()
    }

    /// Forgets every cached program, failures included.
    pub fn clear_program_cache(&mut self) {
        self.program_cache.clear();
    }

    // --- Pipeline state ---

    /// Fixed-function state used when drawing with this material.
    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    /// Sets the alpha mode. Blend mode enables standard alpha blending unless
    /// a blend state was set explicitly.
    pub fn set_alpha_mode(&mut self, mode: AlphaMode) {
        self.pipeline.alpha_mode = mode;
        if mode == AlphaMode::Blend && self.pipeline.blend.is_none() {
            self.pipeline.blend = Some(BlendState::ALPHA_BLENDING);
        }
    }

    /// Sets or clears the blend equation.
    pub fn set_blend(&mut self, blend: Option<BlendState>) {
        self.pipeline.blend = blend;
    }

    /// Sets the color channels written.
    pub fn set_color_write_mask(&mut self, mask: ColorWriteMask) {
        self.pipeline.color_write_mask = mask;
    }

    /// Sets the culled face.
    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.pipeline.cull_mode = mode;
    }

    pub(crate) fn reassign(&mut self, type_name: &str, type_id: u32, slot: usize, infos: &[SemanticsInfo]) {
        let (mut parameters, shared) = split_shared(infos);
        for parameter in parameters.values_mut() {
            if let Some(old) = self.parameters.get(&parameter.info.name) {
                if old.origin == ValueOrigin::Explicit && old.info.same_layout(&parameter.info) {
                    parameter.value = old.value.clone();
                    parameter.origin = ValueOrigin::Explicit;
                }
            }
        }
        self.type_name = type_name.to_string();
        self.type_id = type_id;
        self.slot = slot;
        self.parameters = parameters;
        self.shared = shared;
        self.program_cache.clear();
        self.mark_all_dirty();
        self.calc_fingerprint();
    }
}

/// Per-material parameters, and the names of the solo ones kept per type.
fn split_shared(infos: &[SemanticsInfo]) -> (BTreeMap<String, Parameter>, BTreeSet<String>) {
    let mut parameters = BTreeMap::new();
    let mut shared = BTreeSet::new();
    for info in infos {
        if info.solo && !info.texture {
            shared.insert(info.name.clone());
        } else {
            parameters.insert(info.name.clone(), Parameter::new(info.clone()));
        }
    }
    (parameters, shared)
}
