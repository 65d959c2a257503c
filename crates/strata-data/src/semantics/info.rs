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

use serde::{Deserialize, Serialize};
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::renderer::StageVisibility;

/// How often a semantic's value is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateInterval {
    /// Once per frame (camera, time).
    PerFrame,
    /// When the owning material changes.
    PerMaterial,
    /// Potentially every draw (transforms).
    EveryTime,
}

/// Immutable description of one named shader input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticsInfo {
    /// Unique name, also used to derive shader identifiers.
    pub name: String,
    /// Shape of one element.
    pub composition: CompositionType,
    /// Encoding of each component.
    pub component: ComponentType,
    /// Stages that read the value.
    pub stage: StageVisibility,
    /// Default value of one element.
    pub initial: Vec<f32>,
    /// Lower bound every component is clamped to, if any.
    pub min: Option<f32>,
    /// Upper bound every component is clamped to, if any.
    pub max: Option<f32>,
    /// Number of elements; 1 for non-array semantics.
    pub array_length: usize,
    /// One value shared by every material of a type instead of one per draw.
    pub solo: bool,
    /// Expected change frequency.
    pub update_interval: UpdateInterval,
    /// Set by the engine, never exposed as a user parameter.
    pub internal: bool,
    /// Kept as a plain uniform even when data is delivered through a texture.
    pub needs_uniform_in_data_texture_mode: bool,
    /// The semantic names a texture binding rather than numeric data.
    pub texture: bool,
}

impl SemanticsInfo {
    /// A per-draw, non-array semantic visible from both stages, defaulting to
    /// zero.
    pub fn new(name: impl Into<String>, composition: CompositionType, component: ComponentType) -> Self {
        Self {
            name: name.into(),
            composition,
            component,
            stage: StageVisibility::Both,
            initial: vec![0.0; composition.component_count()],
            min: None,
            max: None,
            array_length: 1,
            solo: false,
            update_interval: UpdateInterval::PerMaterial,
            internal: false,
            needs_uniform_in_data_texture_mode: false,
            texture: false,
        }
    }

    /// A texture semantic sampled in the pixel stage.
    pub fn texture(name: impl Into<String>) -> Self {
        Self {
            texture: true,
            stage: StageVisibility::Pixel,
            initial: Vec::new(),
            ..Self::new(name, CompositionType::Vec4, ComponentType::F32)
        }
    }

    /// Sets the default value.
    ///
    /// # Panics
    /// Panics if `initial` does not hold exactly one element.
    pub fn with_initial(mut self, initial: &[f32]) -> Self {
        assert_eq!(initial.len(), self.composition.component_count());
        self.initial = initial.to_vec();
        self
    }

    /// Sets the component bounds.
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Makes the semantic an array of `length` elements.
    pub fn array(mut self, length: usize) -> Self {
        self.array_length = length.max(1);
        self
    }

    /// Restricts the semantic to one stage set.
    pub fn stage(mut self, stage: StageVisibility) -> Self {
        self.stage = stage;
        self
    }

    /// Shares one value between every material of a type.
    pub fn solo(mut self) -> Self {
        self.solo = true;
        self
    }

    /// Marks the semantic as engine-set.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Sets the update interval.
    pub fn interval(mut self, interval: UpdateInterval) -> Self {
        self.update_interval = interval;
        self
    }

    /// Keeps the semantic as a uniform in data-texture mode.
    pub fn uniform_in_data_texture(mut self) -> Self {
        self.needs_uniform_in_data_texture_mode = true;
        self
    }

    /// Returns `true` for array semantics.
    pub fn is_array(&self) -> bool {
        self.array_length > 1
    }

    /// Number of components of one element.
    pub fn component_count(&self) -> usize {
        self.composition.component_count()
    }

    /// Human-readable shape, used in error messages.
    pub fn shape(&self) -> String {
        if self.texture {
            "TEXTURE".to_string()
        } else if self.is_array() {
            format!("{}<{}>[{}]", self.composition, self.component, self.array_length)
        } else {
            format!("{}<{}>", self.composition, self.component)
        }
    }

    /// Clamps `values` to the declared bounds in place.
    pub fn clamp(&self, values: &mut [f32]) {
        for v in values {
            if let Some(min) = self.min {
                *v = v.max(min);
            }
            if let Some(max) = self.max {
                *v = v.min(max);
            }
        }
    }

    /// Whether two declarations describe the same data layout.
    pub fn same_layout(&self, other: &SemanticsInfo) -> bool {
        self.composition == other.composition
            && self.component == other.component
            && self.array_length == other.array_length
            && self.texture == other.texture
            && self.solo == other.solo
    }

    /// Name of the getter the binding strategies generate for this semantic.
    pub fn getter_name(&self) -> String {
        format!("get_{}", self.name)
    }

    /// Name of the uniform variable carrying this semantic.
    pub fn uniform_name(&self) -> String {
        format!("u_{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_shape() {
        let info = SemanticsInfo::new("LightPosition", CompositionType::Vec4, ComponentType::F32)
            .array(4)
            .stage(StageVisibility::Pixel);
        assert!(info.is_array());
        assert_eq!(info.shape(), "VEC4<FLOAT>[4]");
        assert_eq!(info.getter_name(), "get_LightPosition");
        assert_eq!(info.uniform_name(), "u_LightPosition");
    }

    #[test]
    fn test_clamp() {
        let info = SemanticsInfo::new("Factor", CompositionType::Vec2, ComponentType::F32)
            .with_range(0.0, 1.0);
        let mut v = [1.5, -0.5];
        info.clamp(&mut v);
        assert_eq!(v, [1.0, 0.0]);
    }
}
