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

//! Parameter values held by a material.

use crate::semantics::SemanticsInfo;
use strata_core::renderer::TextureId;

/// Load state of a texture parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureState {
    /// The texture is still loading; programs using it are not ready.
    Pending,
    /// The texture is on the device.
    Ready(TextureId),
    /// Loading was given up. Programs are built without the sampler.
    Abandoned,
}

/// Current value of one material parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Flat float components, column-major for matrices, elements end to end
    /// for arrays.
    Numeric(Vec<f32>),
    /// A texture slot. `None` means no texture was ever assigned.
    Texture(Option<TextureState>),
}

impl ParameterValue {
    /// The declared default of `info`.
    pub fn initial(info: &SemanticsInfo) -> Self {
        if info.texture {
            ParameterValue::Texture(None)
        } else {
            let mut values = Vec::with_capacity(info.component_count() * info.array_length);
            for _ in 0..info.array_length {
                values.extend_from_slice(&info.initial);
            }
            ParameterValue::Numeric(values)
        }
    }

    /// Numeric components, if this is a numeric value.
    pub fn as_numeric(&self) -> Option<&[f32]> {
        match self {
            ParameterValue::Numeric(values) => Some(values),
            ParameterValue::Texture(_) => None,
        }
    }

    /// Structural marker folded into the material fingerprint.
    ///
    /// Plain numeric values never change shader structure. A pending or
    /// ready texture adds a sampler to the program; an abandoned one does not.
    pub fn variant_marker(&self) -> Option<&'static str> {
        match self {
            ParameterValue::Texture(Some(TextureState::Pending | TextureState::Ready(_))) => {
                Some("texture")
            }
            _ => None,
        }
    }
}

/// Whether a value was supplied by the user or computed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOrigin {
    /// Set through [`Material::set_parameter`](super::Material::set_parameter).
    Explicit,
    /// The declared default or an engine-computed value.
    Auto,
}

/// One declared parameter and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Declaration of the semantic.
    pub info: SemanticsInfo,
    /// Current value.
    pub value: ParameterValue,
    /// Who set the value.
    pub origin: ValueOrigin,
}

impl Parameter {
    pub(crate) fn new(info: SemanticsInfo) -> Self {
        let value = ParameterValue::initial(&info);
        Self {
            info,
            value,
            origin: ValueOrigin::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::layout::{ComponentType, CompositionType};

    #[test]
    fn test_initial_values() {
        let info = SemanticsInfo::new("Tint", CompositionType::Vec2, ComponentType::F32)
            .with_initial(&[0.5, 1.0])
            .array(2);
        assert_eq!(
            ParameterValue::initial(&info),
            ParameterValue::Numeric(vec![0.5, 1.0, 0.5, 1.0])
        );
        assert_eq!(
            ParameterValue::initial(&SemanticsInfo::texture("Albedo")),
            ParameterValue::Texture(None)
        );
    }

    #[test]
    fn test_variant_markers() {
        assert_eq!(ParameterValue::Numeric(vec![1.0]).variant_marker(), None);
        assert_eq!(ParameterValue::Texture(None).variant_marker(), None);
        assert_eq!(
            ParameterValue::Texture(Some(TextureState::Pending)).variant_marker(),
            ParameterValue::Texture(Some(TextureState::Ready(TextureId(3)))).variant_marker()
        );
        assert_eq!(
            ParameterValue::Texture(Some(TextureState::Abandoned)).variant_marker(),
            None
        );
    }
}
