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

//! Strategy-generated shader code that defines the `get_<Semantic>` accessors.

use crate::shader_lane::syntax::LanguageSyntax;
use std::collections::BTreeMap;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::renderer::{ShaderLanguage, ShaderStage};
use strata_data::layout::{DataScope, LayoutEntry};

/// How node code calls one accessor function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetterSignature {
    /// Shape returned.
    pub composition: CompositionType,
    /// Encoding of the returned components.
    pub component: ComponentType,
    /// Whether the getter takes an element index.
    pub indexed: bool,
}

/// Prelude code of one stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePrelude {
    /// Declarations and getter definitions.
    pub source: String,
    /// Getters defined in `source`, by semantic.
    pub getters: BTreeMap<String, GetterSignature>,
}

/// The data-access code a binding strategy injects into every program.
///
/// Node code only ever calls `get_<Semantic>()`; the prelude decides whether
/// that reads a uniform, a texel or a storage buffer element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderPrelude {
    /// Vertex stage code.
    pub vertex: StagePrelude,
    /// Pixel stage code.
    pub pixel: StagePrelude,
}

impl ShaderPrelude {
    /// The code of `stage`.
    pub fn stage(&self, stage: ShaderStage) -> &StagePrelude {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Pixel => &self.pixel,
        }
    }

    fn stage_mut(&mut self, stage: ShaderStage) -> &mut StagePrelude {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Pixel => &mut self.pixel,
        }
    }

    /// The getter of `semantic` visible in `stage`.
    pub fn getter(&self, stage: ShaderStage, semantic: &str) -> Option<GetterSignature> {
        self.stage(stage).getters.get(semantic).copied()
    }

    /// Appends declarations shared by both stages.
    pub fn declare(&mut self, code: &str) {
        for stage in [ShaderStage::Vertex, ShaderStage::Pixel] {
            let prelude = self.stage_mut(stage);
            prelude.source.push_str(code);
            if !code.ends_with('\n') {
                prelude.source.push('\n');
            }
        }
    }

    /// Appends the getter of `entry` to every stage that reads it.
    pub fn add_getter(&mut self, entry: &LayoutEntry, definition: &str) {
        let signature = GetterSignature {
            composition: entry.composition,
            component: entry.component,
            indexed: entry.is_array(),
        };
        for stage in [ShaderStage::Vertex, ShaderStage::Pixel] {
            if !entry.stage.includes(stage) {
                continue;
            }
            let prelude = self.stage_mut(stage);
            prelude.source.push('\n');
            prelude.source.push_str(definition);
            prelude.source.push('\n');
            prelude.getters.insert(entry.semantic.clone(), signature);
        }
    }
}

/// A getter for `entry` whose body runs `statements` and returns `result`.
pub(crate) fn getter_definition(
    syntax: &dyn LanguageSyntax,
    entry: &LayoutEntry,
    statements: &[String],
    result: &str,
) -> String {
    let ret = syntax.type_name(entry.composition, entry.component);
    let index_ty = syntax.scalar_type(ComponentType::I32).to_string();
    let params: Vec<(&str, String)> = if entry.is_array() {
        vec![("index", index_ty)]
    } else {
        Vec::new()
    };
    syntax.function(&entry.getter_name(), &params, &ret, statements, result)
}

/// How a language spells the per-draw indices of an arena read.
pub(crate) struct IndexTerms<'a> {
    /// Type of the computed element index.
    pub index_type: &'a str,
    /// Suffix of integer literals of that type.
    pub literal_suffix: &'a str,
    /// Expression of the draw's instance slot.
    pub instance: &'a str,
    /// Expression of the draw's material slot.
    pub material_slot: &'a str,
    /// Expression of the getter's `index` parameter.
    pub element: &'a str,
}

/// First vec4 of the element `entry` resolves to for the current draw.
pub(crate) fn base_index(entry: &LayoutEntry, terms: &IndexTerms<'_>) -> String {
    let s = terms.literal_suffix;
    let mut parts = vec![format!("{}{s}", entry.vec4_offset)];
    match entry.scope {
        DataScope::Global => {}
        DataScope::Instance => parts.push(format!("{} * {}{s}", terms.instance, entry.vec4_stride)),
        DataScope::Material if entry.solo => {}
        DataScope::Material => {
            parts.push(format!("{} * {}{s}", terms.material_slot, entry.vec4_stride))
        }
    }
    if entry.is_array() {
        parts.push(format!("{} * {}{s}", terms.element, entry.composition.vec4_slots()));
    }
    parts.join(" + ")
}

/// A getter reading `entry` from a vec4 array. `fetch(index)` is the
/// expression of the vec4 at `index`.
pub(crate) fn arena_getter(
    syntax: &dyn LanguageSyntax,
    entry: &LayoutEntry,
    terms: &IndexTerms<'_>,
    fetch: impl Fn(&str) -> String,
) -> String {
    let statements = vec![syntax.local(terms.index_type, "base", &base_index(entry, terms))];
    let texel = |k: usize| {
        if k == 0 {
            fetch("base")
        } else {
            fetch(&format!("base + {k}{}", terms.literal_suffix))
        }
    };
    let value = decode_texels(syntax, entry.composition, entry.component, texel);
    getter_definition(syntax, entry, &statements, &value)
}

/// Rebuilds a value of `entry`'s type from the vec4 texels it occupies.
///
/// `texel(k)` is the expression of the k-th vec4 of the element. Integer
/// components are stored bit-exact in the float lanes.
pub(crate) fn decode_texels(
    syntax: &dyn LanguageSyntax,
    composition: CompositionType,
    component: ComponentType,
    texel: impl Fn(usize) -> String,
) -> String {
    let float_value = match composition {
        CompositionType::Scalar => format!("{}.x", texel(0)),
        CompositionType::Vec2 => format!("{}.xy", texel(0)),
        CompositionType::Vec3 => format!("{}.xyz", texel(0)),
        CompositionType::Vec4 => texel(0),
        CompositionType::Mat2 | CompositionType::Mat3 | CompositionType::Mat4 => {
            let columns = composition.vec4_slots();
            let swizzle = match composition {
                CompositionType::Mat2 => ".xy",
                CompositionType::Mat3 => ".xyz",
                _ => "",
            };
            let args: Vec<String> = (0..columns)
                .map(|k| format!("{}{swizzle}", texel(k)))
                .collect();
            return syntax.construct(composition, ComponentType::F32, &args);
        }
    };
    if !component.is_integer() {
        return float_value;
    }
    let target = syntax.type_name(composition, component);
    match syntax.language() {
        ShaderLanguage::Glsl => {
            let function = if syntax.scalar_type(component) == "uint" {
                "floatBitsToUint"
            } else {
                "floatBitsToInt"
            };
            format!("{function}({float_value})")
        }
        ShaderLanguage::Wgsl => format!("bitcast<{target}>({float_value})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader_lane::syntax::{GlslSyntax, WgslSyntax};
    use strata_core::renderer::StageVisibility;
    use strata_data::semantics::SemanticsInfo;

    fn entry(name: &str, composition: CompositionType, stage: StageVisibility) -> LayoutEntry {
        let info = SemanticsInfo::new(name, composition, ComponentType::F32).stage(stage);
        LayoutEntry::from_info(&info, DataScope::Global, 0)
    }

    #[test]
    fn test_getter_visible_only_in_its_stages() {
        let mut prelude = ShaderPrelude::default();
        let world = entry("WorldMatrix", CompositionType::Mat4, StageVisibility::Vertex);
        prelude.add_getter(&world, "mat4 get_WorldMatrix() { return u_WorldMatrix; }");
        assert!(prelude.getter(ShaderStage::Vertex, "WorldMatrix").is_some());
        assert!(prelude.getter(ShaderStage::Pixel, "WorldMatrix").is_none());
        assert!(prelude.pixel.source.is_empty());
    }

    #[test]
    fn test_decode_matrix_and_integers() {
        let texel = |k: usize| format!("t[{k}]");
        assert_eq!(
            decode_texels(&GlslSyntax, CompositionType::Mat3, ComponentType::F32, texel),
            "mat3(t[0].xyz, t[1].xyz, t[2].xyz)"
        );
        assert_eq!(
            decode_texels(&GlslSyntax, CompositionType::Scalar, ComponentType::I32, texel),
            "floatBitsToInt(t[0].x)"
        );
        assert_eq!(
            decode_texels(&WgslSyntax, CompositionType::Vec2, ComponentType::I32, texel),
            "bitcast<vec2<i32>>(t[0].xy)"
        );
    }

    #[test]
    fn test_base_index_per_scope() {
        let terms = IndexTerms {
            index_type: "int",
            literal_suffix: "",
            instance: "inst",
            material_slot: "slot",
            element: "index",
        };
        let info = SemanticsInfo::new("WorldMatrix", CompositionType::Mat4, ComponentType::F32);
        let world = LayoutEntry::from_info(&info, DataScope::Instance, 8);
        assert_eq!(base_index(&world, &terms), "8 + inst * 4");

        let info = SemanticsInfo::new("Cutoff", CompositionType::Scalar, ComponentType::F32).solo();
        let cutoff = LayoutEntry::from_info(&info, DataScope::Material, 40);
        assert_eq!(base_index(&cutoff, &terms), "40");

        let info = SemanticsInfo::new("BoneMatrix", CompositionType::Mat4, ComponentType::F32).array(4);
        let bones = LayoutEntry::from_info(&info, DataScope::Global, 2);
        assert_eq!(base_index(&bones, &terms), "2 + index * 4");
        let getter = arena_getter(&GlslSyntax, &bones, &terms, |i| format!("t[{i}]"));
        assert_eq!(
            getter,
            "mat4 get_BoneMatrix(int index) {\n    int base = 2 + index * 4;\n    return mat4(t[base], t[base + 1], t[base + 2], t[base + 3]);\n}"
        );
    }

    #[test]
    fn test_array_getter_takes_index() {
        let mut light = entry("LightPosition", CompositionType::Vec4, StageVisibility::Pixel);
        light.array_length = 4;
        let source = getter_definition(&WgslSyntax, &light, &[], "lights[index]");
        assert!(source.starts_with("fn get_LightPosition(index: i32) -> vec4<f32> {"));
    }
}
