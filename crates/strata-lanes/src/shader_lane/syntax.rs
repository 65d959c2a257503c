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

//! The two shading-language dialects code is emitted in.
//!
//! Everything that differs between GLSL ES 3.00 and WGSL at the token level
//! lives behind [`LanguageSyntax`]; ordering and naming are shared.

use std::collections::BTreeMap;
use std::fmt::Write;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::renderer::{ShaderLanguage, ShaderStage};
use strata_data::mesh::VertexAttribute;

/// A value carried from the vertex to the pixel stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Varying {
    pub name: String,
    pub ty: String,
    pub flat: bool,
}

/// The pieces of one stage, in the order they are assembled.
#[derive(Debug, Default)]
pub(crate) struct StageProgram<'a> {
    pub defines: &'a [String],
    pub prelude: &'a str,
    pub attributes: Vec<VertexAttribute>,
    pub varyings: Vec<Varying>,
    pub textures: Vec<String>,
    pub helpers: BTreeMap<String, String>,
    pub body: Vec<String>,
}

pub(crate) trait LanguageSyntax {
    fn language(&self) -> ShaderLanguage;

    fn scalar_type(&self, component: ComponentType) -> &'static str;

    fn type_name(&self, composition: CompositionType, component: ComponentType) -> String;

    fn int_literal(&self, value: i64, component: ComponentType) -> String;

    /// `type(args...)`.
    fn construct(&self, composition: CompositionType, component: ComponentType, args: &[String]) -> String {
        format!("{}({})", self.type_name(composition, component), args.join(", "))
    }

    fn literal(&self, composition: CompositionType, component: ComponentType, values: &[f32]) -> String {
        let components: Vec<String> = values
            .iter()
            .map(|&v| {
                if component.is_integer() {
                    self.int_literal(v as i64, component)
                } else {
                    float_literal(v)
                }
            })
            .collect();
        match composition {
            CompositionType::Scalar => components.into_iter().next().unwrap_or_else(|| "0.0".into()),
            _ => self.construct(composition, component, &components),
        }
    }

    /// A single-expression function.
    fn helper(&self, name: &str, params: &[(&str, String)], ret: &str, expr: &str) -> String {
        self.function(name, params, ret, &[], expr)
    }

    fn function(
        &self,
        name: &str,
        params: &[(&str, String)],
        ret: &str,
        statements: &[String],
        result: &str,
    ) -> String;

    fn local(&self, ty: &str, name: &str, expr: &str) -> String;

    fn vertex_input(&self, attribute: VertexAttribute) -> String;

    fn varying_read(&self, name: &str) -> String;

    fn varying_write(&self, name: &str, expr: &str) -> String;

    fn position_write(&self, expr: &str) -> String;

    fn color_write(&self, expr: &str) -> String;

    fn texture_sample(&self, semantic: &str, uv: &str) -> String;

    fn assemble(&self, stage: ShaderStage, program: &StageProgram<'_>) -> String;
}

/// Shortest round-tripping decimal form, always with a `.` or exponent.
pub(crate) fn float_literal(value: f32) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        "0.0".to_string()
    }
}

/// Lower-case shape name shared by helper function names.
pub(crate) fn shape_suffix(composition: CompositionType) -> &'static str {
    match composition {
        CompositionType::Scalar => "float",
        CompositionType::Vec2 => "vec2",
        CompositionType::Vec3 => "vec3",
        CompositionType::Vec4 => "vec4",
        CompositionType::Mat2 => "mat2",
        CompositionType::Mat3 => "mat3",
        CompositionType::Mat4 => "mat4",
    }
}

pub(crate) fn syntax_for(language: ShaderLanguage) -> &'static dyn LanguageSyntax {
    match language {
        ShaderLanguage::Glsl => &GlslSyntax,
        ShaderLanguage::Wgsl => &WgslSyntax,
    }
}

fn indent(lines: &[String]) -> String {
    lines.iter().fold(String::new(), |mut out, line| {
        let _ = writeln!(out, "    {line}");
        out
    })
}

fn push_section(out: &mut String, section: &str) {
    if section.trim().is_empty() {
        return;
    }
    out.push_str(section.trim_end());
    out.push_str("\n\n");
}

pub(crate) struct GlslSyntax;

impl LanguageSyntax for GlslSyntax {
    fn language(&self) -> ShaderLanguage {
        ShaderLanguage::Glsl
    }

    fn scalar_type(&self, component: ComponentType) -> &'static str {
        match component {
            ComponentType::F32 => "float",
            ComponentType::U8 | ComponentType::U16 | ComponentType::U32 => "uint",
            ComponentType::I8 | ComponentType::I16 | ComponentType::I32 => "int",
        }
    }

    fn type_name(&self, composition: CompositionType, component: ComponentType) -> String {
        let prefix = match self.scalar_type(component) {
            "int" => "i",
            "uint" => "u",
            _ => "",
        };
        match composition {
            CompositionType::Scalar => self.scalar_type(component).to_string(),
            CompositionType::Vec2 => format!("{prefix}vec2"),
            CompositionType::Vec3 => format!("{prefix}vec3"),
            CompositionType::Vec4 => format!("{prefix}vec4"),
            CompositionType::Mat2 => "mat2".to_string(),
            CompositionType::Mat3 => "mat3".to_string(),
            CompositionType::Mat4 => "mat4".to_string(),
        }
    }

    fn int_literal(&self, value: i64, component: ComponentType) -> String {
        if self.scalar_type(component) == "uint" {
            format!("{}u", value.max(0))
        } else {
            value.to_string()
        }
    }

    fn function(
        &self,
        name: &str,
        params: &[(&str, String)],
        ret: &str,
        statements: &[String],
        result: &str,
    ) -> String {
        let params: Vec<String> = params.iter().map(|(n, ty)| format!("{ty} {n}")).collect();
        let mut body = statements.to_vec();
        body.push(format!("return {result};"));
        format!("{ret} {name}({}) {{\n{}}}", params.join(", "), indent(&body))
    }

    fn local(&self, ty: &str, name: &str, expr: &str) -> String {
        format!("{ty} {name} = {expr};")
    }

    fn vertex_input(&self, attribute: VertexAttribute) -> String {
        attribute.name().to_string()
    }

    fn varying_read(&self, name: &str) -> String {
        name.to_string()
    }

    fn varying_write(&self, name: &str, expr: &str) -> String {
        format!("{name} = {expr};")
    }

    fn position_write(&self, expr: &str) -> String {
        format!("gl_Position = {expr};")
    }

    fn color_write(&self, expr: &str) -> String {
        format!("fragColor = {expr};")
    }

    fn texture_sample(&self, semantic: &str, uv: &str) -> String {
        format!("texture(u_{semantic}, {uv})")
    }

    fn assemble(&self, stage: ShaderStage, program: &StageProgram<'_>) -> String {
        let mut out = String::from("#version 300 es\nprecision highp float;\nprecision highp int;\n\n");

        let defines: String = program
            .defines
            .iter()
            .map(|d| format!("#define {d} 1\n"))
            .collect();
        push_section(&mut out, &defines);
        push_section(&mut out, program.prelude);

        let mut interface = String::new();
        let direction = match stage {
            ShaderStage::Vertex => "out",
            ShaderStage::Pixel => "in",
        };
        if stage == ShaderStage::Vertex {
            for attribute in &program.attributes {
                let ty = self.type_name(attribute.composition(), ComponentType::F32);
                let _ = writeln!(
                    interface,
                    "layout(location = {}) in {ty} {};",
                    attribute.location(),
                    attribute.name()
                );
            }
        }
        for varying in &program.varyings {
            let flat = if varying.flat { "flat " } else { "" };
            let _ = writeln!(interface, "{flat}{direction} {} {};", varying.ty, varying.name);
        }
        if stage == ShaderStage::Pixel {
            for texture in &program.textures {
                let _ = writeln!(interface, "uniform sampler2D u_{texture};");
            }
            interface.push_str("out vec4 fragColor;\n");
        }
        push_section(&mut out, &interface);

        for helper in program.helpers.values() {
            push_section(&mut out, helper);
        }

        let _ = write!(out, "void main() {{\n{}}}\n", indent(&program.body));
        out
    }
}

pub(crate) struct WgslSyntax;

impl WgslSyntax {
    fn vertex_output_struct(&self, varyings: &[Varying]) -> String {
        let mut out = String::from("struct VertexOutput {\n    @builtin(position) clip_position: vec4<f32>,\n");
        for (location, varying) in varyings.iter().enumerate() {
            let flat = if varying.flat { " @interpolate(flat)" } else { "" };
            let _ = writeln!(
                out,
                "    @location({location}){flat} {}: {},",
                varying.name, varying.ty
            );
        }
        out.push_str("};\n");
        out
    }
}

impl LanguageSyntax for WgslSyntax {
    fn language(&self) -> ShaderLanguage {
        ShaderLanguage::Wgsl
    }

    fn scalar_type(&self, component: ComponentType) -> &'static str {
        match component {
            ComponentType::F32 => "f32",
            ComponentType::U8 | ComponentType::U16 | ComponentType::U32 => "u32",
            ComponentType::I8 | ComponentType::I16 | ComponentType::I32 => "i32",
        }
    }

    fn type_name(&self, composition: CompositionType, component: ComponentType) -> String {
        let scalar = self.scalar_type(component);
        match composition {
            CompositionType::Scalar => scalar.to_string(),
            CompositionType::Vec2 => format!("vec2<{scalar}>"),
            CompositionType::Vec3 => format!("vec3<{scalar}>"),
            CompositionType::Vec4 => format!("vec4<{scalar}>"),
            CompositionType::Mat2 => "mat2x2<f32>".to_string(),
            CompositionType::Mat3 => "mat3x3<f32>".to_string(),
            CompositionType::Mat4 => "mat4x4<f32>".to_string(),
        }
    }

    fn int_literal(&self, value: i64, component: ComponentType) -> String {
        if self.scalar_type(component) == "u32" {
            format!("{}u", value.max(0))
        } else {
            format!("{value}i")
        }
    }

    fn function(
        &self,
        name: &str,
        params: &[(&str, String)],
        ret: &str,
        statements: &[String],
        result: &str,
    ) -> String {
        let params: Vec<String> = params.iter().map(|(n, ty)| format!("{n}: {ty}")).collect();
        let mut body = statements.to_vec();
        body.push(format!("return {result};"));
        format!("fn {name}({}) -> {ret} {{\n{}}}", params.join(", "), indent(&body))
    }

    fn local(&self, ty: &str, name: &str, expr: &str) -> String {
        format!("let {name}: {ty} = {expr};")
    }

    fn vertex_input(&self, attribute: VertexAttribute) -> String {
        format!("input.{}", attribute.name())
    }

    fn varying_read(&self, name: &str) -> String {
        format!("input.{name}")
    }

    fn varying_write(&self, name: &str, expr: &str) -> String {
        format!("output.{name} = {expr};")
    }

    fn position_write(&self, expr: &str) -> String {
        format!("output.clip_position = {expr};")
    }

    fn color_write(&self, expr: &str) -> String {
        format!("output_color = {expr};")
    }

    fn texture_sample(&self, semantic: &str, uv: &str) -> String {
        format!("textureSample(t_{semantic}, s_{semantic}, {uv})")
    }

    fn assemble(&self, stage: ShaderStage, program: &StageProgram<'_>) -> String {
        let mut out = String::new();
        let defines: String = program
            .defines
            .iter()
            .map(|d| format!("const {d}: bool = true;\n"))
            .collect();
        push_section(&mut out, &defines);
        push_section(&mut out, program.prelude);

        let mut interface = String::new();
        if stage == ShaderStage::Vertex && !program.attributes.is_empty() {
            interface.push_str("struct VertexInput {\n");
            for attribute in &program.attributes {
                let _ = writeln!(
                    interface,
                    "    @location({}) {}: {},",
                    attribute.location(),
                    attribute.name(),
                    self.type_name(attribute.composition(), ComponentType::F32)
                );
            }
            interface.push_str("};\n\n");
        }
        interface.push_str(&self.vertex_output_struct(&program.varyings));
        if stage == ShaderStage::Pixel {
            for (i, texture) in program.textures.iter().enumerate() {
                let _ = write!(
                    interface,
                    "\n@group(1) @binding({}) var t_{texture}: texture_2d<f32>;\n@group(1) @binding({}) var s_{texture}: sampler;\n",
                    2 * i,
                    2 * i + 1
                );
            }
        }
        push_section(&mut out, &interface);

        for helper in program.helpers.values() {
            push_section(&mut out, helper);
        }

        match stage {
            ShaderStage::Vertex => {
                let input = if program.attributes.is_empty() {
                    ""
                } else {
                    "input: VertexInput"
                };
                let mut body = vec!["var output: VertexOutput;".to_string()];
                body.extend(program.body.iter().cloned());
                body.push("return output;".to_string());
                let _ = write!(
                    out,
                    "@vertex\nfn vs_main({input}) -> VertexOutput {{\n{}}}\n",
                    indent(&body)
                );
            }
            ShaderStage::Pixel => {
                let mut body =
                    vec!["var output_color: vec4<f32> = vec4<f32>(0.0, 0.0, 0.0, 1.0);".to_string()];
                body.extend(program.body.iter().cloned());
                body.push("return output_color;".to_string());
                let _ = write!(
                    out,
                    "@fragment\nfn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {{\n{}}}\n",
                    indent(&body)
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(GlslSyntax.type_name(CompositionType::Vec3, ComponentType::I32), "ivec3");
        assert_eq!(WgslSyntax.type_name(CompositionType::Mat4, ComponentType::F32), "mat4x4<f32>");
        assert_eq!(WgslSyntax.type_name(CompositionType::Vec2, ComponentType::U32), "vec2<u32>");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            GlslSyntax.literal(CompositionType::Vec2, ComponentType::F32, &[1.0, 0.25]),
            "vec2(1.0, 0.25)"
        );
        assert_eq!(
            WgslSyntax.literal(CompositionType::Scalar, ComponentType::I32, &[3.0]),
            "3i"
        );
        assert_eq!(float_literal(f32::NAN), "0.0");
    }

    #[test]
    fn test_functions() {
        let params = [("a", "vec3".to_string()), ("b", "vec3".to_string())];
        assert_eq!(
            GlslSyntax.helper("add_vec3", &params, "vec3", "a + b"),
            "vec3 add_vec3(vec3 a, vec3 b) {\n    return a + b;\n}"
        );
        let params = [("a", "f32".to_string())];
        assert_eq!(
            WgslSyntax.helper("neg", &params, "f32", "-a"),
            "fn neg(a: f32) -> f32 {\n    return -a;\n}"
        );
    }
}
