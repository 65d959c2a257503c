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

use super::error::GraphValidationError;
use super::graph::SortedGraph;
use super::node::{varying_name, NodeKind, ShaderNode, ShaderNodeId};
use super::syntax::{syntax_for, LanguageSyntax, StageProgram, Varying};
use super::templates::node_code;
use crate::binding_lane::ShaderPrelude;
use std::collections::{BTreeMap, BTreeSet};
use strata_core::renderer::{ShaderLanguage, ShaderStage};

/// Inputs of one resolution besides the graph itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Target language.
    pub language: ShaderLanguage,
    /// Feature flags emitted as defines, already sorted.
    pub defines: &'a [String],
    /// Data-access code of the active binding strategy.
    pub prelude: &'a ShaderPrelude,
}

/// Complete source of both stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    /// Language of both sources.
    pub language: ShaderLanguage,
    /// Vertex stage source.
    pub vertex: String,
    /// Pixel stage source.
    pub pixel: String,
}

/// Turns a [`SortedGraph`] into program source.
///
/// The output is a pure function of the graph and the options: node
/// statements follow the sorted order, locals are named after node ids and
/// helpers are emitted sorted by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaderGraphResolver;

type VaryingKey = (ShaderNodeId, String);

impl ShaderGraphResolver {
    /// Emits both stages of `graph`.
    pub fn resolve(
        graph: &SortedGraph,
        options: &ResolveOptions<'_>,
    ) -> Result<CompiledShader, GraphValidationError> {
        check_semantics(graph, options.prelude)?;
        let syntax = syntax_for(options.language);

        let mut varyings: BTreeMap<VaryingKey, Varying> = BTreeMap::new();
        for node in graph.stage_nodes(ShaderStage::Pixel) {
            for connection in &node.connections {
                let Some(source) = graph.graph().node(connection.source) else {
                    continue;
                };
                if source.stage != ShaderStage::Vertex {
                    continue;
                }
                if let Some(output) = source.output(&connection.source_output) {
                    varyings.insert(
                        (source.id, output.name.clone()),
                        Varying {
                            name: varying_name(source.id, &output.name),
                            ty: syntax.type_name(output.composition, output.component),
                            flat: output.component.is_integer(),
                        },
                    );
                }
            }
        }

        let vertex = emit_stage(graph, options, syntax, ShaderStage::Vertex, &varyings)?;
        let pixel = emit_stage(graph, options, syntax, ShaderStage::Pixel, &varyings)?;
        log::debug!(
            "Resolved shader graph of {} nodes to {} ({} varyings)",
            graph.order().len(),
            options.language,
            varyings.len()
        );
        Ok(CompiledShader {
            language: options.language,
            vertex,
            pixel,
        })
    }
}

fn check_semantics(graph: &SortedGraph, prelude: &ShaderPrelude) -> Result<(), GraphValidationError> {
    for node in graph.graph().nodes() {
        let NodeKind::UniformData {
            semantic,
            composition,
            component,
            index,
        } = &node.kind
        else {
            continue;
        };
        let signature = prelude.getter(node.stage, semantic).ok_or_else(|| {
            GraphValidationError::UnknownSemantic {
                node: node.id,
                semantic: semantic.clone(),
                stage: node.stage,
            }
        })?;
        if signature.composition != *composition
            || signature.component != *component
            || signature.indexed != index.is_some()
        {
            return Err(GraphValidationError::SemanticMismatch {
                node: node.id,
                semantic: semantic.clone(),
            });
        }
    }
    Ok(())
}

fn input_expressions(
    graph: &SortedGraph,
    syntax: &dyn LanguageSyntax,
    node: &ShaderNode,
) -> Result<Vec<String>, GraphValidationError> {
    node.inputs
        .iter()
        .map(|input| match node.connection(&input.name) {
            Some(connection) => {
                let source = graph.graph().node(connection.source).ok_or_else(|| {
                    GraphValidationError::DanglingConnection {
                        node: node.id,
                        input: input.name.clone(),
                        source_node: connection.source,
                    }
                })?;
                Ok(if source.stage == node.stage {
                    source.variable_name(&connection.source_output)
                } else {
                    syntax.varying_read(&varying_name(source.id, &connection.source_output))
                })
            }
            None => input
                .default
                .as_ref()
                .map(|values| syntax.literal(input.composition, input.component, values))
                .ok_or_else(|| GraphValidationError::MissingInput {
                    node: node.id,
                    input: input.name.clone(),
                }),
        })
        .collect()
}

fn emit_stage(
    graph: &SortedGraph,
    options: &ResolveOptions<'_>,
    syntax: &dyn LanguageSyntax,
    stage: ShaderStage,
    varyings: &BTreeMap<VaryingKey, Varying>,
) -> Result<String, GraphValidationError> {
    let mut program = StageProgram {
        defines: options.defines,
        prelude: &options.prelude.stage(stage).source,
        varyings: varyings.values().cloned().collect(),
        ..StageProgram::default()
    };
    let mut attributes = BTreeSet::new();
    let mut textures = BTreeSet::new();

    for node in graph.stage_nodes(stage) {
        match &node.kind {
            NodeKind::Attribute { attribute } => {
                attributes.insert(*attribute);
            }
            NodeKind::TextureSample { semantic } => {
                textures.insert(semantic.clone());
            }
            _ => {}
        }
        let inputs = input_expressions(graph, syntax, node)?;
        let code = node_code(&node.kind, syntax, &inputs);
        if let Some((name, definition)) = code.helper {
            program.helpers.entry(name).or_insert(definition);
        }
        for (output, expr) in node.outputs.iter().zip(&code.outputs) {
            let variable = node.variable_name(&output.name);
            let ty = syntax.type_name(output.composition, output.component);
            program.body.push(syntax.local(&ty, &variable, expr));
            if stage == ShaderStage::Vertex {
                if let Some(varying) = varyings.get(&(node.id, output.name.clone())) {
                    program.body.push(syntax.varying_write(&varying.name, &variable));
                }
            }
        }
        if let Some(statement) = code.statement {
            program.body.push(statement);
        }
    }

    program.attributes = attributes.into_iter().collect();
    program.textures = textures.into_iter().collect();
    Ok(syntax.assemble(stage, &program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader_lane::ShaderGraph;
    use strata_core::layout::{ComponentType, CompositionType};
    use strata_core::renderer::StageVisibility;
    use strata_data::layout::{DataScope, LayoutEntry};
    use strata_data::mesh::VertexAttribute;
    use strata_data::semantics::SemanticsInfo;

    fn prelude() -> ShaderPrelude {
        let mut prelude = ShaderPrelude::default();
        let info = SemanticsInfo::new("BaseColorFactor", CompositionType::Vec4, ComponentType::F32)
            .stage(StageVisibility::Pixel);
        let entry = LayoutEntry::from_info(&info, DataScope::Material, 0);
        prelude.add_getter(&entry, "// get_BaseColorFactor");
        prelude
    }

    /// A(output value) -> B(input value, output result) -> C(input color).
    fn chain() -> SortedGraph {
        let mut graph = ShaderGraph::new();
        let a = graph.add_node(
            NodeKind::Constant {
                composition: CompositionType::Vec4,
                values: vec![0.0, 0.0, 2.0, 1.0],
            },
            ShaderStage::Pixel,
        );
        let b = graph.add_node(
            NodeKind::Normalize {
                ty: CompositionType::Vec4,
            },
            ShaderStage::Pixel,
        );
        let c = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(a, "value", b, "value").unwrap();
        graph.connect(b, "result", c, "color").unwrap();
        graph.validate().unwrap()
    }

    fn resolve(graph: &SortedGraph, language: ShaderLanguage, defines: &[String]) -> CompiledShader {
        let prelude = prelude();
        let options = ResolveOptions {
            language,
            defines,
            prelude: &prelude,
        };
        ShaderGraphResolver::resolve(graph, &options).unwrap()
    }

    #[test]
    fn test_chain_order_in_both_languages() {
        let graph = chain();
        for (language, b_decl, c_stmt) in [
            (ShaderLanguage::Glsl, "vec4 n1_result = normalize_vec4(n0_value);", "fragColor = n1_result;"),
            (
                ShaderLanguage::Wgsl,
                "let n1_result: vec4<f32> = normalize_vec4(n0_value);",
                "output_color = n1_result;",
            ),
        ] {
            let shader = resolve(&graph, language, &[]);
            let b_at = shader.pixel.find(b_decl).unwrap();
            let c_at = shader.pixel.find(c_stmt).unwrap();
            assert!(b_at < c_at, "{language}: B must precede C");
            assert!(!shader.pixel.contains("= n0_value;"));
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let defines = vec!["ALPHA_BLENDING".to_string()];
        let first = resolve(&chain(), ShaderLanguage::Glsl, &defines);
        let second = resolve(&chain(), ShaderLanguage::Glsl, &defines);
        assert_eq!(first, second);
        assert!(first.pixel.contains("#define ALPHA_BLENDING 1"));
        let wgsl = resolve(&chain(), ShaderLanguage::Wgsl, &defines);
        assert!(wgsl.pixel.contains("const ALPHA_BLENDING: bool = true;"));
    }

    #[test]
    fn test_varyings_cross_stages() {
        let mut graph = ShaderGraph::new();
        let normal = graph.add_node(
            NodeKind::Attribute {
                attribute: VertexAttribute::Normal,
            },
            ShaderStage::Vertex,
        );
        let to4 = graph.add_node(NodeKind::Vec3ToVec4, ShaderStage::Pixel);
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(normal, "value", to4, "xyz").unwrap();
        graph.connect(to4, "value", out, "color").unwrap();
        let sorted = graph.validate().unwrap();

        let glsl = resolve(&sorted, ShaderLanguage::Glsl, &[]);
        assert!(glsl.vertex.contains("layout(location = 1) in vec3 a_normal;"));
        assert!(glsl.vertex.contains("out vec3 v_n0_value;"));
        assert!(glsl.vertex.contains("v_n0_value = n0_value;"));
        assert!(glsl.pixel.contains("in vec3 v_n0_value;"));
        assert!(glsl.pixel.contains("vec4 n1_value = vec4(v_n0_value, 1.0);"));

        let wgsl = resolve(&sorted, ShaderLanguage::Wgsl, &[]);
        assert!(wgsl.vertex.contains("@location(1) a_normal: vec3<f32>,"));
        assert!(wgsl.vertex.contains("@location(0) v_n0_value: vec3<f32>,"));
        assert!(wgsl.vertex.contains("output.v_n0_value = n0_value;"));
        assert!(wgsl.pixel.contains("vec4<f32>(input.v_n0_value, 1.0)"));
        assert!(wgsl.pixel.contains("@fragment"));
    }

    #[test]
    fn test_textures_and_uniform_data() {
        let mut graph = ShaderGraph::new();
        let uv = graph.add_node(
            NodeKind::Attribute {
                attribute: VertexAttribute::Texcoord0,
            },
            ShaderStage::Vertex,
        );
        let sample = graph.add_node(
            NodeKind::TextureSample {
                semantic: "BaseColorTexture".to_string(),
            },
            ShaderStage::Pixel,
        );
        let factor = graph.add_node(
            NodeKind::UniformData {
                semantic: "BaseColorFactor".to_string(),
                composition: CompositionType::Vec4,
                component: ComponentType::F32,
                index: None,
            },
            ShaderStage::Pixel,
        );
        let mul = graph.add_node(
            NodeKind::Multiply {
                ty: CompositionType::Vec4,
            },
            ShaderStage::Pixel,
        );
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(uv, "value", sample, "uv").unwrap();
        graph.connect(sample, "color", mul, "a").unwrap();
        graph.connect(factor, "value", mul, "b").unwrap();
        graph.connect(mul, "result", out, "color").unwrap();
        let sorted = graph.validate().unwrap();

        let glsl = resolve(&sorted, ShaderLanguage::Glsl, &[]);
        assert!(glsl.pixel.contains("uniform sampler2D u_BaseColorTexture;"));
        assert!(glsl.pixel.contains("texture(u_BaseColorTexture, v_n0_value)"));
        assert!(glsl.pixel.contains("vec4 n2_value = get_BaseColorFactor();"));
        assert!(glsl.pixel.contains("// get_BaseColorFactor"));
        assert!(!glsl.vertex.contains("// get_BaseColorFactor"));

        let wgsl = resolve(&sorted, ShaderLanguage::Wgsl, &[]);
        assert!(wgsl.pixel.contains("@group(1) @binding(0) var t_BaseColorTexture: texture_2d<f32>;"));
        assert!(wgsl.pixel.contains("textureSample(t_BaseColorTexture, s_BaseColorTexture, input.v_n0_value)"));
    }

    #[test]
    fn test_unknown_semantic_rejected() {
        let mut graph = ShaderGraph::new();
        let time = graph.add_node(
            NodeKind::UniformData {
                semantic: "BaseColorFactor".to_string(),
                composition: CompositionType::Vec4,
                component: ComponentType::F32,
                index: None,
            },
            ShaderStage::Vertex,
        );
        let out = graph.add_node(NodeKind::OutPosition, ShaderStage::Vertex);
        graph.connect(time, "value", out, "position").unwrap();
        let sorted = graph.validate().unwrap();
        let prelude = prelude();
        let options = ResolveOptions {
            language: ShaderLanguage::Glsl,
            defines: &[],
            prelude: &prelude,
        };
        assert_eq!(
            ShaderGraphResolver::resolve(&sorted, &options).unwrap_err(),
            GraphValidationError::UnknownSemantic {
                node: time,
                semantic: "BaseColorFactor".to_string(),
                stage: ShaderStage::Vertex,
            }
        );
    }
}
