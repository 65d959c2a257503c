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

//! Builds shader programs for materials on program cache misses.

use ahash::AHashMap;
use strata_core::renderer::{
    GraphicsDevice, ProgramDescriptor, ProgramId, ShaderError, ShaderLanguage,
};
use strata_data::material::{ProgramFactory, ProgramRequest};
use strata_data::mesh::VertexAttribute;
use strata_lanes::{
    CompiledShader, GraphDescriptionError, GraphValidationError, NodeKind, ResolveOptions,
    ShaderGraph, ShaderGraphResolver, ShaderPrelude, SortedGraph, StrategyError,
};
use thiserror::Error;

/// Why a program could not be built.
#[derive(Debug, Error)]
pub enum ProgramBuildError {
    /// No node graph is registered for the material type.
    #[error("No node graph registered for material type '{0}'")]
    UnknownMaterialType(String),
    /// The graph reads a vertex attribute the primitive does not have.
    #[error("Material type '{material_type}' reads {attribute:?}, which the primitive lacks")]
    MissingAttribute {
        /// Type whose graph reads the attribute.
        material_type: String,
        /// The missing attribute.
        attribute: VertexAttribute,
    },
    /// The graph does not resolve against the strategy's prelude.
    #[error("Graph of material type '{material_type}' is invalid: {error}")]
    Graph {
        /// Type whose graph failed.
        material_type: String,
        /// What is wrong with it.
        error: GraphValidationError,
    },
    /// The strategy cannot produce a prelude for the type.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// The device rejected the generated source.
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// A device rejection of generated source, as handed to the host.
#[derive(Debug, Clone)]
pub struct ShaderErrorReport {
    /// Program label, `<material type>@<fingerprint>`.
    pub label: String,
    /// The device's diagnostic.
    pub error: ShaderError,
    /// Source that failed to compile.
    pub shader: CompiledShader,
}

/// Receives every shader compilation failure. The engine never retries on
/// its own; the host may patch the graph and clear the material's cache.
pub type ShaderErrorCallback = Box<dyn FnMut(&ShaderErrorReport)>;

/// Node graphs by material type, plus the compile-failure hook.
#[derive(Default)]
pub struct ProgramBuilder {
    graphs: AHashMap<String, SortedGraph>,
    on_shader_error: Option<ShaderErrorCallback>,
    built: usize,
    failed: usize,
}

impl std::fmt::Debug for ProgramBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramBuilder")
            .field("graphs", &self.graphs.len())
            .field("built", &self.built)
            .field("failed", &self.failed)
            .finish()
    }
}

impl ProgramBuilder {
    /// A builder without graphs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the graph materials of `type_name` are drawn with,
    /// replacing any earlier one.
    pub fn register_graph(&mut self, type_name: impl Into<String>, graph: SortedGraph) {
        let type_name = type_name.into();
        log::debug!(
            "Registered a {}-node graph for material type '{type_name}'",
            graph.order().len()
        );
        self.graphs.insert(type_name, graph);
    }

    /// Parses and validates a JSON graph description, then registers it.
    pub fn register_graph_json(
        &mut self,
        type_name: impl Into<String>,
        json: &str,
    ) -> Result<(), GraphDescriptionError> {
        let graph = ShaderGraph::from_json(json)?;
        self.register_graph(type_name, graph);
        Ok(())
    }

    /// The graph registered for `type_name`.
    pub fn graph(&self, type_name: &str) -> Option<&SortedGraph> {
        self.graphs.get(type_name)
    }

    /// Installs the hook called on every compilation failure.
    pub fn set_shader_error_callback(&mut self, callback: ShaderErrorCallback) {
        self.on_shader_error = Some(callback);
    }

    /// Programs compiled so far.
    pub fn built(&self) -> usize {
        self.built
    }

    /// Program builds that failed so far.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Generates the source of `type_name`'s program without compiling it.
    pub fn generate(
        &self,
        type_name: &str,
        language: ShaderLanguage,
        defines: &[String],
        prelude: &ShaderPrelude,
    ) -> Result<CompiledShader, ProgramBuildError> {
        let graph = self
            .graphs
            .get(type_name)
            .ok_or_else(|| ProgramBuildError::UnknownMaterialType(type_name.to_string()))?;
        let options = ResolveOptions {
            language,
            defines,
            prelude,
        };
        ShaderGraphResolver::resolve(graph, &options).map_err(|error| ProgramBuildError::Graph {
            material_type: type_name.to_string(),
            error,
        })
    }

    /// A [`ProgramFactory`] compiling on `device` against `prelude`.
    pub fn factory<'a>(
        &'a mut self,
        device: &'a dyn GraphicsDevice,
        prelude: &'a ShaderPrelude,
        language: ShaderLanguage,
    ) -> impl ProgramFactory<Error = ProgramBuildError> + 'a {
        ProgramCompilation {
            builder: self,
            device,
            prelude,
            language,
        }
    }

    fn build(
        &mut self,
        device: &dyn GraphicsDevice,
        prelude: &ShaderPrelude,
        language: ShaderLanguage,
        request: &ProgramRequest<'_>,
    ) -> Result<ProgramId, ProgramBuildError> {
        let material = request.material;
        let type_name = material.type_name();
        let graph = self
            .graphs
            .get(type_name)
            .ok_or_else(|| ProgramBuildError::UnknownMaterialType(type_name.to_string()))?;
        for node in graph.graph().nodes() {
            if let NodeKind::Attribute { attribute } = node.kind {
                if request.primitive.attribute(attribute).is_none() {
                    return Err(ProgramBuildError::MissingAttribute {
                        material_type: type_name.to_string(),
                        attribute,
                    });
                }
            }
        }

        let shader = self.generate(type_name, language, &material.shader_definitions(), prelude)?;
        let fingerprint = material.fingerprint();
        let label = format!(
            "{type_name}@{}",
            fingerprint.get(..12).unwrap_or(fingerprint)
        );
        let descriptor = ProgramDescriptor {
            label: label.clone(),
            language,
            vertex_source: shader.vertex.clone(),
            pixel_source: shader.pixel.clone(),
        };
        match device.create_program(&descriptor) {
            Ok(id) => {
                self.built += 1;
                log::info!("Compiled program '{label}' for {}", request.strategy);
                Ok(id)
            }
            Err(error) => {
                log::error!("{error}");
                if let Some(callback) = self.on_shader_error.as_mut() {
                    callback(&ShaderErrorReport {
                        label,
                        error: error.clone(),
                        shader,
                    });
                }
                Err(error.into())
            }
        }
    }
}

struct ProgramCompilation<'a> {
    builder: &'a mut ProgramBuilder,
    device: &'a dyn GraphicsDevice,
    prelude: &'a ShaderPrelude,
    language: ShaderLanguage,
}

impl ProgramFactory for ProgramCompilation<'_> {
    type Error = ProgramBuildError;

    fn create_program(&mut self, request: &ProgramRequest<'_>) -> Result<ProgramId, ProgramBuildError> {
        let result = self
            .builder
            .build(self.device, self.prelude, self.language, request);
        if result.is_err() {
            self.builder.failed += 1;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::layout::{ComponentType, CompositionType};
    use strata_core::renderer::ShaderStage;

    const UNLIT: &str = r#"{
        "nodes": [
            { "id": 0, "kind": { "type": "Attribute", "attribute": "Position" }, "stage": "Vertex" },
            { "id": 1, "kind": { "type": "Vec3ToVec4" }, "stage": "Vertex" },
            { "id": 2, "kind": { "type": "OutPosition" }, "stage": "Vertex" },
            { "id": 3, "kind": { "type": "Constant", "composition": "Vec4", "values": [1.0, 0.5, 0.0, 1.0] }, "stage": "Pixel" },
            { "id": 4, "kind": { "type": "OutColor" }, "stage": "Pixel" }
        ],
        "connections": [
            { "source": 0, "output": "value", "target": 1, "input": "xyz" },
            { "source": 1, "output": "value", "target": 2, "input": "position" },
            { "source": 3, "output": "value", "target": 4, "input": "color" }
        ]
    }"#;

    #[test]
    fn test_generate_registered_graph() {
        let mut builder = ProgramBuilder::new();
        builder.register_graph_json("Unlit", UNLIT).unwrap();
        let shader = builder
            .generate("Unlit", ShaderLanguage::Glsl, &[], &ShaderPrelude::default())
            .unwrap();
        assert!(shader.vertex.starts_with("#version 300 es"));
        assert!(shader.pixel.contains("vec4(1.0, 0.5, 0.0, 1.0)"));
        assert!(builder.graph("Unlit").is_some());
    }

    #[test]
    fn test_unknown_type() {
        let builder = ProgramBuilder::new();
        assert!(matches!(
            builder.generate("Pbr", ShaderLanguage::Wgsl, &[], &ShaderPrelude::default()),
            Err(ProgramBuildError::UnknownMaterialType(name)) if name == "Pbr"
        ));
    }

    #[test]
    fn test_semantic_missing_from_prelude() {
        let mut graph = ShaderGraph::new();
        let factor = graph.add_node(
            NodeKind::UniformData {
                semantic: "BaseColorFactor".to_string(),
                composition: CompositionType::Vec4,
                component: ComponentType::F32,
                index: None,
            },
            ShaderStage::Pixel,
        );
        let color = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(factor, "value", color, "color").unwrap();
        let mut builder = ProgramBuilder::new();
        builder.register_graph("Flat", graph.validate().unwrap());
        assert!(matches!(
            builder.generate("Flat", ShaderLanguage::Wgsl, &[], &ShaderPrelude::default()),
            Err(ProgramBuildError::Graph {
                error: GraphValidationError::UnknownSemantic { .. },
                ..
            })
        ));
    }
}
