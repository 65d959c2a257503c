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

//! Typed shader operations and their sockets.

use serde::{Deserialize, Serialize};
use std::fmt;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::renderer::ShaderStage;
use strata_data::mesh::VertexAttribute;

/// Stable id of a node inside one graph. Ids are handed out in creation
/// order and break ties when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderNodeId(pub u32);

impl fmt::Display for ShaderNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A typed input or output of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    /// Name, unique among the node's inputs (or outputs).
    pub name: String,
    /// Shape of the value.
    pub composition: CompositionType,
    /// Encoding of each component.
    pub component: ComponentType,
    /// Value used when an input is left unconnected.
    pub default: Option<Vec<f32>>,
}

impl Socket {
    /// A float socket without default.
    pub fn float(name: &str, composition: CompositionType) -> Self {
        Self {
            name: name.to_string(),
            composition,
            component: ComponentType::F32,
            default: None,
        }
    }

    /// Sets the default value.
    pub fn with_default(mut self, values: &[f32]) -> Self {
        self.default = Some(values.to_vec());
        self
    }

    /// Whether values flow between the two sockets unchanged.
    pub fn same_type(&self, other: &Socket) -> bool {
        self.composition == other.composition && self.component == other.component
    }
}

/// An edge feeding `target_input` of the owning node from `source_output` of
/// node `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConnection {
    /// The upstream node.
    pub source: ShaderNodeId,
    /// Output socket of the upstream node.
    pub source_output: String,
    /// Input socket of the owning node.
    pub target_input: String,
}

/// The operation a node performs.
///
/// The set is closed: every kind has a code template for each supported
/// shading language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// A literal value.
    Constant {
        /// Shape of the literal.
        composition: CompositionType,
        /// Components, column-major for matrices.
        values: Vec<f32>,
    },
    /// A per-vertex input stream.
    Attribute {
        /// Which stream.
        attribute: VertexAttribute,
    },
    /// A value read through the active strategy's `get_<Semantic>` accessor.
    UniformData {
        /// Semantic name.
        semantic: String,
        /// Shape of the value.
        composition: CompositionType,
        /// Encoding of each component.
        #[serde(default = "float_component")]
        component: ComponentType,
        /// Element index for array semantics.
        #[serde(default)]
        index: Option<u32>,
    },
    /// Component-wise `a + b`.
    Add {
        /// Operand type.
        ty: CompositionType,
    },
    /// Component-wise `a - b`.
    Subtract {
        /// Operand type.
        ty: CompositionType,
    },
    /// `a * b`: component-wise for vectors, the matrix product for matrices.
    Multiply {
        /// Operand type.
        ty: CompositionType,
    },
    /// Dot product of two vectors.
    Dot {
        /// Operand type.
        ty: CompositionType,
    },
    /// Unit-length copy of a vector.
    Normalize {
        /// Operand type.
        ty: CompositionType,
    },
    /// `matrix * vector`.
    Transform {
        /// `Mat3` or `Mat4`.
        matrix: CompositionType,
    },
    /// Splits a vector into scalars `x`, `y`, `z`, `w`.
    Split {
        /// Vector type.
        ty: CompositionType,
    },
    /// Builds a vector from scalars `x`, `y`, `z`, `w`.
    Merge {
        /// Vector type.
        ty: CompositionType,
    },
    /// Extends a vec3 with a `w` component (default 1).
    Vec3ToVec4,
    /// Samples a material texture.
    TextureSample {
        /// Texture semantic name.
        semantic: String,
    },
    /// Writes the clip-space position.
    OutPosition,
    /// Writes the final pixel color.
    OutColor,
}

fn float_component() -> ComponentType {
    ComponentType::F32
}

const COMPONENT_NAMES: [&str; 4] = ["x", "y", "z", "w"];

impl NodeKind {
    /// Short name used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Constant { .. } => "Constant",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::UniformData { .. } => "UniformData",
            NodeKind::Add { .. } => "Add",
            NodeKind::Subtract { .. } => "Subtract",
            NodeKind::Multiply { .. } => "Multiply",
            NodeKind::Dot { .. } => "Dot",
            NodeKind::Normalize { .. } => "Normalize",
            NodeKind::Transform { .. } => "Transform",
            NodeKind::Split { .. } => "Split",
            NodeKind::Merge { .. } => "Merge",
            NodeKind::Vec3ToVec4 => "Vec3ToVec4",
            NodeKind::TextureSample { .. } => "TextureSample",
            NodeKind::OutPosition => "OutPosition",
            NodeKind::OutColor => "OutColor",
        }
    }

    /// The only stage the node may run in, if restricted.
    pub fn required_stage(&self) -> Option<ShaderStage> {
        match self {
            NodeKind::Attribute { .. } | NodeKind::OutPosition => Some(ShaderStage::Vertex),
            NodeKind::TextureSample { .. } | NodeKind::OutColor => Some(ShaderStage::Pixel),
            _ => None,
        }
    }

    /// Input sockets, in template argument order.
    pub fn inputs(&self) -> Vec<Socket> {
        match self {
            NodeKind::Constant { .. }
            | NodeKind::Attribute { .. }
            | NodeKind::UniformData { .. } => Vec::new(),
            NodeKind::Add { ty }
            | NodeKind::Subtract { ty }
            | NodeKind::Multiply { ty }
            | NodeKind::Dot { ty } => vec![Socket::float("a", *ty), Socket::float("b", *ty)],
            NodeKind::Normalize { ty } => vec![Socket::float("value", *ty)],
            NodeKind::Transform { matrix } => {
                let vector = CompositionType::vector_of(matrix.column_length())
                    .unwrap_or(CompositionType::Vec4);
                vec![
                    Socket::float("matrix", *matrix),
                    Socket::float("vector", vector),
                ]
            }
            NodeKind::Split { ty } => vec![Socket::float("value", *ty)],
            NodeKind::Merge { ty } => COMPONENT_NAMES[..ty.component_count().min(4)]
                .iter()
                .map(|name| Socket::float(name, CompositionType::Scalar).with_default(&[0.0]))
                .collect(),
            NodeKind::Vec3ToVec4 => vec![
                Socket::float("xyz", CompositionType::Vec3),
                Socket::float("w", CompositionType::Scalar).with_default(&[1.0]),
            ],
            NodeKind::TextureSample { .. } => vec![Socket::float("uv", CompositionType::Vec2)],
            NodeKind::OutPosition => vec![Socket::float("position", CompositionType::Vec4)],
            NodeKind::OutColor => vec![Socket::float("color", CompositionType::Vec4)],
        }
    }

    /// Output sockets, in template result order.
    pub fn outputs(&self) -> Vec<Socket> {
        match self {
            NodeKind::Constant { composition, .. } => vec![Socket::float("value", *composition)],
            NodeKind::Attribute { attribute } => {
                vec![Socket::float("value", attribute.composition())]
            }
            NodeKind::UniformData {
                composition,
                component,
                ..
            } => vec![Socket {
                component: *component,
                ..Socket::float("value", *composition)
            }],
            NodeKind::Add { ty }
            | NodeKind::Subtract { ty }
            | NodeKind::Multiply { ty }
            | NodeKind::Normalize { ty } => vec![Socket::float("result", *ty)],
            NodeKind::Dot { .. } => vec![Socket::float("result", CompositionType::Scalar)],
            NodeKind::Transform { matrix } => {
                let vector = CompositionType::vector_of(matrix.column_length())
                    .unwrap_or(CompositionType::Vec4);
                vec![Socket::float("result", vector)]
            }
            NodeKind::Split { ty } => COMPONENT_NAMES[..ty.component_count().min(4)]
                .iter()
                .map(|name| Socket::float(name, CompositionType::Scalar))
                .collect(),
            NodeKind::Merge { ty } => vec![Socket::float("value", *ty)],
            NodeKind::Vec3ToVec4 => vec![Socket::float("value", CompositionType::Vec4)],
            NodeKind::TextureSample { .. } => vec![Socket::float("color", CompositionType::Vec4)],
            NodeKind::OutPosition | NodeKind::OutColor => Vec::new(),
        }
    }
}

/// One operation in a [`ShaderGraph`](super::ShaderGraph).
///
/// Pure data: nodes never touch arena memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderNode {
    /// Stable id.
    pub id: ShaderNodeId,
    /// The operation.
    pub kind: NodeKind,
    /// Stage the node's statement is emitted in.
    pub stage: ShaderStage,
    /// Declared inputs, with per-node defaults applied.
    pub inputs: Vec<Socket>,
    /// Declared outputs.
    pub outputs: Vec<Socket>,
    /// Recorded input connections.
    pub connections: Vec<InputConnection>,
}

impl ShaderNode {
    /// Builds a node with the sockets its kind declares.
    pub fn new(id: ShaderNodeId, kind: NodeKind, stage: ShaderStage) -> Self {
        Self {
            id,
            inputs: kind.inputs(),
            outputs: kind.outputs(),
            kind,
            stage,
            connections: Vec::new(),
        }
    }

    /// The input socket called `name`.
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// The output socket called `name`.
    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// The connection feeding input `name`, if any.
    pub fn connection(&self, name: &str) -> Option<&InputConnection> {
        self.connections.iter().find(|c| c.target_input == name)
    }

    /// Local variable holding output `socket`.
    pub fn variable_name(&self, socket: &str) -> String {
        variable_name(self.id, socket)
    }
}

/// Local variable holding output `socket` of node `id`.
pub fn variable_name(id: ShaderNodeId, socket: &str) -> String {
    format!("{id}_{socket}")
}

/// Interface variable carrying output `socket` of vertex node `id` to the
/// pixel stage.
pub fn varying_name(id: ShaderNodeId, socket: &str) -> String {
    format!("v_{id}_{socket}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockets_follow_kind() {
        let node = ShaderNode::new(
            ShaderNodeId(3),
            NodeKind::Transform {
                matrix: CompositionType::Mat3,
            },
            ShaderStage::Vertex,
        );
        assert_eq!(node.input("vector").unwrap().composition, CompositionType::Vec3);
        assert_eq!(node.output("result").unwrap().composition, CompositionType::Vec3);
        assert_eq!(node.variable_name("result"), "n3_result");
        assert_eq!(varying_name(node.id, "result"), "v_n3_result");
    }

    #[test]
    fn test_split_and_merge_sockets() {
        let split = NodeKind::Split {
            ty: CompositionType::Vec3,
        };
        let names: Vec<String> = split.outputs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        let merge = NodeKind::Merge {
            ty: CompositionType::Vec2,
        };
        assert!(merge.inputs().iter().all(|s| s.default == Some(vec![0.0])));
    }

    #[test]
    fn test_stage_restrictions() {
        assert_eq!(NodeKind::OutColor.required_stage(), Some(ShaderStage::Pixel));
        assert_eq!(
            NodeKind::Attribute {
                attribute: VertexAttribute::Normal
            }
            .required_stage(),
            Some(ShaderStage::Vertex)
        );
        assert_eq!(
            NodeKind::Add {
                ty: CompositionType::Vec3
            }
            .required_stage(),
            None
        );
    }

    #[test]
    fn test_kind_from_json() {
        let kind: NodeKind = serde_json::from_str(
            r#"{"type":"UniformData","semantic":"LightPosition","composition":"Vec4","index":1}"#,
        )
        .unwrap();
        assert_eq!(
            kind,
            NodeKind::UniformData {
                semantic: "LightPosition".to_string(),
                composition: CompositionType::Vec4,
                component: ComponentType::F32,
                index: Some(1),
            }
        );
    }
}
