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

//! Per-kind code templates.
//!
//! Each node kind turns its input expressions into output expressions, an
//! optional helper function, and an optional sink statement. This is the only
//! place that knows what a kind computes.

use super::node::NodeKind;
use super::syntax::{shape_suffix, LanguageSyntax};
use strata_core::layout::{ComponentType, CompositionType};

/// Code produced for one node.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct NodeCode {
    /// `(name, definition)` of a helper function the expressions call.
    pub helper: Option<(String, String)>,
    /// One expression per output socket, in declaration order.
    pub outputs: Vec<String>,
    /// A statement with side effects on the stage's outputs.
    pub statement: Option<String>,
}

impl NodeCode {
    fn value(expr: String) -> Self {
        Self {
            outputs: vec![expr],
            ..Self::default()
        }
    }
}

fn binary_helper(
    syntax: &dyn LanguageSyntax,
    op: &str,
    operands: CompositionType,
    ret: CompositionType,
    body: &str,
    inputs: &[String],
) -> NodeCode {
    let name = format!("{op}_{}", shape_suffix(operands));
    let ty = syntax.type_name(operands, ComponentType::F32);
    let definition = syntax.helper(
        &name,
        &[("a", ty.clone()), ("b", ty)],
        &syntax.type_name(ret, ComponentType::F32),
        body,
    );
    NodeCode {
        outputs: vec![format!("{name}({}, {})", inputs[0], inputs[1])],
        helper: Some((name, definition)),
        statement: None,
    }
}

/// Expands `kind` given one expression per declared input.
pub(crate) fn node_code(kind: &NodeKind, syntax: &dyn LanguageSyntax, inputs: &[String]) -> NodeCode {
    match kind {
        NodeKind::Constant {
            composition,
            values,
        } => NodeCode::value(syntax.literal(*composition, ComponentType::F32, values)),
        NodeKind::Attribute { attribute } => NodeCode::value(syntax.vertex_input(*attribute)),
        NodeKind::UniformData {
            semantic, index, ..
        } => NodeCode::value(match index {
            Some(i) => format!("get_{semantic}({i})"),
            None => format!("get_{semantic}()"),
        }),
        NodeKind::Add { ty } => binary_helper(syntax, "add", *ty, *ty, "a + b", inputs),
        NodeKind::Subtract { ty } => binary_helper(syntax, "subtract", *ty, *ty, "a - b", inputs),
        NodeKind::Multiply { ty } => binary_helper(syntax, "multiply", *ty, *ty, "a * b", inputs),
        NodeKind::Dot { ty } => {
            let body = if *ty == CompositionType::Scalar {
                "a * b"
            } else {
                "dot(a, b)"
            };
            binary_helper(syntax, "dot", *ty, CompositionType::Scalar, body, inputs)
        }
        NodeKind::Normalize { ty } => {
            let name = format!("normalize_{}", shape_suffix(*ty));
            let type_name = syntax.type_name(*ty, ComponentType::F32);
            let body = if *ty == CompositionType::Scalar {
                "sign(value)"
            } else {
                "normalize(value)"
            };
            let definition = syntax.helper(&name, &[("value", type_name.clone())], &type_name, body);
            NodeCode {
                outputs: vec![format!("{name}({})", inputs[0])],
                helper: Some((name, definition)),
                statement: None,
            }
        }
        NodeKind::Transform { matrix } => {
            let vector = CompositionType::vector_of(matrix.column_length())
                .unwrap_or(CompositionType::Vec4);
            let name = format!("transform_{}", shape_suffix(*matrix));
            let vector_ty = syntax.type_name(vector, ComponentType::F32);
            let definition = syntax.helper(
                &name,
                &[
                    ("matrix", syntax.type_name(*matrix, ComponentType::F32)),
                    ("vector", vector_ty.clone()),
                ],
                &vector_ty,
                "matrix * vector",
            );
            NodeCode {
                outputs: vec![format!("{name}({}, {})", inputs[0], inputs[1])],
                helper: Some((name, definition)),
                statement: None,
            }
        }
        NodeKind::Split { ty } => NodeCode {
            outputs: ["x", "y", "z", "w"][..ty.component_count().min(4)]
                .iter()
                .map(|c| format!("{}.{c}", inputs[0]))
                .collect(),
            ..NodeCode::default()
        },
        NodeKind::Merge { ty } => {
            NodeCode::value(syntax.construct(*ty, ComponentType::F32, inputs))
        }
        NodeKind::Vec3ToVec4 => {
            NodeCode::value(syntax.construct(CompositionType::Vec4, ComponentType::F32, inputs))
        }
        NodeKind::TextureSample { semantic } => {
            NodeCode::value(syntax.texture_sample(semantic, &inputs[0]))
        }
        NodeKind::OutPosition => NodeCode {
            statement: Some(syntax.position_write(&inputs[0])),
            ..NodeCode::default()
        },
        NodeKind::OutColor => NodeCode {
            statement: Some(syntax.color_write(&inputs[0])),
            ..NodeCode::default()
        },
    }
}
