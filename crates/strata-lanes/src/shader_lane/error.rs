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

use super::node::ShaderNodeId;
use strata_core::layout::CompositionType;
use strata_core::renderer::ShaderStage;
use thiserror::Error;

/// Why a node graph cannot be compiled. No source is ever produced for a
/// graph that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphValidationError {
    /// The graph has no nodes.
    #[error("Shader graph is empty")]
    Empty,
    /// A node was placed in a stage its kind cannot run in.
    #[error("Node {node} ({kind}) cannot run in the {stage} stage")]
    StageNotAllowed {
        /// Offending node.
        node: ShaderNodeId,
        /// Kind label.
        kind: &'static str,
        /// Stage it was placed in.
        stage: ShaderStage,
    },
    /// An operation names a node the graph does not contain.
    #[error("Unknown node {node}")]
    UnknownNode {
        /// Missing id.
        node: ShaderNodeId,
    },
    /// A literal or default value has the wrong number of components.
    #[error("Node {node} socket '{socket}' has a value of the wrong length")]
    InvalidValue {
        /// Offending node.
        node: ShaderNodeId,
        /// Socket the value belongs to.
        socket: String,
    },
    /// A node kind was given an operand type it cannot operate on.
    #[error("Node {node} ({kind}) does not support {ty:?}")]
    UnsupportedType {
        /// Offending node.
        node: ShaderNodeId,
        /// Kind label.
        kind: &'static str,
        /// Rejected type.
        ty: CompositionType,
    },
    /// A node reads a semantic the active data layout does not deliver to
    /// its stage.
    #[error("Node {node} reads '{semantic}', which is not available in the {stage} stage")]
    UnknownSemantic {
        /// Offending node.
        node: ShaderNodeId,
        /// Semantic name.
        semantic: String,
        /// Stage of the node.
        stage: ShaderStage,
    },
    /// A node reads a semantic with the wrong shape or indexing.
    #[error("Node {node} reads '{semantic}' with the wrong type or index")]
    SemanticMismatch {
        /// Offending node.
        node: ShaderNodeId,
        /// Semantic name.
        semantic: String,
    },
    /// A connection references a node that does not exist.
    #[error("Node {node} has input '{input}' connected to missing node {source_node}")]
    DanglingConnection {
        /// Node owning the connection.
        node: ShaderNodeId,
        /// Input socket of the connection.
        input: String,
        /// Referenced node.
        source_node: ShaderNodeId,
    },
    /// A connection names a socket the node does not declare.
    #[error("Node {node} has no socket named '{socket}'")]
    UnknownSocket {
        /// Node lacking the socket.
        node: ShaderNodeId,
        /// Missing socket name.
        socket: String,
    },
    /// Two connections feed the same input.
    #[error("Node {node} has input '{input}' connected more than once")]
    DuplicateInput {
        /// Offending node.
        node: ShaderNodeId,
        /// Input connected twice.
        input: String,
    },
    /// The output and input types of a connection differ.
    #[error("Node {node} input '{input}' expects {expected} but {source_node} produces {found}")]
    SocketTypeMismatch {
        /// Node owning the input.
        node: ShaderNodeId,
        /// Input socket.
        input: String,
        /// Upstream node.
        source_node: ShaderNodeId,
        /// Shape the input declares.
        expected: String,
        /// Shape the output declares.
        found: String,
    },
    /// A vertex node reads the output of a pixel node.
    #[error("Vertex node {node} cannot read pixel node {source_node}")]
    StageMismatch {
        /// Vertex-stage node.
        node: ShaderNodeId,
        /// Pixel-stage node it reads from.
        source_node: ShaderNodeId,
    },
    /// An input is neither connected nor defaulted.
    #[error("Node {node} input '{input}' is unconnected and has no default")]
    MissingInput {
        /// Offending node.
        node: ShaderNodeId,
        /// Unresolved input.
        input: String,
    },
    /// Two nodes share an id.
    #[error("Duplicate node id {node}")]
    DuplicateNode {
        /// Repeated id.
        node: ShaderNodeId,
    },
    /// A described node id leaves no room for ids of later nodes.
    #[error("Node id {node} is out of range")]
    IdOutOfRange {
        /// Rejected id.
        node: ShaderNodeId,
    },
    /// Nodes that are, transitively, their own input.
    #[error("Cycle detected through nodes {nodes:?}")]
    Cycle {
        /// Every node lying on a cycle, ascending.
        nodes: Vec<ShaderNodeId>,
    },
}

impl GraphValidationError {
    /// Node ids the error points at.
    pub fn nodes(&self) -> Vec<ShaderNodeId> {
        match self {
            GraphValidationError::Empty => Vec::new(),
            GraphValidationError::Cycle { nodes } => nodes.clone(),
            GraphValidationError::DanglingConnection { node, .. }
            | GraphValidationError::StageNotAllowed { node, .. }
            | GraphValidationError::UnknownSocket { node, .. }
            | GraphValidationError::DuplicateInput { node, .. }
            | GraphValidationError::MissingInput { node, .. }
            | GraphValidationError::DuplicateNode { node }
            | GraphValidationError::IdOutOfRange { node }
            | GraphValidationError::UnknownNode { node }
            | GraphValidationError::InvalidValue { node, .. }
            | GraphValidationError::UnsupportedType { node, .. }
            | GraphValidationError::UnknownSemantic { node, .. }
            | GraphValidationError::SemanticMismatch { node, .. } => vec![*node],
            GraphValidationError::SocketTypeMismatch {
                node, source_node, ..
            }
            | GraphValidationError::StageMismatch { node, source_node } => {
                vec![*node, *source_node]
            }
        }
    }
}

/// Failure to build a graph from an external description.
#[derive(Debug, Error)]
pub enum GraphDescriptionError {
    /// The JSON text is malformed.
    #[error("Malformed graph description: {0}")]
    Json(#[from] serde_json::Error),
    /// The described graph is invalid.
    #[error(transparent)]
    Graph(#[from] GraphValidationError),
}
