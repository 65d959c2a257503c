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

//! Building and validating node graphs.

use super::error::{GraphDescriptionError, GraphValidationError};
use super::node::{InputConnection, NodeKind, ShaderNode, ShaderNodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strata_core::graph::topological_sort;
use strata_core::layout::CompositionType;
use strata_core::renderer::ShaderStage;

/// An unvalidated directed graph of shader operations.
///
/// Edges are the input connections recorded on each node. Call
/// [`ShaderGraph::validate`] to obtain a [`SortedGraph`] the resolver accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderGraph {
    nodes: BTreeMap<ShaderNodeId, ShaderNode>,
    next_id: u32,
}

impl ShaderGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id. Ids increase in insertion order.
    pub fn add_node(&mut self, kind: NodeKind, stage: ShaderStage) -> ShaderNodeId {
        let id = ShaderNodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, ShaderNode::new(id, kind, stage));
        id
    }

    fn insert_with_id(
        &mut self,
        id: ShaderNodeId,
        kind: NodeKind,
        stage: ShaderStage,
    ) -> Result<(), GraphValidationError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphValidationError::DuplicateNode { node: id });
        }
        let next = id
            .0
            .checked_add(1)
            .ok_or(GraphValidationError::IdOutOfRange { node: id })?;
        self.nodes.insert(id, ShaderNode::new(id, kind, stage));
        self.next_id = self.next_id.max(next);
        Ok(())
    }

    /// Records that `target.input` reads `source.output`.
    ///
    /// Only the target must exist at this point; everything else is checked
    /// by [`ShaderGraph::validate`].
    pub fn connect(
        &mut self,
        source: ShaderNodeId,
        output: &str,
        target: ShaderNodeId,
        input: &str,
    ) -> Result<&mut Self, GraphValidationError> {
        let node = self
            .nodes
            .get_mut(&target)
            .ok_or(GraphValidationError::UnknownNode { node: target })?;
        node.connections.push(InputConnection {
            source,
            source_output: output.to_string(),
            target_input: input.to_string(),
        });
        Ok(self)
    }

    /// Overrides the default value of an input socket.
    pub fn set_input_default(
        &mut self,
        node: ShaderNodeId,
        input: &str,
        values: &[f32],
    ) -> Result<(), GraphValidationError> {
        let target = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphValidationError::UnknownNode { node })?;
        let socket = target
            .inputs
            .iter_mut()
            .find(|s| s.name == input)
            .ok_or_else(|| GraphValidationError::UnknownSocket {
                node,
                socket: input.to_string(),
            })?;
        if values.len() != socket.composition.component_count() {
            return Err(GraphValidationError::InvalidValue {
                node,
                socket: input.to_string(),
            });
        }
        socket.default = Some(values.to_vec());
        Ok(())
    }

    /// Looks up a node.
    pub fn node(&self, id: ShaderNodeId) -> Option<&ShaderNode> {
        self.nodes.get(&id)
    }

    /// Every node, ascending by id.
    pub fn nodes(&self) -> impl Iterator<Item = &ShaderNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks the graph and orders it for emission.
    ///
    /// Independent nodes are ordered by ascending id, so the result depends
    /// only on the graph's contents.
    pub fn validate(self) -> Result<SortedGraph, GraphValidationError> {
        if self.nodes.is_empty() {
            return Err(GraphValidationError::Empty);
        }
        for node in self.nodes.values() {
            self.check_node(node)?;
        }
        for node in self.nodes.values() {
            for input in &node.inputs {
                if node.connection(&input.name).is_none() && input.default.is_none() {
                    return Err(GraphValidationError::MissingInput {
                        node: node.id,
                        input: input.name.clone(),
                    });
                }
            }
        }

        let edges: Vec<(ShaderNodeId, ShaderNodeId)> = self
            .nodes
            .values()
            .flat_map(|node| node.connections.iter().map(move |c| (c.source, node.id)))
            .collect();
        let order = match topological_sort(self.nodes.keys().copied(), edges.iter().copied()) {
            Ok(order) => order,
            Err(cycle) => {
                return Err(GraphValidationError::Cycle {
                    nodes: nodes_on_cycles(&cycle.remaining, &edges),
                })
            }
        };
        log::trace!("Sorted shader graph of {} nodes", order.len());
        Ok(SortedGraph { graph: self, order })
    }

    fn check_node(&self, node: &ShaderNode) -> Result<(), GraphValidationError> {
        if let Some(required) = node.kind.required_stage() {
            if required != node.stage {
                return Err(GraphValidationError::StageNotAllowed {
                    node: node.id,
                    kind: node.kind.label(),
                    stage: node.stage,
                });
            }
        }
        let unsupported = match &node.kind {
            NodeKind::Constant {
                composition,
                values,
            } => {
                if values.len() != composition.component_count() {
                    return Err(GraphValidationError::InvalidValue {
                        node: node.id,
                        socket: "value".to_string(),
                    });
                }
                None
            }
            NodeKind::Split { ty } | NodeKind::Merge { ty } => {
                (ty.is_matrix() || *ty == CompositionType::Scalar).then_some(*ty)
            }
            NodeKind::Dot { ty } | NodeKind::Normalize { ty } => ty.is_matrix().then_some(*ty),
            NodeKind::Transform { matrix } => (!matrix.is_matrix()).then_some(*matrix),
            _ => None,
        };
        if let Some(ty) = unsupported {
            return Err(GraphValidationError::UnsupportedType {
                node: node.id,
                kind: node.kind.label(),
                ty,
            });
        }

        let mut seen = BTreeSet::new();
        for connection in &node.connections {
            let source = self.nodes.get(&connection.source).ok_or_else(|| {
                GraphValidationError::DanglingConnection {
                    node: node.id,
                    input: connection.target_input.clone(),
                    source_node: connection.source,
                }
            })?;
            let input = node.input(&connection.target_input).ok_or_else(|| {
                GraphValidationError::UnknownSocket {
                    node: node.id,
                    socket: connection.target_input.clone(),
                }
            })?;
            let output = source.output(&connection.source_output).ok_or_else(|| {
                GraphValidationError::UnknownSocket {
                    node: source.id,
                    socket: connection.source_output.clone(),
                }
            })?;
            if !seen.insert(connection.target_input.as_str()) {
                return Err(GraphValidationError::DuplicateInput {
                    node: node.id,
                    input: connection.target_input.clone(),
                });
            }
            if !input.same_type(output) {
                return Err(GraphValidationError::SocketTypeMismatch {
                    node: node.id,
                    input: input.name.clone(),
                    source_node: source.id,
                    expected: format!("{:?}/{:?}", input.composition, input.component),
                    found: format!("{:?}/{:?}", output.composition, output.component),
                });
            }
            if node.stage == ShaderStage::Vertex && source.stage == ShaderStage::Pixel {
                return Err(GraphValidationError::StageMismatch {
                    node: node.id,
                    source_node: source.id,
                });
            }
        }
        Ok(())
    }

    /// Builds a graph from an external description and validates it.
    pub fn from_description(
        description: &GraphDescription,
    ) -> Result<SortedGraph, GraphValidationError> {
        let mut graph = ShaderGraph::new();
        for node in &description.nodes {
            let id = ShaderNodeId(node.id);
            graph.insert_with_id(id, node.kind.clone(), node.stage)?;
            for (input, values) in &node.defaults {
                graph.set_input_default(id, input, values)?;
            }
        }
        for c in &description.connections {
            graph.connect(
                ShaderNodeId(c.source),
                &c.output,
                ShaderNodeId(c.target),
                &c.input,
            )?;
        }
        graph.validate()
    }

    /// Parses a JSON [`GraphDescription`] and validates it.
    pub fn from_json(text: &str) -> Result<SortedGraph, GraphDescriptionError> {
        let description: GraphDescription = serde_json::from_str(text)?;
        Ok(Self::from_description(&description)?)
    }

    /// The graph as an external description.
    pub fn to_description(&self) -> GraphDescription {
        let mut description = GraphDescription::default();
        for node in self.nodes.values() {
            let declared = node.kind.inputs();
            let defaults = node
                .inputs
                .iter()
                .filter(|s| declared.iter().all(|d| d.name != s.name || d.default != s.default))
                .filter_map(|s| Some((s.name.clone(), s.default.clone()?)))
                .collect();
            description.nodes.push(NodeDescription {
                id: node.id.0,
                kind: node.kind.clone(),
                stage: node.stage,
                defaults,
            });
            description
                .connections
                .extend(node.connections.iter().map(|c| ConnectionDescription {
                    source: c.source.0,
                    output: c.source_output.clone(),
                    target: node.id.0,
                    input: c.target_input.clone(),
                }));
        }
        description
    }
}

/// Keeps only the nodes that can reach themselves. `remaining` also holds
/// nodes merely downstream of a cycle.
fn nodes_on_cycles(
    remaining: &[ShaderNodeId],
    edges: &[(ShaderNodeId, ShaderNodeId)],
) -> Vec<ShaderNodeId> {
    let members: BTreeSet<ShaderNodeId> = remaining.iter().copied().collect();
    let mut successors: BTreeMap<ShaderNodeId, Vec<ShaderNodeId>> = BTreeMap::new();
    for &(from, to) in edges {
        if members.contains(&from) && members.contains(&to) {
            successors.entry(from).or_default().push(to);
        }
    }
    remaining
        .iter()
        .copied()
        .filter(|&start| {
            let mut stack: Vec<ShaderNodeId> =
                successors.get(&start).cloned().unwrap_or_default();
            let mut visited = BTreeSet::new();
            while let Some(next) = stack.pop() {
                if next == start {
                    return true;
                }
                if visited.insert(next) {
                    if let Some(more) = successors.get(&next) {
                        stack.extend(more.iter().copied());
                    }
                }
            }
            false
        })
        .collect()
}

/// A validated graph with its emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedGraph {
    graph: ShaderGraph,
    order: Vec<ShaderNodeId>,
}

impl SortedGraph {
    /// The underlying graph.
    pub fn graph(&self) -> &ShaderGraph {
        &self.graph
    }

    /// Node ids in emission order.
    pub fn order(&self) -> &[ShaderNodeId] {
        &self.order
    }

    /// Nodes of `stage`, in emission order.
    pub fn stage_nodes(&self, stage: ShaderStage) -> impl Iterator<Item = &ShaderNode> {
        self.order
            .iter()
            .filter_map(|id| self.graph.node(*id))
            .filter(move |node| node.stage == stage)
    }

    /// Releases the graph for editing.
    pub fn into_graph(self) -> ShaderGraph {
        self.graph
    }
}

/// Serialized form of a graph, as supplied by model importers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Nodes with explicit ids.
    pub nodes: Vec<NodeDescription>,
    /// Edges between them.
    #[serde(default)]
    pub connections: Vec<ConnectionDescription>,
}

/// One node of a [`GraphDescription`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Node id, unique in the description.
    pub id: u32,
    /// Operation.
    pub kind: NodeKind,
    /// Stage the node runs in.
    pub stage: ShaderStage,
    /// Input default overrides.
    #[serde(default)]
    pub defaults: BTreeMap<String, Vec<f32>>,
}

/// One edge of a [`GraphDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescription {
    /// Upstream node id.
    pub source: u32,
    /// Upstream output socket.
    pub output: String,
    /// Downstream node id.
    pub target: u32,
    /// Downstream input socket.
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_data::mesh::VertexAttribute;

    fn vec4(values: [f32; 4]) -> NodeKind {
        NodeKind::Constant {
            composition: CompositionType::Vec4,
            values: values.to_vec(),
        }
    }

    fn add4() -> NodeKind {
        NodeKind::Add {
            ty: CompositionType::Vec4,
        }
    }

    #[test]
    fn test_empty_graph_rejected() {
        assert_eq!(
            ShaderGraph::new().validate().unwrap_err(),
            GraphValidationError::Empty
        );
    }

    #[test]
    fn test_order_follows_connections_then_ids() {
        let mut graph = ShaderGraph::new();
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        let add = graph.add_node(add4(), ShaderStage::Pixel);
        let a = graph.add_node(vec4([1.0; 4]), ShaderStage::Pixel);
        let b = graph.add_node(vec4([0.5; 4]), ShaderStage::Pixel);
        graph.connect(b, "value", add, "b").unwrap();
        graph.connect(a, "value", add, "a").unwrap();
        graph.connect(add, "result", out, "color").unwrap();
        let sorted = graph.validate().unwrap();
        assert_eq!(sorted.order(), &[a, b, add, out]);
    }

    #[test]
    fn test_cycle_names_nodes_on_the_cycle() {
        let mut graph = ShaderGraph::new();
        let a = graph.add_node(add4(), ShaderStage::Pixel);
        let b = graph.add_node(add4(), ShaderStage::Pixel);
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        let c = graph.add_node(vec4([0.0; 4]), ShaderStage::Pixel);
        graph.connect(b, "result", a, "a").unwrap();
        graph.connect(c, "value", a, "b").unwrap();
        graph.connect(a, "result", b, "a").unwrap();
        graph.connect(c, "value", b, "b").unwrap();
        graph.connect(b, "result", out, "color").unwrap();
        let err = graph.validate().unwrap_err();
        assert_eq!(err, GraphValidationError::Cycle { nodes: vec![a, b] });
        assert!(err.nodes().contains(&a));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = ShaderGraph::new();
        let a = graph.add_node(add4(), ShaderStage::Pixel);
        graph.connect(a, "result", a, "a").unwrap();
        graph.set_input_default(a, "b", &[0.0; 4]).unwrap();
        assert_eq!(
            graph.validate().unwrap_err(),
            GraphValidationError::Cycle { nodes: vec![a] }
        );
    }

    #[test]
    fn test_unconnected_input_without_default() {
        let mut graph = ShaderGraph::new();
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        assert_eq!(
            graph.validate().unwrap_err(),
            GraphValidationError::MissingInput {
                node: out,
                input: "color".to_string()
            }
        );
    }

    #[test]
    fn test_default_satisfies_input() {
        let mut graph = ShaderGraph::new();
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.set_input_default(out, "color", &[1.0, 0.0, 0.0, 1.0]).unwrap();
        assert!(graph.clone().validate().is_ok());
        assert!(matches!(
            graph.set_input_default(out, "color", &[1.0]),
            Err(GraphValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_type_and_stage_checks() {
        let mut graph = ShaderGraph::new();
        let uv = graph.add_node(
            NodeKind::Attribute {
                attribute: VertexAttribute::Texcoord0,
            },
            ShaderStage::Vertex,
        );
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(uv, "value", out, "color").unwrap();
        assert!(matches!(
            graph.validate().unwrap_err(),
            GraphValidationError::SocketTypeMismatch { source_node, .. } if source_node == uv
        ));

        let mut graph = ShaderGraph::new();
        let color = graph.add_node(vec4([1.0; 4]), ShaderStage::Pixel);
        let out = graph.add_node(NodeKind::OutPosition, ShaderStage::Vertex);
        graph.connect(color, "value", out, "position").unwrap();
        assert_eq!(
            graph.validate().unwrap_err(),
            GraphValidationError::StageMismatch {
                node: out,
                source_node: color
            }
        );

        let mut graph = ShaderGraph::new();
        let bad = graph.add_node(NodeKind::OutColor, ShaderStage::Vertex);
        assert!(matches!(
            graph.validate().unwrap_err(),
            GraphValidationError::StageNotAllowed { node, .. } if node == bad
        ));
    }

    #[test]
    fn test_operand_types_checked() {
        let mut graph = ShaderGraph::new();
        let split = graph.add_node(
            NodeKind::Split {
                ty: CompositionType::Mat4,
            },
            ShaderStage::Vertex,
        );
        graph.set_input_default(split, "value", &[0.0; 16]).unwrap();
        assert!(matches!(
            graph.validate().unwrap_err(),
            GraphValidationError::UnsupportedType { ty: CompositionType::Mat4, .. }
        ));
    }

    #[test]
    fn test_dangling_and_duplicate_connections() {
        let mut graph = ShaderGraph::new();
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(ShaderNodeId(42), "value", out, "color").unwrap();
        assert!(matches!(
            graph.validate().unwrap_err(),
            GraphValidationError::DanglingConnection { source_node: ShaderNodeId(42), .. }
        ));

        let mut graph = ShaderGraph::new();
        let c = graph.add_node(vec4([1.0; 4]), ShaderStage::Pixel);
        let out = graph.add_node(NodeKind::OutColor, ShaderStage::Pixel);
        graph.connect(c, "value", out, "color").unwrap();
        graph.connect(c, "value", out, "color").unwrap();
        assert!(matches!(
            graph.clone().validate().unwrap_err(),
            GraphValidationError::DuplicateInput { .. }
        ));
        assert!(graph.connect(c, "value", ShaderNodeId(9), "x").is_err());
    }

    #[test]
    fn test_from_json_description() {
        let json = r#"{
            "nodes": [
                {"id": 0, "kind": {"type": "OutColor"}, "stage": "Pixel"},
                {"id": 1, "kind": {"type": "UniformData", "semantic": "BaseColorFactor", "composition": "Vec4"}, "stage": "Pixel"}
            ],
            "connections": [{"source": 1, "output": "value", "target": 0, "input": "color"}]
        }"#;
        let sorted = ShaderGraph::from_json(json).unwrap();
        assert_eq!(sorted.order(), &[ShaderNodeId(1), ShaderNodeId(0)]);

        let again = ShaderGraph::from_description(&sorted.graph().to_description()).unwrap();
        assert_eq!(again.order(), sorted.order());

        let duplicate = r#"{"nodes": [
            {"id": 3, "kind": {"type": "OutColor"}, "stage": "Pixel"},
            {"id": 3, "kind": {"type": "OutColor"}, "stage": "Pixel"}
        ]}"#;
        assert!(matches!(
            ShaderGraph::from_json(duplicate),
            Err(GraphDescriptionError::Graph(GraphValidationError::DuplicateNode { .. }))
        ));
        assert!(matches!(
            ShaderGraph::from_json("{"),
            Err(GraphDescriptionError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_last_node_id() {
        let json = r#"{"nodes": [
            {"id": 4294967295, "kind": {"type": "OutColor"}, "stage": "Pixel"}
        ]}"#;
        let err = ShaderGraph::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            GraphDescriptionError::Graph(GraphValidationError::IdOutOfRange {
                node: ShaderNodeId(u32::MAX)
            })
        ));
    }
}
