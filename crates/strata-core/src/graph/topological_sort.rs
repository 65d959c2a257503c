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

//! A stable implementation of Kahn's algorithm for topological sorting.
//!
//! Whenever several nodes are ready at the same time, the smallest one (by
//! `Ord`) is emitted first. For graphs whose nodes are creation-ordered ids
//! this makes the output a pure function of the graph, independent of the
//! order nodes and edges were supplied in.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::hash::Hash;

/// An error indicating that a cycle was detected in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<T> {
    /// Nodes that could not be ordered, ascending. Every cycle of the graph
    /// lies within this set, along with any node downstream of a cycle.
    pub remaining: Vec<T>,
}

impl<T: fmt::Debug> fmt::Display for CycleError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cycle detected among nodes {:?}", self.remaining)
    }
}

impl<T: fmt::Debug> std::error::Error for CycleError<T> {}

/// Performs a stable topological sort on a generic directed graph.
///
/// The graph is defined by a collection of nodes and a set of directed edges
/// representing dependencies (from parent to child). Edges that reference a
/// node absent from `nodes` are ignored.
///
/// # Type Parameters
///
/// * `T`: The type of the nodes in the graph. It must be hashable and ordered;
///   the ordering breaks ties between independent nodes.
///
/// # Returns
///
/// * `Ok(Vec<T>)`: A vector of nodes in a valid topological order.
/// * `Err(CycleError)`: If the graph contains one or more cycles.
pub fn topological_sort<T>(
    nodes: impl IntoIterator<Item = T>,
    edges: impl IntoIterator<Item = (T, T)>,
) -> Result<Vec<T>, CycleError<T>>
where
    T: Copy + Eq + Hash + Ord,
{
    let node_list: Vec<T> = nodes.into_iter().collect();
    if node_list.is_empty() {
        return Ok(Vec::new());
    }

    let mut adjacency_list: HashMap<T, Vec<T>> = HashMap::new();
    let mut in_degree: HashMap<T, usize> = node_list.iter().map(|id| (*id, 0)).collect();

    // 1. Build adjacency list and in-degree counts from edges.
    for (parent, child) in edges {
        if !in_degree.contains_key(&parent) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(&child) {
            *degree += 1;
            adjacency_list.entry(parent).or_default().push(child);
        }
    }

    // 2. Seed the ready set with every root node (in-degree of 0).
    let mut ready: BinaryHeap<Reverse<T>> = node_list
        .iter()
        .filter(|node| in_degree.get(node).copied() == Some(0))
        .map(|node| Reverse(*node))
        .collect();

    // 3. Always emit the smallest ready node.
    let mut sorted_list = Vec::with_capacity(node_list.len());
    while let Some(Reverse(parent_node)) = ready.pop() {
        sorted_list.push(parent_node);
        if let Some(children) = adjacency_list.get(&parent_node) {
            for &child_node in children {
                if let Some(degree) = in_degree.get_mut(&child_node) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(child_node));
                    }
                }
            }
        }
    }

    // 4. Whatever still has incoming edges sits on or behind a cycle.
    if sorted_list.len() != in_degree.len() {
        let mut remaining: Vec<T> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(node, _)| node)
            .collect();
        remaining.sort();
        Err(CycleError { remaining })
    } else {
        Ok(sorted_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_chain() {
        let sorted = topological_sort([3, 1, 2], [(1, 2), (2, 3)]).unwrap();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn test_independent_nodes_sorted_by_id() {
        let sorted = topological_sort([5, 2, 9, 1], []).unwrap();
        assert_eq!(sorted, vec![1, 2, 5, 9]);
    }

    #[test]
    fn test_ties_broken_by_id_regardless_of_input_order() {
        // 0 feeds both 4 and 2; 2 and 4 become ready together.
        let a = topological_sort([0, 2, 4], [(0, 4), (0, 2)]).unwrap();
        let b = topological_sort([4, 2, 0], [(0, 2), (0, 4)]).unwrap();
        assert_eq!(a, vec![0, 2, 4]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cycle_reports_remaining_nodes() {
        let err = topological_sort([1, 2, 3, 4], [(1, 2), (2, 3), (3, 2), (3, 4)]).unwrap_err();
        assert_eq!(err.remaining, vec![2, 3, 4]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let err = topological_sort([7], [(7, 7)]).unwrap_err();
        assert_eq!(err.remaining, vec![7]);
    }

    #[test]
    fn test_empty_graph() {
        let sorted: Vec<u32> = topological_sort(Vec::<u32>::new(), []).unwrap();
        assert!(sorted.is_empty());
    }
}
