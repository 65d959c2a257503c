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

//! Node graphs and their translation into shader programs.
//!
//! A graph moves through three states: a [`ShaderGraph`] is built and edited
//! freely, [`ShaderGraph::validate`] turns it into a [`SortedGraph`], and
//! [`ShaderGraphResolver::resolve`] emits a [`CompiledShader`] in either
//! supported language. Invalid graphs never produce source.

mod error;
mod graph;
mod node;
mod resolver;
pub(crate) mod syntax;
mod templates;

pub use error::{GraphDescriptionError, GraphValidationError};
pub use graph::{
    ConnectionDescription, GraphDescription, NodeDescription, ShaderGraph, SortedGraph,
};
pub use node::{InputConnection, NodeKind, ShaderNode, ShaderNodeId, Socket};
pub use resolver::{CompiledShader, ResolveOptions, ShaderGraphResolver};
