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

//! # Strata Lanes
//!
//! The hot paths of the GPU data core:
//!
//! - [`shader_lane`] turns a node graph into complete shader programs in GLSL
//!   ES 3.00 or WGSL.
//! - [`binding_lane`] holds the three binding strategies that move arena data
//!   to the device, each deciding from version counters whether an upload is
//!   needed this frame.

#![warn(missing_docs)]

pub mod binding_lane;
pub mod shader_lane;

pub use binding_lane::{
    ActiveStrategy, BindingStrategy, DataSource, DataTextureStrategy, DrawItem, PrerenderReport,
    RenderReport, ShaderPrelude, StorageBufferStrategy, StrategyContext, StrategyError,
    UniformStrategy, VersionTracker,
};
pub use shader_lane::{
    CompiledShader, GraphDescription, GraphDescriptionError, GraphValidationError, NodeKind,
    ResolveOptions, ShaderGraph, ShaderGraphResolver, ShaderNode, ShaderNodeId, Socket,
    SortedGraph,
};
