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

//! Shader languages, stages and program descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The programmable pipeline stage a value or node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Per-vertex stage.
    Vertex,
    /// Per-pixel (fragment) stage.
    Pixel,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

/// The set of stages a shader input is visible from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageVisibility {
    /// Vertex stage only.
    Vertex,
    /// Pixel stage only.
    Pixel,
    /// Both stages.
    Both,
}

impl StageVisibility {
    /// Returns `true` if `stage` can see the value.
    pub const fn includes(self, stage: ShaderStage) -> bool {
        matches!(
            (self, stage),
            (StageVisibility::Both, _)
                | (StageVisibility::Vertex, ShaderStage::Vertex)
                | (StageVisibility::Pixel, ShaderStage::Pixel)
        )
    }
}

/// Target shading language of generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderLanguage {
    /// GLSL ES 3.00.
    Glsl,
    /// WebGPU Shading Language.
    Wgsl,
}

impl fmt::Display for ShaderLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderLanguage::Glsl => f.write_str("GLSL"),
            ShaderLanguage::Wgsl => f.write_str("WGSL"),
        }
    }
}

/// The mechanism used to deliver arena data to the device.
///
/// Exactly one kind is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    /// One uniform variable per semantic, written per draw.
    Uniform,
    /// Arena contents encoded as texels of a float texture.
    DataTexture,
    /// Arena contents mirrored into read-only storage buffers.
    StorageBuffer,
}

impl StrategyKind {
    /// The shading language programs for this strategy are generated in.
    pub const fn language(self) -> ShaderLanguage {
        match self {
            StrategyKind::Uniform | StrategyKind::DataTexture => ShaderLanguage::Glsl,
            StrategyKind::StorageBuffer => ShaderLanguage::Wgsl,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Uniform => f.write_str("uniform"),
            StrategyKind::DataTexture => f.write_str("data-texture"),
            StrategyKind::StorageBuffer => f.write_str("storage-buffer"),
        }
    }
}

/// Everything a device needs to compile and link one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDescriptor {
    /// Debug label, usually `<material type>@<fingerprint>`.
    pub label: String,
    /// Language both sources are written in.
    pub language: ShaderLanguage,
    /// Vertex stage source.
    pub vertex_source: String,
    /// Pixel stage source.
    pub pixel_source: String,
}
