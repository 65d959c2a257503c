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

//! Limits and features reported by the active graphics backend.

use super::api::ShaderLanguage;
use serde::{Deserialize, Serialize};

/// What the active device can do. Strategy selection is driven entirely by
/// these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    /// Human-readable backend name.
    pub backend_name: String,
    /// Language the device compiles.
    pub shading_language: ShaderLanguage,
    /// Whether read-only storage buffers can be bound.
    pub supports_storage_buffers: bool,
    /// Largest storage buffer binding, in bytes.
    pub max_storage_buffer_binding_size: u64,
    /// Whether RGBA32F textures can be sampled with `texelFetch`.
    pub supports_float_textures: bool,
    /// Largest texture edge, in texels.
    pub max_texture_size: u32,
    /// Number of vec4 uniform slots available to the vertex stage.
    pub max_vertex_uniform_vectors: u32,
    /// Number of vec4 uniform slots available to the pixel stage.
    pub max_fragment_uniform_vectors: u32,
}

impl DeviceCapabilities {
    /// A classic GLSL ES backend with float textures (WebGL 2 class).
    pub fn glsl_es3() -> Self {
        Self {
            backend_name: "glsl-es3".to_string(),
            shading_language: ShaderLanguage::Glsl,
            supports_storage_buffers: false,
            max_storage_buffer_binding_size: 0,
            supports_float_textures: true,
            max_texture_size: 4096,
            max_vertex_uniform_vectors: 256,
            max_fragment_uniform_vectors: 224,
        }
    }

    /// A modern WGSL backend with storage buffers (WebGPU class).
    pub fn wgsl() -> Self {
        Self {
            backend_name: "wgsl".to_string(),
            shading_language: ShaderLanguage::Wgsl,
            supports_storage_buffers: true,
            max_storage_buffer_binding_size: 128 << 20,
            supports_float_textures: true,
            max_texture_size: 8192,
            max_vertex_uniform_vectors: 4096,
            max_fragment_uniform_vectors: 4096,
        }
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self::glsl_es3()
    }
}
