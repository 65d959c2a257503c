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

//! Global capacity configuration. Every arena is sized from these values once
//! at startup and never resized.

use serde::{Deserialize, Serialize};

/// Capacity limits of one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Maximum number of simultaneously live drawable entities.
    pub max_entity_count: usize,
    /// Maximum number of lights.
    pub max_light_count: usize,
    /// Maximum number of cameras rendered per frame (2 for stereo).
    pub max_camera_count: usize,
    /// Maximum number of live materials per material type.
    pub max_material_instances_per_type: usize,
    /// Maximum number of joint matrices.
    pub max_bone_count: usize,
    /// Width in texels of the data texture.
    pub data_texture_width: u32,
    /// Size of the host-only working arena.
    pub cpu_generic_bytes: usize,
    /// Size of the per-vertex device data arena.
    pub gpu_vertex_bytes: usize,
    /// Size of the per-instance device data arena.
    pub gpu_instance_bytes: usize,
    /// Size of the shared uniform-block arena.
    pub uniform_block_bytes: usize,
    /// Alignment of views in the vertex and host arenas.
    pub vertex_alignment: usize,
    /// Alignment of views in the instance and uniform-block arenas.
    pub gpu_alignment: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_entity_count: 1024,
            max_light_count: 4,
            max_camera_count: 2,
            max_material_instances_per_type: 64,
            max_bone_count: 64,
            data_texture_width: 1024,
            cpu_generic_bytes: 1 << 20,
            gpu_vertex_bytes: 8 << 20,
            gpu_instance_bytes: 1 << 20,
            uniform_block_bytes: 64 << 10,
            vertex_alignment: 4,
            gpu_alignment: 16,
        }
    }
}

impl EngineLimits {
    /// Small limits suited to tests and demos.
    pub fn small() -> Self {
        Self {
            max_entity_count: 16,
            max_light_count: 2,
            max_camera_count: 1,
            max_material_instances_per_type: 8,
            max_bone_count: 4,
            data_texture_width: 64,
            cpu_generic_bytes: 4 << 10,
            gpu_vertex_bytes: 64 << 10,
            gpu_instance_bytes: 16 << 10,
            uniform_block_bytes: 4 << 10,
            ..Self::default()
        }
    }
}
