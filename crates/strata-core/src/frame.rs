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

//! Per-frame inputs supplied by the scene collaborators.

use serde::{Deserialize, Serialize};

/// Monotonic update counters published by the scene-graph framework.
///
/// Each counter is bumped by its owner on every logical change and is used
/// purely as a dirty flag by the binding strategies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateCounts {
    /// Bumped whenever any entity transform changes.
    pub transforms: u64,
    /// Bumped whenever the scene hierarchy changes.
    pub scene_graph: u64,
    /// Bumped whenever any camera parameter changes.
    pub camera: u64,
    /// Bumped whenever a camera controller moves its camera.
    pub camera_controller: u64,
}

/// Identifies one displayed frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTick {
    /// Zero-based frame counter.
    pub index: u64,
    /// Seconds elapsed since the engine started.
    pub elapsed_seconds: f32,
}

impl FrameTick {
    /// Creates a tick for frame `index`.
    pub const fn new(index: u64, elapsed_seconds: f32) -> Self {
        Self {
            index,
            elapsed_seconds,
        }
    }
}
