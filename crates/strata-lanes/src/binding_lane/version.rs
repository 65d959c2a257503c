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

//! Monotonic version counters as the only dirty signal.

use super::context::StrategyContext;
use std::collections::BTreeMap;
use strata_core::frame::UpdateCounts;
use strata_data::memory::BufferUse;

/// A producer of data a strategy uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataSource {
    /// Material parameters flushed into the instance arena.
    Materials,
    /// Entity transforms.
    Transforms,
    /// Scene hierarchy.
    SceneGraph,
    /// Camera parameters.
    Camera,
    /// Camera controllers.
    CameraController,
    /// Values written through the global data repository.
    GlobalData,
}

impl DataSource {
    /// Every source.
    pub const ALL: [DataSource; 6] = [
        DataSource::Materials,
        DataSource::Transforms,
        DataSource::SceneGraph,
        DataSource::Camera,
        DataSource::CameraController,
        DataSource::GlobalData,
    ];

    /// The arena whose contents this source writes.
    pub const fn arena(self) -> BufferUse {
        match self {
            DataSource::Materials | DataSource::Transforms | DataSource::SceneGraph => {
                BufferUse::GpuInstanceData
            }
            DataSource::Camera | DataSource::CameraController | DataSource::GlobalData => {
                BufferUse::UniformBlock
            }
        }
    }

    /// The source's current update count.
    pub fn current(self, counts: &UpdateCounts, ctx: &StrategyContext<'_>) -> u64 {
        match self {
            DataSource::Materials => ctx.materials.update_count(),
            DataSource::Transforms => counts.transforms,
            DataSource::SceneGraph => counts.scene_graph,
            DataSource::Camera => counts.camera,
            DataSource::CameraController => counts.camera_controller,
            DataSource::GlobalData => ctx.globals.update_count(),
        }
    }
}

/// Last-seen update count of every source, plus the last-encoded write
/// version of every uploaded arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTracker {
    sources: BTreeMap<DataSource, u64>,
    arenas: BTreeMap<BufferUse, u64>,
}

impl VersionTracker {
    /// A tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `current` for `source`. Returns `true` if the source was never
    /// seen or its count moved past the last-seen value.
    pub fn advance(&mut self, source: DataSource, current: u64) -> bool {
        match self.sources.get(&source) {
            Some(&last) if current <= last => false,
            _ => {
                self.sources.insert(source, current);
                true
            }
        }
    }

    /// The last recorded count of `source`.
    pub fn last_seen(&self, source: DataSource) -> Option<u64> {
        self.sources.get(&source).copied()
    }

    /// Returns `true` if `arena` was written after its last encode. Catches
    /// writes made without the matching update count being bumped.
    pub fn arena_is_stale(&self, arena: BufferUse, write_version: u64) -> bool {
        self.arenas
            .get(&arena)
            .is_none_or(|&encoded| write_version > encoded)
    }

    /// Records that `arena` was encoded at `write_version`.
    pub fn mark_encoded(&mut self, arena: BufferUse, write_version: u64) {
        self.arenas.insert(arena, write_version);
    }

    /// Forgets everything, forcing a full re-encode.
    pub fn reset(&mut self) {
        self.sources.clear();
        self.arenas.clear();
    }
}

/// Which arenas need re-encoding this frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DirtyRegions {
    pub instance: bool,
    pub global: bool,
    pub advanced: Vec<DataSource>,
}

impl DirtyRegions {
    pub fn is_dirty(&self, arena: BufferUse) -> bool {
        match arena {
            BufferUse::GpuInstanceData => self.instance,
            BufferUse::UniformBlock => self.global,
            BufferUse::CpuGeneric | BufferUse::GpuVertexData => false,
        }
    }
}

/// Advances every source and folds the result into per-arena dirty flags.
pub(crate) fn collect_dirty(
    tracker: &mut VersionTracker,
    counts: &UpdateCounts,
    ctx: &StrategyContext<'_>,
) -> DirtyRegions {
    let mut dirty = DirtyRegions::default();
    for source in DataSource::ALL {
        if tracker.advance(source, source.current(counts, ctx)) {
            dirty.advanced.push(source);
            match source.arena() {
                BufferUse::GpuInstanceData => dirty.instance = true,
                _ => dirty.global = true,
            }
        }
    }
    for (arena, flag) in [
        (BufferUse::GpuInstanceData, &mut dirty.instance),
        (BufferUse::UniformBlock, &mut dirty.global),
    ] {
        if !*flag && tracker.arena_is_stale(arena, ctx.memory.buffer(arena).write_version()) {
            log::trace!("{arena:?} arena written without a version bump, re-encoding");
            *flag = true;
        }
    }
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_only_when_count_moves_forward() {
        let mut tracker = VersionTracker::new();
        assert!(tracker.advance(DataSource::Transforms, 10));
        assert!(!tracker.advance(DataSource::Transforms, 10));
        assert!(!tracker.advance(DataSource::Transforms, 9));
        assert!(tracker.advance(DataSource::Transforms, 11));
        assert_eq!(tracker.last_seen(DataSource::Transforms), Some(11));
        assert_eq!(tracker.last_seen(DataSource::Camera), None);
    }

    #[test]
    fn test_arena_staleness() {
        let mut tracker = VersionTracker::new();
        assert!(tracker.arena_is_stale(BufferUse::UniformBlock, 0));
        tracker.mark_encoded(BufferUse::UniformBlock, 4);
        assert!(!tracker.arena_is_stale(BufferUse::UniformBlock, 4));
        assert!(tracker.arena_is_stale(BufferUse::UniformBlock, 5));
        tracker.reset();
        assert!(tracker.arena_is_stale(BufferUse::UniformBlock, 5));
    }

    #[test]
    fn test_sources_map_to_arenas() {
        assert_eq!(DataSource::Materials.arena(), BufferUse::GpuInstanceData);
        assert_eq!(DataSource::CameraController.arena(), BufferUse::UniformBlock);
    }
}
