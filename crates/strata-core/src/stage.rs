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

//! The ordered process stages every data producer and binding strategy is
//! driven through.
//!
//! Arena writes happen in the stages up to and including [`ProcessStage::Logic`];
//! strategies read and upload in [`ProcessStage::PreRender`] and draw in
//! [`ProcessStage::Render`]. Enforcing the order gives read-after-write
//! guarantees without any locking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One phase of the engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProcessStage {
    /// Component construction.
    Create,
    /// One-time resource loading (GPU buffers for newly registered meshes).
    Load,
    /// Attachment into the running scene.
    Mount,
    /// Per-frame simulation and arena writes.
    Logic,
    /// Per-frame re-encoding and upload of dirty data.
    PreRender,
    /// Per-frame draw submission.
    Render,
    /// Detachment from the running scene.
    Unmount,
    /// Final teardown.
    Discard,
}

impl ProcessStage {
    /// All stages in their canonical order.
    pub const ALL: [ProcessStage; 8] = [
        ProcessStage::Create,
        ProcessStage::Load,
        ProcessStage::Mount,
        ProcessStage::Logic,
        ProcessStage::PreRender,
        ProcessStage::Render,
        ProcessStage::Unmount,
        ProcessStage::Discard,
    ];

    /// Returns `true` if `self` may directly follow `previous`.
    ///
    /// Stages only move forward, except that a finished frame
    /// ([`ProcessStage::Render`]) may start over at [`ProcessStage::Load`] or
    /// [`ProcessStage::Logic`]. Skipping ahead within a frame is allowed.
    pub fn can_follow(self, previous: Option<ProcessStage>) -> bool {
        match previous {
            None => self == ProcessStage::Create,
            Some(ProcessStage::Discard) => false,
            Some(ProcessStage::Render) => matches!(
                self,
                ProcessStage::Load | ProcessStage::Logic | ProcessStage::Unmount
            ),
            Some(prev) => self > prev,
        }
    }
}

impl fmt::Display for ProcessStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when a stage is entered out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOrderError {
    /// The stage that was last entered, if any.
    pub current: Option<ProcessStage>,
    /// The stage that was requested.
    pub requested: ProcessStage,
}

impl fmt::Display for StageOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            Some(current) => write!(
                f,
                "Cannot enter stage {} after stage {}",
                self.requested, current
            ),
            None => write!(
                f,
                "Cannot enter stage {} before stage Create",
                self.requested
            ),
        }
    }
}

impl std::error::Error for StageOrderError {}

/// Tracks the current process stage and rejects out-of-order transitions.
#[derive(Debug, Default, Clone)]
pub struct StageCursor {
    current: Option<ProcessStage>,
}

impl StageCursor {
    /// Creates a cursor that has not entered any stage yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stage that was last entered.
    pub fn current(&self) -> Option<ProcessStage> {
        self.current
    }

    /// Moves to `stage` if it may follow the current one.
    pub fn enter(&mut self, stage: ProcessStage) -> Result<(), StageOrderError> {
        if !stage.can_follow(self.current) {
            return Err(StageOrderError {
                current: self.current,
                requested: stage,
            });
        }
        log::trace!("Entering process stage {stage}");
        self.current = Some(stage);
        Ok(())
    }

    /// Returns an error unless the cursor is currently in `stage`.
    pub fn expect(&self, stage: ProcessStage) -> Result<(), StageOrderError> {
        if self.current == Some(stage) {
            Ok(())
        } else {
            Err(StageOrderError {
                current: self.current,
                requested: stage,
            })
        }
    }
}
