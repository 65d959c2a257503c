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

//! # Strata Core
//!
//! Foundational crate containing the contracts and plain data types shared by
//! every layer of the GPU data core: math primitives, value layout descriptors,
//! the process-stage sequence, update counters, the stable topological sort and
//! the opaque [`GraphicsDevice`](renderer::GraphicsDevice) sink.

#![warn(missing_docs)]

pub mod frame;
pub mod graph;
pub mod layout;
pub mod math;
pub mod renderer;
pub mod stage;

pub use frame::{FrameTick, UpdateCounts};
pub use layout::{ComponentType, CompositionType};
pub use stage::{ProcessStage, StageCursor, StageOrderError};
