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

//! Acts as the **[A]gent** for the GPU data path.
//!
//! It determines *which* binding strategy to use and which program each draw
//! needs, but delegates uploads and draw calls to the binding lane and source
//! generation to the shader lane:
//! - At startup, [`select_strategy`] matches the device capabilities against
//!   the three strategies.
//! - On a program cache miss, the [`ProgramBuilder`] resolves the material
//!   type's node graph against the strategy's data prelude and compiles it.
//! - Each frame, the [`RenderAgent`] runs PreRender and Render and reports
//!   [`FrameStats`].

mod agent;
mod program_builder;
mod selection;

pub use agent::{FrameStats, RenderAgent};
pub use program_builder::{ProgramBuildError, ProgramBuilder, ShaderErrorCallback, ShaderErrorReport};
pub use selection::{program_layout, select_strategy};
