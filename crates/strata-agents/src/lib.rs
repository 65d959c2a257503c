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

//! # Strata Agents
//!
//! Agents decide *what* the lanes do each frame. The [`render_agent`] picks
//! the binding strategy the device can host, builds shader programs for
//! materials on demand and drives the strategy through the PreRender and
//! Render stages.

#![warn(missing_docs)]

pub mod render_agent;

pub use render_agent::{
    program_layout, select_strategy, FrameStats, ProgramBuildError, ProgramBuilder, RenderAgent,
    ShaderErrorCallback, ShaderErrorReport,
};
