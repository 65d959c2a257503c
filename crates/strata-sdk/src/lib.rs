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

//! The public-facing API of Strata.
//!
//! An [`Engine`] owns the arenas, the repositories and the render agent, and
//! runs the process stages each frame:
//!
//! ```no_run
//! use std::sync::Arc;
//! use strata_sdk::prelude::*;
//! # fn device() -> Arc<dyn GraphicsDevice> { unimplemented!() }
//!
//! # fn main() -> anyhow::Result<()> {
//! init_logging("info");
//! let mut engine = Engine::new(&EngineConfig::default(), device())?;
//! let stats = engine.tick(UpdateCounts::default())?;
//! println!("{} draw calls", stats.draw_calls);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod logging;

pub use config::EngineConfig;
pub use engine::Engine;
pub use logging::init_logging;

pub mod prelude {
    //! The types most hosts need.
    pub use crate::{init_logging, Engine, EngineConfig};
    pub use strata_agents::{FrameStats, ShaderErrorCallback, ShaderErrorReport};
    pub use strata_core::math::{Mat3, Mat4, Vec2, Vec3, Vec4};
    pub use strata_core::renderer::{GraphicsDevice, StrategyKind};
    pub use strata_core::{FrameTick, ProcessStage, UpdateCounts};
    pub use strata_data::material::{MaterialHandle, MaterialTypeDescriptor};
    pub use strata_data::mesh::{MeshComponent, MeshId, VertexAttribute};
    pub use strata_data::semantics::builtin;
    pub use strata_data::EngineLimits;
    pub use strata_lanes::{NodeKind, ShaderGraph};
}
