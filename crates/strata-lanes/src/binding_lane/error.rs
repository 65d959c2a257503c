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

use strata_core::renderer::{ResourceError, ShaderLanguage, ShaderStage, StrategyKind};
use strata_data::mesh::{MeshId, PrimitiveId};
use thiserror::Error;

/// Failures of a binding strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// The device cannot host this strategy.
    #[error("The {strategy} strategy is not supported: {reason}")]
    Unsupported {
        /// Rejected strategy.
        strategy: StrategyKind,
        /// What the device lacks.
        reason: String,
    },
    /// The strategy generates a language the device does not accept.
    #[error("The {strategy} strategy cannot drive a {language} device")]
    LanguageMismatch {
        /// Requested strategy.
        strategy: StrategyKind,
        /// Language of the device.
        language: ShaderLanguage,
    },
    /// A program would declare more uniform vectors than the stage allows.
    #[error("{needed} uniform vectors needed in the {stage} stage, {available} available")]
    TooManyUniforms {
        /// Stage over its limit.
        stage: ShaderStage,
        /// Vectors the layout needs.
        needed: usize,
        /// Vectors the device offers.
        available: usize,
    },
    /// A mesh component names an unknown mesh.
    #[error("Unknown mesh {0:?}")]
    MissingMesh(MeshId),
    /// A mesh names an unknown primitive.
    #[error("Unknown primitive {0:?}")]
    MissingPrimitive(PrimitiveId),
    /// The device rejected a resource operation.
    #[error("Device resource error: {0}")]
    Resource(#[from] ResourceError),
}
