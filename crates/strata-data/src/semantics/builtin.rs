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

//! Semantics the engine itself produces or every material understands.

use super::{SemanticsInfo, UpdateInterval};
use crate::config::EngineLimits;
use strata_core::layout::{ComponentType, CompositionType};
use strata_core::math::{Mat3, Mat4};
use strata_core::renderer::StageVisibility;

// Per-instance
pub const WORLD_MATRIX: &str = "WorldMatrix";
pub const NORMAL_MATRIX: &str = "NormalMatrix";
pub const IS_BILLBOARD: &str = "IsBillboard";

// Global
pub const VIEW_MATRIX: &str = "ViewMatrix";
pub const PROJECTION_MATRIX: &str = "ProjectionMatrix";
pub const VIEW_POSITION: &str = "ViewPosition";
pub const LIGHT_NUMBER: &str = "LightNumber";
pub const LIGHT_POSITION: &str = "LightPosition";
pub const LIGHT_DIRECTION: &str = "LightDirection";
pub const LIGHT_INTENSITY: &str = "LightIntensity";
pub const LIGHT_PROPERTY: &str = "LightProperty";
pub const BONE_MATRIX: &str = "BoneMatrix";
pub const VR_STATE: &str = "VrState";
pub const TIME: &str = "Time";
pub const BACK_BUFFER_SIZE: &str = "BackBufferSize";

// Material
pub const BASE_COLOR_FACTOR: &str = "BaseColorFactor";
pub const BASE_COLOR_TEXTURE: &str = "BaseColorTexture";
pub const METALLIC_ROUGHNESS_FACTOR: &str = "MetallicRoughnessFactor";
pub const ALPHA_CUTOFF: &str = "AlphaCutoff";
pub const EMISSIVE_FACTOR: &str = "EmissiveFactor";

fn mat4(name: &str) -> SemanticsInfo {
    SemanticsInfo::new(name, CompositionType::Mat4, ComponentType::F32)
        .with_initial(&Mat4::IDENTITY.to_cols_array())
}

/// Semantics stored once per entity in the instance arena.
pub fn instance_semantics() -> Vec<SemanticsInfo> {
    vec![
        mat4(WORLD_MATRIX)
            .stage(StageVisibility::Vertex)
            .interval(UpdateInterval::EveryTime)
            .internal(),
        SemanticsInfo::new(NORMAL_MATRIX, CompositionType::Mat3, ComponentType::F32)
            .with_initial(&Mat3::IDENTITY.to_cols_array())
            .stage(StageVisibility::Vertex)
            .interval(UpdateInterval::EveryTime)
            .internal(),
        SemanticsInfo::new(IS_BILLBOARD, CompositionType::Scalar, ComponentType::F32)
            .stage(StageVisibility::Vertex)
            .interval(UpdateInterval::EveryTime)
            .internal(),
    ]
}

/// Semantics shared by every draw of a frame.
pub fn global_semantics(limits: &EngineLimits) -> Vec<SemanticsInfo> {
    let per_frame = |info: SemanticsInfo| info.interval(UpdateInterval::PerFrame).internal();
    let float = |name: &str, composition| SemanticsInfo::new(name, composition, ComponentType::F32);
    vec![
        per_frame(mat4(VIEW_MATRIX).array(limits.max_camera_count)),
        per_frame(mat4(PROJECTION_MATRIX).array(limits.max_camera_count)),
        per_frame(float(VIEW_POSITION, CompositionType::Vec3).array(limits.max_camera_count)),
        per_frame(
            SemanticsInfo::new(LIGHT_NUMBER, CompositionType::Scalar, ComponentType::I32)
                .stage(StageVisibility::Pixel)
                .uniform_in_data_texture(),
        ),
        per_frame(
            float(LIGHT_POSITION, CompositionType::Vec4)
                .array(limits.max_light_count)
                .stage(StageVisibility::Pixel),
        ),
        per_frame(
            float(LIGHT_DIRECTION, CompositionType::Vec3)
                .array(limits.max_light_count)
                .stage(StageVisibility::Pixel),
        ),
        per_frame(
            float(LIGHT_INTENSITY, CompositionType::Vec4)
                .array(limits.max_light_count)
                .stage(StageVisibility::Pixel),
        ),
        per_frame(
            float(LIGHT_PROPERTY, CompositionType::Vec4)
                .array(limits.max_light_count)
                .stage(StageVisibility::Pixel),
        ),
        per_frame(
            mat4(BONE_MATRIX)
                .array(limits.max_bone_count)
                .stage(StageVisibility::Vertex),
        ),
        per_frame(float(VR_STATE, CompositionType::Vec2).uniform_in_data_texture()),
        per_frame(float(TIME, CompositionType::Scalar)),
        per_frame(float(BACK_BUFFER_SIZE, CompositionType::Vec2)),
    ]
}

/// Parameters understood by the standard material types.
pub fn material_semantics() -> Vec<SemanticsInfo> {
    vec![
        SemanticsInfo::new(BASE_COLOR_FACTOR, CompositionType::Vec4, ComponentType::F32)
            .with_initial(&[1.0, 1.0, 1.0, 1.0])
            .with_range(0.0, 1.0)
            .stage(StageVisibility::Pixel),
        SemanticsInfo::texture(BASE_COLOR_TEXTURE),
        SemanticsInfo::new(
            METALLIC_ROUGHNESS_FACTOR,
            CompositionType::Vec2,
            ComponentType::F32,
        )
        .with_initial(&[1.0, 1.0])
        .with_range(0.0, 1.0)
        .stage(StageVisibility::Pixel),
        SemanticsInfo::new(ALPHA_CUTOFF, CompositionType::Scalar, ComponentType::F32)
            .with_initial(&[0.5])
            .with_range(0.0, 1.0)
            .stage(StageVisibility::Pixel)
            .solo(),
        SemanticsInfo::new(EMISSIVE_FACTOR, CompositionType::Vec3, ComponentType::F32)
            .with_range(0.0, f32::MAX)
            .stage(StageVisibility::Pixel),
    ]
}

/// Every built-in semantic.
pub fn all(limits: &EngineLimits) -> Vec<SemanticsInfo> {
    let mut all = instance_semantics();
    all.extend(global_semantics(limits));
    all.extend(material_semantics());
    all
}
