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

//! Picks the binding strategy the device can host.

use strata_core::renderer::StrategyKind;
use strata_data::{DataLayout, GlobalDataRepository, InstanceDataRepository, MaterialRepository};
use strata_lanes::{
    ActiveStrategy, DataTextureStrategy, StorageBufferStrategy, StrategyContext, StrategyError,
    UniformStrategy,
};

/// Preference order when no strategy is forced.
const PREFERENCE: [StrategyKind; 3] = [
    StrategyKind::StorageBuffer,
    StrategyKind::DataTexture,
    StrategyKind::Uniform,
];

/// Everything a program of `type_name` can read: globals, instance values
/// and the type's parameters. Without a type, only the first two.
pub fn program_layout(
    globals: &GlobalDataRepository,
    instances: &InstanceDataRepository,
    materials: &MaterialRepository,
    type_name: Option<&str>,
) -> DataLayout {
    let mut layout = globals.layout();
    layout.extend(instances.layout());
    if let Some(material_layout) = type_name.and_then(|name| materials.layout_for(name)) {
        layout.extend(material_layout);
    }
    layout
}

fn build(kind: StrategyKind, ctx: &StrategyContext<'_>) -> Result<ActiveStrategy, StrategyError> {
    match kind {
        StrategyKind::StorageBuffer => StorageBufferStrategy::new(ctx).map(ActiveStrategy::StorageBuffer),
        StrategyKind::DataTexture => DataTextureStrategy::new(ctx).map(ActiveStrategy::DataTexture),
        StrategyKind::Uniform => {
            let strategy = UniformStrategy::new(&ctx.device.capabilities())?;
            let layout = program_layout(ctx.globals, ctx.instances, ctx.materials, None);
            strategy.check_limits(&layout)?;
            Ok(ActiveStrategy::Uniform(strategy))
        }
    }
}

/// Creates the strategy to run with.
///
/// A `requested` strategy is built as is and its failure returned. Otherwise
/// storage buffers are preferred, then data textures, then uniforms; the
/// first one the device can host wins.
///
/// # Arguments
///
/// * `ctx`: The repositories and the device.
/// * `requested`: A strategy forced by configuration, if any.
pub fn select_strategy(
    ctx: &StrategyContext<'_>,
    requested: Option<StrategyKind>,
) -> Result<ActiveStrategy, StrategyError> {
    if let Some(kind) = requested {
        let strategy = build(kind, ctx)?;
        log::info!("Binding strategy forced by configuration: {kind}");
        return Ok(strategy);
    }
    let caps = ctx.device.capabilities();
    let mut last_error = None;
    for kind in PREFERENCE {
        if kind.language() != caps.shading_language {
            continue;
        }
        match build(kind, ctx) {
            Ok(strategy) => {
                log::info!(
                    "Binding strategy selected for '{}': {kind}",
                    caps.backend_name
                );
                return Ok(strategy);
            }
            Err(err) => {
                log::debug!("Strategy {kind} rejected: {err}");
                last_error = Some(err);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| StrategyError::Unsupported {
        strategy: StrategyKind::Uniform,
        reason: format!("no strategy generates {}", caps.shading_language),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::renderer::{DeviceCapabilities, ShaderLanguage};
    use strata_data::{EngineLimits, MemoryManager, MeshRepository, SemanticsRegistry};
    use strata_infra::HeadlessDevice;
    use strata_lanes::BindingStrategy;

    fn select(
        caps: DeviceCapabilities,
        requested: Option<StrategyKind>,
    ) -> Result<ActiveStrategy, StrategyError> {
        let limits = EngineLimits::small();
        let mut memory = MemoryManager::new(&limits).unwrap();
        let registry = SemanticsRegistry::with_builtins(&limits);
        let globals = GlobalDataRepository::initialize(&mut memory, &registry, &limits).unwrap();
        let instances = InstanceDataRepository::initialize(&mut memory, &registry, &limits).unwrap();
        let materials = MaterialRepository::new(&limits);
        let meshes = MeshRepository::new();
        let device = HeadlessDevice::new(caps);
        let ctx = StrategyContext {
            device: &device,
            memory: &memory,
            globals: &globals,
            instances: &instances,
            materials: &materials,
            meshes: &meshes,
            limits: &limits,
        };
        select_strategy(&ctx, requested)
    }

    #[test]
    fn test_wgsl_device_gets_storage_buffers() {
        let strategy = select(DeviceCapabilities::wgsl(), None).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::StorageBuffer);
    }

    #[test]
    fn test_glsl_device_prefers_data_textures() {
        let strategy = select(DeviceCapabilities::glsl_es3(), None).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::DataTexture);
    }

    #[test]
    fn test_falls_back_to_uniforms_without_float_textures() {
        let mut caps = DeviceCapabilities::glsl_es3();
        caps.supports_float_textures = false;
        let strategy = select(caps, None).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Uniform);
    }

    #[test]
    fn test_nothing_fits() {
        let mut caps = DeviceCapabilities::glsl_es3();
        caps.supports_float_textures = false;
        caps.max_vertex_uniform_vectors = 8;
        assert!(matches!(
            select(caps, None),
            Err(StrategyError::TooManyUniforms { .. })
        ));
    }

    #[test]
    fn test_override_is_honoured_or_rejected() {
        let strategy = select(DeviceCapabilities::glsl_es3(), Some(StrategyKind::Uniform)).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Uniform);
        assert!(matches!(
            select(DeviceCapabilities::glsl_es3(), Some(StrategyKind::StorageBuffer)),
            Err(StrategyError::LanguageMismatch {
                language: ShaderLanguage::Glsl,
                ..
            })
        ));
    }
}
