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

//! Integration tests for the engine context and its stage ordering.

use anyhow::Result;
use std::sync::Arc;
use strata_core::StageOrderError;
use strata_infra::HeadlessDevice;
use strata_sdk::prelude::*;

const FLAT_GRAPH: &str = r#"{
    "nodes": [
        { "id": 0, "kind": { "type": "Attribute", "attribute": "Position" }, "stage": "Vertex" },
        { "id": 1, "kind": { "type": "Vec3ToVec4" }, "stage": "Vertex" },
        { "id": 2, "kind": { "type": "OutPosition" }, "stage": "Vertex" },
        { "id": 3, "kind": { "type": "UniformData", "semantic": "BaseColorFactor", "composition": "Vec4" }, "stage": "Pixel" },
        { "id": 4, "kind": { "type": "OutColor" }, "stage": "Pixel" }
    ],
    "connections": [
        { "source": 0, "output": "value", "target": 1, "input": "xyz" },
        { "source": 1, "output": "value", "target": 2, "input": "position" },
        { "source": 3, "output": "value", "target": 4, "input": "color" }
    ]
}"#;

fn engine(device: Arc<HeadlessDevice>, strategy: Option<StrategyKind>) -> Result<Engine> {
    let config = EngineConfig {
        limits: EngineLimits::small(),
        strategy_override: strategy,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(&config, device)?;
    engine.register_material_type_json(
        MaterialTypeDescriptor::new("Flat", &[builtin::BASE_COLOR_FACTOR]),
        FLAT_GRAPH,
    )?;
    Ok(engine)
}

fn spawn_triangle(engine: &mut Engine) -> Result<MeshComponent> {
    let material = engine.create_material("Flat")?;
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let primitive = engine.create_primitive(
        "triangle",
        material,
        &[(VertexAttribute::Position, &positions[..])],
        None,
    )?;
    let mesh = engine.add_mesh("triangle", vec![primitive]);
    engine.spawn(mesh)
}

#[test]
fn test_frames_draw_spawned_entities() -> Result<()> {
    let device = Arc::new(HeadlessDevice::glsl_es3());
    let mut engine = engine(Arc::clone(&device), None)?;
    assert_eq!(engine.strategy_kind(), StrategyKind::DataTexture);
    assert_eq!(engine.stage(), Some(ProcessStage::Create));

    spawn_triangle(&mut engine)?;
    spawn_triangle(&mut engine)?;
    let first = engine.tick(UpdateCounts::default())?;
    assert_eq!(first.draw_calls, 2);
    assert_eq!(first.programs_built, 2);
    assert_eq!(engine.stage(), Some(ProcessStage::Render));

    // Each material caches its own program.
    let second = engine.tick(UpdateCounts::default())?;
    assert_eq!(second.draw_calls, 2);
    assert_eq!(second.uploads, 0);
    assert_eq!(engine.frame_index(), 2);
    assert_eq!(device.draws().len(), 4);
    assert_eq!(device.program_count(), 2);
    Ok(())
}

#[test]
fn test_transform_count_drives_uploads() -> Result<()> {
    let device = Arc::new(HeadlessDevice::wgsl());
    let mut engine = engine(device, None)?;
    let entity = spawn_triangle(&mut engine)?;

    let counts = |transforms| UpdateCounts {
        transforms,
        ..UpdateCounts::default()
    };
    assert!(engine.tick(counts(10))?.uploads > 0);
    assert_eq!(engine.tick(counts(10))?.uploads, 0);

    engine
        .instances_mut()
        .set_world_matrix(entity.instance, &Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))?;
    assert_eq!(engine.tick(counts(11))?.uploads, 1);
    Ok(())
}

#[test]
fn test_out_of_order_stages_rejected() -> Result<()> {
    let device = Arc::new(HeadlessDevice::glsl_es3());
    let mut engine = engine(device, Some(StrategyKind::Uniform))?;
    spawn_triangle(&mut engine)?;

    engine.tick(UpdateCounts::default())?;

    let err = engine.prerender(UpdateCounts::default()).unwrap_err();
    let order = err.downcast_ref::<StageOrderError>().unwrap();
    assert_eq!(order.current, Some(ProcessStage::Render));
    assert_eq!(order.requested, ProcessStage::PreRender);

    engine.logic()?;
    assert!(engine.logic().is_err());
    engine.prerender(UpdateCounts::default())?;
    assert_eq!(engine.render()?.draw_calls, 1);
    assert!(engine.render().is_err());
    Ok(())
}

#[test]
fn test_shutdown_ends_the_frame_loop() -> Result<()> {
    let device = Arc::new(HeadlessDevice::glsl_es3());
    let mut engine = engine(Arc::clone(&device), None)?;
    let entity = spawn_triangle(&mut engine)?;
    engine.tick(UpdateCounts::default())?;

    assert!(engine.despawn(entity));
    assert_eq!(engine.instances().live_instances(), 0);
    assert_eq!(engine.tick(UpdateCounts::default())?.draw_calls, 0);

    engine.shutdown()?;
    assert_eq!(engine.stage(), Some(ProcessStage::Discard));
    assert!(engine.tick(UpdateCounts::default()).is_err());
    Ok(())
}

#[test]
fn test_shader_error_callback_reaches_host() -> Result<()> {
    let device = Arc::new(HeadlessDevice::wgsl());
    device.fail_compilation_when("get_BaseColorFactor");
    let mut engine = engine(Arc::clone(&device), None)?;
    let reported = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    engine.set_shader_error_callback(Box::new(move |report: &ShaderErrorReport| {
        if let Ok(mut labels) = sink.lock() {
            labels.push(report.label.clone());
        }
    }));
    spawn_triangle(&mut engine)?;

    let stats = engine.tick(UpdateCounts::default())?;
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.program_failures, 1);
    engine.tick(UpdateCounts::default())?;
    assert_eq!(reported.lock().unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_spawn_unknown_mesh_fails() -> Result<()> {
    let mut engine = engine(Arc::new(HeadlessDevice::glsl_es3()), None)?;
    assert!(engine.spawn(MeshId(42)).is_err());
    Ok(())
}
