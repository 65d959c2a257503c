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

//! Integration tests for program build failures and the error callback.

mod common;

use anyhow::Result;
use common::{transforms, Scene};
use std::cell::RefCell;
use std::rc::Rc;
use strata_agents::ShaderErrorReport;
use strata_core::renderer::ShaderError;
use strata_infra::HeadlessDevice;

const NORMAL_GRAPH: &str = r#"{
    "nodes": [
        { "id": 0, "kind": { "type": "Attribute", "attribute": "Normal" }, "stage": "Vertex" },
        { "id": 1, "kind": { "type": "Vec3ToVec4" }, "stage": "Vertex" },
        { "id": 2, "kind": { "type": "OutPosition" }, "stage": "Vertex" },
        { "id": 3, "kind": { "type": "Constant", "composition": "Vec4", "values": [1.0, 1.0, 1.0, 1.0] }, "stage": "Pixel" },
        { "id": 4, "kind": { "type": "OutColor" }, "stage": "Pixel" }
    ],
    "connections": [
        { "source": 0, "output": "value", "target": 1, "input": "xyz" },
        { "source": 1, "output": "value", "target": 2, "input": "position" },
        { "source": 3, "output": "value", "target": 4, "input": "color" }
    ]
}"#;

fn record_errors(agent: &mut strata_agents::RenderAgent) -> Rc<RefCell<Vec<ShaderErrorReport>>> {
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reports);
    agent.set_shader_error_callback(Box::new(move |report: &ShaderErrorReport| {
        sink.borrow_mut().push(report.clone());
    }));
    reports
}

#[test]
fn test_compile_failure_reported_once_and_skipped() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    scene.device.fail_compilation_when("get_BaseColorFactor");
    let mut agent = scene.agent(None)?;
    let reports = record_errors(&mut agent);
    let (component, _) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;

    let first = scene.frame(&mut agent, transforms(1), 0)?;
    assert_eq!(first.draw_calls, 0);
    assert_eq!(first.skipped_draws, 1);
    assert_eq!(first.program_failures, 1);

    // The failure is cached: no retry, no second report.
    let second = scene.frame(&mut agent, transforms(1), 1)?;
    assert_eq!(second.skipped_draws, 1);
    assert_eq!(second.program_failures, 0);

    let reports = reports.borrow();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.label.starts_with("Unlit@"));
    assert!(matches!(report.error, ShaderError::CompilationError { .. }));
    assert!(report.error.details().contains("rejected by the headless compiler"));
    assert!(report.shader.pixel.contains("get_BaseColorFactor"));
    assert_eq!(agent.programs().failed(), 1);
    Ok(())
}

#[test]
fn test_cleared_cache_retries_after_fix() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::wgsl());
    scene.device.fail_compilation_when("get_BaseColorFactor");
    let mut agent = scene.agent(None)?;
    let (component, material) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;
    assert_eq!(scene.frame(&mut agent, transforms(1), 0)?.draw_calls, 0);

    scene.device.fail_compilation_when("never emitted");
    scene.materials.get_mut(material).unwrap().clear_program_cache();
    let stats = scene.frame(&mut agent, transforms(1), 1)?;
    assert_eq!(stats.programs_built, 1);
    assert_eq!(stats.draw_calls, 1);
    Ok(())
}

#[test]
fn test_missing_attribute_is_not_a_shader_error() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let mut agent = scene.agent(None)?;
    agent.programs_mut().register_graph_json("Unlit", NORMAL_GRAPH)?;
    let reports = record_errors(&mut agent);
    let (component, _) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;

    let stats = scene.frame(&mut agent, transforms(1), 0)?;
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.program_failures, 1);
    assert!(reports.borrow().is_empty());
    assert_eq!(scene.device.program_count(), 0);
    Ok(())
}
