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

//! Runs a few frames of a small scene on the headless device and prints what
//! reached it: the generated programs and the per-frame statistics.
//!
//! Usage: `sandbox [glsl|wgsl] [config.ron]`

use anyhow::{Context, Result};
use std::sync::Arc;
use strata_infra::HeadlessDevice;
use strata_sdk::prelude::*;

const FRAMES: u64 = 6;

/// Clip position from the world, view and projection matrices; color from
/// the material.
const UNLIT_GRAPH: &str = r#"{
    "nodes": [
        { "id": 0, "kind": { "type": "Attribute", "attribute": "Position" }, "stage": "Vertex" },
        { "id": 1, "kind": { "type": "Vec3ToVec4" }, "stage": "Vertex" },
        { "id": 2, "kind": { "type": "UniformData", "semantic": "WorldMatrix", "composition": "Mat4" }, "stage": "Vertex" },
        { "id": 3, "kind": { "type": "Transform", "matrix": "Mat4" }, "stage": "Vertex" },
        { "id": 4, "kind": { "type": "UniformData", "semantic": "ViewMatrix", "composition": "Mat4", "index": 0 }, "stage": "Vertex" },
        { "id": 5, "kind": { "type": "Transform", "matrix": "Mat4" }, "stage": "Vertex" },
        { "id": 6, "kind": { "type": "UniformData", "semantic": "ProjectionMatrix", "composition": "Mat4", "index": 0 }, "stage": "Vertex" },
        { "id": 7, "kind": { "type": "Transform", "matrix": "Mat4" }, "stage": "Vertex" },
        { "id": 8, "kind": { "type": "OutPosition" }, "stage": "Vertex" },
        { "id": 9, "kind": { "type": "UniformData", "semantic": "BaseColorFactor", "composition": "Vec4" }, "stage": "Pixel" },
        { "id": 10, "kind": { "type": "OutColor" }, "stage": "Pixel" }
    ],
    "connections": [
        { "source": 0, "output": "value", "target": 1, "input": "xyz" },
        { "source": 2, "output": "value", "target": 3, "input": "matrix" },
        { "source": 1, "output": "value", "target": 3, "input": "vector" },
        { "source": 4, "output": "value", "target": 5, "input": "matrix" },
        { "source": 3, "output": "result", "target": 5, "input": "vector" },
        { "source": 6, "output": "value", "target": 7, "input": "matrix" },
        { "source": 5, "output": "result", "target": 7, "input": "vector" },
        { "source": 7, "output": "result", "target": 8, "input": "position" },
        { "source": 9, "output": "value", "target": 10, "input": "color" }
    ]
}"#;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let language = args.next().unwrap_or_else(|| "wgsl".to_string());
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    init_logging(&config.log_filter);

    let device = Arc::new(match language.as_str() {
        "glsl" => HeadlessDevice::glsl_es3(),
        "wgsl" => HeadlessDevice::wgsl(),
        other => anyhow::bail!("Unknown shading language '{other}', expected glsl or wgsl"),
    });
    let mut engine = Engine::new(&config, device.clone())?;
    engine.set_shader_error_callback(Box::new(|report: &ShaderErrorReport| {
        log::error!("{}: {}", report.label, report.error.details());
    }));
    engine.register_material_type_json(
        MaterialTypeDescriptor::new(
            "Unlit",
            &[builtin::BASE_COLOR_FACTOR, builtin::ALPHA_CUTOFF],
        ),
        UNLIT_GRAPH,
    )?;

    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
    engine.globals_mut().set_mat4(builtin::VIEW_MATRIX, 0, &view)?;
    engine
        .globals_mut()
        .set_mat4(builtin::PROJECTION_MATRIX, 0, &Mat4::IDENTITY)?;

    let colors = [[1.0, 0.2, 0.2, 1.0], [0.2, 1.0, 0.2, 1.0], [0.2, 0.2, 1.0, 1.0]];
    let mut entities = Vec::new();
    for (i, color) in colors.iter().enumerate() {
        let material = engine.create_material("Unlit")?;
        engine
            .materials_mut()
            .set_parameter(material, builtin::BASE_COLOR_FACTOR, color)?;
        let positions = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
        let primitive = engine.create_primitive(
            &format!("triangle{i}"),
            material,
            &[(VertexAttribute::Position, &positions[..])],
            Some(&[0u32, 1, 2][..]),
        )?;
        let mesh = engine.add_mesh(format!("triangle{i}"), vec![primitive]);
        entities.push(engine.spawn(mesh)?);
    }

    let mut counts = UpdateCounts::default();
    for frame in 0..FRAMES {
        // Every other frame the first triangle moves.
        if frame % 2 == 1 {
            let offset = Vec3::new(frame as f32 * 0.1, 0.0, 0.0);
            engine
                .instances_mut()
                .set_world_matrix(entities[0].instance, &Mat4::from_translation(offset))?;
            counts.transforms += 1;
        }
        let stats = engine.tick(counts)?;
        println!(
            "frame {}: {} draws, {} skipped, {} uploads, {} programs built",
            stats.frame, stats.draw_calls, stats.skipped_draws, stats.uploads, stats.programs_built
        );
    }

    let first = device.draws().first().map(|draw| draw.program);
    let program = first
        .and_then(|id| device.program(id))
        .context("No program reached the device")?;
    println!("\n// ---- {} vertex ----\n{}", program.label, program.vertex_source);
    println!("// ---- {} pixel ----\n{}", program.label, program.pixel_source);

    engine.shutdown()?;
    Ok(())
}
