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

//! Integration tests driving whole frames through the render agent.

mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use common::{transforms, Scene};
use strata_agents::RenderAgent;
use strata_core::math::{Mat4, Vec3};
use strata_core::renderer::{
    GraphicsDevice, StrategyKind, TextureDescriptor, TextureFormat, TextureId, UniformValue,
};
use strata_data::material::{MaterialHandle, MaterialTypeDescriptor, TextureState};
use strata_data::mesh::{MeshComponent, Primitive, VertexAttribute};
use strata_data::semantics::builtin;
use strata_data::SemanticsRegistry;
use strata_infra::HeadlessDevice;
use strata_lanes::ActiveStrategy;

// ─────────────────────────────────────────────────────────────────────
// Strategy coverage
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_full_frame_in_every_strategy() -> Result<()> {
    let scenes = [
        (Scene::new(HeadlessDevice::wgsl()), StrategyKind::StorageBuffer),
        (Scene::new(HeadlessDevice::glsl_es3()), StrategyKind::DataTexture),
        (Scene::uniform_only(), StrategyKind::Uniform),
    ];
    for (mut scene, expected) in scenes {
        let mut agent = scene.agent(None)?;
        assert_eq!(agent.strategy_kind(), expected);

        let (component, _) = scene.spawn_triangle();
        agent.load(&scene.ctx(), component)?;

        let first = scene.frame(&mut agent, transforms(1), 0)?;
        assert_eq!(first.draw_calls, 1, "{expected}");
        assert_eq!(first.programs_built, 1, "{expected}");
        assert_eq!(first.skipped_draws, 0, "{expected}");

        // The program is cached on the material from now on.
        let second = scene.frame(&mut agent, transforms(1), 1)?;
        assert_eq!(second.draw_calls, 1, "{expected}");
        assert_eq!(second.programs_built, 0, "{expected}");
        assert_eq!(scene.device.program_count(), 1, "{expected}");
        assert_eq!(agent.frame_count(), 2);

        let draws = scene.device.draws();
        let program = scene.device.program(draws[0].program).unwrap();
        assert!(program.vertex_source.contains("get_WorldMatrix"), "{expected}");
        assert!(program.pixel_source.contains("get_BaseColorFactor"), "{expected}");
        assert!(program.label.starts_with("Unlit@"));
    }
    Ok(())
}

#[test]
fn test_forced_strategy_sends_material_uniforms() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let mut agent = scene.agent(Some(StrategyKind::Uniform))?;
    assert_eq!(agent.strategy_kind(), StrategyKind::Uniform);

    let (component, material) = scene.spawn_triangle();
    scene
        .materials
        .set_parameter(material, builtin::BASE_COLOR_FACTOR, &[0.25, 0.5, 0.75, 1.0])?;
    agent.load(&scene.ctx(), component)?;
    scene.frame(&mut agent, transforms(1), 0)?;

    let program = scene.device.draws()[0].program;
    assert_eq!(
        scene.device.uniform(program, "u_BaseColorFactor"),
        Some(UniformValue::Vec4([0.25, 0.5, 0.75, 1.0]))
    );
    Ok(())
}

#[test]
fn test_world_matrix_reaches_data_texture() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let mut agent = scene.agent(None)?;
    let (component, _) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;
    scene
        .instances
        .set_world_matrix(component.instance, &Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)))?;
    scene.frame(&mut agent, transforms(1), 0)?;

    let ActiveStrategy::DataTexture(strategy) = agent.strategy() else {
        panic!("expected the data texture strategy");
    };
    let texels = scene.device.texture_floats(strategy.textures().0).unwrap();
    let world = scene.instances.layout();
    let world = world.find(builtin::WORLD_MATRIX).unwrap();
    let base = (world.vec4_offset + component.instance.index() * world.vec4_stride) * 4;
    assert_relative_eq!(texels[base + 12], 5.0);
    assert_relative_eq!(texels[base + 15], 1.0);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────
// Dirty tracking
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unchanged_counts_skip_uploads() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let mut agent = scene.agent(None)?;
    let (component, _) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;

    assert_eq!(scene.frame(&mut agent, transforms(10), 0)?.uploads, 2);
    assert_eq!(scene.frame(&mut agent, transforms(10), 1)?.uploads, 0);

    scene
        .instances
        .set_world_matrix(component.instance, &Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))?;
    let stats = scene.frame(&mut agent, transforms(11), 2)?;
    assert_eq!(stats.uploads, 1);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(agent.last_frame(), stats);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────
// Drawable lifecycle
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unmounted_entity_is_not_drawn() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::wgsl());
    let mut agent = scene.agent(None)?;
    let (a, _) = scene.spawn_triangle();
    let (b, _) = scene.spawn_triangle();
    agent.load(&scene.ctx(), a)?;
    agent.load(&scene.ctx(), b)?;
    agent.load(&scene.ctx(), b)?;
    assert_eq!(agent.drawables().len(), 2);
    assert_eq!(scene.frame(&mut agent, transforms(1), 0)?.draw_calls, 2);

    assert!(agent.unmount(&a));
    assert!(!agent.unmount(&a));
    let stats = scene.frame(&mut agent, transforms(1), 1)?;
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(scene.device.draws().last().unwrap().instance_index, b.instance.0);
    Ok(())
}

#[test]
fn test_destroyed_material_is_skipped() -> Result<()> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let mut agent = scene.agent(None)?;
    let (component, material) = scene.spawn_triangle();
    agent.load(&scene.ctx(), component)?;
    assert!(scene.materials.destroy_material(material));

    let stats = scene.frame(&mut agent, transforms(1), 0)?;
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.skipped_draws, 1);
    assert!(scene.device.draws().is_empty());
    Ok(())
}

/// A scene with a textured type drawn by the Unlit graph and one loaded
/// triangle using it.
fn textured_scene() -> Result<(Scene, RenderAgent, MaterialHandle)> {
    let mut scene = Scene::new(HeadlessDevice::glsl_es3());
    let registry = SemanticsRegistry::with_builtins(&scene.limits);
    scene.materials.register_type(
        &mut scene.memory,
        &registry,
        MaterialTypeDescriptor::new(
            "Textured",
            &[builtin::BASE_COLOR_FACTOR, builtin::BASE_COLOR_TEXTURE],
        ),
    )?;
    let mut agent = scene.agent(None)?;
    agent
        .programs_mut()
        .register_graph_json("Textured", common::UNLIT_GRAPH)?;

    let material = scene.materials.create_material("Textured")?;
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let primitive = Primitive::from_vertex_data(
        &mut scene.memory,
        "textured",
        material,
        &[(VertexAttribute::Position, &positions[..])],
        Some(&[0u32, 1, 2][..]),
    )?;
    let mesh = scene.meshes.add_mesh("textured", vec![primitive]);
    let instance = scene.instances.take_instance()?;
    agent.load(&scene.ctx(), MeshComponent { mesh, instance })?;
    Ok((scene, agent, material))
}

fn color_texture(scene: &Scene) -> Result<TextureId> {
    Ok(scene.device.create_texture(&TextureDescriptor {
        label: "albedo".to_string(),
        width: 4,
        height: 4,
        format: TextureFormat::Rgba8Unorm,
    })?)
}

#[test]
fn test_reloading_texture_pauses_draws() -> Result<()> {
    let (mut scene, mut agent, material) = textured_scene()?;
    let texture = color_texture(&scene)?;

    scene
        .materials
        .set_texture(material, builtin::BASE_COLOR_TEXTURE, TextureState::Ready(texture))?;
    let stats = scene.frame(&mut agent, transforms(1), 0)?;
    assert_eq!(stats.draw_calls, 1);

    scene
        .materials
        .set_texture(material, builtin::BASE_COLOR_TEXTURE, TextureState::Pending)?;
    let stats = scene.frame(&mut agent, transforms(0), 1)?;
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.skipped_draws, 1);

    scene
        .materials
        .set_texture(material, builtin::BASE_COLOR_TEXTURE, TextureState::Ready(texture))?;
    let stats = scene.frame(&mut agent, transforms(0), 2)?;
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(scene.device.draws().last().unwrap().textures.len(), 1);
    Ok(())
}

#[test]
fn test_abandoned_texture_draws_without_sampler() -> Result<()> {
    let (mut scene, mut agent, material) = textured_scene()?;

    scene
        .materials
        .set_texture(material, builtin::BASE_COLOR_TEXTURE, TextureState::Abandoned)?;
    let stats = scene.frame(&mut agent, transforms(1), 0)?;
    assert_eq!(stats.draw_calls, 1);
    assert!(scene.device.draws().last().unwrap().textures.is_empty());
    Ok(())
}
