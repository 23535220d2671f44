//! Generated demo content.
//!
//! Builds a tree of `entity_count` nodes (`branching` children each) sharing
//! one mesh and material, with a light on every eighth node and one camera.
//! Every frame, each node that has children spins around its Y axis, and
//! every [`CHURN_INTERVAL`] frames the oldest leaf is despawned and replaced.

use std::collections::VecDeque;

use engine_core::{Entity, Result};
use engine_math::{EditTransform, Mat4, Vec3};
use engine_resources::{
    Aabb, MaterialId, Mesh, MeshId, Shader, Texture, TextureFormat, UniformKind,
};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::world::World;

const LIGHT_SPACING: usize = 8;
const NODE_OFFSET: Vec3 = Vec3::new(2.0, 0.0, 0.0);
pub const CHURN_INTERVAL: u64 = 30;

#[derive(Debug)]
pub struct DemoScene {
    spinners: Vec<Entity>,
    /// Childless nodes, oldest first.
    leaves: VecDeque<Entity>,
    mesh: MeshId,
    material: MaterialId,
    spawned: usize,
}

impl DemoScene {
    pub fn build(world: &mut World, config: &AppConfig) -> Result<Self> {
        let shader = world.shaders.create_shader(
            Shader::new("lit")
                .with_uniform("albedo", UniformKind::Vec3)
                .with_uniform("albedo_map", UniformKind::Texture2d),
        );
        world.shaders.set_path(shader, "shaders/lit.shader")?;

        let texture = world
            .textures
            .create_texture(Texture::new_2d(256, 256, TextureFormat::Rgba8));
        world.textures.set_path(texture, "textures/checker.png")?;

        let mesh = world.meshes.insert_mesh(Mesh {
            vertex_count: 24,
            index_count: 36,
            bounds: Aabb {
                center: Vec3::ZERO,
                extents: Vec3::ONE,
            },
            ..Mesh::default()
        });
        world.meshes.set_path(mesh, "meshes/cube.mesh")?;

        let material = world.materials.create_material();
        world.materials.set_shader(material, shader, &world.shaders)?;
        world
            .materials
            .set_texture(material, "albedo_map", texture, &world.textures)?;

        let count = config.entity_count;
        let mut nodes = Vec::with_capacity(count);
        let mut spinners = Vec::new();
        let mut leaves = VecDeque::new();
        for i in 0..count {
            let (entity, id) = world.spawn_named(format!("node {i}"));
            if i > 0 {
                let parent = nodes[(i - 1) / config.branching];
                world.scene.set_parent(id, parent)?;
            }
            world
                .scene
                .set_edit_transform(id, EditTransform::from_translation(NODE_OFFSET))?;

            let object = world.render_objects.add_render_object(entity);
            world.render_objects.set_mesh(object, mesh)?;
            world.render_objects.set_material(object, material)?;

            if i % LIGHT_SPACING == 0 {
                world.lights.add_light(entity);
            }
            if i * config.branching + 1 < count {
                spinners.push(entity);
            } else {
                leaves.push_back(entity);
            }
            nodes.push(id);
        }

        let (camera, camera_id) = world.spawn_named("camera");
        let camera = world.cameras.add_camera(camera);
        let projection = world.cameras.camera(camera)?.projection.with_aspect(16.0 / 9.0);
        world.cameras.set_projection(camera, projection)?;
        world
            .scene
            .set_local_transform(camera_id, Mat4::from_translation(Vec3::new(0.0, 5.0, 20.0)))?;

        info!(
            entities = world.entities.len(),
            spinners = spinners.len(),
            lights = world.lights.len(),
            "demo scene built"
        );
        Ok(Self {
            spinners,
            leaves,
            mesh,
            material,
            spawned: count,
        })
    }

    /// Mutation phase of one frame.
    pub fn update(&mut self, world: &mut World, frame_id: u64, elapsed: f64) -> Result<()> {
        let angle = elapsed as f32;
        for &entity in &self.spinners {
            let id = world.scene.resolve(entity)?;
            let edit = world
                .scene
                .edit_transform(id)?
                .with_rotation(Vec3::new(0.0, angle, 0.0));
            world.scene.set_edit_transform(id, edit)?;
        }

        if frame_id % CHURN_INTERVAL == 0 {
            self.churn(world)?;
        }
        Ok(())
    }

    /// Replace the oldest leaf with a fresh entity under the same parent.
    fn churn(&mut self, world: &mut World) -> Result<()> {
        let Some(old) = self.leaves.pop_front() else {
            return Ok(());
        };

        // Scene ids do not survive the removal; keep the parent by entity.
        let old_id = world.scene.resolve(old)?;
        let parent = world.scene.parent(old_id)?.map(|id| id.entity());
        world.despawn(old)?;

        let (entity, id) = world.spawn_named(format!("node {}", self.spawned));
        self.spawned += 1;
        if let Some(parent) = parent {
            let parent = world.scene.resolve(parent)?;
            world.scene.set_parent(id, parent)?;
        }
        world
            .scene
            .set_edit_transform(id, EditTransform::from_translation(NODE_OFFSET))?;
        let object = world.render_objects.add_render_object(entity);
        world.render_objects.set_mesh(object, self.mesh)?;
        world.render_objects.set_material(object, self.material)?;

        debug!(%old, new = %entity, "leaf replaced");
        self.leaves.push_back(entity);
        Ok(())
    }
}
