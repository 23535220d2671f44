//! End-to-end checks of the scene graph through its public API.

use std::collections::{HashMap, HashSet};

use engine_core::{Entity, EntityRegistry};
use engine_math::{Mat4, Vec3};
use engine_scene::{Scene, SceneObjectId, TransformUpdateReceiver};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// Walks every link and panics on the first broken relationship.
fn assert_valid_forest(scene: &Scene, live: &HashSet<Entity>) {
    let ids: Vec<SceneObjectId> = scene.iter().collect();
    assert_eq!(ids.len(), live.len());
    assert_eq!(scene.len(), live.len());

    // Entity map is a bijection over live entities.
    let mut seen = HashSet::new();
    for id in &ids {
        assert!(live.contains(&id.entity()));
        assert!(seen.insert(id.entity()));
        assert_eq!(scene.lookup(id.entity()), Some(*id));
    }

    for id in &ids {
        let parent = scene.parent(*id).unwrap();
        let prev = scene.prev_sibling(*id).unwrap();
        let next = scene.next_sibling(*id).unwrap();

        match parent {
            None => {
                assert_eq!(prev, None, "top-level nodes are not chained");
                assert_eq!(next, None, "top-level nodes are not chained");
            }
            Some(parent) => {
                assert!(scene.children(parent).unwrap().any(|c| c == *id));
                if prev.is_none() {
                    assert_eq!(scene.first_child(parent).unwrap(), Some(*id));
                }
            }
        }
        if let Some(prev) = prev {
            assert_eq!(scene.next_sibling(prev).unwrap(), Some(*id));
            assert_eq!(scene.parent(prev).unwrap(), parent);
        }
        if let Some(next) = next {
            assert_eq!(scene.prev_sibling(next).unwrap(), Some(*id));
            assert_eq!(scene.parent(next).unwrap(), parent);
        }
        for child in scene.children(*id).unwrap() {
            assert_eq!(scene.parent(child).unwrap(), Some(*id));
        }

        // Acyclic: the parent chain reaches the root within `len` steps.
        let mut current = *id;
        let mut steps = 0;
        while let Some(up) = scene.parent(current).unwrap() {
            current = up;
            steps += 1;
            assert!(steps <= ids.len(), "cycle through {:?}", id);
        }
    }
}

/// World transform computed from scratch by multiplying ancestor locals.
fn expected_world(scene: &Scene, id: SceneObjectId) -> Mat4 {
    let mut world = scene.local_transform(id).unwrap();
    let mut current = id;
    while let Some(parent) = scene.parent(current).unwrap() {
        world = scene.local_transform(parent).unwrap() * world;
        current = parent;
    }
    world
}

#[test]
fn test_parent_chain_shares_translation() {
    let mut registry = EntityRegistry::new();
    let mut scene = Scene::new();
    let a = scene.add_scene_object(registry.create());
    let b = scene.add_scene_object(registry.create());
    let c = scene.add_scene_object(registry.create());

    scene.set_parent(c, b).unwrap();
    scene.set_parent(b, a).unwrap();
    scene.set_local_transform(a, translation(1.0, 0.0, 0.0)).unwrap();

    let world_b = scene.world_transform(b).unwrap();
    let world_c = scene.world_transform(c).unwrap();
    assert!(world_b.abs_diff_eq(translation(1.0, 0.0, 0.0), 1e-6));
    assert!(world_c.abs_diff_eq(world_b, 1e-6));
}

#[test]
fn test_removing_middle_node_reparents_to_grandparent() {
    let mut registry = EntityRegistry::new();
    let mut scene = Scene::new();
    let a = scene.add_scene_object(registry.create());
    let b = scene.add_scene_object(registry.create());
    let c = scene.add_scene_object(registry.create());
    scene.set_parent(c, b).unwrap();
    scene.set_parent(b, a).unwrap();
    scene.set_local_transform(a, translation(1.0, 0.0, 0.0)).unwrap();

    scene.remove_scene_object(b).unwrap();
    registry.destroy(b.entity());

    let a = scene.lookup(a.entity()).unwrap();
    let c = scene.lookup(c.entity()).unwrap();
    assert_eq!(scene.parent(c).unwrap(), Some(a));
    assert_eq!(scene.children(a).unwrap().collect::<Vec<_>>(), vec![c]);

    scene.set_local_transform(a, translation(0.0, 7.0, 0.0)).unwrap();
    let world_c = scene.world_transform(c).unwrap();
    assert!(world_c.abs_diff_eq(translation(0.0, 7.0, 0.0), 1e-6));
}

#[test]
fn test_removing_last_row_does_not_swap() {
    let mut registry = EntityRegistry::new();
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..4)
        .map(|_| scene.add_scene_object(registry.create()))
        .collect();
    scene.set_parent(ids[3], ids[0]).unwrap();
    scene.set_parent(ids[2], ids[0]).unwrap();
    scene.set_local_transform(ids[1], translation(0.0, 0.0, 2.0)).unwrap();

    let last = *ids.iter().max_by_key(|id| id.index()).unwrap();
    assert_eq!(last, ids[3]);
    scene.remove_scene_object(last).unwrap();

    assert_eq!(scene.len(), 3);
    for id in &ids[..3] {
        assert!(scene.contains(*id), "{id:?} must keep its row");
        assert_eq!(scene.lookup(id.entity()), Some(*id));
    }
    assert_eq!(scene.children(ids[0]).unwrap().collect::<Vec<_>>(), vec![ids[2]]);
    assert_eq!(scene.prev_sibling(ids[2]).unwrap(), None);
    assert!(scene
        .world_transform(ids[1])
        .unwrap()
        .abs_diff_eq(translation(0.0, 0.0, 2.0), 1e-6));

    let live: HashSet<_> = ids[..3].iter().map(|id| id.entity()).collect();
    assert_valid_forest(&scene, &live);
}

#[test]
fn test_random_edits_keep_forest_valid() {
    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut registry = EntityRegistry::new();
        let mut scene = Scene::with_capacity(4);
        let mut live: HashSet<Entity> = HashSet::new();

        for _ in 0..300 {
            let mut entities: Vec<Entity> = live.iter().copied().collect();
            entities.sort();
            match rng.random_range(0..10) {
                0..=3 => {
                    let entity = registry.create();
                    scene.add_scene_object(entity);
                    live.insert(entity);
                }
                4..=6 if entities.len() >= 2 => {
                    let child = entities[rng.random_range(0..entities.len())];
                    let child = scene.lookup(child).unwrap();
                    let parent = if rng.random_range(0..4) == 0 {
                        SceneObjectId::ROOT
                    } else {
                        let parent = entities[rng.random_range(0..entities.len())];
                        scene.lookup(parent).unwrap()
                    };
                    // Cycles are rejected and leave the tree untouched.
                    let _ = scene.set_parent(child, parent);
                }
                7 if !entities.is_empty() => {
                    let target = entities[rng.random_range(0..entities.len())];
                    let id = scene.lookup(target).unwrap();
                    let offset = rng.random_range(-5.0f32..5.0);
                    scene
                        .set_local_transform(id, translation(offset, 1.0, 0.0))
                        .unwrap();
                }
                8..=9 if !entities.is_empty() => {
                    let victim = entities[rng.random_range(0..entities.len())];
                    let id = scene.lookup(victim).unwrap();
                    scene.remove_scene_object(id).unwrap();
                    registry.destroy(victim);
                    live.remove(&victim);
                    assert_valid_forest(&scene, &live);
                }
                _ => {}
            }
        }

        assert_valid_forest(&scene, &live);
        for id in scene.iter() {
            let world = scene.world_transform(id).unwrap();
            assert!(world.abs_diff_eq(expected_world(&scene, id), 1e-3));
        }
    }
}

#[test]
fn test_full_recompute_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut registry = EntityRegistry::new();
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..32)
        .map(|_| scene.add_scene_object(registry.create()))
        .collect();
    for i in 1..ids.len() {
        let parent = ids[rng.random_range(0..i)];
        scene.set_parent(ids[i], parent).unwrap();
        let local = Mat4::from_scale_rotation_translation(
            Vec3::splat(rng.random_range(0.5f32..1.5)),
            engine_math::Quat::from_rotation_y(rng.random_range(0.0f32..3.0)),
            Vec3::new(rng.random_range(-2.0f32..2.0), 0.0, 1.0),
        );
        scene.set_local_transform(ids[i], local).unwrap();
    }

    let before: Vec<Mat4> = ids.iter().map(|id| scene.world_transform(*id).unwrap()).collect();
    scene.update_all_world_transforms();
    let once: Vec<Mat4> = ids.iter().map(|id| scene.world_transform(*id).unwrap()).collect();
    scene.update_all_world_transforms();
    let twice: Vec<Mat4> = ids.iter().map(|id| scene.world_transform(*id).unwrap()).collect();

    assert_eq!(once, twice);
    for ((b, o), id) in before.iter().zip(&once).zip(&ids) {
        assert!(b.abs_diff_eq(*o, 1e-4));
        assert!(o.abs_diff_eq(expected_world(&scene, *id), 1e-3));
    }
}

#[derive(Default)]
struct Mirror {
    worlds: HashMap<Entity, Mat4>,
    calls: usize,
    delivered: Vec<Entity>,
}

impl TransformUpdateReceiver for Mirror {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        self.calls += 1;
        for (entity, world) in entities.iter().zip(transforms) {
            self.worlds.insert(*entity, *world);
            self.delivered.push(*entity);
        }
    }
}

#[test]
fn test_fan_out_delivers_each_entity_once() {
    let mut registry = EntityRegistry::new();
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..6)
        .map(|_| scene.add_scene_object(registry.create()))
        .collect();
    let mut mirror = Mirror::default();
    scene.notify_updated_transforms(&mut [&mut mirror]);
    mirror.delivered.clear();
    mirror.calls = 0;

    // Touch some nodes repeatedly within one frame.
    scene.set_parent(ids[1], ids[0]).unwrap();
    for step in 0..5 {
        let x = step as f32;
        scene.set_local_transform(ids[0], translation(x, 0.0, 0.0)).unwrap();
        scene.set_local_transform(ids[4], translation(0.0, x, 0.0)).unwrap();
    }
    scene.mark_updated(ids[4]).unwrap();

    let mut other = Mirror::default();
    let count = scene.notify_updated_transforms(&mut [&mut mirror, &mut other]);

    assert_eq!(count, 3);
    assert_eq!(mirror.calls, 1);
    assert_eq!(other.calls, 1);
    let delivered: HashSet<_> = mirror.delivered.iter().copied().collect();
    assert_eq!(delivered.len(), mirror.delivered.len());
    let expected: HashSet<_> = [ids[0], ids[1], ids[4]].iter().map(|id| id.entity()).collect();
    assert_eq!(delivered, expected);
    assert!(scene.updated_entities().is_empty());

    let world = mirror.worlds[&ids[1].entity()];
    assert!(world.abs_diff_eq(translation(4.0, 0.0, 0.0), 1e-6));
    for entity in &expected {
        assert_eq!(other.worlds[entity], mirror.worlds[entity]);
    }
}
