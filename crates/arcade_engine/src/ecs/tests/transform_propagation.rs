//! World transforms through the hierarchy

use crate::ecs::components::{Pose, TransformComponent};
use crate::ecs::{NodeKey, World};
use crate::foundation::math::Vec2;
use crate::foundation::time::FrameTime;
use approx::assert_relative_eq;

fn node_at(world: &mut World, position: Vec2) -> NodeKey {
    let key = world.spawn();
    world.insert(key, TransformComponent::from_position(position)).unwrap();
    key
}

fn world_position(world: &World, key: NodeKey) -> Vec2 {
    world.get::<TransformComponent>(key).unwrap().world().position
}

#[test]
fn test_child_world_position_is_offset_by_parent() {
    let mut world = World::default();
    let parent = node_at(&mut world, Vec2::new(10.0, 5.0));
    let child = node_at(&mut world, Vec2::new(5.0, 5.0));
    world.add_child(parent, child).unwrap();

    world.update(parent, FrameTime::default()).unwrap();

    assert_relative_eq!(world_position(&world, parent), Vec2::new(10.0, 5.0));
    assert_relative_eq!(world_position(&world, child), Vec2::new(15.0, 10.0));
}

#[test]
fn test_deep_chain_is_fresh_in_one_tick() {
    let mut world = World::default();
    let root = node_at(&mut world, Vec2::new(1.0, 0.0));
    let mut parent = root;
    let mut leaf = root;
    for _ in 0..4 {
        leaf = node_at(&mut world, Vec2::new(1.0, 2.0));
        world.add_child(parent, leaf).unwrap();
        parent = leaf;
    }
    world.update(root, FrameTime::default()).unwrap();
    assert_relative_eq!(world_position(&world, leaf), Vec2::new(5.0, 8.0));

    world.get_mut::<TransformComponent>(root).unwrap().local.position = Vec2::new(-1.0, 0.0);
    world.update(root, FrameTime::default()).unwrap();
    assert_relative_eq!(world_position(&world, leaf), Vec2::new(3.0, 8.0));
}

#[test]
fn test_parent_rotation_and_scale_are_not_inherited() {
    let mut world = World::default();
    let parent = world.spawn();
    world
        .insert(
            parent,
            TransformComponent::from_pose(
                Pose::from_position(Vec2::new(10.0, 10.0))
                    .with_angle(1.0)
                    .with_scale(Vec2::new(2.0, 2.0)),
            ),
        )
        .unwrap();
    let child = node_at(&mut world, Vec2::new(0.0, -4.0));
    world.add_child(parent, child).unwrap();
    world.update(parent, FrameTime::default()).unwrap();

    let child_world = world.get::<TransformComponent>(child).unwrap().world().clone();
    assert_relative_eq!(child_world.position, Vec2::new(10.0, 6.0));
    assert_relative_eq!(child_world.angle(), 0.0);
    assert_relative_eq!(child_world.scale, Vec2::new(1.0, 1.0));
}

#[test]
fn test_child_without_transform_parent_uses_local_pose() {
    let mut world = World::default();
    let parent = world.spawn();
    let child = node_at(&mut world, Vec2::new(3.0, 4.0));
    world.add_child(parent, child).unwrap();
    world.update(parent, FrameTime::default()).unwrap();

    assert_relative_eq!(world_position(&world, child), Vec2::new(3.0, 4.0));
}

#[test]
fn test_disabled_subtree_keeps_stale_world_pose() {
    let mut world = World::default();
    let parent = node_at(&mut world, Vec2::new(0.0, 0.0));
    let child = node_at(&mut world, Vec2::new(1.0, 1.0));
    world.add_child(parent, child).unwrap();
    world.update(parent, FrameTime::default()).unwrap();

    world.set_enabled(child, false).unwrap();
    world.get_mut::<TransformComponent>(parent).unwrap().local.position = Vec2::new(50.0, 0.0);
    world.update(parent, FrameTime::default()).unwrap();

    assert_relative_eq!(world_position(&world, child), Vec2::new(1.0, 1.0));
}
