//! Render pipeline tests against the recording backend

use super::*;
use crate::ecs::components::{SpriteRenderer, TransformComponent};
use crate::ecs::{NodeKey, World};
use crate::foundation::math::{Color, Vec2};
use crate::foundation::time::FrameTime;
use std::cell::RefCell;
use std::rc::Rc;

fn sprite(layer: i32) -> SpriteRenderer {
    SpriteRenderer::new(TextureId(layer.unsigned_abs()), Vec2::new(8.0, 8.0), layer)
}

/// Root plus one sprite node per layer, updated once so every sprite is initialized
fn scene_with_layers(layers: &[i32]) -> (World, NodeKey, Vec<NodeKey>) {
    let mut world = World::default();
    let root = world.spawn();
    let nodes = layers
        .iter()
        .map(|&layer| {
            let node = world.spawn();
            world.insert(node, sprite(layer)).unwrap();
            world.add_child(root, node).unwrap();
            node
        })
        .collect();
    world.update(root, FrameTime::default()).unwrap();
    (world, root, nodes)
}

fn sprite_nodes(backend: &RecordingBackend) -> Vec<NodeKey> {
    backend.sprites().map(|sprite| sprite.node).collect()
}

/// Records its name and input, then returns a fixed output
struct TraceStage {
    name: &'static str,
    output: Option<RenderTarget>,
    log: Rc<RefCell<Vec<(&'static str, Option<RenderTarget>)>>>,
}

impl PipelineStage for TraceStage {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(
        &mut self,
        _ctx: &mut RenderContext<'_>,
        previous: Option<RenderTarget>,
    ) -> Result<Option<RenderTarget>, RenderError> {
        self.log.borrow_mut().push((self.name, previous));
        Ok(self.output)
    }
}

#[test]
fn test_layer_map_is_sorted_and_in_traversal_order() {
    let (mut world, root, nodes) = scene_with_layers(&[5, 0, 5]);
    let nested = world.spawn();
    world.insert(nested, sprite(0)).unwrap();
    world.add_child(nodes[0], nested).unwrap();
    world.update(root, FrameTime::default()).unwrap();

    let map = LayerMap::collect(&world, root);
    assert_eq!(map.layer_indices(), vec![0, 5]);
    let layer_five: Vec<_> = map.entries(5).iter().map(|e| e.node).collect();
    assert_eq!(layer_five, vec![nodes[0], nodes[2]]);
    // Pre-order: nodes[0]'s child comes before nodes[1]
    let layer_zero: Vec<_> = map.entries(0).iter().map(|e| e.node).collect();
    assert_eq!(layer_zero, vec![nested, nodes[1]]);
    assert_eq!(map.len(), 4);
}

#[test]
fn test_hidden_uninitialized_and_disabled_are_skipped() {
    let (mut world, root, nodes) = scene_with_layers(&[0, 0, 0]);
    world.get_mut::<SpriteRenderer>(nodes[0]).unwrap().hidden = true;
    world.set_enabled(nodes[1], false).unwrap();
    let fresh = world.spawn();
    world.insert(fresh, sprite(0)).unwrap();
    world.add_child(root, fresh).unwrap();

    let map = LayerMap::collect(&world, root);
    assert!(!map.contains_node(nodes[0]));
    assert!(!map.contains_node(nodes[1]));
    assert!(map.contains_node(nodes[2]));
    assert!(!map.contains_node(fresh));

    let mut pipeline = RenderPipeline::new().with_stage(LayersStage::new("all"));
    let mut backend = RecordingBackend::default();
    pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();
    assert_eq!(sprite_nodes(&backend), vec![nodes[2]]);
}

#[test]
fn test_stages_run_in_order_and_chain_outputs() {
    let mut backend = RecordingBackend::default();
    let first = backend.create_target(64, 64).unwrap();
    let second = backend.create_target(64, 64).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let stage = |name, output| TraceStage {
        name,
        output,
        log: Rc::clone(&log),
    };

    let mut pipeline = RenderPipeline::new()
        .with_stage(stage("a", Some(first)))
        .with_stage(stage("b", Some(second)))
        .with_stage(stage("c", None));
    assert_eq!(pipeline.stage_names(), vec!["a", "b", "c"]);

    let (world, root, _) = scene_with_layers(&[]);
    let stats = pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    assert_eq!(
        *log.borrow(),
        vec![("a", None), ("b", Some(first)), ("c", Some(second))]
    );
    assert_eq!(stats.stages, 3);
    assert_eq!(backend.commands().last(), Some(&DrawCommand::Present(None)));
}

#[test]
fn test_bounded_layers_stages_partition_the_map() {
    let (world, root, nodes) = scene_with_layers(&[20, 0, 10, 5, -3]);
    let mut backend = RecordingBackend::default();
    let offscreen = backend.create_target(320, 240).unwrap();

    let mut pipeline = RenderPipeline::new()
        .with_stage(LayersStage::new("world").to_target(offscreen).below(10))
        .with_stage(LayersStage::new("ui"));
    let stats = pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    assert_eq!(backend.layers_begun(), vec![-3, 0, 5, 10, 20]);
    assert_eq!(stats.layers, 5);
    assert_eq!(stats.entries, 5);
    assert_eq!(sprite_nodes(&backend), vec![nodes[4], nodes[1], nodes[3], nodes[2], nodes[0]]);

    let binds: Vec<_> = backend
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::BindTarget(target) => Some(*target),
            _ => None,
        })
        .collect();
    assert_eq!(binds, vec![Some(offscreen), None]);
}

#[test]
fn test_layer_config_is_applied_per_index() {
    let (world, root, _) = scene_with_layers(&[0, 1]);
    let mut pipeline = RenderPipeline::new().with_stage(LayersStage::new("all"));
    pipeline.set_layer_config(1, LayerConfig::default().with_sampler(SamplerMode::Linear));
    let mut backend = RecordingBackend::default();
    pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    let samplers: Vec<_> = backend
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::BeginLayer { config, .. } => Some(config.sampler),
            _ => None,
        })
        .collect();
    assert_eq!(samplers, vec![SamplerMode::Nearest, SamplerMode::Linear]);
}

#[test]
fn test_effect_stage_reads_previous_output() {
    let (world, root, _) = scene_with_layers(&[0]);
    let mut backend = RecordingBackend::default();
    let scene_target = backend.create_target(320, 240).unwrap();

    let mut pipeline = RenderPipeline::new()
        .with_stage(
            LayersStage::new("scene")
                .to_target(scene_target)
                .with_clear(Color::BLACK),
        )
        .with_stage(EffectStage::new("crt", ShaderParams::new("crt")));
    pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    let commands = backend.commands();
    assert!(commands.contains(&DrawCommand::Clear(Color::BLACK)));
    assert!(commands.contains(&DrawCommand::Fullscreen {
        source: scene_target,
        shader: "crt".to_string()
    }));
    assert_eq!(commands.last(), Some(&DrawCommand::Present(None)));
}

#[test]
fn test_effect_stage_explicit_input_wins() {
    let (world, root, _) = scene_with_layers(&[0]);
    let mut backend = RecordingBackend::default();
    let scene_target = backend.create_target(320, 240).unwrap();
    let backdrop = backend.create_target(320, 240).unwrap();
    let glow = backend.create_target(320, 240).unwrap();

    let mut pipeline = RenderPipeline::new()
        .with_stage(LayersStage::new("scene").to_target(scene_target))
        .with_stage(
            EffectStage::new("glow", ShaderParams::new("bloom").with_uniform([0.5, 0.0, 0.0, 0.0]))
                .with_input(backdrop)
                .to_target(glow),
        );
    pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    assert!(backend.commands().contains(&DrawCommand::Fullscreen {
        source: backdrop,
        shader: "bloom".to_string()
    }));
    assert_eq!(backend.commands().last(), Some(&DrawCommand::Present(Some(glow))));
}

#[test]
fn test_effect_stage_without_input_fails() {
    let (world, root, _) = scene_with_layers(&[0]);
    let mut pipeline = RenderPipeline::new().with_stage(EffectStage::new("lonely", ShaderParams::new("blur")));
    let mut backend = RecordingBackend::default();

    let err = pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap_err();
    assert_eq!(
        err,
        RenderError::MissingInput {
            stage: "lonely".to_string()
        }
    );
}

#[test]
fn test_unknown_target_is_rejected() {
    let (world, root, _) = scene_with_layers(&[0]);
    let stray = RenderTarget {
        id: 42,
        width: 1,
        height: 1,
    };
    let mut pipeline = RenderPipeline::new().with_stage(LayersStage::new("scene").to_target(stray));
    let mut backend = RecordingBackend::default();

    let err = pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap_err();
    assert_eq!(err, RenderError::UnknownTarget(42));
}

#[test]
fn test_sprite_draws_at_world_pose() {
    let mut world = World::default();
    let root = world.spawn();
    world
        .insert(root, TransformComponent::from_position(Vec2::new(100.0, 50.0)))
        .unwrap();
    let ship = world.spawn();
    world
        .insert(ship, TransformComponent::from_position(Vec2::new(4.0, -2.0)))
        .unwrap();
    world
        .insert(ship, sprite(3).with_tint(Color::rgba(1.0, 0.0, 0.0, 1.0)))
        .unwrap();
    world.add_child(root, ship).unwrap();
    world.update(root, FrameTime::default()).unwrap();

    let mut pipeline = RenderPipeline::new().with_stage(LayersStage::new("all"));
    let mut backend = RecordingBackend::default();
    pipeline
        .render(&world, root, &mut backend, FrameTime::default())
        .unwrap();

    let drawn: Vec<_> = backend.sprites().copied().collect();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].position, Vec2::new(104.0, 48.0));
    assert_eq!(drawn[0].tint, Color::rgba(1.0, 0.0, 0.0, 1.0));
    assert_eq!(drawn[0].texture, TextureId(3));
}
