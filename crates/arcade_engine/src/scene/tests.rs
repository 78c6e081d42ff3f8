//! Scene lifecycle and scene switching

use super::*;
use crate::config::EngineConfig;
use crate::ecs::components::{SpriteRenderer, TransformComponent};
use crate::ecs::{ComponentRegistry, NodeKey, SceneError, World};
use crate::foundation::math::Vec2;
use crate::render::{LayersStage, RecordingBackend, RenderPipeline, TextureId};
use std::cell::Cell;
use std::rc::Rc;

/// Lifecycle trace shared through the session
#[derive(Debug, Default)]
struct Journal(Vec<String>);

#[derive(Debug, Default, PartialEq)]
struct Score(u32);

struct Level {
    label: &'static str,
    points_on_exit: u32,
}

impl SceneHooks for Level {
    fn on_enter(&mut self, world: &mut World, root: NodeKey, session: &mut Session) -> Result<(), SceneError> {
        session.get_or_default::<Journal>().0.push(format!("enter {}", self.label));
        let player = world.spawn_named("player");
        world.insert(player, TransformComponent::from_position(Vec2::new(8.0, 8.0)))?;
        world.insert(player, SpriteRenderer::new(TextureId(1), Vec2::new(16.0, 16.0), 0))?;
        world.add_child(root, player)
    }

    fn on_exit(&mut self, _world: &mut World, _root: NodeKey, session: &mut Session) -> Result<(), SceneError> {
        session.get_or_default::<Journal>().0.push(format!("exit {}", self.label));
        session.get_or_default::<Score>().0 += self.points_on_exit;
        Ok(())
    }
}

fn level(name: &str, label: &'static str) -> Scene {
    Scene::new(name, Rc::new(ComponentRegistry::new()), &EngineConfig::default()).with_hooks(Level {
        label,
        points_on_exit: 10,
    })
}

/// Hooks whose enter or exit can be made to fail on demand
struct Fragile {
    fail_enter: bool,
    fail_exit: Rc<Cell<bool>>,
}

impl SceneHooks for Fragile {
    fn on_enter(&mut self, _world: &mut World, _root: NodeKey, _session: &mut Session) -> Result<(), SceneError> {
        if self.fail_enter {
            return Err(hook_error("enter failed"));
        }
        Ok(())
    }

    fn on_exit(&mut self, _world: &mut World, _root: NodeKey, _session: &mut Session) -> Result<(), SceneError> {
        if self.fail_exit.get() {
            return Err(hook_error("exit failed"));
        }
        Ok(())
    }
}

fn hook_error(message: &str) -> SceneError {
    SceneError::Component {
        component: "Fragile",
        message: message.to_string(),
    }
}

fn fragile(name: &str, fail_enter: bool, fail_exit: &Rc<Cell<bool>>) -> Scene {
    Scene::new(name, Rc::new(ComponentRegistry::new()), &EngineConfig::default()).with_hooks(Fragile {
        fail_enter,
        fail_exit: Rc::clone(fail_exit),
    })
}

fn journal(manager: &SceneManager) -> Vec<String> {
    manager
        .session()
        .get::<Journal>()
        .map(|journal| journal.0.clone())
        .unwrap_or_default()
}

#[test]
fn test_root_is_named_after_scene() {
    let scene = level("title", "title");
    assert_eq!(scene.world().name(scene.root()), Some("title"));
    assert_eq!(scene.find(""), Some(scene.root()));
    assert!(!scene.is_entered());
}

#[test]
fn test_enter_builds_tree_committed_on_first_step() {
    let mut session = Session::new();
    let mut scene = level("stage1", "one");
    scene.enter(&mut session).unwrap();
    assert!(scene.is_entered());
    assert_eq!(scene.find("player"), None);

    scene.step(0.5).unwrap();
    let player = scene.find("player").unwrap();
    assert_eq!(scene.world().path(player).as_deref(), Some("stage1/player"));
    assert_eq!(scene.time().frame, 1);

    scene.step(0.25).unwrap();
    assert_eq!(scene.time().frame, 2);
    assert!((scene.time().elapsed - 0.75).abs() < 1e-9);
}

#[test]
fn test_step_commits_destroyed_nodes() {
    let mut session = Session::new();
    let mut scene = level("stage1", "one");
    scene.enter(&mut session).unwrap();
    scene.step(0.1).unwrap();

    let player = scene.find("player").unwrap();
    scene.world_mut().destroy(player).unwrap();
    assert!(scene.world().contains(player));
    scene.step(0.1).unwrap();
    assert!(!scene.world().contains(player));
    assert_eq!(scene.find("player"), None);
}

#[test]
fn test_reenter_resets_clock() {
    let mut session = Session::new();
    let mut scene = Scene::new("plain", Rc::new(ComponentRegistry::new()), &EngineConfig::default());
    scene.enter(&mut session).unwrap();
    scene.step(1.0).unwrap();
    scene.exit(&mut session).unwrap();
    assert!(!scene.is_entered());

    scene.enter(&mut session).unwrap();
    assert_eq!(scene.time().frame, 0);
}

#[test]
fn test_scene_change_is_deferred_to_next_step() {
    let mut manager = SceneManager::new(RenderPipeline::new());
    manager.change_scene(level("first", "first"));
    assert!(manager.current().is_none());
    assert!(manager.has_pending_change());

    manager.step(0.1).unwrap();
    assert_eq!(manager.current().map(Scene::name), Some("first"));

    manager.change_scene(level("second", "second"));
    assert_eq!(manager.current().map(Scene::name), Some("first"));

    manager.step(0.1).unwrap();
    assert_eq!(manager.current().map(Scene::name), Some("second"));
    assert_eq!(journal(&manager), vec!["enter first", "exit first", "enter second"]);
}

#[test]
fn test_superseded_change_never_enters() {
    let mut manager = SceneManager::new(RenderPipeline::new());
    manager.change_scene(level("first", "first"));
    manager.change_scene(level("second", "second"));
    manager.step(0.1).unwrap();

    assert_eq!(journal(&manager), vec!["enter second"]);
}

#[test]
fn test_session_outlives_scenes() {
    let mut manager = SceneManager::new(RenderPipeline::new());
    manager.session_mut().insert(Score(5));
    manager.change_scene(level("first", "first"));
    manager.step(0.1).unwrap();
    manager.change_scene(level("second", "second"));
    manager.step(0.1).unwrap();

    assert_eq!(manager.session().get::<Score>(), Some(&Score(15)));
}

#[test]
fn test_render_without_scene_is_a_no_op() {
    let mut manager = SceneManager::new(RenderPipeline::new().with_stage(LayersStage::new("all")));
    let mut backend = RecordingBackend::default();

    assert_eq!(manager.render(&mut backend).unwrap(), None);
    assert!(backend.commands().is_empty());
}

#[test]
fn test_step_then_render_draws_current_scene() {
    let mut manager = SceneManager::new(RenderPipeline::new().with_stage(LayersStage::new("all")));
    manager.change_scene(level("first", "first"));
    let mut backend = RecordingBackend::default();

    manager.step(1.0 / 60.0).unwrap();
    let stats = manager.render(&mut backend).unwrap().unwrap();

    assert_eq!(stats.entries, 1);
    let drawn: Vec<_> = backend.sprites().map(|sprite| sprite.position).collect();
    assert_eq!(drawn, vec![Vec2::new(8.0, 8.0)]);
}

#[test]
fn test_failed_exit_keeps_current_and_retries() {
    let stuck = Rc::new(Cell::new(true));
    let mut manager = SceneManager::new(RenderPipeline::new());
    manager.change_scene(fragile("a", false, &stuck));
    manager.step(0.1).unwrap();

    manager.change_scene(level("b", "b"));
    let err = manager.step(0.1).unwrap_err();
    assert_eq!(err, hook_error("exit failed"));
    assert_eq!(manager.current().map(Scene::name), Some("a"));
    assert!(manager.current().is_some_and(Scene::is_entered));
    assert!(manager.has_pending_change());

    stuck.set(false);
    manager.step(0.1).unwrap();
    assert_eq!(manager.current().map(Scene::name), Some("b"));
    assert!(!manager.has_pending_change());
    assert_eq!(journal(&manager), vec!["enter b"]);
}

#[test]
fn test_failed_enter_still_installs_scene() {
    let calm = Rc::new(Cell::new(false));
    let mut manager = SceneManager::new(RenderPipeline::new());
    manager.change_scene(level("a", "a"));
    manager.step(0.1).unwrap();

    manager.change_scene(fragile("b", true, &calm));
    let err = manager.step(0.1).unwrap_err();
    assert_eq!(err, hook_error("enter failed"));

    let current = manager.current().unwrap();
    assert_eq!(current.name(), "b");
    assert!(!current.is_entered());
    assert!(!manager.has_pending_change());
    assert_eq!(journal(&manager), vec!["enter a", "exit a"]);
}
