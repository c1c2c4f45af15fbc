//! Scene state machine
//!
//! Title → Play on confirm, Play → GameOver on a terminal condition,
//! GameOver → Play on restart. There is no terminal state; quitting is a
//! separate signal handled by the run loop.

use serde::{Deserialize, Serialize};

/// Which update/draw routine is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scene {
    #[default]
    Title,
    Play,
    GameOver,
}

impl Scene {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Title => "title",
            Scene::Play => "play",
            Scene::GameOver => "game_over",
        }
    }
}

/// Inputs that can move the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// Confirm key on the title screen
    Confirm,
    /// Life/health exhausted, miss limit hit, snake crashed, ...
    Terminal,
    /// Restart key
    Restart,
}

impl Scene {
    /// Next scene for `event`, or `None` when the event doesn't apply here
    pub fn next(self, event: SceneEvent) -> Option<Scene> {
        match (self, event) {
            (Scene::Title, SceneEvent::Confirm) => Some(Scene::Play),
            (Scene::Play, SceneEvent::Terminal) => Some(Scene::GameOver),
            (Scene::GameOver, SceneEvent::Restart) => Some(Scene::Play),
            _ => None,
        }
    }
}

/// Scene plus bookkeeping: how long the current scene has been active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMachine {
    pub scene: Scene,
    /// Frames spent in the current scene
    pub frames_in_scene: u64,
    pub transitions: u32,
    label: String,
}

impl SceneMachine {
    pub fn new(label: &str, initial: Scene) -> Self {
        Self {
            scene: initial,
            frames_in_scene: 0,
            transitions: 0,
            label: label.to_string(),
        }
    }

    pub fn is(&self, scene: Scene) -> bool {
        self.scene == scene
    }

    /// Advance the per-scene frame counter
    pub fn tick(&mut self) {
        self.frames_in_scene += 1;
    }

    /// Apply an event. Returns the new scene when a transition happened.
    pub fn fire(&mut self, event: SceneEvent) -> Option<Scene> {
        let next = self.scene.next(event)?;
        log::info!(
            "{}: {} -> {}",
            self.label,
            self.scene.as_str(),
            next.as_str()
        );
        self.scene = next;
        self.frames_in_scene = 0;
        self.transitions += 1;
        Some(next)
    }
}
