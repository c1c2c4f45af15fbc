//! Presenter draw
//!
//! Title → drawing → result. While drawing, the displayed name is reshuffled
//! at a cadence that slows as the draw runs out; the result screen shows the
//! pick with a halo. The draw length is counted in frames, not wall time.

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde_json::json;

use super::seeded_rng;
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::shapes::halo_text;
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::{Scene, SceneEvent, SceneMachine};

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 300;
pub const FPS: u32 = 30;

/// Halo layers behind the winning name, outermost first
const HALO: [(i32, u8); 2] = [(3, palette::NAVY), (2, palette::DARK_BLUE)];

/// Lottery state. `Scene::Title` is the start screen, `Scene::Play` the
/// running draw and `Scene::GameOver` the result.
#[derive(Debug, Clone)]
pub struct Lottery {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub scene: SceneMachine,
    /// Runs across draws; drives the shuffle cadence and the color bars
    pub animation_frame: u64,
    pub displayed: Option<String>,
    pub selected: Option<String>,
    /// Every pick so far, oldest first
    pub history: Vec<String>,
}

impl Lottery {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            settings: settings.clone(),
            seed,
            rng: seeded_rng(seed),
            scene: SceneMachine::new("lottery", Scene::Title),
            animation_frame: 0,
            displayed: None,
            selected: None,
            history: Vec::new(),
        }
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    /// Length of one draw in frames
    pub fn draw_frames(&self) -> u64 {
        (self.settings.lottery.draw_seconds * FPS as f32).round().max(1.0) as u64
    }

    /// Frames between reshuffles `elapsed` seconds into the draw
    pub fn shuffle_period(elapsed: f32) -> u64 {
        (10.0 - elapsed * 3.0).max(1.0) as u64
    }

    fn pick(&mut self) -> Option<String> {
        self.settings.lottery.names.choose(&mut self.rng).cloned()
    }

    fn start_draw(&mut self, out: &mut FrameOutput) {
        self.displayed = None;
        out.play(SoundEffect::DrawStart);
        log::debug!("lottery: draw {} started", self.history.len() + 1);
    }

    fn update_draw(&mut self, out: &mut FrameOutput) {
        self.animation_frame += 1;

        let frames = self.scene.frames_in_scene;
        if frames < self.draw_frames() {
            let elapsed = frames as f32 / FPS as f32;
            if self.animation_frame % Self::shuffle_period(elapsed) == 0 {
                self.displayed = self.pick();
            }
            return;
        }

        self.selected = self.pick();
        self.displayed = self.selected.clone();
        if let Some(name) = &self.selected {
            log::info!("lottery: selected {}", name);
            self.history.push(name.clone());
        }
        out.play(SoundEffect::DrawResult);
        self.scene.fire(SceneEvent::Terminal);
    }

    fn draw_running(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.text(180.0, 100.0, "Drawing...", palette::YELLOW);
        if let Some(name) = &self.displayed {
            canvas.text(center_text_x(name, ctx.width), 140.0, name, palette::WHITE);
        }
        for i in 0..5u64 {
            let col = ((self.animation_frame + i) % palette::COUNT as u64) as u8;
            let y = 200 + (self.animation_frame + i * 10) % 20;
            canvas.rect(50.0 + i as f32 * 60.0, y as f32, 40.0, 20.0, col);
        }
    }

    fn draw_result(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.text(150.0, 80.0, "Selected Presenter:", palette::YELLOW);
        let name = self.selected.as_deref().unwrap_or("(no names)");
        halo_text(canvas, center_text_x(name, ctx.width), 120.0, name, &HALO, palette::LIME);
        canvas.text(100.0, 180.0, "Press ENTER for next", palette::LIGHT_BLUE);
        canvas.text(120.0, 200.0, "Press ESC to exit", palette::LIGHT_BLUE);
    }
}

impl Demo for Lottery {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Presentation Lottery",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.scene.tick();
        let enter = ctx.input.just_pressed(Key::Enter);

        match self.scene.scene {
            Scene::Title => {
                if enter && self.scene.fire(SceneEvent::Confirm).is_some() {
                    self.start_draw(out);
                }
            }
            Scene::Play => self.update_draw(out),
            Scene::GameOver => {
                if enter && self.scene.fire(SceneEvent::Restart).is_some() {
                    self.start_draw(out);
                } else if ctx.input.just_pressed(Key::Escape) {
                    out.quit();
                }
            }
        }
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::BLACK);
        match self.scene.scene {
            Scene::Title => {
                canvas.text(140.0, 120.0, "Lottery starts", palette::WHITE);
                canvas.text(130.0, 150.0, "Press ENTER to start", palette::LIGHT_BLUE);
            }
            Scene::Play => self.draw_running(ctx, canvas),
            Scene::GameOver => self.draw_result(ctx, canvas),
        }
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        let state = InputState::at(ctx.width / 2.0, ctx.height / 2.0);
        let waited = self.scene.frames_in_scene >= 15;
        let idle = matches!(self.scene.scene, Scene::Title | Scene::GameOver);
        if idle && waited && ctx.frame % 2 == 0 {
            state.hold(Key::Enter)
        } else {
            state
        }
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "selected": self.selected,
            "draws": self.history.len(),
            "history": self.history,
        })
    }
}
