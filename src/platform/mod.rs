//! Platform abstraction layer
//!
//! The per-frame callback contract with the presentation engine:
//! - Input sampling (held / just-pressed edges)
//! - Frame clock (fixed-timestep accumulator)
//! - The `Demo` trait (`update` then `draw`, once per tick)
//! - The run loop driver and its input sources

pub mod clock;
pub mod input;
pub mod runner;

pub use clock::FrameClock;
pub use input::{InputSnapshot, InputState, InputTracker, Key, KeySet};
pub use runner::{Autopilot, InputSource, RunStats, Runner, ScriptedInput};

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::renderer::Canvas;

/// Screen and timing requested by a demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub title: &'static str,
}

/// Everything update/draw may read about the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    pub width: f32,
    pub height: f32,
    /// Index of the tick being processed
    pub frame: u64,
    pub input: InputSnapshot,
}

impl FrameContext {
    pub fn new(width: f32, height: f32, frame: u64, input: InputSnapshot) -> Self {
        Self {
            width,
            height,
            frame,
            input,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Side effects an update requests from the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub sounds: Vec<SoundEffect>,
    /// Explicit quit; the loop stops before drawing
    pub quit: bool,
}

impl FrameOutput {
    pub fn play(&mut self, effect: SoundEffect) {
        self.sounds.push(effect);
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }
}

/// A self-contained demo driven by the run loop
pub trait Demo {
    fn screen(&self) -> ScreenConfig;

    /// Advance all game state by one tick
    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput);

    /// Issue this tick's drawing primitives; read-only
    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas);

    /// A plausible input sample for unattended runs
    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        InputState {
            pointer: ctx.center(),
            ..InputState::default()
        }
    }

    /// Counters worth reporting at the end of a run
    fn summary(&self) -> serde_json::Value;
}
