//! Sketch pad
//!
//! Space stamps a random circle at the pointer. Z works the line tool: the
//! first press anchors a line that follows the pointer, the next press pins
//! it down. Pinned lines accumulate until the line cap drops the oldest.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde_json::json;

use super::seeded_rng;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::{EntityKind, EntityPool, EvictionPolicy, Spawn};

pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 200;
pub const FPS: u32 = 30;

const MIN_STAMP_RADIUS: u32 = 5;
const MAX_STAMP_RADIUS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone)]
pub struct Sketch {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    /// Oldest stamp goes first once the pool is full
    pub stamps: EntityPool,
    /// Z presses so far; odd means a line is being dragged
    pub line_presses: u32,
    pub anchor: Vec2,
    /// Pinned lines, oldest first
    pub committed: Vec<Segment>,
    pub lines_evicted: u32,
}

impl Sketch {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            settings: settings.clone(),
            seed,
            rng: seeded_rng(seed),
            stamps: EntityPool::new("stamp", settings.sketch.stamp_cap, EvictionPolicy::DropOldest),
            line_presses: 0,
            anchor: Vec2::ZERO,
            committed: Vec::new(),
            lines_evicted: 0,
        }
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    pub fn line_active(&self) -> bool {
        self.line_presses % 2 == 1
    }

    pub fn stamp(&mut self, at: Vec2) {
        let radius = self.rng.random_range(MIN_STAMP_RADIUS..=MAX_STAMP_RADIUS) as f32;
        let color = self.rng.random_range(0..palette::COUNT);
        self.stamps
            .spawn(Spawn::circle(EntityKind::Stamp, at, Vec2::ZERO, radius, color));
    }

    pub fn toggle_line(&mut self, at: Vec2) {
        self.line_presses += 1;
        if self.line_active() {
            self.anchor = at;
            return;
        }

        if self.committed.len() >= self.settings.sketch.line_cap {
            self.committed.remove(0);
            self.lines_evicted += 1;
        }
        self.committed.push(Segment { from: self.anchor, to: at });
        log::debug!("sketch: line {:?} -> {:?}", self.anchor, at);
    }
}

impl Demo for Sketch {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Sketch",
        }
    }

    fn update(&mut self, ctx: &FrameContext, _out: &mut FrameOutput) {
        let pointer = ctx.input.pointer;
        if ctx.input.just_pressed(Key::Space) {
            self.stamp(pointer);
        }
        if ctx.input.just_pressed(Key::Z) {
            self.toggle_line(pointer);
        }
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::WHITE);
        for stamp in self.stamps.iter() {
            canvas.circ(stamp.pos.x, stamp.pos.y, stamp.radius(), stamp.color);
        }
        for seg in &self.committed {
            canvas.line(seg.from.x, seg.from.y, seg.to.x, seg.to.y, palette::BLACK);
        }
        if self.line_active() {
            let to = ctx.input.pointer;
            canvas.line(self.anchor.x, self.anchor.y, to.x, to.y, palette::BLACK);
        }
    }

    /// Pointer traces a Lissajous curve; stamps and line presses on a beat
    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        let t = ctx.frame as f32 * 0.05;
        let center = ctx.center();
        let mut state = InputState::at(
            center.x + (t * 3.0).sin() * center.x * 0.8,
            center.y + (t * 2.0).sin() * center.y * 0.8,
        );
        if ctx.frame % 10 == 0 {
            state = state.hold(Key::Space);
        }
        if ctx.frame % 45 == 0 {
            state = state.hold(Key::Z);
        }
        state
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "stamps": self.stamps.len(),
            "stamps_evicted": self.stamps.evicted,
            "line_presses": self.line_presses,
            "line_active": self.line_active(),
            "lines": self.committed.len(),
            "lines_evicted": self.lines_evicted,
            "last_line": self.committed.last().map(|s| [s.from.x, s.from.y, s.to.x, s.to.y]),
        })
    }
}
