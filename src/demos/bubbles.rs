//! Bouncing bubbles
//!
//! Bubbles drift and bounce off all four walls. Overlapping bubbles merge
//! into one with the combined area; clicking a bubble bursts it into a ring
//! of smaller ones.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde_json::json;

use super::{blink, seeded_rng};
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::{Boundary, Bounds, EntityKind, EntityPool, PairOutcome, Spawn, contains_point};

pub const WIDTH: u32 = 256;
pub const HEIGHT: u32 = 256;
pub const FPS: u32 = 30;

const HINT: &str = "CLICK ON BUBBLE";

#[derive(Debug, Clone)]
pub struct Bubbles {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub bubbles: EntityPool,
    pub bounds: Bounds,
    /// Set by the first burst; hides the hint
    pub burst_once: bool,
    pub merges: u32,
    pub bursts: u32,
}

impl Bubbles {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let bounds = Bounds::screen(WIDTH as f32, HEIGHT as f32);
        let mut bubbles = EntityPool::new("bubble", settings.entity_cap, settings.eviction);
        for _ in 0..settings.bubbles.count {
            bubbles.spawn(Self::random_bubble(&mut rng, settings, &bounds));
        }

        Self {
            settings: settings.clone(),
            seed,
            rng,
            bubbles,
            bounds,
            burst_once: false,
            merges: 0,
            bursts: 0,
        }
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    fn random_bubble(rng: &mut Pcg32, settings: &Settings, bounds: &Bounds) -> Spawn {
        let tuning = &settings.bubbles;
        let fits = bounds.width().min(bounds.height()) / 2.0;
        let r = sample_span(rng, tuning.min_radius, tuning.max_radius).min(fits);
        let pos = Vec2::new(
            sample_span(rng, r, bounds.width() - r),
            sample_span(rng, r, bounds.height() - r),
        );
        let speed = tuning.max_speed;
        let vel = if speed > 0.0 {
            Vec2::new(rng.random_range(-speed..speed), rng.random_range(-speed..speed))
        } else {
            Vec2::ZERO
        };
        let color = rng.random_range(1..palette::COUNT);
        Spawn::circle(EntityKind::Bubble, pos, vel, r, color)
    }

    /// Burst the newest bubble under `point`. Returns true if one burst.
    pub fn burst_at(&mut self, point: Vec2) -> bool {
        let Some(target) = self
            .bubbles
            .iter()
            .filter(|b| contains_point(b, point))
            .last()
            .map(|b| b.id)
        else {
            return false;
        };

        let pieces = self.settings.bubbles.burst_pieces;
        let children = self.bubbles.split(target, pieces, self.settings.bubbles.max_speed);
        log::debug!("bubbles: burst {} into {} pieces", target, children.len());
        self.burst_once = true;
        self.bursts += 1;
        true
    }

    /// Move every bubble, then merge overlapping pairs
    pub fn step(&mut self) -> usize {
        self.bubbles.step_all(1.0, &Boundary::BOX, &self.bounds);
        let merged = self.bubbles.resolve_collisions(|_, _| PairOutcome::Merge).len();
        self.merges += merged as u32;
        merged
    }
}

/// Uniform pick from `lo..hi`, or `lo` when the span is empty
fn sample_span(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

impl Demo for Bubbles {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Bubbles",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        // A burst skips merging for the frame
        if ctx.input.just_pressed(Key::MouseLeft) && self.burst_at(ctx.input.pointer) {
            out.play(SoundEffect::Explosion);
            return;
        }
        self.step();
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::BLACK);
        for bubble in self.bubbles.iter() {
            canvas.circ(bubble.pos.x, bubble.pos.y, bubble.radius(), bubble.color);
        }

        let visible = self.settings.reduced_motion || blink(ctx.frame, 10);
        if !self.burst_once && visible {
            let col = (ctx.frame % 15 + 1) as u8;
            canvas.text(center_text_x(HINT, ctx.width), 50.0, HINT, col);
        }
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        // Click the biggest bubble once a second
        let target = self
            .bubbles
            .iter()
            .max_by(|a, b| a.radius().total_cmp(&b.radius()))
            .map_or(ctx.center(), |b| b.pos);
        let mut state = InputState::at(target.x, target.y);
        if ctx.frame % 30 == 0 {
            state = state.hold(Key::MouseLeft);
        }
        state
    }

    fn summary(&self) -> serde_json::Value {
        let area: f32 = self.bubbles.iter().map(|b| b.radius() * b.radius()).sum();
        json!({
            "bubbles": self.bubbles.len(),
            "merges": self.merges,
            "bursts": self.bursts,
            "total_r2": area,
            "evicted": self.bubbles.evicted,
            "refused": self.bubbles.refused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::InputTracker;
    use crate::renderer::CommandBuffer;

    fn total_area(game: &Bubbles) -> f32 {
        game.bubbles.iter().map(|b| b.radius() * b.radius()).sum()
    }

    #[test]
    fn test_initial_bubbles_are_inside() {
        let game = Bubbles::new(&Settings::default(), 4);
        assert_eq!(game.bubbles.len(), 50);
        for b in game.bubbles.iter() {
            let r = b.radius();
            assert!((3.0..10.0).contains(&r));
            assert!(b.pos.x >= r && b.pos.x <= 256.0 - r);
            assert!(b.color >= 1 && b.color < 16);
        }
    }

    #[test]
    fn test_oversized_radius_is_clamped_to_field() {
        let mut settings = Settings::default();
        settings.bubbles.min_radius = 150.0;
        settings.bubbles.max_radius = 200.0;
        settings.bubbles.count = 3;
        let game = Bubbles::new(&settings, 9);
        assert_eq!(game.bubbles.len(), 3);
        for b in game.bubbles.iter() {
            assert!(b.radius() <= 128.0);
            assert!(b.pos.cmpge(Vec2::splat(b.radius())).all());
            assert!(b.pos.cmple(Vec2::splat(256.0 - b.radius())).all());
        }
    }

    #[test]
    fn test_merging_conserves_area() {
        let mut game = Bubbles::new(&Settings::default(), 11);
        let before = total_area(&game);
        for _ in 0..200 {
            game.step();
        }
        assert!(game.merges > 0);
        assert!(game.bubbles.len() < 50);
        assert!((total_area(&game) - before).abs() < before * 1e-3);
    }

    #[test]
    fn test_click_bursts_and_skips_merge() {
        let mut settings = Settings::default();
        settings.bubbles.count = 0;
        let mut game = Bubbles::new(&settings, 1);
        game.bubbles
            .spawn(Spawn::circle(EntityKind::Bubble, Vec2::new(128.0, 128.0), Vec2::ZERO, 10.0, 5));

        let mut tracker = InputTracker::new();
        let input = tracker.sample(InputState::at(129.0, 128.0).hold(Key::MouseLeft));
        let ctx = FrameContext::new(256.0, 256.0, 0, input);
        let mut out = FrameOutput::default();
        game.update(&ctx, &mut out);

        assert_eq!(game.bubbles.len(), 11);
        assert!(game.burst_once);
        assert_eq!(out.sounds, vec![SoundEffect::Explosion]);
        assert!((total_area(&game) - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_click_on_empty_space_does_nothing() {
        let mut settings = Settings::default();
        settings.bubbles.count = 0;
        let mut game = Bubbles::new(&settings, 1);
        assert!(!game.burst_at(Vec2::new(10.0, 10.0)));
        assert!(!game.burst_once);
    }

    #[test]
    fn test_hint_blinks_until_first_burst() {
        let mut game = Bubbles::new(&Settings::default(), 2);
        let mut buf = CommandBuffer::new();
        let ctx = |frame| FrameContext::new(256.0, 256.0, frame, Default::default());

        game.draw(&ctx(0), &mut buf);
        assert!(buf.has_text(HINT));
        buf.begin_frame();
        game.draw(&ctx(10), &mut buf);
        assert!(!buf.has_text(HINT));

        game.burst_once = true;
        buf.begin_frame();
        game.draw(&ctx(0), &mut buf);
        assert!(!buf.has_text(HINT));
    }
}
