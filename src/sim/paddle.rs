//! Paddle/player controller and edge-triggered firing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, Owner, Spawn};
use crate::renderer::{Color, palette};

/// Projectile dimensions (thin vertical bolt)
pub const BULLET_SIZE: Vec2 = Vec2::new(2.0, 8.0);

/// A horizontal paddle; `x` is the left edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Width restored on level-up
    pub base_width: f32,
    /// Narrowest the paddle may shrink to
    pub min_width: f32,
}

impl Paddle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            base_width: width,
            min_width: width / 2.0,
        }
    }

    /// Center the paddle on the pointer, bounded to `[0, screen_width - width]`
    pub fn follow_pointer(&mut self, pointer_x: f32, screen_width: f32) -> f32 {
        self.x = pointer_x - self.width / 2.0;
        self.clamp_to(screen_width)
    }

    /// Move by `dx` (key-driven), bounded like `follow_pointer`
    pub fn steer(&mut self, dx: f32, screen_width: f32) -> f32 {
        self.x += dx;
        self.clamp_to(screen_width)
    }

    fn clamp_to(&mut self, screen_width: f32) -> f32 {
        self.x = self.x.clamp(0.0, (screen_width - self.width).max(0.0));
        self.x
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Whether a point at horizontal position `x` lands on the paddle
    pub fn covers(&self, x: f32) -> bool {
        x >= self.x && x <= self.x + self.width
    }

    /// Narrow the paddle by `step`, keeping its center. Returns the new width.
    pub fn shrink(&mut self, step: f32) -> f32 {
        let center = self.center_x();
        self.width = (self.width - step).max(self.min_width);
        self.x = center - self.width / 2.0;
        self.width
    }

    pub fn restore_width(&mut self) {
        let center = self.center_x();
        self.width = self.base_width;
        self.x = center - self.width / 2.0;
    }

    /// Fire a bullet from the paddle's center if `fire` allows it this frame
    pub fn try_fire(&self, fire: &mut FireControl, held: bool, frame: u64, speed: f32) -> Option<Spawn> {
        fire.trigger(held, frame).then(|| {
            bullet(
                Vec2::new(self.center_x(), self.y - BULLET_SIZE.y / 2.0),
                Vec2::new(0.0, -speed),
                Owner::Player,
                palette::WHITE,
            )
        })
    }
}

/// Build a projectile spawn
pub fn bullet(pos: Vec2, vel: Vec2, owner: Owner, color: Color) -> Spawn {
    Spawn::rect(EntityKind::Bullet { owner }, pos, vel, BULLET_SIZE, color)
}

/// Edge detection plus cooldown for a fire button
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FireControl {
    /// Minimum frames between shots
    pub cooldown: u32,
    /// Button state on the previous sample
    pub was_held: bool,
    pub last_shot: Option<u64>,
}

impl FireControl {
    pub fn new(cooldown: u32) -> Self {
        Self {
            cooldown,
            was_held: false,
            last_shot: None,
        }
    }

    /// Feed this frame's button state. True only on a not-held → held
    /// transition once the cooldown has elapsed.
    pub fn trigger(&mut self, held: bool, frame: u64) -> bool {
        let pressed = held && !self.was_held;
        self.was_held = held;
        if !pressed || !self.ready(frame) {
            return false;
        }
        self.last_shot = Some(frame);
        true
    }

    /// Whether the cooldown has elapsed at `frame`
    pub fn ready(&self, frame: u64) -> bool {
        self.last_shot
            .is_none_or(|last| frame.saturating_sub(last) >= self.cooldown as u64)
    }

    pub fn reset(&mut self) {
        self.was_held = false;
        self.last_shot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_follow_pointer_clamps() {
        let mut paddle = Paddle::new(80.0, 190.0, 40.0, 5.0);
        assert_eq!(paddle.follow_pointer(100.0, 200.0), 80.0);
        assert_eq!(paddle.follow_pointer(5.0, 200.0), 0.0);
        assert_eq!(paddle.follow_pointer(199.0, 200.0), 160.0);
    }

    #[test]
    fn test_covers_inclusive_span() {
        let paddle = Paddle::new(80.0, 190.0, 40.0, 5.0);
        assert!(paddle.covers(80.0));
        assert!(paddle.covers(100.0));
        assert!(paddle.covers(120.0));
        assert!(!paddle.covers(120.5));
        assert!(!paddle.covers(79.0));
    }

    #[test]
    fn test_shrink_floors_at_min_width() {
        let mut paddle = Paddle::new(80.0, 190.0, 40.0, 5.0);
        assert_eq!(paddle.shrink(10.0), 30.0);
        assert_eq!(paddle.center_x(), 100.0);
        assert_eq!(paddle.shrink(10.0), 20.0);
        assert_eq!(paddle.shrink(10.0), 20.0);
        paddle.restore_width();
        assert_eq!(paddle.width, 40.0);
    }

    #[test]
    fn test_held_key_fires_once() {
        let mut fire = FireControl::new(0);
        let shots = (0..30).filter(|&frame| fire.trigger(true, frame)).count();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_cooldown_blocks_rapid_presses() {
        let mut fire = FireControl::new(5);
        assert!(fire.trigger(true, 0));
        assert!(!fire.trigger(false, 1));
        // Fresh press but still cooling down
        assert!(!fire.trigger(true, 2));
        assert!(!fire.trigger(false, 3));
        assert!(fire.trigger(true, 5));
    }

    #[test]
    fn test_try_fire_spawns_from_center() {
        let paddle = Paddle::new(80.0, 190.0, 40.0, 5.0);
        let mut fire = FireControl::new(3);
        let shot = paddle.try_fire(&mut fire, true, 0, 6.0).unwrap();
        assert_eq!(shot.pos, Vec2::new(100.0, 186.0));
        assert_eq!(shot.vel, Vec2::new(0.0, -6.0));
        assert!(paddle.try_fire(&mut fire, true, 1, 6.0).is_none());
    }

    proptest! {
        #[test]
        fn shots_never_exceed_presses_or_cooldown(held in prop::collection::vec(any::<bool>(), 1..200),
                                                  cooldown in 1u32..20) {
            let mut fire = FireControl::new(cooldown);
            let mut last: Option<u64> = None;
            let mut shots = 0usize;
            let mut presses = 0usize;
            let mut prev = false;
            for (frame, &h) in held.iter().enumerate() {
                if h && !prev {
                    presses += 1;
                }
                prev = h;
                if fire.trigger(h, frame as u64) {
                    shots += 1;
                    if let Some(l) = last {
                        prop_assert!(frame as u64 - l >= cooldown as u64);
                    }
                    last = Some(frame as u64);
                }
            }
            prop_assert!(shots <= presses);
            prop_assert!(shots <= held.len() / cooldown as usize + 1);
        }

        #[test]
        fn continuous_hold_fires_at_most_once(frames in 1usize..500, cooldown in 0u32..30) {
            let mut fire = FireControl::new(cooldown);
            let shots = (0..frames as u64).filter(|&f| fire.trigger(true, f)).count();
            prop_assert!(shots <= 1);
        }
    }
}
