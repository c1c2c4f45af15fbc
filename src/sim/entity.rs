//! Entity types
//!
//! Every independently simulated object (ball, bubble, bullet, enemy,
//! particle, ...) is an `Entity`: shared kinematic fields plus a tagged
//! `EntityKind` carrying the per-kind data.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::renderer::{Color, palette};

/// Stable entity identifier; ids grow monotonically in spawn order
pub type EntityId = u32;

/// Collision/bounding shape, centered on the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn rect(w: f32, h: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(w / 2.0, h / 2.0),
        }
    }

    /// Half extents of the axis-aligned bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { half } => half,
        }
    }

    /// Circle radius, or the bounding radius of a rect
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect { half } => half.length(),
        }
    }
}

/// Catch-game ball variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallVariant {
    #[default]
    Normal,
    Bonus,
    Penalty,
}

impl BallVariant {
    /// Roll a variant from a 1..=100 draw
    pub fn roll(rng: &mut impl Rng, bonus_chance: u32, penalty_chance: u32) -> Self {
        let r = rng.random_range(1..=100u32);
        if r <= bonus_chance {
            BallVariant::Bonus
        } else if r > 100 - penalty_chance {
            BallVariant::Penalty
        } else {
            BallVariant::Normal
        }
    }

    /// Score after catching a ball of this variant
    pub fn apply(self, score: u32) -> u32 {
        match self {
            BallVariant::Normal => score + 1,
            BallVariant::Bonus => score + 3,
            BallVariant::Penalty => score.saturating_sub(1),
        }
    }

    pub fn color(self) -> Color {
        match self {
            BallVariant::Normal => palette::LIGHT_BLUE,
            BallVariant::Bonus => palette::YELLOW,
            BallVariant::Penalty => palette::RED,
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Enemy movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyPattern {
    /// Constant velocity
    Straight,
    /// Horizontal sway driven by the vertical position
    Sine,
    /// Horizontal sway driven by an advancing phase angle
    Spiral,
}

impl EnemyPattern {
    pub const ALL: [EnemyPattern; 3] = [EnemyPattern::Straight, EnemyPattern::Sine, EnemyPattern::Spiral];
}

/// Per-kind entity data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Falling ball in the paddle game
    Ball { variant: BallVariant },
    /// Bouncing, merging bubble
    Bubble,
    Bullet { owner: Owner },
    Enemy { pattern: EnemyPattern, phase: f32 },
    /// Formation alien (moved as a group)
    Invader,
    PowerUp { spin: f32 },
    /// Short-lived spark with gravity
    Particle { life: u32, max_life: u32 },
    /// Expanding blast ring
    Explosion { life: u32 },
    /// Background star; speed is the velocity
    Star,
    /// Circle stamped by the sketch tool
    Stamp,
    /// Gravity-driven player of the jump game
    Jumper,
    /// Scrolling platform; sinks once stomped
    Floor { solid: bool },
    /// Background cloud puff
    Cloud,
}

/// Everything needed to create an entity; the pool assigns the id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    pub color: Color,
}

impl Spawn {
    pub fn circle(kind: EntityKind, pos: Vec2, vel: Vec2, radius: f32, color: Color) -> Self {
        Self {
            kind,
            pos,
            vel,
            shape: Shape::circle(radius),
            color,
        }
    }

    pub fn rect(kind: EntityKind, pos: Vec2, vel: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            kind,
            pos,
            vel,
            shape: Shape::rect(size.x, size.y),
            color,
        }
    }
}

/// A live simulated object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Center position
    pub pos: Vec2,
    /// Displacement per frame (before any speed multiplier)
    pub vel: Vec2,
    pub shape: Shape,
    pub color: Color,
    /// Cleared when the entity is consumed; the pool drops it on the next sweep
    pub alive: bool,
}

impl Entity {
    pub fn new(id: EntityId, spawn: Spawn) -> Self {
        let entity = Self {
            id,
            kind: spawn.kind,
            pos: spawn.pos,
            vel: spawn.vel,
            shape: spawn.shape,
            color: spawn.color,
            alive: true,
        };
        entity.check_invariants();
        entity
    }

    pub fn radius(&self) -> f32 {
        self.shape.radius()
    }

    pub fn half_extents(&self) -> Vec2 {
        self.shape.half_extents()
    }

    /// Top-left corner of the bounding box (for rect/blit drawing)
    pub fn top_left(&self) -> Vec2 {
        self.pos - self.half_extents()
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Replace position/velocity/shape/kind in place, keeping the id
    pub fn respawn(&mut self, spawn: Spawn) {
        self.kind = spawn.kind;
        self.pos = spawn.pos;
        self.vel = spawn.vel;
        self.shape = spawn.shape;
        self.color = spawn.color;
        self.alive = true;
        self.check_invariants();
    }

    /// Negative sizes or non-finite kinematics are programming errors
    #[inline]
    pub fn check_invariants(&self) {
        debug_assert!(
            self.pos.is_finite() && self.vel.is_finite(),
            "entity {} has non-finite state: pos={:?} vel={:?}",
            self.id,
            self.pos,
            self.vel
        );
        debug_assert!(
            self.half_extents().min_element() >= 0.0,
            "entity {} has negative size: {:?}",
            self.id,
            self.shape
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_variant_scoring() {
        assert_eq!(BallVariant::Normal.apply(4), 5);
        assert_eq!(BallVariant::Bonus.apply(4), 7);
        assert_eq!(BallVariant::Penalty.apply(4), 3);
        // Penalty never drives the score negative
        assert_eq!(BallVariant::Penalty.apply(0), 0);
    }

    #[test]
    fn test_variant_roll_distribution() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut counts = [0u32; 3];
        for _ in 0..10_000 {
            match BallVariant::roll(&mut rng, 15, 15) {
                BallVariant::Normal => counts[0] += 1,
                BallVariant::Bonus => counts[1] += 1,
                BallVariant::Penalty => counts[2] += 1,
            }
        }
        assert!(counts[0] > 6_500 && counts[0] < 7_500, "{counts:?}");
        assert!(counts[1] > 1_200 && counts[1] < 1_800, "{counts:?}");
        assert!(counts[2] > 1_200 && counts[2] < 1_800, "{counts:?}");
    }

    #[test]
    fn test_shape_extents() {
        assert_eq!(Shape::circle(3.0).half_extents(), Vec2::splat(3.0));
        assert_eq!(Shape::rect(8.0, 4.0).half_extents(), Vec2::new(4.0, 2.0));
        assert!((Shape::rect(6.0, 8.0).radius() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_left_of_centered_rect() {
        let e = Entity::new(
            1,
            Spawn::rect(EntityKind::Invader, Vec2::new(10.0, 10.0), Vec2::ZERO, Vec2::splat(8.0), 10),
        );
        assert_eq!(e.top_left(), Vec2::new(6.0, 6.0));
    }

    #[test]
    #[should_panic(expected = "negative size")]
    #[cfg(debug_assertions)]
    fn test_negative_radius_fails_fast() {
        Entity::new(
            1,
            Spawn::circle(EntityKind::Bubble, Vec2::ZERO, Vec2::ZERO, -1.0, 1),
        );
    }
}
