//! Collision detection and pairwise outcomes
//!
//! Overlap tests are plain geometry (circle-circle, box-box, circle-box).
//! `merge` and `split` build the replacement entities for the two area-
//! conserving outcomes; the pool applies them.

use glam::Vec2;
use std::f32::consts::TAU;

use super::entity::{Entity, Shape, Spawn};

/// Strict overlap of two circles
#[inline]
pub fn circles_overlap(p1: Vec2, r1: f32, p2: Vec2, r2: f32) -> bool {
    let total_r = r1 + r2;
    (p1 - p2).length_squared() < total_r * total_r
}

/// Strict overlap of two centered axis-aligned boxes
#[inline]
pub fn boxes_overlap(c1: Vec2, half1: Vec2, c2: Vec2, half2: Vec2) -> bool {
    let d = (c1 - c2).abs();
    d.x < half1.x + half2.x && d.y < half1.y + half2.y
}

/// Circle against a centered axis-aligned box (closest-point test)
#[inline]
pub fn circle_box_overlap(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> bool {
    let closest = center.clamp(box_center - half, box_center + half);
    (center - closest).length_squared() < radius * radius
}

/// Shape-aware overlap test between two entities
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: r1 }, Shape::Circle { radius: r2 }) => {
            circles_overlap(a.pos, r1, b.pos, r2)
        }
        (Shape::Rect { half: h1 }, Shape::Rect { half: h2 }) => boxes_overlap(a.pos, h1, b.pos, h2),
        (Shape::Circle { radius }, Shape::Rect { half }) => {
            circle_box_overlap(a.pos, radius, b.pos, half)
        }
        (Shape::Rect { half }, Shape::Circle { radius }) => {
            circle_box_overlap(b.pos, radius, a.pos, half)
        }
    }
}

/// Whether a point lies strictly inside an entity's shape
pub fn contains_point(e: &Entity, point: Vec2) -> bool {
    match e.shape {
        Shape::Circle { radius } => (point - e.pos).length_squared() < radius * radius,
        Shape::Rect { half } => {
            let d = (point - e.pos).abs();
            d.x < half.x && d.y < half.y
        }
    }
}

/// Index of the first live candidate overlapping `target`, scanning from the
/// newest candidate backwards
pub fn first_hit(target: &Entity, candidates: &[Entity]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .rev()
        .find(|(_, c)| c.alive && overlaps(target, c))
        .map(|(i, _)| i)
}

/// Combine two circles into one with the summed area.
///
/// Position and velocity are radius-weighted averages. The result takes the
/// kind and color of the larger input.
pub fn merge(a: &Entity, b: &Entity) -> Spawn {
    let (r1, r2) = (a.radius(), b.radius());
    let total_r = r1 + r2;
    let (pos, vel) = if total_r > 0.0 {
        (
            (a.pos * r1 + b.pos * r2) / total_r,
            (a.vel * r1 + b.vel * r2) / total_r,
        )
    } else {
        ((a.pos + b.pos) / 2.0, (a.vel + b.vel) / 2.0)
    };
    let dominant = if r1 >= r2 { a } else { b };

    Spawn {
        kind: dominant.kind,
        pos,
        vel,
        shape: Shape::circle((r1 * r1 + r2 * r2).sqrt()),
        color: dominant.color,
    }
}

/// Radius of each of `pieces` children that together keep the parent's area
#[inline]
pub fn child_radius(parent_radius: f32, pieces: u32) -> f32 {
    (parent_radius * parent_radius / pieces.max(1) as f32).sqrt()
}

/// Burst a circle into `pieces` children on a ring around it.
///
/// Child `i` sits at angle `2π·i/pieces`, just outside the parent's rim, and
/// moves outward at `speed`.
pub fn split(parent: &Entity, pieces: u32, speed: f32) -> Vec<Spawn> {
    let r = parent.radius();
    let child_r = child_radius(r, pieces);

    (0..pieces)
        .map(|i| {
            let angle = TAU * i as f32 / pieces as f32;
            let dir = Vec2::new(angle.cos(), angle.sin());
            Spawn {
                kind: parent.kind,
                pos: parent.pos + dir * (r + child_r),
                vel: dir * speed,
                shape: Shape::circle(child_r),
                color: parent.color,
            }
        })
        .collect()
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;

    fn bubble(id: u32, pos: Vec2, vel: Vec2, r: f32) -> Entity {
        Entity::new(id, Spawn::circle(EntityKind::Bubble, pos, vel, r, 3))
    }

    #[test]
    fn test_merge_three_four_five() {
        let a = bubble(1, Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 3.0);
        let b = bubble(2, Vec2::new(105.0, 100.0), Vec2::new(-1.0, 0.0), 4.0);
        assert!(overlaps(&a, &b));

        let merged = merge(&a, &b);
        assert!((merged.shape.radius() - 5.0).abs() < 1e-5);
        // Weighted toward the larger bubble
        let expected_x = (100.0 * 3.0 + 105.0 * 4.0) / 7.0;
        assert!((merged.pos.x - expected_x).abs() < 1e-4);
        assert!((merged.vel.x - (3.0 - 4.0) / 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_split_ring_layout() {
        let parent = bubble(1, Vec2::new(50.0, 50.0), Vec2::ZERO, 11.0);
        let children = split(&parent, 11, 1.8);
        assert_eq!(children.len(), 11);

        // First child sits on the +x axis, just outside the rim
        let child_r = child_radius(11.0, 11);
        assert!((children[0].pos - Vec2::new(50.0 + 11.0 + child_r, 50.0)).length() < 1e-4);
        assert!((children[0].vel - Vec2::new(1.8, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_box_overlap_is_strict() {
        let half = Vec2::splat(4.0);
        assert!(boxes_overlap(Vec2::ZERO, half, Vec2::new(7.9, 0.0), half));
        assert!(!boxes_overlap(Vec2::ZERO, half, Vec2::new(8.0, 0.0), half));
    }

    #[test]
    fn test_circle_box_overlap() {
        let half = Vec2::new(1.0, 3.0);
        // Bullet just below the ball's rim
        assert!(circle_box_overlap(Vec2::new(50.0, 50.0), 10.0, Vec2::new(50.0, 62.0), half));
        assert!(!circle_box_overlap(Vec2::new(50.0, 50.0), 10.0, Vec2::new(50.0, 64.0), half));
    }

    #[test]
    fn test_first_hit_prefers_newest_live_candidate() {
        let target = bubble(1, Vec2::ZERO, Vec2::ZERO, 5.0);
        let mut candidates = vec![
            bubble(2, Vec2::new(1.0, 0.0), Vec2::ZERO, 1.0),
            bubble(3, Vec2::new(2.0, 0.0), Vec2::ZERO, 1.0),
            bubble(4, Vec2::new(100.0, 0.0), Vec2::ZERO, 1.0),
        ];
        assert_eq!(first_hit(&target, &candidates), Some(1));
        candidates[1].kill();
        assert_eq!(first_hit(&target, &candidates), Some(0));
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);
        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    proptest! {
        #[test]
        fn merge_conserves_area(r1 in 0.5f32..40.0, r2 in 0.5f32..40.0,
                                x in 0.0f32..256.0, y in 0.0f32..256.0) {
            let a = bubble(1, Vec2::new(x, y), Vec2::new(1.0, 0.5), r1);
            let b = bubble(2, Vec2::new(x + 1.0, y), Vec2::new(-0.5, 1.0), r2);
            let merged = merge(&a, &b);
            let r = merged.shape.radius();
            let expected = r1 * r1 + r2 * r2;
            prop_assert!((r * r - expected).abs() <= expected * 1e-5);
        }

        #[test]
        fn split_conserves_area(r in 0.5f32..60.0, pieces in 1u32..32) {
            let parent = bubble(1, Vec2::new(128.0, 128.0), Vec2::ZERO, r);
            let children = split(&parent, pieces, 1.8);
            prop_assert_eq!(children.len(), pieces as usize);
            let area: f32 = children.iter().map(|c| c.shape.radius().powi(2)).sum();
            prop_assert!((area - r * r).abs() <= r * r * 1e-4);
        }
    }
}
