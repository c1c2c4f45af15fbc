//! Scrolling star background shared by the space demos

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::renderer::{Canvas, Color, palette};
use crate::sim::{Boundary, Bounds, Entity, EntityKind, Spawn, motion};

const STAR_COLORS: [Color; 5] = [palette::DARK_BLUE, palette::LIGHT_BLUE, palette::WHITE, palette::CYAN, palette::GRAY];

/// Stars falling at individual speeds; a star leaving the bottom comes back
/// at the top in a new column
#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub stars: Vec<Entity>,
    pub bounds: Bounds,
}

impl Starfield {
    pub fn new(rng: &mut impl Rng, count: usize, bounds: Bounds) -> Self {
        let stars = (0..count)
            .map(|i| {
                let pos = Vec2::new(
                    rng.random_range(0..bounds.width().max(1.0) as u32) as f32,
                    rng.random_range(0..bounds.height().max(1.0) as u32) as f32,
                );
                let speed = rng.random_range(0.5..3.0);
                let color = *STAR_COLORS.choose(rng).unwrap_or(&palette::WHITE);
                Entity::new(
                    i as u32 + 1,
                    Spawn::circle(EntityKind::Star, pos, Vec2::new(0.0, speed), 0.0, color),
                )
            })
            .collect();
        Self { stars, bounds }
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        for star in &mut self.stars {
            if motion::step(star, 1.0, &Boundary::SCROLL_WRAP, &self.bounds).wrapped {
                star.pos.y = 0.0;
                star.pos.x = rng.random_range(0..self.bounds.width().max(1.0) as u32) as f32;
            }
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for star in &self.stars {
            canvas.pset(star.pos.x, star.pos.y, star.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CommandBuffer;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_stars_stay_on_screen() {
        let mut rng = Pcg32::seed_from_u64(5);
        let bounds = Bounds::screen(256.0, 192.0);
        let mut field = Starfield::new(&mut rng, 100, bounds);
        for _ in 0..500 {
            field.update(&mut rng);
        }
        for star in &field.stars {
            assert!(star.pos.y >= 0.0 && star.pos.y < 192.0, "{:?}", star.pos);
            assert!(star.pos.x >= 0.0 && star.pos.x < 256.0);
        }
    }

    #[test]
    fn test_draws_one_pixel_per_star() {
        let mut rng = Pcg32::seed_from_u64(5);
        let field = Starfield::new(&mut rng, 40, Bounds::screen(120.0, 160.0));
        let mut buf = CommandBuffer::new();
        field.draw(&mut buf);
        assert_eq!(buf.len(), 40);
    }
}
