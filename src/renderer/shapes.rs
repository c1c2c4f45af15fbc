//! Composite shapes built from canvas primitives

use glam::Vec2;
use std::f32::consts::TAU;

use super::{Canvas, Color};

/// Evenly spaced points on a circle, starting at `phase` radians
pub fn ring_points(center: Vec2, radius: f32, count: u32, phase: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let theta = phase + (i as f32 / count as f32) * TAU;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect()
}

/// Horizontal bar with a dark frame, a background track and a filled portion
#[allow(clippy::too_many_arguments)]
pub fn health_bar(
    canvas: &mut dyn Canvas,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    ratio: f32,
    fill: Color,
    track: Color,
) {
    let ratio = ratio.clamp(0.0, 1.0);
    canvas.rect(x - 2.0, y - 2.0, width + 4.0, height + 4.0, super::palette::BLACK);
    canvas.rect(x, y, width, height, track);
    canvas.rect(x, y, (width * ratio).floor(), height, fill);
}

/// Upward-pointing ship: base along the bottom edge, apex centered on top
pub fn ship(canvas: &mut dyn Canvas, top_left: Vec2, size: Vec2, col: Color) {
    let base_left = Vec2::new(top_left.x, top_left.y + size.y);
    let base_right = Vec2::new(top_left.x + size.x, top_left.y + size.y);
    let apex = Vec2::new(top_left.x + size.x / 2.0, top_left.y);
    canvas.tri(base_left, base_right, apex, col);
}

/// Text with a halo: each layer is drawn at every offset within `spread`
/// before the main text goes on top
pub fn halo_text(canvas: &mut dyn Canvas, x: f32, y: f32, text: &str, layers: &[(i32, Color)], col: Color) {
    for &(spread, layer_col) in layers {
        for dx in -spread..=spread {
            for dy in -spread..=spread {
                if dx == 0 && dy == 0 {
                    continue;
                }
                canvas.text(x + dx as f32, y + dy as f32, text, layer_col);
            }
        }
    }
    canvas.text(x, y, text, col);
}
