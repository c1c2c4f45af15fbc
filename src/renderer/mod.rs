//! Drawing primitives
//!
//! Demos draw through the `Canvas` trait against an implicit framebuffer owned
//! by the host. The only required method is `submit`; every primitive is a
//! provided method that builds a `DrawCommand`, so a backend can either
//! rasterize commands directly or record them (`CommandBuffer`).

pub mod commands;
pub mod shapes;

pub use commands::{CommandBuffer, DrawCommand};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Palette index (16-color retro palette)
pub type Color = u8;

/// Named palette entries
pub mod palette {
    use super::Color;

    pub const BLACK: Color = 0;
    pub const NAVY: Color = 1;
    pub const PURPLE: Color = 2;
    pub const GREEN: Color = 3;
    pub const BROWN: Color = 4;
    pub const DARK_BLUE: Color = 5;
    pub const LIGHT_BLUE: Color = 6;
    pub const WHITE: Color = 7;
    pub const RED: Color = 8;
    pub const ORANGE: Color = 9;
    pub const YELLOW: Color = 10;
    pub const LIME: Color = 11;
    pub const CYAN: Color = 12;
    pub const GRAY: Color = 13;
    pub const PINK: Color = 14;
    pub const PEACH: Color = 15;

    pub const COUNT: Color = 16;
}

/// Rectangular region of a sprite image bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRegion {
    pub bank: u8,
    pub u: u16,
    pub v: u16,
    pub w: u16,
    pub h: u16,
}

impl SpriteRegion {
    pub const fn new(bank: u8, u: u16, v: u16, w: u16, h: u16) -> Self {
        Self { bank, u, v, w, h }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w as f32, self.h as f32)
    }
}

/// Framebuffer drawing surface supplied by the presentation engine
pub trait Canvas {
    fn submit(&mut self, cmd: DrawCommand);

    /// Clear the whole screen
    fn cls(&mut self, col: Color) {
        self.submit(DrawCommand::Clear { col });
    }

    fn pset(&mut self, x: f32, y: f32, col: Color) {
        self.submit(DrawCommand::Pixel { x, y, col });
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, col: Color) {
        self.submit(DrawCommand::Line { x0, y0, x1, y1, col });
    }

    /// Filled rectangle from its top-left corner
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, col: Color) {
        self.submit(DrawCommand::Rect { x, y, w, h, col, filled: true });
    }

    /// Rectangle outline
    fn rectb(&mut self, x: f32, y: f32, w: f32, h: f32, col: Color) {
        self.submit(DrawCommand::Rect { x, y, w, h, col, filled: false });
    }

    fn circ(&mut self, x: f32, y: f32, r: f32, col: Color) {
        self.submit(DrawCommand::Circle { x, y, r, col, filled: true });
    }

    fn circb(&mut self, x: f32, y: f32, r: f32, col: Color) {
        self.submit(DrawCommand::Circle { x, y, r, col, filled: false });
    }

    fn tri(&mut self, a: Vec2, b: Vec2, c: Vec2, col: Color) {
        self.submit(DrawCommand::Triangle {
            points: [a.x, a.y, b.x, b.y, c.x, c.y],
            col,
        });
    }

    /// Copy a sprite region; `colkey` pixels are transparent
    fn blt(&mut self, x: f32, y: f32, sprite: SpriteRegion, colkey: Option<Color>) {
        self.submit(DrawCommand::Blit { x, y, sprite, colkey });
    }

    fn text(&mut self, x: f32, y: f32, s: &str, col: Color) {
        self.submit(DrawCommand::Text {
            x,
            y,
            text: s.to_string(),
            col,
        });
    }

    /// Offset subsequent draws (screen shake); `camera(0, 0)` resets
    fn camera(&mut self, x: f32, y: f32) {
        self.submit(DrawCommand::Camera { x, y });
    }
}
