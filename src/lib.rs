//! Pixel Arcade - retro-style 2D demos on a shared frame loop
//!
//! Core modules:
//! - `sim`: Deterministic simulation primitives (entities, pools, collisions, scenes)
//! - `platform`: Per-frame callback contract, input edges, frame clock, run loop
//! - `renderer`: Drawing primitive trait and a headless command recorder
//! - `audio`: Sound cues emitted by updates
//! - `demos`: The individual games built on the above
//! - `settings`: JSON configuration
//! - `cli`: Argument parsing for the `pixel-arcade` binary

pub mod audio;
pub mod cli;
pub mod demos;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use demos::DemoKind;
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Default frame rate when a demo doesn't ask for one
    pub const DEFAULT_FPS: u32 = 30;
    /// Maximum ticks per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest host frame the clock will account for (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Default hard cap for any entity pool
    pub const DEFAULT_ENTITY_CAP: usize = 512;

    /// Built-in font cell size in pixels
    pub const FONT_WIDTH: i32 = 4;
    pub const FONT_HEIGHT: i32 = 6;
}

/// Unit direction for an angle in degrees (screen space, y grows downward)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// X coordinate that horizontally centers `text` on a page of `page_width`
#[inline]
pub fn center_text_x(text: &str, page_width: f32) -> f32 {
    let text_width = text.chars().count() as i32 * consts::FONT_WIDTH;
    ((page_width as i32 - text_width) / 2) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_degrees() {
        let down = direction_from_degrees(90.0);
        assert!(down.x.abs() < 1e-6);
        assert!((down.y - 1.0).abs() < 1e-6);

        let thirty = direction_from_degrees(30.0);
        assert!((thirty.length() - 1.0).abs() < 1e-6);
        assert!(thirty.x > 0.0 && thirty.y > 0.0);
    }

    #[test]
    fn test_center_text_x() {
        // "GAME OVER" is 9 glyphs = 36px wide
        assert_eq!(center_text_x("GAME OVER", 200.0), 82.0);
        assert_eq!(center_text_x("", 40.0), 20.0);
    }
}
