//! Recorded draw commands
//!
//! `CommandBuffer` is the headless canvas: it keeps the commands of the
//! current frame so a host can replay them, tests can inspect them, and the
//! CLI can dump them as JSON.

use serde::{Deserialize, Serialize};

use super::{Canvas, Color, SpriteRegion};

/// A single drawing primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear { col: Color },
    Pixel { x: f32, y: f32, col: Color },
    Line { x0: f32, y0: f32, x1: f32, y1: f32, col: Color },
    Rect { x: f32, y: f32, w: f32, h: f32, col: Color, filled: bool },
    Circle { x: f32, y: f32, r: f32, col: Color, filled: bool },
    Triangle { points: [f32; 6], col: Color },
    Blit { x: f32, y: f32, sprite: SpriteRegion, colkey: Option<Color> },
    Text { x: f32, y: f32, text: String, col: Color },
    Camera { x: f32, y: f32 },
}

/// Canvas that records every command of a frame
#[derive(Debug, Default, Clone)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's commands
    pub fn begin_frame(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text strings drawn this frame, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True if any text command contains `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Number of filled circles drawn this frame
    pub fn filled_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Circle { filled: true, .. }))
            .count()
    }
}

impl Canvas for CommandBuffer {
    fn submit(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }
}
