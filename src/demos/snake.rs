//! Grid snake
//!
//! One cell per pixel on a 40×50 field, with a score bar across the top rows.

use std::collections::VecDeque;

use glam::IVec2;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde_json::json;

use super::seeded_rng;
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::consts::FONT_HEIGHT;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::{Scene, SceneEvent, SceneMachine};

pub const WIDTH: i32 = 40;
pub const HEIGHT: i32 = 50;
/// Rows taken by the score bar; the playfield starts below
pub const SCORE_HEIGHT: i32 = FONT_HEIGHT;

const START: IVec2 = IVec2::new(5, 5 + SCORE_HEIGHT);

const UP: IVec2 = IVec2::new(0, -1);
const DOWN: IVec2 = IVec2::new(0, 1);
const LEFT: IVec2 = IVec2::new(-1, 0);
const RIGHT: IVec2 = IVec2::new(1, 0);

#[derive(Debug, Clone)]
pub struct Snake {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    /// Head first
    pub body: VecDeque<IVec2>,
    pub direction: IVec2,
    /// `None` once the board is full
    pub apple: Option<IVec2>,
    pub score: u32,
    pub scene: SceneMachine,
}

impl Snake {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let body = (0..settings.snake.start_length as i32)
            .map(|i| START - RIGHT * i)
            .collect();
        let mut snake = Self {
            settings: settings.clone(),
            seed,
            rng: seeded_rng(seed),
            body,
            direction: RIGHT,
            apple: None,
            score: 0,
            scene: SceneMachine::new("snake", Scene::Play),
        };
        snake.apple = snake.place_apple();
        snake
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    /// Cells an apple may occupy: inside the field, below the score bar, off the snake
    pub fn free_cells(&self) -> Vec<IVec2> {
        (SCORE_HEIGHT + 1..HEIGHT)
            .flat_map(|y| (0..WIDTH).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect()
    }

    fn place_apple(&mut self) -> Option<IVec2> {
        self.free_cells().choose(&mut self.rng).copied()
    }

    pub fn in_field(cell: IVec2) -> bool {
        cell.x >= 0 && cell.x < WIDTH && cell.y > SCORE_HEIGHT && cell.y < HEIGHT
    }

    /// Arrow keys steer; a 180° turn is ignored
    fn steer(&mut self, ctx: &FrameContext) {
        let input = &ctx.input;
        let wanted = [(Key::Up, UP), (Key::Down, DOWN), (Key::Left, LEFT), (Key::Right, RIGHT)]
            .into_iter()
            .find(|(key, dir)| input.held(*key) && *dir != -self.direction);
        if let Some((_, dir)) = wanted {
            self.direction = dir;
        }
    }

    /// Advance one cell. Returns false when the move killed the snake.
    fn advance(&mut self, out: &mut FrameOutput) -> bool {
        let new_head = self.head() + self.direction;
        self.body.push_front(new_head);
        let tail = self.body.pop_back();

        if Some(new_head) == self.apple {
            self.score += 1;
            if let Some(tail) = tail {
                self.body.push_back(tail);
            }
            out.play(SoundEffect::Eat);
            self.apple = self.place_apple();
            if self.apple.is_none() {
                log::info!("snake: board full at score {}", self.score);
                out.play(SoundEffect::Victory);
                return false;
            }
        }

        let crashed = !Self::in_field(new_head) || self.body.iter().skip(1).any(|c| *c == new_head);
        if crashed {
            log::info!("snake: crashed at {:?} with score {}", new_head, self.score);
            out.play(SoundEffect::GameOver);
        }
        !crashed
    }
}

impl Demo for Snake {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH as u32,
            height: HEIGHT as u32,
            fps: self.settings.snake.fps,
            title: "Snake",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.scene.tick();
        if self.scene.is(Scene::Play) {
            self.steer(ctx);
            if !self.advance(out) {
                self.scene.fire(SceneEvent::Terminal);
            }
        }

        // Quit and restart work in any scene
        if ctx.input.held(Key::Q) {
            out.quit();
        }
        if ctx.input.just_pressed(Key::R) {
            log::info!("snake: restart");
            *self = self.reset();
        }
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        if self.scene.is(Scene::GameOver) {
            canvas.cls(palette::RED);
            let score = format!("SCORE: {:04}", self.score);
            let lines = ["GAME OVER", score.as_str(), "(Q)UIT", "(R)ESTART"];
            for (i, line) in lines.iter().enumerate() {
                let y = 5 + i as i32 * (FONT_HEIGHT + 2);
                canvas.text(center_text_x(line, ctx.width), y as f32, line, palette::BLACK);
            }
            return;
        }

        canvas.cls(palette::GREEN);
        canvas.rect(0.0, 0.0, WIDTH as f32, SCORE_HEIGHT as f32, palette::DARK_BLUE);
        canvas.text(1.0, 1.0, &format!("{:04}", self.score), palette::LIGHT_BLUE);

        for (i, cell) in self.body.iter().enumerate() {
            let col = if i == 0 { palette::WHITE } else { palette::LIME };
            canvas.pset(cell.x as f32, cell.y as f32, col);
        }
        if let Some(apple) = self.apple {
            canvas.pset(apple.x as f32, apple.y as f32, palette::RED);
        }
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        let mut state = InputState::at(ctx.width / 2.0, ctx.height / 2.0);
        if self.scene.is(Scene::GameOver) {
            if ctx.frame % 2 == 0 {
                state = state.hold(Key::R);
            }
            return state;
        }

        // Greedy: the safe turn that gets closest to the apple
        let Some(apple) = self.apple else {
            return state;
        };
        let head = self.head();
        let choice = [(Key::Up, UP), (Key::Down, DOWN), (Key::Left, LEFT), (Key::Right, RIGHT)]
            .into_iter()
            .filter(|(_, dir)| *dir != -self.direction)
            .filter(|(_, dir)| {
                let next = head + *dir;
                Self::in_field(next) && !self.body.iter().rev().skip(1).any(|c| *c == next)
            })
            .min_by_key(|(_, dir)| {
                let d = apple - (head + *dir);
                d.x.abs() + d.y.abs()
            });
        match choice {
            Some((key, _)) => state.hold(key),
            None => state,
        }
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "score": self.score,
            "length": self.body.len(),
            "head": [self.head().x, self.head().y],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{InputSnapshot, InputTracker};
    use crate::renderer::CommandBuffer;

    fn ctx(frame: u64, input: InputSnapshot) -> FrameContext {
        FrameContext::new(WIDTH as f32, HEIGHT as f32, frame, input)
    }

    fn press(tracker: &mut InputTracker, keys: &[Key]) -> InputSnapshot {
        tracker.sample(InputState::new(Default::default(), keys))
    }

    #[test]
    fn test_moves_twice_a_second_by_default() {
        let game = Snake::new(&Settings::default(), 1);
        assert_eq!(game.screen().fps, 2);
    }

    #[test]
    fn test_fresh_state() {
        let snake = Snake::new(&Settings::default(), 1);
        assert_eq!(snake.head(), IVec2::new(5, 11));
        assert_eq!(snake.body.len(), 1);
        let apple = snake.apple.unwrap();
        assert!(Snake::in_field(apple));
        assert_ne!(apple, snake.head());
    }

    #[test]
    fn test_no_reverse_turn() {
        let mut snake = Snake::new(&Settings::default(), 1);
        snake.apple = Some(IVec2::new(30, 40));
        let mut tracker = InputTracker::new();
        snake.update(&ctx(0, press(&mut tracker, &[Key::Left])), &mut FrameOutput::default());
        assert_eq!(snake.direction, RIGHT);
        assert_eq!(snake.head(), IVec2::new(6, 11));
    }

    #[test]
    fn test_eating_grows() {
        let mut snake = Snake::new(&Settings::default(), 1);
        snake.apple = Some(IVec2::new(6, 11));
        let mut out = FrameOutput::default();
        let mut tracker = InputTracker::new();
        snake.update(&ctx(0, press(&mut tracker, &[])), &mut out);
        assert_eq!(snake.score, 1);
        assert_eq!(snake.body.len(), 2);
        assert!(out.sounds.contains(&SoundEffect::Eat));
        assert_ne!(snake.apple, Some(IVec2::new(6, 11)));
    }

    #[test]
    fn test_score_bar_is_a_wall() {
        let mut snake = Snake::new(&Settings::default(), 1);
        snake.apple = Some(IVec2::new(30, 40));
        let mut tracker = InputTracker::new();
        for frame in 0..5 {
            snake.update(&ctx(frame, press(&mut tracker, &[Key::Up])), &mut FrameOutput::default());
        }
        assert!(snake.scene.is(Scene::GameOver));
        assert_eq!(snake.head().y, SCORE_HEIGHT);
    }

    #[test]
    fn test_self_collision() {
        let mut settings = Settings::default();
        settings.snake.start_length = 5;
        let mut snake = Snake::new(&settings, 1);
        snake.apple = Some(IVec2::new(30, 40));
        let mut tracker = InputTracker::new();
        let mut turn = |snake: &mut Snake, key, frame| {
            snake.update(&ctx(frame, press(&mut tracker, &[key])), &mut FrameOutput::default());
        };
        turn(&mut snake, Key::Down, 0);
        turn(&mut snake, Key::Left, 1);
        turn(&mut snake, Key::Up, 2);
        assert!(snake.scene.is(Scene::GameOver));
    }

    #[test]
    fn test_restart_and_quit() {
        let mut snake = Snake::new(&Settings::default(), 3);
        snake.scene.fire(SceneEvent::Terminal);
        snake.score = 7;
        let mut tracker = InputTracker::new();
        snake.update(&ctx(0, press(&mut tracker, &[Key::R])), &mut FrameOutput::default());
        assert!(snake.scene.is(Scene::Play));
        assert_eq!(snake.score, 0);
        assert_eq!(snake.body, Snake::new(&Settings::default(), 3).body);

        let mut out = FrameOutput::default();
        snake.update(&ctx(1, press(&mut tracker, &[Key::Q])), &mut out);
        assert!(out.quit);
    }

    #[test]
    fn test_death_screen_shows_score() {
        let mut snake = Snake::new(&Settings::default(), 3);
        snake.score = 12;
        snake.scene.fire(SceneEvent::Terminal);
        let mut buf = CommandBuffer::new();
        snake.draw(&ctx(0, InputSnapshot::default()), &mut buf);
        assert!(buf.has_text("SCORE: 0012"));
        assert!(buf.has_text("GAME OVER"));
    }
}
