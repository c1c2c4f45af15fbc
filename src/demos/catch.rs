//! Paddle-and-falling-balls
//!
//! Balls fall from the top at a random angle and bounce off the side walls.
//! The paddle follows the pointer; a ball reaching the bottom is either
//! caught or counted as a miss, and respawns at the top either way.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde_json::json;

use super::seeded_rng;
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::direction_from_degrees;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::progression::{self, Crossing, Progress};
use crate::sim::{
    BallVariant, Boundary, Bounds, EntityKind, EntityPool, FireControl, Paddle, Scene, SceneEvent,
    SceneMachine, Side, Spawn, first_hit, motion,
};

pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 200;
pub const FPS: u32 = 30;

pub const BALL_RADIUS: f32 = 10.0;
const PADDLE_HEIGHT: f32 = 5.0;
/// Gap between the paddle and the bottom edge
const PADDLE_MARGIN: f32 = 10.0;

/// Catch game state
#[derive(Debug, Clone)]
pub struct CatchGame {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub balls: EntityPool,
    pub bullets: EntityPool,
    pub paddle: Paddle,
    pub fire: FireControl,
    pub progress: Progress,
    pub scene: SceneMachine,
    pub bounds: Bounds,
}

impl CatchGame {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let tuning = &settings.catch;
        let mut rng = seeded_rng(seed);
        let bounds = Bounds::screen(WIDTH as f32, HEIGHT as f32);

        let mut balls = EntityPool::new("ball", settings.entity_cap, settings.eviction);
        balls.spawn(Self::roll_ball(&mut rng, settings, bounds.width()));

        let mut paddle = Paddle::new(
            (bounds.width() - tuning.paddle_width) / 2.0,
            bounds.height() - PADDLE_MARGIN,
            tuning.paddle_width,
            PADDLE_HEIGHT,
        );
        paddle.min_width = tuning.paddle_width / 2.0;

        Self {
            settings: settings.clone(),
            seed,
            rng,
            balls,
            bullets: EntityPool::new("bullet", settings.entity_cap, settings.eviction),
            paddle,
            fire: FireControl::new(tuning.fire_cooldown),
            progress: Progress::new(&tuning.difficulty),
            scene: SceneMachine::new("catch", Scene::Play),
            bounds,
        }
    }

    /// Fresh state with the same seed
    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    /// A ball at a random top position heading down at 30°..=150°
    pub fn roll_ball(rng: &mut Pcg32, settings: &Settings, width: f32) -> Spawn {
        let x = rng.random_range(0..width.max(1.0) as u32) as f32;
        let angle = rng.random_range(30..=150) as f32;
        let variant = BallVariant::roll(rng, settings.catch.bonus_chance, settings.catch.penalty_chance);
        Spawn::circle(
            EntityKind::Ball { variant },
            Vec2::new(x, 0.0),
            direction_from_degrees(angle),
            BALL_RADIUS,
            variant.color(),
        )
    }

    fn respawn_ball(&mut self, index: usize) {
        let spawn = Self::roll_ball(&mut self.rng, &self.settings, self.bounds.width());
        self.balls.as_mut_slice()[index].respawn(spawn);
    }

    fn update_play(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        let difficulty = self.settings.catch.difficulty;
        let input = &ctx.input;

        self.paddle.follow_pointer(input.pointer.x, self.bounds.width());

        if input.just_pressed(Key::R) {
            self.progress = progression::slow_down(&self.progress, &difficulty);
            let width = self.paddle.shrink(self.settings.catch.paddle_shrink_step);
            log::debug!("catch: slowed down, paddle width {}", width);
        }

        if let Some(shot) =
            self.paddle
                .try_fire(&mut self.fire, input.held(Key::Z), ctx.frame, self.settings.catch.bullet_speed)
        {
            if self.bullets.spawn(shot).is_some() {
                out.play(SoundEffect::Shoot);
            }
        }

        for (id, _) in self.bullets.step_all(1.0, &Boundary::PROJECTILE, &self.bounds) {
            self.bullets.kill(id);
        }
        self.bullets.sweep();

        let mut extra_balls = 0;
        for i in 0..self.balls.len() {
            let speed = self.progress.speed;
            let ball = &mut self.balls.as_mut_slice()[i];
            let stepped = motion::step(ball, speed, &Boundary::PADDLE_FIELD, &self.bounds);

            // Bullet hits take precedence over the bottom edge
            if let Some(hit) = first_hit(ball, self.bullets.as_slice()) {
                self.bullets.as_mut_slice()[hit].kill();
                self.progress = progression::on_shot(&self.progress);
                out.play(SoundEffect::Explosion);
                self.respawn_ball(i);
                continue;
            }

            if stepped.exited != Some(Side::Bottom) {
                continue;
            }

            let variant = match ball.kind {
                EntityKind::Ball { variant } => variant,
                _ => BallVariant::Normal,
            };
            let crossing = if self.paddle.covers(ball.pos.x) {
                out.play(SoundEffect::Catch);
                Crossing::Caught(variant)
            } else {
                out.play(SoundEffect::Miss);
                Crossing::Missed
            };

            let step = progression::on_bottom(&self.progress, &difficulty, crossing);
            self.progress = step.progress;
            extra_balls += step.spawn_balls;
            self.respawn_ball(i);

            if step.game_over {
                log::info!("catch: game over with score {}", self.progress.score);
                self.scene.fire(SceneEvent::Terminal);
                out.play(SoundEffect::GameOver);
                break;
            }
        }
        self.bullets.sweep();

        if extra_balls > 0 {
            self.paddle.restore_width();
            for _ in 0..extra_balls {
                let spawn = Self::roll_ball(&mut self.rng, &self.settings, self.bounds.width());
                self.balls.spawn(spawn);
            }
            log::info!(
                "catch: level {} ({} balls, next at {})",
                self.progress.level,
                self.balls.len(),
                self.progress.next_level_up
            );
            out.play(SoundEffect::LevelUp);
        }
    }
}

impl Demo for CatchGame {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Catch",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.scene.tick();
        match self.scene.scene {
            Scene::Play => self.update_play(ctx, out),
            Scene::GameOver => {
                if ctx.input.just_pressed(Key::Enter) && self.scene.fire(SceneEvent::Restart).is_some() {
                    *self = self.reset();
                }
            }
            Scene::Title => {
                self.scene.fire(SceneEvent::Confirm);
            }
        }
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::WHITE);

        if self.scene.is(Scene::GameOver) {
            let over = "GAME OVER";
            canvas.text(center_text_x(over, ctx.width), 90.0, over, palette::RED);
            let score = format!("Final Score: {}", self.progress.score);
            canvas.text(center_text_x(&score, ctx.width), 110.0, &score, palette::BLACK);
            let hint = "ENTER: restart";
            canvas.text(center_text_x(hint, ctx.width), 130.0, hint, palette::GRAY);
            return;
        }

        for bullet in self.bullets.iter() {
            let tl = bullet.top_left();
            let size = bullet.half_extents() * 2.0;
            canvas.rect(tl.x, tl.y, size.x, size.y, palette::CYAN);
        }
        for ball in self.balls.iter() {
            canvas.circ(ball.pos.x, ball.pos.y, ball.radius(), ball.color);
        }
        canvas.rect(
            self.paddle.x,
            self.paddle.y,
            self.paddle.width,
            self.paddle.height,
            palette::LIME,
        );

        canvas.text(5.0, 5.0, &format!("Score:  {}", self.progress.score), palette::BLACK);
        canvas.text(5.0, 15.0, &format!("Misses: {}", self.progress.misses), palette::BLACK);
        canvas.text(5.0, 25.0, "R: slow+shrink pad", palette::BLACK);
        canvas.text(5.0, 35.0, "Z: shoot bullet", palette::BLACK);
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        if self.scene.is(Scene::GameOver) {
            let mut state = InputState::at(ctx.width / 2.0, ctx.height / 2.0);
            if ctx.frame % 2 == 0 {
                state = state.hold(Key::Enter);
            }
            return state;
        }

        // Track the lowest ball; tap Z every half second
        let target = self
            .balls
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map_or(ctx.width / 2.0, |b| b.pos.x);
        let mut state = InputState::at(target, self.paddle.y);
        if ctx.frame % 15 < 2 {
            state = state.hold(Key::Z);
        }
        state
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "score": self.progress.score,
            "misses": self.progress.misses,
            "level": self.progress.level,
            "speed": self.progress.speed,
            "balls": self.balls.len(),
            "bullets": self.bullets.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{InputSnapshot, InputTracker};

    fn ctx(frame: u64, input: InputSnapshot) -> FrameContext {
        FrameContext::new(WIDTH as f32, HEIGHT as f32, frame, input)
    }

    fn place_ball(game: &mut CatchGame, pos: Vec2, vel: Vec2, variant: BallVariant) {
        game.balls.as_mut_slice()[0].respawn(Spawn::circle(
            EntityKind::Ball { variant },
            pos,
            vel,
            BALL_RADIUS,
            variant.color(),
        ));
    }

    #[test]
    fn test_fresh_state() {
        let game = CatchGame::new(&Settings::default(), 1);
        assert_eq!(game.balls.len(), 1);
        assert_eq!(game.progress.score, 0);
        assert_eq!(game.paddle.width, 40.0);
        assert_eq!(game.paddle.y, 190.0);
        let ball = &game.balls.as_slice()[0];
        assert_eq!(ball.pos.y, 0.0);
        assert!(ball.vel.y > 0.0);
    }

    #[test]
    fn test_bullet_hit_beats_bottom_edge() {
        let mut game = CatchGame::new(&Settings::default(), 3);
        place_ball(&mut game, Vec2::new(100.0, 198.0), Vec2::new(0.0, 1.0), BallVariant::Normal);
        game.progress.speed = 5.0;
        game.bullets
            .spawn(crate::sim::bullet(
                Vec2::new(100.0, 197.0),
                Vec2::new(0.0, 0.0),
                crate::sim::Owner::Player,
                palette::CYAN,
            ))
            .unwrap();

        let mut out = FrameOutput::default();
        let mut tracker = InputTracker::new();
        // Paddle far to the left: the crossing would have been a miss
        let input = tracker.sample(InputState::at(10.0, 100.0));
        game.update(&ctx(0, input), &mut out);

        assert_eq!(game.progress.misses, 0);
        assert_eq!(game.progress.score, 1);
        assert!(game.bullets.is_empty());
        assert_eq!(game.balls.as_slice()[0].pos.y, 0.0);
    }

    #[test]
    fn test_r_slows_and_shrinks() {
        let mut game = CatchGame::new(&Settings::default(), 3);
        game.progress.speed = 2.5;
        let mut tracker = InputTracker::new();
        let input = tracker.sample(InputState::at(100.0, 100.0).hold(Key::R));
        game.update(&ctx(0, input), &mut FrameOutput::default());
        assert_eq!(game.progress.speed, 1.0);
        assert_eq!(game.paddle.width, 30.0);

        // Holding R doesn't keep shrinking
        let input = tracker.sample(InputState::at(100.0, 100.0).hold(Key::R));
        game.update(&ctx(1, input), &mut FrameOutput::default());
        assert_eq!(game.paddle.width, 30.0);
    }

    #[test]
    fn test_held_z_fires_once() {
        let mut game = CatchGame::new(&Settings::default(), 3);
        let mut tracker = InputTracker::new();
        let mut out = FrameOutput::default();
        for frame in 0..20 {
            let input = tracker.sample(InputState::at(100.0, 100.0).hold(Key::Z));
            game.update(&ctx(frame, input), &mut out);
        }
        assert_eq!(out.sounds.iter().filter(|s| **s == SoundEffect::Shoot).count(), 1);
    }

    #[test]
    fn test_miss_limit_then_restart() {
        let mut game = CatchGame::new(&Settings::default(), 9);
        game.progress.misses = 9;
        place_ball(&mut game, Vec2::new(5.0, 195.0), Vec2::new(0.0, 1.0), BallVariant::Normal);
        game.progress.speed = 10.0;

        let mut tracker = InputTracker::new();
        let mut out = FrameOutput::default();
        let input = tracker.sample(InputState::at(190.0, 100.0));
        game.update(&ctx(0, input), &mut out);
        assert!(game.scene.is(Scene::GameOver));
        assert!(out.sounds.contains(&SoundEffect::GameOver));

        let input = tracker.sample(InputState::at(190.0, 100.0).hold(Key::Enter));
        game.update(&ctx(1, input), &mut out);
        assert!(game.scene.is(Scene::Play));
        assert_eq!(game.progress, CatchGame::new(&Settings::default(), 9).progress);
        assert_eq!(game.balls.len(), 1);
    }

    #[test]
    fn test_game_over_screen() {
        let mut game = CatchGame::new(&Settings::default(), 9);
        game.scene.fire(SceneEvent::Terminal);
        game.progress.score = 12;
        let mut buf = crate::renderer::CommandBuffer::new();
        game.draw(&ctx(0, InputSnapshot::default()), &mut buf);
        assert!(buf.has_text("GAME OVER"));
        assert!(buf.has_text("Final Score: 12"));
    }
}
