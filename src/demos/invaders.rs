//! Formation march
//!
//! A 5×3 block of aliens sweeps sideways and drops a row each time it touches
//! an edge. The ship tracks the pointer (or the arrow keys) along the bottom
//! and has one shot on screen at a time.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde_json::json;

use super::{Starfield, seeded_rng};
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::shapes::ship;
use crate::renderer::{Canvas, palette};
use crate::settings::Settings;
use crate::sim::paddle::BULLET_SIZE;
use crate::sim::{
    Boundary, Bounds, EntityKind, EntityPool, EvictionPolicy, Owner, Paddle, Scene, SceneEvent, SceneMachine,
    Spawn, bullet, first_hit,
};

pub const WIDTH: u32 = 512;
pub const HEIGHT: u32 = 512;
pub const FPS: u32 = 30;

const PLAYER_SIZE: Vec2 = Vec2::new(16.0, 8.0);
/// Gap between the ship and the bottom edge
const PLAYER_MARGIN: f32 = 20.0;
const PLAYER_KEY_SPEED: f32 = 4.0;

const ENEMY_SIZE: Vec2 = Vec2::new(8.0, 8.0);
const FORMATION_COLS: u32 = 5;
const FORMATION_ROWS: u32 = 3;
/// Top-left corner of the first alien
const FORMATION_ORIGIN: Vec2 = Vec2::new(60.0, 60.0);
const FORMATION_SPACING: Vec2 = Vec2::new(30.0, 20.0);
const MARCH_SPEED: f32 = 2.0;
const MARCH_DROP: f32 = 10.0;

const BULLET_SPEED: f32 = 4.0;
const STAR_COUNT: usize = 60;

#[derive(Debug, Clone)]
pub struct Invaders {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub player: Paddle,
    pub enemies: EntityPool,
    /// Holds at most one shot
    pub shot: EntityPool,
    /// +1 marching right, -1 marching left
    pub direction: f32,
    pub score: u32,
    pub won: bool,
    pub scene: SceneMachine,
    pub bounds: Bounds,
    pub stars: Starfield,
}

impl Invaders {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let bounds = Bounds::screen(WIDTH as f32, HEIGHT as f32);
        let stars = Starfield::new(&mut rng, STAR_COUNT, bounds);

        let player = Paddle::new(
            bounds.width() / 2.0,
            bounds.height() - PLAYER_SIZE.y - PLAYER_MARGIN,
            PLAYER_SIZE.x,
            PLAYER_SIZE.y,
        );

        let mut enemies = EntityPool::new("invader", settings.entity_cap, settings.eviction);
        for row in 0..FORMATION_ROWS {
            for col in 0..FORMATION_COLS {
                let top_left = FORMATION_ORIGIN + FORMATION_SPACING * Vec2::new(col as f32, row as f32);
                enemies.spawn(Spawn::rect(
                    EntityKind::Invader,
                    top_left + ENEMY_SIZE / 2.0,
                    Vec2::ZERO,
                    ENEMY_SIZE,
                    palette::YELLOW,
                ));
            }
        }

        Self {
            settings: settings.clone(),
            seed,
            rng,
            player,
            enemies,
            shot: EntityPool::new("shot", 1, EvictionPolicy::RefuseNew),
            direction: 1.0,
            score: 0,
            won: false,
            scene: SceneMachine::new("invaders", Scene::Play),
            bounds,
            stars,
        }
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    /// Horizontal extent of the formation, edges included
    pub fn formation_span(&self) -> Option<(f32, f32)> {
        let half = ENEMY_SIZE.x / 2.0;
        self.enemies.iter().fold(None, |span, e| {
            let (lo, hi) = span.unwrap_or((f32::MAX, f32::MIN));
            Some((lo.min(e.pos.x - half), hi.max(e.pos.x + half)))
        })
    }

    /// Either drop a row and turn around, or take one sideways step
    fn march(&mut self) {
        let Some((min_x, max_x)) = self.formation_span() else {
            return;
        };
        let at_edge = (self.direction > 0.0 && max_x >= self.bounds.max.x)
            || (self.direction < 0.0 && min_x <= self.bounds.min.x);

        let offset = if at_edge {
            self.direction = -self.direction;
            Vec2::new(0.0, MARCH_DROP)
        } else {
            Vec2::new(MARCH_SPEED * self.direction, 0.0)
        };
        for enemy in self.enemies.iter_mut() {
            enemy.pos += offset;
        }
    }

    fn move_player(&mut self, ctx: &FrameContext) {
        let axis = ctx.input.axis_x();
        if axis != 0.0 {
            self.player.steer(axis * PLAYER_KEY_SPEED, self.bounds.width());
        } else {
            self.player.follow_pointer(ctx.input.pointer.x, self.bounds.width());
        }
    }

    fn fire(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        if !ctx.input.just_pressed(Key::MouseLeft) || !self.shot.is_empty() {
            return;
        }
        let muzzle = Vec2::new(self.player.center_x(), self.player.y - BULLET_SIZE.y / 2.0);
        let spawn = bullet(muzzle, Vec2::new(0.0, -BULLET_SPEED), Owner::Player, palette::WHITE);
        if self.shot.spawn(spawn).is_some() {
            out.play(SoundEffect::Shoot);
        }
    }

    fn update_shot(&mut self, out: &mut FrameOutput) {
        for (id, _) in self.shot.step_all(1.0, &Boundary::PROJECTILE, &self.bounds) {
            self.shot.kill(id);
        }
        self.shot.sweep();

        // One shot takes out at most one alien
        let Some(shot) = self.shot.iter().next().cloned() else {
            return;
        };
        if let Some(hit) = first_hit(&shot, self.enemies.as_slice()) {
            self.enemies.as_mut_slice()[hit].kill();
            self.enemies.sweep();
            self.shot.clear();
            self.score += 1;
            out.play(SoundEffect::Explosion);
        }
    }

    /// Defeat when any alien reaches the ship's row, victory when none are left
    fn check_outcome(&mut self, out: &mut FrameOutput) {
        let landed = self
            .enemies
            .iter()
            .any(|e| e.pos.y + ENEMY_SIZE.y / 2.0 >= self.player.y);
        let cleared = self.enemies.is_empty();
        if !landed && !cleared {
            return;
        }

        self.won = !landed;
        self.scene.fire(SceneEvent::Terminal);
        if self.won {
            log::info!("invaders: formation cleared, score {}", self.score);
            out.play(SoundEffect::Victory);
        } else {
            log::info!("invaders: formation landed, score {}", self.score);
            out.play(SoundEffect::GameOver);
        }
    }
}

impl Demo for Invaders {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Invaders",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.scene.tick();
        if ctx.input.just_pressed(Key::Q) {
            out.quit();
            return;
        }

        if self.scene.is(Scene::GameOver) {
            if ctx.input.just_pressed(Key::R) {
                log::info!("invaders: restart");
                *self = self.reset();
            }
            return;
        }

        self.stars.update(&mut self.rng);
        self.move_player(ctx);
        self.fire(ctx, out);
        self.update_shot(out);
        self.march();
        self.check_outcome(out);
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::BLACK);
        self.stars.draw(canvas);

        ship(canvas, Vec2::new(self.player.x, self.player.y), PLAYER_SIZE, palette::LIME);
        for shot in self.shot.iter() {
            let tl = shot.top_left();
            let size = shot.half_extents() * 2.0;
            canvas.rect(tl.x, tl.y, size.x, size.y, shot.color);
        }
        for enemy in self.enemies.iter() {
            let tl = enemy.top_left();
            canvas.rect(tl.x, tl.y, ENEMY_SIZE.x, ENEMY_SIZE.y, enemy.color);
        }

        canvas.text(5.0, 5.0, &format!("SCORE: {}", self.score), palette::WHITE);

        if self.scene.is(Scene::GameOver) {
            let (msg, col) = if self.won {
                ("YOU WIN!", palette::YELLOW)
            } else {
                ("GAME OVER", palette::RED)
            };
            let x = center_text_x(msg, ctx.width);
            let y = (ctx.height / 2.0).floor();
            canvas.text(x, y, msg, col);
            canvas.text(x - 20.0, y + 10.0, "Press R to Restart", palette::WHITE);
        }
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        if self.scene.is(Scene::GameOver) {
            let state = InputState::at(ctx.width / 2.0, ctx.height / 2.0);
            return if ctx.frame % 2 == 0 { state.hold(Key::R) } else { state };
        }

        // Aim at the lowest alien, leading it by its march direction
        let target = self
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x + self.direction * MARCH_SPEED * 4.0)
            .unwrap_or(ctx.width / 2.0);
        let state = InputState::at(target, ctx.height - 10.0);
        if ctx.frame % 2 == 0 && self.shot.is_empty() {
            state.hold(Key::MouseLeft)
        } else {
            state
        }
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "score": self.score,
            "won": self.won,
            "remaining": self.enemies.len(),
            "direction": self.direction,
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

    fn step(game: &mut Invaders, tracker: &mut InputTracker, state: InputState, frame: u64) -> FrameOutput {
        let mut out = FrameOutput::default();
        game.update(&ctx(frame, tracker.sample(state)), &mut out);
        out
    }

    #[test]
    fn test_formation_layout() {
        let game = Invaders::new(&Settings::default(), 1);
        assert_eq!(game.enemies.len(), 15);
        assert_eq!(game.formation_span(), Some((60.0, 188.0)));
        assert_eq!(game.player.y, 484.0);
    }

    #[test]
    fn test_march_drops_at_edge() {
        let mut game = Invaders::new(&Settings::default(), 1);
        for e in game.enemies.iter_mut() {
            e.pos.x += 322.0;
        }
        let y0 = game.enemies.as_slice()[0].pos.y;
        game.march();
        assert_eq!(game.formation_span(), Some((384.0, 512.0)));
        game.march();
        assert_eq!(game.direction, -1.0);
        assert_eq!(game.enemies.as_slice()[0].pos.y, y0 + MARCH_DROP);
        game.march();
        assert_eq!(game.formation_span(), Some((382.0, 510.0)));
    }

    #[test]
    fn test_one_shot_at_a_time() {
        let mut game = Invaders::new(&Settings::default(), 2);
        let mut tracker = InputTracker::new();
        let click = InputState::at(256.0, 400.0).hold(Key::MouseLeft);
        let out = step(&mut game, &mut tracker, click, 0);
        assert_eq!(out.sounds, vec![SoundEffect::Shoot]);
        step(&mut game, &mut tracker, InputState::at(256.0, 400.0), 1);
        step(&mut game, &mut tracker, click, 2);
        assert_eq!(game.shot.len(), 1);
        assert_eq!(game.shot.refused, 0);
    }

    #[test]
    fn test_shot_destroys_single_alien() {
        let mut game = Invaders::new(&Settings::default(), 3);
        let target = game.enemies.as_slice()[12].pos;
        game.shot.spawn(bullet(target + Vec2::new(0.0, 8.0), Vec2::new(0.0, -4.0), Owner::Player, 7));
        let mut out = FrameOutput::default();
        game.update_shot(&mut out);
        assert_eq!(game.score, 1);
        assert_eq!(game.enemies.len(), 14);
        assert!(game.shot.is_empty());
    }

    #[test]
    fn test_landing_is_defeat() {
        let mut game = Invaders::new(&Settings::default(), 4);
        for e in game.enemies.iter_mut() {
            e.pos.y += 400.0;
        }
        let mut tracker = InputTracker::new();
        let out = step(&mut game, &mut tracker, InputState::at(256.0, 400.0), 0);
        assert!(game.scene.is(Scene::GameOver));
        assert!(!game.won);
        assert!(out.sounds.contains(&SoundEffect::GameOver));

        step(&mut game, &mut tracker, InputState::at(256.0, 400.0).hold(Key::R), 1);
        assert!(game.scene.is(Scene::Play));
        assert_eq!(game.enemies.len(), 15);
    }

    #[test]
    fn test_clearing_is_victory() {
        let mut game = Invaders::new(&Settings::default(), 5);
        game.enemies.clear();
        let mut tracker = InputTracker::new();
        step(&mut game, &mut tracker, InputState::at(256.0, 400.0), 0);
        assert!(game.won);

        let mut buf = CommandBuffer::new();
        game.draw(&ctx(1, InputSnapshot::default()), &mut buf);
        assert!(buf.has_text("YOU WIN!"));
    }

    #[test]
    fn test_q_quits() {
        let mut game = Invaders::new(&Settings::default(), 6);
        let mut tracker = InputTracker::new();
        let out = step(&mut game, &mut tracker, InputState::at(0.0, 0.0).hold(Key::Q), 0);
        assert!(out.quit);
    }
}
