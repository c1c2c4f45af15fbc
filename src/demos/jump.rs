//! Cloud jumper
//!
//! The player drops in from above under gravity and stays aloft by stomping
//! floors that scroll in from the right. A stomped floor sinks out of play
//! and comes back re-rolled once it scrolls past the left edge. Falling off
//! the bottom ends the run; the player drops back in once well out of sight.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde_json::json;

use super::seeded_rng;
use crate::audio::SoundEffect;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::{Canvas, Color, SpriteRegion, palette};
use crate::settings::Settings;
use crate::sim::{
    Boundary, Bounds, Entity, EntityKind, EntityPool, EvictionPolicy, Scene, SceneEvent, SceneMachine, Spawn, fall,
    overlaps, step,
};

pub const WIDTH: u32 = 160;
pub const HEIGHT: u32 = 120;
pub const FPS: u32 = 30;

const PLAYER_SIZE: Vec2 = Vec2::new(16.0, 16.0);
/// Top-left corner the player drops in from
const PLAYER_START: Vec2 = Vec2::new(72.0, -16.0);
const MOVE_SPEED: f32 = 2.0;
const GRAVITY: f32 = 1.0;
const TERMINAL_VY: f32 = 8.0;
const STOMP_BOUNCE: f32 = -12.0;
const STOMP_SCORE: u32 = 10;
/// Depth (top edge) at which a fallen player drops back in
const RESPAWN_DEPTH: f32 = 600.0;

const FLOOR_SIZE: Vec2 = Vec2::new(40.0, 8.0);
const FLOOR_COUNT: usize = 4;
const FLOOR_SPACING: f32 = 60.0;
const FLOOR_SCROLL: f32 = 4.0;
const FLOOR_SINK: f32 = 6.0;
/// Range for a floor's top edge
const FLOOR_TOP_MIN: i32 = 8;
const FLOOR_TOP_MAX: i32 = 104;

const CLOUD_COUNT: usize = 20;
const NEAR_CLOUD_COUNT: usize = 10;
const CLOUD_SCROLL: f32 = 1.0;

/// Horizontal loop for scrolling things; centers wrap from -20 to 220
const SCROLL_MIN_X: f32 = -20.0;
const SCROLL_MAX_X: f32 = 220.0;

const FLOOR_SPRITE: SpriteRegion = SpriteRegion::new(0, 0, 16, 40, 8);
const SPRITE_KEY: Color = palette::CYAN;

#[derive(Debug, Clone)]
pub struct Jump {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub scene: SceneMachine,
    pub player: Entity,
    pub floors: EntityPool,
    /// Far clouds drift left and loop
    pub clouds: EntityPool,
    /// Near clouds stay put
    pub near_clouds: Vec<Vec2>,
    pub score: u32,
    pub best: u32,
    pub stomps: u32,
    pub falls: u32,
    pub bounds: Bounds,
    pub scroll_bounds: Bounds,
}

impl Jump {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let bounds = Bounds::screen(WIDTH as f32, HEIGHT as f32);
        let scroll_bounds = Bounds {
            min: Vec2::new(SCROLL_MIN_X, 0.0),
            max: Vec2::new(SCROLL_MAX_X, HEIGHT as f32),
        };

        let mut floors = EntityPool::new("floor", FLOOR_COUNT, EvictionPolicy::RefuseNew);
        for i in 0..FLOOR_COUNT {
            let x = i as f32 * FLOOR_SPACING + FLOOR_SIZE.x / 2.0;
            let pos = Vec2::new(x, Self::random_floor_y(&mut rng));
            floors.spawn(Self::floor(pos));
        }

        let mut clouds = EntityPool::new("cloud", CLOUD_COUNT, EvictionPolicy::RefuseNew);
        for _ in 0..CLOUD_COUNT {
            let pos = Vec2::new(rng.random_range(0..=200) as f32, rng.random_range(0..=120) as f32);
            clouds.spawn(Spawn::circle(
                EntityKind::Cloud,
                pos,
                Vec2::new(-CLOUD_SCROLL, 0.0),
                0.0,
                palette::WHITE,
            ));
        }
        let near_clouds = (0..NEAR_CLOUD_COUNT)
            .map(|_| Vec2::new(rng.random_range(0..=160) as f32, rng.random_range(0..=120) as f32))
            .collect();

        Self {
            settings: settings.clone(),
            seed,
            rng,
            scene: SceneMachine::new("jump", Scene::Play),
            player: Self::fresh_player(),
            floors,
            clouds,
            near_clouds,
            score: 0,
            best: 0,
            stomps: 0,
            falls: 0,
            bounds,
            scroll_bounds,
        }
    }

    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    fn fresh_player() -> Entity {
        Entity::new(
            0,
            Spawn::rect(
                EntityKind::Jumper,
                PLAYER_START + PLAYER_SIZE / 2.0,
                Vec2::ZERO,
                PLAYER_SIZE,
                palette::LIME,
            ),
        )
    }

    fn floor(pos: Vec2) -> Spawn {
        Spawn::rect(
            EntityKind::Floor { solid: true },
            pos,
            Vec2::new(-FLOOR_SCROLL, 0.0),
            FLOOR_SIZE,
            palette::BROWN,
        )
    }

    /// Center y for a floor whose top edge lands in the allowed band
    fn random_floor_y(rng: &mut Pcg32) -> f32 {
        rng.random_range(FLOOR_TOP_MIN..=FLOOR_TOP_MAX) as f32 + FLOOR_SIZE.y / 2.0
    }

    /// A stomp needs the player falling onto a solid floor
    pub fn landed_on(player: &Entity, floor: &Entity) -> bool {
        matches!(floor.kind, EntityKind::Floor { solid: true }) && player.vel.y > 0.0 && overlaps(player, floor)
    }

    /// Stomp check, then scroll; stomped floors sink, wrapped floors are re-rolled
    pub fn update_floors(&mut self, out: &mut FrameOutput) {
        for floor in self.floors.iter_mut() {
            let EntityKind::Floor { solid } = floor.kind else {
                continue;
            };

            if Self::landed_on(&self.player, floor) {
                floor.kind = EntityKind::Floor { solid: false };
                self.player.vel.y = STOMP_BOUNCE;
                self.score += STOMP_SCORE;
                self.stomps += 1;
                out.play(SoundEffect::Stomp);
            }

            floor.vel = if solid {
                Vec2::new(-FLOOR_SCROLL, 0.0)
            } else {
                Vec2::new(-FLOOR_SCROLL, FLOOR_SINK)
            };
            if step(floor, 1.0, &Boundary::SIDE_SCROLL, &self.scroll_bounds).wrapped {
                floor.pos.y = Self::random_floor_y(&mut self.rng);
                floor.kind = EntityKind::Floor { solid: true };
            }
        }
    }

    fn update_player(&mut self, ctx: &FrameContext) {
        self.player.vel.x = ctx.input.axis_x() * MOVE_SPEED;
        step(&mut self.player, 1.0, &Boundary::SIDE_WALLS, &self.bounds);
        fall(&mut self.player, GRAVITY, TERMINAL_VY);
    }

    /// Off the bottom ends the run; far enough down the player drops back in
    fn check_fall(&mut self, out: &mut FrameOutput) {
        let top = self.player.top_left().y;
        if self.scene.is(Scene::Play) && top > self.bounds.max.y {
            self.falls += 1;
            self.best = self.best.max(self.score);
            log::info!("jump: fell with score {}", self.score);
            self.scene.fire(SceneEvent::Terminal);
            out.play(SoundEffect::GameOver);
        } else if self.scene.is(Scene::GameOver) && top > RESPAWN_DEPTH {
            self.score = 0;
            self.player = Self::fresh_player();
            self.scene.fire(SceneEvent::Restart);
        }
    }
}

impl Demo for Jump {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Cloud Jumper",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.scene.tick();
        if ctx.input.just_pressed(Key::Q) {
            out.quit();
            return;
        }

        self.clouds.step_all(1.0, &Boundary::SIDE_SCROLL, &self.scroll_bounds);
        self.update_floors(out);
        self.update_player(ctx);
        self.check_fall(out);
    }

    fn draw(&self, _ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::BLACK);
        for cloud in self.clouds.iter() {
            canvas.pset(cloud.pos.x, cloud.pos.y, cloud.color);
        }
        for p in &self.near_clouds {
            canvas.pset(p.x, p.y, palette::YELLOW);
        }

        for floor in self.floors.iter() {
            let tl = floor.top_left();
            canvas.blt(tl.x, tl.y, FLOOR_SPRITE, Some(SPRITE_KEY));
        }

        // Second frame of the sprite while falling
        let u = if self.player.vel.y > 0.0 { 16 } else { 0 };
        let tl = self.player.top_left();
        canvas.blt(tl.x, tl.y, SpriteRegion::new(0, u, 0, 16, 16), Some(SPRITE_KEY));

        let score = format!("SCORE {:>4}", self.score);
        canvas.text(5.0, 4.0, &score, palette::NAVY);
        canvas.text(4.0, 4.0, &score, palette::WHITE);
    }

    /// Steer toward the closest solid floor below the player
    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        let state = InputState::at(ctx.width / 2.0, ctx.height / 2.0);
        let player = &self.player;
        let target = self
            .floors
            .iter()
            .filter(|f| matches!(f.kind, EntityKind::Floor { solid: true }) && f.pos.y > player.pos.y)
            .min_by(|a, b| (a.pos.x - player.pos.x).abs().total_cmp(&(b.pos.x - player.pos.x).abs()));

        match target.map(|f| f.pos.x - player.pos.x) {
            Some(dx) if dx > MOVE_SPEED => state.hold(Key::Right),
            Some(dx) if dx < -MOVE_SPEED => state.hold(Key::Left),
            _ => state,
        }
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "score": self.score,
            "best": self.best.max(self.score),
            "stomps": self.stomps,
            "falls": self.falls,
            "player": [self.player.pos.x, self.player.pos.y],
        })
    }
}
