//! Vertical shooter
//!
//! Menu → game → game over. The ship eases toward the pointer and fires on
//! Space. Enemies drift down in one of three movement patterns and shoot at
//! random; after enough kills a boss takes over the field and cycles through
//! three volley patterns. Defeating the boss raises the level, which speeds
//! up enemy spawns.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Starfield, seeded_rng};
use crate::audio::SoundEffect;
use crate::center_text_x;
use crate::platform::{Demo, FrameContext, FrameOutput, InputState, Key, ScreenConfig};
use crate::renderer::shapes::{health_bar, ring_points};
use crate::renderer::{Canvas, Color, SpriteRegion, palette};
use crate::settings::Settings;
use crate::sim::collision::boxes_overlap;
use crate::sim::{
    Bounds, EnemyPattern, Entity, EntityKind, EntityPool, EvictionPolicy, FireControl, Owner,
    Scene, SceneEvent, SceneMachine, Shape, Spawn, fall,
};

pub const WIDTH: u32 = 256;
pub const HEIGHT: u32 = 192;
pub const FPS: u32 = 60;

const SHIP_SPRITE: SpriteRegion = SpriteRegion::new(0, 0, 0, 16, 16);
const ENEMY_SPRITE: SpriteRegion = SpriteRegion::new(0, 16, 0, 8, 8);
const POWERUP_SPRITE: SpriteRegion = SpriteRegion::new(0, 24, 0, 8, 8);
const BOSS_SPRITE: SpriteRegion = SpriteRegion::new(0, 32, 8, 32, 32);

const STAR_COUNT: usize = 100;
const TRAIL_LEN: usize = 20;
/// Fraction of the remaining distance the ship covers each frame
const SHIP_EASING: f32 = 0.15;
const SHIP_MARGIN: f32 = 8.0;
const PLAYER_BULLET_SPEED: f32 = 8.0;
const ENEMY_BULLET_SPEED: f32 = 3.0;
/// One in N enemies fires each frame
const ENEMY_FIRE_ODDS: u32 = 121;
const POWERUP_FALL_SPEED: f32 = 2.0;
const POWERUP_HEAL: i32 = 20;
const BULLET_DAMAGE: i32 = 10;

/// Half-size of the box a player bullet must land in to hit an enemy
const ENEMY_HIT_BOX: Vec2 = Vec2::new(8.0, 8.0);
const BOSS_HIT_BOX: Vec2 = Vec2::new(32.0, 16.0);
const PLAYER_HIT_BOX: Vec2 = Vec2::new(12.0, 12.0);

const SCORE_ENEMY: u32 = 100;
const SCORE_BOSS: u32 = 1000;
const SCORE_POWERUP: u32 = 50;

/// Boss volley patterns, cycled in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossPattern {
    /// A row of five parallel shots
    #[default]
    Straight,
    /// Seven shots spread downward
    Fan,
    /// Twelve shots in a full circle
    Ring,
}

impl BossPattern {
    /// Frames a pattern lasts before the next one takes over
    pub const PHASE_FRAMES: u32 = 180;

    pub fn next(self) -> Self {
        match self {
            BossPattern::Straight => BossPattern::Fan,
            BossPattern::Fan => BossPattern::Ring,
            BossPattern::Ring => BossPattern::Straight,
        }
    }

    /// Frames between volleys
    pub fn period(self) -> u32 {
        match self {
            BossPattern::Straight => 8,
            BossPattern::Fan => 12,
            BossPattern::Ring => 15,
        }
    }

    /// Positions and velocities of one volley fired from `muzzle`
    pub fn volley(self, muzzle: Vec2) -> Vec<(Vec2, Vec2)> {
        match self {
            BossPattern::Straight => (0..5)
                .map(|i| (Vec2::new(muzzle.x - 60.0 + i as f32 * 30.0, muzzle.y), Vec2::new(0.0, 4.0)))
                .collect(),
            BossPattern::Fan => (0..7)
                .map(|i| {
                    let angle = (i as f32 - 3.0) * 0.3;
                    (muzzle, Vec2::new(angle.sin() * 3.0, angle.cos() * 3.0 + 2.0))
                })
                .collect(),
            BossPattern::Ring => (0..12)
                .map(|i| {
                    let angle = i as f32 * TAU / 12.0;
                    (muzzle, Vec2::new(angle.cos() * 2.0, angle.sin() * 2.0 + 1.0))
                })
                .collect(),
        }
    }
}

/// The boss; at most one at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub vel_x: f32,
    pub health: i32,
    pub max_health: i32,
    pub pattern: BossPattern,
    pub shoot_timer: u32,
    pub phase_timer: u32,
}

impl Boss {
    /// Horizontal patrol range
    const MIN_X: f32 = 50.0;
    const MAX_X: f32 = 206.0;

    pub fn new(pos: Vec2, health: i32) -> Self {
        Self {
            pos,
            vel_x: 1.0,
            health,
            max_health: health,
            pattern: BossPattern::Straight,
            shoot_timer: 0,
            phase_timer: 0,
        }
    }

    pub fn muzzle(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, 16.0)
    }

    /// Patrol and advance the pattern clock. Returns the volley to fire, if any.
    pub fn advance(&mut self) -> Vec<(Vec2, Vec2)> {
        self.pos.x += self.vel_x;
        if self.pos.x <= Self::MIN_X || self.pos.x >= Self::MAX_X {
            self.vel_x = -self.vel_x;
        }

        self.shoot_timer += 1;
        self.phase_timer += 1;
        if self.phase_timer > BossPattern::PHASE_FRAMES {
            self.pattern = self.pattern.next();
            self.phase_timer = 0;
        }

        if self.shoot_timer % self.pattern.period() == 0 {
            self.pattern.volley(self.muzzle())
        } else {
            Vec::new()
        }
    }

    pub fn health_ratio(&self) -> f32 {
        self.health as f32 / self.max_health.max(1) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    pub settings: Settings,
    pub seed: u64,
    pub rng: Pcg32,
    pub scene: SceneMachine,
    pub frame: u64,
    pub bounds: Bounds,

    pub player: Player,
    pub fire: FireControl,
    pub bullets: EntityPool,
    pub enemies: EntityPool,
    pub powerups: EntityPool,
    pub particles: EntityPool,
    pub explosions: EntityPool,
    pub stars: Starfield,
    pub boss: Option<Boss>,

    /// Recent pointer positions, newest last
    pub trail: VecDeque<Vec2>,
    pub camera: Vec2,
    pub shake: i32,

    pub score: u32,
    pub level: u32,
    /// Kills since the last boss
    pub kills: u32,
    pub bosses_defeated: u32,
    pub spawn_timer: u32,
}

impl Shooter {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let bounds = Bounds::screen(WIDTH as f32, HEIGHT as f32);
        let stars = Starfield::new(&mut rng, STAR_COUNT, bounds);
        let cap = settings.entity_cap;
        let tuning = &settings.shooter;

        Self {
            settings: settings.clone(),
            seed,
            rng,
            scene: SceneMachine::new("shooter", Scene::Title),
            frame: 0,
            bounds,
            player: Player {
                pos: Vec2::new(bounds.width() / 2.0, 150.0),
                health: tuning.player_health,
                max_health: tuning.player_health,
            },
            fire: FireControl::new(tuning.fire_cooldown),
            bullets: EntityPool::new("bullet", cap, settings.eviction),
            enemies: EntityPool::new("enemy", cap, settings.eviction),
            powerups: EntityPool::new("powerup", cap, settings.eviction),
            particles: EntityPool::new("particle", settings.max_particles(), EvictionPolicy::DropOldest),
            explosions: EntityPool::new("explosion", cap, EvictionPolicy::DropOldest),
            stars,
            boss: None,
            trail: VecDeque::with_capacity(TRAIL_LEN),
            camera: Vec2::ZERO,
            shake: 0,
            score: 0,
            level: 1,
            kills: 0,
            bosses_defeated: 0,
            spawn_timer: 0,
        }
    }

    /// Fresh state on the menu
    pub fn reset(&self) -> Self {
        Self::new(&self.settings, self.seed)
    }

    /// Fresh state straight into play
    pub fn restart(&self) -> Self {
        let mut next = self.reset();
        next.scene = SceneMachine::new("shooter", Scene::Play);
        next
    }

    /// Frames between enemy spawns at the current level
    pub fn spawn_interval(&self) -> u32 {
        30u32.saturating_sub(self.level * 2).max(10)
    }

    fn add_particle(&mut self, pos: Vec2, vel: Vec2, color: Color, life: u32) {
        self.particles.spawn(Spawn::circle(
            EntityKind::Particle { life, max_life: life },
            pos,
            vel,
            0.0,
            color,
        ));
    }

    fn explode(&mut self, pos: Vec2) {
        self.explosions
            .spawn(Spawn::circle(EntityKind::Explosion { life: 30 }, pos, Vec2::ZERO, 0.0, palette::ORANGE));
        for _ in 0..15 {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(1.0..4.0);
            let color = *[palette::RED, palette::ORANGE, palette::YELLOW]
                .choose(&mut self.rng)
                .unwrap_or(&palette::RED);
            let life = self.rng.random_range(20..=40);
            self.add_particle(pos, Vec2::new(angle.cos(), angle.sin()) * speed, color, life);
        }
    }

    fn enemy_bullet(&mut self, pos: Vec2, vel: Vec2) {
        self.bullets.spawn(Spawn::rect(
            EntityKind::Bullet { owner: Owner::Enemy },
            pos,
            vel,
            Vec2::new(2.0, 4.0),
            palette::RED,
        ));
    }

    fn update_player(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        let target = ctx.input.pointer.clamp(
            Vec2::splat(SHIP_MARGIN),
            self.bounds.max - Vec2::splat(SHIP_MARGIN),
        );
        self.player.pos += (target - self.player.pos) * SHIP_EASING;

        if self.fire.trigger(ctx.input.held(Key::Space), ctx.frame) {
            let muzzle = self.player.pos - Vec2::new(0.0, 8.0);
            self.bullets.spawn(Spawn::rect(
                EntityKind::Bullet { owner: Owner::Player },
                muzzle,
                Vec2::new(0.0, -PLAYER_BULLET_SPEED),
                Vec2::new(2.0, 4.0),
                palette::LIME,
            ));
            out.play(SoundEffect::Shoot);

            for _ in 0..5 {
                let pos = muzzle + Vec2::new(self.rng.random_range(-4..=4) as f32, 0.0);
                let vel = Vec2::new(self.rng.random_range(-2.0..2.0), self.rng.random_range(-4.0..-1.0));
                let color = *[palette::ORANGE, palette::YELLOW, palette::LIME]
                    .choose(&mut self.rng)
                    .unwrap_or(&palette::YELLOW);
                self.add_particle(pos, vel, color, 15);
            }
        }
    }

    fn update_bullets(&mut self) {
        let margin = Vec2::splat(10.0);
        for bullet in self.bullets.iter_mut() {
            bullet.pos += bullet.vel;
            if !self.bounds.contains_with_margin(bullet.pos, margin) {
                bullet.kill();
            }
        }
        self.bullets.sweep();
    }

    fn update_enemies(&mut self) {
        let mut shots = Vec::new();
        for enemy in self.enemies.iter_mut() {
            if let EntityKind::Enemy { pattern, phase } = &mut enemy.kind {
                match pattern {
                    EnemyPattern::Straight => enemy.pos += enemy.vel,
                    EnemyPattern::Sine => {
                        enemy.pos.y += enemy.vel.y;
                        enemy.pos.x += (enemy.pos.y * 0.1).sin() * 2.0;
                    }
                    EnemyPattern::Spiral => {
                        *phase += 0.1;
                        enemy.pos.x += phase.cos() * 2.0;
                        enemy.pos.y += enemy.vel.y;
                    }
                }
            }
            enemy.check_invariants();

            if self.rng.random_range(0..ENEMY_FIRE_ODDS) == 0 {
                shots.push(enemy.pos + Vec2::new(0.0, 8.0));
            }
            if enemy.pos.y > self.bounds.max.y + 8.0 {
                enemy.kill();
            }
        }
        self.enemies.sweep();
        for pos in shots {
            self.enemy_bullet(pos, Vec2::new(0.0, ENEMY_BULLET_SPEED));
        }
    }

    fn update_powerups(&mut self) {
        for powerup in self.powerups.iter_mut() {
            powerup.pos.y += POWERUP_FALL_SPEED;
            if let EntityKind::PowerUp { spin } = &mut powerup.kind {
                *spin += 0.2;
            }
            if powerup.pos.y > self.bounds.max.y + 8.0 {
                powerup.kill();
            }
        }
        self.powerups.sweep();
    }

    fn update_boss(&mut self, out: &mut FrameOutput) {
        if self.boss.is_none() && self.kills >= self.settings.shooter.boss_threshold {
            let boss = Boss::new(Vec2::new(self.bounds.width() / 2.0, 40.0), self.settings.shooter.boss_health);
            log::info!("shooter: boss incoming (level {}, {} hp)", self.level, boss.health);
            self.boss = Some(boss);
            self.shake = 20;
            out.play(SoundEffect::BossAlarm);
            return;
        }

        let volley = match self.boss.as_mut() {
            Some(boss) => boss.advance(),
            None => return,
        };
        for (pos, vel) in volley {
            self.enemy_bullet(pos, vel);
        }
    }

    fn spawn_enemies(&mut self) {
        if self.boss.is_some() {
            return;
        }
        self.spawn_timer += 1;
        if self.spawn_timer <= self.spawn_interval() {
            return;
        }
        self.spawn_timer = 0;

        let pattern = *EnemyPattern::ALL.choose(&mut self.rng).unwrap_or(&EnemyPattern::Straight);
        let x = self.rng.random_range(20..=236) as f32;
        let speed = self.rng.random_range(1.0..3.0);
        let vx = if pattern == EnemyPattern::Straight {
            self.rng.random_range(-1.0..1.0)
        } else {
            0.0
        };
        self.enemies.spawn(Spawn::rect(
            EntityKind::Enemy { pattern, phase: 0.0 },
            Vec2::new(x, -10.0),
            Vec2::new(vx, speed),
            Vec2::splat(8.0),
            palette::RED,
        ));
    }

    fn check_collisions(&mut self, out: &mut FrameOutput) {
        // Player bullets against enemies
        let mut enemy_hits = Vec::new();
        for bullet in self.bullets.as_mut_slice() {
            if !bullet.alive || bullet.kind != (EntityKind::Bullet { owner: Owner::Player }) {
                continue;
            }
            let hit = self
                .enemies
                .as_mut_slice()
                .iter_mut()
                .find(|e| e.alive && boxes_overlap(bullet.pos, ENEMY_HIT_BOX, e.pos, Vec2::ZERO));
            if let Some(enemy) = hit {
                bullet.kill();
                enemy.kill();
                enemy_hits.push(enemy.pos);
            }
        }
        for pos in enemy_hits {
            self.score += SCORE_ENEMY;
            self.kills += 1;
            self.explode(pos);
            out.play(SoundEffect::Explosion);
            if self.rng.random_range(0..self.settings.shooter.powerup_odds.max(1)) == 0 {
                self.powerups.spawn(Spawn::circle(
                    EntityKind::PowerUp { spin: 0.0 },
                    pos,
                    Vec2::new(0.0, POWERUP_FALL_SPEED),
                    4.0,
                    palette::YELLOW,
                ));
            }
        }

        // Player bullets against the boss
        if let Some(boss_pos) = self.boss.as_ref().map(|b| b.pos) {
            let hit = self.bullets.as_mut_slice().iter_mut().find(|b| {
                b.alive
                    && b.kind == (EntityKind::Bullet { owner: Owner::Player })
                    && boxes_overlap(b.pos, BOSS_HIT_BOX, boss_pos, Vec2::ZERO)
            });
            if let Some(bullet) = hit {
                bullet.kill();
                let at = bullet.pos;
                self.explode(at);
                out.play(SoundEffect::Explosion);
                let defeated = self.boss.as_mut().is_some_and(|boss| {
                    boss.health -= 1;
                    boss.health <= 0
                });
                if defeated {
                    self.boss = None;
                    self.explode(boss_pos);
                    self.score += SCORE_BOSS;
                    self.kills = 0;
                    self.bosses_defeated += 1;
                    self.level += 1;
                    log::info!("shooter: boss defeated, level {}", self.level);
                    out.play(SoundEffect::LevelUp);
                }
            }
        }

        // Enemy bullets against the player
        for bullet in self.bullets.as_mut_slice() {
            if !bullet.alive || bullet.kind != (EntityKind::Bullet { owner: Owner::Enemy }) {
                continue;
            }
            if boxes_overlap(bullet.pos, PLAYER_HIT_BOX, self.player.pos, Vec2::ZERO) {
                bullet.kill();
                self.player.health -= BULLET_DAMAGE;
                self.shake = 10;
                out.play(SoundEffect::Miss);
            }
        }
        self.bullets.sweep();
        self.enemies.sweep();

        // Power-up pickup
        for powerup in self.powerups.as_mut_slice() {
            if powerup.alive && boxes_overlap(powerup.pos, PLAYER_HIT_BOX, self.player.pos, Vec2::ZERO) {
                powerup.kill();
                self.player.health = (self.player.health + POWERUP_HEAL).min(self.player.max_health);
                self.score += SCORE_POWERUP;
                out.play(SoundEffect::PowerUp);
            }
        }
        self.powerups.sweep();

        if self.player.health <= 0 && self.scene.fire(SceneEvent::Terminal).is_some() {
            log::info!("shooter: game over with score {}", self.score);
            out.play(SoundEffect::GameOver);
        }
    }

    fn update_camera(&mut self) {
        if self.shake > 0 && self.settings.effective_screen_shake() {
            self.camera = Vec2::new(
                self.rng.random_range(-self.shake..=self.shake) as f32,
                self.rng.random_range(-self.shake..=self.shake) as f32,
            );
        } else {
            self.camera = Vec2::ZERO;
        }
        self.shake = (self.shake - 1).max(0);
    }

    /// Effects keep animating in every scene
    fn update_effects(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            fall(particle, 0.1, f32::INFINITY);
            if let EntityKind::Particle { life, .. } = &mut particle.kind {
                *life = life.saturating_sub(1);
                if *life == 0 {
                    particle.kill();
                }
            }
        }
        self.particles.sweep();

        for explosion in self.explosions.iter_mut() {
            if let EntityKind::Explosion { life } = &mut explosion.kind {
                if *life == 0 {
                    explosion.kill();
                    continue;
                }
                *life -= 1;
                let radius = explosion.radius() + 1.0;
                explosion.shape = Shape::circle(radius);
            }
        }
        self.explosions.sweep();
    }

    fn draw_menu(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        let t = self.frame as f32;
        for i in (0..WIDTH).step_by(16) {
            let x = i as f32;
            canvas.line(x, 0.0, x + (t * 0.1 + x * 0.1).sin() * 20.0, ctx.height, palette::NAVY);
        }
        for (i, p) in self.trail.iter().enumerate() {
            canvas.circb(p.x, p.y, (i / 4) as f32, 13u8.saturating_sub((i / 3) as u8));
        }

        for (y, text, col) in [
            (80.0, "PIXEL ARCADE SHOOTER", palette::WHITE),
            (100.0, "Click to start", palette::CYAN),
            (120.0, "Move with mouse + SPACE to shoot", palette::LIGHT_BLUE),
        ] {
            canvas.text(center_text_x(text, ctx.width), y, text, col);
        }
    }

    fn draw_game(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.camera(self.camera.x, self.camera.y);
        self.stars.draw(canvas);

        let ship = self.player.pos - SHIP_SPRITE.size() / 2.0;
        canvas.blt(ship.x, ship.y, SHIP_SPRITE, Some(palette::BLACK));
        for i in 0..5u64 {
            // Engine exhaust flicker
            let jitter = ((ctx.frame + i * 3) % 5) as f32 - 2.0;
            let col = if (ctx.frame + i) % 2 == 0 { palette::ORANGE } else { palette::YELLOW };
            canvas.pset(self.player.pos.x + jitter, self.player.pos.y + 8.0 + i as f32 * 2.0, col);
        }

        for enemy in self.enemies.iter() {
            let tl = enemy.pos - ENEMY_SPRITE.size() / 2.0;
            canvas.blt(tl.x, tl.y, ENEMY_SPRITE, Some(palette::BLACK));
        }

        if let Some(boss) = &self.boss {
            let tl = boss.pos - BOSS_SPRITE.size() / 2.0;
            canvas.blt(tl.x, tl.y, BOSS_SPRITE, Some(palette::BLACK));
            health_bar(canvas, 78.0, 10.0, 100.0, 4.0, boss.health_ratio(), palette::RED, palette::NAVY);
            canvas.text(78.0, 2.0, "BOSS", palette::WHITE);
        }

        for bullet in self.bullets.iter() {
            let tl = bullet.top_left();
            let size = bullet.half_extents() * 2.0;
            canvas.rect(tl.x, tl.y, size.x, size.y, bullet.color);
        }

        for powerup in self.powerups.iter() {
            let tl = powerup.pos - POWERUP_SPRITE.size() / 2.0;
            canvas.blt(tl.x, tl.y, POWERUP_SPRITE, Some(palette::BLACK));
            let spin = match powerup.kind {
                EntityKind::PowerUp { spin } => spin,
                _ => 0.0,
            };
            for p in ring_points(powerup.pos, 6.0, 4, spin) {
                canvas.pset(p.x, p.y, palette::YELLOW);
            }
        }

        for explosion in self.explosions.iter() {
            canvas.circb(explosion.pos.x, explosion.pos.y, explosion.radius(), explosion.color);
        }

        for particle in self.particles.iter() {
            if let EntityKind::Particle { life, max_life } = particle.kind {
                if life * 2 > max_life {
                    canvas.pset(particle.pos.x, particle.pos.y, particle.color);
                }
            }
        }

        canvas.camera(0.0, 0.0);
        self.draw_hud(canvas);
    }

    fn draw_hud(&self, canvas: &mut dyn Canvas) {
        let ratio = self.player.health.max(0) as f32 / self.player.max_health.max(1) as f32;
        canvas.rect(5.0, 5.0, 50.0, 6.0, palette::BLACK);
        canvas.rect(5.0, 5.0, (50.0 * ratio).floor(), 6.0, palette::RED);
        canvas.text(5.0, 15.0, &format!("Score: {}", self.score), palette::WHITE);
        canvas.text(
            5.0,
            25.0,
            &format!("Defeated: {}/{}", self.kills, self.settings.shooter.boss_threshold),
            palette::WHITE,
        );
        if self.boss.is_some() {
            canvas.text(5.0, 35.0, "BOSS FIGHT!", palette::RED);
        }

        // Mini-map at 1/5 scale
        canvas.rectb(200.0, 5.0, 50.0, 40.0, palette::WHITE);
        for enemy in self.enemies.iter() {
            canvas.pset(200.0 + (enemy.pos.x / 5.0).floor(), 5.0 + (enemy.pos.y / 5.0).floor(), palette::RED);
        }
        canvas.pset(
            200.0 + (self.player.pos.x / 5.0).floor(),
            5.0 + (self.player.pos.y / 5.0).floor(),
            palette::LIME,
        );
    }

    fn draw_game_over(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        let score = format!("Final Score: {}", self.score);
        for (y, text, col) in [
            (80.0, "GAME OVER", palette::RED),
            (100.0, score.as_str(), palette::WHITE),
            (120.0, "Press R to restart", palette::CYAN),
        ] {
            canvas.text(center_text_x(text, ctx.width), y, text, col);
        }
    }

    /// Live entities across every pool (for summaries and cap checks)
    pub fn entity_count(&self) -> usize {
        self.bullets.len() + self.enemies.len() + self.powerups.len() + self.particles.len() + self.explosions.len()
    }

    fn nearest_threat(&self) -> Option<&Entity> {
        self.enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    }
}

impl Demo for Shooter {
    fn screen(&self) -> ScreenConfig {
        ScreenConfig {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,
            title: "Shooter",
        }
    }

    fn update(&mut self, ctx: &FrameContext, out: &mut FrameOutput) {
        self.frame += 1;
        self.scene.tick();

        if self.trail.len() == TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back(ctx.input.pointer);

        match self.scene.scene {
            Scene::Title => {
                let start = ctx.input.just_pressed(Key::Space) || ctx.input.just_pressed(Key::MouseLeft);
                if start && self.scene.fire(SceneEvent::Confirm).is_some() {
                    // The start press must not also fire a shot
                    self.fire.was_held = ctx.input.held(Key::Space);
                }
            }
            Scene::Play => {
                self.update_player(ctx, out);
                self.update_bullets();
                self.update_enemies();
                self.update_powerups();
                self.stars.update(&mut self.rng);
                self.update_boss(out);
                self.check_collisions(out);
                self.spawn_enemies();
                self.update_camera();
            }
            Scene::GameOver => {
                if ctx.input.just_pressed(Key::R) && self.scene.fire(SceneEvent::Restart).is_some() {
                    *self = self.restart();
                    return;
                }
            }
        }

        self.update_effects();
    }

    fn draw(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        canvas.cls(palette::BLACK);
        match self.scene.scene {
            Scene::Title => self.draw_menu(ctx, canvas),
            Scene::Play => self.draw_game(ctx, canvas),
            Scene::GameOver => self.draw_game_over(ctx, canvas),
        }
    }

    fn autopilot(&self, ctx: &FrameContext) -> InputState {
        let tap = ctx.frame % 2 == 0;
        match self.scene.scene {
            Scene::Title => {
                let mut state = InputState::at(ctx.width / 2.0, 150.0);
                if ctx.frame > 30 && tap {
                    state = state.hold(Key::Space);
                }
                state
            }
            Scene::Play => {
                let x = match (&self.boss, self.nearest_threat()) {
                    (Some(boss), _) => boss.pos.x,
                    (None, Some(enemy)) => enemy.pos.x,
                    (None, None) => ctx.width / 2.0,
                };
                let mut state = InputState::at(x, 160.0);
                if tap {
                    state = state.hold(Key::Space);
                }
                state
            }
            Scene::GameOver => {
                let mut state = InputState::at(ctx.width / 2.0, 150.0);
                if tap {
                    state = state.hold(Key::R);
                }
                state
            }
        }
    }

    fn summary(&self) -> serde_json::Value {
        json!({
            "scene": self.scene.scene.as_str(),
            "score": self.score,
            "level": self.level,
            "health": self.player.health,
            "kills": self.kills,
            "bosses_defeated": self.bosses_defeated,
            "boss_health": self.boss.as_ref().map(|b| b.health),
            "entities": self.entity_count(),
            "particles_evicted": self.particles.evicted,
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

    fn playing(seed: u64) -> Shooter {
        Shooter::new(&Settings::default(), seed).restart()
    }

    fn player_bullet(game: &mut Shooter, pos: Vec2) {
        game.bullets.spawn(Spawn::rect(
            EntityKind::Bullet { owner: Owner::Player },
            pos,
            Vec2::ZERO,
            Vec2::new(2.0, 4.0),
            palette::LIME,
        ));
    }

    #[test]
    fn test_menu_confirm_starts_game() {
        let mut game = Shooter::new(&Settings::default(), 1);
        assert!(game.scene.is(Scene::Title));
        let mut tracker = InputTracker::new();
        let mut out = FrameOutput::default();
        let input = tracker.sample(InputState::at(128.0, 150.0).hold(Key::MouseLeft));
        game.update(&ctx(0, input), &mut out);
        assert!(game.scene.is(Scene::Play));
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn test_spawn_interval_shrinks_with_level() {
        let mut game = playing(1);
        assert_eq!(game.spawn_interval(), 28);
        game.level = 5;
        assert_eq!(game.spawn_interval(), 20);
        game.level = 40;
        assert_eq!(game.spawn_interval(), 10);
    }

    #[test]
    fn test_boss_patterns() {
        let muzzle = Vec2::new(128.0, 56.0);
        let straight = BossPattern::Straight.volley(muzzle);
        assert_eq!(straight.len(), 5);
        assert_eq!(straight[0].0.x, 68.0);
        assert_eq!(straight[4].0.x, 188.0);

        let fan = BossPattern::Fan.volley(muzzle);
        assert_eq!(fan.len(), 7);
        // Middle shot goes straight down at 3 + 2
        assert!((fan[3].1 - Vec2::new(0.0, 5.0)).length() < 1e-5);

        assert_eq!(BossPattern::Ring.volley(muzzle).len(), 12);
        assert_eq!(BossPattern::Ring.next(), BossPattern::Straight);
    }

    #[test]
    fn test_boss_cycles_pattern_and_patrols() {
        let mut boss = Boss::new(Vec2::new(128.0, 40.0), 50);
        let mut volleys = 0;
        for _ in 0..=BossPattern::PHASE_FRAMES {
            if !boss.advance().is_empty() {
                volleys += 1;
            }
        }
        assert_eq!(boss.pattern, BossPattern::Fan);
        assert_eq!(volleys, 180 / 8);
        assert!(boss.pos.x >= Boss::MIN_X - 1.0 && boss.pos.x <= Boss::MAX_X + 1.0);
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut game = playing(2);
        game.enemies.spawn(Spawn::rect(
            EntityKind::Enemy { pattern: EnemyPattern::Straight, phase: 0.0 },
            Vec2::new(100.0, 60.0),
            Vec2::ZERO,
            Vec2::splat(8.0),
            palette::RED,
        ));
        player_bullet(&mut game, Vec2::new(103.0, 65.0));

        let mut out = FrameOutput::default();
        game.check_collisions(&mut out);
        assert_eq!(game.score, 100);
        assert_eq!(game.kills, 1);
        assert!(game.enemies.is_empty());
        assert_eq!(game.explosions.len(), 1);
        assert!(game.particles.len() >= 15);
    }

    #[test]
    fn test_boss_spawns_after_threshold_and_levels_up() {
        let mut game = playing(3);
        game.kills = 10;
        let mut out = FrameOutput::default();
        game.update_boss(&mut out);
        assert!(game.boss.is_some());
        assert!(out.sounds.contains(&SoundEffect::BossAlarm));

        game.boss.as_mut().unwrap().health = 1;
        let boss_pos = game.boss.as_ref().unwrap().pos;
        player_bullet(&mut game, boss_pos + Vec2::new(10.0, 5.0));
        game.check_collisions(&mut out);
        assert!(game.boss.is_none());
        assert_eq!(game.score, 1000);
        assert_eq!(game.level, 2);
        assert_eq!(game.kills, 0);
    }

    #[test]
    fn test_no_enemy_spawns_during_boss() {
        let mut game = playing(3);
        game.boss = Some(Boss::new(Vec2::new(128.0, 40.0), 50));
        for _ in 0..100 {
            game.spawn_enemies();
        }
        assert!(game.enemies.is_empty());
    }

    #[test]
    fn test_enemy_fire_hurts_and_ends_game() {
        let mut game = playing(4);
        game.player.health = 10;
        let at = game.player.pos + Vec2::new(5.0, -5.0);
        game.enemy_bullet(at, Vec2::ZERO);
        let mut out = FrameOutput::default();
        game.check_collisions(&mut out);
        assert_eq!(game.player.health, 0);
        assert_eq!(game.shake, 10);
        assert!(game.scene.is(Scene::GameOver));
    }

    #[test]
    fn test_powerup_heals_capped() {
        let mut game = playing(4);
        game.player.health = 90;
        let at = game.player.pos;
        game.powerups
            .spawn(Spawn::circle(EntityKind::PowerUp { spin: 0.0 }, at, Vec2::ZERO, 4.0, palette::YELLOW));
        game.check_collisions(&mut FrameOutput::default());
        assert_eq!(game.player.health, 100);
        assert_eq!(game.score, 50);
    }

    #[test]
    fn test_particle_pool_evicts_oldest() {
        let mut settings = Settings::default();
        settings.shooter.particle_cap = 20;
        let mut game = Shooter::new(&settings, 5).restart();
        game.explode(Vec2::new(50.0, 50.0));
        game.explode(Vec2::new(60.0, 50.0));
        assert_eq!(game.particles.len(), 20);
        assert_eq!(game.particles.evicted, 10);
    }

    #[test]
    fn test_restart_from_game_over_goes_to_play() {
        let mut game = playing(6);
        game.score = 900;
        game.scene.fire(SceneEvent::Terminal);
        let mut tracker = InputTracker::new();
        let input = tracker.sample(InputState::at(0.0, 0.0).hold(Key::R));
        game.update(&ctx(0, input), &mut FrameOutput::default());
        assert!(game.scene.is(Scene::Play));
        assert_eq!(game.score, 0);
        assert_eq!(game.player.health, 100);
        assert_eq!(game.entity_count(), 0);
    }

    #[test]
    fn test_reduced_motion_keeps_camera_still() {
        let mut settings = Settings::default();
        settings.reduced_motion = true;
        let mut game = Shooter::new(&settings, 7).restart();
        game.shake = 10;
        game.update_camera();
        assert_eq!(game.camera, Vec2::ZERO);
        assert_eq!(game.shake, 9);
    }

    #[test]
    fn test_hud_and_boss_bar() {
        let mut game = playing(8);
        game.boss = Some(Boss::new(Vec2::new(128.0, 40.0), 50));
        let mut buf = CommandBuffer::new();
        game.draw(&ctx(0, InputSnapshot::default()), &mut buf);
        assert!(buf.has_text("BOSS FIGHT!"));
        assert!(buf.has_text("Score: 0"));
        assert!(buf.has_text("Defeated: 0/10"));
    }
}
