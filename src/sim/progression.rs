//! Score and difficulty progression
//!
//! Pure functions from the current counters to the next ones, so the
//! scaling rules can be tested without a running demo.

use serde::{Deserialize, Serialize};

use super::entity::BallVariant;

/// Scaling thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Speed scalar at the start and after every level-up
    pub base_speed: f32,
    /// Added to the speed scalar on every bottom crossing
    pub speed_step: f32,
    /// Points between level-ups
    pub level_step: u32,
    /// Misses that end the run
    pub miss_limit: u32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            base_speed: 1.0,
            speed_step: 0.1,
            level_step: 10,
            miss_limit: 10,
        }
    }
}

/// Score/counter state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u32,
    /// Global speed multiplier applied to ball velocities
    pub speed: f32,
    pub misses: u32,
    /// Score at which the next level-up happens
    pub next_level_up: u32,
    pub level: u32,
}

impl Progress {
    pub fn new(difficulty: &Difficulty) -> Self {
        Self {
            score: 0,
            speed: difficulty.base_speed,
            misses: 0,
            next_level_up: difficulty.level_step,
            level: 1,
        }
    }
}

/// How a ball left through the bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Caught(BallVariant),
    Missed,
}

/// Result of applying one scoring event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStep {
    pub progress: Progress,
    /// Extra concurrent balls to add
    pub spawn_balls: u32,
    pub level_up: bool,
    pub game_over: bool,
}

/// A ball crossed the bottom edge
pub fn on_bottom(progress: &Progress, difficulty: &Difficulty, crossing: Crossing) -> ProgressStep {
    let mut next = *progress;
    match crossing {
        Crossing::Caught(variant) => next.score = variant.apply(next.score),
        Crossing::Missed => next.misses += 1,
    }
    next.speed += difficulty.speed_step;

    let mut step = level_check(next, difficulty);
    step.game_over = step.progress.misses >= difficulty.miss_limit;
    step
}

/// A ball was destroyed by a projectile. Only catches level up; the next
/// catch picks up any threshold a shot has passed.
pub fn on_shot(progress: &Progress) -> Progress {
    Progress {
        score: progress.score + 1,
        ..*progress
    }
}

/// Reset the speed scalar to its base value (player-requested slowdown)
pub fn slow_down(progress: &Progress, difficulty: &Difficulty) -> Progress {
    Progress {
        speed: difficulty.base_speed,
        ..*progress
    }
}

fn level_check(mut progress: Progress, difficulty: &Difficulty) -> ProgressStep {
    let mut spawn_balls = 0;
    if difficulty.level_step > 0 {
        while progress.score >= progress.next_level_up {
            progress.next_level_up += difficulty.level_step;
            progress.level += 1;
            spawn_balls += 1;
        }
    }
    if spawn_balls > 0 {
        progress.speed = difficulty.base_speed;
    }
    ProgressStep {
        progress,
        spawn_balls,
        level_up: spawn_balls > 0,
        game_over: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_speeds_up() {
        let d = Difficulty::default();
        let step = on_bottom(&Progress::new(&d), &d, Crossing::Caught(BallVariant::Normal));
        assert_eq!(step.progress.score, 1);
        assert!((step.progress.speed - 1.1).abs() < 1e-6);
        assert!(!step.level_up);
    }

    #[test]
    fn test_miss_keeps_score() {
        let d = Difficulty::default();
        let p = Progress {
            score: 4,
            ..Progress::new(&d)
        };
        let step = on_bottom(&p, &d, Crossing::Missed);
        assert_eq!(step.progress.score, 4);
        assert_eq!(step.progress.misses, 1);
        assert!((step.progress.speed - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_level_up_adds_ball_and_resets_speed() {
        let d = Difficulty::default();
        let p = Progress {
            score: 9,
            speed: 1.9,
            ..Progress::new(&d)
        };
        let step = on_bottom(&p, &d, Crossing::Caught(BallVariant::Normal));
        assert!(step.level_up);
        assert_eq!(step.spawn_balls, 1);
        assert_eq!(step.progress.speed, 1.0);
        assert_eq!(step.progress.next_level_up, 20);
        assert_eq!(step.progress.level, 2);
    }

    #[test]
    fn test_bonus_can_jump_the_threshold() {
        let d = Difficulty::default();
        let p = Progress {
            score: 8,
            ..Progress::new(&d)
        };
        let step = on_bottom(&p, &d, Crossing::Caught(BallVariant::Bonus));
        assert_eq!(step.progress.score, 11);
        assert_eq!(step.spawn_balls, 1);
    }

    #[test]
    fn test_miss_limit_ends_run() {
        let d = Difficulty::default();
        let p = Progress {
            misses: 9,
            ..Progress::new(&d)
        };
        assert!(on_bottom(&p, &d, Crossing::Missed).game_over);
        assert!(!on_bottom(&p, &d, Crossing::Caught(BallVariant::Normal)).game_over);
    }

    #[test]
    fn test_shot_scores_without_speedup() {
        let d = Difficulty::default();
        let p = Progress {
            speed: 1.5,
            ..Progress::new(&d)
        };
        let next = on_shot(&p);
        assert_eq!(next.score, 1);
        assert_eq!(next.speed, 1.5);
    }

    #[test]
    fn test_shot_never_levels_up() {
        let d = Difficulty::default();
        let p = Progress {
            score: 9,
            ..Progress::new(&d)
        };
        let shot = on_shot(&p);
        assert_eq!(shot.score, 10);
        assert_eq!(shot.level, 1);
        assert_eq!(shot.next_level_up, 10);

        // The following catch crosses the threshold it left behind
        let step = on_bottom(&shot, &d, Crossing::Caught(BallVariant::Normal));
        assert!(step.level_up);
        assert_eq!(step.progress.level, 2);
        assert_eq!(step.progress.next_level_up, 20);
    }

    #[test]
    fn test_slow_down() {
        let d = Difficulty::default();
        let p = Progress {
            speed: 2.3,
            score: 5,
            ..Progress::new(&d)
        };
        let slowed = slow_down(&p, &d);
        assert_eq!(slowed.speed, 1.0);
        assert_eq!(slowed.score, 5);
    }
}
