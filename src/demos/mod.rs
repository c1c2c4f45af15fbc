//! The demos
//!
//! Each demo is an explicit state struct built from `Settings` and a seed,
//! with a pure `reset()` that yields the same state as a fresh start.

pub mod bubbles;
pub mod catch;
pub mod invaders;
pub mod jump;
pub mod lottery;
pub mod shooter;
pub mod sketch;
pub mod snake;
pub mod starfield;

pub use bubbles::Bubbles;
pub use catch::CatchGame;
pub use invaders::Invaders;
pub use jump::Jump;
pub use lottery::Lottery;
pub use shooter::Shooter;
pub use sketch::Sketch;
pub use snake::Snake;
pub use starfield::Starfield;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::Demo;
use crate::settings::Settings;

/// Selectable demos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoKind {
    Catch,
    Bubbles,
    Snake,
    Shooter,
    Invaders,
    Lottery,
    Sketch,
    Jump,
}

impl DemoKind {
    pub const ALL: [DemoKind; 8] = [
        DemoKind::Catch,
        DemoKind::Bubbles,
        DemoKind::Snake,
        DemoKind::Shooter,
        DemoKind::Invaders,
        DemoKind::Lottery,
        DemoKind::Sketch,
        DemoKind::Jump,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoKind::Catch => "catch",
            DemoKind::Bubbles => "bubbles",
            DemoKind::Snake => "snake",
            DemoKind::Shooter => "shooter",
            DemoKind::Invaders => "invaders",
            DemoKind::Lottery => "lottery",
            DemoKind::Sketch => "sketch",
            DemoKind::Jump => "jump",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "catch" | "paddle" => Some(DemoKind::Catch),
            "bubbles" => Some(DemoKind::Bubbles),
            "snake" => Some(DemoKind::Snake),
            "shooter" => Some(DemoKind::Shooter),
            "invaders" => Some(DemoKind::Invaders),
            "lottery" => Some(DemoKind::Lottery),
            "sketch" => Some(DemoKind::Sketch),
            "jump" => Some(DemoKind::Jump),
            _ => None,
        }
    }

    /// One-line description for `list`
    pub fn blurb(&self) -> &'static str {
        match self {
            DemoKind::Catch => "paddle catches falling balls; Z shoots, R slows down",
            DemoKind::Bubbles => "bouncing bubbles merge; click to burst",
            DemoKind::Snake => "grid snake; eat apples, avoid walls and yourself",
            DemoKind::Shooter => "vertical shooter with enemy patterns, power-ups and a boss",
            DemoKind::Invaders => "formation march; clear the grid before it lands",
            DemoKind::Lottery => "presenter draw with a slowing name shuffle",
            DemoKind::Sketch => "stamp circles and draw lines",
            DemoKind::Jump => "stomp scrolling floors to stay airborne",
        }
    }
}

/// Construct a demo ready to run
pub fn build(kind: DemoKind, settings: &Settings, seed: u64) -> Box<dyn Demo> {
    log::info!("Starting {} with seed {}", kind.as_str(), seed);
    match kind {
        DemoKind::Catch => Box::new(CatchGame::new(settings, seed)),
        DemoKind::Bubbles => Box::new(Bubbles::new(settings, seed)),
        DemoKind::Snake => Box::new(Snake::new(settings, seed)),
        DemoKind::Shooter => Box::new(Shooter::new(settings, seed)),
        DemoKind::Invaders => Box::new(Invaders::new(settings, seed)),
        DemoKind::Lottery => Box::new(Lottery::new(settings, seed)),
        DemoKind::Sketch => Box::new(Sketch::new(settings, seed)),
        DemoKind::Jump => Box::new(Jump::new(settings, seed)),
    }
}

/// All randomness goes through this
pub(crate) fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Blink phase for hints: on for `period` frames, off for `period`
pub(crate) fn blink(frame: u64, period: u64) -> bool {
    (frame / period.max(1)) % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, SoundLog};
    use crate::platform::{Autopilot, Runner};

    #[test]
    fn test_kind_names_round_trip() {
        for kind in DemoKind::ALL {
            assert_eq!(DemoKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(DemoKind::from_str("PADDLE"), Some(DemoKind::Catch));
        assert_eq!(DemoKind::from_str("tetris"), None);
    }

    #[test]
    fn test_every_demo_survives_autopilot() {
        let settings = Settings::default();
        for kind in DemoKind::ALL {
            let mut demo = build(kind, &settings, 7);
            let mut runner = Runner::for_demo(demo.as_ref());
            let mut audio = AudioManager::new(SoundLog::default());
            let stats = runner.run(demo.as_mut(), &mut Autopilot, &mut audio, 600);
            assert!(stats.frames > 0, "{} ran no frames", kind.as_str());
            assert!(demo.summary().is_object(), "{} summary", kind.as_str());
        }
    }

    #[test]
    fn test_blink() {
        assert!(blink(0, 10));
        assert!(!blink(10, 10));
        assert!(blink(20, 10));
    }
}
