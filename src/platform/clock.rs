//! Frame clock with a fixed-timestep accumulator

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS};

/// Counts frames and converts wall-clock time into whole fixed ticks
#[derive(Debug, Clone)]
pub struct FrameClock {
    pub fps: u32,
    /// Seconds per tick
    pub dt: f32,
    /// Ticks completed since start
    pub frame: u64,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            fps,
            dt: 1.0 / fps as f32,
            frame: 0,
            accumulator: 0.0,
        }
    }

    /// Account for `elapsed` seconds of host time and return how many ticks
    /// to run now. Long stalls are clamped so the loop can't fall into a
    /// spiral of death.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = elapsed.clamp(0.0, MAX_FRAME_TIME);
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop whatever backlog is left
            self.accumulator = self.accumulator.min(self.dt);
        }
        substeps
    }

    /// Mark one tick as done; returns the index of the tick just completed
    pub fn tick(&mut self) -> u64 {
        let current = self.frame;
        self.frame += 1;
        current
    }

    /// Seconds of simulated time so far
    pub fn elapsed_secs(&self) -> f32 {
        self.frame as f32 * self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_partial_ticks() {
        let mut clock = FrameClock::new(30);
        assert_eq!(clock.advance(0.02), 0);
        assert_eq!(clock.advance(0.02), 1);
        assert!(clock.accumulator > 0.0 && clock.accumulator < clock.dt);
    }

    #[test]
    fn test_advance_clamps_long_stalls() {
        let mut clock = FrameClock::new(20);
        // A 5 second hitch counts as MAX_FRAME_TIME
        assert_eq!(clock.advance(5.0), 2);

        let mut fast = FrameClock::new(240);
        assert_eq!(fast.advance(0.1), MAX_SUBSTEPS);
        assert!(fast.accumulator <= fast.dt);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.frame, 2);
        assert!((clock.elapsed_secs() - 2.0 / 60.0).abs() < 1e-6);
    }
}
