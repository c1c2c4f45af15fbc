//! Run loop driver
//!
//! One tick: sample input → edge detection → `update` → stop on quit →
//! `draw` into a cleared command buffer → forward sound cues.

use std::collections::VecDeque;

use serde::Serialize;

use super::{Demo, FrameClock, FrameContext, FrameOutput, InputSnapshot, InputState, InputTracker};
use crate::audio::{AudioManager, AudioSink};
use crate::renderer::CommandBuffer;

/// Supplies one raw input sample per tick
pub trait InputSource {
    /// `None` ends the run
    fn next_sample(&mut self, demo: &dyn Demo, ctx: &FrameContext) -> Option<InputState>;
}

/// Replays a recorded list of samples
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    samples: VecDeque<InputState>,
}

impl ScriptedInput {
    pub fn new(samples: impl IntoIterator<Item = InputState>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Repeat `state` for `frames` ticks
    pub fn hold(mut self, state: InputState, frames: usize) -> Self {
        self.samples.extend(std::iter::repeat_n(state, frames));
        self
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_sample(&mut self, _demo: &dyn Demo, _ctx: &FrameContext) -> Option<InputState> {
        self.samples.pop_front()
    }
}

/// Asks the demo itself what to press
#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot;

impl InputSource for Autopilot {
    fn next_sample(&mut self, demo: &dyn Demo, ctx: &FrameContext) -> Option<InputState> {
        Some(demo.autopilot(ctx))
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub frames: u64,
    pub quit: bool,
    pub sounds: usize,
}

/// Drives a demo tick by tick
pub struct Runner {
    pub width: f32,
    pub height: f32,
    pub clock: FrameClock,
    pub canvas: CommandBuffer,
    tracker: InputTracker,
    last_input: InputSnapshot,
    pub quit_requested: bool,
    pub stats: RunStats,
}

impl Runner {
    /// One-time setup before the loop starts
    pub fn init(width: u32, height: u32, fps: u32) -> Self {
        log::debug!("runner init {}x{} @{}fps", width, height, fps);
        Self {
            width: width as f32,
            height: height as f32,
            clock: FrameClock::new(fps),
            canvas: CommandBuffer::new(),
            tracker: InputTracker::new(),
            last_input: InputSnapshot::default(),
            quit_requested: false,
            stats: RunStats::default(),
        }
    }

    pub fn for_demo(demo: &dyn Demo) -> Self {
        let screen = demo.screen();
        Self::init(screen.width, screen.height, screen.fps)
    }

    /// Context for the upcoming tick, carrying the last resolved input
    pub fn context(&self) -> FrameContext {
        FrameContext::new(self.width, self.height, self.clock.frame, self.last_input)
    }

    /// Run one tick with the given raw sample. Returns false once the demo
    /// has asked to quit.
    pub fn run_frame<S: AudioSink>(
        &mut self,
        demo: &mut dyn Demo,
        sample: InputState,
        audio: &mut AudioManager<S>,
    ) -> bool {
        if self.quit_requested {
            return false;
        }

        let input = self.tracker.sample(sample);
        self.last_input = input;
        let ctx = FrameContext::new(self.width, self.height, self.clock.frame, input);

        let mut out = FrameOutput::default();
        demo.update(&ctx, &mut out);

        for effect in out.sounds {
            audio.play(effect);
            self.stats.sounds += 1;
        }

        self.clock.tick();
        self.stats.frames += 1;

        if out.quit {
            log::info!("quit requested at frame {}", ctx.frame);
            self.quit_requested = true;
            self.stats.quit = true;
            return false;
        }

        self.canvas.begin_frame();
        demo.draw(&ctx, &mut self.canvas);
        true
    }

    /// Run until the source runs dry, the demo quits, or `max_frames` ticks
    pub fn run<S: AudioSink>(
        &mut self,
        demo: &mut dyn Demo,
        source: &mut dyn InputSource,
        audio: &mut AudioManager<S>,
        max_frames: u64,
    ) -> RunStats {
        while self.stats.frames < max_frames {
            let ctx = self.context();
            let Some(sample) = source.next_sample(demo, &ctx) else {
                break;
            };
            if !self.run_frame(demo, sample, audio) {
                break;
            }
        }
        self.stats.clone()
    }
}
