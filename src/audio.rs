//! Sound cues
//!
//! Updates only *request* sounds; the host owns synthesis and playback.
//! `AudioManager` applies volume/mute policy before handing cues to a sink.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball caught by the paddle
    Catch,
    /// Ball reached the bottom uncaught
    Miss,
    /// Projectile fired
    Shoot,
    /// Something was destroyed
    Explosion,
    /// Pickup collected
    PowerUp,
    /// Snake ate an apple
    Eat,
    /// Jumper landed on a floor
    Stomp,
    /// Difficulty stepped up
    LevelUp,
    /// Boss entered the field
    BossAlarm,
    /// Lottery draw started
    DrawStart,
    /// Lottery result revealed
    DrawResult,
    /// Player won the round
    Victory,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Playback channel, so a new cue interrupts older cues of the same family
    pub fn channel(self) -> u8 {
        match self {
            SoundEffect::Shoot | SoundEffect::Catch | SoundEffect::Miss | SoundEffect::Eat | SoundEffect::Stomp => 0,
            SoundEffect::Explosion => 1,
            SoundEffect::PowerUp | SoundEffect::LevelUp => 2,
            SoundEffect::BossAlarm
            | SoundEffect::DrawStart
            | SoundEffect::DrawResult
            | SoundEffect::Victory
            | SoundEffect::GameOver => 3,
        }
    }
}

/// Destination for sound cues (the presentation engine's mixer)
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that remembers what was played (headless runs and tests)
#[derive(Debug, Default, Clone)]
pub struct SoundLog {
    pub played: Vec<(SoundEffect, f32)>,
}

impl SoundLog {
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|(e, _)| *e == effect).count()
    }
}

impl AudioSink for SoundLog {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played.push((effect, volume));
    }
}

/// Audio manager for the run loop
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Forward a cue to the sink unless silenced
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::trace!("sfx {:?} ch{} vol {:.2}", effect, effect.channel(), vol);
        self.sink.play(effect, vol);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_manager_drops_cues() {
        let mut audio = AudioManager::new(SoundLog::default());
        audio.play(SoundEffect::Shoot);
        audio.set_muted(true);
        audio.play(SoundEffect::Shoot);
        assert_eq!(audio.sink().count(SoundEffect::Shoot), 1);
    }

    #[test]
    fn test_volume_is_clamped_and_applied() {
        let mut audio = AudioManager::new(SoundLog::default());
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(0.5);
        audio.play(SoundEffect::Catch);
        let (_, vol) = audio.into_sink().played[0];
        assert!((vol - 0.5).abs() < 1e-6);
    }
}
