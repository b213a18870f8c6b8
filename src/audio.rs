use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCue {
    AmbientTick,
    Shot,
    DryFire,
    ReloadStart,
    ReloadDone,
    WeaponSwitch,
    EnemyHit,
    EnemyDown,
    PlayerHurt,
    Victory,
    Defeat,
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Sink that only logs; used when no audio backend is wired up.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: AudioCue) {
        trace!(?cue, "audio cue");
    }
}

/// Records every cue; handy in tests.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<AudioCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.played.push(cue);
    }
}
