//! Audio backend implementations
//!
//! Platform-independent abstraction over the engine that actually decodes
//! and mixes audio. The registries only ever talk to these traits.

pub mod null_backend;
pub mod software_mixer;
#[cfg(feature = "rodio")]
pub mod rodio_backend;

use std::time::Duration;

use crate::audio::mixer::UpdateMode;
use crate::audio::sound::SourceSettings;
use crate::audio::AudioError;

pub use null_backend::{CallLog, NullBackend, NullSource, SourceCall};
pub use software_mixer::{MixerParams, SoftwareMixer};

/// Exposed parameter holding a mixer's master volume
pub const MASTER_VOLUME_PARAMETER: &str = "MasterVolume";

/// Exposed parameter holding a mixer group's volume
pub fn group_volume_parameter(group: &str) -> String {
    format!("{group}Volume")
}

/// Transport primitive applied to a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Fire a layered one-shot over whatever is already playing
    Play,
    /// Restart from the top, cutting off any overlap
    PlayOnce,
    /// Pause playback
    Pause,
    /// Resume paused playback
    Resume,
    /// Stop playback
    Stop,
}

impl Transport {
    /// Verb used in log lines
    pub fn verb(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::PlayOnce => "play_once",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }
}

/// A live playback handle
///
/// # Threading
/// Not Send + Sync: every call happens on the thread that owns the manager.
pub trait AudioSource {
    /// Current playback state
    fn settings(&self) -> &SourceSettings;

    /// Mutable playback state; changes apply on the next transport call
    fn settings_mut(&mut self) -> &mut SourceSettings;

    /// Replace the whole playback state
    fn apply(&mut self, settings: SourceSettings) {
        *self.settings_mut() = settings;
    }

    /// Start a layered one-shot of the clip
    fn play_one_shot(&mut self) -> Result<(), AudioError>;

    /// Restart the clip from the top
    fn play(&mut self) -> Result<(), AudioError>;

    /// Pause playback
    fn pause(&mut self) -> Result<(), AudioError>;

    /// Resume paused playback
    fn unpause(&mut self) -> Result<(), AudioError>;

    /// Stop playback
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Check if the source is audible (playing and not paused)
    fn is_playing(&self) -> bool;

    /// Length of the clip if the backend knows it
    fn clip_length(&self) -> Option<Duration>;

    /// Apply a transport primitive
    fn transport(&mut self, transport: Transport) -> Result<(), AudioError> {
        match transport {
            Transport::Play => self.play_one_shot(),
            Transport::PlayOnce => self.play(),
            Transport::Pause => self.pause(),
            Transport::Resume => self.unpause(),
            Transport::Stop => self.stop(),
        }
    }
}

/// A mixer graph exposing named float parameters
pub trait MixerGraph {
    /// Name the mixer is registered under
    fn name(&self) -> &str;

    /// Read an exposed parameter; `None` if the mixer has no such parameter
    fn get_float(&self, parameter: &str) -> Option<f32>;

    /// Write an exposed parameter; `false` if the mixer has no such parameter
    fn set_float(&mut self, parameter: &str, value: f32) -> bool;

    /// Apply the mixer's update cadence
    fn set_update_mode(&mut self, mode: UpdateMode);

    /// Current update cadence
    fn update_mode(&self) -> UpdateMode;
}

/// Factory for live sources
pub trait AudioBackend {
    /// Create a source configured with `settings`
    fn create_source(&mut self, settings: &SourceSettings) -> Result<Box<dyn AudioSource>, AudioError>;

    /// Per-frame housekeeping
    fn update(&mut self) {}

    /// Release backend resources
    fn shutdown(&mut self) {}
}
