//! Audio management
//!
//! Registries for sounds and mixers, name-keyed transport dispatch, settings
//! persistence and the [`AudioManager`] façade that wires them together.

pub mod backend;
pub mod volume;
pub mod sound;
pub mod sound_registry;
pub mod mixer;
pub mod dispatcher;
pub mod settings;
pub mod repeat;
pub mod manager;

#[cfg(test)]
mod tests;

pub use volume::{decibel_to_percent, percent_to_decibel, VolumeUnit, DECIBEL_FLOOR, MISSING_VOLUME};
pub use sound::{RolloffMode, SoundDescriptor, SoundFlags, SourceSettings, SourceSoundDescriptor};
pub use sound_registry::{SoundRegistry, SourceSoundRegistry};
pub use mixer::{
    MixerBinding, MixerGroupHandle, MixerGroupInfo, MixerHandle, MixerInfo, MixerKey, MixerRegistry,
    UpdateMode,
};
pub use dispatcher::{DispatchOutcome, GroupFilter, PlaybackDispatcher, Transport};
pub use settings::{SettingsRecord, SettingsStore, DEFAULT_SETTINGS_FILE};
pub use repeat::{RepeatKey, RepeatScheduler, UNKNOWN_LENGTH_LIMIT};
pub use manager::{AudioConfig, AudioManager};

/// Audio errors
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    /// No sound or source sound is registered under the name
    #[error("Sound not found: {0}")]
    NotFound(String),

    /// No mixer group is registered under the name
    #[error("Mixer group not found: {0}")]
    GroupNotFound(String),

    /// No mixer is registered under the name
    #[error("Mixer not found: {0}")]
    MixerNotFound(String),

    /// The mixer does not expose the named parameter
    #[error("Parameter {parameter} not found on mixer {mixer}")]
    MissingParameter {
        /// Mixer that was queried
        mixer: String,
        /// Exposed parameter name
        parameter: String,
    },

    /// Index lookup past the end of a registry
    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Registry size
        len: usize,
    },

    /// Saved settings were written by a different audio version
    #[error("Settings version mismatch: saved {saved}, live {live}")]
    VersionMismatch {
        /// Tag stored in the record
        saved: String,
        /// Tag of the running configuration
        live: String,
    },

    /// Saved settings do not line up with the registered mixers or groups
    #[error("Settings {what} count mismatch: saved {saved}, registered {registered}")]
    LengthMismatch {
        /// Which sequence disagreed ("mixer" or "group")
        what: &'static str,
        /// Values stored in the record
        saved: usize,
        /// Entries currently registered
        registered: usize,
    },

    /// Settings bytes could not be decoded
    #[error("Corrupt settings data: {0}")]
    Corrupt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The audio backend could not be brought up
    #[error("Backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// The backend failed to start or decode a sound
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// The manager has not been initialized, or was shut down
    #[error("Audio manager not initialized")]
    NotInitialized,
}
