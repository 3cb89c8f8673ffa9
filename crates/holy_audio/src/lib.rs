//! # Holy Audio
//!
//! A small game-audio manager: sounds and mixer groups registered by name,
//! transport and volume control keyed by those names, and mixer volume
//! settings persisted between runs.
//!
//! ## Features
//!
//! - **Sound Registry**: First-wins name map of sound descriptors with live sources
//! - **Mixer Registry**: Master and group volumes in decibels or percent
//! - **Playback Dispatch**: Play, pause, resume and stop by name or by mixer group
//! - **Settings Persistence**: Versioned binary record under the user data directory
//! - **Repeat Playback**: Clock-driven "play N times" for transient copies
//! - **Pluggable Backends**: Null backend for tests, optional Rodio backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use holy_audio::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AudioConfig::load_from_file("audio.ron")?;
//!     let mut backend = NullBackend::new();
//!     let mixers = vec![MixerBinding::new(SoftwareMixer::with_groups("Main", &["Music", "Sfx"]))];
//!
//!     let mut audio = AudioManager::new();
//!     audio.initialize(config, &mut backend, mixers)?;
//!
//!     audio.play("jump")?;
//!     audio.set_group_volume("Music", 50.0, VolumeUnit::Percent)?;
//!     audio.save_settings()?;
//!     audio.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod foundation;
pub mod config;
pub mod audio;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        audio::{
            AudioConfig, AudioError, AudioManager, DispatchOutcome, MixerBinding, MixerGroupInfo,
            MixerInfo, MixerKey, MixerRegistry, PlaybackDispatcher, SettingsRecord, SettingsStore,
            SoundDescriptor, SoundFlags, SourceSoundDescriptor, UpdateMode, VolumeUnit,
            backend::{AudioBackend, AudioSource, MixerGraph, NullBackend, SoftwareMixer},
        },
        config::{Config, ConfigError},
        foundation::time::{Clock, ManualClock, SystemClock},
    };
}
