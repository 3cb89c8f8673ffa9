//! Audio manager
//!
//! [`AudioManager`] owns one mixer registry, one playback dispatcher, one
//! repeat scheduler and the settings store. It is built from an
//! [`AudioConfig`] through [`AudioManager::initialize`] and torn down by
//! [`AudioManager::shutdown`]; every call in between is delegated.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audio::backend::{AudioBackend, MixerGraph};
use crate::audio::dispatcher::{DispatchOutcome, PlaybackDispatcher};
use crate::audio::mixer::{MixerBinding, MixerGroupHandle, MixerGroupInfo, MixerHandle, MixerInfo, MixerKey, MixerRegistry};
use crate::audio::repeat::{RepeatKey, RepeatScheduler};
use crate::audio::settings::{SettingsRecord, SettingsStore, DEFAULT_SETTINGS_FILE};
use crate::audio::sound::{SoundDescriptor, SourceSoundDescriptor};
use crate::audio::sound_registry::{SoundRegistry, SourceSoundRegistry};
use crate::audio::volume::{VolumeUnit, MISSING_VOLUME};
use crate::audio::AudioError;
use crate::config::Config;
use crate::foundation::time::Clock;

/// Audio manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Version tag written into saved settings; a mismatch discards them
    pub audio_version: String,
    /// Optional debug traces and group existence checks
    pub debug_messages: bool,
    /// Every mixer exposes `MasterVolume` and every group `<Group>Volume`
    ///
    /// Saving and loading settings is a no-op until this is set.
    pub mixers_ready: bool,
    /// Force every source to 2D playback
    pub disable_spatial_blend: bool,
    /// File name of the saved settings
    pub settings_file_name: String,
    /// Directory of the saved settings; the per-user data directory if unset
    pub settings_dir: Option<PathBuf>,
    /// Update modes of the mixers passed to `initialize`
    pub mixers: Vec<MixerInfo>,
    /// Mixer groups and the mixers that own them
    pub groups: Vec<MixerGroupInfo>,
    /// Sounds to register
    pub sounds: Vec<SoundDescriptor>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            audio_version: "0.1.0".to_string(),
            debug_messages: true,
            mixers_ready: false,
            disable_spatial_blend: false,
            settings_file_name: DEFAULT_SETTINGS_FILE.to_string(),
            settings_dir: None,
            mixers: Vec::new(),
            groups: Vec::new(),
            sounds: Vec::new(),
        }
    }
}

impl Config for AudioConfig {}

struct AudioState {
    config: AudioConfig,
    mixers: MixerRegistry,
    dispatcher: PlaybackDispatcher,
    repeats: RepeatScheduler,
    store: SettingsStore,
}

/// Name-keyed audio façade
#[derive(Default)]
pub struct AudioManager {
    state: Option<AudioState>,
}

impl AudioManager {
    /// Create an uninitialized manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register mixers, groups and sounds from `config`
    ///
    /// Update modes listed in `config.mixers` override the ones on the
    /// bindings. Initializing twice shuts the previous state down first.
    pub fn initialize(
        &mut self,
        config: AudioConfig,
        backend: &mut dyn AudioBackend,
        bindings: Vec<MixerBinding>,
    ) -> Result<(), AudioError> {
        if self.state.is_some() {
            log::warn!("initialize: audio manager already initialized, shutting down previous state");
            self.shutdown();
        }

        let store = match &config.settings_dir {
            Some(dir) => SettingsStore::in_dir(dir, &config.settings_file_name),
            None => SettingsStore::default_location(&config.settings_file_name)?,
        };

        let bindings: Vec<_> = bindings
            .into_iter()
            .map(|binding| {
                let name = binding.graph.name().to_string();
                match config.mixers.iter().find(|info| info.name == name) {
                    Some(info) => binding.with_update_mode(info.update_mode),
                    None => binding,
                }
            })
            .collect();
        for info in &config.mixers {
            if !bindings.iter().any(|binding| binding.graph.name() == info.name) {
                log::error!("initialize: mixer {} is configured but was not provided", info.name);
            }
        }

        let mut mixers = MixerRegistry::new();
        mixers.register_mixers(bindings);
        mixers.register_groups(&config.groups);

        let mut sounds = SoundRegistry::new();
        sounds.register(config.sounds.iter().cloned(), backend);
        if config.disable_spatial_blend {
            sounds.disable_spatial_blend();
        }

        let dispatcher =
            PlaybackDispatcher::new(sounds, SourceSoundRegistry::new()).with_diagnostics(config.debug_messages);

        log::info!(
            "Audio manager initialized: {} mixers, {} groups, {} sounds",
            mixers.mixer_count(),
            mixers.group_count(),
            dispatcher.sounds().len()
        );

        self.state = Some(AudioState {
            config,
            mixers,
            dispatcher,
            repeats: RepeatScheduler::new(),
            store,
        });
        Ok(())
    }

    /// Stop everything and drop every registry
    pub fn shutdown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        state.repeats.clear();
        state.dispatcher.clear();
        state.mixers.clear();
        log::info!("Audio manager shutdown");
    }

    /// Check if `initialize` has run without a later `shutdown`
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn state(&self) -> Result<&AudioState, AudioError> {
        self.state.as_ref().ok_or(AudioError::NotInitialized)
    }

    fn state_mut(&mut self) -> Result<&mut AudioState, AudioError> {
        self.state.as_mut().ok_or(AudioError::NotInitialized)
    }

    /// Active configuration
    pub fn config(&self) -> Result<&AudioConfig, AudioError> {
        Ok(&self.state()?.config)
    }

    /// Registered mixers and groups
    pub fn mixers(&self) -> Result<&MixerRegistry, AudioError> {
        Ok(&self.state()?.mixers)
    }

    /// Registered mixers and groups, mutable
    pub fn mixers_mut(&mut self) -> Result<&mut MixerRegistry, AudioError> {
        Ok(&mut self.state_mut()?.mixers)
    }

    /// The global dispatcher
    pub fn dispatcher(&self) -> Result<&PlaybackDispatcher, AudioError> {
        Ok(&self.state()?.dispatcher)
    }

    /// The global dispatcher, mutable
    pub fn dispatcher_mut(&mut self) -> Result<&mut PlaybackDispatcher, AudioError> {
        Ok(&mut self.state_mut()?.dispatcher)
    }

    /// Look up a mixer by name
    pub fn mixer(&self, name: &str) -> Option<&dyn MixerGraph> {
        self.state.as_ref()?.mixers.mixer(name)
    }

    /// Register pre-built sources with the global dispatcher
    pub fn register_source_sounds(&mut self, sounds: Vec<SourceSoundDescriptor>) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        let registry = state.dispatcher.source_sounds_mut();
        let registered = registry.register(sounds);
        if state.config.disable_spatial_blend {
            registry.disable_spatial_blend();
        }
        Ok(registered)
    }

    /// Build a dispatcher with its own sounds that shares this manager's mixers
    ///
    /// Group-scoped calls on the returned dispatcher take
    /// [`AudioManager::mixers`].
    pub fn local_dispatcher(
        &self,
        sounds: Vec<SoundDescriptor>,
        source_sounds: Vec<SourceSoundDescriptor>,
        backend: &mut dyn AudioBackend,
        disable_spatial_blend: bool,
    ) -> Result<PlaybackDispatcher, AudioError> {
        let state = self.state()?;
        let mut sound_registry = SoundRegistry::new();
        sound_registry.register(sounds, backend);
        let mut source_registry = SourceSoundRegistry::new();
        source_registry.register(source_sounds);
        if disable_spatial_blend {
            sound_registry.disable_spatial_blend();
            source_registry.disable_spatial_blend();
        }
        Ok(PlaybackDispatcher::new(sound_registry, source_registry).with_diagnostics(state.config.debug_messages))
    }

    /// Fire a layered one-shot
    pub fn play(&mut self, name: &str) -> Result<DispatchOutcome, AudioError> {
        Ok(self.state_mut()?.dispatcher.play(name))
    }

    /// Restart a sound from the top
    pub fn play_once(&mut self, name: &str) -> Result<DispatchOutcome, AudioError> {
        Ok(self.state_mut()?.dispatcher.play_once(name))
    }

    /// Pause a sound
    pub fn pause(&mut self, name: &str) -> Result<DispatchOutcome, AudioError> {
        Ok(self.state_mut()?.dispatcher.pause(name))
    }

    /// Resume a paused sound
    pub fn resume(&mut self, name: &str) -> Result<DispatchOutcome, AudioError> {
        Ok(self.state_mut()?.dispatcher.resume(name))
    }

    /// Stop a sound
    pub fn stop(&mut self, name: &str) -> Result<DispatchOutcome, AudioError> {
        Ok(self.state_mut()?.dispatcher.stop(name))
    }

    /// Pause every sound
    pub fn pause_all(&mut self) -> Result<usize, AudioError> {
        Ok(self.state_mut()?.dispatcher.pause_all())
    }

    /// Resume every sound
    pub fn resume_all(&mut self) -> Result<usize, AudioError> {
        Ok(self.state_mut()?.dispatcher.resume_all())
    }

    /// Stop every sound
    pub fn stop_all(&mut self) -> Result<usize, AudioError> {
        Ok(self.state_mut()?.dispatcher.stop_all())
    }

    /// Pause every sound routed to `group`
    pub fn pause_all_from_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.pause_all_from_group(&state.mixers, group)
    }

    /// Pause every sound not routed to `group`
    pub fn pause_all_but_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.pause_all_but_group(&state.mixers, group)
    }

    /// Resume every sound routed to `group`
    pub fn resume_all_from_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.resume_all_from_group(&state.mixers, group)
    }

    /// Resume every sound not routed to `group`
    pub fn resume_all_but_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.resume_all_but_group(&state.mixers, group)
    }

    /// Stop every sound routed to `group`
    pub fn stop_all_from_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.stop_all_from_group(&state.mixers, group)
    }

    /// Stop every sound not routed to `group`
    pub fn stop_all_but_group(&mut self, group: &str) -> Result<usize, AudioError> {
        let state = self.state_mut()?;
        state.dispatcher.stop_all_but_group(&state.mixers, group)
    }

    /// Master volume for UI sliders; [`MISSING_VOLUME`] on any failure
    pub fn master_volume<'a>(&self, key: impl Into<MixerKey<'a, MixerHandle>>, unit: VolumeUnit) -> f32 {
        match self.state() {
            Ok(state) => state.mixers.master_volume(key, unit).unwrap_or(MISSING_VOLUME),
            Err(e) => {
                log::error!("master_volume: {}", e);
                MISSING_VOLUME
            }
        }
    }

    /// Group volume for UI sliders; [`MISSING_VOLUME`] on any failure
    pub fn group_volume<'a>(&self, key: impl Into<MixerKey<'a, MixerGroupHandle>>, unit: VolumeUnit) -> f32 {
        match self.state() {
            Ok(state) => state.mixers.group_volume(key, unit).unwrap_or(MISSING_VOLUME),
            Err(e) => {
                log::error!("group_volume: {}", e);
                MISSING_VOLUME
            }
        }
    }

    /// Write a mixer's master volume
    pub fn set_master_volume<'a>(
        &mut self,
        key: impl Into<MixerKey<'a, MixerHandle>>,
        value: f32,
        unit: VolumeUnit,
    ) -> Result<(), AudioError> {
        self.state_mut()?.mixers.set_master_volume(key, value, unit)
    }

    /// Write a mixer group's volume
    pub fn set_group_volume<'a>(
        &mut self,
        key: impl Into<MixerKey<'a, MixerGroupHandle>>,
        value: f32,
        unit: VolumeUnit,
    ) -> Result<(), AudioError> {
        self.state_mut()?.mixers.set_group_volume(key, value, unit)
    }

    /// Check if a mixer is registered
    pub fn contains_mixer(&self, name: &str) -> bool {
        self.state.as_ref().is_some_and(|state| state.mixers.contains_mixer(name))
    }

    /// Check if a mixer group is registered
    pub fn contains_group(&self, name: &str) -> bool {
        self.state.as_ref().is_some_and(|state| state.mixers.contains_group(name))
    }

    /// Check if a sound is registered
    pub fn contains_sound(&self, name: &str) -> bool {
        self.state.as_ref().is_some_and(|state| state.dispatcher.contains_sound(name))
    }

    /// Check if a source sound is registered
    pub fn contains_source_sound(&self, name: &str) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.dispatcher.contains_source_sound(name))
    }

    /// Persist every mixer volume
    ///
    /// # Returns
    /// `false` without touching disk when mixers are not marked ready
    pub fn save_settings(&self) -> Result<bool, AudioError> {
        let state = self.state()?;
        if !state.config.mixers_ready {
            log::debug!("save settings: mixers are not marked ready, nothing saved");
            return Ok(false);
        }
        let record = SettingsRecord::snapshot(&state.mixers, state.config.audio_version.as_str())
            .inspect_err(|e| log::error!("save settings: {}", e))?;
        state.store.save(&record).inspect_err(|e| log::error!("save settings: {}", e))?;
        Ok(true)
    }

    /// Restore mixer volumes saved by an earlier run
    ///
    /// # Returns
    /// `false` when mixers are not marked ready or nothing was saved yet
    pub fn load_settings(&mut self) -> Result<bool, AudioError> {
        let state = self.state_mut()?;
        if !state.config.mixers_ready {
            log::debug!("load settings: mixers are not marked ready, nothing loaded");
            return Ok(false);
        }
        let Some(record) = state.store.load().inspect_err(|e| log::error!("load settings: {}", e))? else {
            log::error!("load settings: no saved settings at {}", state.store.path().display());
            return Ok(false);
        };
        record
            .restore(&mut state.mixers, &state.config.audio_version)
            .inspect_err(|e| log::error!("load settings: {}", e))?;
        log::debug!("load settings: restored from {}", state.store.path().display());
        Ok(true)
    }

    /// Play a transient copy of a sound `iterations` times back to back
    ///
    /// The copy takes the current settings of the registered sound (or
    /// source sound) and is dropped once the last play ends.
    pub fn play_repeated(
        &mut self,
        name: &str,
        iterations: u32,
        backend: &mut dyn AudioBackend,
        clock: &dyn Clock,
    ) -> Result<Option<RepeatKey>, AudioError> {
        let state = self.state_mut()?;
        let settings = state
            .dispatcher
            .sounds()
            .source(name)
            .or_else(|| state.dispatcher.source_sounds().get(name))
            .map(|source| source.settings().clone())
            .ok_or_else(|| {
                log::error!("play_repeated: {} does not exist", name);
                AudioError::NotFound(name.to_string())
            })?;
        let source = backend.create_source(&settings)?;
        state.repeats.schedule(name, source, iterations, clock)
    }

    /// Advance repeat jobs; call once per frame
    pub fn update(&mut self, clock: &dyn Clock) -> usize {
        self.state
            .as_mut()
            .map_or(0, |state| state.repeats.update(clock))
    }

    /// Stop a repeat job early
    pub fn cancel_repeat(&mut self, key: RepeatKey) -> bool {
        self.state.as_mut().is_some_and(|state| state.repeats.cancel(key))
    }

    /// Number of repeat jobs still running
    pub fn active_repeats(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.repeats.active_count())
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}
