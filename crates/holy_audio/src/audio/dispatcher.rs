//! Playback dispatch
//!
//! Applies transport calls by name across the two sound registries. A name
//! is looked up in both independently and every hit receives the call;
//! a name found in neither is reported as not found, a name found in both
//! is reported as ambiguous but still played on both.

use crate::audio::backend::AudioSource;
use crate::audio::mixer::MixerRegistry;
use crate::audio::sound_registry::{SoundRegistry, SourceSoundRegistry};
use crate::audio::AudioError;

pub use crate::audio::backend::Transport;

/// Which registries a name-based call reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Name is in neither registry; nothing was called
    NotFound,
    /// Name is a sound only
    Sound,
    /// Name is a source sound only
    SourceSound,
    /// Name is in both registries; both were called
    Both,
}

impl DispatchOutcome {
    fn from_hits(sound: bool, source_sound: bool) -> Self {
        match (sound, source_sound) {
            (false, false) => Self::NotFound,
            (true, false) => Self::Sound,
            (false, true) => Self::SourceSound,
            (true, true) => Self::Both,
        }
    }

    /// Whether at least one source received the call
    pub fn found(self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Whether the name was registered twice across registries
    pub fn is_ambiguous(self) -> bool {
        matches!(self, Self::Both)
    }
}

/// Which sources a bulk call touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFilter<'a> {
    /// Every source
    All,
    /// Only sources routed to the group
    From(&'a str),
    /// Every source not routed to the group
    AllBut(&'a str),
}

impl GroupFilter<'_> {
    fn matches(self, source: &dyn AudioSource) -> bool {
        match self {
            Self::All => true,
            Self::From(group) => source.settings().routes_to(group),
            Self::AllBut(group) => !source.settings().routes_to(group),
        }
    }
}

/// Name-keyed transport over sounds and source sounds
pub struct PlaybackDispatcher {
    sounds: SoundRegistry,
    source_sounds: SourceSoundRegistry,
    diagnostics: bool,
}

impl PlaybackDispatcher {
    /// Wrap populated registries; diagnostics enabled
    pub fn new(sounds: SoundRegistry, source_sounds: SourceSoundRegistry) -> Self {
        Self {
            sounds,
            source_sounds,
            diagnostics: true,
        }
    }

    /// Toggle optional log messages and group existence checks
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Whether diagnostics are enabled
    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Registered sounds
    pub fn sounds(&self) -> &SoundRegistry {
        &self.sounds
    }

    /// Registered sounds, mutable
    pub fn sounds_mut(&mut self) -> &mut SoundRegistry {
        &mut self.sounds
    }

    /// Registered source sounds
    pub fn source_sounds(&self) -> &SourceSoundRegistry {
        &self.source_sounds
    }

    /// Registered source sounds, mutable
    pub fn source_sounds_mut(&mut self) -> &mut SourceSoundRegistry {
        &mut self.source_sounds
    }

    /// Apply a transport primitive to `name` in both registries
    pub fn dispatch(&mut self, name: &str, transport: Transport) -> DispatchOutcome {
        let verb = transport.verb();

        let sound_hit = match self.sounds.source_mut(name) {
            Some(source) => {
                apply(source, transport, name);
                if self.diagnostics {
                    log::debug!("{}: sound {} done", verb, name);
                }
                true
            }
            None => false,
        };

        let source_hit = match self.source_sounds.get_mut(name) {
            Some(source) => {
                apply(source, transport, name);
                if self.diagnostics {
                    log::debug!("{}: source sound {} done", verb, name);
                }
                true
            }
            None => false,
        };

        let outcome = DispatchOutcome::from_hits(sound_hit, source_hit);
        match outcome {
            DispatchOutcome::NotFound => log::error!("{}: {} does not exist", verb, name),
            DispatchOutcome::Both => log::warn!(
                "{}: {} has been found in both sounds and source sounds",
                verb,
                name
            ),
            DispatchOutcome::Sound | DispatchOutcome::SourceSound => {}
        }
        outcome
    }

    /// Fire a layered one-shot
    pub fn play(&mut self, name: &str) -> DispatchOutcome {
        self.dispatch(name, Transport::Play)
    }

    /// Restart from the top, cutting off overlap
    pub fn play_once(&mut self, name: &str) -> DispatchOutcome {
        self.dispatch(name, Transport::PlayOnce)
    }

    /// Pause a sound
    pub fn pause(&mut self, name: &str) -> DispatchOutcome {
        self.dispatch(name, Transport::Pause)
    }

    /// Resume a paused sound
    pub fn resume(&mut self, name: &str) -> DispatchOutcome {
        self.dispatch(name, Transport::Resume)
    }

    /// Stop a sound
    pub fn stop(&mut self, name: &str) -> DispatchOutcome {
        self.dispatch(name, Transport::Stop)
    }

    /// Apply a transport primitive to every source passing `filter`
    ///
    /// # Returns
    /// The number of sources called
    pub fn dispatch_all(&mut self, transport: Transport, filter: GroupFilter<'_>) -> usize {
        let mut touched = 0;
        for (name, source) in self.sounds.sources_mut() {
            if filter.matches(source) {
                apply(source, transport, name);
                touched += 1;
            }
        }
        for (name, source) in self.source_sounds.sources_mut() {
            if filter.matches(source) {
                apply(source, transport, name);
                touched += 1;
            }
        }
        touched
    }

    fn dispatch_group(
        &mut self,
        mixers: &MixerRegistry,
        transport: Transport,
        filter: GroupFilter<'_>,
    ) -> Result<usize, AudioError> {
        let group = match filter {
            GroupFilter::From(group) | GroupFilter::AllBut(group) => group,
            GroupFilter::All => return Ok(self.dispatch_all(transport, filter)),
        };
        if self.diagnostics && !mixers.contains_group(group) {
            log::error!("{}: mixer group {} does not exist", transport.verb(), group);
            return Err(AudioError::GroupNotFound(group.to_string()));
        }
        let touched = self.dispatch_all(transport, filter);
        if self.diagnostics {
            match filter {
                GroupFilter::AllBut(_) => log::debug!(
                    "{}: {} sounds outside {} done",
                    transport.verb(),
                    touched,
                    group
                ),
                _ => log::debug!("{}: {} sounds in {} done", transport.verb(), touched, group),
            }
        }
        Ok(touched)
    }

    /// Pause every source
    pub fn pause_all(&mut self) -> usize {
        self.bulk(Transport::Pause)
    }

    /// Resume every source
    pub fn resume_all(&mut self) -> usize {
        self.bulk(Transport::Resume)
    }

    /// Stop every source
    pub fn stop_all(&mut self) -> usize {
        self.bulk(Transport::Stop)
    }

    fn bulk(&mut self, transport: Transport) -> usize {
        let touched = self.dispatch_all(transport, GroupFilter::All);
        if self.diagnostics {
            log::debug!("{}: all {} sounds done", transport.verb(), touched);
        }
        touched
    }

    /// Pause every source routed to `group`
    pub fn pause_all_from_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Pause, GroupFilter::From(group))
    }

    /// Pause every source not routed to `group`
    pub fn pause_all_but_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Pause, GroupFilter::AllBut(group))
    }

    /// Resume every source routed to `group`
    pub fn resume_all_from_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Resume, GroupFilter::From(group))
    }

    /// Resume every source not routed to `group`
    pub fn resume_all_but_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Resume, GroupFilter::AllBut(group))
    }

    /// Stop every source routed to `group`
    pub fn stop_all_from_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Stop, GroupFilter::From(group))
    }

    /// Stop every source not routed to `group`
    pub fn stop_all_but_group(&mut self, mixers: &MixerRegistry, group: &str) -> Result<usize, AudioError> {
        self.dispatch_group(mixers, Transport::Stop, GroupFilter::AllBut(group))
    }

    /// Check if a sound is registered; logs a warning when it is not
    pub fn contains_sound(&self, name: &str) -> bool {
        let found = self.sounds.contains(name);
        if !found && self.diagnostics {
            log::warn!("contains_sound: sound {} was not found", name);
        }
        found
    }

    /// Check if a source sound is registered; logs a warning when it is not
    pub fn contains_source_sound(&self, name: &str) -> bool {
        let found = self.source_sounds.contains(name);
        if !found && self.diagnostics {
            log::warn!("contains_source_sound: source sound {} was not found", name);
        }
        found
    }

    /// Stop and drop everything
    pub fn clear(&mut self) {
        self.sounds.clear();
        self.source_sounds.clear();
    }
}

fn apply(source: &mut dyn AudioSource, transport: Transport, name: &str) {
    if let Err(e) = source.transport(transport) {
        log::error!("{}: {} failed: {}", transport.verb(), name, e);
    }
}
