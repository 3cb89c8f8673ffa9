//! Sound registries
//!
//! [`SoundRegistry`] owns sounds built from descriptors: it creates one live
//! source per descriptor through the backend. [`SourceSoundRegistry`] holds
//! sources that were configured elsewhere and only need a name.
//!
//! Both are first-wins: registering a name twice logs a warning and drops
//! the later entry.

use crate::audio::backend::{AudioBackend, AudioSource};
use crate::audio::sound::{SoundDescriptor, SourceSettings, SourceSoundDescriptor};
use crate::foundation::collections::{Insertion, NamedMap};

/// A registered sound and its live source
struct SoundEntry {
    descriptor: SoundDescriptor,
    source: Box<dyn AudioSource>,
}

/// Name-keyed sounds built from descriptors
#[derive(Default)]
pub struct SoundRegistry {
    sounds: NamedMap<SoundEntry>,
}

impl SoundRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register descriptors, creating a live source for each
    ///
    /// Every descriptor field is copied onto the new source. Sounds flagged
    /// play-on-awake start immediately. Duplicates and sounds the backend
    /// cannot create are logged and skipped.
    ///
    /// # Returns
    /// The number of sounds actually registered
    pub fn register<I>(&mut self, descriptors: I, backend: &mut dyn AudioBackend) -> usize
    where
        I: IntoIterator<Item = SoundDescriptor>,
    {
        let mut registered = 0;
        for descriptor in descriptors {
            if let Some(existing) = self.sounds.position(&descriptor.name) {
                log::warn!(
                    "register sounds: {} already exists at index {}, there is a duplicate name",
                    descriptor.name,
                    existing
                );
                continue;
            }

            let settings = SourceSettings::from(&descriptor);
            let mut source = match backend.create_source(&settings) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("register sounds: could not create source for {}: {}", descriptor.name, e);
                    continue;
                }
            };

            if descriptor.plays_on_awake() {
                if let Err(e) = source.play() {
                    log::error!("register sounds: {} failed to play on awake: {}", descriptor.name, e);
                }
            }

            let name = descriptor.name.clone();
            if self.sounds.insert(name, SoundEntry { descriptor, source }).is_inserted() {
                registered += 1;
            }
        }
        log::debug!("register sounds: {} registered, {} total", registered, self.sounds.len());
        registered
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&SoundDescriptor> {
        self.sounds.get(name).map(|entry| &entry.descriptor)
    }

    /// Look up a descriptor by registration index
    pub fn get_index(&self, index: usize) -> Option<&SoundDescriptor> {
        self.sounds.get_index(index).map(|entry| &entry.descriptor)
    }

    /// Live source of a sound
    pub fn source(&self, name: &str) -> Option<&dyn AudioSource> {
        self.sounds.get(name).map(|entry| entry.source.as_ref())
    }

    /// Live source of a sound, for transport calls
    pub fn source_mut(&mut self, name: &str) -> Option<&mut (dyn AudioSource + 'static)> {
        self.sounds.get_mut(name).map(|entry| entry.source.as_mut())
    }

    /// Every live source in registration order
    pub fn sources_mut(&mut self) -> impl Iterator<Item = (&str, &mut (dyn AudioSource + 'static))> {
        self.sounds
            .iter_mut()
            .map(|(name, entry)| (name, entry.source.as_mut()))
    }

    /// Force every source to fully 2D playback
    pub fn disable_spatial_blend(&mut self) {
        for (_, entry) in self.sounds.iter_mut() {
            entry.source.settings_mut().spatial_blend = 0.0;
        }
    }

    /// Check if a sound is registered
    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sounds.names()
    }

    /// Number of registered sounds
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Check if no sounds are registered
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Stop and drop every sound
    pub fn clear(&mut self) {
        for (name, entry) in self.sounds.iter_mut() {
            if let Err(e) = entry.source.stop() {
                log::warn!("clear sounds: {} failed to stop: {}", name, e);
            }
        }
        self.sounds.clear();
    }
}

/// Name-keyed sources configured outside the registry
#[derive(Default)]
pub struct SourceSoundRegistry {
    sources: NamedMap<Box<dyn AudioSource>>,
}

impl SourceSoundRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register pre-built sources; duplicates are logged and dropped
    ///
    /// # Returns
    /// The number of source sounds actually registered
    pub fn register<I>(&mut self, sounds: I) -> usize
    where
        I: IntoIterator<Item = SourceSoundDescriptor>,
    {
        let mut registered = 0;
        for sound in sounds {
            match self.sources.insert(sound.name.clone(), sound.source) {
                Insertion::Inserted(_) => registered += 1,
                Insertion::Duplicate(existing) => log::warn!(
                    "register source sounds: {} already exists at index {}, there is a duplicate name",
                    sound.name,
                    existing
                ),
            }
        }
        registered
    }

    /// Look up a source by name
    pub fn get(&self, name: &str) -> Option<&dyn AudioSource> {
        self.sources.get(name).map(AsRef::as_ref)
    }

    /// Look up a source by registration index
    pub fn get_index(&self, index: usize) -> Option<&dyn AudioSource> {
        self.sources.get_index(index).map(AsRef::as_ref)
    }

    /// Look up a source by name, for transport calls
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn AudioSource + 'static)> {
        self.sources.get_mut(name).map(AsMut::as_mut)
    }

    /// Every source in registration order
    pub fn sources_mut(&mut self) -> impl Iterator<Item = (&str, &mut (dyn AudioSource + 'static))> {
        self.sources.iter_mut().map(|(name, source)| (name, source.as_mut()))
    }

    /// Force every source to fully 2D playback
    pub fn disable_spatial_blend(&mut self) {
        for (_, source) in self.sources.iter_mut() {
            source.settings_mut().spatial_blend = 0.0;
        }
    }

    /// Check if a source sound is registered
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains(name)
    }

    /// Number of registered source sounds
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no source sounds are registered
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Stop and drop every source sound
    pub fn clear(&mut self) {
        for (name, source) in self.sources.iter_mut() {
            if let Err(e) = source.stop() {
                log::warn!("clear source sounds: {} failed to stop: {}", name, e);
            }
        }
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::{NullBackend, NullSource, Transport};
    use crate::audio::sound::SoundFlags;

    #[test]
    fn test_lookup_returns_registered_descriptor() {
        let mut backend = NullBackend::new();
        let mut registry = SoundRegistry::new();
        let jump = SoundDescriptor::new("jump", "jump.wav").with_volume(0.9);
        let land = SoundDescriptor::new("land", "land.wav").with_group("Sfx");

        assert_eq!(registry.register(vec![jump.clone(), land.clone()], &mut backend), 2);
        assert_eq!(registry.get("jump"), Some(&jump));
        assert_eq!(registry.get("land"), Some(&land));
        assert_eq!(registry.get_index(1), Some(&land));
        assert!(registry.get_index(2).is_none());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut backend = NullBackend::new();
        let mut registry = SoundRegistry::new();
        let first = SoundDescriptor::new("hit", "hit_a.wav").with_volume(0.2);
        let second = SoundDescriptor::new("hit", "hit_b.wav").with_volume(0.7);

        assert_eq!(registry.register(vec![first.clone(), second], &mut backend), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("hit"), Some(&first));
        assert_eq!(registry.source("hit").unwrap().settings().clip, first.clip);
        // The duplicate never reached the backend
        assert_eq!(backend.created_count(), 1);
    }

    #[test]
    fn test_reregistering_later_is_ignored() {
        let mut backend = NullBackend::new();
        let mut registry = SoundRegistry::new();
        let first = SoundDescriptor::new("coin", "coin.wav").with_pitch(1.5);
        registry.register(vec![first.clone()], &mut backend);
        registry.register(vec![SoundDescriptor::new("coin", "other.wav")], &mut backend);

        assert_eq!(registry.get("coin"), Some(&first));
    }

    #[test]
    fn test_source_receives_descriptor_fields() {
        let mut backend = NullBackend::new();
        let mut registry = SoundRegistry::new();
        let sound = SoundDescriptor::new("wind", "wind.ogg")
            .with_group("Ambient")
            .with_flags(SoundFlags::LOOP)
            .with_volume(0.3)
            .with_pitch(0.8);
        registry.register(vec![sound.clone()], &mut backend);

        let settings = registry.source("wind").unwrap().settings();
        assert_eq!(settings, &SourceSettings::from(&sound));
    }

    #[test]
    fn test_play_on_awake_starts_playback() {
        let mut backend = NullBackend::new();
        let log = backend.log();
        let mut registry = SoundRegistry::new();
        registry.register(
            vec![
                SoundDescriptor::new("theme", "theme.ogg").with_flags(SoundFlags::PLAY_ON_AWAKE),
                SoundDescriptor::new("quiet", "quiet.wav"),
            ],
            &mut backend,
        );

        assert_eq!(log.count("theme.ogg", Transport::PlayOnce), 1);
        assert_eq!(log.count("quiet.wav", Transport::PlayOnce), 0);
        assert!(registry.source("theme").unwrap().is_playing());
    }

    #[test]
    fn test_disable_spatial_blend() {
        let mut backend = NullBackend::new();
        let mut registry = SoundRegistry::new();
        registry.register(vec![SoundDescriptor::new("step", "step.wav").with_spatial_blend(1.0)], &mut backend);
        registry.disable_spatial_blend();
        assert_eq!(registry.source("step").unwrap().settings().spatial_blend, 0.0);
    }

    #[test]
    fn test_clear_stops_sources() {
        let mut backend = NullBackend::new();
        let log = backend.log();
        let mut registry = SoundRegistry::new();
        registry.register(vec![SoundDescriptor::new("a", "a.wav")], &mut backend);
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(log.count("a.wav", Transport::Stop), 1);
    }

    #[test]
    fn test_source_sounds_first_wins() {
        let backend = NullBackend::new();
        let mut registry = SourceSoundRegistry::new();
        let first = backend.standalone_source(SourceSettings::from(&SoundDescriptor::new("door", "door_a.wav")));
        let second = backend.standalone_source(SourceSettings::from(&SoundDescriptor::new("door", "door_b.wav")));

        let count = registry.register(vec![
            SourceSoundDescriptor::new("door", Box::new(first)),
            SourceSoundDescriptor::new("door", Box::new(second)),
        ]);

        assert_eq!(count, 1);
        assert_eq!(registry.get("door").unwrap().settings().clip.to_str(), Some("door_a.wav"));
        assert!(registry.get_index(0).is_some());
        assert!(registry.get_index(1).is_none());
    }

    #[test]
    fn test_source_sounds_lookup_mut() {
        let log = crate::audio::backend::CallLog::new();
        let source = NullSource::new(SourceSettings::default(), log.clone());
        let mut registry = SourceSoundRegistry::new();
        registry.register(vec![SourceSoundDescriptor::new("bell", Box::new(source))]);

        registry.get_mut("bell").unwrap().play_one_shot().unwrap();
        assert_eq!(log.len(), 1);
        assert!(registry.get_mut("gong").is_none());
    }
}
