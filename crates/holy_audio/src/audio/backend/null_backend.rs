//! Null audio backend
//!
//! Produces no sound. Every transport call is appended to a shared
//! [`CallLog`], which is how tests observe what the dispatcher did.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use super::{AudioBackend, AudioSource, Transport};
use crate::audio::sound::SourceSettings;
use crate::audio::AudioError;

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCall {
    /// Clip of the source that received the call
    pub clip: PathBuf,
    /// Primitive that was applied
    pub transport: Transport,
}

/// Shared, append-only record of transport calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<SourceCall>>>,
}

impl CallLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, clip: &Path, transport: Transport) {
        self.calls.borrow_mut().push(SourceCall {
            clip: clip.to_path_buf(),
            transport,
        });
    }

    /// Snapshot of every call so far
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls so far
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Count calls of one kind against one clip
    pub fn count(&self, clip: impl AsRef<Path>, transport: Transport) -> usize {
        let clip = clip.as_ref();
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.clip == clip && call.transport == transport)
            .count()
    }

    /// Forget every recorded call
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// Source created by [`NullBackend`]
#[derive(Debug)]
pub struct NullSource {
    settings: SourceSettings,
    clip_length: Option<Duration>,
    playing: bool,
    paused: bool,
    log: CallLog,
}

impl NullSource {
    /// Create a standalone source, e.g. for a pre-configured source sound
    pub fn new(settings: SourceSettings, log: CallLog) -> Self {
        Self {
            settings,
            clip_length: None,
            playing: false,
            paused: false,
            log,
        }
    }

    /// Report a known clip length
    pub fn with_clip_length(mut self, length: Duration) -> Self {
        self.clip_length = Some(length);
        self
    }

    /// Check if the source is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl AudioSource for NullSource {
    fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SourceSettings {
        &mut self.settings
    }

    fn play_one_shot(&mut self) -> Result<(), AudioError> {
        self.log.record(&self.settings.clip, Transport::Play);
        self.playing = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.log.record(&self.settings.clip, Transport::PlayOnce);
        self.playing = true;
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        self.log.record(&self.settings.clip, Transport::Pause);
        self.paused = true;
        Ok(())
    }

    fn unpause(&mut self) -> Result<(), AudioError> {
        self.log.record(&self.settings.clip, Transport::Resume);
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.log.record(&self.settings.clip, Transport::Stop);
        self.playing = false;
        self.paused = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing && !self.paused
    }

    fn clip_length(&self) -> Option<Duration> {
        self.clip_length
    }
}

/// Backend that produces no sound
#[derive(Debug, Default)]
pub struct NullBackend {
    log: CallLog,
    clip_lengths: HashMap<PathBuf, Duration>,
    created: usize,
}

impl NullBackend {
    /// Create a backend with an empty call log
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `length` for every source created from `clip`
    pub fn with_clip_length(mut self, clip: impl Into<PathBuf>, length: Duration) -> Self {
        self.clip_lengths.insert(clip.into(), length);
        self
    }

    /// Shared call log of every source this backend created
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Number of sources created so far
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Build a standalone source sharing this backend's log
    pub fn standalone_source(&self, settings: SourceSettings) -> NullSource {
        let length = self.clip_lengths.get(&settings.clip).copied();
        let source = NullSource::new(settings, self.log.clone());
        match length {
            Some(length) => source.with_clip_length(length),
            None => source,
        }
    }
}

impl AudioBackend for NullBackend {
    fn create_source(&mut self, settings: &SourceSettings) -> Result<Box<dyn AudioSource>, AudioError> {
        self.created += 1;
        Ok(Box::new(self.standalone_source(settings.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sound::SoundDescriptor;

    fn settings(clip: &str) -> SourceSettings {
        SourceSettings::from(&SoundDescriptor::new("test", clip))
    }

    #[test]
    fn test_calls_are_logged() {
        let mut backend = NullBackend::new();
        let log = backend.log();
        let mut source = backend.create_source(&settings("a.wav")).unwrap();

        source.play_one_shot().unwrap();
        source.pause().unwrap();
        source.stop().unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.count("a.wav", Transport::Play), 1);
        assert_eq!(log.count("a.wav", Transport::Pause), 1);
        assert_eq!(log.count("a.wav", Transport::Stop), 1);
        assert_eq!(backend.created_count(), 1);
    }

    #[test]
    fn test_playing_state() {
        let mut source = NullSource::new(settings("a.wav"), CallLog::new());
        assert!(!source.is_playing());

        source.play().unwrap();
        assert!(source.is_playing());

        source.pause().unwrap();
        assert!(!source.is_playing());
        assert!(source.is_paused());

        source.unpause().unwrap();
        assert!(source.is_playing());

        source.stop().unwrap();
        assert!(!source.is_playing());
    }

    #[test]
    fn test_clip_length_lookup() {
        let mut backend = NullBackend::new().with_clip_length("long.ogg", Duration::from_secs(4));
        let known = backend.create_source(&settings("long.ogg")).unwrap();
        let unknown = backend.create_source(&settings("short.wav")).unwrap();

        assert_eq!(known.clip_length(), Some(Duration::from_secs(4)));
        assert_eq!(unknown.clip_length(), None);
    }

    #[test]
    fn test_transport_maps_to_primitives() {
        let log = CallLog::new();
        let mut source = NullSource::new(settings("t.wav"), log.clone());
        for transport in [Transport::Play, Transport::PlayOnce, Transport::Pause, Transport::Resume, Transport::Stop] {
            source.transport(transport).unwrap();
        }
        let kinds: Vec<_> = log.calls().into_iter().map(|c| c.transport).collect();
        assert_eq!(
            kinds,
            vec![Transport::Play, Transport::PlayOnce, Transport::Pause, Transport::Resume, Transport::Stop]
        );
    }
}
