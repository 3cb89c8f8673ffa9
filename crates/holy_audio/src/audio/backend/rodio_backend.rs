//! Rodio audio backend implementation
//!
//! Uses the Rodio library for cross-platform audio playback.
//! Rodio is pure Rust and supports WAV, OGG Vorbis, MP3, and FLAC formats.
//!
//! Each source owns one main sink for `play` and a set of layered sinks for
//! `play_one_shot`. Gain is the source volume times the master and group
//! volumes read from the [`SoftwareMixer`] parameter stores the backend was
//! given; it is applied whenever a sink starts or resumes.
//!
//! # Example
//!
//! ```no_run
//! use holy_audio::audio::backend::rodio_backend::RodioBackend;
//! use holy_audio::audio::backend::SoftwareMixer;
//! use holy_audio::prelude::*;
//!
//! let mixer = SoftwareMixer::with_groups("Main", &["Music"]);
//! let mut backend = RodioBackend::new().unwrap().with_mixer(&mixer);
//!
//! let mut audio = AudioManager::new();
//! audio
//!     .initialize(AudioConfig::default(), &mut backend, vec![MixerBinding::new(mixer)])
//!     .unwrap();
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{group_volume_parameter, AudioBackend, AudioSource, MixerParams, SoftwareMixer, MASTER_VOLUME_PARAMETER};
use crate::audio::sound::{SoundFlags, SourceSettings};
use crate::audio::volume::decibel_to_gain;
use crate::audio::AudioError;

const MIN_SPEED: f32 = 0.01;

fn open_clip(path: &Path) -> Result<Decoder<BufReader<File>>, AudioError> {
    let file = File::open(path)
        .map_err(|e| AudioError::PlaybackFailed(format!("Failed to open audio file {}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| AudioError::PlaybackFailed(format!("Failed to decode audio {}: {}", path.display(), e)))
}

/// Source playing through a Rodio output stream
pub struct RodioSource {
    settings: SourceSettings,
    stream_handle: OutputStreamHandle,
    mixers: Rc<Vec<MixerParams>>,
    clip_length: Option<Duration>,
    sink: Option<Sink>,
    one_shots: Vec<Sink>,
}

impl RodioSource {
    /// Mixer gain for the source's output group, as a linear factor
    fn mixer_gain(&self) -> f32 {
        let Some(group) = self.settings.output_group.as_deref() else {
            return 1.0;
        };
        let parameter = group_volume_parameter(group);
        self.mixers
            .iter()
            .find_map(|params| {
                let params = params.borrow();
                let group_db = *params.get(&parameter)?;
                let master_db = params.get(MASTER_VOLUME_PARAMETER).copied().unwrap_or(0.0);
                Some(decibel_to_gain(master_db) * decibel_to_gain(group_db))
            })
            .unwrap_or(1.0)
    }

    fn effective_volume(&self) -> f32 {
        if self.settings.has(SoundFlags::MUTE) {
            0.0
        } else {
            self.settings.volume * self.mixer_gain()
        }
    }

    fn start_sink(&self) -> Result<Sink, AudioError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(format!("Failed to create sink: {}", e)))?;
        let decoder = open_clip(&self.settings.clip)?;
        if self.settings.has(SoundFlags::LOOP) {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }
        sink.set_volume(self.effective_volume());
        sink.set_speed(self.settings.pitch.abs().max(MIN_SPEED));
        Ok(sink)
    }

    fn prune_one_shots(&mut self) {
        self.one_shots.retain(|sink| !sink.empty());
    }
}

impl AudioSource for RodioSource {
    fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SourceSettings {
        &mut self.settings
    }

    fn play_one_shot(&mut self) -> Result<(), AudioError> {
        self.prune_one_shots();
        let sink = self.start_sink()?;
        self.one_shots.push(sink);
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.sink = Some(self.start_sink()?);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), AudioError> {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        for sink in &self.one_shots {
            sink.pause();
        }
        Ok(())
    }

    fn unpause(&mut self) -> Result<(), AudioError> {
        let volume = self.effective_volume();
        for sink in self.sink.iter().chain(&self.one_shots) {
            sink.set_volume(volume);
            sink.play();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        for sink in self.one_shots.drain(..) {
            sink.stop();
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.sink
            .iter()
            .chain(&self.one_shots)
            .any(|sink| !sink.is_paused() && !sink.empty())
    }

    fn clip_length(&self) -> Option<Duration> {
        self.clip_length
    }
}

/// Rodio-based audio backend
pub struct RodioBackend {
    /// Audio output stream (must be kept alive)
    _output_stream: OutputStream,
    /// Output stream handle for creating sinks
    stream_handle: OutputStreamHandle,
    /// Parameter stores of the mixers gains are read from
    mixers: Rc<Vec<MixerParams>>,
}

impl RodioBackend {
    /// Open the default output device
    ///
    /// # Errors
    /// `BackendInitFailed` if no output device is available
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create audio output: {}", e)))?;
        log::info!("Rodio audio backend initialized");
        Ok(Self {
            _output_stream: stream,
            stream_handle,
            mixers: Rc::new(Vec::new()),
        })
    }

    /// Read group and master gains from `mixer`
    ///
    /// Only sources created afterwards see the mixer.
    pub fn with_mixer(mut self, mixer: &SoftwareMixer) -> Self {
        let mut mixers: Vec<MixerParams> = self.mixers.iter().cloned().collect();
        mixers.push(mixer.params());
        self.mixers = Rc::new(mixers);
        self
    }
}

impl AudioBackend for RodioBackend {
    fn create_source(&mut self, settings: &SourceSettings) -> Result<Box<dyn AudioSource>, AudioError> {
        // Decode once up front so a bad clip fails at registration
        let clip_length = open_clip(&settings.clip)?.total_duration();
        Ok(Box::new(RodioSource {
            settings: settings.clone(),
            stream_handle: self.stream_handle.clone(),
            mixers: Rc::clone(&self.mixers),
            clip_length,
            sink: None,
            one_shots: Vec::new(),
        }))
    }

    fn shutdown(&mut self) {
        self.mixers = Rc::new(Vec::new());
        log::info!("Rodio audio backend shutdown");
    }
}
