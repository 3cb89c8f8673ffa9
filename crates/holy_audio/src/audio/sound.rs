//! Sound descriptors
//!
//! A [`SoundDescriptor`] is the designer-authored description of a sound.
//! At registration its fields are copied onto a live source as
//! [`SourceSettings`]; the descriptor itself is never mutated afterwards.

use std::path::PathBuf;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::audio::backend::AudioSource;

bitflags! {
    /// Boolean playback options of a sound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SoundFlags: u8 {
        /// Restart from the top when the clip ends
        const LOOP = 1 << 0;
        /// Start playing as soon as the sound is registered
        const PLAY_ON_AWAKE = 1 << 1;
        /// Silence output without stopping playback
        const MUTE = 1 << 2;
        /// Skip effects on the source
        const BYPASS_EFFECTS = 1 << 3;
        /// Skip listener effects; only valid with no mixer group
        const BYPASS_LISTENER_EFFECTS = 1 << 4;
        /// Skip reverb zones
        const BYPASS_REVERB_ZONES = 1 << 5;
    }
}

/// Distance attenuation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RolloffMode {
    /// Real-world style falloff
    #[default]
    Logarithmic,
    /// Straight line between min and max distance
    Linear,
    /// Curve supplied by the backend
    Custom,
}

/// Designer-authored description of a sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundDescriptor {
    /// Unique key used by every name-based call
    pub name: String,
    /// Audio file backing the sound
    pub clip: PathBuf,
    /// Mixer group the sound is routed to
    pub mixer_group: Option<String>,
    /// Boolean options
    pub flags: SoundFlags,
    /// 0 is most important, 256 least
    pub priority: u16,
    /// 0.0 to 1.0
    pub volume: f32,
    /// -3.0 to 3.0
    pub pitch: f32,
    /// -1.0 (left) to 1.0 (right)
    pub stereo_pan: f32,
    /// 0.0 (2D) to 1.0 (3D)
    pub spatial_blend: f32,
    /// 0.0 to 1.1
    pub reverb_zone_mix: f32,
    /// 0.0 to 5.0
    pub doppler_level: f32,
    /// Speaker spread in degrees, 0 to 360
    pub spread: u16,
    /// Distance attenuation curve
    pub rolloff: RolloffMode,
    /// Distance where attenuation starts
    pub min_distance: f32,
    /// Distance where attenuation stops
    pub max_distance: f32,
}

impl Default for SoundDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            clip: PathBuf::new(),
            mixer_group: None,
            flags: SoundFlags::empty(),
            priority: 128,
            volume: 0.5,
            pitch: 1.0,
            stereo_pan: 0.0,
            spatial_blend: 1.0,
            reverb_zone_mix: 1.0,
            doppler_level: 0.0,
            spread: 0,
            rolloff: RolloffMode::default(),
            min_distance: 0.0,
            max_distance: 500.0,
        }
    }
}

impl SoundDescriptor {
    /// Create a descriptor with default parameters
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, clip: P) -> Self {
        Self {
            name: name.into(),
            clip: clip.into(),
            ..Self::default()
        }
    }

    /// Route the sound to a mixer group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.mixer_group = Some(group.into());
        self
    }

    /// Set boolean options
    pub fn with_flags(mut self, flags: SoundFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set base volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Set spatial blend
    pub fn with_spatial_blend(mut self, blend: f32) -> Self {
        self.spatial_blend = blend;
        self
    }

    /// Whether the sound starts on registration
    pub fn plays_on_awake(&self) -> bool {
        self.flags.contains(SoundFlags::PLAY_ON_AWAKE)
    }
}

/// Mutable playback state of a live source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Audio file to play
    pub clip: PathBuf,
    /// Mixer group the output is routed to
    pub output_group: Option<String>,
    /// Boolean options
    pub flags: SoundFlags,
    /// Voice priority
    pub priority: u16,
    /// Base volume
    pub volume: f32,
    /// Playback pitch
    pub pitch: f32,
    /// Stereo pan
    pub stereo_pan: f32,
    /// 2D/3D blend
    pub spatial_blend: f32,
    /// Reverb zone mix
    pub reverb_zone_mix: f32,
    /// Doppler scale
    pub doppler_level: f32,
    /// Speaker spread in degrees
    pub spread: u16,
    /// Attenuation curve
    pub rolloff: RolloffMode,
    /// Attenuation start distance
    pub min_distance: f32,
    /// Attenuation end distance
    pub max_distance: f32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::from(&SoundDescriptor::default())
    }
}

impl From<&SoundDescriptor> for SourceSettings {
    /// Copy every descriptor field, clamped to its documented range
    fn from(sound: &SoundDescriptor) -> Self {
        let min_distance = sound.min_distance.max(0.0);
        Self {
            clip: sound.clip.clone(),
            output_group: sound.mixer_group.clone(),
            flags: sound.flags,
            priority: sound.priority.min(256),
            volume: sound.volume.clamp(0.0, 1.0),
            pitch: sound.pitch.clamp(-3.0, 3.0),
            stereo_pan: sound.stereo_pan.clamp(-1.0, 1.0),
            spatial_blend: sound.spatial_blend.clamp(0.0, 1.0),
            reverb_zone_mix: sound.reverb_zone_mix.clamp(0.0, 1.1),
            doppler_level: sound.doppler_level.clamp(0.0, 5.0),
            spread: sound.spread.min(360),
            rolloff: sound.rolloff,
            min_distance,
            max_distance: sound.max_distance.max(min_distance),
        }
    }
}

impl SourceSettings {
    /// Check a flag
    pub fn has(&self, flag: SoundFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the source routes into the named group
    pub fn routes_to(&self, group: &str) -> bool {
        self.output_group.as_deref() == Some(group)
    }
}

/// A sound whose source was configured outside the registry
pub struct SourceSoundDescriptor {
    /// Unique key used by every name-based call
    pub name: String,
    /// Pre-built playback source
    pub source: Box<dyn AudioSource>,
}

impl SourceSoundDescriptor {
    /// Wrap an existing source under a name
    pub fn new(name: impl Into<String>, source: Box<dyn AudioSource>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

impl std::fmt::Debug for SourceSoundDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSoundDescriptor")
            .field("name", &self.name)
            .field("settings", self.source.settings())
            .finish()
    }
}
