//! Mixer settings persistence
//!
//! A [`SettingsRecord`] is a snapshot of every mixer's master volume and
//! every group's volume, in decibels and in registration order, tagged with
//! the audio version that wrote it.
//!
//! # Layout
//!
//! All integers and floats are little-endian.
//!
//! | Field           | Size        |
//! |-----------------|-------------|
//! | magic `HOLY`    | 4           |
//! | format revision | u16         |
//! | tag length      | u32         |
//! | tag             | UTF-8 bytes |
//! | master count    | u32         |
//! | master volumes  | f32 each    |
//! | group count     | u32         |
//! | group volumes   | f32 each    |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::audio::mixer::MixerRegistry;
use crate::audio::volume::VolumeUnit;
use crate::audio::AudioError;

/// File name used when the configuration does not override it
pub const DEFAULT_SETTINGS_FILE: &str = "AudioSettings.holy";

const MAGIC: &[u8; 4] = b"HOLY";
const FORMAT_REVISION: u16 = 1;

/// Persisted mixer volumes
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRecord {
    /// Audio version that wrote the record
    pub version: String,
    /// One master volume per mixer, in dB
    pub master_volumes: Vec<f32>,
    /// One volume per mixer group, in dB
    pub group_volumes: Vec<f32>,
}

impl SettingsRecord {
    /// Read every registered volume
    ///
    /// # Errors
    /// `MissingParameter` if a mixer does not expose a volume it should
    pub fn snapshot(mixers: &MixerRegistry, version: impl Into<String>) -> Result<Self, AudioError> {
        let master_volumes = (0..mixers.mixer_count())
            .map(|index| mixers.master_volume(index, VolumeUnit::Decibel))
            .collect::<Result<Vec<_>, _>>()?;
        let group_volumes = (0..mixers.group_count())
            .map(|index| mixers.group_volume(index, VolumeUnit::Decibel))
            .collect::<Result<Vec<_>, _>>()?;

        for (name, volume) in mixers.mixer_names().zip(&master_volumes) {
            log::debug!("save settings: {}'s MasterVolume is {}", name, volume);
        }
        for (name, volume) in mixers.group_names().zip(&group_volumes) {
            log::debug!("save settings: {}Volume is {}", name, volume);
        }

        Ok(Self {
            version: version.into(),
            master_volumes,
            group_volumes,
        })
    }

    /// Write the record back onto the registry
    ///
    /// Rejected wholesale when the version differs, when either sequence
    /// does not match the registered count, or when a target parameter is
    /// missing. If a write is refused halfway, the values read before the
    /// first write are put back and the error is returned.
    pub fn restore(&self, mixers: &mut MixerRegistry, live_version: &str) -> Result<(), AudioError> {
        if self.version != live_version {
            return Err(AudioError::VersionMismatch {
                saved: self.version.clone(),
                live: live_version.to_string(),
            });
        }
        if self.master_volumes.len() != mixers.mixer_count() {
            return Err(AudioError::LengthMismatch {
                what: "mixer",
                saved: self.master_volumes.len(),
                registered: mixers.mixer_count(),
            });
        }
        if self.group_volumes.len() != mixers.group_count() {
            return Err(AudioError::LengthMismatch {
                what: "group",
                saved: self.group_volumes.len(),
                registered: mixers.group_count(),
            });
        }
        let previous = Self::snapshot(mixers, live_version)?;

        if let Err(e) = self.apply(mixers) {
            log::warn!("load settings: restore failed, putting previous volumes back");
            previous.apply_all(mixers);
            return Err(e);
        }
        Ok(())
    }

    fn apply(&self, mixers: &mut MixerRegistry) -> Result<(), AudioError> {
        for (index, volume) in self.master_volumes.iter().enumerate() {
            mixers.set_master_volume(index, *volume, VolumeUnit::Decibel)?;
        }
        for (index, volume) in self.group_volumes.iter().enumerate() {
            mixers.set_group_volume(index, *volume, VolumeUnit::Decibel)?;
        }
        Ok(())
    }

    /// Write every value, skipping the ones the mixer refuses
    fn apply_all(&self, mixers: &mut MixerRegistry) {
        for (index, volume) in self.master_volumes.iter().enumerate() {
            let _ = mixers.set_master_volume(index, *volume, VolumeUnit::Decibel);
        }
        for (index, volume) in self.group_volumes.iter().enumerate() {
            let _ = mixers.set_group_volume(index, *volume, VolumeUnit::Decibel);
        }
    }

    /// Serialize to bytes
    pub fn encode(&self) -> Vec<u8> {
        let tag = self.version.as_bytes();
        let mut out = Vec::with_capacity(
            MAGIC.len() + 2 + 4 + tag.len() + 8 + 4 * (self.master_volumes.len() + self.group_volumes.len()),
        );
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_REVISION.to_le_bytes());
        write_len(&mut out, tag.len());
        out.extend_from_slice(tag);
        write_floats(&mut out, &self.master_volumes);
        write_floats(&mut out, &self.group_volumes);
        out
    }

    /// Deserialize from bytes
    ///
    /// # Errors
    /// `Corrupt` on bad magic, unknown revision, short data, invalid UTF-8
    /// or trailing bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, AudioError> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(AudioError::Corrupt("bad magic".to_string()));
        }
        let revision = reader.u16()?;
        if revision != FORMAT_REVISION {
            return Err(AudioError::Corrupt(format!("unknown format revision {revision}")));
        }
        let tag_len = reader.length()?;
        let version = std::str::from_utf8(reader.take(tag_len)?)
            .map_err(|e| AudioError::Corrupt(format!("version tag: {e}")))?
            .to_string();
        let master_volumes = reader.floats()?;
        let group_volumes = reader.floats()?;

        if reader.pos != bytes.len() {
            return Err(AudioError::Corrupt(format!(
                "{} trailing bytes",
                bytes.len() - reader.pos
            )));
        }

        Ok(Self {
            version,
            master_volumes,
            group_volumes,
        })
    }
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    // Counts are bounded by registry sizes and tag lengths
    #[allow(clippy::cast_possible_truncation)]
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

fn write_floats(out: &mut Vec<u8>, values: &[f32]) {
    write_len(out, values.len());
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], AudioError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| AudioError::Corrupt(format!("unexpected end of data at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], AudioError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u16(&mut self) -> Result<u16, AudioError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn length(&mut self) -> Result<usize, AudioError> {
        Ok(u32::from_le_bytes(self.array()?) as usize)
    }

    fn floats(&mut self) -> Result<Vec<f32>, AudioError> {
        let count = self.length()?;
        // Reject absurd counts before allocating
        if count > (self.bytes.len() - self.pos) / 4 {
            return Err(AudioError::Corrupt(format!("{count} values do not fit the remaining data")));
        }
        (0..count)
            .map(|_| Ok(f32::from_le_bytes(self.array()?)))
            .collect()
    }
}

/// Location of the settings file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store named `file_name` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self::new(dir.as_ref().join(file_name))
    }

    /// Store named `file_name` in the per-user data directory
    pub fn default_location(file_name: &str) -> Result<Self, AudioError> {
        let dirs = ProjectDirs::from("dev", "holy", "holy_audio").ok_or_else(|| {
            AudioError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "failed to resolve default data directory",
            ))
        })?;
        Ok(Self::in_dir(dirs.data_dir(), file_name))
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a record, creating parent directories as needed
    pub fn save(&self, record: &SettingsRecord) -> Result<(), AudioError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, record.encode())?;
        log::debug!("save settings: written to {}", self.path.display());
        Ok(())
    }

    /// Read a record; `Ok(None)` if nothing was saved yet
    pub fn load(&self) -> Result<Option<SettingsRecord>, AudioError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        SettingsRecord::decode(&bytes).map(Some)
    }
}
