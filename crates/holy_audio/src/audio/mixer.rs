//! Mixer registry
//!
//! Keeps every registered mixer and mixer group by name and exposes their
//! volume parameters. A mixer's master volume lives in its `MasterVolume`
//! parameter; a group's volume lives in `<GroupName>Volume` on the mixer
//! that owns the group.
//!
//! Volumes can be addressed by name, by handle or by registration index,
//! in decibels or percent. Failures are logged and returned, never panics.

use serde::{Deserialize, Serialize};

use crate::audio::backend::{group_volume_parameter, MixerGraph, MASTER_VOLUME_PARAMETER};
use crate::audio::volume::VolumeUnit;
use crate::audio::AudioError;
use crate::foundation::collections::{Insertion, NamedMap};

/// How often a mixer advances its internal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpdateMode {
    /// Follows scaled game time
    #[default]
    Normal,
    /// Ignores time scaling, keeps running while the game is paused
    UnscaledTime,
}

/// Mixer entry in the audio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerInfo {
    /// Mixer name
    pub name: String,
    /// Update cadence applied at registration
    #[serde(default)]
    pub update_mode: UpdateMode,
}

/// Mixer group entry in the audio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerGroupInfo {
    /// Group name; sounds route to it by this name
    pub name: String,
    /// Name of the mixer that owns the group
    pub mixer: String,
}

impl MixerGroupInfo {
    /// Create a group entry
    pub fn new(name: impl Into<String>, mixer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mixer: mixer.into(),
        }
    }
}

/// A mixer graph waiting to be registered
pub struct MixerBinding {
    /// The engine mixer
    pub graph: Box<dyn MixerGraph>,
    /// Update cadence to apply
    pub update_mode: UpdateMode,
}

impl MixerBinding {
    /// Bind a mixer with the default update mode
    pub fn new(graph: impl MixerGraph + 'static) -> Self {
        Self {
            graph: Box::new(graph),
            update_mode: UpdateMode::default(),
        }
    }

    /// Set the update mode applied at registration
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }
}

/// Stable reference to a registered mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixerHandle(usize);

/// Stable reference to a registered mixer group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixerGroupHandle(usize);

/// Ways to address a mixer or a mixer group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerKey<'a, H> {
    /// Registered name
    Name(&'a str),
    /// Handle returned by the registry
    Handle(H),
    /// Registration index
    Index(usize),
}

impl<'a, H> From<&'a str> for MixerKey<'a, H> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a, H> From<&'a String> for MixerKey<'a, H> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl<H> From<usize> for MixerKey<'_, H> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<MixerHandle> for MixerKey<'_, MixerHandle> {
    fn from(handle: MixerHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<MixerGroupHandle> for MixerKey<'_, MixerGroupHandle> {
    fn from(handle: MixerGroupHandle) -> Self {
        Self::Handle(handle)
    }
}

/// A registered group, resolved to its owning mixer
#[derive(Debug)]
struct GroupEntry {
    mixer: usize,
    parameter: String,
}

/// Name-keyed mixers and mixer groups
#[derive(Default)]
pub struct MixerRegistry {
    mixers: NamedMap<Box<dyn MixerGraph>>,
    groups: NamedMap<GroupEntry>,
}

impl MixerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register mixers, applying each binding's update mode
    ///
    /// # Returns
    /// The number of mixers actually registered
    pub fn register_mixers<I>(&mut self, bindings: I) -> usize
    where
        I: IntoIterator<Item = MixerBinding>,
    {
        let mut registered = 0;
        for MixerBinding { mut graph, update_mode } in bindings {
            let name = graph.name().to_string();
            if let Some(existing) = self.mixers.position(&name) {
                log::warn!(
                    "register mixers: {} already exists at index {}, there is a duplicate name",
                    name,
                    existing
                );
                continue;
            }
            graph.set_update_mode(update_mode);
            if self.mixers.insert(name, graph).is_inserted() {
                registered += 1;
            }
        }
        registered
    }

    /// Register mixer groups against already registered mixers
    ///
    /// Groups naming an unknown mixer are logged and skipped.
    ///
    /// # Returns
    /// The number of groups actually registered
    pub fn register_groups<'a, I>(&mut self, infos: I) -> usize
    where
        I: IntoIterator<Item = &'a MixerGroupInfo>,
    {
        let mut registered = 0;
        for info in infos {
            let Some(mixer) = self.mixers.position(&info.mixer) else {
                log::error!(
                    "register mixer groups: {} references mixer {} which is not registered",
                    info.name,
                    info.mixer
                );
                continue;
            };
            let entry = GroupEntry {
                mixer,
                parameter: group_volume_parameter(&info.name),
            };
            match self.groups.insert(info.name.clone(), entry) {
                Insertion::Inserted(_) => registered += 1,
                Insertion::Duplicate(existing) => log::warn!(
                    "register mixer groups: {} already exists at index {}, there is a duplicate name",
                    info.name,
                    existing
                ),
            }
        }
        registered
    }

    /// Handle of a registered mixer
    pub fn mixer_handle(&self, name: &str) -> Option<MixerHandle> {
        self.mixers.position(name).map(MixerHandle)
    }

    /// Handle of a registered mixer group
    pub fn group_handle(&self, name: &str) -> Option<MixerGroupHandle> {
        self.groups.position(name).map(MixerGroupHandle)
    }

    /// Look up a mixer by name
    pub fn mixer(&self, name: &str) -> Option<&dyn MixerGraph> {
        self.mixers.get(name).map(AsRef::as_ref)
    }

    /// Name of the mixer that owns a group
    pub fn group_mixer_name(&self, group: &str) -> Option<&str> {
        let entry = self.groups.get(group)?;
        self.mixers.name_at(entry.mixer)
    }

    fn resolve_mixer(&self, key: MixerKey<'_, MixerHandle>) -> Result<usize, AudioError> {
        let len = self.mixers.len();
        match key {
            MixerKey::Name(name) => self
                .mixers
                .position(name)
                .ok_or_else(|| AudioError::MixerNotFound(name.to_string())),
            MixerKey::Handle(MixerHandle(index)) | MixerKey::Index(index) => {
                if index < len {
                    Ok(index)
                } else {
                    Err(AudioError::IndexOutOfBounds { index, len })
                }
            }
        }
    }

    fn resolve_group(&self, key: MixerKey<'_, MixerGroupHandle>) -> Result<usize, AudioError> {
        let len = self.groups.len();
        match key {
            MixerKey::Name(name) => self
                .groups
                .position(name)
                .ok_or_else(|| AudioError::GroupNotFound(name.to_string())),
            MixerKey::Handle(MixerGroupHandle(index)) | MixerKey::Index(index) => {
                if index < len {
                    Ok(index)
                } else {
                    Err(AudioError::IndexOutOfBounds { index, len })
                }
            }
        }
    }

    /// Read a mixer's master volume
    pub fn master_volume<'a>(
        &self,
        key: impl Into<MixerKey<'a, MixerHandle>>,
        unit: VolumeUnit,
    ) -> Result<f32, AudioError> {
        let index = self.resolve_mixer(key.into()).inspect_err(|e| log::error!("master_volume: {}", e))?;
        let mixer = self.mixers.get_index(index).ok_or(AudioError::IndexOutOfBounds {
            index,
            len: self.mixers.len(),
        })?;
        read_parameter(mixer.as_ref(), MASTER_VOLUME_PARAMETER)
            .map(|db| unit.from_decibel(db))
            .inspect_err(|e| log::error!("master_volume: {}", e))
    }

    /// Write a mixer's master volume
    pub fn set_master_volume<'a>(
        &mut self,
        key: impl Into<MixerKey<'a, MixerHandle>>,
        value: f32,
        unit: VolumeUnit,
    ) -> Result<(), AudioError> {
        let index = self
            .resolve_mixer(key.into())
            .inspect_err(|e| log::error!("set_master_volume: {}", e))?;
        let len = self.mixers.len();
        let mixer = self
            .mixers
            .get_index_mut(index)
            .ok_or(AudioError::IndexOutOfBounds { index, len })?;
        write_parameter(mixer.as_mut(), MASTER_VOLUME_PARAMETER, unit.to_decibel(value))
            .inspect_err(|e| log::error!("set_master_volume: {}", e))?;
        log::debug!(
            "set_master_volume: {} mixer's volume was set to {}{}",
            mixer.name(),
            value,
            unit.suffix()
        );
        Ok(())
    }

    /// Read a mixer group's volume
    pub fn group_volume<'a>(
        &self,
        key: impl Into<MixerKey<'a, MixerGroupHandle>>,
        unit: VolumeUnit,
    ) -> Result<f32, AudioError> {
        let index = self.resolve_group(key.into()).inspect_err(|e| log::error!("group_volume: {}", e))?;
        let (mixer, parameter) = self.group_target(index)?;
        read_parameter(mixer, parameter)
            .map(|db| unit.from_decibel(db))
            .inspect_err(|e| log::error!("group_volume: {}", e))
    }

    /// Write a mixer group's volume
    pub fn set_group_volume<'a>(
        &mut self,
        key: impl Into<MixerKey<'a, MixerGroupHandle>>,
        value: f32,
        unit: VolumeUnit,
    ) -> Result<(), AudioError> {
        let index = self
            .resolve_group(key.into())
            .inspect_err(|e| log::error!("set_group_volume: {}", e))?;
        let group_len = self.groups.len();
        let entry = self
            .groups
            .get_index(index)
            .ok_or(AudioError::IndexOutOfBounds { index, len: group_len })?;
        let (mixer_index, parameter) = (entry.mixer, entry.parameter.clone());
        let len = self.mixers.len();
        let mixer = self
            .mixers
            .get_index_mut(mixer_index)
            .ok_or(AudioError::IndexOutOfBounds { index: mixer_index, len })?;
        write_parameter(mixer.as_mut(), &parameter, unit.to_decibel(value))
            .inspect_err(|e| log::error!("set_group_volume: {}", e))?;
        log::debug!(
            "set_group_volume: {} was set to {}{}",
            parameter,
            value,
            unit.suffix()
        );
        Ok(())
    }

    fn group_target(&self, index: usize) -> Result<(&dyn MixerGraph, &str), AudioError> {
        let entry = self.groups.get_index(index).ok_or(AudioError::IndexOutOfBounds {
            index,
            len: self.groups.len(),
        })?;
        let mixer = self.mixers.get_index(entry.mixer).ok_or(AudioError::IndexOutOfBounds {
            index: entry.mixer,
            len: self.mixers.len(),
        })?;
        Ok((mixer.as_ref(), entry.parameter.as_str()))
    }

    /// Check if a mixer is registered; logs a warning when it is not
    pub fn contains_mixer(&self, name: &str) -> bool {
        let found = self.mixers.contains(name);
        if !found {
            log::warn!("contains_mixer: mixer {} was not found", name);
        }
        found
    }

    /// Check if a mixer group is registered; logs a warning when it is not
    pub fn contains_group(&self, name: &str) -> bool {
        let found = self.groups.contains(name);
        if !found {
            log::warn!("contains_group: mixer group {} was not found", name);
        }
        found
    }

    /// Mixer names in registration order
    pub fn mixer_names(&self) -> impl Iterator<Item = &str> {
        self.mixers.names()
    }

    /// Mixer group names in registration order
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.names()
    }

    /// Number of registered mixers
    pub fn mixer_count(&self) -> usize {
        self.mixers.len()
    }

    /// Number of registered mixer groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Drop every mixer and group
    pub fn clear(&mut self) {
        self.groups.clear();
        self.mixers.clear();
    }
}

fn read_parameter(mixer: &dyn MixerGraph, parameter: &str) -> Result<f32, AudioError> {
    mixer.get_float(parameter).ok_or_else(|| AudioError::MissingParameter {
        mixer: mixer.name().to_string(),
        parameter: parameter.to_string(),
    })
}

fn write_parameter(mixer: &mut dyn MixerGraph, parameter: &str, value: f32) -> Result<(), AudioError> {
    if mixer.set_float(parameter, value) {
        Ok(())
    } else {
        Err(AudioError::MissingParameter {
            mixer: mixer.name().to_string(),
            parameter: parameter.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::SoftwareMixer;
    use approx::assert_relative_eq;

    fn registry() -> MixerRegistry {
        let mut registry = MixerRegistry::new();
        registry.register_mixers(vec![
            MixerBinding::new(SoftwareMixer::with_groups("Main", &["Music", "Sfx"])),
            MixerBinding::new(SoftwareMixer::with_groups("Ui", &["Clicks"])).with_update_mode(UpdateMode::UnscaledTime),
        ]);
        registry.register_groups(&[
            MixerGroupInfo::new("Music", "Main"),
            MixerGroupInfo::new("Sfx", "Main"),
            MixerGroupInfo::new("Clicks", "Ui"),
        ]);
        registry
    }

    #[test]
    fn test_registration_applies_update_mode() {
        let registry = registry();
        assert_eq!(registry.mixer_count(), 2);
        assert_eq!(registry.group_count(), 3);
        assert_eq!(registry.mixer("Main").unwrap().update_mode(), UpdateMode::Normal);
        assert_eq!(registry.mixer("Ui").unwrap().update_mode(), UpdateMode::UnscaledTime);
        assert_eq!(registry.group_mixer_name("Clicks"), Some("Ui"));
    }

    #[test]
    fn test_duplicate_mixer_and_group_dropped() {
        let mut registry = registry();
        let added = registry.register_mixers(vec![MixerBinding::new(SoftwareMixer::unexposed("Main"))]);
        assert_eq!(added, 0);
        // The first "Main" still exposes its volume
        assert!(registry.master_volume("Main", VolumeUnit::Decibel).is_ok());

        let added = registry.register_groups(&[MixerGroupInfo::new("Music", "Ui")]);
        assert_eq!(added, 0);
        assert_eq!(registry.group_mixer_name("Music"), Some("Main"));
    }

    #[test]
    fn test_group_with_unknown_mixer_skipped() {
        let mut registry = registry();
        assert_eq!(registry.register_groups(&[MixerGroupInfo::new("Voice", "Nowhere")]), 0);
        assert!(!registry.contains_group("Voice"));
    }

    #[test]
    fn test_master_volume_by_name_handle_index() {
        let mut registry = registry();
        registry.set_master_volume("Main", -20.0, VolumeUnit::Decibel).unwrap();

        let handle = registry.mixer_handle("Main").unwrap();
        assert_eq!(registry.master_volume("Main", VolumeUnit::Decibel).unwrap(), -20.0);
        assert_eq!(registry.master_volume(handle, VolumeUnit::Decibel).unwrap(), -20.0);
        assert_eq!(registry.master_volume(0usize, VolumeUnit::Decibel).unwrap(), -20.0);
        assert_relative_eq!(registry.master_volume(0usize, VolumeUnit::Percent).unwrap(), 75.0);
    }

    #[test]
    fn test_group_volume_in_percent() {
        let mut registry = registry();
        registry.set_group_volume("Music", 50.0, VolumeUnit::Percent).unwrap();
        assert_relative_eq!(registry.group_volume("Music", VolumeUnit::Decibel).unwrap(), -40.0);

        let handle = registry.group_handle("Clicks").unwrap();
        registry.set_group_volume(handle, 0.0, VolumeUnit::Percent).unwrap();
        assert_eq!(registry.group_volume(2usize, VolumeUnit::Decibel).unwrap(), -80.0);
        // Other groups untouched
        assert_eq!(registry.group_volume("Sfx", VolumeUnit::Decibel).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_names_and_indices() {
        let mut registry = registry();
        assert!(matches!(
            registry.master_volume("Nope", VolumeUnit::Decibel),
            Err(AudioError::MixerNotFound(_))
        ));
        assert!(matches!(
            registry.set_group_volume("Nope", 0.0, VolumeUnit::Decibel),
            Err(AudioError::GroupNotFound(_))
        ));
        assert!(matches!(
            registry.group_volume(9usize, VolumeUnit::Decibel),
            Err(AudioError::IndexOutOfBounds { index: 9, len: 3 })
        ));
    }

    #[test]
    fn test_missing_parameter_reports_failure() {
        let mut registry = MixerRegistry::new();
        registry.register_mixers(vec![MixerBinding::new(SoftwareMixer::unexposed("Bare"))]);
        registry.register_groups(&[MixerGroupInfo::new("Music", "Bare")]);

        assert!(matches!(
            registry.master_volume("Bare", VolumeUnit::Decibel),
            Err(AudioError::MissingParameter { .. })
        ));
        assert!(matches!(
            registry.set_group_volume("Music", -3.0, VolumeUnit::Decibel),
            Err(AudioError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_names_in_registration_order() {
        let registry = registry();
        let mixers: Vec<_> = registry.mixer_names().collect();
        let groups: Vec<_> = registry.group_names().collect();
        assert_eq!(mixers, vec!["Main", "Ui"]);
        assert_eq!(groups, vec!["Music", "Sfx", "Clicks"]);
    }
}
