//! In-memory mixer graph
//!
//! Stores exposed parameters in a map. Used headless, in tests, and as the
//! gain source for the Rodio backend, which reads the same parameter store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{group_volume_parameter, MixerGraph, MASTER_VOLUME_PARAMETER};
use crate::audio::mixer::UpdateMode;

/// Shared handle to a mixer's parameter store
pub type MixerParams = Rc<RefCell<HashMap<String, f32>>>;

/// Mixer whose parameters live in memory
#[derive(Debug, Clone)]
pub struct SoftwareMixer {
    name: String,
    params: MixerParams,
    update_mode: UpdateMode,
}

impl SoftwareMixer {
    /// Create a mixer exposing only `MasterVolume`, at 0 dB
    pub fn new(name: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(MASTER_VOLUME_PARAMETER.to_string(), 0.0);
        Self {
            name: name.into(),
            params: Rc::new(RefCell::new(params)),
            update_mode: UpdateMode::default(),
        }
    }

    /// Create a mixer exposing `MasterVolume` and `<Group>Volume` per group
    pub fn with_groups(name: impl Into<String>, groups: &[&str]) -> Self {
        let mixer = Self::new(name);
        {
            let mut params = mixer.params.borrow_mut();
            for group in groups {
                params.insert(group_volume_parameter(group), 0.0);
            }
        }
        mixer
    }

    /// Create a mixer exposing no parameters at all
    pub fn unexposed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Rc::new(RefCell::new(HashMap::new())),
            update_mode: UpdateMode::default(),
        }
    }

    /// Expose an extra parameter
    pub fn with_parameter(self, parameter: impl Into<String>, value: f32) -> Self {
        self.params.borrow_mut().insert(parameter.into(), value);
        self
    }

    /// Shared parameter store, for backends that need to read gains
    pub fn params(&self) -> MixerParams {
        Rc::clone(&self.params)
    }
}

impl MixerGraph for SoftwareMixer {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_float(&self, parameter: &str) -> Option<f32> {
        self.params.borrow().get(parameter).copied()
    }

    fn set_float(&mut self, parameter: &str, value: f32) -> bool {
        match self.params.borrow_mut().get_mut(parameter) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn set_update_mode(&mut self, mode: UpdateMode) {
        self.update_mode = mode;
    }

    fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposed_parameters() {
        let mixer = SoftwareMixer::with_groups("Main", &["Music", "Sfx"]);
        assert_eq!(mixer.get_float("MasterVolume"), Some(0.0));
        assert_eq!(mixer.get_float("MusicVolume"), Some(0.0));
        assert_eq!(mixer.get_float("VoiceVolume"), None);
    }

    #[test]
    fn test_set_only_existing_parameters() {
        let mut mixer = SoftwareMixer::new("Main");
        assert!(mixer.set_float("MasterVolume", -12.0));
        assert!(!mixer.set_float("MusicVolume", -12.0));
        assert_eq!(mixer.get_float("MasterVolume"), Some(-12.0));
        assert_eq!(mixer.get_float("MusicVolume"), None);
    }

    #[test]
    fn test_shared_params_see_writes() {
        let mut mixer = SoftwareMixer::with_groups("Main", &["Music"]);
        let params = mixer.params();
        mixer.set_float("MusicVolume", -6.0);
        assert_eq!(params.borrow().get("MusicVolume"), Some(&-6.0));
    }

    #[test]
    fn test_unexposed_mixer() {
        let mut mixer = SoftwareMixer::unexposed("Bare");
        assert!(mixer.get_float("MasterVolume").is_none());
        assert!(!mixer.set_float("MasterVolume", 0.0));
    }
}
