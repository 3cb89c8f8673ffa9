//! Volume units and conversions
//!
//! Mixers store volume in decibels. UI sliders work in percent, mapped
//! linearly onto the `[-80, 0]` dB range.

use serde::{Deserialize, Serialize};

/// Lowest mixer volume in decibels; treated as silence
pub const DECIBEL_FLOOR: f32 = -80.0;

/// Returned by UI-facing getters when a volume cannot be read
pub const MISSING_VOLUME: f32 = -99.0;

/// Unit a volume value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeUnit {
    /// Raw mixer value in decibels
    Decibel,
    /// 0-100 slider value
    Percent,
}

impl VolumeUnit {
    /// Convert a decibel reading into this unit
    pub fn from_decibel(self, db: f32) -> f32 {
        match self {
            Self::Decibel => db,
            Self::Percent => decibel_to_percent(db),
        }
    }

    /// Convert a value in this unit into decibels
    pub fn to_decibel(self, value: f32) -> f32 {
        match self {
            Self::Decibel => value,
            Self::Percent => percent_to_decibel(value),
        }
    }

    /// Suffix used in log lines
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Decibel => "dB",
            Self::Percent => "%",
        }
    }
}

/// Map a 0-100 percentage onto the `[-80, 0]` dB range
pub fn percent_to_decibel(percent: f32) -> f32 {
    (percent / 100.0 * 80.0) - 80.0
}

/// Map a decibel value onto a 0-100 percentage
///
/// Not the inverse of [`percent_to_decibel`] in general: the absolute value
/// folds readings below the -80 dB floor back above 0%, so only the two
/// boundaries are guaranteed to survive a round trip unchanged.
pub fn decibel_to_percent(db: f32) -> f32 {
    ((db / DECIBEL_FLOOR) - 1.0).abs() * 100.0
}

/// Convert decibels to a linear gain factor; the floor maps to silence
pub fn decibel_to_gain(db: f32) -> f32 {
    if db <= DECIBEL_FLOOR {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}
