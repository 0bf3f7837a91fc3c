//! Time-to-space progress curves
//!
//! A transition's clock produces a time progress in `[0, 1]`; the easing
//! kind maps it onto the fraction of the path covered.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Named progress curve of a camera movement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    /// Slow start, fast finish
    Rising,
    /// Fast start, slow finish
    Declining,
    /// Linear
    Full,
    /// Symmetric ease-in/ease-out
    #[default]
    Wave,
}

impl Easing {
    pub const RISING: u8 = 0;
    pub const DECLINING: u8 = 1;
    pub const FULL: u8 = 2;
    pub const WAVE: u8 = 3;

    /// Decode a wire interpolation code; unknown codes fall back to [`Easing::Wave`]
    pub fn from_code(code: u8) -> Self {
        match code {
            Self::RISING => Easing::Rising,
            Self::DECLINING => Easing::Declining,
            Self::FULL => Easing::Full,
            _ => Easing::Wave,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Easing::Rising => Self::RISING,
            Easing::Declining => Self::DECLINING,
            Easing::Full => Self::FULL,
            Easing::Wave => Self::WAVE,
        }
    }

    /// Map a time progress to a space progress, both in `[0, 1]`
    pub fn space_progress(&self, time_progress: f64) -> f32 {
        let t = if time_progress.is_nan() {
            0.0
        } else {
            time_progress.clamp(0.0, 1.0)
        };
        let s = match self {
            Easing::Rising => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::Declining => -(t * FRAC_PI_2 + FRAC_PI_2).cos(),
            Easing::Full => t,
            Easing::Wave => 0.5 * (1.0 - (t * PI).cos()),
        };
        (s as f32).clamp(0.0, 1.0)
    }

    /// Parse a curve name as used in configuration files and the CLI
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rising" => Some(Easing::Rising),
            "declining" => Some(Easing::Declining),
            "full" | "linear" => Some(Easing::Full),
            "wave" => Some(Easing::Wave),
            _ => None,
        }
    }
}

/// Free-function form of [`Easing::space_progress`]
pub fn space_progress(time_progress: f64, kind: Easing) -> f32 {
    kind.space_progress(time_progress)
}
