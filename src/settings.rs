//! Stage Settings
//!
//! Tunables for the camera state machine and for the normalization-scale
//! fan-out performed after every successful load.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stage::settings::{StageSettings, CameraSettings};
//!
//! // Defaults match the classic viewer behavior
//! let settings = StageSettings::default();
//!
//! // Slower wheel zoom and throw enabled
//! let settings = StageSettings {
//!     camera: CameraSettings {
//!         wheel_zoom_factor: 0.05,
//!         allow_throw: true,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```
//!
//! Both structs deserialize with `#[serde(default)]`, so a partial JSON/TOML
//! document only needs to name the fields it overrides.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CameraSettings
// ---------------------------------------------------------------------------

/// Gesture and fly-playback tunables for
/// [`OrbitManipulator`](crate::camera::OrbitManipulator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Pan displacement per unit of drag, multiplied by the orbit distance.
    /// Negative so the model follows the cursor.
    pub pan_factor: f64,

    /// Relative zoom step applied per wheel notch.
    pub wheel_zoom_factor: f64,

    /// Distance below which zooming in pushes the orbit center forward
    /// instead of shrinking the distance further.
    pub zoom_floor: f64,

    /// Keep re-applying the last gesture after a release while moving.
    pub allow_throw: bool,

    /// Path time at which the current view is inserted when a fly starts.
    pub fly_lead_in_time: f64,

    /// Multiplier from frame time to fly-path time.
    pub fly_time_scale: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            pan_factor: -0.3,
            wheel_zoom_factor: 0.1,
            zoom_floor: 0.05,
            allow_throw: false,
            fly_lead_in_time: 1.0,
            fly_time_scale: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ScaleFactors
// ---------------------------------------------------------------------------

/// Multipliers turning the loaded content's normalization scale into the
/// configuration of every dependent subsystem.
///
/// | Consumer              | Derived value                      |
/// |-----------------------|------------------------------------|
/// | Fog                   | `vector_size * fog`                |
/// | Light rig             | `vector_size * light`              |
/// | Ground platform       | `vector_size * ground`             |
/// | Particles             | `vector_size / particle_divisor`   |
/// | Camera `max_position` | `vector_size * max_position`       |
/// | Camera `max_distance` | `vector_size * max_distance`       |
/// | Camera `min_distance` | `vector_size / min_distance_divisor` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFactors {
    pub fog: f64,
    pub light: f64,
    pub ground: f64,
    pub ground_divisions: u32,
    pub particle_divisor: f64,
    pub max_position: f64,
    pub max_distance: f64,
    pub min_distance_divisor: f64,
    /// Default home eye sits `vector_size * home_back` behind the origin.
    pub home_back: f64,
    /// Default home eye sits `vector_size / home_lift_divisor` above the origin.
    pub home_lift_divisor: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            fog: 10.0,
            light: 5.0,
            ground: 4.0,
            ground_divisions: 20,
            particle_divisor: 5.0,
            max_position: 2.0,
            max_distance: 10.0,
            min_distance_divisor: 20.0,
            home_back: 2.0,
            home_lift_divisor: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// StageSettings
// ---------------------------------------------------------------------------

/// Top-level configuration handed to [`Stage::new`](crate::stage::Stage::new).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub camera: CameraSettings,
    pub scale: ScaleFactors,
}
