use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::camera::CameraLimits;
use crate::settings::ScaleFactors;

/// Configuration derived from the loaded content's normalization scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageMetrics {
    pub vector_size: f64,
    pub fog_end: f64,
    pub light_distance: f64,
    pub ground_extent: f64,
    pub ground_divisions: u32,
    pub particle_scale: f64,
    pub camera_limits: CameraLimits,
}

impl StageMetrics {
    #[must_use]
    pub fn from_vector_size(vector_size: f64, factors: &ScaleFactors) -> Self {
        Self {
            vector_size,
            fog_end: vector_size * factors.fog,
            light_distance: vector_size * factors.light,
            ground_extent: vector_size * factors.ground,
            ground_divisions: factors.ground_divisions,
            particle_scale: vector_size / factors.particle_divisor,
            camera_limits: CameraLimits::new(
                vector_size * factors.max_position,
                vector_size * factors.max_distance,
                vector_size / factors.min_distance_divisor,
            ),
        }
    }
}

/// A scene dressing that is sized from the loaded content (fog, light rig,
/// ground platform, particles, ...).
///
/// Drawing is left to the implementor; the stage only calls
/// [`reconfigure`](Self::reconfigure) once per successful load.
pub trait Decoration: Send {
    fn name(&self) -> &str;

    fn reconfigure(&mut self, metrics: &StageMetrics);
}

/// User transform applied to the loaded content on top of the centering
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootTransform {
    pub translate: DVec3,
    pub rotate: DQuat,
    pub scale: DVec3,
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            translate: DVec3::ZERO,
            rotate: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl RootTransform {
    /// `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotate.normalize(), self.translate)
    }
}
