use glam::{DMat3, DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::settings::ScaleFactors;

/// Interactive orbit state: the camera looks at `center` from `distance`
/// along its local +Z axis, oriented by `rotation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub center: DVec3,
    pub rotation: DQuat,
    pub distance: f64,
}

impl Default for OrbitPose {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            distance: 1.0,
        }
    }
}

impl OrbitPose {
    /// Camera-to-world matrix: `T(center) * R(rotation) * T(0, 0, distance)`.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_translation(self.center)
            * DMat4::from_quat(self.rotation)
            * DMat4::from_translation(DVec3::new(0.0, 0.0, self.distance))
    }

    #[inline]
    #[must_use]
    pub fn eye(&self) -> DVec3 {
        self.center + self.rotation * DVec3::new(0.0, 0.0, self.distance)
    }

    #[inline]
    #[must_use]
    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Builds the pose looking from `eye` at `center`.
    #[must_use]
    pub fn from_look_at(eye: DVec3, center: DVec3, up: DVec3) -> Self {
        let offset = center - eye;
        let f = offset.normalize_or_zero();
        let s = f.cross(up).normalize_or_zero();
        let u = s.cross(f).normalize_or_zero();
        let rotation = DQuat::from_mat3(&DMat3::from_cols(s, u, -f)).normalize();

        Self {
            center,
            rotation,
            distance: offset.length(),
        }
    }

    /// Re-derives center and rotation from a camera matrix, keeping `distance`.
    #[must_use]
    pub fn from_matrix(matrix: &DMat4, distance: f64) -> Self {
        let (_, rotation, _) = matrix.to_scale_rotation_translation();
        let center = matrix.transform_point3(DVec3::new(0.0, 0.0, -distance));
        Self {
            center,
            rotation: rotation.normalize(),
            distance,
        }
    }

    /// `true` when no component is NaN.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.rotation.is_finite() && self.distance.is_finite()
    }
}

/// Where [`OrbitManipulator::home`](crate::camera::OrbitManipulator::home) returns to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePose {
    pub eye: DVec3,
    pub center: DVec3,
    pub up: DVec3,
}

impl Default for HomePose {
    fn default() -> Self {
        Self {
            eye: DVec3::new(0.0, -1.0, 0.0),
            center: DVec3::ZERO,
            up: DVec3::Z,
        }
    }
}

impl HomePose {
    #[must_use]
    pub fn new(eye: DVec3, center: DVec3, up: DVec3) -> Self {
        Self { eye, center, up }
    }

    /// Default home for content of the given normalization scale: behind and
    /// above the origin, Z up.
    #[must_use]
    pub fn for_vector_size(vector_size: f64, factors: &ScaleFactors) -> Self {
        Self {
            eye: DVec3::new(
                0.0,
                -vector_size * factors.home_back,
                vector_size / factors.home_lift_divisor,
            ),
            center: DVec3::ZERO,
            up: DVec3::Z,
        }
    }

    #[must_use]
    pub fn to_pose(&self) -> OrbitPose {
        OrbitPose::from_look_at(self.eye, self.center, self.up)
    }
}

/// Bounds every interactive camera update must respect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraLimits {
    pub max_position: f64,
    pub max_distance: f64,
    pub min_distance: f64,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl CameraLimits {
    pub const UNBOUNDED: Self = Self {
        max_position: f64::INFINITY,
        max_distance: f64::INFINITY,
        min_distance: 0.0,
    };

    #[must_use]
    pub fn new(max_position: f64, max_distance: f64, min_distance: f64) -> Self {
        Self {
            max_position,
            max_distance,
            min_distance,
        }
    }

    /// `|center| <= max_position` and `min_distance <= distance <= max_distance`.
    /// NaN components never pass.
    #[must_use]
    pub fn contains(&self, pose: &OrbitPose) -> bool {
        pose.center.length() <= self.max_position
            && pose.distance <= self.max_distance
            && pose.distance >= self.min_distance
    }
}
