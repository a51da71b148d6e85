//! Deterministic camera fly paths.
//!
//! A [`FlyPath`] is an ordered list of timed [`ControlPoint`]s. Sampling
//! between two samples interpolates position and scale linearly and rotation
//! spherically. Paths arrive from outside as [`FlyPathDesc`] values, which
//! deserialize from structured data such as:
//!
//! ```json
//! {
//!   "name": "overview",
//!   "loop_mode": "no_looping",
//!   "path": [
//!     { "time": 2.0, "position": [0, -10, 5], "rotation": [0, 0, 0, 1] },
//!     { "time": 4.0, "position": [10, 0, 5] }
//!   ]
//! }
//! ```

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// One camera key: world position, orientation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for ControlPoint {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl ControlPoint {
    #[must_use]
    pub fn new(position: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, ratio),
            rotation: self.rotation.slerp(other.rotation, ratio),
            scale: self.scale.lerp(other.scale, ratio),
        }
    }

    /// Camera-to-world matrix `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlyLoopMode {
    /// Back and forth between the first and the last sample.
    Swing,
    Loop,
    /// Clamp to the first/last sample outside the path's time range.
    #[default]
    NoLooping,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlyPath {
    pub name: String,
    pub loop_mode: FlyLoopMode,
    samples: Vec<(f64, ControlPoint)>,
}

impl FlyPath {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Inserts `point` at `time`, replacing a sample already at that time.
    pub fn insert(&mut self, time: f64, point: ControlPoint) {
        match self.samples.binary_search_by(|(t, _)| t.total_cmp(&time)) {
            Ok(pos) => self.samples[pos].1 = point,
            Err(pos) => self.samples.insert(pos, (time, point)),
        }
    }

    #[must_use]
    pub fn with_point(mut self, time: f64, point: ControlPoint) -> Self {
        self.insert(time, point);
        self
    }

    #[must_use]
    pub fn samples(&self) -> &[(f64, ControlPoint)] {
        &self.samples
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn first_time(&self) -> f64 {
        self.samples.first().map_or(0.0, |(t, _)| *t)
    }

    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.samples.last().map_or(0.0, |(t, _)| *t)
    }

    #[must_use]
    pub fn period(&self) -> f64 {
        self.last_time() - self.first_time()
    }

    /// Interpolated control point at `time`. `None` for an empty path.
    #[must_use]
    pub fn sample(&self, time: f64) -> Option<ControlPoint> {
        let (first, last) = (self.samples.first()?, self.samples.last()?);
        let period = self.period();

        let time = match self.loop_mode {
            FlyLoopMode::Loop if period > 0.0 => {
                let cycles = (time - first.0) / period;
                first.0 + (cycles - cycles.floor()) * period
            }
            FlyLoopMode::Swing if period > 0.0 => {
                let cycles = (time - first.0) / (period * 2.0);
                let mut fraction = cycles - cycles.floor();
                if fraction > 0.5 {
                    fraction = 1.0 - fraction;
                }
                first.0 + fraction * 2.0 * period
            }
            _ => time,
        };

        let upper = self.samples.partition_point(|(t, _)| *t <= time);
        if upper == 0 {
            return Some(first.1);
        }
        if upper == self.samples.len() {
            return Some(last.1);
        }

        let (t0, p0) = &self.samples[upper - 1];
        let (t1, p1) = &self.samples[upper];
        let dt = t1 - t0;
        let ratio = if dt > 0.0 { (time - t0) / dt } else { 0.0 };
        Some(p0.interpolate(p1, ratio))
    }
}

// ---------------------------------------------------------------------------
// Structured descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPointDesc {
    pub time: f64,
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for ControlPointDesc {
    fn default() -> Self {
        Self {
            time: 0.0,
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyPathDesc {
    pub name: String,
    pub loop_mode: FlyLoopMode,
    pub path: Vec<ControlPointDesc>,
}

impl From<&FlyPathDesc> for FlyPath {
    fn from(desc: &FlyPathDesc) -> Self {
        let mut path = FlyPath::new(desc.name.clone());
        path.loop_mode = desc.loop_mode;
        for point in &desc.path {
            path.insert(
                point.time,
                ControlPoint::new(point.position, point.rotation.normalize(), point.scale),
            );
        }
        path
    }
}

impl From<FlyPathDesc> for FlyPath {
    fn from(desc: FlyPathDesc) -> Self {
        Self::from(&desc)
    }
}
