/// Direction of a single wheel notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Already-normalized camera gestures.
///
/// Deltas are in normalized viewport units; `dt` is the time between the two
/// input samples the delta was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    Pan { dx: f64, dy: f64, dt: f64 },
    Zoom { dy: f64, dt: f64 },
    Orbit { dx: f64, dy: f64, dt: f64 },
    Wheel(ScrollDirection),
    /// Button pressed: stops any throw in progress.
    Push,
    /// Button released. With `moving` set and throw enabled, the last gesture
    /// keeps going.
    Release { moving: bool },
    /// Log the current home and fly points.
    DumpPose,
}

impl CameraEvent {
    /// Gestures that can be thrown.
    #[must_use]
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::Pan { .. } | Self::Zoom { .. } | Self::Orbit { .. })
    }
}
