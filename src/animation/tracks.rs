use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// Hermite spline with per-key in/out tangents.
    CubicSpline,
}

/// Keys inspected around the cached interval before a binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Last interval resolved by a track, so frame-to-frame playback stays local.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Timed keys of one animated property.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f64>,
    /// `CubicSpline` stores `[in_tangent, value, out_tangent]` per key.
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f64>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last key; `0.0` when there are none.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.times.last().map_or(0.0, |t| *t)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `true` when `values` holds exactly one entry per key (three for
    /// `CubicSpline`).
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let per_key = match self.interpolation {
            InterpolationMode::CubicSpline => 3,
            InterpolationMode::Linear | InterpolationMode::Step => 1,
        };
        self.values.len() == self.times.len() * per_key
    }

    /// `None` for an empty or inconsistent track.
    #[must_use]
    pub fn sample(&self, time: f64) -> Option<T> {
        if self.is_empty() || !self.is_consistent() {
            return None;
        }
        Some(self.evaluate(self.search(time), time))
    }

    /// Like [`sample`](Self::sample), starting the key lookup at the cursor.
    pub fn sample_with_cursor(&self, time: f64, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() || !self.is_consistent() {
            return None;
        }
        let index = self
            .scan_near(cursor.last_index, time)
            .unwrap_or_else(|| self.search(time));
        cursor.last_index = index;
        Some(self.evaluate(index, time))
    }

    /// Index of the key that starts the interval containing `time`.
    fn search(&self, time: f64) -> usize {
        self.times.partition_point(|t| *t <= time).saturating_sub(1)
    }

    fn scan_near(&self, hint: usize, time: f64) -> Option<usize> {
        let last = self.times.len() - 1;
        let hint = hint.min(last);

        if time < self.times[hint] {
            let lowest = hint.saturating_sub(MAX_SCAN_OFFSET);
            return (lowest..hint).rev().find(|i| self.times[*i] <= time);
        }

        let highest = (hint + MAX_SCAN_OFFSET).min(last);
        (hint..=highest).find(|i| *i == last || time < self.times[i + 1])
    }

    fn key(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            InterpolationMode::Linear | InterpolationMode::Step => self.values[index],
        }
    }

    fn evaluate(&self, index: usize, time: f64) -> T {
        let last = self.times.len() - 1;
        if index >= last {
            return self.key(last);
        }

        let (t0, t1) = (self.times[index], self.times[index + 1]);
        let span = t1 - t0;
        let ratio = if span > 1e-9 {
            ((time - t0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => self.key(index),
            InterpolationMode::Linear => T::interpolate_linear(self.key(index), self.key(index + 1), ratio),
            InterpolationMode::CubicSpline => {
                let from = index * 3;
                let to = from + 3;
                T::interpolate_cubic(
                    self.values[from + 1],
                    self.values[from + 2],
                    self.values[to],
                    self.values[to + 1],
                    ratio,
                    span,
                )
            }
        }
    }
}
