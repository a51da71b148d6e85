use glam::{DQuat, DVec3};

use crate::animation::binder::Binder;
use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::target::{TargetSet, TargetValue};
use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<DVec3>),
    Quaternion(KeyframeTrack<DQuat>),
    Scalar(KeyframeTrack<f64>),
}

impl TrackData {
    pub(crate) fn is_consistent(&self) -> bool {
        match self {
            TrackData::Vector3(track) => track.is_consistent(),
            TrackData::Quaternion(track) => track.is_consistent(),
            TrackData::Scalar(track) => track.is_consistent(),
        }
    }

    fn end_time(&self) -> f64 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
            TrackData::Scalar(track) => track.end_time(),
        }
    }

    fn sample(&self, time: f64, cursor: &mut KeyframeCursor) -> Option<TargetValue> {
        match self {
            TrackData::Vector3(track) => track.sample_with_cursor(time, cursor).map(TargetValue::Vector3),
            TrackData::Quaternion(track) => {
                track.sample_with_cursor(time, cursor).map(TargetValue::Quaternion)
            }
            TrackData::Scalar(track) => track.sample_with_cursor(time, cursor).map(TargetValue::Scalar),
        }
    }
}

/// Track definition: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Runs once and reports exhaustion past the end.
    Once,
    /// Holds the last pose forever.
    Stay,
    #[default]
    Loop,
    PingPong,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Intrinsic length: the largest last keyframe time across tracks.
    pub duration: f64,
    pub tracks: Vec<Track>,

    playback_duration: f64,
    start_time: f64,
    weight: f64,
    play_mode: PlayMode,

    bindings: Vec<PropertyBinding>,
    track_cursors: Vec<KeyframeCursor>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(|t| t.data.end_time()).fold(0.0_f64, f64::max);
        let track_count = tracks.len();

        Self {
            name: name.into(),
            duration,
            tracks,
            playback_duration: duration,
            start_time: 0.0,
            weight: 1.0,
            play_mode: PlayMode::Loop,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    /// Binds every track to a target slot in `targets`.
    pub fn bind(&mut self, targets: &mut TargetSet) {
        self.bindings = Binder::bind(self, targets);
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Sets the time-scaled playback length. Non-positive values restore the
    /// intrinsic duration.
    pub fn set_duration(&mut self, duration: f64) {
        self.playback_duration = if duration > 0.0 { duration } else { self.duration };
    }

    #[inline]
    #[must_use]
    pub fn playback_duration(&self) -> f64 {
        self.playback_duration
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    #[inline]
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.play_mode = mode;
    }

    #[inline]
    #[must_use]
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Maps an absolute time to a clip-local phase. `None` means a `Once`
    /// clip ran past its end.
    #[must_use]
    pub fn phase_at(&self, time: f64) -> Option<f64> {
        let intrinsic = self.duration;
        let ratio = if self.playback_duration > 0.0 {
            intrinsic / self.playback_duration
        } else {
            1.0
        };
        let t = (time - self.start_time) * ratio;

        if intrinsic <= 0.0 {
            return match self.play_mode {
                PlayMode::Once if t > intrinsic => None,
                _ => Some(0.0),
            };
        }

        match self.play_mode {
            PlayMode::Once => (t <= intrinsic).then_some(t),
            PlayMode::Stay => Some(t.min(intrinsic)),
            PlayMode::Loop => Some(t.rem_euclid(intrinsic)),
            PlayMode::PingPong => {
                let local = t.rem_euclid(intrinsic);
                let period = (t / intrinsic).floor();
                if period.rem_euclid(2.0) == 1.0 {
                    Some(intrinsic - local)
                } else {
                    Some(local)
                }
            }
        }
    }

    /// Advances to `time` and blends the pose into `targets`.
    ///
    /// Returns `false` once a `Once` clip is exhausted; its last pose is still
    /// written so the final frame lands on the end keyframe.
    pub fn update(&mut self, time: f64, priority: i32, targets: &mut TargetSet) -> bool {
        match self.phase_at(time) {
            Some(phase) => {
                self.sample_at(phase, priority, targets);
                true
            }
            None => {
                self.sample_at(self.duration, priority, targets);
                false
            }
        }
    }

    /// Samples every bound track at clip-local `phase`.
    pub fn sample_at(&mut self, phase: f64, priority: i32, targets: &mut TargetSet) {
        for binding in &self.bindings {
            let Some(track) = self.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            let Some(value) = track.data.sample(phase, cursor) else {
                continue;
            };
            if let Some(target) = targets.get_mut(binding.slot) {
                target.blend(self.weight, value, priority);
            }
        }
    }

    /// Clears the blend accumulation of every target this clip writes.
    pub fn reset_targets(&self, targets: &mut TargetSet) {
        for binding in &self.bindings {
            if let Some(target) = targets.get_mut(binding.slot) {
                target.reset();
            }
        }
    }
}
