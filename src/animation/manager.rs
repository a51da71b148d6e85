use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::clip::{AnimationClip, PlayMode};
use crate::animation::target::TargetSet;

/// Invoked once per finished clip with its index.
pub type FinishedCallback = Box<dyn FnMut(usize) + Send>;

/// Clip indices that finished during one [`AnimationManager::update`].
pub type FinishedClips = SmallVec<[usize; 4]>;

/// Options for [`AnimationManager::play`].
///
/// `None` means "not given". The defaults restart the clip from phase zero
/// and loop it forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    /// Restart from phase zero (ignored when `start` is given).
    pub reset: bool,
    /// Play once over this many seconds instead of looping.
    pub duration: Option<f64>,
    /// Finish this many seconds after the start instead of after `duration`.
    pub end: Option<f64>,
    /// Explicit phase to resume from.
    pub start: Option<f64>,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            reset: true,
            duration: None,
            end: None,
            start: None,
        }
    }
}

impl PlayOptions {
    /// Builds options from the sentinel encoding used by UI layers, where any
    /// negative number means "not given".
    #[must_use]
    pub fn from_raw(reset: bool, duration: f64, end: f64, start: f64) -> Self {
        let given = |v: f64| (v >= 0.0).then_some(v);
        Self {
            reset,
            duration: given(duration),
            end: given(end),
            start: given(start),
        }
    }

    #[must_use]
    pub fn once(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_end(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn resume(mut self) -> Self {
        self.reset = false;
        self
    }
}

/// Schedules a fixed list of clips.
///
/// Clips are addressed by their stable index in the list handed to
/// [`AnimationManager::new`]. Each playing clip lives in exactly one priority
/// layer; [`update`](Self::update) evaluates layers from the highest priority
/// down and drops clips the frame they finish.
pub struct AnimationManager {
    clips: Vec<AnimationClip>,
    index_of: FxHashMap<String, usize>,
    end_times: Vec<Option<f64>>,
    layers: BTreeMap<i32, Vec<usize>>,
    targets: TargetSet,
    last_update: f64,
    finished_callback: Option<FinishedCallback>,
}

impl AnimationManager {
    #[must_use]
    pub fn new(mut clips: Vec<AnimationClip>) -> Self {
        let mut targets = TargetSet::new();
        let mut index_of = FxHashMap::default();

        for (index, clip) in clips.iter_mut().enumerate() {
            clip.bind(&mut targets);
            index_of.entry(clip.name.clone()).or_insert(index);
        }

        let end_times = vec![None; clips.len()];
        log::debug!(
            "AnimationManager: {} clips bound to {} targets",
            clips.len(),
            targets.len()
        );

        Self {
            clips,
            index_of,
            end_times,
            layers: BTreeMap::new(),
            targets,
            last_update: 0.0,
            finished_callback: None,
        }
    }

    pub fn set_finished_callback(&mut self, callback: impl FnMut(usize) + Send + 'static) {
        self.finished_callback = Some(Box::new(callback));
    }

    pub fn clear_finished_callback(&mut self) {
        self.finished_callback = None;
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Starts or retriggers clip `index` at priority 0 with full weight.
    ///
    /// Start time resolution, first match wins:
    /// 1. `start` given: resume at that phase.
    /// 2. `reset`: restart from phase zero.
    /// 3. Already playing: mirror the elapsed phase against `end` (or the
    ///    previous playback duration once `end` has been passed).
    /// 4. Stopped after a previous run: resume where that run ended, unless
    ///    that lies beyond the new `duration`.
    ///
    /// With a `duration` the clip plays once and finishes at
    /// `start + end.unwrap_or(duration)`; without one it loops until stopped.
    pub fn play(&mut self, index: usize, options: PlayOptions) -> bool {
        if index >= self.clips.len() {
            log::warn!("play: clip index {index} out of range ({} clips)", self.clips.len());
            return false;
        }

        let now = self.last_update;
        let pass_time = self.is_playing(index).then(|| now - self.clips[index].start_time());
        let last_duration = self.clips[index].playback_duration();
        let last_end_time = self.end_times[index];
        let last_start_time = self.clips[index].start_time();

        self.activate(index, 0, 1.0);

        let start_time = if let Some(start) = options.start {
            now - start
        } else if options.reset {
            now
        } else if let Some(pass_time) = pass_time {
            let offset = match options.end {
                Some(end) if pass_time < end => end - pass_time,
                _ => last_duration - pass_time,
            };
            now - offset
        } else if let Some(last_end) = last_end_time {
            let mut offset = last_end - last_start_time;
            if offset > options.duration.unwrap_or(-1.0) {
                offset = 0.0;
            }
            now - offset
        } else {
            now
        };

        let clip = &mut self.clips[index];
        clip.set_start_time(start_time);

        if let Some(duration) = options.duration {
            clip.set_play_mode(PlayMode::Once);
            clip.set_duration(duration);
            self.end_times[index] = Some(start_time + options.end.unwrap_or(duration));
        } else {
            clip.set_play_mode(PlayMode::Loop);
            self.end_times[index] = None;
        }

        log::debug!(
            "play: clip '{}' ({index}) start={start_time:.3} end={:?}",
            clip.name,
            self.end_times[index]
        );
        true
    }

    /// Plays clip `index` on an explicit layer, leaving its play mode and
    /// end time as they are.
    pub fn play_layered(&mut self, index: usize, priority: i32, weight: f64) -> bool {
        if index >= self.clips.len() {
            log::warn!("play_layered: clip index {index} out of range");
            return false;
        }
        self.activate(index, priority, weight);
        true
    }

    /// Stops clip `index`. With `reset` its targets are put back to the pose
    /// at phase zero.
    pub fn stop(&mut self, index: usize, reset: bool) -> bool {
        if index >= self.clips.len() {
            log::warn!("stop: clip index {index} out of range ({} clips)", self.clips.len());
            return false;
        }

        self.deactivate(index);
        self.end_times[index] = Some(self.last_update);
        if reset {
            self.rewind(index);
        }
        true
    }

    /// Stops every playing clip. Every clip's end time becomes "now"; with
    /// `reset` only the clips that were playing are put back to phase zero.
    pub fn stop_all(&mut self, reset: bool) -> bool {
        let playing: Vec<usize> = self.layers.values().flatten().copied().collect();
        self.layers.clear();
        for end_time in &mut self.end_times {
            *end_time = Some(self.last_update);
        }

        for index in playing {
            self.clips[index].reset_targets(&mut self.targets);
            if reset {
                self.rewind(index);
            }
        }
        true
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances every playing clip to `now`, highest priority first.
    ///
    /// Returns the clips that finished this frame, in evaluation order. The
    /// finished callback runs for each of them after all removals are done.
    pub fn update(&mut self, now: f64) -> FinishedClips {
        self.last_update = now;
        self.targets.reset_all();

        let mut finished = FinishedClips::new();

        for (&priority, list) in self.layers.iter_mut().rev() {
            let mut to_remove: SmallVec<[usize; 4]> = SmallVec::new();

            for (position, &index) in list.iter().enumerate() {
                let alive = self.clips[index].update(now, priority, &mut self.targets);
                let expired = self.end_times[index].is_some_and(|end| now > end);
                if !alive || expired {
                    self.end_times[index] = Some(now);
                    to_remove.push(position);
                    finished.push(index);
                }
            }

            while let Some(position) = to_remove.pop() {
                list.remove(position);
            }
        }

        self.layers.retain(|_, list| !list.is_empty());

        if !finished.is_empty() {
            for &index in &finished {
                log::debug!("Clip '{}' ({index}) finished at {now:.3}", self.clips[index].name);
            }
            if let Some(callback) = self.finished_callback.as_mut() {
                for &index in &finished {
                    callback(index);
                }
            }
        }

        finished
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn is_playing(&self, index: usize) -> bool {
        self.layers.values().any(|list| list.contains(&index))
    }

    #[must_use]
    pub fn has_any_playing(&self) -> bool {
        self.layers.values().any(|list| !list.is_empty())
    }

    /// Priority of the layer clip `index` plays on.
    #[must_use]
    pub fn priority_of(&self, index: usize) -> Option<i32> {
        self.layers
            .iter()
            .find_map(|(&priority, list)| list.contains(&index).then_some(priority))
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    #[must_use]
    pub fn clip_names(&self) -> Vec<String> {
        self.clips.iter().map(|clip| clip.name.clone()).collect()
    }

    #[must_use]
    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// End time override of clip `index`. `None` when unset or out of range.
    #[must_use]
    pub fn end_time(&self, index: usize) -> Option<f64> {
        self.end_times.get(index).copied().flatten()
    }

    #[must_use]
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    #[must_use]
    pub fn last_update(&self) -> f64 {
        self.last_update
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn activate(&mut self, index: usize, priority: i32, weight: f64) {
        if self.is_playing(index) {
            self.deactivate(index);
        }
        self.layers.entry(priority).or_default().push(index);
        let clip = &mut self.clips[index];
        clip.set_start_time(self.last_update);
        clip.set_weight(weight);
    }

    fn deactivate(&mut self, index: usize) {
        let mut found = false;
        for list in self.layers.values_mut() {
            if let Some(position) = list.iter().position(|&i| i == index) {
                list.remove(position);
                found = true;
                break;
            }
        }
        if found {
            self.clips[index].reset_targets(&mut self.targets);
            self.layers.retain(|_, list| !list.is_empty());
        }
    }

    fn rewind(&mut self, index: usize) {
        let clip = &mut self.clips[index];
        let start = clip.start_time();
        clip.update(start, 0, &mut self.targets);
    }
}
