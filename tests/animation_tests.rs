//! Animation Scheduler Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation and cursor lookup
//! - AnimationTarget priority/weight blending
//! - AnimationClip phase mapping for every play mode
//! - AnimationManager play/stop/update scheduling rules

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DQuat, DVec3};

use stage::animation::{
    AnimationClip, AnimationManager, AnimationTarget, InterpolationMode, KeyframeCursor,
    KeyframeTrack, PlayMode, PlayOptions, TargetPath, TargetValue, Track, TrackData, TrackMeta,
};

const EPSILON: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// A clip whose single scalar track maps phase `t` to value `t`, so the
/// blended value reads back as the clip phase.
fn ramp_clip(name: &str, node: &str, length: f64) -> AnimationClip {
    AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: node.to_string(),
                target: TargetPath::Scalar,
            },
            data: TrackData::Scalar(KeyframeTrack::new(
                vec![0.0, length],
                vec![0.0, length],
                InterpolationMode::Linear,
            )),
        }],
    )
}

fn constant_clip(name: &str, node: &str, value: f64) -> AnimationClip {
    AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: node.to_string(),
                target: TargetPath::Scalar,
            },
            data: TrackData::Scalar(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![value, value],
                InterpolationMode::Step,
            )),
        }],
    )
}

fn three_clips() -> AnimationManager {
    AnimationManager::new(vec![
        ramp_clip("walk", "a", 2.0),
        ramp_clip("run", "b", 2.0),
        ramp_clip("wave", "c", 2.0),
    ])
}

fn scalar(manager: &AnimationManager, node: &str) -> f64 {
    manager
        .targets()
        .value(node, TargetPath::Scalar)
        .and_then(|v| v.as_scalar())
        .expect("target should exist")
}

fn scalar_track(node: &str, times: Vec<f64>, values: Vec<f64>) -> Track {
    Track {
        meta: TrackMeta {
            node_name: node.to_string(),
            target: TargetPath::Scalar,
        },
        data: TrackData::Scalar(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_f64_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f64, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_exact_keyframes() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f64, 10.0, 20.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(2.0, &mut cursor).unwrap(), 20.0));
}

#[test]
fn track_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f64, 20.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 20.0));
    assert!(approx(track.sample(0.0).unwrap(), 10.0));
    assert!(approx(track.sample(5.0).unwrap(), 20.0));
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![1.0_f64, 2.0, 3.0],
        InterpolationMode::Step,
    );

    assert!(approx(track.sample(0.99).unwrap(), 1.0));
    assert!(approx(track.sample(1.5).unwrap(), 2.0));
}

#[test]
fn track_cubic_hits_keyframe_values() {
    // [in_tangent, value, out_tangent] per key
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f64, 0.0, 1.0, 1.0, 4.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    assert!(approx(track.sample(0.0).unwrap(), 0.0));
    assert!(approx(track.sample(1.0).unwrap(), 4.0));
}

#[test]
fn track_cursor_handles_backward_jump() {
    let times: Vec<f64> = (0..20).map(f64::from).collect();
    let values = times.clone();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(15.5, &mut cursor).unwrap(), 15.5));
    assert_eq!(cursor.last_index, 15);

    assert!(approx(track.sample_with_cursor(2.25, &mut cursor).unwrap(), 2.25));
    assert_eq!(cursor.last_index, 2);
}

#[test]
fn track_empty_samples_none() {
    let track: KeyframeTrack<f64> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();

    assert!(track.sample(1.0).is_none());
    assert!(track.sample_with_cursor(1.0, &mut cursor).is_none());
}

#[test]
fn track_quat_slerp_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![DQuat::IDENTITY, DQuat::from_rotation_z(PI)],
        InterpolationMode::Linear,
    );

    let q = track.sample(0.5).unwrap();
    let expected = DQuat::from_rotation_z(FRAC_PI_2);
    assert!(q.angle_between(expected) < 1e-6);
}

// ============================================================================
// AnimationTarget blending
// ============================================================================

#[test]
fn target_first_blend_takes_value() {
    let mut target = AnimationTarget::new(TargetValue::Scalar(0.0));
    assert!(target.blend(0.3, TargetValue::Scalar(7.0), 0));
    assert_eq!(target.value(), TargetValue::Scalar(7.0));
}

#[test]
fn target_same_priority_averages_by_weight() {
    let mut target = AnimationTarget::new(TargetValue::Scalar(0.0));
    target.blend(1.0, TargetValue::Scalar(10.0), 0);
    target.blend(1.0, TargetValue::Scalar(20.0), 0);

    let v = target.value().as_scalar().unwrap();
    assert!(approx(v, 15.0), "Expected 15.0, got {v}");
}

#[test]
fn target_full_weight_priority_masks_lower_layers() {
    let mut target = AnimationTarget::new(TargetValue::Scalar(0.0));
    target.blend(1.0, TargetValue::Scalar(10.0), 1);
    target.blend(1.0, TargetValue::Scalar(20.0), 0);

    let v = target.value().as_scalar().unwrap();
    assert!(approx(v, 10.0), "Expected 10.0, got {v}");
}

#[test]
fn target_lower_layer_fills_leftover_weight() {
    let mut target = AnimationTarget::new(TargetValue::Scalar(0.0));
    target.blend(0.5, TargetValue::Scalar(10.0), 1);
    target.blend(1.0, TargetValue::Scalar(20.0), 0);

    let v = target.value().as_scalar().unwrap();
    assert!(approx(v, 15.0), "Expected 15.0, got {v}");
}

#[test]
fn target_reset_keeps_value() {
    let mut target = AnimationTarget::new(TargetValue::Vector3(DVec3::ZERO));
    target.blend(1.0, TargetValue::Vector3(DVec3::X), 0);
    target.reset();

    assert_eq!(target.value(), TargetValue::Vector3(DVec3::X));
    assert!(approx(target.accumulated_weight(), 0.0));
}

#[test]
fn target_rejects_mismatched_kind() {
    let mut target = AnimationTarget::new(TargetValue::Scalar(1.0));
    assert!(!target.blend(1.0, TargetValue::Vector3(DVec3::ONE), 0));
    assert_eq!(target.value(), TargetValue::Scalar(1.0));
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_longest_track() {
    let clip = AnimationClip::new(
        "mixed",
        vec![
            Track {
                meta: TrackMeta {
                    node_name: "a".into(),
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, 1.5],
                    vec![DVec3::ZERO, DVec3::ONE],
                    InterpolationMode::Linear,
                )),
            },
            Track {
                meta: TrackMeta {
                    node_name: "a".into(),
                    target: TargetPath::Scalar,
                },
                data: TrackData::Scalar(KeyframeTrack::new(
                    vec![0.0, 3.0],
                    vec![0.0, 1.0],
                    InterpolationMode::Linear,
                )),
            },
        ],
    );

    assert!(approx(clip.duration, 3.0));
    assert!(approx(clip.playback_duration(), 3.0));
}

#[test]
fn clip_set_duration_non_positive_restores_intrinsic() {
    let mut clip = ramp_clip("walk", "a", 2.0);
    clip.set_duration(4.0);
    assert!(approx(clip.playback_duration(), 4.0));

    clip.set_duration(0.0);
    assert!(approx(clip.playback_duration(), 2.0));
}

#[test]
fn clip_phase_for_each_play_mode() {
    let mut clip = ramp_clip("walk", "a", 2.0);

    clip.set_play_mode(PlayMode::Once);
    assert!(approx(clip.phase_at(1.5).unwrap(), 1.5));
    assert!(clip.phase_at(2.5).is_none());

    clip.set_play_mode(PlayMode::Stay);
    assert!(approx(clip.phase_at(2.5).unwrap(), 2.0));

    clip.set_play_mode(PlayMode::Loop);
    assert!(approx(clip.phase_at(2.5).unwrap(), 0.5));

    clip.set_play_mode(PlayMode::PingPong);
    assert!(approx(clip.phase_at(2.5).unwrap(), 1.5));
    assert!(approx(clip.phase_at(4.5).unwrap(), 0.5));
}

#[test]
fn clip_playback_duration_scales_phase() {
    let mut clip = ramp_clip("walk", "a", 2.0);
    clip.set_duration(4.0);
    clip.set_start_time(1.0);

    // Two seconds after start with a 2x slower playback: half way.
    assert!(approx(clip.phase_at(3.0).unwrap(), 1.0));
}

#[test]
fn clip_zero_length_samples_at_zero() {
    let clip = ramp_clip("pose", "a", 0.0);
    assert!(approx(clip.phase_at(12.0).unwrap(), 0.0));
}

#[test]
fn binder_skips_mismatched_tracks() {
    let clip = AnimationClip::new(
        "broken",
        vec![Track {
            meta: TrackMeta {
                node_name: "a".into(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![DVec3::ZERO, DVec3::ONE],
                InterpolationMode::Linear,
            )),
        }],
    );
    let manager = AnimationManager::new(vec![clip]);

    assert!(manager.clip(0).unwrap().bindings().is_empty());
    assert!(manager.targets().is_empty());
}

#[test]
fn track_value_count_must_match_keys() {
    let short: KeyframeTrack<f64> = KeyframeTrack::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], InterpolationMode::Linear);
    assert!(!short.is_consistent());
    assert_eq!(short.sample(1.5), None);
    assert_eq!(short.sample_with_cursor(1.5, &mut KeyframeCursor::default()), None);

    let cubic: KeyframeTrack<f64> = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0, 1.0], InterpolationMode::CubicSpline);
    assert!(!cubic.is_consistent());
    assert_eq!(cubic.sample(0.5), None);
}

#[test]
fn binder_skips_tracks_with_bad_value_count() {
    let clip = AnimationClip::new(
        "partly_broken",
        vec![
            scalar_track("a", vec![0.0, 1.0, 2.0], vec![0.0, 1.0]),
            scalar_track("b", vec![0.0, 2.0], vec![0.0, 2.0]),
        ],
    );
    let mut manager = AnimationManager::new(vec![clip]);

    let bindings = manager.clip(0).unwrap().bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].track_index, 1);
    assert_eq!(manager.targets().len(), 1);

    assert!(manager.play(0, PlayOptions::default()));
    assert!(manager.update(1.5).is_empty());
    assert!(manager.is_playing(0));
    assert!(approx(scalar(&manager, "b"), 1.5));
}

#[test]
fn target_set_iterates_in_slot_order() {
    let manager = three_clips();
    let keys: Vec<(String, TargetPath)> = manager
        .targets()
        .iter()
        .map(|(key, _)| (key.node_name.clone(), key.path))
        .collect();

    assert_eq!(
        keys,
        vec![
            ("a".to_string(), TargetPath::Scalar),
            ("b".to_string(), TargetPath::Scalar),
            ("c".to_string(), TargetPath::Scalar),
        ]
    );
}

// ============================================================================
// AnimationManager: play
// ============================================================================

#[test]
fn play_out_of_range_fails_without_side_effects() {
    let mut manager = three_clips();
    assert!(!manager.play(3, PlayOptions::default()));
    assert!(!manager.has_any_playing());
    assert_eq!(manager.end_time(3), None);
}

#[test]
fn play_without_duration_loops_forever() {
    let mut manager = three_clips();
    assert!(manager.play(0, PlayOptions::default()));

    let clip = manager.clip(0).unwrap();
    assert_eq!(clip.play_mode(), PlayMode::Loop);
    assert_eq!(manager.end_time(0), None);
    assert_eq!(manager.priority_of(0), Some(0));

    manager.update(5.5);
    assert!(manager.is_playing(0));
    assert!(approx(scalar(&manager, "a"), 1.5));
}

#[test]
fn play_with_duration_sets_end_time() {
    let mut manager = three_clips();
    manager.update(1.0);
    assert!(manager.play(0, PlayOptions::once(2.0).with_end(1.5)));

    assert_eq!(manager.clip(0).unwrap().play_mode(), PlayMode::Once);
    assert!(approx(manager.end_time(0).unwrap(), 2.5));
}

#[test]
fn play_explicit_start_resumes_at_phase() {
    let mut manager = three_clips();
    manager.update(1.0);
    manager.play(0, PlayOptions::default().with_start(0.25));

    assert!(approx(manager.clip(0).unwrap().start_time(), 0.75));
    manager.update(1.0);
    assert!(approx(scalar(&manager, "a"), 0.25));
}

#[test]
fn stop_then_play_reset_starts_at_phase_zero() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::default());
    manager.update(0.7);
    assert!(approx(scalar(&manager, "a"), 0.7));

    assert!(manager.stop(0, false));
    manager.update(1.0);
    assert!(!manager.is_playing(0));

    assert!(manager.play(0, PlayOptions::default()));
    manager.update(1.0);
    assert!(approx(scalar(&manager, "a"), 0.0));
}

#[test]
fn retrigger_at_half_end_keeps_remaining_time() {
    let mut manager = three_clips();
    let options = PlayOptions::once(2.0).with_end(2.0);
    manager.play(0, options);
    manager.update(1.0);
    let before = manager.end_time(0).unwrap();

    manager.play(0, options.resume());
    assert!(approx(manager.end_time(0).unwrap(), before));
}

#[test]
fn retrigger_mirrors_elapsed_phase_against_end() {
    let mut manager = three_clips();
    let options = PlayOptions::once(2.0).with_end(2.0);
    manager.play(0, options);
    manager.update(0.5);

    // pass_time 0.5 < end 2.0: offset = end - pass_time = 1.5
    manager.play(0, options.resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), -1.0));
    assert!(approx(manager.end_time(0).unwrap(), 1.0));
}

#[test]
fn retrigger_without_end_wraps_to_tail() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::once(2.0));
    manager.update(0.5);

    // offset = previous duration - pass_time = 1.5
    manager.play(0, PlayOptions::once(2.0).resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), -1.0));
    assert!(approx(manager.end_time(0).unwrap(), 1.0));
}

#[test]
fn retrigger_exactly_at_end_wraps_to_tail() {
    let mut manager = three_clips();
    let options = PlayOptions::once(2.0).with_end(1.0);
    manager.play(0, options);
    manager.update(1.0);
    assert!(manager.is_playing(0));

    // pass_time == end: offset = previous duration (2.0) - pass_time (1.0)
    manager.play(0, options.resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), 0.0));
    assert!(approx(manager.end_time(0).unwrap(), 1.0));
}

#[test]
fn retrigger_past_new_end_wraps_to_tail() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::once(2.0));
    manager.update(1.5);

    // pass_time 1.5 >= end 1.0: offset = 2.0 - 1.5 = 0.5
    manager.play(0, PlayOptions::once(2.0).with_end(1.0).resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), 1.0));
    assert!(approx(manager.end_time(0).unwrap(), 2.0));
}

#[test]
fn cold_resume_continues_after_previous_run() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::once(2.0));
    manager.update(0.5);
    manager.stop(0, false);
    manager.update(1.0);

    // offset = previous end (0.5) - previous start (0.0)
    manager.play(0, PlayOptions::once(2.0).resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), 0.5));
}

#[test]
fn cold_resume_without_duration_starts_fresh() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::once(2.0));
    manager.update(0.5);
    manager.stop(0, false);
    manager.update(1.0);

    manager.play(0, PlayOptions::default().resume());
    assert!(approx(manager.clip(0).unwrap().start_time(), 1.0));
}

#[test]
fn play_options_from_raw_maps_negative_to_none() {
    let options = PlayOptions::from_raw(false, -1.0, 1.5, -1.0);
    assert!(!options.reset);
    assert_eq!(options.duration, None);
    assert_eq!(options.end, Some(1.5));
    assert_eq!(options.start, None);
}

// ============================================================================
// AnimationManager: stop
// ============================================================================

#[test]
fn stop_out_of_range_fails() {
    let mut manager = three_clips();
    assert!(!manager.stop(7, true));
}

#[test]
fn stop_with_reset_returns_to_start_pose() {
    let mut manager = three_clips();
    manager.play(1, PlayOptions::default());
    manager.update(0.5);
    assert!(approx(scalar(&manager, "b"), 0.5));

    assert!(manager.stop(1, true));
    assert!(approx(scalar(&manager, "b"), 0.0));
    assert!(approx(manager.end_time(1).unwrap(), 0.5));
}

#[test]
fn stop_all_clears_layers_and_marks_every_clip() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::default());
    manager.play(1, PlayOptions::default());
    manager.update(0.25);

    assert!(manager.stop_all(false));
    assert!(!manager.has_any_playing());
    for index in 0..3 {
        assert!(approx(manager.end_time(index).unwrap(), 0.25));
    }
}

#[test]
fn stop_all_with_reset_rewinds_playing_clips_only() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::default());
    manager.play(1, PlayOptions::default());
    manager.update(0.5);

    assert!(manager.stop_all(true));
    assert!(approx(scalar(&manager, "a"), 0.0));
    assert!(approx(scalar(&manager, "b"), 0.0));

    let untouched = manager.targets().slot_of("c", TargetPath::Scalar).unwrap();
    assert_eq!(manager.targets().get(untouched).unwrap().accumulated_weight(), 0.0);
    assert!(approx(manager.end_time(2).unwrap(), 0.5));
}

#[test]
fn stop_all_reset_ignores_idle_clip_on_shared_target() {
    let mut manager = AnimationManager::new(vec![
        ramp_clip("low", "n", 1.0),
        AnimationClip::new("high", vec![scalar_track("n", vec![0.0, 1.0], vec![100.0, 101.0])]),
    ]);
    manager.play(0, PlayOptions::default());
    manager.update(0.7);
    assert!(approx(scalar(&manager, "n"), 0.7));

    assert!(manager.stop_all(true));
    assert!(approx(scalar(&manager, "n"), 0.0));
}

// ============================================================================
// AnimationManager: update
// ============================================================================

#[test]
fn three_clip_scenario_finishes_once() {
    let (tx, rx) = flume::unbounded();
    let mut manager = three_clips();
    manager.set_finished_callback(move |index| {
        tx.send(index).unwrap();
    });

    assert!(manager.play(0, PlayOptions::once(2.0).with_end(1.5)));

    assert!(manager.update(0.5).is_empty());
    assert!(manager.is_playing(0));

    let finished = manager.update(1.6);
    assert_eq!(finished.as_slice(), &[0]);
    assert!(!manager.is_playing(0));
    assert!(approx(manager.end_time(0).unwrap(), 1.6));

    assert!(manager.update(1.7).is_empty());
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn cleared_callback_is_not_invoked() {
    let (tx, rx) = flume::unbounded();
    let mut manager = three_clips();
    manager.set_finished_callback(move |index| {
        tx.send(index).unwrap();
    });
    manager.clear_finished_callback();

    manager.play(0, PlayOptions::once(1.0));
    assert_eq!(manager.update(2.0).as_slice(), &[0]);
    assert!(rx.try_recv().is_err());
}

#[test]
fn once_clip_exhaustion_lands_on_last_pose() {
    let mut manager = three_clips();
    manager.play(2, PlayOptions::once(2.0).with_end(10.0));

    let finished = manager.update(2.5);
    assert_eq!(finished.as_slice(), &[2]);
    assert!(approx(scalar(&manager, "c"), 2.0));
}

#[test]
fn finished_order_follows_descending_priority() {
    let mut manager = three_clips();
    manager.play(0, PlayOptions::once(1.0));
    manager.play(1, PlayOptions::once(1.0));
    manager.play_layered(1, 5, 1.0);

    let finished = manager.update(3.0);
    assert_eq!(finished.as_slice(), &[1, 0]);
    assert!(!manager.has_any_playing());
}

#[test]
fn higher_layer_wins_shared_target() {
    let mut manager = AnimationManager::new(vec![
        constant_clip("base", "arm", 20.0),
        constant_clip("overlay", "arm", 10.0),
    ]);
    manager.play_layered(0, 0, 1.0);
    manager.play_layered(1, 1, 1.0);
    manager.update(0.1);
    assert!(approx(scalar(&manager, "arm"), 10.0));

    manager.play_layered(1, 1, 0.5);
    manager.update(0.2);
    assert!(approx(scalar(&manager, "arm"), 15.0));
}

#[test]
fn clip_lookup_by_name() {
    let manager = AnimationManager::new(vec![
        ramp_clip("walk", "a", 1.0),
        ramp_clip("run", "a", 1.0),
        ramp_clip("walk", "b", 1.0),
    ]);

    assert_eq!(manager.index_of("run"), Some(1));
    assert_eq!(manager.index_of("walk"), Some(0));
    assert_eq!(manager.index_of("jump"), None);
    assert_eq!(manager.clip_names(), vec!["walk", "run", "walk"]);
}
