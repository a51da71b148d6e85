use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::target::{TargetKey, TargetSet};

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` to a target slot, creating slots on
    /// demand. Tracks whose value kind does not fit the target path, or whose
    /// value count does not match their keys, are skipped.
    pub fn bind(clip: &AnimationClip, targets: &mut TargetSet) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_idx, track) in clip.tracks.iter().enumerate() {
            let path = track.meta.target;
            if !accepts(&track.data, path) {
                log::warn!(
                    "Clip '{}': track {} on node '{}' cannot drive {:?}, skipped",
                    clip.name,
                    track_idx,
                    track.meta.node_name,
                    path
                );
                continue;
            }
            if !track.data.is_consistent() {
                log::warn!(
                    "Clip '{}': track {} on node '{}' has a value count that does not match its keys, skipped",
                    clip.name,
                    track_idx,
                    track.meta.node_name
                );
                continue;
            }

            let slot = targets.get_or_insert(TargetKey {
                node_name: track.meta.node_name.clone(),
                path,
            });
            bindings.push(PropertyBinding {
                track_index: track_idx,
                slot,
            });
        }

        bindings
    }
}

fn accepts(data: &TrackData, path: TargetPath) -> bool {
    matches!(
        (data, path),
        (TrackData::Vector3(_), TargetPath::Translation | TargetPath::Scale)
            | (TrackData::Quaternion(_), TargetPath::Rotation)
            | (TrackData::Scalar(_), TargetPath::Scalar)
    )
}
