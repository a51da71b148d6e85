mod values;
pub mod tracks;
pub mod clip;
pub mod binding;
pub mod binder;
pub mod target;
pub mod manager;

pub use clip::{AnimationClip, PlayMode, Track, TrackData, TrackMeta};
pub use manager::{AnimationManager, FinishedCallback, FinishedClips, PlayOptions};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use target::{AnimationTarget, TargetKey, TargetSet, TargetValue};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
