#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod camera;
pub mod errors;
pub mod settings;
pub mod stage;

pub use animation::{AnimationClip, AnimationManager, PlayMode, PlayOptions};
pub use assets::{Aabb, LoadedScene, SceneSource};
pub use camera::{CameraEvent, CameraLimits, FlyPath, FlyPathDesc, HomePose, OrbitManipulator};
pub use errors::{Result, StageError};
pub use settings::{CameraSettings, ScaleFactors, StageSettings};
pub use stage::{Decoration, FrameOutput, LoadStatus, RootTransform, Stage, StageEvent, StageMetrics};
