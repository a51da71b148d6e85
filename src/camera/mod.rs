//! Camera state machine: an orbit camera with limit clamping that can be
//! handed over to deterministic fly paths.

pub mod event;
pub mod fly;
pub mod manipulator;
pub mod pose;

pub use event::{CameraEvent, ScrollDirection};
pub use fly::{ControlPoint, ControlPointDesc, FlyLoopMode, FlyPath, FlyPathDesc};
pub use manipulator::{FlyCursor, FlyFinishedCallback, OrbitManipulator};
pub use pose::{CameraLimits, HomePose, OrbitPose};
