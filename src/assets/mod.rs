//! Asynchronous scene loading: bounds, scene sources and the background
//! load pipeline.

pub mod bounds;
pub mod pipeline;
pub mod source;

pub use bounds::Aabb;
pub use pipeline::{CancelToken, LoadPipeline};
pub use source::{FileSceneSource, LoadedScene, SceneSource};
