use glam::DMat4;

use crate::camera::HomePose;

/// Load status of the stage content.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    /// `Ready` and `Failed` end a load run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Notifications published by [`Stage`](crate::stage::Stage).
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// A clip finished on its own or reached its end time.
    ClipFinished(usize),
    ClipStatusChanged { index: usize, running: bool },
    /// The clip list was replaced by a load.
    AnimationListChanged(Vec<String>),
    FlyFinished(usize),
    FlyIndexChanged(Option<usize>),
    LoadStateChanged(LoadStatus),
    HomePoseChanged(HomePose),
    RootTransformChanged(DMat4),
}
