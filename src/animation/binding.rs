/// Property of a scene node driven by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    /// Free-standing number such as a morph weight or an opacity.
    Scalar,
}

/// Track `track_index` of a clip writes into target `slot` of the
/// [`TargetSet`](crate::animation::TargetSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub slot: usize,
}
