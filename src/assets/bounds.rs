use glam::{DMat4, DVec3};

/// Axis-aligned bounding box. The default box is empty and invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for point in points {
            aabb.expand(point);
        }
        aabb
    }

    pub fn expand(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `true` once at least one point was added and all bounds are finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis: `(length, width, height)`.
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Bounds of the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &DMat4) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let corners = [
            DVec3::new(self.min.x, self.min.y, self.min.z),
            DVec3::new(self.min.x, self.min.y, self.max.z),
            DVec3::new(self.min.x, self.max.y, self.min.z),
            DVec3::new(self.min.x, self.max.y, self.max.z),
            DVec3::new(self.max.x, self.min.y, self.min.z),
            DVec3::new(self.max.x, self.min.y, self.max.z),
            DVec3::new(self.max.x, self.max.y, self.min.z),
            DVec3::new(self.max.x, self.max.y, self.max.z),
        ];
        Self::from_points(corners.into_iter().map(|c| matrix.transform_point3(c)))
    }
}
