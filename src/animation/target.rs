//! Blend targets.
//!
//! Every animated property owns one [`AnimationTarget`]. Each frame the
//! scheduler resets all targets, then every playing clip blends its sampled
//! value in with `(weight, priority)`. Higher priorities are evaluated first;
//! once a priority is done its accumulated weight is "consumed", so lower
//! layers only fill in whatever influence the higher ones left over.

use glam::{DQuat, DVec3};
use rustc_hash::FxHashMap;

use crate::animation::binding::TargetPath;
use crate::animation::values::Interpolatable;

/// A blended property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetValue {
    Vector3(DVec3),
    Quaternion(DQuat),
    Scalar(f64),
}

impl TargetValue {
    /// Neutral value for a property path.
    #[must_use]
    pub fn identity(path: TargetPath) -> Self {
        match path {
            TargetPath::Translation => Self::Vector3(DVec3::ZERO),
            TargetPath::Scale => Self::Vector3(DVec3::ONE),
            TargetPath::Rotation => Self::Quaternion(DQuat::IDENTITY),
            TargetPath::Scalar => Self::Scalar(0.0),
        }
    }

    fn lerp(self, other: Self, t: f64) -> Option<Self> {
        match (self, other) {
            (Self::Vector3(a), Self::Vector3(b)) => Some(Self::Vector3(DVec3::interpolate_linear(a, b, t))),
            (Self::Quaternion(a), Self::Quaternion(b)) => {
                Some(Self::Quaternion(DQuat::interpolate_linear(a, b, t)))
            }
            (Self::Scalar(a), Self::Scalar(b)) => Some(Self::Scalar(f64::interpolate_linear(a, b, t))),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec3(&self) -> Option<DVec3> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_quat(&self) -> Option<DQuat> {
        match self {
            Self::Quaternion(q) => Some(*q),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }
}

/// Per-property blend accumulator.
#[derive(Debug, Clone)]
pub struct AnimationTarget {
    value: TargetValue,
    /// Weight consumed by already finished priorities this frame.
    weight: f64,
    /// Weight accumulated inside the current priority.
    priority_weight: f64,
    last_priority: i32,
}

impl AnimationTarget {
    #[must_use]
    pub fn new(value: TargetValue) -> Self {
        Self {
            value,
            weight: 0.0,
            priority_weight: 0.0,
            last_priority: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> TargetValue {
        self.value
    }

    /// Total influence blended in so far this frame.
    #[must_use]
    pub fn accumulated_weight(&self) -> f64 {
        self.weight + self.priority_weight * (1.0 - self.weight)
    }

    /// Clears the per-frame accumulation. The last value is kept.
    pub fn reset(&mut self) {
        self.weight = 0.0;
        self.priority_weight = 0.0;
    }

    /// Blends `value` in. Returns `false` if the value kind does not match.
    pub fn blend(&mut self, weight: f64, value: TargetValue, priority: i32) -> bool {
        if std::mem::discriminant(&self.value) != std::mem::discriminant(&value) {
            return false;
        }

        if self.weight == 0.0 && self.priority_weight == 0.0 {
            self.priority_weight = weight;
            self.last_priority = priority;
            self.value = value;
            return true;
        }

        if self.last_priority != priority {
            // Fold the finished priority into the consumed weight.
            self.weight += self.priority_weight * (1.0 - self.weight);
            self.priority_weight = 0.0;
            self.last_priority = priority;
        }

        self.priority_weight += weight;
        if self.priority_weight <= 0.0 {
            return true;
        }
        let t = (1.0 - self.weight) * weight / self.priority_weight;
        if let Some(blended) = self.value.lerp(value, t) {
            self.value = blended;
        }
        true
    }
}

/// Identifies an animated property by node name and path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub node_name: String,
    pub path: TargetPath,
}

/// Stable slot storage for every target the loaded clips write to.
#[derive(Debug, Default)]
pub struct TargetSet {
    slots: Vec<AnimationTarget>,
    keys: Vec<TargetKey>,
    lookup: FxHashMap<TargetKey, usize>,
}

impl TargetSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `key`, creating it with the path's identity value.
    pub fn get_or_insert(&mut self, key: TargetKey) -> usize {
        if let Some(&slot) = self.lookup.get(&key) {
            return slot;
        }
        let slot = self.slots.len();
        self.slots.push(AnimationTarget::new(TargetValue::identity(key.path)));
        self.keys.push(key.clone());
        self.lookup.insert(key, slot);
        slot
    }

    #[must_use]
    pub fn slot_of(&self, node_name: &str, path: TargetPath) -> Option<usize> {
        self.lookup
            .get(&TargetKey {
                node_name: node_name.to_string(),
                path,
            })
            .copied()
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&AnimationTarget> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut AnimationTarget> {
        self.slots.get_mut(slot)
    }

    /// Current blended value of a property.
    #[must_use]
    pub fn value(&self, node_name: &str, path: TargetPath) -> Option<TargetValue> {
        self.slot_of(node_name, path)
            .and_then(|slot| self.slots.get(slot))
            .map(AnimationTarget::value)
    }

    pub fn reset_all(&mut self) {
        for target in &mut self.slots {
            target.reset();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TargetKey, &AnimationTarget)> {
        self.keys.iter().zip(self.slots.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
