//! Animatable channels of skeletal nodes.

use serde::{Deserialize, Serialize};

use crate::ids::name_hash;
use crate::value::{WeightedValue, DEFAULT_PERIOD};

/// One of the six transform channels a node exposes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementChannel {
    TranslateX,
    TranslateY,
    TranslateZ,
    /// Degrees.
    RotateX,
    RotateY,
    RotateZ,
}

impl ElementChannel {
    pub const ALL: [ElementChannel; 6] = [
        ElementChannel::TranslateX,
        ElementChannel::TranslateY,
        ElementChannel::TranslateZ,
        ElementChannel::RotateX,
        ElementChannel::RotateY,
        ElementChannel::RotateZ,
    ];

    #[inline]
    pub fn is_rotation(self) -> bool {
        matches!(
            self,
            ElementChannel::RotateX | ElementChannel::RotateY | ElementChannel::RotateZ
        )
    }

    /// Index into a `[translate xyz, rotate xyz]` array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Identifies one channel of one node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId {
    /// FNV-1a hash of the node name.
    pub node: u32,
    pub channel: ElementChannel,
}

impl ElementId {
    #[inline]
    pub const fn new(node: u32, channel: ElementChannel) -> Self {
        Self { node, channel }
    }

    #[inline]
    pub fn from_name(node: &str, channel: ElementChannel) -> Self {
        Self::new(name_hash(node), channel)
    }
}

/// A channel together with its (optional) sample at some instant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationElement {
    pub id: ElementId,
    pub value: Option<WeightedValue>,
    /// Interpolate along the shorter arc when lerping.
    pub shortest_angular_distance: bool,
}

impl AnimationElement {
    pub fn new(id: ElementId, value: Option<WeightedValue>, shortest_angular_distance: bool) -> Self {
        Self {
            id,
            value,
            shortest_angular_distance,
        }
    }

    /// Element with no contribution.
    pub fn empty(id: ElementId) -> Self {
        Self::new(id, None, false)
    }

    #[inline]
    fn check_ids(a: &Self, b: &Self) {
        assert_eq!(a.id, b.id, "animation element ids must match");
    }

    pub fn sum(a: &Self, b: &Self) -> Self {
        Self::check_ids(a, b);
        Self::new(
            a.id,
            WeightedValue::sum(a.value, b.value),
            a.shortest_angular_distance || b.shortest_angular_distance,
        )
    }

    pub fn average(a: &Self, b: &Self) -> Self {
        Self::check_ids(a, b);
        Self::new(
            a.id,
            WeightedValue::average(a.value, b.value),
            a.shortest_angular_distance || b.shortest_angular_distance,
        )
    }

    /// Additive combination that keeps `self`'s weight: `other`'s value is
    /// added but it casts no vote in later averaging. An empty `self` takes
    /// `default_weight`.
    pub fn add_value(&self, other: Option<WeightedValue>, default_weight: f32) -> Self {
        let value = match (self.value, other) {
            (Some(own), Some(other)) => Some(WeightedValue::new(own.value + other.value, own.weight)),
            (None, Some(other)) => Some(WeightedValue::new(other.value, default_weight)),
            (own, None) => own,
        };
        Self::new(self.id, value, self.shortest_angular_distance)
    }

    /// Interpolate towards `to`, using the shorter arc when either side asks for it.
    pub fn lerp(from: &Self, to: &Self, progress: f32, weighted: bool) -> Self {
        Self::check_ids(from, to);
        let shortest = from.shortest_angular_distance || to.shortest_angular_distance;
        let value = if shortest {
            WeightedValue::circular_lerp(from.value, to.value, progress, weighted, DEFAULT_PERIOD)
        } else {
            WeightedValue::lerp(from.value, to.value, progress, weighted)
        };
        Self::new(from.id, value, shortest)
    }

    /// Interpolation used when filling keyframe holes: rotation channels travel
    /// the shorter arc, translation channels are linear.
    pub fn circular_lerp(from: &Self, to: &Self, progress: f32) -> Self {
        Self::check_ids(from, to);
        let value = if from.id.channel.is_rotation() {
            WeightedValue::circular_lerp(from.value, to.value, progress, true, DEFAULT_PERIOD)
        } else {
            WeightedValue::lerp(from.value, to.value, progress, true)
        };
        Self::new(
            from.id,
            value,
            from.shortest_angular_distance || to.shortest_angular_distance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(channel: ElementChannel, value: f32) -> AnimationElement {
        AnimationElement::new(
            ElementId::from_name("arm", channel),
            Some(WeightedValue::new(value, 1.0)),
            false,
        )
    }

    #[test]
    fn add_value_keeps_own_weight() {
        let base = element(ElementChannel::TranslateY, 2.0);
        let added = base.add_value(Some(WeightedValue::new(3.0, 5.0)), 0.5);
        assert_eq!(added.value, Some(WeightedValue::new(5.0, 1.0)));

        let empty = AnimationElement::empty(base.id);
        let added = empty.add_value(Some(WeightedValue::new(3.0, 5.0)), 0.5);
        assert_eq!(added.value, Some(WeightedValue::new(3.0, 0.5)));
    }

    #[test]
    fn lerp_honours_shortest_flag() {
        let mut a = element(ElementChannel::RotateY, 340.0);
        let b = element(ElementChannel::RotateY, 20.0);
        let linear = AnimationElement::lerp(&a, &b, 0.5, true);
        assert_eq!(linear.value.unwrap().value, 180.0);

        a.shortest_angular_distance = true;
        let short = AnimationElement::lerp(&a, &b, 0.5, true);
        assert!(short.value.unwrap().value.abs() < 1e-4);
        assert!(short.shortest_angular_distance);
    }

    #[test]
    fn hole_fill_lerp_is_channel_aware() {
        let a = element(ElementChannel::RotateX, 350.0);
        let b = element(ElementChannel::RotateX, 10.0);
        assert!(AnimationElement::circular_lerp(&a, &b, 0.5).value.unwrap().value.abs() < 1e-4);

        let a = element(ElementChannel::TranslateX, 350.0);
        let b = element(ElementChannel::TranslateX, 10.0);
        assert_eq!(AnimationElement::circular_lerp(&a, &b, 0.5).value.unwrap().value, 180.0);
    }

    #[test]
    #[should_panic(expected = "animation element ids must match")]
    fn mismatched_ids_fail_fast() {
        let a = element(ElementChannel::RotateX, 0.0);
        let b = element(ElementChannel::RotateY, 0.0);
        let _ = AnimationElement::sum(&a, &b);
    }
}
