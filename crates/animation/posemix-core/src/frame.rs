//! One instant of pose data for one category: a sparse map from channel to
//! element plus the blend mode used when compositing it.
//!
//! Frames are owned and mutated in place by whoever holds them. Anything that
//! hands a frame to a second consumer clones it first.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::data::{AnimationData, RawKeyframe};
use crate::element::{AnimationElement, ElementChannel, ElementId};
use crate::ids::{name_hash, Category};
use crate::pose::PoseSink;
use crate::value::WeightedValue;

/// How an element is merged into the composite pose.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Deltas accumulate unconditionally.
    Add,
    /// Weighted mean with the other sources on the channel.
    #[default]
    Average,
    /// Values and weights are summed; averaged against the host pose on apply.
    AddAverage,
}

impl BlendMode {
    /// Whether interpolation should scale the element weight along with the value.
    #[inline]
    pub fn interpolates_weight(self) -> bool {
        self != BlendMode::Add
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    elements: IndexMap<ElementId, (AnimationElement, BlendMode)>,
    pub default_blend_mode: BlendMode,
    pub default_element_weight: f32,
}

impl Default for AnimationFrame {
    fn default() -> Self {
        Self::new(BlendMode::default(), 1.0)
    }
}

impl AnimationFrame {
    pub fn new(default_blend_mode: BlendMode, default_element_weight: f32) -> Self {
        Self {
            elements: IndexMap::new(),
            default_blend_mode,
            default_element_weight,
        }
    }

    /// Empty frame carrying a category's defaults.
    pub fn for_category(category: &Category) -> Self {
        Self::new(category.blend_mode, category.default_weight())
    }

    /// Build a frame from one raw keyframe. Per-node weight and blend mode
    /// overrides from `data` win over the category defaults.
    pub fn from_keyframe(keyframe: &RawKeyframe, data: &AnimationData, category: &Category) -> Self {
        let mut frame = Self::for_category(category);
        for (node, transform) in &keyframe.elements {
            let node_hash = name_hash(node);
            let weight = data
                .element_weights
                .get(node)
                .copied()
                .unwrap_or(frame.default_element_weight);
            let mode = data
                .element_blend_modes
                .get(node)
                .copied()
                .unwrap_or(frame.default_blend_mode);
            for channel in ElementChannel::ALL {
                if let Some(value) = transform.channel(channel) {
                    frame.insert(
                        AnimationElement::new(
                            ElementId::new(node_hash, channel),
                            Some(WeightedValue::new(value, weight)),
                            transform.shortest_distance(channel),
                        ),
                        mode,
                    );
                }
            }
        }
        frame
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: &ElementId) -> Option<&AnimationElement> {
        self.elements.get(id).map(|(element, _)| element)
    }

    pub fn blend_mode(&self, id: &ElementId) -> Option<BlendMode> {
        self.elements.get(id).map(|(_, mode)| *mode)
    }

    /// Shorthand for the sampled value of a channel.
    pub fn value(&self, id: &ElementId) -> Option<WeightedValue> {
        self.get(id).and_then(|element| element.value)
    }

    /// Insert or replace an element; the key is always the element's own id.
    pub fn insert(&mut self, element: AnimationElement, mode: BlendMode) {
        self.elements.insert(element.id, (element, mode));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnimationElement, BlendMode)> {
        self.elements.values().map(|(element, mode)| (element, *mode))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.elements.keys()
    }

    /// Distinct node hashes in first-seen order.
    pub fn nodes(&self) -> Vec<u32> {
        let nodes: IndexSet<u32> = self.elements.keys().map(|id| id.node).collect();
        nodes.into_iter().collect()
    }

    /// Merge two elements of the same channel under `mode`.
    ///
    /// `Add` keeps `to`'s weight and only adds `from`'s value, so additive
    /// layers never cast votes in later averaging.
    pub fn combine_elements(
        from: &AnimationElement,
        to: &AnimationElement,
        mode: BlendMode,
        default_weight: f32,
    ) -> AnimationElement {
        match mode {
            BlendMode::Add => to.add_value(from.value, default_weight),
            BlendMode::Average => AnimationElement::average(from, to),
            BlendMode::AddAverage => AnimationElement::sum(from, to),
        }
    }

    /// Composite this frame onto `target`. Channels missing from `target` are
    /// blended against an empty element.
    pub fn blend_into(&self, target: &mut AnimationFrame) {
        for (id, (element, mode)) in &self.elements {
            let existing = target
                .elements
                .get(id)
                .map(|(existing, _)| *existing)
                .unwrap_or_else(|| AnimationElement::empty(*id));
            let combined =
                Self::combine_elements(element, &existing, *mode, self.default_element_weight);
            target.elements.insert(*id, (combined, *mode));
        }
    }

    /// Interpolate from `self` towards `target`, writing the result into
    /// `target`. Channels present on one side only fade in or out.
    pub fn lerp_into(&self, target: &mut AnimationFrame, progress: f32) {
        for (id, (element, mode)) in target.elements.iter_mut() {
            if !self.elements.contains_key(id) {
                *element = AnimationElement::lerp(
                    &AnimationElement::empty(*id),
                    element,
                    progress,
                    mode.interpolates_weight(),
                );
            }
        }
        for (id, (element, mode)) in &self.elements {
            let weighted = mode.interpolates_weight();
            match target.elements.get_mut(id) {
                Some((existing, _)) => {
                    *existing = AnimationElement::lerp(element, existing, progress, weighted);
                }
                None => {
                    let faded =
                        AnimationElement::lerp(element, &AnimationElement::empty(*id), progress, weighted);
                    target.elements.insert(*id, (faded, *mode));
                }
            }
        }
    }

    /// Write every element of `node` into the host pose. Additive elements are
    /// added; averaging elements are averaged against `pose_weight`.
    ///
    /// `pose_weight` is read, never updated. Callers layering several frames on
    /// one pose own the weight accumulation (see [`AnimationFrame::weight`]).
    pub fn apply(&self, pose: &mut dyn PoseSink, pose_weight: f32, node: u32) {
        for (element, mode) in self.elements.values() {
            if element.id.node != node {
                continue;
            }
            let Some(value) = element.value else {
                continue;
            };
            match mode {
                BlendMode::Add => pose.add(element.id.channel, value.value),
                BlendMode::Average | BlendMode::AddAverage => {
                    pose.average(element.id.channel, value.value, value.weight, pose_weight)
                }
            }
        }
    }

    /// Mean weight of the averaging elements of `node`, if it has any.
    pub fn weight(&self, node: u32) -> Option<f32> {
        let mut total = 0.0;
        let mut count = 0usize;
        for (element, mode) in self.elements.values() {
            if element.id.node != node || *mode == BlendMode::Add {
                continue;
            }
            if let Some(value) = element.value {
                total += value.weight;
                count += 1;
            }
        }
        (count > 0).then(|| total / count as f32)
    }
}
