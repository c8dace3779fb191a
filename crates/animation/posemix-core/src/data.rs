//! Raw animation data supplied by the host: sparse keyframes of per-node
//! transform offsets plus per-node weight / blend-mode overrides.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::element::ElementChannel;
use crate::error::{AnimationError, Result};
use crate::frame::BlendMode;

/// Offsets and rotations (degrees) of one node in one keyframe. Absent
/// channels are not animated by this keyframe.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransform {
    #[serde(default)]
    pub offset_x: Option<f32>,
    #[serde(default)]
    pub offset_y: Option<f32>,
    #[serde(default)]
    pub offset_z: Option<f32>,
    #[serde(default)]
    pub rotation_x: Option<f32>,
    #[serde(default)]
    pub rotation_y: Option<f32>,
    #[serde(default)]
    pub rotation_z: Option<f32>,
    #[serde(default)]
    pub rot_shortest_distance_x: bool,
    #[serde(default)]
    pub rot_shortest_distance_y: bool,
    #[serde(default)]
    pub rot_shortest_distance_z: bool,
}

impl NodeTransform {
    pub fn channel(&self, channel: ElementChannel) -> Option<f32> {
        match channel {
            ElementChannel::TranslateX => self.offset_x,
            ElementChannel::TranslateY => self.offset_y,
            ElementChannel::TranslateZ => self.offset_z,
            ElementChannel::RotateX => self.rotation_x,
            ElementChannel::RotateY => self.rotation_y,
            ElementChannel::RotateZ => self.rotation_z,
        }
    }

    pub fn set_channel(&mut self, channel: ElementChannel, value: f32) {
        let slot = match channel {
            ElementChannel::TranslateX => &mut self.offset_x,
            ElementChannel::TranslateY => &mut self.offset_y,
            ElementChannel::TranslateZ => &mut self.offset_z,
            ElementChannel::RotateX => &mut self.rotation_x,
            ElementChannel::RotateY => &mut self.rotation_y,
            ElementChannel::RotateZ => &mut self.rotation_z,
        };
        *slot = Some(value);
    }

    /// Shortest-arc flag; translation channels never wrap.
    pub fn shortest_distance(&self, channel: ElementChannel) -> bool {
        match channel {
            ElementChannel::RotateX => self.rot_shortest_distance_x,
            ElementChannel::RotateY => self.rot_shortest_distance_y,
            ElementChannel::RotateZ => self.rot_shortest_distance_z,
            _ => false,
        }
    }
}

/// One keyframe at an integer timeline position.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawKeyframe {
    pub frame: u32,
    /// Node name -> transform. Insertion order is kept so every peer builds
    /// identical frames.
    #[serde(default)]
    pub elements: IndexMap<String, NodeTransform>,
}

impl RawKeyframe {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            elements: IndexMap::new(),
        }
    }

    /// Builder helper: set one channel of one node.
    pub fn with(mut self, node: &str, channel: ElementChannel, value: f32) -> Self {
        self.elements
            .entry(node.to_string())
            .or_default()
            .set_channel(channel, value);
        self
    }
}

/// Complete raw definition of one animation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimationData {
    /// Animation code (hashed into `AnimationId::animation`).
    pub code: String,
    pub total_frames: f32,
    #[serde(default)]
    pub cyclic: bool,
    pub keyframes: Vec<RawKeyframe>,
    /// Per-node weight overrides.
    #[serde(default)]
    pub element_weights: HashMap<String, f32>,
    /// Per-node blend mode overrides.
    #[serde(default)]
    pub element_blend_modes: HashMap<String, BlendMode>,
}

impl AnimationData {
    pub fn new(code: &str, total_frames: f32, cyclic: bool, keyframes: Vec<RawKeyframe>) -> Self {
        Self {
            code: code.to_string(),
            total_frames,
            cyclic,
            keyframes,
            element_weights: HashMap::new(),
            element_blend_modes: HashMap::new(),
        }
    }

    /// Validate basic invariants: positive finite length, at least one
    /// keyframe, positions inside the timeline and unique.
    pub fn validate_basic(&self) -> Result<()> {
        let invalid = |reason: String| AnimationError::InvalidData {
            name: self.code.clone(),
            reason,
        };
        if !self.total_frames.is_finite() || self.total_frames < 1.0 {
            return Err(invalid(format!(
                "total frames must be >= 1, got {}",
                self.total_frames
            )));
        }
        if self.keyframes.is_empty() {
            return Err(invalid("at least one keyframe is required".into()));
        }
        let mut seen: Vec<u32> = Vec::with_capacity(self.keyframes.len());
        for keyframe in &self.keyframes {
            if keyframe.frame as f32 > self.total_frames {
                return Err(invalid(format!(
                    "keyframe at {} lies past the end ({})",
                    keyframe.frame, self.total_frames
                )));
            }
            if seen.contains(&keyframe.frame) {
                return Err(invalid(format!("duplicate keyframe at {}", keyframe.frame)));
            }
            seen.push(keyframe.frame);
        }
        for (node, weight) in &self.element_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(invalid(format!("weight for '{node}' must be finite and >= 0")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframe_builder_sets_channels() {
        let k = RawKeyframe::new(4)
            .with("hand", ElementChannel::RotateZ, 90.0)
            .with("hand", ElementChannel::TranslateX, 0.5);
        let t = &k.elements["hand"];
        assert_eq!(t.channel(ElementChannel::RotateZ), Some(90.0));
        assert_eq!(t.channel(ElementChannel::TranslateX), Some(0.5));
        assert_eq!(t.channel(ElementChannel::RotateX), None);
    }

    #[test]
    fn validation_rejects_bad_timelines() {
        let ok = AnimationData::new("a", 10.0, false, vec![RawKeyframe::new(0)]);
        assert!(ok.validate_basic().is_ok());

        let empty = AnimationData::new("a", 10.0, false, vec![]);
        assert!(empty.validate_basic().is_err());

        let past_end = AnimationData::new("a", 10.0, false, vec![RawKeyframe::new(11)]);
        assert!(past_end.validate_basic().is_err());

        let dup = AnimationData::new("a", 10.0, false, vec![RawKeyframe::new(2), RawKeyframe::new(2)]);
        assert!(matches!(dup.validate_basic(), Err(AnimationError::InvalidData { .. })));
    }
}
