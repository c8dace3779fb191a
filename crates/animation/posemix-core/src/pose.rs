//! Host pose sink contract and a plain per-node pose.

use serde::{Deserialize, Serialize};

use crate::element::ElementChannel;

/// Live, mutable per-node pose owned by the host. Composited frames are
/// written into it through [`crate::frame::AnimationFrame::apply`].
pub trait PoseSink {
    /// `+=` write on one channel.
    fn add(&mut self, channel: ElementChannel, value: f32);

    /// Weighted-average write: the current channel value counts with
    /// `pose_weight`, the incoming one with `element_weight`.
    fn average(&mut self, channel: ElementChannel, value: f32, element_weight: f32, pose_weight: f32);
}

/// Translation and rotation (degrees) of one skeletal node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPose {
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
}

impl ElementPose {
    pub fn get(&self, channel: ElementChannel) -> f32 {
        let i = channel.index();
        if i < 3 {
            self.translation[i]
        } else {
            self.rotation[i - 3]
        }
    }

    fn slot_mut(&mut self, channel: ElementChannel) -> &mut f32 {
        let i = channel.index();
        if i < 3 {
            &mut self.translation[i]
        } else {
            &mut self.rotation[i - 3]
        }
    }
}

impl PoseSink for ElementPose {
    fn add(&mut self, channel: ElementChannel, value: f32) {
        *self.slot_mut(channel) += value;
    }

    fn average(&mut self, channel: ElementChannel, value: f32, element_weight: f32, pose_weight: f32) {
        let total = element_weight + pose_weight;
        if total <= 0.0 {
            return;
        }
        let slot = self.slot_mut(channel);
        *slot = (*slot * pose_weight + value * element_weight) / total;
    }
}
