//! Writes composited frames into the host's live poses.
//!
//! The host's render path asks for each skeletal node in turn; every node of
//! a target's frame is applied at most once per registration, so a node drawn
//! twice in one tick (e.g. shadow and main pass) is not offset twice.

use hashbrown::{HashMap, HashSet};

use crate::frame::AnimationFrame;
use crate::ids::AnimationTarget;
use crate::pose::PoseSink;

pub trait Applier {
    /// Forget every registered frame.
    fn clear(&mut self);

    /// Forget the frame registered for `target`.
    fn remove_target(&mut self, target: AnimationTarget);

    /// Register this tick's composite for `target`, replacing any earlier one.
    fn add_animation(&mut self, target: AnimationTarget, frame: AnimationFrame);

    /// Write the node's elements into `pose`. Returns false if there is
    /// nothing to apply or the node was already applied.
    fn apply_animation(
        &mut self,
        target: AnimationTarget,
        node: u32,
        pose: &mut dyn PoseSink,
        pose_weight: f32,
    ) -> bool;

    /// Add the node's averaging weight to `weight` if it is still unapplied.
    fn calculate_weight(&self, target: AnimationTarget, node: u32, weight: &mut f32);
}

#[derive(Clone, Debug)]
struct Entry {
    frame: AnimationFrame,
    unapplied: HashSet<u32>,
}

/// Default [`Applier`]: one frame per target plus the set of its nodes not
/// yet written this tick.
#[derive(Clone, Debug, Default)]
pub struct PoseApplier {
    entries: HashMap<AnimationTarget, Entry>,
}

impl PoseApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn frame(&self, target: AnimationTarget) -> Option<&AnimationFrame> {
        self.entries.get(&target).map(|entry| &entry.frame)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Applier for PoseApplier {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn remove_target(&mut self, target: AnimationTarget) {
        self.entries.remove(&target);
    }

    fn add_animation(&mut self, target: AnimationTarget, frame: AnimationFrame) {
        let unapplied = frame.nodes().into_iter().collect();
        self.entries.insert(target, Entry { frame, unapplied });
    }

    fn apply_animation(
        &mut self,
        target: AnimationTarget,
        node: u32,
        pose: &mut dyn PoseSink,
        pose_weight: f32,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&target) else {
            return false;
        };
        if !entry.unapplied.remove(&node) {
            return false;
        }
        entry.frame.apply(pose, pose_weight, node);
        true
    }

    fn calculate_weight(&self, target: AnimationTarget, node: u32, weight: &mut f32) {
        let Some(entry) = self.entries.get(&target) else {
            return;
        };
        if !entry.unapplied.contains(&node) {
            return;
        }
        if let Some(w) = entry.frame.weight(node) {
            *weight += w;
        }
    }
}
