//! Per-target multiplexer: one animator per category, composited into a
//! single frame each tick.
//!
//! Slots are kept in insertion order so every peer composites categories in
//! the same sequence. Run ownership is reported back through
//! [`CompletionHandler`] instead of stored callbacks, which lets the owner
//! start follow-up legs after `compose` returns.

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::animation::Animation;
use crate::animator::{Animator, AnimatorStatus};
use crate::error::Result;
use crate::frame::AnimationFrame;
use crate::ids::{AnimationId, RunId};
use crate::request::{AnimationAction, AnimationRequest};

/// Receives the end of a run's ownership of a category slot.
pub trait CompletionHandler {
    /// `complete` is false when the run was preempted by another run on the
    /// same category. Return true to release a `Finished` animator.
    fn on_complete(&mut self, run: RunId, complete: bool) -> bool;
}

impl<F> CompletionHandler for F
where
    F: FnMut(RunId, bool) -> bool,
{
    fn on_complete(&mut self, run: RunId, complete: bool) -> bool {
        self(run, complete)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    animator: Animator,
    pending: Option<RunId>,
    enabled: bool,
}

/// Introspection view of one category slot.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatorSnapshot {
    pub category: u32,
    pub animation: Option<AnimationId>,
    pub action: AnimationAction,
    pub progress: f32,
    pub status: AnimatorStatus,
    pub enabled: bool,
    pub pending: Option<RunId>,
}

#[derive(Clone, Debug, Default)]
pub struct Composer {
    slots: IndexMap<u32, Slot>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `request` on its category for `run_id`.
    ///
    /// Returns `Ok(false)` for a `Stop` on a category with no animator, which
    /// does nothing. A run still pending on the slot is told it was preempted
    /// once the new leg has started.
    pub fn run(
        &mut self,
        run_id: RunId,
        request: &AnimationRequest,
        animation: Arc<Animation>,
        handler: &mut dyn CompletionHandler,
    ) -> Result<bool> {
        let category = request.animation.category.hash;
        let previous = match self.slots.get_mut(&category) {
            Some(slot) => {
                slot.animator.run(request.parameters, animation)?;
                slot.pending.replace(run_id)
            }
            None if request.parameters.action == AnimationAction::Stop => {
                debug!("stop on idle category {category:08x} ignored");
                return Ok(false);
            }
            None => {
                let mut animator = Animator::new();
                animator.run(request.parameters, animation)?;
                self.slots.insert(
                    category,
                    Slot {
                        animator,
                        pending: Some(run_id),
                        enabled: true,
                    },
                );
                None
            }
        };

        if let Some(previous) = previous.filter(|p| *p != run_id) {
            debug!("run {previous} preempted by {run_id} on {category:08x}");
            handler.on_complete(previous, false);
        }
        Ok(true)
    }

    /// Composite every enabled animator, in slot order, onto a neutral frame.
    pub fn compose(&mut self, dt: f32, handler: &mut dyn CompletionHandler) -> AnimationFrame {
        let mut composite = AnimationFrame::default();
        let mut released: Vec<u32> = Vec::new();

        for (category, slot) in self.slots.iter_mut() {
            if !slot.enabled {
                continue;
            }
            slot.animator.calculate(dt).blend_into(&mut composite);
            match slot.animator.status() {
                AnimatorStatus::Running => {}
                AnimatorStatus::Stopped => {
                    if let Some(run) = slot.pending.take() {
                        handler.on_complete(run, true);
                    }
                }
                AnimatorStatus::Finished => {
                    let release = match slot.pending.take() {
                        Some(run) => handler.on_complete(run, true),
                        None => true,
                    };
                    if release {
                        released.push(*category);
                    }
                }
            }
        }

        for category in released {
            self.slots.shift_remove(&category);
        }
        trace!("composed {} slots into {} elements", self.slots.len(), composite.len());
        composite
    }

    /// Remove a category's animator without notifying anyone. Returns the run
    /// that was pending on it.
    pub fn stop(&mut self, category: u32) -> Option<RunId> {
        self.slots
            .shift_remove(&category)
            .and_then(|slot| slot.pending)
    }

    /// Remove every slot currently owned by `run`.
    pub fn stop_run(&mut self, run: RunId) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.pending != Some(run));
        before - self.slots.len()
    }

    /// Disabled animators keep their state but are skipped by `compose`.
    pub fn set_enabled(&mut self, category: u32, enabled: bool) -> bool {
        match self.slots.get_mut(&category) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn animator(&self, category: u32) -> Option<&Animator> {
        self.slots.get(&category).map(|slot| &slot.animator)
    }

    pub fn pending_run(&self, category: u32) -> Option<RunId> {
        self.slots.get(&category).and_then(|slot| slot.pending)
    }

    pub fn animators(&self) -> Vec<AnimatorSnapshot> {
        self.slots
            .iter()
            .map(|(category, slot)| AnimatorSnapshot {
                category: *category,
                animation: slot.animator.animation_id(),
                action: slot.animator.action(),
                progress: slot.animator.progress(),
                status: slot.animator.status(),
                enabled: slot.enabled,
                pending: slot.pending,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AnimationData, RawKeyframe};
    use crate::element::ElementChannel;
    use crate::frame::BlendMode;
    use crate::ids::Category;
    use crate::request::RunParameters;

    fn animation(category: &str) -> Arc<Animation> {
        let id = AnimationId::new(Category::new(category, BlendMode::Average, None), "pose");
        let data = AnimationData::new(
            "pose",
            2.0,
            false,
            vec![RawKeyframe::new(0).with(category, ElementChannel::RotateX, 10.0)],
        );
        Arc::new(Animation::new(id, &data).unwrap())
    }

    #[test]
    fn stop_on_idle_category_is_a_noop() {
        let mut composer = Composer::new();
        let anim = animation("legs");
        let request = AnimationRequest::new(anim.id, RunParameters::stop());
        let mut calls = 0;
        let mut handler = |_: RunId, _: bool| {
            calls += 1;
            true
        };
        assert_eq!(composer.run(RunId::new(), &request, anim, &mut handler), Ok(false));
        assert!(composer.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn failed_run_creates_no_slot() {
        let mut composer = Composer::new();
        let anim = animation("legs");
        let request = AnimationRequest::new(anim.id, RunParameters::rewind(1.0, None, None));
        let mut handler = |_: RunId, _: bool| true;
        assert!(composer.run(RunId::new(), &request, anim, &mut handler).is_err());
        assert!(composer.is_empty());
    }

    #[test]
    fn disabled_slots_are_skipped() {
        let mut composer = Composer::new();
        let anim = animation("legs");
        let category = anim.id.category.hash;
        let request = AnimationRequest::new(anim.id, RunParameters::set(0.0));
        let mut handler = |_: RunId, _: bool| true;
        composer.run(RunId::new(), &request, anim, &mut handler).unwrap();

        assert!(composer.set_enabled(category, false));
        assert!(composer.compose(0.1, &mut handler).is_empty());
        assert!(composer.set_enabled(category, true));
        assert_eq!(composer.compose(0.1, &mut handler).len(), 1);
        assert!(!composer.set_enabled(42, true));
    }

    #[test]
    fn stop_run_removes_owned_slots() {
        let mut composer = Composer::new();
        let run = RunId::new();
        let mut handler = |_: RunId, _: bool| true;
        for name in ["legs", "arms"] {
            let anim = animation(name);
            let request = AnimationRequest::new(anim.id, RunParameters::play(1.0, None, None));
            composer.run(run, &request, anim, &mut handler).unwrap();
        }
        assert_eq!(composer.len(), 2);
        assert_eq!(composer.stop_run(run), 2);
        assert!(composer.is_empty());
    }
}
