//! Per-category playback state machine.
//!
//! An animator owns the frame it last produced. `run` captures that frame as
//! the interpolation start of the new leg, so consecutive legs blend without
//! popping. `calculate` advances time and resamples.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::error::{AnimationError, Result};
use crate::frame::AnimationFrame;
use crate::ids::AnimationId;
use crate::request::{AnimationAction, RunParameters};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AnimatorStatus {
    /// Leg in progress.
    Running,
    /// Leg done; the pose is held until the next leg.
    Stopped,
    /// Leg done and the pose is back at neutral; the slot can be released.
    Finished,
}

#[derive(Clone, Debug)]
pub struct Animator {
    animation: Option<Arc<Animation>>,
    parameters: RunParameters,
    status: AnimatorStatus,
    elapsed: f32,
    /// Curve-mapped progress of the current leg.
    progress: f32,
    /// How far the held pose is "in" its animation: 0 at neutral, 1 fully posed.
    pose_progress: f32,
    previous_progress: f32,
    current: AnimationFrame,
    start: AnimationFrame,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    pub fn new() -> Self {
        Self {
            animation: None,
            parameters: RunParameters::stop(),
            status: AnimatorStatus::Stopped,
            elapsed: 0.0,
            progress: 0.0,
            pose_progress: 0.0,
            previous_progress: 0.0,
            current: AnimationFrame::default(),
            start: AnimationFrame::default(),
        }
    }

    /// Start a new leg. The previous leg is abandoned wherever it got to.
    ///
    /// Fails without touching state if the parameters are invalid or a
    /// `Rewind` does not follow a `Play` of the same animation and frames.
    pub fn run(&mut self, parameters: RunParameters, animation: Arc<Animation>) -> Result<()> {
        parameters.validate()?;
        if parameters.action == AnimationAction::Rewind && !self.can_rewind(&parameters, &animation) {
            return Err(AnimationError::RewindWithoutPlay);
        }

        if self.animation.is_none() {
            self.current = animation.default_frame().clone();
        }
        self.start = self.current.clone();
        self.previous_progress = self.pose_progress;
        self.parameters = parameters;
        self.animation = Some(animation);
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.status = AnimatorStatus::Running;
        Ok(())
    }

    fn can_rewind(&self, parameters: &RunParameters, animation: &Animation) -> bool {
        let Some(previous) = &self.animation else {
            return false;
        };
        previous.id == animation.id
            && self.parameters.action == AnimationAction::Play
            && self.parameters.start_frame == parameters.start_frame
            && self.parameters.target_frame == parameters.target_frame
    }

    /// Advance by `dt` seconds and return the frame for this tick.
    pub fn calculate(&mut self, dt: f32) -> &AnimationFrame {
        let Some(animation) = self.animation.clone() else {
            return &self.current;
        };
        if self.status != AnimatorStatus::Running {
            return &self.current;
        }

        self.elapsed += dt.max(0.0);
        let params = self.parameters;
        let duration = match params.action {
            AnimationAction::EaseOut => params.duration * self.previous_progress,
            _ => params.duration,
        };
        let raw = if duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / duration).clamp(0.0, 1.0)
        };
        let done = raw >= 1.0;

        match params.action {
            AnimationAction::Set => {
                let target = params.target_frame.unwrap_or(0.0);
                self.current = animation.sample(target);
                self.progress = 1.0;
                self.pose_progress = 1.0;
                self.status = AnimatorStatus::Stopped;
            }
            AnimationAction::EaseIn => {
                let p = params.modifier.apply(raw);
                let target = params.target_frame.unwrap_or(0.0);
                self.current = animation.blend(1.0 - p, target, &self.start);
                self.progress = p;
                self.pose_progress = p;
                if done {
                    self.status = AnimatorStatus::Stopped;
                }
            }
            AnimationAction::EaseOut => {
                let p = params.modifier.apply_reversed(raw);
                self.current = Animation::blend_frames(p, &self.start, animation.default_frame());
                self.progress = p;
                self.pose_progress = (1.0 - p) * self.previous_progress;
                if done {
                    self.status = AnimatorStatus::Finished;
                }
            }
            AnimationAction::Play => {
                let p = params.modifier.apply(raw);
                self.current = animation.play(p, params.start_frame, params.target_frame);
                self.progress = p;
                self.pose_progress = p;
                if done {
                    self.status = AnimatorStatus::Stopped;
                }
            }
            AnimationAction::Stop => {
                self.progress = 1.0;
                self.status = AnimatorStatus::Stopped;
            }
            AnimationAction::Rewind => {
                let p = params.modifier.apply_reversed(raw);
                let position = (1.0 - p) * self.previous_progress;
                self.current = animation.play(position, params.start_frame, params.target_frame);
                self.progress = p;
                self.pose_progress = position;
                if done {
                    self.status = AnimatorStatus::Stopped;
                }
            }
            AnimationAction::Clear => {
                self.current = animation.default_frame().clone();
                self.progress = 1.0;
                self.pose_progress = 0.0;
                self.status = AnimatorStatus::Finished;
            }
        }
        &self.current
    }

    #[inline]
    pub fn status(&self) -> AnimatorStatus {
        self.status
    }

    #[inline]
    pub fn action(&self) -> AnimationAction {
        self.parameters.action
    }

    #[inline]
    pub fn parameters(&self) -> &RunParameters {
        &self.parameters
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn pose_progress(&self) -> f32 {
        self.pose_progress
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn animation_id(&self) -> Option<AnimationId> {
        self.animation.as_ref().map(|a| a.id)
    }

    /// Frame produced by the last `calculate`.
    #[inline]
    pub fn current_frame(&self) -> &AnimationFrame {
        &self.current
    }
}
