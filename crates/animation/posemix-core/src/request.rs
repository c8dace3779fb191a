//! Run requests: what an animator should do with an animation and how fast.

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::ids::AnimationId;
use crate::interp::ProgressModifier;

/// Playback verb of one request leg.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AnimationAction {
    /// Jump to `target_frame` in one tick.
    Set,
    /// Blend from the current pose into `target_frame`.
    EaseIn,
    /// Blend from the current pose back to neutral, then release the slot.
    EaseOut,
    /// Play `[start_frame, target_frame]`.
    Play,
    /// Freeze on the current pose.
    Stop,
    /// Run the preceding `Play` backwards from wherever it got to.
    Rewind,
    /// Drop to neutral immediately and release the slot.
    Clear,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub action: AnimationAction,
    /// Seconds.
    #[serde(default)]
    pub duration: f32,
    #[serde(default)]
    pub modifier: ProgressModifier,
    #[serde(default)]
    pub start_frame: Option<f32>,
    #[serde(default)]
    pub target_frame: Option<f32>,
}

impl RunParameters {
    pub fn new(action: AnimationAction, duration: f32) -> Self {
        Self {
            action,
            duration,
            modifier: ProgressModifier::Linear,
            start_frame: None,
            target_frame: None,
        }
    }

    pub fn set(target_frame: f32) -> Self {
        Self {
            target_frame: Some(target_frame),
            ..Self::new(AnimationAction::Set, 0.0)
        }
    }

    pub fn ease_in(duration: f32, target_frame: f32) -> Self {
        Self {
            target_frame: Some(target_frame),
            ..Self::new(AnimationAction::EaseIn, duration)
        }
    }

    pub fn ease_out(duration: f32) -> Self {
        Self::new(AnimationAction::EaseOut, duration)
    }

    pub fn play(duration: f32, start_frame: Option<f32>, target_frame: Option<f32>) -> Self {
        Self {
            start_frame,
            target_frame,
            ..Self::new(AnimationAction::Play, duration)
        }
    }

    pub fn stop() -> Self {
        Self::new(AnimationAction::Stop, 0.0)
    }

    pub fn rewind(duration: f32, start_frame: Option<f32>, target_frame: Option<f32>) -> Self {
        Self {
            start_frame,
            target_frame,
            ..Self::new(AnimationAction::Rewind, duration)
        }
    }

    pub fn clear() -> Self {
        Self::new(AnimationAction::Clear, 0.0)
    }

    pub fn with_modifier(mut self, modifier: ProgressModifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Reject parameters no animator can execute.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| AnimationError::InvalidParameters {
            action: self.action,
            reason: reason.to_string(),
        };
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(invalid("duration must be finite and >= 0"));
        }
        if self.start_frame.is_some_and(|f| !f.is_finite())
            || self.target_frame.is_some_and(|f| !f.is_finite())
        {
            return Err(invalid("frame positions must be finite"));
        }
        match self.action {
            AnimationAction::Set | AnimationAction::EaseIn if self.target_frame.is_none() => {
                Err(invalid("target frame is required"))
            }
            _ => Ok(()),
        }
    }
}

/// One leg of a run: an action on one animation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    pub animation: AnimationId,
    pub parameters: RunParameters,
}

impl AnimationRequest {
    pub fn new(animation: AnimationId, parameters: RunParameters) -> Self {
        Self {
            animation,
            parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_ease_in_need_a_target() {
        assert!(RunParameters::set(3.0).validate().is_ok());
        assert!(RunParameters::ease_in(0.5, 3.0).validate().is_ok());

        let mut missing = RunParameters::ease_in(0.5, 3.0);
        missing.target_frame = None;
        assert!(matches!(
            missing.validate(),
            Err(AnimationError::InvalidParameters {
                action: AnimationAction::EaseIn,
                ..
            })
        ));
        assert!(RunParameters::play(1.0, None, None).validate().is_ok());
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(RunParameters::play(-1.0, None, None).validate().is_err());
        assert!(RunParameters::play(f32::NAN, None, None).validate().is_err());
        assert!(RunParameters::play(1.0, Some(f32::INFINITY), None)
            .validate()
            .is_err());
    }

    #[test]
    fn modifier_builder() {
        let p = RunParameters::ease_out(2.0).with_modifier(ProgressModifier::Bounce);
        assert_eq!(p.action, AnimationAction::EaseOut);
        assert_eq!(p.modifier, ProgressModifier::Bounce);
        assert_eq!(p.target_frame, None);
    }
}
