//! Keyframed animation: sparse keyframes at integer timeline positions,
//! preprocessed so every keyframe defines every animated channel.
//!
//! Model:
//! - Timeline positions are integer frames in `[0, total_frames]`.
//! - Construction sorts keyframes, adds empty bounding keyframes at 0 and at
//!   `total_frames - 1` where missing, then fills holes.
//! - Sampling brackets a fractional position with two keyframes and lerps.
//! - Cyclic timelines wrap both bracketing and `[start, end]` ranges.

use indexmap::IndexSet;

use crate::data::{AnimationData, RawKeyframe};
use crate::element::{AnimationElement, ElementId};
use crate::error::Result;
use crate::frame::{AnimationFrame, BlendMode};
use crate::ids::AnimationId;

#[derive(Clone, Debug)]
pub struct Animation {
    pub id: AnimationId,
    keyframes: Vec<AnimationFrame>,
    frame_positions: Vec<u32>,
    total_frames: f32,
    cyclic: bool,
    default_frame: AnimationFrame,
}

impl Animation {
    /// Build an animation from raw data registered under `id`.
    pub fn new(id: AnimationId, data: &AnimationData) -> Result<Self> {
        data.validate_basic()?;

        let mut raw: Vec<&RawKeyframe> = data.keyframes.iter().collect();
        raw.sort_by_key(|keyframe| keyframe.frame);

        let default_frame = AnimationFrame::for_category(&id.category);
        let mut keyframes = Vec::with_capacity(raw.len() + 2);
        let mut frame_positions = Vec::with_capacity(raw.len() + 2);

        if raw.first().map(|k| k.frame) != Some(0) {
            keyframes.push(default_frame.clone());
            frame_positions.push(0);
        }
        for keyframe in raw {
            keyframes.push(AnimationFrame::from_keyframe(keyframe, data, &id.category));
            frame_positions.push(keyframe.frame);
        }
        let end = (data.total_frames - 1.0).max(0.0).floor() as u32;
        if frame_positions.last().is_some_and(|last| *last < end) {
            keyframes.push(default_frame.clone());
            frame_positions.push(end);
        }

        let mut animation = Self {
            id,
            keyframes,
            frame_positions,
            total_frames: data.total_frames,
            cyclic: data.cyclic,
            default_frame,
        };
        animation.preprocess_keyframes();
        log::debug!(
            "built animation {} ({} keyframes, {} frames, cyclic={})",
            animation.id,
            animation.keyframes.len(),
            animation.total_frames,
            animation.cyclic
        );
        Ok(animation)
    }

    #[inline]
    pub fn total_frames(&self) -> f32 {
        self.total_frames
    }

    #[inline]
    pub fn cyclic(&self) -> bool {
        self.cyclic
    }

    #[inline]
    pub fn frame_positions(&self) -> &[u32] {
        &self.frame_positions
    }

    #[inline]
    pub fn keyframes(&self) -> &[AnimationFrame] {
        &self.keyframes
    }

    /// Position of the last keyframe.
    #[inline]
    pub fn last_frame(&self) -> f32 {
        self.frame_positions.last().copied().unwrap_or(0) as f32
    }

    /// Neutral frame carrying the category defaults and no elements.
    #[inline]
    pub fn default_frame(&self) -> &AnimationFrame {
        &self.default_frame
    }

    /// Sample at `progress` in `[0,1]` across `[start ?? 0, end ?? last_frame]`.
    pub fn play(&self, progress: f32, start_frame: Option<f32>, end_frame: Option<f32>) -> AnimationFrame {
        self.sample(self.calc_current_frame(progress, start_frame, end_frame))
    }

    /// Sample at `target_frame` and interpolate from it towards `end`.
    pub fn blend(&self, progress: f32, target_frame: f32, end: &AnimationFrame) -> AnimationFrame {
        let sampled = self.sample(target_frame);
        Self::blend_frames(progress, &sampled, end)
    }

    /// Interpolate between two materialized frames.
    pub fn blend_frames(progress: f32, from: &AnimationFrame, to: &AnimationFrame) -> AnimationFrame {
        let mut result = to.clone();
        from.lerp_into(&mut result, progress);
        result
    }

    /// Sample at a fractional timeline position.
    pub fn sample(&self, frame: f32) -> AnimationFrame {
        let (start, end) = self.find_keyframes(frame);
        if start == end {
            return self.keyframes[start].clone();
        }
        let progress = self.segment_progress(start, end, frame);
        if progress <= 0.0 {
            return self.keyframes[start].clone();
        }
        let mut result = self.keyframes[end].clone();
        self.keyframes[start].lerp_into(&mut result, progress);
        result
    }

    /// Map progress onto a timeline position. On cyclic timelines a range with
    /// `start > end` runs through the end of the timeline back to `end`.
    pub fn calc_current_frame(&self, progress: f32, start_frame: Option<f32>, end_frame: Option<f32>) -> f32 {
        let start = start_frame.unwrap_or(0.0);
        let end = end_frame.unwrap_or_else(|| self.last_frame());
        if self.cyclic && start > end {
            let frames_left = self.total_frames - start;
            let distance = progress * (end + frames_left);
            if distance < frames_left {
                start + distance
            } else {
                distance - frames_left
            }
        } else {
            start + (end - start) * progress
        }
    }

    /// Indices of the keyframes bracketing `frame`: `pos[start] <= frame < pos[end]`.
    /// Past the last keyframe, cyclic timelines wrap to the first keyframe and
    /// others clamp to the last.
    pub fn find_keyframes(&self, frame: f32) -> (usize, usize) {
        let count = self.frame_positions.len();
        if count <= 1 {
            return (0, 0);
        }
        for i in 0..count - 1 {
            let start = self.frame_positions[i] as f32;
            let end = self.frame_positions[i + 1] as f32;
            if start <= frame && frame < end {
                return (i, i + 1);
            }
        }
        if self.cyclic {
            (count - 1, 0)
        } else if frame < self.frame_positions[0] as f32 {
            (0, 0)
        } else {
            (count - 1, count - 1)
        }
    }

    fn segment_progress(&self, start: usize, end: usize, frame: f32) -> f32 {
        let start_pos = self.frame_positions[start] as f32;
        let end_pos = self.frame_positions[end] as f32;
        let progress = if end_pos > start_pos {
            (frame - start_pos) / (end_pos - start_pos)
        } else {
            // wrapped segment: last keyframe -> first keyframe
            let span = end_pos + self.total_frames - start_pos;
            if span <= 0.0 {
                return 0.0;
            }
            let offset = if frame >= start_pos {
                frame - start_pos
            } else {
                frame + self.total_frames - start_pos
            };
            offset / span
        };
        progress.clamp(0.0, 1.0)
    }

    /// Fill every keyframe that lacks a channel animated elsewhere by
    /// interpolating between the nearest keyframes that define it.
    fn preprocess_keyframes(&mut self) {
        let count = self.keyframes.len();
        let mut ids: IndexSet<ElementId> = IndexSet::new();
        for keyframe in &self.keyframes {
            ids.extend(keyframe.ids().copied());
        }

        for id in ids {
            let defining: Vec<usize> = (0..count)
                .filter(|&i| self.keyframes[i].contains(&id))
                .collect();
            if defining.len() == count {
                continue;
            }

            for missing in (0..count).filter(|i| !defining.contains(i)) {
                let prev = defining
                    .iter()
                    .rev()
                    .find(|&&d| d < missing)
                    .copied()
                    .or_else(|| self.cyclic.then(|| defining[defining.len() - 1]));
                let next = defining
                    .iter()
                    .find(|&&d| d > missing)
                    .copied()
                    .or_else(|| self.cyclic.then(|| defining[0]));

                let (element, mode) = match (prev, next) {
                    (Some(prev), Some(next)) if prev != next => {
                        let progress = self.hole_progress(prev, missing, next);
                        let (from, mode) = self.element_at(prev, &id);
                        let (to, _) = self.element_at(next, &id);
                        (AnimationElement::circular_lerp(&from, &to, progress), mode)
                    }
                    (Some(only), _) | (None, Some(only)) => self.element_at(only, &id),
                    (None, None) => continue,
                };
                self.keyframes[missing].insert(element, mode);
            }
        }
    }

    fn element_at(&self, keyframe: usize, id: &ElementId) -> (AnimationElement, BlendMode) {
        let frame = &self.keyframes[keyframe];
        match (frame.get(id), frame.blend_mode(id)) {
            (Some(element), Some(mode)) => (*element, mode),
            _ => (AnimationElement::empty(*id), frame.default_blend_mode),
        }
    }

    /// Timeline-distance weighted position of `frame` between `start` and `end`,
    /// measured around the cycle when the range wraps.
    fn hole_progress(&self, start: usize, frame: usize, end: usize) -> f32 {
        let start = self.frame_positions[start] as f32;
        let frame = self.frame_positions[frame] as f32;
        let end = self.frame_positions[end] as f32;
        let start_distance = if frame > start {
            frame - start
        } else {
            frame + self.total_frames - start
        };
        let end_distance = if end > frame {
            end - frame
        } else {
            end + self.total_frames - frame
        };
        start_distance / (start_distance + end_distance)
    }
}
