//! Weighted scalar samples and their blend operations.
//!
//! All combinators work on `Option<WeightedValue>`: `None` means the channel
//! has no contribution at this instant and acts as the neutral operand.

use serde::{Deserialize, Serialize};

use crate::interp::functions::{lerp_f32, shortest_arc_lerp};

/// Period used for angular channels (degrees).
pub const DEFAULT_PERIOD: f32 = 360.0;

/// A numeric sample plus its blending influence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub value: f32,
    pub weight: f32,
}

impl WeightedValue {
    #[inline]
    pub const fn new(value: f32, weight: f32) -> Self {
        Self { value, weight }
    }

    /// Componentwise addition of values and weights.
    pub fn sum(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(Self::new(a.value + b.value, a.weight + b.weight)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Weighted mean of the values; weights accumulate.
    pub fn average(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => {
                let weight = a.weight + b.weight;
                if weight == 0.0 {
                    return Some(Self::new((a.value + b.value) * 0.5, 0.0));
                }
                let value = (a.value * a.weight + b.value * b.weight) / weight;
                Some(Self::new(value, weight))
            }
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Linear interpolation. A missing endpoint fades the other one in or out;
    /// with `weighted == false` the surviving weight is kept unscaled.
    pub fn lerp(from: Option<Self>, to: Option<Self>, progress: f32, weighted: bool) -> Option<Self> {
        Self::interpolate(from, to, progress, weighted, lerp_f32)
    }

    /// Like [`WeightedValue::lerp`] but values travel the shorter arc modulo `period`.
    pub fn circular_lerp(
        from: Option<Self>,
        to: Option<Self>,
        progress: f32,
        weighted: bool,
        period: f32,
    ) -> Option<Self> {
        Self::interpolate(from, to, progress, weighted, |a, b, t| {
            shortest_arc_lerp(a, b, t, period)
        })
    }

    fn interpolate(
        from: Option<Self>,
        to: Option<Self>,
        progress: f32,
        weighted: bool,
        value_lerp: impl Fn(f32, f32, f32) -> f32,
    ) -> Option<Self> {
        match (from, to) {
            (None, None) => None,
            (None, Some(to)) => Some(Self::new(
                to.value * progress,
                if weighted { to.weight * progress } else { to.weight },
            )),
            (Some(from), None) => {
                let remaining = 1.0 - progress;
                Some(Self::new(
                    from.value * remaining,
                    if weighted { from.weight * remaining } else { from.weight },
                ))
            }
            (Some(from), Some(to)) => Some(Self::new(
                value_lerp(from.value, to.value, progress),
                if weighted {
                    lerp_f32(from.weight, to.weight, progress)
                } else {
                    to.weight
                },
            )),
        }
    }
}
