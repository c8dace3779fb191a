//! Interpolation helpers and progress modifier curves.
//!
//! Scalar lerp and shortest-arc lerp live in `functions`; `ProgressModifier`
//! reparametrizes a clamped time ratio before it drives an animator.

pub mod functions;

use serde::{Deserialize, Serialize};

use functions::bounce_out;

/// Easing curves applied to playback progress. All map `[0,1]` onto `[0,1]`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ProgressModifier {
    #[default]
    Linear,
    Quadratic,
    Cubic,
    Sqrt,
    Sin,
    SinQuadratic,
    CosShifted,
    SqrtSqrt,
    Bounce,
}

impl ProgressModifier {
    /// Evaluate the curve; the input is clamped to `[0,1]` first.
    pub fn apply(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            ProgressModifier::Linear => p,
            ProgressModifier::Quadratic => p * p,
            ProgressModifier::Cubic => p * p * p,
            ProgressModifier::Sqrt => p.sqrt(),
            ProgressModifier::Sin => (p * std::f32::consts::FRAC_PI_2).sin(),
            ProgressModifier::SinQuadratic => {
                let s = (p * std::f32::consts::FRAC_PI_2).sin();
                s * s
            }
            ProgressModifier::CosShifted => 0.5 - 0.5 * (p * std::f32::consts::PI).cos(),
            ProgressModifier::SqrtSqrt => p.sqrt().sqrt(),
            ProgressModifier::Bounce => bounce_out(p),
        }
    }

    /// Mirrored evaluation used by actions that run a pose backwards
    /// (ease-out, rewind): `1 - f(1 - p)`.
    #[inline]
    pub fn apply_reversed(self, progress: f32) -> f32 {
        1.0 - self.apply(1.0 - progress.clamp(0.0, 1.0))
    }
}
