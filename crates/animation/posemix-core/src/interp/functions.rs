//! Scalar interpolation helpers:
//! - lerp_f32 (plain linear)
//! - shortest_arc_lerp (periodic values such as degrees)
//! - bounce_out (easing used by `ProgressModifier::Bounce`)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Signed difference `to - from` folded onto the shorter arc of a circle with
/// the given period. The result lies in `(-period/2, period/2]`.
#[inline]
pub fn shortest_arc_delta(from: f32, to: f32, period: f32) -> f32 {
    let delta = (to - from).rem_euclid(period);
    if delta > period * 0.5 {
        delta - period
    } else {
        delta
    }
}

/// Interpolate along the shorter arc between two periodic values.
///
/// If both endpoints lie in `[0, period)` the result is wrapped back into that
/// range, so 350 -> 10 passes through 0 rather than 360.
#[inline]
pub fn shortest_arc_lerp(from: f32, to: f32, t: f32, period: f32) -> f32 {
    if period <= 0.0 {
        return lerp_f32(from, to, t);
    }
    let value = from + shortest_arc_delta(from, to, period) * t;
    let in_range = |v: f32| (0.0..period).contains(&v);
    if in_range(from) && in_range(to) && !in_range(value) {
        value.rem_euclid(period)
    } else {
        value
    }
}

/// Piecewise-quadratic bounce easing, monotone within each bounce.
#[inline]
pub fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        (N1 * t * t + 0.984375).min(1.0)
    }
}
