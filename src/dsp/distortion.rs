//! Waveshaping distortion.
//!
//! A waveshaper pushes every sample through a fixed nonlinear transfer
//! curve. Small signals stay close to linear, large ones are bent over and
//! pick up harmonics.
//!
//! # Amount curve
//!
//! The chain's distortion stage is controlled by a single `amount` in
//! [0, 1]. It is stretched to a steepness `k = amount * 100` and fed into
//!
//! ```text
//!            (3 + k) · x · 20°
//!   f(x) = ─────────────────────
//!               π + k · |x|
//! ```
//!
//! With k = 0 the curve is a gentle straight line; as k grows the knee
//! sharpens and the output flattens toward a ceiling of roughly
//! `(3 + k) · 20° / k`. At the default amount of 0.8 this is a thick,
//! fuzzy saturation, which is why the stage is mixed in by its wet control
//! rather than inserted at 100%.

use std::f32::consts::PI;

const TWENTY_DEGREES: f32 = 20.0 * PI / 180.0;

/// Transfer curve steepness for a distortion amount in [0, 1].
#[inline]
pub fn steepness(amount: f32) -> f32 {
    amount.clamp(0.0, 1.0) * 100.0
}

/// Apply the amount curve to one sample. `k` comes from [`steepness`].
#[inline]
pub fn waveshape(sample: f32, k: f32) -> f32 {
    if sample.abs() < 0.001 {
        return 0.0;
    }
    let x = sample.clamp(-1.0, 1.0);
    (3.0 + k) * x * TWENTY_DEGREES / (PI + k * x.abs())
}

/// Shape a whole buffer in place with the curve for `amount`.
pub fn waveshape_buffer(buffer: &mut [f32], amount: f32) {
    let k = steepness(amount);
    for sample in buffer.iter_mut() {
        *sample = waveshape(*sample, k);
    }
}
