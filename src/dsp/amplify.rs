//! Gain and decibel helpers.

/*
Amplitude vs Decibels
=====================

The engine's public volume control is in decibels; the render path works
in linear gain. The conversion is the usual one for amplitude:

    gain = 10^(dB / 20)

     0 dB  → 1.0
    -6 dB  → ~0.5
   -12 dB  → ~0.25
   -inf    → 0.0

Anything at or below SILENCE_DB is treated as exactly 0.0.
*/

pub const SILENCE_DB: f32 = -120.0;

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db <= SILENCE_DB {
        return 0.0;
    }
    10.0_f32.powf(db / 20.0)
}

/// Scale a buffer by a constant gain.
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}
