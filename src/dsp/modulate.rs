//! Parameter modulation primitives.

/*
Block-rate Modulation
=====================

The LFO is rendered per sample but applied to its target once per block:
the block's average becomes the modulation value `m` for every sample of
that block. At 5 Hz and 256-frame blocks that is ~37 updates per LFO
cycle, well above what the ear resolves as steps on cutoff or pitch.

How `m` bends each target
-------------------------

    pitch    m semitones       freq   · 2^(m / 12)
    filter   2m octaves        cutoff · 2^(2m)
    volume   -12m dB           gain   · 10^(-12m / 20)

All three are exponential in `m`, which matches how pitch and loudness
are perceived: equal LFO swings sound like equal changes.
*/

/// Average of a control block; 0.0 for an empty block.
#[inline]
pub fn block_average(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().sum::<f32>() / buffer.len() as f32
}

/// Frequency ratio for a shift in semitones.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// Frequency ratio for a detune in cents.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    (cents / 1200.0).exp2()
}

/// Cutoff multiplier for a filter modulation value.
#[inline]
pub fn filter_ratio(modulation: f32) -> f32 {
    (2.0 * modulation).exp2()
}

/// Attenuation in dB for a volume modulation value.
#[inline]
pub fn tremolo_db(modulation: f32) -> f32 {
    -12.0 * modulation
}
