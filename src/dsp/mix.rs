//! Dry/wet blending and summing.

/*
Every insert effect in the chain is blended the same way: the processed
(wet) signal crossfades against the untouched (dry) one.

    out = dry · (1 - wet) + processed · wet

    wet = 0.0   effect bypassed, output is the dry signal exactly
    wet = 0.5   equal parts
    wet = 1.0   only the processed signal

This is a linear crossfade, so a fully-correlated signal keeps its level
across the sweep. Voices are summed without weighting; the main bus and
limiter downstream take care of headroom.
*/

/// Blend one dry and one processed sample.
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Accumulate `source` into `dest`.
pub fn sum_in_place(dest: &mut [f32], source: &[f32]) {
    debug_assert_eq!(dest.len(), source.len());
    for (d, &s) in dest.iter_mut().zip(source) {
        *d += s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(blend_dry_wet(0.5, 9.0, 0.0), 0.5);
        assert_eq!(blend_dry_wet(0.5, 0.1, 1.0), 0.1);
    }

    #[test]
    fn test_half_mix_averages() {
        assert!((blend_dry_wet(1.0, 0.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sum_in_place_accumulates() {
        let mut dest = [1.0, 2.0];
        sum_in_place(&mut dest, &[0.5, -2.0]);
        assert_eq!(dest, [1.5, 0.0]);
    }
}
