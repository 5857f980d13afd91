//! LFO output ranges.

/*
An LFO waveform is generated bipolar, -1 to +1. Where it ends up depends on
what it is wired to:

    pitch     bipolar  [-1, 1]   vibrato swings above AND below the note
    filter    unipolar [ 0, 1]   cutoff only opens up from its base value
    volume    unipolar [ 0, 1]   tremolo only dips from the set level

The raw waveform is mapped linearly onto [min, max]:

    out = min + (raw + 1) / 2 · (max - min)
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output interval an LFO is scaled into.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoRange {
    pub min: f32,
    pub max: f32,
}

impl LfoRange {
    pub const BIPOLAR: LfoRange = LfoRange { min: -1.0, max: 1.0 };
    pub const UNIPOLAR: LfoRange = LfoRange { min: 0.0, max: 1.0 };

    /// Map a bipolar waveform sample into this range.
    #[inline]
    pub fn map(self, bipolar: f32) -> f32 {
        self.min + bipolar_to_unipolar(bipolar) * (self.max - self.min)
    }

    pub fn contains(self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Convert bipolar (-1..1) to unipolar (0..1).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}
