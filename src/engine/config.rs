#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::automation::ramp_samples;

/// Construction-time engine configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Voice pool size (at least 1).
    pub max_voices: usize,
    /// Ramp length for continuous parameter changes.
    pub smoothing_ms: f32,
    /// Capacity of the control → audio command queue.
    pub command_capacity: usize,
    /// Sample rate used by the offline backend.
    pub offline_sample_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_voices: 16,
            smoothing_ms: 50.0,
            command_capacity: 256,
            offline_sample_rate: 48_000.0,
        }
    }
}

impl EngineConfig {
    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices.max(1);
        self
    }

    pub fn with_smoothing_ms(mut self, smoothing_ms: f32) -> Self {
        self.smoothing_ms = smoothing_ms.max(0.0);
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }

    pub fn with_offline_sample_rate(mut self, sample_rate: f32) -> Self {
        self.offline_sample_rate = sample_rate;
        self
    }

    pub fn voices(&self) -> usize {
        self.max_voices.max(1)
    }

    /// Smoothing window in samples at `sample_rate`.
    pub fn ramp_samples(&self, sample_rate: f32) -> u32 {
        ramp_samples(self.smoothing_ms, sample_rate)
    }
}
