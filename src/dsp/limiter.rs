//! Peak limiter.

/*
Peak Limiter
============

Last stage of the chain; keeps the summed voices under a fixed ceiling.

A peak follower tracks the signal envelope with an INSTANT attack (it
jumps to any sample louder than itself) and an exponential release:

    env = max(|x|, env · release_coef)
    release_coef = exp(-1 / (release_seconds · sample_rate))

Gain is computed from the follower, not the sample:

    gain = threshold / env   when env > threshold
         = 1                 otherwise

Because env ≥ |x| at every sample, |x · gain| ≤ threshold always holds.
There is no lookahead, so the very first sample of a transient is
already caught; the price is a little distortion on hard hits.
*/

use super::amplify::db_to_gain;

pub const DEFAULT_THRESHOLD_DB: f32 = -0.1;
pub const DEFAULT_RELEASE_SECONDS: f32 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct PeakLimiter {
    threshold: f32,
    release_coef: f32,
    envelope: f32,
}

impl PeakLimiter {
    pub fn new(threshold_db: f32, release_seconds: f32, sample_rate: f32) -> Self {
        let release_samples = (release_seconds * sample_rate).max(1.0);
        Self {
            threshold: db_to_gain(threshold_db),
            release_coef: (-1.0 / release_samples).exp(),
            envelope: 0.0,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        self.envelope = sample.abs().max(self.envelope * self.release_coef);
        if self.envelope > self.threshold {
            sample * self.threshold / self.envelope
        } else {
            sample
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    /// Linear ceiling.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
