//! Parameter automation: click-free linear ramps.

/*
Smoothed Parameters
===================

A continuous control (cutoff, detune, wet, volume...) is never written
straight into the DSP. Jumping a filter from 500 Hz to 5 kHz between two
samples is audible as a click, so every change becomes a short linear ramp.

    value
      ▲        target ─────────────
      │              ╱
      │            ╱
      │  ───────╱   ← ramp starts from the CURRENT value
      └────────────────────────────▶ samples
               |<─ ramp_samples ─>|

Retargeting mid-ramp
--------------------

A new `ramp_to` cancels the ramp in flight and starts the next one from
whatever value had been reached. Nothing ever jumps back to the old start
point, and the value only moves between where it was and where it is
going, so it can never leave [min(current, target), max(current, target)].

The step is recomputed as

    step = (target - current) / ramp_samples

and the final sample snaps exactly onto the target to shed accumulated
float error.

Per-sample and per-block use
----------------------------

`next_sample` advances one sample (per-voice detune, FM index). `advance`
moves a whole block at once and returns the value at the block's end,
which is what the block-rate chain nodes read.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl SmoothedParam {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Cancel any ramp in flight and ramp from the current value to `target`.
    pub fn ramp_to(&mut self, target: f32, ramp_samples: u32) {
        if ramp_samples == 0 {
            self.set_immediate(target);
            return;
        }
        self.target = target;
        self.remaining = ramp_samples;
        self.step = (target - self.current) / ramp_samples as f32;
    }

    /// Jump to `value` with no ramp. Used for discrete and initial values.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    /// Advance by `frames` samples and return the value reached.
    #[inline]
    pub fn advance(&mut self, frames: usize) -> f32 {
        if self.remaining == 0 {
            return self.current;
        }
        let frames = frames.min(u32::MAX as usize) as u32;
        if frames >= self.remaining {
            self.current = self.target;
            self.remaining = 0;
        } else {
            self.remaining -= frames;
            self.current += self.step * frames as f32;
        }
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

/// Ramp length in samples for a smoothing window in milliseconds.
pub fn ramp_samples(smoothing_ms: f32, sample_rate: f32) -> u32 {
    (smoothing_ms.max(0.0) * 0.001 * sample_rate).round() as u32
}
