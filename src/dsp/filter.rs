use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | outside      |
| notch / band-stop | outside         | around       |

Topology-preserving-transform state-variable filter (Simper/Zavalishin form).
All four responses fall out of the same two integrators; `k = 1/Q` is the
damping term, so Q = 0.707 is Butterworth-flat and Q >> 1 rings.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MIN_Q: f32 = 0.0001;
pub const MAX_Q: f32 = 30.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::LowPass)
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::HighPass)
        }
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::BandPass)
        }
    }

    pub fn notch(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::Notch)
        }
    }

    /// Prewarped integrator gain for the current cutoff.
    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        let nyquist_guard = sample_rate * 0.49;
        let cutoff = self.cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist_guard);
        (PI * cutoff / sample_rate).tan()
    }

    #[inline]
    fn damping(&self) -> f32 {
        1.0 / self.q.clamp(MIN_Q, MAX_Q)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter the buffer in place. Coefficients are computed once per block.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = self.compute_g(sample_rate);
        let k = self.damping();

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);

            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
                FilterType::BandPass => outputs.bandpass,
                FilterType::Notch => outputs.notch,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.clamp(MIN_Q, MAX_Q);
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        let mut osc = OscillatorBlock::sine();
        (0..len).map(|_| osc.next_sample(freq, SAMPLE_RATE)).collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(64);
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[255] > 0.99);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[255].abs() < 0.01);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = sine(5_000.0, 512);
        filter.render(&mut buffer, SAMPLE_RATE);

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.1, "Expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let mut filter = SVFilter::bandpass(1_000.0);
        filter.set_q(4.0);

        let mut pass = sine(1_000.0, 2048);
        filter.render(&mut pass, SAMPLE_RATE);
        let pass_peak = peak_after_transient(&pass[1024..]);

        filter.reset();
        let mut off = sine(200.0, 2048);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = peak_after_transient(&off[1024..]);

        assert!(pass_peak > off_peak * 2.0, "pass={pass_peak}, off={off_peak}");
    }

    #[test]
    fn test_notch_rejects_cutoff_frequency() {
        let mut filter = SVFilter::notch(1_000.0);
        filter.set_q(1.0);

        let mut center = sine(1_000.0, 4096);
        filter.render(&mut center, SAMPLE_RATE);
        let center_peak = peak_after_transient(&center[2048..]);

        filter.reset();
        let mut off = sine(200.0, 4096);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = peak_after_transient(&off[2048..]);

        assert!(center_peak * 2.0 < off_peak, "center={center_peak}, off={off_peak}");
    }

    #[test]
    fn test_higher_q_boosts_cutoff() {
        let mut filter = SVFilter::lowpass(1_000.0);
        filter.set_q(0.5);
        let mut low_q = sine(1_000.0, 2048);
        filter.render(&mut low_q, SAMPLE_RATE);
        let low_peak = peak_after_transient(&low_q[1024..]);

        filter.reset();
        filter.set_q(4.0);
        let mut high_q = sine(1_000.0, 2048);
        filter.render(&mut high_q, SAMPLE_RATE);
        let high_peak = peak_after_transient(&high_q[1024..]);

        assert!(high_peak > low_peak * 1.5, "high={high_peak}, low={low_peak}");
    }

    #[test]
    fn test_setters_clamp() {
        let mut filter = SVFilter::lowpass(1000.0);
        filter.set_cutoff(1.0);
        assert_eq!(filter.cutoff_hz, MIN_CUTOFF_HZ);
        filter.set_cutoff(1e9);
        assert_eq!(filter.cutoff_hz, MAX_CUTOFF_HZ);
        filter.set_q(0.0);
        assert_eq!(filter.q, MIN_Q);
    }
}
