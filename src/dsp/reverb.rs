//! Schroeder reverberator.

/*
Schroeder Reverb
================

Four parallel feedback comb filters build the dense tail; two allpass
filters in series smear it so individual echoes stop being audible.

    input ─┬─ comb 29.7ms ─┐
           ├─ comb 37.1ms ─┤
           ├─ comb 41.1ms ─┼─ × 0.25 ─ allpass 5.0ms ─ allpass 1.7ms ─ out
           └─ comb 43.7ms ─┘

The comb delays are mutually prime-ish so their echoes never line up.

Decay Time
----------

Decay is specified as RT60: seconds until the tail has fallen by 60 dB.
Each comb gets the feedback that makes ITS loop lose 60 dB in that time:

    g = 10^(-3 · delay_seconds / decay_seconds)

Longer combs get a smaller g, so all four tails die together.

Damping
-------

A one-pole lowpass inside each comb loop absorbs highs a little more on
every pass, the way real rooms swallow treble faster than bass.
*/

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_FEEDBACK: f32 = 0.5;
const MAX_COMB_FEEDBACK: f32 = 0.98;

#[inline]
fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_COMB_FEEDBACK);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];
        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: ALLPASS_FEEDBACK,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.feedback * input + delayed;
        self.buffer[self.write_pos] = input + self.feedback * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    sample_rate: f32,
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        let combs = COMB_DELAYS_MS.map(|ms| CombFilter::new(ms_to_samples(ms, sample_rate)));
        let allpasses = ALLPASS_DELAYS_MS.map(|ms| AllpassFilter::new(ms_to_samples(ms, sample_rate)));

        let mut reverb = Self {
            combs,
            allpasses,
            sample_rate,
        };
        reverb.set_decay(2.0);
        reverb.set_damping(0.3);
        reverb
    }

    /// Set the RT60 decay time in seconds.
    pub fn set_decay(&mut self, decay_seconds: f32) {
        let decay_seconds = decay_seconds.max(0.01);
        for comb in &mut self.combs {
            let delay_seconds = comb.delay_samples() as f32 / self.sample_rate;
            comb.set_feedback(10.0_f32.powf(-3.0 * delay_seconds / decay_seconds));
        }
    }

    pub fn set_damping(&mut self, damp: f32) {
        for comb in &mut self.combs {
            comb.set_damp(damp);
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        let out1 = comb.process(1.0);
        assert!(out1.abs() < 0.01);

        for _ in 0..9 {
            comb.process(0.0);
        }

        let echo = comb.process(0.0);
        assert!(echo.abs() > 0.4);
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut allpass = AllpassFilter::new(5);
        allpass.set_feedback(0.5);

        let mut energy_in = 0.0;
        let mut energy_out = 0.0;
        for i in 0..100 {
            let input = if i < 10 { 1.0 } else { 0.0 };
            let output = allpass.process(input);
            energy_in += input * input;
            energy_out += output * output;
        }

        assert!(energy_out > energy_in * 0.8);
    }

    #[test]
    fn test_reverb_produces_tail() {
        let mut reverb = SchroederReverb::new(48_000.0);
        let _ = reverb.process(1.0);

        let has_tail = (0..5_000).any(|_| reverb.process(0.0).abs() > 0.001);
        assert!(has_tail, "Reverb should produce a tail after impulse");
    }

    #[test]
    fn test_longer_decay_means_more_feedback() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_decay(0.5);
        let short = reverb.combs[0].feedback;
        reverb.set_decay(4.0);
        let long = reverb.combs[0].feedback;
        assert!(long > short);
        assert!(long <= MAX_COMB_FEEDBACK);
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_decay(20.0);

        for _ in 0..10_000 {
            let out = reverb.process(0.1);
            assert!(out.is_finite());
            assert!(out.abs() < 10.0, "Reverb output unstable: {out}");
        }
    }
}
