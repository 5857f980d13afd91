use crate::MAX_DELAY_SAMPLES;

/// Circular delay line with a fixed maximum length, allocated once.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; MAX_DELAY_SAMPLES],
            write_pos: 0,
        }
    }

    /// Read the sample written `delay_samples` ago.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let delay_samples = delay_samples.clamp(1, MAX_DELAY_SAMPLES - 1);
        let read_pos = (self.write_pos + MAX_DELAY_SAMPLES - delay_samples) % MAX_DELAY_SAMPLES;
        self.buffer[read_pos]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % MAX_DELAY_SAMPLES;
    }

    /// Plain delay: returns the input from `delay_samples` ago.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    /// Feedback delay: the echo is fed back into the line scaled by `feedback`.
    #[inline]
    pub fn next_feedback_sample(&mut self, sample: f32, delay_samples: usize, feedback: f32) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample + delayed * feedback);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new();
        let mut buffer = vec![0.0; 32];
        buffer[0] = 1.0;
        line.render(&mut buffer, 10);

        assert_eq!(buffer[10], 1.0);
        assert!(buffer.iter().enumerate().all(|(i, &s)| i == 10 || s == 0.0));
    }

    #[test]
    fn feedback_produces_decaying_repeats() {
        let mut line = DelayLine::new();
        let mut out = Vec::new();
        for i in 0..40 {
            let input = if i == 0 { 1.0 } else { 0.0 };
            out.push(line.next_feedback_sample(input, 10, 0.5));
        }

        assert!((out[10] - 1.0).abs() < 1e-6);
        assert!((out[20] - 0.5).abs() < 1e-6);
        assert!((out[30] - 0.25).abs() < 1e-6);
    }
}
