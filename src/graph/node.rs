/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz), ignored by effect nodes
/// - velocity: Intensity, 0.0-1.0
/// - time: Seconds since the processor started
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
    pub time: f64,
}

impl RenderCtx {
    /// Create context from MIDI note
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self::from_freq(sample_rate, midi_note_to_freq(note), velocity)
    }

    /// Create context from direct frequency
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity: velocity.clamp(0.0, 1.0),
            time: 0.0,
        }
    }

    /// Block-level context for effect nodes, which only care about the rate.
    pub fn at(sample_rate: f32, time: f64) -> Self {
        Self {
            sample_rate,
            frequency: 0.0,
            velocity: 1.0,
            time,
        }
    }
}

/// Nodes whose parameters can be driven by the modulation router.
///
/// `apply_modulation` receives the depth-scaled LFO value for the current
/// block. It is held until the next call; 0.0 means "no modulation".
pub trait Modulatable: Send {
    type Param: Copy + Send;

    /// Base (unmodulated) value of the parameter.
    fn get_param(&self, param: Self::Param) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, modulation: f32);
}

/// Core trait for audio processing graph nodes
///
/// Sources (oscillators, voices, the LFO) overwrite `out`. Effects process
/// `out` in place.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a note is released
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }

    /// Clear internal state (delay lines, filter memory, phase).
    fn reset(&mut self) {}
}
