//! Low-level DSP primitives used by the signal chain and the voices.
//!
//! Everything here is allocation-free once constructed and safe to run on
//! the audio thread. The modules stay focused on the math; the graph layer
//! owns parameters, smoothing and routing.

/// Gain and dB conversion.
pub mod amplify;
/// Fixed-length delay line.
pub mod delay;
/// Waveshaping curves.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with multiple responses.
pub mod filter;
/// LFO output ranges.
pub mod lfo;
/// Instant-attack peak limiter.
pub mod limiter;
/// Dry/wet crossfade and summing.
pub mod mix;
/// Block averaging and modulation curves.
pub mod modulate;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;
/// Schroeder reverberator.
pub mod reverb;

pub use envelope::EnvelopeState;
