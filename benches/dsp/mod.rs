//! Benchmarks for low-level DSP primitives.

mod delay;
mod distortion;
mod filter;
mod limiter;
mod oscillator;
mod reverb;

pub use delay::bench_delay;
pub use distortion::bench_distortion;
pub use filter::bench_filter;
pub use limiter::bench_limiter;
pub use oscillator::bench_oscillator;
pub use reverb::bench_reverb;
