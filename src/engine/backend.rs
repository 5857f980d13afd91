//! Where processed audio goes.
//!
//! A backend takes ownership of the `EngineProcessor` and drives it from
//! its own clock. `CpalBackend` hands it to the device callback;
//! `OfflineBackend` parks it behind a shared handle so tests and offline
//! renders can pull blocks on demand.

use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info};

use crate::{
    engine::{error::EngineError, processor::EngineProcessor},
    MAX_BLOCK_SIZE,
};

pub trait AudioBackend {
    /// Rate the processor will be built for.
    fn sample_rate(&self) -> f32;

    /// Take the processor and start rendering. On error the processor has
    /// been dropped and the backend can be started again.
    fn start(&mut self, processor: EngineProcessor) -> Result<(), EngineError>;

    /// Stop rendering and release the processor. Idempotent.
    fn stop(&mut self);
}

/// Default output device via cpal. Renders mono into every channel.
pub struct CpalBackend {
    device: cpal::Device,
    config: cpal::StreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalBackend {
    /// Open the default output device. Requires an f32 sample format.
    pub fn open() -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::Initialization("no default output device available".into()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::Initialization(format!("failed to query output config: {e}")))?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(EngineError::Initialization(format!(
                "unsupported sample format {:?}; f32 required",
                supported.sample_format()
            )));
        }

        let config = supported.config();
        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "opened output device"
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    pub fn channels(&self) -> usize {
        self.config.channels as usize
    }
}

impl AudioBackend for CpalBackend {
    fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }

    fn start(&mut self, mut processor: EngineProcessor) -> Result<(), EngineError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.channels().max(1);
        let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render_interleaved(&mut processor, &mut mono, data, channels);
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|e| EngineError::Initialization(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| EngineError::Initialization(format!("failed to start output stream: {e}")))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                debug!(%err, "pausing stream before drop failed");
            }
            // Dropping the stream drops the callback and the processor with it.
            drop(stream);
        }
    }
}

/// Render mono through `scratch` and copy it to every channel of `data`.
pub fn render_interleaved(processor: &mut EngineProcessor, scratch: &mut [f32], data: &mut [f32], channels: usize) {
    let frames_per_chunk = scratch.len();
    for out in data.chunks_mut(frames_per_chunk * channels) {
        let frames = out.len() / channels;
        let mono = &mut scratch[..frames];
        processor.process(mono);

        for (frame, &sample) in out.chunks_mut(channels).zip(mono.iter()) {
            frame.fill(sample);
        }
    }
}

type SharedProcessor = Arc<Mutex<Option<EngineProcessor>>>;

fn lock(shared: &SharedProcessor) -> MutexGuard<'_, Option<EngineProcessor>> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Backend without a device. Rendering is pulled through `OfflineRenderer`.
pub struct OfflineBackend {
    sample_rate: f32,
    shared: SharedProcessor,
}

/// Pull side of an `OfflineBackend`.
#[derive(Clone)]
pub struct OfflineRenderer {
    shared: SharedProcessor,
}

impl OfflineBackend {
    pub fn new(sample_rate: f32) -> (Self, OfflineRenderer) {
        let shared: SharedProcessor = Arc::new(Mutex::new(None));
        let renderer = OfflineRenderer {
            shared: Arc::clone(&shared),
        };
        (Self { sample_rate, shared }, renderer)
    }
}

impl AudioBackend for OfflineBackend {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn start(&mut self, processor: EngineProcessor) -> Result<(), EngineError> {
        let mut slot = lock(&self.shared);
        if slot.is_none() {
            *slot = Some(processor);
        }
        Ok(())
    }

    fn stop(&mut self) {
        let processor = lock(&self.shared).take();
        drop(processor);
    }
}

impl OfflineRenderer {
    /// Render into `out`. Returns false (and writes silence) when no
    /// processor is running.
    pub fn render(&self, out: &mut [f32]) -> bool {
        match lock(&self.shared).as_mut() {
            Some(processor) => {
                processor.process(out);
                true
            }
            None => {
                out.fill(0.0);
                false
            }
        }
    }

    pub fn render_frames(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    /// Look at the processor's state between renders.
    pub fn inspect<R>(&self, f: impl FnOnce(&EngineProcessor) -> R) -> Option<R> {
        lock(&self.shared).as_ref().map(f)
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).is_some()
    }
}
