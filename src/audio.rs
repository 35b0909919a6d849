use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine::Engine;

/// Keep-alive handle for the cpal output stream. The callback pulls mono
/// samples from the shared engine and fans them out to every channel; the
/// stream shares the device with whatever else is playing.
pub struct AudioOutput {
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn new(engine: Arc<Mutex<Engine>>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device"))?;
        let config = device.default_output_config()?;
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut engine = engine.lock().unwrap();
                    for frame in data.chunks_mut(channels) {
                        let sample = engine.generate_sample();
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                // The TUI owns the terminal; a dropped buffer is not worth
                // corrupting the screen for.
                |_err| {},
                None,
            )?,
            other => return Err(anyhow!("unsupported sample format: {other}")),
        };

        stream.play()?;
        Ok(Self { _stream: stream })
    }
}
