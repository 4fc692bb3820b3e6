use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, AudioEvent};

mod engine;
mod handle;
mod sample_buffer;
mod voice;

pub use handle::{next_handle, SoundHandle};
pub use sample_buffer::{SampleBuffer, StereoFrame};

use engine::Engine;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    events_rx: Receiver<AudioEvent>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }

    pub fn poll_event(&self) -> Option<AudioEvent> {
        self.events_rx.try_recv().ok()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (events_tx, events_rx) = crossbeam_channel::bounded::<AudioEvent>(256);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    log::info!("starting audio output ({} ch @ {} Hz)", channels, sample_rate);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, events_tx, channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                events_rx,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    events_tx: Sender<AudioEvent>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    engine.set_events_tx(events_tx);

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            engine.render_interleaved(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
