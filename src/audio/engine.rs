use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, AudioEvent, PlayParams};
use crate::shared::{NUM_PADS, PadId};

use super::handle::SoundHandle;
use super::sample_buffer::{SampleBuffer, StereoFrame};
use super::voice::Voice;

// One channel per pad, fixed so nothing gets allocated per trigger in the audio callback.
#[derive(Default)]
struct PadChannel {
    sample: Option<(SoundHandle, SampleBuffer)>,
    voice: Option<Voice>,
}

impl PadChannel {
    fn handle(&self) -> Option<SoundHandle> {
        self.sample.as_ref().map(|(h, _)| *h)
    }
}

pub struct Engine {
    channels: [PadChannel; NUM_PADS],
    scratch: Vec<StereoFrame>,
    events_tx: Option<Sender<AudioEvent>>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| PadChannel::default()),
            scratch: Vec::with_capacity(8192),
            events_tx: None,
        }
    }

    pub fn set_events_tx(&mut self, tx: Sender<AudioEvent>) {
        self.events_tx = Some(tx);
    }

    fn channel_mut(&mut self, pad: PadId) -> Option<&mut PadChannel> {
        self.channels.get_mut(pad.index())
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { pad, handle, buffer } => {
                if let Some(ch) = self.channel_mut(pad) {
                    ch.voice = None;
                    ch.sample = Some((handle, buffer));
                }
            }
            AudioCommand::ReleaseSample { pad, handle } => {
                if let Some(ch) = self.channel_mut(pad) {
                    // a newer clip may already sit in this slot
                    if ch.handle() == Some(handle) {
                        ch.voice = None;
                        ch.sample = None;
                    }
                }
            }
            AudioCommand::Play(p) => self.play(p),
            AudioCommand::Stop { pad } => {
                if let Some(ch) = self.channel_mut(pad) {
                    if let Some(v) = ch.voice.as_mut() {
                        v.stop();
                    }
                }
            }
            AudioCommand::SetGain { pad, gain } => {
                if let Some(v) = self.channel_mut(pad).and_then(|ch| ch.voice.as_mut()) {
                    v.gain = gain;
                }
            }
            AudioCommand::SetRate { pad, rate } => {
                if let Some(v) = self.channel_mut(pad).and_then(|ch| ch.voice.as_mut()) {
                    v.rate = rate;
                }
            }
            AudioCommand::SetLooping { pad, looping } => {
                if let Some(v) = self.channel_mut(pad).and_then(|ch| ch.voice.as_mut()) {
                    v.looping = looping;
                }
            }
        }
    }

    fn play(&mut self, p: PlayParams) {
        let Some(ch) = self.channel_mut(p.pad) else {
            return;
        };
        if ch.handle() != Some(p.handle) {
            return; // stale trigger for a clip that's gone
        }
        match ch.voice.as_mut() {
            // reuse the slot, restart from the top
            Some(v) => {
                v.pos = 0.0;
                v.gain = p.gain;
                v.rate = p.rate;
                v.looping = p.looping;
                v.active = true;
            }
            None => ch.voice = Some(Voice::new(p.gain, p.rate, p.looping)),
        }
    }

    #[cfg(test)]
    pub fn is_playing(&self, pad: PadId) -> bool {
        self.channels
            .get(pad.index())
            .and_then(|ch| ch.voice.as_ref())
            .is_some_and(|v| v.active)
    }

    // Fill a stereo block with every active pad.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            let (Some((handle, buffer)), Some(voice)) = (ch.sample.as_ref(), ch.voice.as_mut()) else {
                continue;
            };
            if voice.render_into(buffer, out) {
                if let Some(tx) = &self.events_tx {
                    let _ = tx.try_send(AudioEvent::Ended { pad: PadId(idx as u8), handle: *handle });
                }
            }
        }
    }

    // Render straight into the device's interleaved buffer, whatever its channel count.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let n_frames = data.len() / channels;
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.resize(n_frames, StereoFrame::zero());
        self.render_block(&mut scratch);

        for (frame, out) in scratch.iter().zip(data.chunks_exact_mut(channels)) {
            if channels == 1 {
                out[0] = (frame.left + frame.right) * 0.5;
            } else {
                out[0] = frame.left;
                out[1] = frame.right;
                for extra in out.iter_mut().skip(2) {
                    *extra = 0.0;
                }
            }
        }
        self.scratch = scratch;
    }
}
