// One pad: its clip, its playback state and the settings that shape playback.
//
// Every operation returns the AudioCommands the engine has to apply; the pad itself never
// touches the audio thread. Effective gain is always `volume * master`, and `master` is
// passed in by the board on every call that can produce a gain.

use crate::audio::{next_handle, SampleBuffer, SoundHandle};
use crate::audio_api::{AudioCommand, PlayParams};
use crate::errors::GenerationError;
use crate::generation::{GenerationOutcome, GenerationRequest};
use crate::shared::{PadId, PadView};

use super::repeat::{RepeatPolicy, RepeatTimer};

pub const LABEL_MAX_CHARS: usize = 20;
pub const DEFAULT_VOLUME: f32 = 1.0;
pub const DEFAULT_RATE: f32 = 1.0;
pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;
pub const MAX_REPEAT_INTERVAL_MS: u32 = 5000;

#[derive(Clone, Debug)]
struct LoadedSound {
    handle: SoundHandle,
    label: String,
    prompt: String,
}

// What pressing a pad does.
#[derive(Debug, PartialEq)]
pub enum Toggle {
    OpenDialog,
    Commands(Vec<AudioCommand>),
}

// What happened when a generation result came back.
#[derive(Debug)]
pub enum GenerationApplied {
    Loaded(Vec<AudioCommand>),
    Failed(GenerationError),
    // The pad was cleared (or asked again) after this request went out.
    Stale,
}

#[derive(Clone, Debug)]
pub struct Pad {
    id: PadId,
    sound: Option<LoadedSound>,
    playing: bool,
    looping: bool,
    volume: f32,
    playback_rate: f32,
    repeat_interval_ms: u32,
    pending_repeat: Option<RepeatTimer>,
    in_flight: Option<u64>,
    next_token: u64,
}

impl Pad {
    pub fn new(id: PadId) -> Self {
        Self {
            id,
            sound: None,
            playing: false,
            looping: false,
            volume: DEFAULT_VOLUME,
            playback_rate: DEFAULT_RATE,
            repeat_interval_ms: 0,
            pending_repeat: None,
            in_flight: None,
            next_token: 0,
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> PadId {
        self.id
    }

    pub fn has_sound(&self) -> bool {
        self.sound.is_some()
    }

    pub fn handle(&self) -> Option<SoundHandle> {
        self.sound.as_ref().map(|s| s.handle)
    }

    pub fn label(&self) -> &str {
        self.sound.as_ref().map(|s| s.label.as_str()).unwrap_or("")
    }

    pub fn prompt(&self) -> Option<&str> {
        self.sound.as_ref().map(|s| s.prompt.as_str())
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn repeat_interval_ms(&self) -> u32 {
        self.repeat_interval_ms
    }

    #[cfg(test)]
    pub fn has_pending_repeat(&self) -> bool {
        self.pending_repeat.is_some()
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        RepeatPolicy::resolve(self.looping, self.repeat_interval_ms)
    }

    pub fn effective_volume(&self, master: f32) -> f32 {
        self.volume * master
    }

    // ── generation ─────────────────────────────────────────────────

    // Blank prompts (after trimming) are ignored, as is a second request while one is
    // already out for this pad.
    pub fn begin_generation(&mut self, prompt: &str) -> Option<GenerationRequest> {
        let prompt = prompt.trim();
        if prompt.is_empty() || self.in_flight.is_some() {
            return None;
        }
        self.next_token += 1;
        self.in_flight = Some(self.next_token);
        Some(GenerationRequest {
            pad: self.id,
            token: self.next_token,
            prompt: prompt.to_string(),
        })
    }

    pub fn finish_generation(&mut self, outcome: GenerationOutcome) -> GenerationApplied {
        if self.in_flight != Some(outcome.token) {
            return GenerationApplied::Stale;
        }
        self.in_flight = None;
        match outcome.result {
            Ok(buffer) => GenerationApplied::Loaded(self.load_sound(&outcome.prompt, buffer)),
            // failure leaves whatever was here before
            Err(e) => GenerationApplied::Failed(e),
        }
    }

    // Install a clip, replacing (and releasing) any current one. The new clip starts out
    // stopped.
    pub fn load_sound(&mut self, prompt: &str, buffer: SampleBuffer) -> Vec<AudioCommand> {
        let mut cmds = self.release();
        let handle = next_handle();
        cmds.push(AudioCommand::RegisterSample { pad: self.id, handle, buffer });
        self.sound = Some(LoadedSound {
            handle,
            label: truncate_label(prompt),
            prompt: prompt.to_string(),
        });
        cmds
    }

    // ── playback ───────────────────────────────────────────────────

    pub fn toggle_playback(&mut self, master: f32) -> Toggle {
        if self.sound.is_none() {
            return Toggle::OpenDialog;
        }
        if self.playing {
            Toggle::Commands(self.stop())
        } else {
            Toggle::Commands(self.play(master))
        }
    }

    // Start from the top. Under a fixed-delay policy this also arms the next restart.
    pub fn play(&mut self, master: f32) -> Vec<AudioCommand> {
        let Some(sound) = &self.sound else {
            return Vec::new();
        };
        let policy = self.repeat_policy();
        self.playing = true;
        self.pending_repeat = match policy {
            RepeatPolicy::FixedDelay(ms) => Some(RepeatTimer::new(ms)),
            _ => None,
        };
        vec![AudioCommand::Play(PlayParams {
            pad: self.id,
            handle: sound.handle,
            gain: self.effective_volume(master),
            rate: self.playback_rate,
            looping: policy.engine_loops(),
        })]
    }

    pub fn stop(&mut self) -> Vec<AudioCommand> {
        self.pending_repeat = None;
        self.playing = false;
        if self.sound.is_some() {
            vec![AudioCommand::Stop { pad: self.id }]
        } else {
            Vec::new()
        }
    }

    // Back to a freshly created pad: clip released, settings at their defaults and any
    // request still in flight disowned.
    pub fn clear(&mut self) -> Vec<AudioCommand> {
        let cmds = self.release();
        let next_token = self.next_token;
        *self = Pad::new(self.id);
        self.next_token = next_token; // tokens keep counting so old answers stay stale
        cmds
    }

    fn release(&mut self) -> Vec<AudioCommand> {
        let mut cmds = self.stop();
        if let Some(sound) = self.sound.take() {
            cmds.push(AudioCommand::ReleaseSample { pad: self.id, handle: sound.handle });
        }
        cmds
    }

    // Advance the repeat timer; a due restart replays the clip (and re-arms).
    pub fn tick(&mut self, elapsed_ms: f64, master: f32) -> Vec<AudioCommand> {
        let due = match self.pending_repeat.as_mut() {
            Some(timer) => timer.advance(elapsed_ms),
            None => false,
        };
        if due {
            self.pending_repeat = None;
            self.play(master)
        } else {
            Vec::new()
        }
    }

    // The engine ran off the end of the clip. A pad only stays "playing" while a restart
    // is actually armed; switching from loop to an interval mid-play leaves nothing armed.
    pub fn on_playback_ended(&mut self, handle: SoundHandle) {
        if self.handle() != Some(handle) {
            return;
        }
        if self.repeat_policy() == RepeatPolicy::None || self.pending_repeat.is_none() {
            self.playing = false;
        }
    }

    // ── settings ───────────────────────────────────────────────────

    pub fn set_looping(&mut self, looping: bool) -> Vec<AudioCommand> {
        self.looping = looping;
        self.sync_engine_looping()
    }

    pub fn set_volume(&mut self, volume: f32, master: f32) -> Vec<AudioCommand> {
        if volume.is_nan() {
            return Vec::new();
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.gain_update(master)
    }

    pub fn set_playback_rate(&mut self, rate: f32) -> Vec<AudioCommand> {
        if rate.is_nan() {
            return Vec::new();
        }
        self.playback_rate = rate.clamp(MIN_RATE, MAX_RATE);
        if self.sound.is_some() {
            vec![AudioCommand::SetRate { pad: self.id, rate: self.playback_rate }]
        } else {
            Vec::new()
        }
    }

    // Changing the interval only cancels the pending restart. The new interval takes
    // effect from the next play.
    pub fn set_repeat_interval_ms(&mut self, ms: u32) -> Vec<AudioCommand> {
        self.repeat_interval_ms = ms.min(MAX_REPEAT_INTERVAL_MS);
        self.pending_repeat = None;
        self.sync_engine_looping()
    }

    // Recompute the engine gain, playing or not.
    pub fn gain_update(&self, master: f32) -> Vec<AudioCommand> {
        if self.sound.is_some() {
            vec![AudioCommand::SetGain { pad: self.id, gain: self.effective_volume(master) }]
        } else {
            Vec::new()
        }
    }

    fn sync_engine_looping(&self) -> Vec<AudioCommand> {
        if self.sound.is_some() {
            vec![AudioCommand::SetLooping { pad: self.id, looping: self.repeat_policy().engine_loops() }]
        } else {
            Vec::new()
        }
    }

    pub fn view(&self) -> PadView {
        PadView {
            loaded: self.has_sound(),
            label: self.label().to_string(),
            playing: self.playing,
            looping: self.looping,
            generating: self.is_generating(),
            volume: self.volume,
            playback_rate: self.playback_rate,
            repeat_interval_ms: self.repeat_interval_ms,
        }
    }
}

// First 20 characters of the prompt, with "..." when something was cut.
pub fn truncate_label(prompt: &str) -> String {
    if prompt.chars().count() > LABEL_MAX_CHARS {
        let head: String = prompt.chars().take(LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        prompt.to_string()
    }
}
