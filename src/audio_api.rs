pub use crate::audio::{SampleBuffer, SoundHandle};
use crate::shared::PadId;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayParams {
    pub pad: PadId,
    pub handle: SoundHandle,
    pub gain: f32, // already pad volume * master volume
    pub rate: f32,
    pub looping: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    // The engine can't decode anything (that would stall the callback), so the generation
    // worker hands over a ready buffer and the pad's handle for it.
    RegisterSample { pad: PadId, handle: SoundHandle, buffer: SampleBuffer },
    ReleaseSample { pad: PadId, handle: SoundHandle },

    // Restarts the pad's voice from frame 0.
    Play(PlayParams),
    Stop { pad: PadId },

    SetGain { pad: PadId, gain: f32 },
    SetRate { pad: PadId, rate: f32 },
    SetLooping { pad: PadId, looping: bool },
}

// Sent back from the audio thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Ended { pad: PadId, handle: SoundHandle },
}
