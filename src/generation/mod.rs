// Talking to the remote sound provider.
//
// A pad hands out a GenerationRequest, the GenerationWorker runs it off the UI thread
// and the result comes back as a GenerationOutcome for the pad to apply.

mod elevenlabs;
mod worker;

pub use elevenlabs::{ElevenLabsProvider, DEFAULT_ENDPOINT};
pub use worker::GenerationWorker;

use crate::audio::SampleBuffer;
use crate::errors::GenerationError;
use crate::shared::PadId;

// Something that turns a text prompt into an encoded audio payload.
pub trait SoundProvider: Send + Sync {
    fn generate(&self, api_key: &str, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

// A prompt on its way to the provider. `token` ties the answer back to the pad state that
// asked for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub pad: PadId,
    pub token: u64,
    pub prompt: String,
}

#[derive(Debug)]
pub struct GenerationOutcome {
    pub pad: PadId,
    pub token: u64,
    pub prompt: String,
    pub result: Result<SampleBuffer, GenerationError>,
}
