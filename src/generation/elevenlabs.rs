use std::time::Duration;

use serde::Serialize;

use super::SoundProvider;
use crate::errors::GenerationError;

pub const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io/v1/sound-generation";

#[derive(Serialize)]
struct SoundGenerationBody<'a> {
    text: &'a str,
}

pub struct ElevenLabsProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl ElevenLabsProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

impl SoundProvider for ElevenLabsProvider {
    fn generate(&self, api_key: &str, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        log::info!("requesting sound generation ({} chars)", prompt.chars().count());
        let response = self
            .client
            .post(&self.endpoint)
            .header("xi-api-key", api_key)
            .json(&SoundGenerationBody { text: prompt })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("sound generation failed with HTTP {}", status.as_u16());
            return Err(GenerationError::Status { status: status.as_u16() });
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        log::debug!("received {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }
}
