// Error types for the pieces that can fail without taking the app down.

use thiserror::Error;

// Anything that goes wrong between submitting a prompt and having a playable clip.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (press K to set one)")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("sound provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("sound provider returned an empty response")]
    EmptyResponse,

    #[error("could not decode audio: {0}")]
    Decode(String),
}

impl From<symphonia::core::errors::Error> for GenerationError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        GenerationError::Decode(err.to_string())
    }
}

// A board file that can't be imported. The board is left as it was.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read board file: {0}")]
    Io(#[from] std::io::Error),

    #[error("board file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported board version {0:?}")]
    Version(String),

    #[error("board must have {expected} squares, found {found}")]
    SquareCount { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
