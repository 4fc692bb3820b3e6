// The exported board. Only prompts and labels go in here, the audio itself lives in the
// sound cache (or gets generated again on import).
//
// { "version": "1.0", "squares": [ { "prompt": ..., "soundName": ... } | null, ... x25 ] }

use serde::{Deserialize, Serialize};

use crate::errors::ImportError;
use crate::shared::NUM_PADS;

pub const BOARD_FILE_VERSION: &str = "1.0";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub prompt: String,
    #[serde(rename = "soundName")]
    pub sound_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardFile {
    pub version: String,
    pub squares: Vec<Option<Square>>,
}

impl BoardFile {
    pub fn new(squares: Vec<Option<Square>>) -> Self {
        Self { version: BOARD_FILE_VERSION.to_string(), squares }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    // Validates version and square count, nothing on the board changes until this is Ok.
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        let file: BoardFile = serde_json::from_str(json)?;
        if file.version != BOARD_FILE_VERSION {
            return Err(ImportError::Version(file.version));
        }
        if file.squares.len() != NUM_PADS {
            return Err(ImportError::SquareCount { expected: NUM_PADS, found: file.squares.len() });
        }
        Ok(file)
    }
}
