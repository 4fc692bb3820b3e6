// Reading and writing board files. Called from the export/import keys, nothing is saved
// implicitly.
use std::path::Path;

use crate::errors::ImportError;
use crate::pipeline::board_file::BoardFile;

pub fn load_board(path: &Path) -> Result<BoardFile, ImportError> {
    let data = std::fs::read_to_string(path)?;
    BoardFile::parse(&data)
}

// Save the board, making parent dirs if they don't exist already
pub fn save_board(path: &Path, board: &BoardFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = board.to_json()?;
    std::fs::write(path, json)?;
    log::info!("exported board to {}", path.display());
    Ok(())
}
