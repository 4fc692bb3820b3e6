pub mod board_file;
pub mod persistence;
pub mod settings;
