// Where things live and which endpoint to talk to.
//
// Args: `padboard [board.json]` (the file used by export/import, default `./board.json`).
// Env: `ELEVENLABS_API_KEY` overrides the stored key, `PADBOARD_ENDPOINT` overrides the
// generation endpoint, `PADBOARD_DATA_DIR` moves settings, cache and log into one directory.

use std::path::PathBuf;

use crate::generation::DEFAULT_ENDPOINT;

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
pub const ENDPOINT_ENV: &str = "PADBOARD_ENDPOINT";
pub const DATA_DIR_ENV: &str = "PADBOARD_DATA_DIR";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub board_path: PathBuf,
    pub settings_path: PathBuf,
    pub cache_dir: PathBuf,
    pub log_path: PathBuf,
    pub endpoint: String,
    pub api_key_override: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::build(
            std::env::args().nth(1),
            |key| std::env::var(key).ok(),
            project_dirs(),
        )
    }

    fn build(
        board_arg: Option<String>,
        env: impl Fn(&str) -> Option<String>,
        dirs: Option<(PathBuf, PathBuf)>,
    ) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let (config_dir, data_dir) = match non_empty(DATA_DIR_ENV) {
            Some(dir) => (PathBuf::from(&dir), PathBuf::from(dir)),
            None => dirs.unwrap_or_else(|| (PathBuf::from("."), PathBuf::from("."))),
        };

        Self {
            board_path: board_arg.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("board.json")),
            settings_path: config_dir.join("settings.json"),
            cache_dir: data_dir.join("sounds"),
            log_path: data_dir.join("padboard.log"),
            endpoint: non_empty(ENDPOINT_ENV).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key_override: non_empty(API_KEY_ENV),
        }
    }
}

// (config dir, data dir)
fn project_dirs() -> Option<(PathBuf, PathBuf)> {
    directories::ProjectDirs::from("dev", "padboard", "padboard")
        .map(|d| (d.config_dir().to_path_buf(), d.data_dir().to_path_buf()))
}
