use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target};

// The tui owns stdout/stderr, so logs go to a file. Default level is `info`, override with
// RUST_LOG (e.g. RUST_LOG=debug when chasing a decode problem).
pub fn setup_logger(log_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .unwrap_or(()); // already initialised
    Ok(())
}
