mod audio;
mod audio_api;
mod board;
mod config;
mod dialog;
mod errors;
mod generation;
mod loader;
mod logging;
mod middle;
mod pipeline;
mod shared;
mod tui;

use std::sync::Arc;
use std::time::Instant;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use config::AppConfig;
use generation::{ElevenLabsProvider, GenerationWorker};
use loader::SoundCache;
use middle::Middle;
use pipeline::settings::JsonFileStore;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    logging::setup_logger(&config.log_path)?;
    log::info!("padboard starting, settings at {}", config.settings_path.display());

    let audio = audio::start_audio()?;
    let provider = Arc::new(ElevenLabsProvider::new(config.endpoint.clone())?);
    let worker = GenerationWorker::new(
        provider,
        Some(SoundCache::new(config.cache_dir.clone())),
        audio.sample_rate(),
    );
    let store = JsonFileStore::open(config.settings_path.clone());
    let mut middle = Middle::new(Box::new(store), &config, audio.sample_rate());

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = middle.display_state();
        tui_state.overlay = ds.overlay.mode();

        term.draw(|frame| {
            let area = frame.area();
            tui::view::render(frame, area, &ds);
        })?;

        let events = tui::input::poll_input(tick_rate, &tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                log::info!("quitting");
                drop(term);
                drop(audio);
                return Ok(());
            }
            for cmd in middle.handle_input(event) {
                audio.send(cmd);
            }
        }

        // prompts submitted this frame go out to the worker
        for req in middle.take_requests() {
            worker.submit(req, middle.api_key());
        }
        while let Some(outcome) = worker.poll() {
            for cmd in middle.on_generation_complete(outcome) {
                audio.send(cmd);
            }
        }
        while let Some(event) = audio.poll_event() {
            middle.on_audio_event(event);
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        for cmd in middle.tick(elapsed) {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
