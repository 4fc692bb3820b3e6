use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crate::shared::{InputEvent, OverlayMode};
use super::mode::TuiState;

const VOLUME_STEP: f32 = 0.1;
const RATE_STEP: f32 = 0.1;
const INTERVAL_STEP_MS: i32 = 100;

// poll for input from the terminal and resolve it against the current overlay
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        // ctrl-c always gets you out
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(vec![InputEvent::Quit]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &TuiState) -> Vec<InputEvent> {
    match ts.overlay {
        OverlayMode::Notice => vec![InputEvent::DismissNotice],
        OverlayMode::TextEntry => resolve_text(code),
        OverlayMode::Grid => resolve_grid(code),
    }
}

// dialog / api key form: everything printable is text
fn resolve_text(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Cancel],
        KeyCode::Enter => vec![InputEvent::Submit],
        KeyCode::Backspace => vec![InputEvent::TextBackspace],
        KeyCode::Tab => vec![InputEvent::NextExample],
        KeyCode::Char(c) => vec![InputEvent::TextInput(c)],
        _ => vec![],
    }
}

fn resolve_grid(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],

        // cursor
        KeyCode::Left | KeyCode::Char('h') => vec![InputEvent::MoveCursor(-1, 0)],
        KeyCode::Right | KeyCode::Char('l') => vec![InputEvent::MoveCursor(1, 0)],
        KeyCode::Up | KeyCode::Char('k') => vec![InputEvent::MoveCursor(0, -1)],
        KeyCode::Down | KeyCode::Char('j') => vec![InputEvent::MoveCursor(0, 1)],
        KeyCode::Enter | KeyCode::Char(' ') => vec![InputEvent::TogglePad],

        // pad under the cursor
        KeyCode::Char('o') => vec![InputEvent::ToggleLoop],
        KeyCode::Char('[') => vec![InputEvent::NudgeVolume(-VOLUME_STEP)],
        KeyCode::Char(']') => vec![InputEvent::NudgeVolume(VOLUME_STEP)],
        KeyCode::Char('-') => vec![InputEvent::NudgeRate(-RATE_STEP)],
        KeyCode::Char('=') => vec![InputEvent::NudgeRate(RATE_STEP)],
        KeyCode::Char(',') => vec![InputEvent::NudgeInterval(-INTERVAL_STEP_MS)],
        KeyCode::Char('.') => vec![InputEvent::NudgeInterval(INTERVAL_STEP_MS)],
        KeyCode::Char('x') | KeyCode::Delete => vec![InputEvent::ClearPad],

        // board
        KeyCode::Char('9') => vec![InputEvent::NudgeMasterVolume(-VOLUME_STEP)],
        KeyCode::Char('0') => vec![InputEvent::NudgeMasterVolume(VOLUME_STEP)],
        KeyCode::Char('K') => vec![InputEvent::OpenSettings],
        KeyCode::Char('C') => vec![InputEvent::ClearAll],
        KeyCode::Char('E') => vec![InputEvent::ExportBoard],
        KeyCode::Char('I') => vec![InputEvent::ImportBoard],

        _ => vec![],
    }
}
