// The middle layer: owns the board, the cursor, the overlays and the api key. The tui feeds
// it InputEvents and renders whatever display_state() says; the main loop ferries audio
// commands to the engine and generation requests to the worker.
use std::path::PathBuf;

use crate::audio_api::{AudioCommand, AudioEvent};
use crate::board::pad::{MAX_REPEAT_INTERVAL_MS, MAX_RATE, MIN_RATE};
use crate::board::{Board, GenerationApplied, Toggle};
use crate::config::AppConfig;
use crate::dialog::{ApiKeyForm, GenerationDialog, EXAMPLE_PROMPTS};
use crate::generation::{GenerationOutcome, GenerationRequest};
use crate::loader::SoundCache;
use crate::pipeline::persistence;
use crate::pipeline::settings::{resolve_api_key, KeyValueStore, API_KEY_SETTING};
use crate::shared::{DisplayState, InputEvent, Overlay, PadId, GRID_COLS, GRID_ROWS};

pub struct Middle {
    pub board: Board,
    cursor: PadId,
    dialog: GenerationDialog,
    api_form: ApiKeyForm,
    notice: Option<String>,
    status_text: String,
    store: Box<dyn KeyValueStore>,
    api_key: Option<String>,
    pending: Vec<GenerationRequest>,
    board_path: PathBuf,
    cache: SoundCache,
    sample_rate: u32,
}

impl Middle {
    pub fn new(store: Box<dyn KeyValueStore>, config: &AppConfig, sample_rate: u32) -> Self {
        let api_key = resolve_api_key(store.as_ref(), config.api_key_override.as_deref());
        if api_key.is_none() {
            log::info!("no API key configured yet");
        }
        Self {
            board: Board::new(),
            cursor: PadId(0),
            dialog: GenerationDialog::default(),
            api_form: ApiKeyForm::default(),
            notice: None,
            status_text: String::from("ready"),
            store,
            api_key,
            pending: Vec::new(),
            board_path: config.board_path.clone(),
            cache: SoundCache::new(config.cache_dir.clone()),
            sample_rate,
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> PadId {
        self.cursor
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    // generation requests waiting to be handed to the worker
    pub fn take_requests(&mut self) -> Vec<GenerationRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        // a notice blocks everything until it's dismissed
        if self.notice.is_some() {
            if event == InputEvent::DismissNotice || event == InputEvent::Cancel || event == InputEvent::Submit {
                self.notice = None;
            }
            return vec![];
        }
        if self.api_form.is_open() {
            self.handle_api_form(event);
            return vec![];
        }
        if self.dialog.is_open() {
            self.handle_dialog(event);
            return vec![];
        }
        self.handle_grid(event)
    }

    fn handle_grid(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        let cursor = self.cursor;
        let master = self.board.master_volume();
        match event {
            InputEvent::MoveCursor(dx, dy) => {
                let row = (cursor.row() as i32 + dy as i32).clamp(0, GRID_ROWS as i32 - 1) as usize;
                let col = (cursor.col() as i32 + dx as i32).clamp(0, GRID_COLS as i32 - 1) as usize;
                if let Some(id) = PadId::from_row_col(row, col) {
                    self.cursor = id;
                }
                vec![]
            }
            InputEvent::TogglePad => match self.board.toggle(cursor) {
                Some(Toggle::OpenDialog) => {
                    self.dialog.open(cursor);
                    vec![]
                }
                Some(Toggle::Commands(cmds)) => cmds,
                None => vec![],
            },
            InputEvent::ToggleLoop => self.with_loaded_pad(|p, _| {
                let looping = !p.is_looping();
                p.set_looping(looping)
            }),
            InputEvent::NudgeVolume(delta) => {
                self.with_loaded_pad(|p, master| p.set_volume(step(p.volume() + delta, 0.0, 1.0), master))
            }
            InputEvent::NudgeRate(delta) => {
                self.with_loaded_pad(|p, _| p.set_playback_rate(step(p.playback_rate() + delta, MIN_RATE, MAX_RATE)))
            }
            InputEvent::NudgeInterval(delta) => self.with_loaded_pad(|p, _| {
                let ms = (p.repeat_interval_ms() as i64 + delta as i64).clamp(0, MAX_REPEAT_INTERVAL_MS as i64);
                p.set_repeat_interval_ms(ms as u32)
            }),
            InputEvent::ClearPad => {
                let cmds = self.board.pad_mut(cursor).map(|p| p.clear()).unwrap_or_default();
                if !cmds.is_empty() {
                    self.status_text = format!("cleared pad {}", cursor.0 + 1);
                }
                cmds
            }
            InputEvent::NudgeMasterVolume(delta) => self.board.set_master_volume(step(master + delta, 0.0, 1.0)),
            InputEvent::OpenSettings => {
                self.api_form.open(self.store.get(API_KEY_SETTING));
                vec![]
            }
            InputEvent::ClearAll => {
                self.dialog.close();
                self.status_text = String::from("cleared all sounds");
                self.board.clear_all()
            }
            InputEvent::ExportBoard => {
                self.export_board();
                vec![]
            }
            InputEvent::ImportBoard => self.import_board(),
            _ => vec![],
        }
    }

    fn with_loaded_pad(
        &mut self,
        f: impl FnOnce(&mut crate::board::Pad, f32) -> Vec<AudioCommand>,
    ) -> Vec<AudioCommand> {
        let master = self.board.master_volume();
        match self.board.pad_mut(self.cursor) {
            Some(p) if p.has_sound() => f(p, master),
            _ => vec![],
        }
    }

    fn handle_dialog(&mut self, event: InputEvent) {
        let Some(pad) = self.dialog.pad() else {
            return;
        };
        let in_flight = self.board.pad(pad).is_some_and(|p| p.is_generating());
        match event {
            InputEvent::TextInput(c) => self.dialog.push_char(c),
            InputEvent::TextBackspace => self.dialog.backspace(),
            InputEvent::NextExample => self.dialog.next_example(),
            InputEvent::Submit => {
                let Some(prompt) = self.dialog.submit(in_flight) else {
                    return;
                };
                if let Some(req) = self.board.pad_mut(pad).and_then(|p| p.begin_generation(&prompt)) {
                    self.status_text = format!("generating pad {}...", pad.0 + 1);
                    self.pending.push(req);
                }
            }
            // closing doesn't cancel a request that's already out
            InputEvent::Cancel => self.dialog.close(),
            _ => {}
        }
    }

    fn handle_api_form(&mut self, event: InputEvent) {
        match event {
            InputEvent::TextInput(c) => self.api_form.push_char(c),
            InputEvent::TextBackspace => self.api_form.backspace(),
            InputEvent::Submit => {
                let Some(key) = self.api_form.take() else {
                    return;
                };
                match self.store.set(API_KEY_SETTING, &key) {
                    Ok(()) => {
                        // picked up by every request from now on, no restart needed
                        self.api_key = Some(key);
                        self.status_text = String::from("API key saved");
                        log::info!("API key updated");
                    }
                    Err(e) => {
                        log::error!("could not save API key: {e}");
                        self.notice = Some(format!("Could not save API key: {e}"));
                    }
                }
            }
            InputEvent::Cancel => self.api_form.close(),
            _ => {}
        }
    }

    pub fn on_generation_complete(&mut self, outcome: GenerationOutcome) -> Vec<AudioCommand> {
        let pad = outcome.pad;
        let Some(p) = self.board.pad_mut(pad) else {
            return vec![];
        };
        match p.finish_generation(outcome) {
            GenerationApplied::Loaded(cmds) => {
                if self.dialog.pad() == Some(pad) {
                    self.dialog.on_generated();
                }
                self.status_text = format!("pad {} loaded", pad.0 + 1);
                cmds
            }
            GenerationApplied::Failed(e) => {
                self.notice = Some(format!("Failed to generate sound. Please try again.\n{e}"));
                self.status_text = format!("pad {} generation failed", pad.0 + 1);
                vec![]
            }
            GenerationApplied::Stale => {
                log::debug!("dropping stale generation result for pad {}", pad.0);
                vec![]
            }
        }
    }

    pub fn on_audio_event(&mut self, event: AudioEvent) {
        self.board.on_audio_event(event);
    }

    pub fn tick(&mut self, elapsed_secs: f64) -> Vec<AudioCommand> {
        self.board.tick(elapsed_secs * 1000.0)
    }

    fn export_board(&mut self) {
        let file = self.board.export();
        match persistence::save_board(&self.board_path, &file) {
            Ok(()) => self.status_text = format!("exported to {}", self.board_path.display()),
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.notice = Some(format!("Could not export board: {e}"));
            }
        }
    }

    // Parse first; the board is only touched once the file is known to be good.
    fn import_board(&mut self) -> Vec<AudioCommand> {
        let file = match persistence::load_board(&self.board_path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("import failed: {e}");
                self.notice = Some(format!("Could not import board: {e}"));
                return vec![];
            }
        };

        self.dialog.close();
        let mut cmds = self.board.clear_all();
        let (mut restored, mut queued) = (0, 0);
        for (idx, square) in file.squares.into_iter().enumerate() {
            let Some(square) = square else { continue };
            let id = PadId(idx as u8);
            match self.cache.load(&square.prompt, self.sample_rate) {
                Ok(Some(buffer)) => {
                    cmds.extend(self.board.load_sound(id, &square.prompt, buffer));
                    restored += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => log::warn!("cached sound for {:?} unreadable: {e}", square.prompt),
            }
            if let Some(req) = self.board.pad_mut(id).and_then(|p| p.begin_generation(&square.prompt)) {
                self.pending.push(req);
                queued += 1;
            }
        }
        self.status_text = format!("imported board: {restored} from cache, {queued} regenerating");
        log::info!("{}", self.status_text);
        cmds
    }

    pub fn display_state(&self) -> DisplayState {
        let overlay = if let Some(text) = &self.notice {
            Overlay::Notice(text.clone())
        } else if self.api_form.is_open() {
            Overlay::ApiKey { masked: self.api_form.masked(), can_save: self.api_form.can_save() }
        } else if let Some(pad) = self.dialog.pad() {
            let in_flight = self.board.pad(pad).is_some_and(|p| p.is_generating());
            Overlay::Generate {
                pad,
                draft: self.dialog.draft().to_string(),
                examples: &EXAMPLE_PROMPTS,
                selected_example: self.dialog.selected_example(),
                in_flight,
                can_submit: self.dialog.can_submit(in_flight),
            }
        } else {
            Overlay::None
        };

        DisplayState {
            pads: self.board.pads().iter().map(|p| p.view()).collect(),
            cursor: self.cursor,
            master_volume: self.board.master_volume(),
            api_key_set: self.api_key.is_some(),
            overlay,
            status_text: self.status_text.clone(),
        }
    }
}

// slider-style steps: snap to hundredths so repeated nudges don't drift
fn step(value: f32, min: f32, max: f32) -> f32 {
    ((value * 100.0).round() / 100.0).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SampleBuffer, StereoFrame};
    use crate::errors::GenerationError;
    use crate::pipeline::board_file::{BoardFile, Square};
    use crate::pipeline::settings::MemoryStore;

    fn config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            board_path: dir.join("board.json"),
            settings_path: dir.join("settings.json"),
            cache_dir: dir.join("sounds"),
            log_path: dir.join("padboard.log"),
            endpoint: String::from("http://localhost"),
            api_key_override: None,
        }
    }

    fn middle(dir: &std::path::Path) -> Middle {
        Middle::new(Box::new(MemoryStore::default()), &config(dir), 44100)
    }

    fn clip() -> SampleBuffer {
        SampleBuffer::new(vec![StereoFrame::mono(0.3); 64])
    }

    fn type_text(m: &mut Middle, text: &str) {
        for c in text.chars() {
            m.handle_input(InputEvent::TextInput(c));
        }
    }

    fn complete_ok(m: &mut Middle, req: GenerationRequest) -> Vec<AudioCommand> {
        m.on_generation_complete(GenerationOutcome {
            pad: req.pad,
            token: req.token,
            prompt: req.prompt,
            result: Ok(clip()),
        })
    }

    #[test]
    fn empty_pad_opens_dialog_and_submits() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        m.handle_input(InputEvent::MoveCursor(2, 2));
        assert_eq!(m.cursor(), PadId(12));

        assert!(m.handle_input(InputEvent::TogglePad).is_empty());
        assert!(matches!(m.display_state().overlay, Overlay::Generate { pad: PadId(12), can_submit: false, .. }));

        m.handle_input(InputEvent::Submit); // blank, nothing happens
        assert!(m.take_requests().is_empty());

        type_text(&mut m, "A cheerful chime sound");
        m.handle_input(InputEvent::Submit);
        let reqs = m.take_requests();
        assert_eq!(reqs.len(), 1);
        assert!(matches!(m.display_state().overlay, Overlay::Generate { in_flight: true, can_submit: false, .. }));

        let cmds = complete_ok(&mut m, reqs.into_iter().next().unwrap());
        assert_eq!(cmds.len(), 1);
        let ds = m.display_state();
        assert_eq!(ds.overlay, Overlay::None);
        assert!(ds.pads[12].loaded);
        assert_eq!(ds.pads.iter().filter(|p| p.loaded).count(), 1);
    }

    #[test]
    fn failure_shows_notice_and_keeps_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        m.handle_input(InputEvent::TogglePad);
        m.handle_input(InputEvent::NextExample);
        m.handle_input(InputEvent::Submit);
        let req = m.take_requests().pop().unwrap();
        assert_eq!(req.prompt, EXAMPLE_PROMPTS[0]);

        m.on_generation_complete(GenerationOutcome {
            pad: req.pad,
            token: req.token,
            prompt: req.prompt,
            result: Err(GenerationError::Status { status: 401 }),
        });
        assert!(matches!(m.display_state().overlay, Overlay::Notice(_)));
        assert!(!m.display_state().pads[0].loaded);

        // notice eats input until dismissed
        m.handle_input(InputEvent::TextInput('x'));
        m.handle_input(InputEvent::DismissNotice);
        assert!(matches!(m.display_state().overlay, Overlay::Generate { ref draft, .. } if draft == EXAMPLE_PROMPTS[0]));
    }

    #[test]
    fn loaded_pad_controls() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        let req = m.board.pad_mut(PadId(0)).unwrap().begin_generation("beep").unwrap();
        complete_ok(&mut m, req);

        let cmds = m.handle_input(InputEvent::NudgeVolume(-0.1));
        assert!(matches!(cmds.as_slice(), [AudioCommand::SetGain { .. }]));
        assert_eq!(m.display_state().pads[0].volume, 0.9);

        for _ in 0..20 {
            m.handle_input(InputEvent::NudgeRate(0.1));
        }
        assert_eq!(m.display_state().pads[0].playback_rate, MAX_RATE);

        m.handle_input(InputEvent::NudgeInterval(-100));
        assert_eq!(m.display_state().pads[0].repeat_interval_ms, 0);
        m.handle_input(InputEvent::NudgeInterval(300));
        assert_eq!(m.display_state().pads[0].repeat_interval_ms, 300);

        m.handle_input(InputEvent::ToggleLoop);
        assert!(m.display_state().pads[0].looping);

        let cmds = m.handle_input(InputEvent::TogglePad);
        assert!(matches!(cmds.as_slice(), [AudioCommand::Play(_)]));
        assert!(m.tick(0.31).iter().any(|c| matches!(c, AudioCommand::Play(_))));

        let cmds = m.handle_input(InputEvent::ClearPad);
        assert_eq!(cmds.len(), 2);
        assert!(m.tick(10.0).is_empty());
    }

    #[test]
    fn controls_ignore_empty_pads() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        assert!(m.handle_input(InputEvent::NudgeVolume(-0.5)).is_empty());
        assert_eq!(m.display_state().pads[0].volume, 1.0);
    }

    #[test]
    fn master_volume_nudges() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        for _ in 0..3 {
            m.handle_input(InputEvent::NudgeMasterVolume(-0.1));
        }
        assert!((m.display_state().master_volume - 0.7).abs() < 1e-6);
        for _ in 0..12 {
            m.handle_input(InputEvent::NudgeMasterVolume(-0.1));
        }
        assert_eq!(m.display_state().master_volume, 0.0);
    }

    #[test]
    fn saving_api_key_takes_effect_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        assert_eq!(m.api_key(), None);
        assert!(!m.display_state().api_key_set);

        m.handle_input(InputEvent::OpenSettings);
        m.handle_input(InputEvent::Submit); // empty, can't save
        assert!(matches!(m.display_state().overlay, Overlay::ApiKey { can_save: false, .. }));
        type_text(&mut m, "sk-live");
        assert!(matches!(m.display_state().overlay, Overlay::ApiKey { ref masked, .. } if masked.chars().count() == 7));
        m.handle_input(InputEvent::Submit);

        assert_eq!(m.api_key().as_deref(), Some("sk-live"));
        assert_eq!(m.display_state().overlay, Overlay::None);
    }

    #[test]
    fn whitespace_api_key_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        m.handle_input(InputEvent::OpenSettings);
        type_text(&mut m, "   ");
        m.handle_input(InputEvent::Submit);

        assert_eq!(m.api_key(), None);
        assert!(!m.display_state().api_key_set);
        assert!(matches!(m.display_state().overlay, Overlay::ApiKey { can_save: false, .. }));
    }

    #[test]
    fn export_then_import_restores_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        let req = m.board.pad_mut(PadId(6)).unwrap().begin_generation("A deep bass drum hit").unwrap();
        complete_ok(&mut m, req);
        m.cache.store("A deep bass drum hit", &clip(), 44100).unwrap();
        let req = m.board.pad_mut(PadId(9)).unwrap().begin_generation("Not cached yet").unwrap();
        complete_ok(&mut m, req);

        m.handle_input(InputEvent::ExportBoard);
        m.handle_input(InputEvent::ClearAll);
        assert!(m.display_state().pads.iter().all(|p| !p.loaded));

        let cmds = m.handle_input(InputEvent::ImportBoard);
        assert!(cmds.iter().any(|c| matches!(c, AudioCommand::RegisterSample { pad, .. } if *pad == PadId(6))));
        let ds = m.display_state();
        assert!(ds.pads[6].loaded);
        assert!(ds.pads[9].generating);
        let reqs = m.take_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].prompt, "Not cached yet");
    }

    #[test]
    fn bad_import_leaves_board_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        let req = m.board.pad_mut(PadId(1)).unwrap().begin_generation("keep me").unwrap();
        complete_ok(&mut m, req);

        std::fs::write(dir.path().join("board.json"), r#"{"version":"1.0","squares":[]}"#).unwrap();
        assert!(m.handle_input(InputEvent::ImportBoard).is_empty());
        let ds = m.display_state();
        assert!(matches!(ds.overlay, Overlay::Notice(_)));
        assert!(ds.pads[1].loaded);
    }

    #[test]
    fn clear_all_drops_in_flight_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        let req = m.board.pad_mut(PadId(2)).unwrap().begin_generation("late").unwrap();
        m.handle_input(InputEvent::ClearAll);
        assert!(complete_ok(&mut m, req).is_empty());
        assert!(!m.display_state().pads[2].loaded);
    }

    #[test]
    fn exported_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = middle(dir.path());
        let req = m.board.pad_mut(PadId(0)).unwrap().begin_generation("A robotic beep sequence").unwrap();
        complete_ok(&mut m, req);
        m.handle_input(InputEvent::ExportBoard);

        let file = persistence::load_board(&dir.path().join("board.json")).unwrap();
        let mut expected = vec![None; 25];
        expected[0] = Some(Square { prompt: "A robotic beep sequence".into(), sound_name: "A robotic beep seque...".into() });
        assert_eq!(file, BoardFile::new(expected));
    }
}
