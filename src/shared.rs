// The current input plan:
//
// Grid cursor (the 25 pads, 5x5):
//   arrows / h j k l      //  MoveCursor(dx, dy)
//   Enter / Space         //  TogglePad (opens the generation dialog on an empty pad)
//
// Pad controls (act on the pad under the cursor):
//   o                     //  ToggleLoop
//   [ / ]                 //  NudgeVolume(-0.1 / +0.1)
//   - / =                 //  NudgeRate(-0.1 / +0.1)
//   , / .                 //  NudgeInterval(-100 / +100)
//   x / Delete            //  ClearPad
//
// Board controls:
//   9 / 0                 //  NudgeMasterVolume(-0.1 / +0.1)
//   K                     //  OpenSettings (api key)
//   C                     //  ClearAll
//   E / I                 //  ExportBoard / ImportBoard
//   Esc                   //  Quit
//
// While an overlay is up the tui switches to text entry: printable keys become TextInput,
// Tab cycles example prompts, Enter submits, Esc cancels. A notice eats the next key.
//
// Same idea as before: the middle layer owns every bit of state, the tui just renders the
// DisplayState snapshot it gets each frame.

pub const GRID_COLS: usize = 5;
pub const GRID_ROWS: usize = 5;
pub const NUM_PADS: usize = GRID_COLS * GRID_ROWS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PadId(pub u8);

impl PadId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < GRID_ROWS && col < GRID_COLS {
            Some(PadId((row * GRID_COLS + col) as u8))
        } else {
            None
        }
    }

    pub fn row(self) -> usize {
        self.index() / GRID_COLS
    }

    pub fn col(self) -> usize {
        self.index() % GRID_COLS
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // grid
    MoveCursor(i8, i8),
    TogglePad,

    // pad controls
    ToggleLoop,
    NudgeVolume(f32),
    NudgeRate(f32),
    NudgeInterval(i32),
    ClearPad,

    // board controls
    NudgeMasterVolume(f32),
    OpenSettings,
    ClearAll,
    ExportBoard,
    ImportBoard,

    // overlays (dialog + settings form)
    TextInput(char),
    TextBackspace,
    NextExample,
    Submit,
    Cancel,
    DismissNotice,

    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PadView {
    pub loaded: bool,
    pub label: String,
    pub playing: bool,
    pub looping: bool,
    pub generating: bool,
    pub volume: f32,
    pub playback_rate: f32,
    pub repeat_interval_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    None,
    Generate {
        pad: PadId,
        draft: String,
        examples: &'static [&'static str],
        selected_example: Option<usize>,
        in_flight: bool,
        can_submit: bool,
    },
    ApiKey {
        masked: String,
        can_save: bool,
    },
    Notice(String),
}

impl Overlay {
    pub fn mode(&self) -> OverlayMode {
        match self {
            Overlay::None => OverlayMode::Grid,
            Overlay::Generate { .. } | Overlay::ApiKey { .. } => OverlayMode::TextEntry,
            Overlay::Notice(_) => OverlayMode::Notice,
        }
    }
}

// what the tui needs to know to resolve keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayMode {
    Grid,
    TextEntry,
    Notice,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub pads: Vec<PadView>, // always NUM_PADS long
    pub cursor: PadId,
    pub master_volume: f32,
    pub api_key_set: bool,
    pub overlay: Overlay,
    pub status_text: String, // last thing that happened, shown at the bottom
}
