use crate::shared::OverlayMode;

// state local to the tui, used to resolve raw keys into semantic inputevents.
// overlay is synced from DisplayState every loop.
#[derive(Clone, Debug)]
pub struct TuiState {
    pub overlay: OverlayMode,
}

impl Default for TuiState {
    fn default() -> Self {
        Self { overlay: OverlayMode::Grid }
    }
}
