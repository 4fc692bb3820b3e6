// Input state for the two overlays: the generation dialog and the API key form.

use crate::shared::PadId;

pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "A cheerful chime sound",
    "A deep bass drum hit",
    "A magical sparkle effect",
    "A robotic beep sequence",
];

// Collects a prompt for one pad. Submitting doesn't close it; it closes once the pad
// reports a successful generation.
#[derive(Clone, Debug, Default)]
pub struct GenerationDialog {
    pad: Option<PadId>,
    // the pad the draft was typed for; outlives close() so reopening keeps the text
    draft_pad: Option<PadId>,
    draft: String,
    selected_example: Option<usize>,
}

impl GenerationDialog {
    pub fn open(&mut self, pad: PadId) {
        if self.draft_pad != Some(pad) {
            self.draft.clear();
            self.selected_example = None;
        }
        self.pad = Some(pad);
        self.draft_pad = Some(pad);
    }

    pub fn close(&mut self) {
        self.pad = None;
    }

    pub fn is_open(&self) -> bool {
        self.pad.is_some()
    }

    pub fn pad(&self) -> Option<PadId> {
        self.pad
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn selected_example(&self) -> Option<usize> {
        self.selected_example
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
    }

    pub fn select_example(&mut self, idx: usize) {
        if let Some(example) = EXAMPLE_PROMPTS.get(idx) {
            self.draft = example.to_string();
            self.selected_example = Some(idx);
        }
    }

    // cycles through the examples, wrapping around
    pub fn next_example(&mut self) {
        let next = self.selected_example.map_or(0, |i| (i + 1) % EXAMPLE_PROMPTS.len());
        self.select_example(next);
    }

    pub fn can_submit(&self, in_flight: bool) -> bool {
        self.is_open() && !in_flight && !self.draft.trim().is_empty()
    }

    pub fn submit(&self, in_flight: bool) -> Option<String> {
        if self.can_submit(in_flight) {
            Some(self.draft.clone())
        } else {
            None
        }
    }

    // The pad got its sound: forget the draft and close.
    pub fn on_generated(&mut self) {
        self.draft.clear();
        self.selected_example = None;
        self.pad = None;
        self.draft_pad = None;
    }
}

// Masked API key entry.
#[derive(Clone, Debug, Default)]
pub struct ApiKeyForm {
    open: bool,
    draft: String,
}

impl ApiKeyForm {
    pub fn open(&mut self, current: Option<String>) {
        self.open = true;
        self.draft = current.unwrap_or_default();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.draft.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
    }

    pub fn can_save(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    pub fn masked(&self) -> String {
        "•".repeat(self.draft.chars().count())
    }

    // Hands back the key and closes, or None if there's nothing to save.
    pub fn take(&mut self) -> Option<String> {
        if !self.can_save() {
            return None;
        }
        let key = std::mem::take(&mut self.draft).trim().to_string();
        self.open = false;
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_disabled_while_blank_or_busy() {
        let mut d = GenerationDialog::default();
        d.open(PadId(3));
        assert!(!d.can_submit(false));
        d.push_char(' ');
        assert!(!d.can_submit(false));
        d.push_char('x');
        assert!(d.can_submit(false));
        assert!(!d.can_submit(true));
        assert_eq!(d.submit(true), None);
        assert_eq!(d.submit(false).as_deref(), Some(" x"));
    }

    #[test]
    fn examples_prefill_and_cycle() {
        let mut d = GenerationDialog::default();
        d.open(PadId(0));
        d.next_example();
        assert_eq!(d.draft(), "A cheerful chime sound");
        d.select_example(3);
        d.next_example();
        assert_eq!(d.draft(), EXAMPLE_PROMPTS[0]);
        d.select_example(99);
        assert_eq!(d.selected_example(), Some(0));
    }

    #[test]
    fn success_clears_and_closes() {
        let mut d = GenerationDialog::default();
        d.open(PadId(8));
        d.select_example(1);
        d.on_generated();
        assert!(!d.is_open());
        assert_eq!(d.draft(), "");
    }

    #[test]
    fn reopening_same_pad_keeps_draft() {
        let mut d = GenerationDialog::default();
        d.open(PadId(8));
        d.push_char('a');
        d.close();
        d.open(PadId(8));
        assert_eq!(d.draft(), "a");
        d.open(PadId(9));
        assert_eq!(d.draft(), "");
    }

    #[test]
    fn api_key_form() {
        let mut f = ApiKeyForm::default();
        f.open(Some("ab".into()));
        assert_eq!(f.masked(), "••");
        f.backspace();
        f.backspace();
        assert!(!f.can_save());
        assert_eq!(f.take(), None);
        f.push_char('k');
        assert_eq!(f.take().as_deref(), Some("k"));
        assert!(!f.is_open());
    }

    #[test]
    fn api_key_form_rejects_blank_and_trims() {
        let mut f = ApiKeyForm::default();
        f.open(None);
        for c in "   ".chars() {
            f.push_char(c);
        }
        assert!(!f.can_save());
        assert_eq!(f.take(), None);
        assert!(f.is_open());

        f.push_char('k');
        f.push_char(' ');
        assert_eq!(f.take().as_deref(), Some("k"));
    }

    #[test]
    fn reopening_after_success_starts_blank() {
        let mut d = GenerationDialog::default();
        d.open(PadId(2));
        d.push_char('z');
        d.on_generated();
        d.open(PadId(2));
        assert_eq!(d.draft(), "");
    }
}
