// The 5x5 grid of pads plus the master volume they all share.

pub mod pad;
pub mod repeat;

use crate::audio::SampleBuffer;
use crate::audio_api::{AudioCommand, AudioEvent};
use crate::pipeline::board_file::{BoardFile, Square};
use crate::shared::{NUM_PADS, PadId};

pub use pad::{GenerationApplied, Pad, Toggle};

pub struct Board {
    pads: [Pad; NUM_PADS],
    master_volume: f32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            pads: std::array::from_fn(|i| Pad::new(PadId(i as u8))),
            master_volume: 1.0,
        }
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    // Clamped to [0, 1] and pushed to every pad that has a clip.
    pub fn set_master_volume(&mut self, volume: f32) -> Vec<AudioCommand> {
        if volume.is_nan() {
            return Vec::new();
        }
        self.master_volume = volume.clamp(0.0, 1.0);
        self.pads
            .iter()
            .flat_map(|p| p.gain_update(self.master_volume))
            .collect()
    }

    pub fn pad(&self, id: PadId) -> Option<&Pad> {
        self.pads.get(id.index())
    }

    pub fn pad_mut(&mut self, id: PadId) -> Option<&mut Pad> {
        self.pads.get_mut(id.index())
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn toggle(&mut self, id: PadId) -> Option<Toggle> {
        let master = self.master_volume;
        self.pad_mut(id).map(|p| p.toggle_playback(master))
    }

    #[cfg(test)]
    pub fn set_pad_volume(&mut self, id: PadId, volume: f32) -> Vec<AudioCommand> {
        let master = self.master_volume;
        self.pad_mut(id).map(|p| p.set_volume(volume, master)).unwrap_or_default()
    }

    // Every pad back to empty, timers and in-flight requests included.
    pub fn clear_all(&mut self) -> Vec<AudioCommand> {
        self.pads.iter_mut().flat_map(Pad::clear).collect()
    }

    pub fn tick(&mut self, elapsed_ms: f64) -> Vec<AudioCommand> {
        let master = self.master_volume;
        self.pads
            .iter_mut()
            .flat_map(|p| p.tick(elapsed_ms, master))
            .collect()
    }

    pub fn on_audio_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Ended { pad, handle } => {
                if let Some(p) = self.pad_mut(pad) {
                    p.on_playback_ended(handle);
                }
            }
        }
    }

    pub fn export(&self) -> BoardFile {
        let squares = self
            .pads
            .iter()
            .map(|p| {
                p.prompt().map(|prompt| Square {
                    prompt: prompt.to_string(),
                    sound_name: p.label().to_string(),
                })
            })
            .collect();
        BoardFile::new(squares)
    }

    // Load a clip straight onto a pad (used when restoring from the sound cache).
    pub fn load_sound(&mut self, id: PadId, prompt: &str, buffer: SampleBuffer) -> Vec<AudioCommand> {
        self.pad_mut(id).map(|p| p.load_sound(prompt, buffer)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StereoFrame;
    use crate::generation::GenerationOutcome;

    fn clip() -> SampleBuffer {
        SampleBuffer::new(vec![StereoFrame::mono(0.2); 16])
    }

    fn generate_on(board: &mut Board, id: PadId, prompt: &str) {
        let pad = board.pad_mut(id).unwrap();
        let req = pad.begin_generation(prompt).unwrap();
        let applied = pad.finish_generation(GenerationOutcome {
            pad: req.pad,
            token: req.token,
            prompt: req.prompt,
            result: Ok(clip()),
        });
        assert!(matches!(applied, GenerationApplied::Loaded(_)));
    }

    #[test]
    fn grid_has_25_pads_in_order() {
        let board = Board::new();
        assert_eq!(board.pads().len(), 25);
        for (i, p) in board.pads().iter().enumerate() {
            assert_eq!(p.id(), PadId(i as u8));
        }
        assert!(board.pad(PadId(25)).is_none());
    }

    #[test]
    fn only_the_generated_pad_loads() {
        let mut board = Board::new();
        generate_on(&mut board, PadId(12), "A cheerful chime sound");
        for p in board.pads() {
            assert_eq!(p.has_sound(), p.id() == PadId(12));
        }
    }

    #[test]
    fn master_volume_scales_every_loaded_pad() {
        let mut board = Board::new();
        generate_on(&mut board, PadId(0), "a");
        generate_on(&mut board, PadId(7), "b");
        board.set_pad_volume(PadId(0), 0.5);

        let cmds = board.set_master_volume(0.8);
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().any(|c| matches!(c, AudioCommand::SetGain { pad, gain } if *pad == PadId(0) && (*gain - 0.4).abs() < 1e-6)));

        let p0 = board.pad(PadId(0)).unwrap();
        assert!((p0.effective_volume(board.master_volume()) - 0.4).abs() < 1e-6);

        let cmds = board.set_master_volume(0.0);
        assert!(cmds.iter().all(|c| matches!(c, AudioCommand::SetGain { gain, .. } if *gain == 0.0)));
        assert_eq!(board.pad(PadId(0)).unwrap().volume(), 0.5);
    }

    #[test]
    fn master_volume_is_clamped() {
        let mut board = Board::new();
        board.set_master_volume(3.0);
        assert_eq!(board.master_volume(), 1.0);
        board.set_master_volume(-1.0);
        assert_eq!(board.master_volume(), 0.0);
    }

    #[test]
    fn clear_all_empties_and_cancels_timers() {
        let mut board = Board::new();
        generate_on(&mut board, PadId(3), "a");
        generate_on(&mut board, PadId(20), "b");
        board.pad_mut(PadId(3)).unwrap().set_repeat_interval_ms(100);
        board.toggle(PadId(3));
        assert!(board.pad(PadId(3)).unwrap().has_pending_repeat());

        board.clear_all();
        assert!(board.pads().iter().all(|p| !p.has_sound() && !p.has_pending_repeat()));
        assert!(board.tick(1000.0).is_empty());
    }

    #[test]
    fn end_events_route_to_their_pad() {
        let mut board = Board::new();
        generate_on(&mut board, PadId(5), "a");
        board.toggle(PadId(5));
        let handle = board.pad(PadId(5)).unwrap().handle().unwrap();
        board.on_audio_event(AudioEvent::Ended { pad: PadId(5), handle });
        assert!(!board.pad(PadId(5)).unwrap().is_playing());
    }

    #[test]
    fn export_lists_prompts_and_labels() {
        let mut board = Board::new();
        generate_on(&mut board, PadId(1), "A short cheerful melody with bells");
        let file = board.export();
        assert_eq!(file.squares.len(), 25);
        let sq = file.squares[1].as_ref().unwrap();
        assert_eq!(sq.prompt, "A short cheerful melody with bells");
        assert_eq!(sq.sound_name, "A short cheerful mel...");
        assert!(file.squares[0].is_none());
    }
}
