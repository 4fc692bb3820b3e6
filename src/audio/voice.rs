use super::sample_buffer::{SampleBuffer, StereoFrame};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

// One pad's playhead over its clip.
#[derive(Clone, Debug)]
pub struct Voice {
    pub pos: f64,
    pub rate: f32,
    pub gain: f32,
    pub looping: bool,
    pub active: bool,
}

impl Voice {
    pub fn new(gain: f32, rate: f32, looping: bool) -> Self {
        Self {
            pos: 0.0,
            rate,
            gain,
            looping,
            active: true,
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.pos = 0.0;
    }

    // Mix this voice into `out`. Returns true if the clip ran out during this block
    // (never for a looping voice).
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) -> bool {
        if !self.active {
            return false;
        }
        let data = &buffer.data;
        let len = data.len();
        if len == 0 {
            self.active = false;
            return true;
        }

        for frame in out.iter_mut() {
            if self.pos >= len as f64 {
                if self.looping {
                    self.pos %= len as f64; // wrap straight back to the start
                } else {
                    self.active = false;
                    self.pos = 0.0;
                    return true;
                }
            }

            // read sample at current position
            let i = self.pos as usize;
            let frac = (self.pos - i as f64) as f32;
            let s0 = data[i];
            let s1 = data.get(i + 1).copied().unwrap_or(s0);

            frame.left += lerp(s0.left, s1.left, frac) * self.gain;
            frame.right += lerp(s0.right, s1.right, frac) * self.gain;

            self.pos += self.rate as f64;
        }
        false
    }
}
