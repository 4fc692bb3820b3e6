// The smallest unit of audio; one stereo frame
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(x: f32) -> Self {
        Self { left: x, right: x }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // decoded clip at the engine's sample rate
}

impl SampleBuffer {
    pub fn new(data: Vec<StereoFrame>) -> Self {
        Self { data }
    }

    // Build from interleaved samples. Mono is duplicated, anything wider than stereo keeps
    // the first two channels.
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Self {
        let data = match channels {
            0 => Vec::new(),
            1 => samples.iter().map(|&x| StereoFrame::mono(x)).collect(),
            n => samples
                .chunks_exact(n)
                .map(|c| StereoFrame { left: c[0], right: c[1] })
                .collect(),
        };
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn resampled(self, source_rate: u32, target_rate: u32) -> Self {
        if source_rate == target_rate || source_rate == 0 {
            return self;
        }
        Self { data: resample_linear(&self.data, source_rate, target_rate) }
    }
}

// Simple linear resampler. Generated clips are short sound effects, this is plenty.
pub fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio; // ex. 3.7
        let idx = src_pos.floor() as usize; // ex. 3
        let frac = (src_pos - idx as f64) as f32; // ex. 0.7
        if idx >= frames.len().saturating_sub(1) {
            out.push(*frames.last().unwrap_or(&StereoFrame::zero()));
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_is_duplicated() {
        let buf = SampleBuffer::from_interleaved(&[0.5, -0.5], 1);
        assert_eq!(buf.data, vec![StereoFrame::mono(0.5), StereoFrame::mono(-0.5)]);
    }

    #[test]
    fn extra_channels_are_dropped() {
        let buf = SampleBuffer::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 3);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.data[1], StereoFrame { left: 0.4, right: 0.5 });
    }

    #[test]
    fn upsampling_doubles_length_and_interpolates() {
        let frames = vec![StereoFrame::mono(0.0), StereoFrame::mono(1.0)];
        let out = resample_linear(&frames, 22050, 44100);
        assert_eq!(out.len(), 4);
        assert!((out[1].left - 0.5).abs() < 1e-6);
    }

    #[test]
    fn same_rate_is_untouched() {
        let buf = SampleBuffer::from_interleaved(&[0.25, 0.75], 2);
        assert_eq!(buf.clone().resampled(48000, 48000), buf);
    }
}
