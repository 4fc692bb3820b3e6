// Keeps every generated clip on disk as a float wav so an imported board can come back
// without paying for the same generation twice.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::audio::SampleBuffer;
use crate::errors::CacheError;

#[derive(Clone, Debug)]
pub struct SoundCache {
    dir: PathBuf,
}

impl SoundCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    // <cache>/<slug>-<hash>.wav, the slug is only there to make the dir browsable
    pub fn path_for(&self, prompt: &str) -> PathBuf {
        self.dir.join(format!("{}-{}.wav", slug(prompt), prompt_hash(prompt)))
    }

    pub fn store(&self, prompt: &str, buffer: &SampleBuffer, sample_rate: u32) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(prompt);
        // two pads can finish the same prompt at once; each writes its own file and the
        // rename swaps it in whole
        static NEXT_TMP: AtomicU64 = AtomicU64::new(0);
        let tmp = path.with_extension(format!(
            "{}-{}.tmp",
            std::process::id(),
            NEXT_TMP.fetch_add(1, Ordering::Relaxed)
        ));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        if let Err(e) = write_wav(&tmp, buffer, spec) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, &path)?;
        Ok(path)
    }

    // None when nothing is cached for this prompt
    pub fn load(&self, prompt: &str, target_rate: u32) -> Result<Option<SampleBuffer>, CacheError> {
        let path = self.path_for(prompt);
        if !path.exists() {
            return Ok(None);
        }
        load_wav(&path, target_rate).map(Some)
    }
}

fn write_wav(path: &Path, buffer: &SampleBuffer, spec: hound::WavSpec) -> Result<(), CacheError> {
    let mut writer = hound::WavWriter::create(path, spec)?;
    for f in &buffer.data {
        writer.write_sample(f.left)?;
        writer.write_sample(f.right)?;
    }
    writer.finalize()?;
    Ok(())
}

fn load_wav(path: &Path, target_rate: u32) -> Result<SampleBuffer, CacheError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let buffer = SampleBuffer::from_interleaved(&samples, spec.channels as usize);
    Ok(buffer.resampled(spec.sample_rate, target_rate))
}

// first 8 bytes of sha256 over the exact prompt, hex
fn prompt_hash(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

// lowercase alphanumerics joined by dashes, capped so file names stay sane
fn slug(prompt: &str) -> String {
    let mut out = String::new();
    for word in prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push('-');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
        if out.chars().count() >= 64 {
            break;
        }
    }
    let out: String = out.chars().take(64).collect();
    if out.is_empty() { "untitled".to_string() } else { out }
}
