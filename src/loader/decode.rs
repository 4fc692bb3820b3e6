// Turns the provider's audio payload into a buffer the engine can play.

use std::io::Cursor;

use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio::SampleBuffer;
use crate::errors::GenerationError;

// Decode an in-memory clip (mp3 from the provider, wav/pcm otherwise) and resample it to
// `target_rate`. Mono becomes stereo.
pub fn decode_bytes(bytes: Vec<u8>, target_rate: u32) -> Result<SampleBuffer, GenerationError> {
    if bytes.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let probed = get_probe().format(
        &Hint::new(),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| GenerationError::Decode("payload has no audio track".into()))?;
    let track_id = track.id;
    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut decoded: Vec<f32> = Vec::new();
    let mut channels = 0usize;
    let mut source_rate = 0u32;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = match decoder.decode(&packet) {
            Ok(buf) => buf,
            // a corrupt frame in an mp3 stream isn't fatal, skip it
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("skipping undecodable packet: {msg}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let spec = *audio_buf.spec();
        channels = spec.channels.count();
        source_rate = spec.rate;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());
    }

    let buffer = SampleBuffer::from_interleaved(&decoded, channels);
    if buffer.is_empty() {
        return Err(GenerationError::Decode("payload contained no audio frames".into()));
    }
    log::debug!(
        "decoded {} frames ({} ch @ {} Hz), resampling to {} Hz",
        buffer.len(),
        channels,
        source_rate,
        target_rate
    );
    Ok(buffer.resampled(source_rate, target_rate))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // Build a 16-bit PCM wav payload in memory.
    pub(crate) fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
            for i in 0..frames * channels as usize {
                let s = ((i % 64) as i16 - 32) * 512;
                writer.write_sample(s).expect("write sample");
            }
            writer.finalize().expect("finalize");
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_mono_wav_to_stereo() {
        let buf = decode_bytes(wav_bytes(1, 44100, 1000), 44100).expect("decode");
        assert_eq!(buf.len(), 1000);
        assert!(buf.data.iter().all(|f| f.left == f.right));
    }

    #[test]
    fn resamples_to_output_rate() {
        let buf = decode_bytes(wav_bytes(2, 24000, 2400), 48000).expect("decode");
        assert_eq!(buf.len(), 4800);
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(decode_bytes(Vec::new(), 44100), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let junk = b"definitely not audio, just some text the server sent".to_vec();
        assert!(matches!(decode_bytes(junk, 44100), Err(GenerationError::Decode(_))));
    }
}
