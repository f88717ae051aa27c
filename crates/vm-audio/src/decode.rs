use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Rate the offline path decimates toward (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Décode un fichier audio en échantillons mono f32.
///
/// WAV, MP3, FLAC, OGG, AAC via symphonia. Le signal est décimé d'un
/// facteur entier vers [`TARGET_SAMPLE_RATE`].
///
/// # Errors
/// Returns an error if the file cannot be opened or probed.
///
/// # Example
/// ```no_run
/// use vm_audio::decode::decode_file;
/// let (samples, sample_rate) = decode_file("session.wav").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Impossible d'ouvrir le fichier audio {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Format audio non reconnu")?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .context("Aucune piste audio par défaut")?;

    let source_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count)
        .max(1);
    let factor = decimation_factor(source_rate);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Impossible de créer le décodeur")?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();
    let mut frame_idx = 0usize;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_frames = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Paquet audio illisible : {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Frame audio ignorée : {e}");
                continue;
            }
        };

        let spec = *decoded.spec();
        let capacity = decoded.capacity();
        // Reallocate only when a packet outgrows the current buffer.
        if sample_buf.is_none() || capacity > max_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(capacity as u64, spec));
            max_frames = capacity;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks(channels) {
            if frame_idx % factor == 0 {
                samples.push(frame.iter().sum::<f32>() / channels as f32);
            }
            frame_idx += 1;
        }
    }

    let sample_rate = source_rate / factor as u32;
    log::info!(
        "{} décodé : {} échantillons @ {}Hz (source {}Hz)",
        path.display(),
        samples.len(),
        sample_rate,
        source_rate
    );

    Ok((samples, sample_rate))
}

/// Integer factor bringing `sample_rate` closest to, but not under,
/// [`TARGET_SAMPLE_RATE`].
#[must_use]
pub fn decimation_factor(sample_rate: u32) -> usize {
    (sample_rate / TARGET_SAMPLE_RATE).max(1) as usize
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    /// Minimal PCM16 WAV writer.
    fn wav_bytes(sample_rate: u32, channels: u16, frames: &[i16]) -> Vec<u8> {
        let data_len = (frames.len() * 2) as u32;
        let block_align = channels * 2;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in frames {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn factors() {
        assert_eq!(decimation_factor(8_000), 1);
        assert_eq!(decimation_factor(16_000), 1);
        assert_eq!(decimation_factor(44_100), 2);
        assert_eq!(decimation_factor(48_000), 3);
    }

    #[test]
    fn stereo_48k_wav_is_downmixed_and_decimated() {
        // 4800 stereo frames: left 0.5, right 0.0 → mono 0.25.
        let interleaved: Vec<i16> = (0..4800).flat_map(|_| [16_384i16, 0]).collect();
        let mut file = match tempfile::Builder::new().suffix(".wav").tempfile() {
            Ok(f) => f,
            Err(e) => panic!("tempfile: {e}"),
        };
        if let Err(e) = file.write_all(&wav_bytes(48_000, 2, &interleaved)) {
            panic!("write: {e}");
        }

        let (samples, sample_rate) = match decode_file(file.path()) {
            Ok(r) => r,
            Err(e) => panic!("decode_file: {e}"),
        };
        assert_eq!(sample_rate, 16_000);
        assert_eq!(samples.len(), 1600);
        assert!(samples.iter().all(|&s| (s - 0.25).abs() < 1e-3));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_file("/definitely/not/here.wav").is_err());
    }
}
