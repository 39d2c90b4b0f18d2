/// Minimal WAV container for recovered PCM.
///
/// Recovered audio is always described as mono, 16-bit, 44.1 kHz PCM; the
/// codec does not transmit the original format, so these are fixed.

use crate::error::{CodecError, Result};
use std::io::Cursor;
use tracing::debug;

pub const HEADER_LEN: usize = 44;
pub const SAMPLE_RATE: u32 = 44_100;
pub const NUM_CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Canonical RIFF/WAVE header for `pcm_len` bytes of sample data.
///
/// The RIFF size field saturates for `pcm_len > u32::MAX - 36`; such data
/// cannot be described by a WAV file, and [`wrap_pcm`] refuses it.
pub fn build_wav_header(pcm_len: u32) -> [u8; HEADER_LEN] {
    let block_align = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = SAMPLE_RATE * u32::from(block_align);

    let mut out = [0u8; HEADER_LEN];
    out[0..4].copy_from_slice(b"RIFF");
    out[4..8].copy_from_slice(&(36u32.saturating_add(pcm_len)).to_le_bytes());
    out[8..12].copy_from_slice(b"WAVE");
    out[12..16].copy_from_slice(b"fmt ");
    out[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out[20..22].copy_from_slice(&PCM_FORMAT.to_le_bytes());
    out[22..24].copy_from_slice(&NUM_CHANNELS.to_le_bytes());
    out[24..28].copy_from_slice(&SAMPLE_RATE.to_le_bytes());
    out[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    out[32..34].copy_from_slice(&block_align.to_le_bytes());
    out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out[36..40].copy_from_slice(b"data");
    out[40..44].copy_from_slice(&pcm_len.to_le_bytes());
    out
}

/// Prefix PCM bytes with a header describing them.
pub fn wrap_pcm(pcm: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(pcm.len())
        .ok()
        .filter(|&l| l <= u32::MAX - 36)
        .ok_or(CodecError::AudioTooLarge { len: pcm.len() })?;

    let mut out = Vec::with_capacity(HEADER_LEN + pcm.len());
    out.extend_from_slice(&build_wav_header(len));
    out.extend_from_slice(pcm);
    Ok(out)
}

/// Move every 16-bit little-endian sample containing a zero byte to the
/// nearest sample value without one, so the PCM survives a zero-terminated
/// mode. A trailing odd byte is raised to `0x01` if zero. Returns the number
/// of samples changed.
///
/// Quiet samples in `1..=255` have a zero high byte and move furthest, to
/// 257 or -1; no sample moves by more than 129.
pub fn avoid_zero_bytes(pcm: &mut [u8]) -> usize {
    let mut changed = 0;
    let mut chunks = pcm.chunks_exact_mut(2);
    for pair in &mut chunks {
        if pair[0] != 0 && pair[1] != 0 {
            continue;
        }
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        pair.copy_from_slice(&nearest_zero_free(sample).to_le_bytes());
        changed += 1;
    }
    if let [last] = chunks.into_remainder() {
        if *last == 0 {
            *last = 1;
            changed += 1;
        }
    }
    changed
}

fn nearest_zero_free(sample: i16) -> i16 {
    let zero_free = |v: i32| {
        i16::try_from(v)
            .ok()
            .filter(|s| s.to_le_bytes().iter().all(|&b| b != 0))
    };
    (1..=i32::from(u16::MAX))
        .flat_map(|d| [i32::from(sample) - d, i32::from(sample) + d])
        .find_map(zero_free)
        .unwrap_or(-1)
}

/// Pull the sample bytes out of a 16-bit integer WAV file.
///
/// Samples are returned little-endian, interleaved as stored. Other sample
/// formats are refused rather than converted.
pub fn pcm_from_wav(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(CodecError::UnsupportedAudio(format!(
            "{}-bit {:?} samples (only 16-bit integer PCM)",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    debug!(
        "reading wav: {} ch, {} Hz, {} samples",
        spec.channels,
        spec.sample_rate,
        reader.len()
    );

    let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        pcm.extend_from_slice(&sample?.to_le_bytes());
    }
    Ok(pcm)
}
