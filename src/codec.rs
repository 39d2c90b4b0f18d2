/// Core steganography codec: hides text, images or audio in carrier LSBs.
///
/// Slot order is fixed and shared by every mode: pixels row-major, then
/// channels R, G, B (and A for audio) within a pixel, payload bits MSB-first.

use crate::bits::{self, TerminatedReader};
use crate::capacity;
use crate::error::{CodecError, Result};
use crate::mode::EncodingMode;
use crate::pixels::{Channel, PixelBuffer};
use crate::wav;
use image::imageops::FilterType;
use rayon::prelude::*;
use tracing::{debug, info};

/// One independent `encode` call for [`encode_batch`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeJob<'a> {
    pub carrier: &'a [u8],
    pub payload: &'a [u8],
    pub mode: EncodingMode,
}

/// One independent `decode` call for [`decode_batch`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeJob<'a> {
    pub stego: &'a [u8],
    pub mode: EncodingMode,
}

/// Hide `payload` in a PNG carrier and return the stego PNG.
///
/// For [`EncodingMode::ImageLsb2`] the payload is an encoded secret image
/// (any format the `image` crate reads); it is resampled to the carrier's
/// size. For text and audio the payload is embedded byte for byte and must
/// not contain a zero byte, which is reserved as the terminator.
pub fn encode(carrier: &[u8], payload: &[u8], mode: EncodingMode) -> Result<Vec<u8>> {
    let mut buffer = PixelBuffer::from_image(carrier)?;
    embed(&mut buffer, payload, mode)?;
    debug!("finalizing {} stego image", mode);
    let out = buffer.to_image()?;
    info!(
        "embedded {} byte {} payload into {}x{} carrier",
        payload.len(),
        mode,
        buffer.width(),
        buffer.height()
    );
    Ok(out)
}

/// Recover the payload from a stego PNG.
///
/// Text comes back as raw bytes, audio as a WAV file, and the secret image
/// as a PNG of the carrier's size.
pub fn decode(stego: &[u8], mode: EncodingMode) -> Result<Vec<u8>> {
    let buffer = PixelBuffer::from_image(stego)?;
    let out = match mode {
        EncodingMode::TextLsb1 => extract(&buffer, mode)?,
        EncodingMode::AudioLsb4 => wav::wrap_pcm(&extract(&buffer, mode)?)?,
        EncodingMode::ImageLsb2 => reveal_image(&buffer)?.to_image()?,
    };
    info!("recovered {} bytes ({})", out.len(), mode);
    Ok(out)
}

/// Decode a text payload and check that it is UTF-8.
pub fn decode_text(stego: &[u8]) -> Result<String> {
    let bytes = decode(stego, EncodingMode::TextLsb1)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

/// Embed into an already decoded carrier.
///
/// All validation happens before the first write, so on error the carrier
/// is exactly as it was passed in.
pub fn embed(carrier: &mut PixelBuffer, payload: &[u8], mode: EncodingMode) -> Result<()> {
    debug!("validating {} byte {} payload", payload.len(), mode);
    match mode {
        EncodingMode::TextLsb1 | EncodingMode::AudioLsb4 => {
            if let Some(offset) = bits::find_terminator(payload) {
                return Err(CodecError::TerminatorInPayload { offset });
            }
            capacity::check_fits(payload.len(), carrier, mode)?;
            debug!("embedding {} bits", (payload.len() + 1) * 8);
            write_stream(carrier, &bits::with_terminator(payload), slot_channels(mode))
        }
        EncodingMode::ImageLsb2 => {
            let secret = load_secret(payload, carrier.width(), carrier.height())?;
            // load_secret resized the secret to the carrier, so this always fits
            capacity::check_fits(secret.pixel_count() * 3, carrier, mode)?;
            debug!("embedding {}x{} secret overlay", secret.width(), secret.height());
            overlay_image(carrier, &secret)
        }
    }
}

/// Read the payload back out of a decoded stego image, without any container.
///
/// Image mode returns the revealed secret as raw RGBA bytes.
pub fn extract(stego: &PixelBuffer, mode: EncodingMode) -> Result<Vec<u8>> {
    match mode {
        EncodingMode::TextLsb1 | EncodingMode::AudioLsb4 => {
            read_stream(stego, slot_channels(mode))
        }
        EncodingMode::ImageLsb2 => Ok(reveal_image(stego)?.into_raw()),
    }
}

/// Rebuild the secret image from the low 2 bits of each colour channel.
/// Alpha is forced opaque since it never carried secret data.
pub fn reveal_image(stego: &PixelBuffer) -> Result<PixelBuffer> {
    let mut data = Vec::with_capacity(stego.as_raw().len());
    for px in stego.as_raw().chunks_exact(4) {
        data.extend_from_slice(&[
            (px[0] & 0x03) << 6,
            (px[1] & 0x03) << 6,
            (px[2] & 0x03) << 6,
            255,
        ]);
    }
    PixelBuffer::from_raw(stego.width(), stego.height(), data)
}

/// Run independent encode calls on the rayon pool. Results keep job order.
pub fn encode_batch(jobs: &[EncodeJob<'_>]) -> Vec<Result<Vec<u8>>> {
    jobs.par_iter()
        .map(|job| encode(job.carrier, job.payload, job.mode))
        .collect()
}

/// Run independent decode calls on the rayon pool. Results keep job order.
pub fn decode_batch(jobs: &[DecodeJob<'_>]) -> Vec<Result<Vec<u8>>> {
    jobs.par_iter().map(|job| decode(job.stego, job.mode)).collect()
}

// --- helpers ---

fn slot_channels(mode: EncodingMode) -> &'static [Channel] {
    match mode {
        EncodingMode::AudioLsb4 => &Channel::RGBA,
        EncodingMode::TextLsb1 | EncodingMode::ImageLsb2 => &Channel::RGB,
    }
}

/// Write `data` MSB-first into the LSB of successive slots.
///
/// With four slots per pixel (audio) pixel `2i` holds bits 7..4 of byte `i`
/// and pixel `2i + 1` holds bits 3..0.
fn write_stream(carrier: &mut PixelBuffer, data: &[u8], channels: &[Channel]) -> Result<()> {
    let per_pixel = channels.len();
    for (slot, bit) in bits::to_bits(data).into_iter().enumerate() {
        let pixel = slot / per_pixel;
        let channel = channels[slot % per_pixel];
        let value = carrier.get_channel(pixel, channel)?;
        carrier.set_channel(pixel, channel, (value & 0xFE) | bit)?;
    }
    Ok(())
}

fn read_stream(stego: &PixelBuffer, channels: &[Channel]) -> Result<Vec<u8>> {
    let mut reader = TerminatedReader::new();
    for pixel in 0..stego.pixel_count() {
        for &channel in channels {
            if reader.push(stego.get_channel(pixel, channel)? & 1) {
                let payload = reader.into_bytes();
                debug!("terminator found after {} bytes at pixel {}", payload.len(), pixel);
                return Ok(payload);
            }
        }
    }
    Err(CodecError::TruncatedPayload)
}

fn overlay_image(carrier: &mut PixelBuffer, secret: &PixelBuffer) -> Result<()> {
    for pixel in 0..carrier.pixel_count() {
        for &channel in &Channel::RGB {
            let cover = carrier.get_channel(pixel, channel)?;
            let hidden = secret.get_channel(pixel, channel)?;
            carrier.set_channel(pixel, channel, (cover & 0xFC) | (hidden >> 6))?;
        }
    }
    Ok(())
}

/// Decode the secret image and resample it to the carrier's dimensions.
fn load_secret(bytes: &[u8], width: u32, height: u32) -> Result<PixelBuffer> {
    let secret = image::load_from_memory(bytes)?;
    if secret.width() == width && secret.height() == height {
        return Ok(PixelBuffer::from_rgba(secret.to_rgba8()));
    }
    debug!(
        "resampling secret {}x{} -> {}x{}",
        secret.width(),
        secret.height(),
        width,
        height
    );
    let resized = secret.resize_exact(width, height, FilterType::Triangle);
    Ok(PixelBuffer::from_rgba(resized.to_rgba8()))
}
