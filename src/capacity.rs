/// Carrier capacity per encoding mode.
///
/// Bitstream modes (text, audio) spend one carrier bit per payload bit, and
/// their reported byte capacity includes the terminator byte, so the longest
/// payload that fits is `max_payload_bytes - 1`. Image mode overlays the
/// secret pixel-for-pixel and can always hold a secret resampled to the
/// carrier's size.

use crate::error::{CodecError, Result};
use crate::mode::EncodingMode;
use crate::pixels::PixelBuffer;

/// Carrier bits available to `mode`.
pub fn available_bits(carrier: &PixelBuffer, mode: EncodingMode) -> usize {
    carrier.pixel_count() * mode.channels_per_pixel() * mode.bits_per_channel()
}

/// Maximum payload size in bytes.
///
/// For image mode this is the number of secret channel bytes (R, G, B per
/// pixel) the overlay can take.
pub fn max_payload_bytes(carrier: &PixelBuffer, mode: EncodingMode) -> usize {
    match mode {
        EncodingMode::TextLsb1 | EncodingMode::AudioLsb4 => available_bits(carrier, mode) / 8,
        EncodingMode::ImageLsb2 => carrier.pixel_count() * mode.channels_per_pixel(),
    }
}

/// Bits a payload of `payload_len` bytes consumes, terminator included.
pub fn needed_bits(payload_len: usize, mode: EncodingMode) -> usize {
    if mode.uses_terminator() {
        (payload_len + 1) * 8
    } else {
        payload_len * mode.bits_per_channel()
    }
}

/// Fail with [`CodecError::CapacityExceeded`] unless the payload fits.
pub fn check_fits(payload_len: usize, carrier: &PixelBuffer, mode: EncodingMode) -> Result<()> {
    let needed = needed_bits(payload_len, mode);
    let available = available_bits(carrier, mode);
    if needed > available {
        return Err(CodecError::CapacityExceeded { needed, available });
    }
    Ok(())
}
