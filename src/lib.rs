//! # stegapix
//!
//! LSB steganography for PNG carriers. Hides text, a secret image, or raw
//! audio in the least significant bits of a carrier's colour channels and
//! recovers it again.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stegapix::EncodingMode;
//!
//! # fn main() -> anyhow::Result<()> {
//! let carrier = std::fs::read("cover.png")?;
//!
//! // Hide a message
//! let stego = stegapix::encode(&carrier, b"meet at noon", EncodingMode::TextLsb1)?;
//! std::fs::write("stego.png", &stego)?;
//!
//! // Get it back; the mode is not stored in the image
//! let message = stegapix::decode(&stego, EncodingMode::TextLsb1)?;
//! assert_eq!(message, b"meet at noon");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modes
//!
//! - `TextLsb1`: 1 bit per R, G, B channel, zero-byte terminated
//! - `ImageLsb2`: secret image resampled to the carrier, top 2 bits of each
//!   colour channel stored in the carrier's low 2 bits
//! - `AudioLsb4`: 1 bit per R, G, B, A channel (2 pixels per byte),
//!   zero-byte terminated, decoded into a WAV file
//!
//! No encryption is applied; hidden data is readable by anyone who knows
//! the mode.

pub mod bits;
pub mod capacity;
pub mod codec;
pub mod error;
pub mod mode;
pub mod pixels;
pub mod wav;

// Re-export main types for convenience
pub use codec::{decode, decode_batch, decode_text, encode, encode_batch, DecodeJob, EncodeJob};
pub use error::{CodecError, Result};
pub use mode::EncodingMode;
pub use pixels::{Channel, PixelBuffer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum payload size in bytes for a PNG carrier, per mode.
///
/// For text and audio the figure includes the terminator byte.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// let carrier = std::fs::read("photo.png")?;
/// let capacity = stegapix::calculate_capacity(&carrier, stegapix::EncodingMode::TextLsb1)?;
/// println!("Image can hold {} bytes of text", capacity.saturating_sub(1));
/// # Ok(())
/// # }
/// ```
pub fn calculate_capacity(carrier: &[u8], mode: EncodingMode) -> Result<usize> {
    let buffer = PixelBuffer::from_image(carrier)?;
    Ok(capacity::max_payload_bytes(&buffer, mode))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use proptest::prelude::*;
    use std::io::Cursor;

    fn create_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x ^ y) as u8, 255 - (x as u8)])
        });
        PixelBuffer::from_rgba(img).to_image().unwrap()
    }

    #[test]
    fn test_full_text_cycle() {
        let carrier = create_test_image(64, 64);
        let message = "Hello, this is a secret message for testing! ✓";

        let stego = encode(&carrier, message.as_bytes(), EncodingMode::TextLsb1).unwrap();
        assert_eq!(decode_text(&stego).unwrap(), message);
    }

    #[test]
    fn test_full_audio_cycle() {
        let carrier = create_test_image(32, 32);
        let samples: Vec<i16> = (1..200).map(|i| i * 97).collect();
        let pcm: Vec<u8> = samples
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .map(|b| b | 1)
            .collect();

        let stego = encode(&carrier, &pcm, EncodingMode::AudioLsb4).unwrap();
        let wav_bytes = decode(&stego, EncodingMode::AudioLsb4).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(&wav_bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
        assert_eq!(reader.len() as usize, pcm.len() / 2);
        let recovered: Vec<u8> = reader
            .samples::<i16>()
            .flat_map(|s| s.unwrap().to_le_bytes())
            .collect();
        assert_eq!(recovered, pcm);
    }

    #[test]
    fn test_wav_with_silence_survives_after_nudging() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..200 {
                let t = i as f32 / 200.0 * std::f32::consts::TAU;
                writer.write_sample((t.sin() * 12_000.0) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        let carrier = create_test_image(64, 64);
        let mut pcm = wav::pcm_from_wav(cursor.get_ref()).unwrap();

        // the first sample is silence
        assert_eq!(
            encode(&carrier, &pcm, EncodingMode::AudioLsb4),
            Err(CodecError::TerminatorInPayload { offset: 0 })
        );

        let original: Vec<i16> = pcm
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert!(wav::avoid_zero_bytes(&mut pcm) > 0);

        let stego = encode(&carrier, &pcm, EncodingMode::AudioLsb4).unwrap();
        let wav_bytes = decode(&stego, EncodingMode::AudioLsb4).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(&wav_bytes)).unwrap();
        let recovered: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();

        assert_eq!(recovered.len(), original.len());
        for (got, want) in recovered.iter().zip(&original) {
            assert!((i32::from(*got) - i32::from(*want)).abs() <= 129);
        }
    }

    #[test]
    fn test_capacity_calculation() {
        let carrier = create_test_image(4, 4);
        assert_eq!(calculate_capacity(&carrier, EncodingMode::TextLsb1).unwrap(), 6);
        assert_eq!(calculate_capacity(&carrier, EncodingMode::AudioLsb4).unwrap(), 8);
        assert_eq!(calculate_capacity(&carrier, EncodingMode::ImageLsb2).unwrap(), 48);
    }

    #[test]
    fn test_stego_is_visually_close() {
        let carrier = create_test_image(16, 16);
        let stego = encode(&carrier, b"subtle", EncodingMode::TextLsb1).unwrap();

        let before = PixelBuffer::from_image(&carrier).unwrap();
        let after = PixelBuffer::from_image(&stego).unwrap();
        for (a, b) in before.as_raw().iter().zip(after.as_raw()) {
            assert!(a.abs_diff(*b) <= 1);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn text_round_trip(text in "[^\\x00]{0,40}") {
            let carrier = create_test_image(32, 32);
            let max = calculate_capacity(&carrier, EncodingMode::TextLsb1).unwrap();
            prop_assume!(text.len() < max);

            let stego = encode(&carrier, text.as_bytes(), EncodingMode::TextLsb1).unwrap();
            prop_assert_eq!(decode_text(&stego).unwrap(), text);
        }

        #[test]
        fn audio_round_trip(pcm in proptest::collection::vec(1u8..=255, 0..100)) {
            let carrier = create_test_image(16, 16);
            let stego = encode(&carrier, &pcm, EncodingMode::AudioLsb4).unwrap();
            let out = decode(&stego, EncodingMode::AudioLsb4).unwrap();

            let header = wav::build_wav_header(pcm.len() as u32);
            prop_assert_eq!(&out[..wav::HEADER_LEN], &header[..]);
            prop_assert_eq!(&out[wav::HEADER_LEN..], &pcm[..]);
        }

        #[test]
        fn oversized_payload_never_mutates(len in 7usize..64, fill in 1u8..=255) {
            let carrier = PixelBuffer::from_image(&create_test_image(4, 4)).unwrap();
            let mut target = carrier.clone();
            let result = codec::embed(&mut target, &vec![fill; len], EncodingMode::TextLsb1);
            let is_capacity_err = matches!(result, Err(CodecError::CapacityExceeded { .. }));
            prop_assert!(is_capacity_err);
            prop_assert_eq!(target.as_raw(), carrier.as_raw());
        }

        #[test]
        fn image_round_trip_keeps_top_bits(
            pixels in proptest::collection::vec(any::<[u8; 3]>(), 36)
        ) {
            let carrier = create_test_image(6, 6);
            let secret = RgbaImage::from_fn(6, 6, |x, y| {
                let [r, g, b] = pixels[(y * 6 + x) as usize];
                Rgba([r, g, b, 255])
            });
            let secret_png = PixelBuffer::from_rgba(secret.clone()).to_image().unwrap();

            let stego = encode(&carrier, &secret_png, EncodingMode::ImageLsb2).unwrap();
            let revealed_png = decode(&stego, EncodingMode::ImageLsb2).unwrap();
            let revealed = PixelBuffer::from_image(&revealed_png).unwrap();

            let pairs = revealed.as_raw().chunks_exact(4).zip(secret.as_raw().chunks_exact(4));
            for (got, want) in pairs {
                for c in 0..3 {
                    prop_assert_eq!(got[c], want[c] & 0xC0);
                }
                prop_assert_eq!(got[3], 255);
            }
        }
    }
}
