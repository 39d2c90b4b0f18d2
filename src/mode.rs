/// Encoding modes and the constants that drive them.

use std::fmt;
use std::str::FromStr;

/// How a payload is laid out in the carrier's channels.
///
/// The stego image carries no header, so the same mode must be supplied to
/// both `encode` and `decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingMode {
    /// Text, one bit in the LSB of each R, G and B channel.
    TextLsb1,
    /// Secret image overlay, top 2 secret bits in the low 2 bits of R, G, B.
    ImageLsb2,
    /// Raw PCM, one bit in the LSB of each R, G, B and A channel.
    /// Four bits per pixel, so every payload byte spans two pixels.
    AudioLsb4,
}

impl EncodingMode {
    pub const ALL: [EncodingMode; 3] = [
        EncodingMode::TextLsb1,
        EncodingMode::ImageLsb2,
        EncodingMode::AudioLsb4,
    ];

    /// Carrier bits overwritten in each used channel.
    pub fn bits_per_channel(self) -> usize {
        match self {
            EncodingMode::TextLsb1 | EncodingMode::AudioLsb4 => 1,
            EncodingMode::ImageLsb2 => 2,
        }
    }

    /// Number of channels per pixel that receive payload bits.
    pub fn channels_per_pixel(self) -> usize {
        match self {
            EncodingMode::TextLsb1 | EncodingMode::ImageLsb2 => 3,
            EncodingMode::AudioLsb4 => 4,
        }
    }

    /// Whether the payload is streamed as bits and closed by a zero byte.
    /// Image mode is a fixed one-to-one overlay and needs no terminator.
    pub fn uses_terminator(self) -> bool {
        match self {
            EncodingMode::TextLsb1 | EncodingMode::AudioLsb4 => true,
            EncodingMode::ImageLsb2 => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EncodingMode::TextLsb1 => "text",
            EncodingMode::ImageLsb2 => "image",
            EncodingMode::AudioLsb4 => "audio",
        }
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for EncodingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "text-lsb1" => Ok(EncodingMode::TextLsb1),
            "image" | "image-lsb2" => Ok(EncodingMode::ImageLsb2),
            "audio" | "audio-lsb4" => Ok(EncodingMode::AudioLsb4),
            other => Err(format!("unknown encoding mode '{other}'")),
        }
    }
}
