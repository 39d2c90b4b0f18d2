use thiserror::Error;

/// Everything that can go wrong while embedding or recovering a payload.
///
/// Every failure is reported before any output is produced; the codec never
/// hands back a partially written image or a truncated payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The image was recognized but is not PNG (lossy formats destroy LSBs).
    #[error("unsupported image format: {0} (only lossless PNG is accepted)")]
    UnsupportedFormat(String),

    /// The payload does not fit into the carrier. Both figures are in bits.
    #[error("payload too large: needs {needed} bits, carrier offers {available}")]
    CapacityExceeded { needed: usize, available: usize },

    #[error("bit stream length {len} is not a multiple of 8")]
    MisalignedBitStream { len: usize },

    /// Every slot was read without meeting the terminator byte.
    #[error("no terminator found before the end of the image")]
    TruncatedPayload,

    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The payload contains the terminator byte and would be cut short on decode.
    #[error("payload contains a terminator byte at offset {offset}")]
    TerminatorInPayload { offset: usize },

    #[error("malformed image data: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("recovered text is not valid UTF-8")]
    InvalidUtf8,

    #[error("unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("audio payload of {len} bytes does not fit a WAV container")]
    AudioTooLarge { len: usize },
}

impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        CodecError::Decode(err.to_string())
    }
}

impl From<hound::Error> for CodecError {
    fn from(err: hound::Error) -> Self {
        CodecError::UnsupportedAudio(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
