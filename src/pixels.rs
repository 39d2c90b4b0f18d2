/// Decoded carrier pixels as a flat RGBA8 grid.
/// PNG is the only format accepted in or produced out.

use crate::error::{CodecError, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use tracing::debug;

const CHANNELS: usize = 4;

/// One of the four channels of an RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const RGB: [Channel; 3] = [Channel::R, Channel::G, Channel::B];
    pub const RGBA: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    fn offset(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }
}

/// Owned RGBA pixel grid.
///
/// Invariant: `data.len() == 4 * width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Parse PNG bytes into a pixel buffer.
    ///
    /// Recognized non-PNG formats fail with [`CodecError::UnsupportedFormat`];
    /// anything unrecognized or corrupt fails with [`CodecError::Decode`].
    pub fn from_image(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        if format != ImageFormat::Png {
            return Err(CodecError::UnsupportedFormat(format!("{format:?}")));
        }
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        debug!(
            "decoded carrier {}x{} ({:?})",
            decoded.width(),
            decoded.height(),
            decoded.color()
        );
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    /// Wrap raw RGBA bytes, checking the length against the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|p| p.checked_mul(CHANNELS));
        if expected != Some(data.len()) {
            return Err(CodecError::Decode(format!(
                "{} bytes cannot hold a {}x{} RGBA image",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Encode the buffer as PNG.
    pub fn to_image(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&self.data, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn get_channel(&self, pixel_index: usize, channel: Channel) -> Result<u8> {
        let idx = self.byte_index(pixel_index, channel)?;
        Ok(self.data[idx])
    }

    pub fn set_channel(&mut self, pixel_index: usize, channel: Channel, value: u8) -> Result<()> {
        let idx = self.byte_index(pixel_index, channel)?;
        self.data[idx] = value;
        Ok(())
    }

    fn byte_index(&self, pixel_index: usize, channel: Channel) -> Result<usize> {
        let len = self.pixel_count();
        if pixel_index >= len {
            return Err(CodecError::IndexOutOfBounds {
                index: pixel_index,
                len,
            });
        }
        Ok(pixel_index * CHANNELS + channel.offset())
    }
}
