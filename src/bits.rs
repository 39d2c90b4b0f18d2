/// Byte payloads to and from ordered bit sequences.
/// Bits are emitted MSB-first within each byte; each bit is stored as a `u8` of 0 or 1.

use crate::error::{CodecError, Result};

/// Byte appended to streamed payloads to mark their end.
pub const TERMINATOR: u8 = 0x00;

pub fn to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Pack bits back into bytes; the standalone inverse of [`to_bits`].
/// The length must be a whole number of bytes. Decoding streams bits
/// through [`TerminatedReader`] instead, since it stops mid-buffer.
pub fn from_bits(bits: &[u8]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(CodecError::MisalignedBitStream { len: bits.len() });
    }
    Ok(bits
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect())
}

/// Payload followed by the terminator byte.
pub fn with_terminator(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 1);
    out.extend_from_slice(data);
    out.push(TERMINATOR);
    out
}

/// Offset of the first byte that would be mistaken for the terminator.
pub fn find_terminator(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == TERMINATOR)
}

/// Accumulates bits one at a time and reports the payload once a
/// terminator byte lands on a byte boundary.
#[derive(Debug, Default)]
pub struct TerminatedReader {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl TerminatedReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one bit. Returns `true` once the terminator has been read.
    pub fn push(&mut self, bit: u8) -> bool {
        self.current = (self.current << 1) | (bit & 1);
        self.filled += 1;
        if self.filled < 8 {
            return false;
        }
        let byte = self.current;
        self.current = 0;
        self.filled = 0;
        if byte == TERMINATOR {
            return true;
        }
        self.bytes.push(byte);
        false
    }

    /// Payload read so far, terminator excluded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
