// Decoded register buffer (Extended CSD image)

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Index {index} out of bounds for buffer of {len} bytes")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid cell span: low {low} is above high {high}")]
    InvalidSpan { low: usize, high: usize },
}

pub type Result<T> = std::result::Result<T, BufferError>;

/// Immutable byte buffer produced by the hex decoder
/// Index 0 is the first decoded byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBuffer {
    data: Vec<u8>,
}

impl BinaryBuffer {
    /// Wrap already-decoded bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the size of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the byte at @index
    pub fn byte(&self, index: usize) -> Result<u8> {
        self.data
            .get(index)
            .copied()
            .ok_or(BufferError::IndexOutOfBounds {
                index,
                len: self.data.len(),
            })
    }

    /// Inclusive cell span @low..=@high, in ascending index order
    pub fn cells(&self, low: usize, high: usize) -> Result<&[u8]> {
        if low > high {
            return Err(BufferError::InvalidSpan { low, high });
        }
        if high >= self.data.len() {
            return Err(BufferError::IndexOutOfBounds {
                index: high,
                len: self.data.len(),
            });
        }
        Ok(&self.data[low..=high])
    }

    /// Get the entire buffer as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get a printable hex representation of the buffer
    pub fn printable(&self, start: Option<usize>, end: Option<usize>) -> String {
        let end = end.unwrap_or(self.data.len()).min(self.data.len());
        let start = start.unwrap_or(0).min(end);

        hexdump(&self.data[start..end], start)
    }
}

impl fmt::Display for BinaryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryBuffer({} bytes)", self.data.len())
    }
}

/// Hex dump of @data, offsets counted from @base (similar to hexdump -C)
fn hexdump(data: &[u8], base: usize) -> String {
    let mut output = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        output.push_str(&format!("{:08x}  ", base + i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                output.push(' ');
            }
            output.push_str(&format!("{:02x} ", byte));
        }

        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                output.push(' ');
            }
            output.push_str("   ");
        }

        output.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
