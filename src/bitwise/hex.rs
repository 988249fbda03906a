// ASCII hex text to packed bytes
// Each character is one nibble; pairs pack high-then-low into a byte

use crate::core::constants::EXT_CSD_LEN;
use crate::memmap::BinaryBuffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest buffer a decoder accepts unless configured otherwise
pub const DEFAULT_MAX_LEN: usize = 64 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex digit {byte:#04x} at position {position}")]
    InvalidHexDigit { position: usize, byte: u8 },

    #[error("Insufficient input: need {expected} hex characters, have {actual}")]
    InsufficientInput { expected: usize, actual: usize },

    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex input")]
    EmptyInput,

    #[error("Decoded size {len} exceeds limit of {max} bytes")]
    InputTooLarge { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, HexError>;

/// Decoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexDecoderConfig {
    /// Exact number of bytes to decode; None decodes the whole stream
    pub expected_len: Option<usize>,

    /// Upper bound on the decoded size
    pub max_len: usize,
}

impl Default for HexDecoderConfig {
    fn default() -> Self {
        Self {
            expected_len: None,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl HexDecoderConfig {
    /// Decode exactly one Extended CSD image
    pub fn ext_csd() -> Self {
        Self {
            expected_len: Some(EXT_CSD_LEN),
            ..Default::default()
        }
    }
}

/// Converts a RawHexStream into a BinaryBuffer
#[derive(Debug, Clone, Default)]
pub struct HexDecoder {
    config: HexDecoderConfig,
}

impl HexDecoder {
    pub fn new(config: HexDecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HexDecoderConfig {
        &self.config
    }

    /// Decode @input according to the configured length rules
    ///
    /// A single trailing `\n` or `\r\n` is dropped first. Every remaining
    /// character is checked before the digit count, so a stray character is
    /// reported as `InvalidHexDigit` rather than `OddLength`.
    pub fn decode(&self, input: &[u8]) -> Result<BinaryBuffer> {
        let content = strip_line_terminator(input);
        let actual = content.len();

        let content = match self.config.expected_len {
            Some(0) => return Err(HexError::EmptyInput),
            Some(len) => {
                let expected = len.saturating_mul(2);
                if actual < expected {
                    return Err(HexError::InsufficientInput { expected, actual });
                }
                if actual > expected {
                    tracing::debug!(
                        "Ignoring {} hex characters past the first {}",
                        actual - expected,
                        expected
                    );
                }
                &content[..expected]
            }
            None if actual == 0 => return Err(HexError::EmptyInput),
            None => content,
        };

        let out_len = content.len() / 2;
        if out_len > self.config.max_len {
            return Err(HexError::InputTooLarge {
                len: out_len,
                max: self.config.max_len,
            });
        }

        let nibbles = content
            .iter()
            .enumerate()
            .map(|(position, &byte)| {
                nibble(byte).ok_or(HexError::InvalidHexDigit { position, byte })
            })
            .collect::<Result<Vec<u8>>>()?;
        if nibbles.len() % 2 != 0 {
            return Err(HexError::OddLength(nibbles.len()));
        }

        let bytes: Vec<u8> = nibbles
            .chunks_exact(2)
            .map(|pair| pack_nibbles(pair[0], pair[1]))
            .collect();

        tracing::debug!(
            "Decoded {} hex characters into {} bytes",
            content.len(),
            bytes.len()
        );
        Ok(BinaryBuffer::new(bytes))
    }
}

/// Decode a whole hex stream with default limits
pub fn decode_hex(input: impl AsRef<[u8]>) -> Result<BinaryBuffer> {
    HexDecoder::default().decode(input.as_ref())
}

/// Decode exactly @len bytes from the front of @input
pub fn decode_hex_exact(input: impl AsRef<[u8]>, len: usize) -> Result<BinaryBuffer> {
    HexDecoder::new(HexDecoderConfig {
        expected_len: Some(len),
        max_len: len.max(DEFAULT_MAX_LEN),
    })
    .decode(input.as_ref())
}

/// Map one ASCII hex character to its 4-bit value
/// Example: b'7' -> 7, b'c' -> 12, b'G' -> None
pub fn nibble(ch: u8) -> Option<u8> {
    let upper = ch.to_ascii_uppercase();
    match upper {
        b'0'..=b'9' => Some(upper - b'0'),
        b'A'..=b'F' => Some(upper - (b'A' - 10)),
        _ => None,
    }
}

/// Combine two nibbles into a byte, high first
/// Example: (4, 1) -> 0x41
pub fn pack_nibbles(high: u8, low: u8) -> u8 {
    (high << 4) | (low & 0x0F)
}

/// Render bytes as uppercase hex text, two characters per byte
pub fn encode_hex(bytes: &[u8]) -> String {
    const TABLE: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        out.push(TABLE[(byte >> 4) as usize] as char);
        out.push(TABLE[(byte & 0x0F) as usize] as char);
    }
    out
}

fn strip_line_terminator(input: &[u8]) -> &[u8] {
    input
        .strip_suffix(b"\r\n")
        .or_else(|| input.strip_suffix(b"\n"))
        .unwrap_or(input)
}
