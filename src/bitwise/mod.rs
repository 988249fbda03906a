// Text-to-binary conversion for register images and sheet notation

pub mod hex;
pub mod parser;

pub use hex::{
    decode_hex, decode_hex_exact, encode_hex, nibble, pack_nibbles, HexDecoder,
    HexDecoderConfig, HexError,
};
pub use parser::{csd_slice, parse_csd_slice};
