// JESD84-RS: Extended CSD register image decoder
// Copyright 2024 - Licensed under GPLv3
//
// Decodes an ASCII-hex register dump and resolves named cell fields from a
// delimited configuration or a JSON register sheet.

pub mod bitwise;
pub mod core;
pub mod error;
pub mod formats;
pub mod memmap;
pub mod pipeline;

// Re-export commonly used types
pub use bitwise::{
    decode_hex, decode_hex_exact, encode_hex, HexDecoder, HexDecoderConfig, HexError,
};
pub use core::{
    constants::*, parse_config, parse_config_lenient, resolve_all, resolve_all_lenient,
    resolve_field, CellRef, ConfigError, ConfigProfile, ErrorMode, FieldDescriptor, ResolveError,
    ResolvedField, ResolvedSet,
};
pub use error::{Error, Result};
pub use formats::{render_table, RegisterSheet, SheetError};
pub use memmap::BinaryBuffer;
pub use pipeline::{Pipeline, Report};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
