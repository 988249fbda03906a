// Crate-level error wrapping each stage's error type

use crate::bitwise::HexError;
use crate::core::{ConfigError, ResolveError};
use crate::formats::SheetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Hex decode failed: {0}")]
    Hex(#[from] HexError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Register sheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
