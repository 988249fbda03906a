// Byte storage for decoded register images
pub mod binary_buffer;

pub use binary_buffer::{BinaryBuffer, BufferError};
