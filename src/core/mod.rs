// Core field model: descriptors, configuration parsing and cell extraction
pub mod config;
pub mod constants;
pub mod field;
pub mod resolver;

// Re-export commonly used types
pub use config::{
    parse_config, parse_config_lenient, parse_record, ConfigError, ConfigProfile, ErrorMode,
    ParsedConfig,
};
pub use constants::*;
pub use field::{CellRef, FieldDescriptor};
pub use resolver::{
    resolve_all, resolve_all_lenient, resolve_field, ResolveError, ResolvedField, ResolvedSet,
};
