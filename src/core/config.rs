// Line-oriented field configuration
// Record layout: <id><d><name><d><high_index><d><low_index>

use super::constants::*;
use super::field::{CellRef, FieldDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Line {line}: expected 4 fields, found {found}")]
    MalformedRecord { line: usize, found: usize },

    #[error("Line {line}: invalid integer in {field}: {value:?}")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Too many records: limit is {max}")]
    TooManyRecords { max: usize },

    #[error("Failed to read profile: {0}")]
    Profile(String),
}

impl ConfigError {
    /// Line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::MalformedRecord { line, .. } | ConfigError::InvalidInteger { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How row-level failures are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Stop at the first bad row
    #[default]
    FailFast,
    /// Keep good rows, collect the errors
    Lenient,
}

/// Parser settings for one configuration dialect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigProfile {
    pub delimiter: char,
    pub max_name_len: usize,
    pub max_records: usize,
    pub mode: ErrorMode,
}

impl Default for ConfigProfile {
    fn default() -> Self {
        Self::comma()
    }
}

impl ConfigProfile {
    /// `1,Reserved,511,506`
    pub fn comma() -> Self {
        Self {
            delimiter: COMMA_DELIMITER,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_records: DEFAULT_MAX_RECORDS,
            mode: ErrorMode::FailFast,
        }
    }

    /// `1:Reserved:511:506`
    pub fn colon() -> Self {
        Self {
            delimiter: COLON_DELIMITER,
            ..Self::comma()
        }
    }

    pub fn with_mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Deserialize from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Profile(e.to_string()))
    }

    /// Load a profile from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Profile(e.to_string()))?;
        Self::from_json(&json)
    }
}

/// Result of a lenient parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    pub descriptors: Vec<FieldDescriptor>,
    pub errors: Vec<ConfigError>,
}

/// Parse one record; @line is 1-based and only used for error context
pub fn parse_record(
    line: &str,
    line_no: usize,
    profile: &ConfigProfile,
) -> Result<FieldDescriptor> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let tokens: Vec<&str> = line.split(profile.delimiter).collect();

    if tokens.len() < 4 {
        return Err(ConfigError::MalformedRecord {
            line: line_no,
            found: tokens.len(),
        });
    }
    if tokens.len() > 4 {
        tracing::debug!(
            "Line {}: ignoring {} extra field(s)",
            line_no,
            tokens.len() - 4
        );
    }

    let id = parse_index(tokens[0], line_no, ID_FIELD)?;
    let high_index = parse_index(tokens[2], line_no, HIGH_INDEX_FIELD)?;
    let low_index = parse_index(tokens[3], line_no, LOW_INDEX_FIELD)?;

    Ok(FieldDescriptor::with_name_limit(
        id,
        tokens[1],
        CellRef::from_indices(high_index, low_index),
        profile.max_name_len,
    ))
}

fn parse_index(token: &str, line: usize, field: &'static str) -> Result<u16> {
    let token = token.trim();
    token.parse().map_err(|_| ConfigError::InvalidInteger {
        line,
        field,
        value: token.to_string(),
    })
}

/// Parse every record, stopping at the first error
pub fn parse_config(text: &str, profile: &ConfigProfile) -> Result<Vec<FieldDescriptor>> {
    let mut descriptors = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if descriptors.len() >= profile.max_records {
            return Err(ConfigError::TooManyRecords {
                max: profile.max_records,
            });
        }
        descriptors.push(parse_record(line, idx + 1, profile)?);
    }

    tracing::debug!("Parsed {} field descriptors", descriptors.len());
    Ok(descriptors)
}

/// Parse every record, keeping good rows and collecting row errors
pub fn parse_config_lenient(text: &str, profile: &ConfigProfile) -> ParsedConfig {
    let mut parsed = ParsedConfig::default();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        // Rejected rows count toward the cap too
        if parsed.descriptors.len() + parsed.errors.len() >= profile.max_records {
            parsed.errors.push(ConfigError::TooManyRecords {
                max: profile.max_records,
            });
            break;
        }
        match parse_record(line, idx + 1, profile) {
            Ok(desc) => parsed.descriptors.push(desc),
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", idx + 1, e);
                parsed.errors.push(e);
            }
        }
    }

    parsed
}
