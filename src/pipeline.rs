// Decode -> parse -> extract, composed

use crate::bitwise::{HexDecoder, HexDecoderConfig};
use crate::core::{
    parse_config, parse_config_lenient, resolve_all, resolve_all_lenient, ConfigProfile,
    ErrorMode, FieldDescriptor, ResolvedSet,
};
use crate::error::{Error, Result};
use crate::memmap::BinaryBuffer;
use serde::{Deserialize, Serialize};

/// Decoder and parser settings for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub decoder: HexDecoderConfig,
    pub profile: ConfigProfile,
}

/// Outcome of a lenient run: the rows that resolved plus every row error
#[derive(Debug, Default)]
pub struct Report {
    pub resolved: ResolvedSet,
    pub errors: Vec<Error>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Pipeline {
    pub fn new(decoder: HexDecoderConfig, profile: ConfigProfile) -> Self {
        Self { decoder, profile }
    }

    /// Load settings from JSON, e.g. `{"decoder":{"expected_len":512},"profile":{"delimiter":":"}}`
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn decode(&self, hex: &[u8]) -> Result<BinaryBuffer> {
        Ok(HexDecoder::new(self.decoder).decode(hex)?)
    }

    pub fn parse(&self, config: &str) -> Result<Vec<FieldDescriptor>> {
        Ok(parse_config(config, &self.profile)?)
    }

    /// Full fail-fast run; nothing is returned if any stage fails
    pub fn run(&self, hex: &[u8], config: &str) -> Result<ResolvedSet> {
        let buffer = self.decode(hex)?;
        let descs = self.parse(config)?;
        Ok(resolve_all(&descs, &buffer)?)
    }

    /// Fail-fast run over descriptors that did not come from a config text
    pub fn run_descriptors(&self, hex: &[u8], descs: &[FieldDescriptor]) -> Result<ResolvedSet> {
        let buffer = self.decode(hex)?;
        Ok(resolve_all(descs, &buffer)?)
    }

    /// Lenient run: decode failures are still fatal, row failures are collected
    pub fn run_lenient(&self, hex: &[u8], config: &str) -> Result<Report> {
        let buffer = self.decode(hex)?;
        Ok(lenient_report(config, &self.profile, &buffer))
    }

    /// Decode, then resolve in the mode selected by the profile
    pub fn execute(&self, hex: &[u8], config: &str) -> Result<Report> {
        let buffer = self.decode(hex)?;
        self.resolve_config(&buffer, config)
    }

    /// Parse @config and resolve it against an already decoded buffer
    pub fn resolve_config(&self, buffer: &BinaryBuffer, config: &str) -> Result<Report> {
        match self.profile.mode {
            ErrorMode::FailFast => {
                let descs = self.parse(config)?;
                Ok(Report {
                    resolved: resolve_all(&descs, buffer)?,
                    errors: Vec::new(),
                })
            }
            ErrorMode::Lenient => Ok(lenient_report(config, &self.profile, buffer)),
        }
    }

    /// Resolve @descs against an already decoded buffer, honouring the mode
    pub fn resolve_descriptors(
        &self,
        buffer: &BinaryBuffer,
        descs: &[FieldDescriptor],
    ) -> Result<Report> {
        match self.profile.mode {
            ErrorMode::FailFast => Ok(Report {
                resolved: resolve_all(descs, buffer)?,
                errors: Vec::new(),
            }),
            ErrorMode::Lenient => Ok(resolve_lenient(descs, buffer)),
        }
    }
}

fn lenient_report(config: &str, profile: &ConfigProfile, buffer: &BinaryBuffer) -> Report {
    let parsed = parse_config_lenient(config, profile);
    let resolved = resolve_lenient(&parsed.descriptors, buffer);

    let mut errors: Vec<Error> = parsed.errors.into_iter().map(Error::from).collect();
    errors.extend(resolved.errors);
    Report {
        resolved: resolved.resolved,
        errors,
    }
}

fn resolve_lenient(descs: &[FieldDescriptor], buffer: &BinaryBuffer) -> Report {
    let (resolved, errors) = resolve_all_lenient(descs, buffer);
    Report {
        resolved,
        errors: errors.into_iter().map(Error::from).collect(),
    }
}
