// JSON register sheet describing the Extended CSD fields
// Reference: JESD84-B51 Table 49 (Extended CSD)

use crate::bitwise::parser::csd_slice;
use crate::core::field::{CellRef, FieldDescriptor};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse register sheet JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entry {id}: range {cells} uses the reserved low index 65535")]
    SentinelRange { id: u16, cells: CellRef },
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Sheet document: `{"array":[{"id":..,"data":{..}}]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterSheet {
    array: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub id: u16,
    pub data: SheetData,
}

/// One register row as published in the standard's table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(rename = "Name")]
    pub name: String,

    /// Register mnemonic, absent for reserved ranges
    #[serde(rename = "Field", default)]
    pub field: Option<String>,

    /// Size in bytes
    #[serde(rename = "Size", default)]
    pub size: u16,

    /// Access type (R, W, R/W, TBD...)
    #[serde(rename = "type", default)]
    pub access: String,

    #[serde(
        rename = "CSD-slice",
        deserialize_with = "deserialize_csd_slice",
        serialize_with = "serialize_csd_slice"
    )]
    pub csd_slice: CellRef,
}

fn deserialize_csd_slice<'de, D>(deserializer: D) -> std::result::Result<CellRef, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let cells = csd_slice(&s).ok_or_else(|| {
        de::Error::invalid_value(
            de::Unexpected::Str(&s),
            &"a CSD slice like [511:506] or [505]",
        )
    })?;
    if cells.has_sentinel_low() {
        return Err(de::Error::invalid_value(
            de::Unexpected::Str(&s),
            &"a CSD slice whose low index is not 65535",
        ));
    }
    Ok(cells)
}

fn serialize_csd_slice<S>(cells: &CellRef, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&cells.to_string())
}

impl RegisterSheet {
    pub fn new(array: Vec<SheetEntry>) -> Self {
        Self { array }
    }

    /// Parse a sheet from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a sheet from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SheetEntry> {
        self.array.iter()
    }

    /// Field descriptors for every entry, in sheet order
    pub fn descriptors(&self, max_name_len: usize) -> Vec<FieldDescriptor> {
        self.array
            .iter()
            .map(|e| {
                FieldDescriptor::with_name_limit(e.id, &e.data.name, e.data.csd_slice, max_name_len)
            })
            .collect()
    }

    /// Write the simplified delimited configuration, one record per entry
    ///
    /// Nothing is written if any entry cannot be expressed as a record.
    pub fn write_config<W: Write>(&self, mut writer: W, delimiter: char) -> Result<()> {
        if let Some(entry) = self.array.iter().find(|e| e.data.csd_slice.has_sentinel_low()) {
            return Err(SheetError::SentinelRange {
                id: entry.id,
                cells: entry.data.csd_slice,
            });
        }

        for entry in &self.array {
            if entry.data.name.contains(delimiter) {
                tracing::warn!(
                    "Entry {}: name {:?} contains the delimiter {:?}",
                    entry.id,
                    entry.data.name,
                    delimiter
                );
            }
            let desc =
                FieldDescriptor::new(entry.id, entry.data.name.as_str(), entry.data.csd_slice);
            writeln!(writer, "{}", desc.to_record(delimiter))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Same as [`write_config`](Self::write_config), into a string
    pub fn to_config_string(&self, delimiter: char) -> Result<String> {
        let mut out = Vec::new();
        self.write_config(&mut out, delimiter)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl std::ops::Index<usize> for RegisterSheet {
    type Output = SheetEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.array[index]
    }
}

impl<'a> IntoIterator for &'a RegisterSheet {
    type Item = &'a SheetEntry;
    type IntoIter = std::slice::Iter<'a, SheetEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.array.iter()
    }
}
