// Field descriptors: one named cell or cell range of the register image

use super::constants::SINGLE_CELL_SENTINEL;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a field inside the decoded buffer
///
/// Records write the indices as `high,low`. A `low` equal to
/// [`SINGLE_CELL_SENTINEL`] marks a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellRef {
    /// One byte at the given index
    Single(u16),

    /// Inclusive span, scanned from `low` up to `high`
    Range { high: u16, low: u16 },
}

impl CellRef {
    /// Build from the raw `high_index`/`low_index` pair of a record
    pub fn from_indices(high_index: u16, low_index: u16) -> Self {
        if low_index == SINGLE_CELL_SENTINEL {
            CellRef::Single(high_index)
        } else {
            CellRef::Range {
                high: high_index,
                low: low_index,
            }
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, CellRef::Single(_))
    }

    /// `high_index` as it appears in a record
    pub fn high_index(&self) -> u16 {
        match *self {
            CellRef::Single(index) => index,
            CellRef::Range { high, .. } => high,
        }
    }

    /// `low_index` as it appears in a record (the sentinel for single cells)
    pub fn low_index(&self) -> u16 {
        match *self {
            CellRef::Single(_) => SINGLE_CELL_SENTINEL,
            CellRef::Range { low, .. } => low,
        }
    }

    /// A range whose `low` is the sentinel cannot be written as a record:
    /// it would read back as a single cell
    pub fn has_sentinel_low(&self) -> bool {
        matches!(*self, CellRef::Range { low, .. } if low == SINGLE_CELL_SENTINEL)
    }

    /// Number of cells covered, or None for a misordered range
    pub fn cell_count(&self) -> Option<usize> {
        match *self {
            CellRef::Single(_) => Some(1),
            CellRef::Range { high, low } if low <= high => Some((high - low) as usize + 1),
            CellRef::Range { .. } => None,
        }
    }
}

/// Formats in CSD slice notation: `[505]` or `[511:506]`
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRef::Single(index) => write!(f, "[{}]", index),
            CellRef::Range { high, low } => write!(f, "[{}:{}]", high, low),
        }
    }
}

/// One parsed configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field id, not required to be unique
    pub id: u16,

    /// Human-readable label
    pub name: String,

    /// Where the value lives in the buffer
    pub cells: CellRef,
}

impl FieldDescriptor {
    pub fn new(id: u16, name: impl Into<String>, cells: CellRef) -> Self {
        Self {
            id,
            name: name.into(),
            cells,
        }
    }

    /// Build a descriptor, cutting the name down to @max_name_len characters
    pub fn with_name_limit(id: u16, name: &str, cells: CellRef, max_name_len: usize) -> Self {
        let (name, truncated) = truncate_name(name, max_name_len);
        if truncated {
            tracing::warn!(
                "Field {}: name truncated to {} characters",
                id,
                max_name_len
            );
        }
        Self::new(id, name, cells)
    }

    /// Render back into a configuration record (without line terminator)
    pub fn to_record(&self, delimiter: char) -> String {
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.id,
            self.name,
            self.cells.high_index(),
            self.cells.low_index(),
            d = delimiter
        )
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} \"{}\" {}", self.id, self.name, self.cells)
    }
}

/// Cut @name to at most @max characters, reporting whether anything was dropped
pub fn truncate_name(name: &str, max: usize) -> (&str, bool) {
    match name.char_indices().nth(max) {
        Some((byte_pos, _)) => (&name[..byte_pos], true),
        None => (name, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_from_indices() {
        assert_eq!(CellRef::from_indices(2, 0xFFFF), CellRef::Single(2));
        assert_eq!(
            CellRef::from_indices(3, 1),
            CellRef::Range { high: 3, low: 1 }
        );
        // Index 0 is a legitimate low bound, not a sentinel
        assert_eq!(
            CellRef::from_indices(7, 0),
            CellRef::Range { high: 7, low: 0 }
        );
    }

    #[test]
    fn test_cell_ref_raw_indices() {
        let single = CellRef::Single(505);
        assert!(single.is_single());
        assert_eq!(single.high_index(), 505);
        assert_eq!(single.low_index(), SINGLE_CELL_SENTINEL);

        let range = CellRef::Range { high: 511, low: 506 };
        assert!(!range.is_single());
        assert_eq!(range.high_index(), 511);
        assert_eq!(range.low_index(), 506);
    }

    #[test]
    fn test_sentinel_low() {
        assert!(CellRef::Range { high: 3, low: SINGLE_CELL_SENTINEL }.has_sentinel_low());
        assert!(!CellRef::Range { high: 3, low: 1 }.has_sentinel_low());
        assert!(!CellRef::Single(3).has_sentinel_low());
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(CellRef::Single(0).cell_count(), Some(1));
        assert_eq!(CellRef::Range { high: 3, low: 1 }.cell_count(), Some(3));
        assert_eq!(CellRef::Range { high: 4, low: 4 }.cell_count(), Some(1));
        assert_eq!(CellRef::Range { high: 1, low: 3 }.cell_count(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellRef::Single(505).to_string(), "[505]");
        assert_eq!(CellRef::Range { high: 511, low: 506 }.to_string(), "[511:506]");

        let desc = FieldDescriptor::new(2, "S_CMD_SET", CellRef::Single(504));
        assert_eq!(desc.to_string(), "#2 \"S_CMD_SET\" [504]");
    }

    #[test]
    fn test_to_record() {
        let single = FieldDescriptor::new(1, "X", CellRef::Single(2));
        assert_eq!(single.to_record(','), "1,X,2,65535");

        let range = FieldDescriptor::new(2, "Y", CellRef::Range { high: 3, low: 1 });
        assert_eq!(range.to_record(':'), "2:Y:3:1");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Reserved", 127), ("Reserved", false));
        assert_eq!(truncate_name("Reserved", 8), ("Reserved", false));
        assert_eq!(truncate_name("Reserved", 3), ("Res", true));
        assert_eq!(truncate_name("", 0), ("", false));
        // Multi-byte characters count once
        assert_eq!(truncate_name("élan", 2), ("él", true));
    }

    #[test]
    fn test_with_name_limit() {
        let long = "x".repeat(200);
        let desc = FieldDescriptor::with_name_limit(9, &long, CellRef::Single(0), 127);
        assert_eq!(desc.name.chars().count(), 127);

        let short = FieldDescriptor::with_name_limit(9, "HPI", CellRef::Single(0), 127);
        assert_eq!(short.name, "HPI");
    }
}
