// Cell extraction: descriptors + decoded buffer -> resolved fields

use super::field::{CellRef, FieldDescriptor};
use crate::memmap::{BinaryBuffer, BufferError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Field {field_id}: index {index} out of range for buffer of {buffer_len} bytes")]
    IndexOutOfRange {
        field_id: u16,
        index: usize,
        buffer_len: usize,
    },

    /// Misordered pair: the scan runs low..=high, so low must not exceed high
    #[error("Field {field_id}: invalid range, low index {low} is above high index {high}")]
    InvalidRange { field_id: u16, low: u16, high: u16 },
}

impl ResolveError {
    pub fn field_id(&self) -> u16 {
        match *self {
            ResolveError::IndexOutOfRange { field_id, .. }
            | ResolveError::InvalidRange { field_id, .. } => field_id,
        }
    }

    /// Attach @field_id to a buffer access failure
    fn from_buffer(field_id: u16, err: BufferError) -> Self {
        match err {
            BufferError::IndexOutOfBounds { index, len } => ResolveError::IndexOutOfRange {
                field_id,
                index,
                buffer_len: len,
            },
            // Spans are built from u16 indices
            BufferError::InvalidSpan { low, high } => ResolveError::InvalidRange {
                field_id,
                low: low as u16,
                high: high as u16,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// A descriptor paired with the bytes read from the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub descriptor: FieldDescriptor,
    pub values: Vec<u8>,
}

impl ResolvedField {
    pub fn id(&self) -> u16 {
        self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn cells(&self) -> CellRef {
        self.descriptor.cells
    }

    /// Values as one big-endian integer, reading the scan order as most significant first
    /// Returns None for values wider than 64 bits
    pub fn as_u64_be(&self) -> Option<u64> {
        if self.values.len() > 8 {
            return None;
        }
        Some(
            self.values
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | b as u64),
        )
    }

    /// Values as one little-endian integer (lowest index is least significant)
    /// Returns None for values wider than 64 bits
    pub fn as_u64_le(&self) -> Option<u64> {
        if self.values.len() > 8 {
            return None;
        }
        Some(
            self.values
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | b as u64),
        )
    }
}

/// Resolve a single descriptor
///
/// Ranges are copied in ascending index order, `low` first. A misordered
/// range is reported before any bounds problem, and nothing is returned
/// for a field that cannot be read in full.
pub fn resolve_field(desc: &FieldDescriptor, buffer: &BinaryBuffer) -> Result<ResolvedField> {
    let values = match desc.cells {
        CellRef::Single(index) => buffer.byte(index as usize).map(|b| vec![b]),
        CellRef::Range { high, low } => buffer
            .cells(low as usize, high as usize)
            .map(<[u8]>::to_vec),
    }
    .map_err(|e| ResolveError::from_buffer(desc.id, e))?;

    tracing::trace!("Resolved {} -> {:?}", desc, values);
    Ok(ResolvedField {
        descriptor: desc.clone(),
        values,
    })
}

/// Resolve every descriptor in order, stopping at the first failure
pub fn resolve_all(descs: &[FieldDescriptor], buffer: &BinaryBuffer) -> Result<ResolvedSet> {
    let fields = descs
        .iter()
        .map(|d| resolve_field(d, buffer))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Resolved {} fields from {}", fields.len(), buffer);
    Ok(ResolvedSet::new(fields))
}

/// Resolve every descriptor, keeping the good rows and collecting failures
pub fn resolve_all_lenient(
    descs: &[FieldDescriptor],
    buffer: &BinaryBuffer,
) -> (ResolvedSet, Vec<ResolveError>) {
    let mut fields = Vec::with_capacity(descs.len());
    let mut errors = Vec::new();

    for desc in descs {
        match resolve_field(desc, buffer) {
            Ok(field) => fields.push(field),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", desc, e);
                errors.push(e);
            }
        }
    }

    (ResolvedSet::new(fields), errors)
}

/// Ordered resolved fields, in descriptor order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    fields: Vec<ResolvedField>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    id: u16,
    name: &'a str,
    cells: String,
    data: &'a [u8],
}

#[derive(Serialize)]
struct JsonDoc<'a> {
    array: Vec<JsonRow<'a>>,
}

impl ResolvedSet {
    pub fn new(fields: Vec<ResolvedField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResolvedField> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedField> {
        self.fields.iter()
    }

    /// All fields carrying @id, in order
    pub fn by_id(&self, id: u16) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(move |f| f.id() == id)
    }

    fn json_doc(&self) -> JsonDoc<'_> {
        JsonDoc {
            array: self
                .fields
                .iter()
                .map(|f| JsonRow {
                    id: f.id(),
                    name: f.name(),
                    cells: f.cells().to_string(),
                    data: &f.values,
                })
                .collect(),
        }
    }

    /// Serialize to `{"array":[{"id":..,"name":..,"cells":..,"data":[..]}]}`
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&self.json_doc())
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.json_doc())
    }
}

impl<'a> IntoIterator for &'a ResolvedSet {
    type Item = &'a ResolvedField;
    type IntoIter = std::slice::Iter<'a, ResolvedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for ResolvedSet {
    type Item = ResolvedField;
    type IntoIter = std::vec::IntoIter<ResolvedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> BinaryBuffer {
        BinaryBuffer::new(vec![10, 20, 30, 40])
    }

    #[test]
    fn test_single_cell() -> Result<()> {
        let desc = FieldDescriptor::new(1, "X", CellRef::from_indices(2, 0xFFFF));
        let field = resolve_field(&desc, &buffer())?;
        assert_eq!(field.values, vec![30]);
        assert_eq!(field.id(), 1);
        assert_eq!(field.name(), "X");
        Ok(())
    }

    #[test]
    fn test_range_ascending() -> Result<()> {
        let desc = FieldDescriptor::new(2, "Y", CellRef::from_indices(3, 1));
        let field = resolve_field(&desc, &buffer())?;
        assert_eq!(field.values, vec![20, 30, 40]);
        assert_eq!(field.values.len(), 3);
        Ok(())
    }

    #[test]
    fn test_range_single_width() -> Result<()> {
        let desc = FieldDescriptor::new(3, "Z", CellRef::from_indices(0, 0));
        assert_eq!(resolve_field(&desc, &buffer())?.values, vec![10]);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        let desc = FieldDescriptor::new(4, "Past", CellRef::Single(4));
        assert_eq!(
            resolve_field(&desc, &buffer()),
            Err(ResolveError::IndexOutOfRange {
                field_id: 4,
                index: 4,
                buffer_len: 4
            })
        );

        let desc = FieldDescriptor::new(5, "Span", CellRef::from_indices(4, 2));
        assert_eq!(
            resolve_field(&desc, &buffer()),
            Err(ResolveError::IndexOutOfRange {
                field_id: 5,
                index: 4,
                buffer_len: 4
            })
        );
    }

    #[test]
    fn test_misordered_range() {
        let desc = FieldDescriptor::new(6, "Backwards", CellRef::from_indices(1, 3));
        assert_eq!(
            resolve_field(&desc, &buffer()),
            Err(ResolveError::InvalidRange {
                field_id: 6,
                low: 3,
                high: 1
            })
        );
    }

    #[test]
    fn test_buffer_errors_map_one_to_one() {
        assert_eq!(
            ResolveError::from_buffer(7, BufferError::InvalidSpan { low: 5, high: 2 }),
            ResolveError::InvalidRange {
                field_id: 7,
                low: 5,
                high: 2
            }
        );
        assert_eq!(
            ResolveError::from_buffer(7, BufferError::IndexOutOfBounds { index: 9, len: 4 }),
            ResolveError::IndexOutOfRange {
                field_id: 7,
                index: 9,
                buffer_len: 4
            }
        );

        // Order is checked before bounds, even when both are wrong
        let desc = FieldDescriptor::new(8, "Both", CellRef::from_indices(50, 90));
        assert_eq!(
            resolve_field(&desc, &buffer()),
            Err(ResolveError::InvalidRange {
                field_id: 8,
                low: 90,
                high: 50
            })
        );
    }

    #[test]
    fn test_resolve_all_preserves_order() -> Result<()> {
        let descs = vec![
            FieldDescriptor::new(2, "Y", CellRef::from_indices(3, 1)),
            FieldDescriptor::new(1, "X", CellRef::Single(2)),
            FieldDescriptor::new(1, "X again", CellRef::Single(0)),
        ];
        let set = resolve_all(&descs, &buffer())?;

        assert_eq!(set.len(), 3);
        let ids: Vec<u16> = set.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![2, 1, 1]);
        assert_eq!(set.by_id(1).count(), 2);
        assert_eq!(set.get(2).map(|f| f.values.clone()), Some(vec![10]));

        // Same inputs, same output
        assert_eq!(resolve_all(&descs, &buffer())?, set);
        Ok(())
    }

    #[test]
    fn test_resolve_all_fails_fast() {
        let descs = vec![
            FieldDescriptor::new(1, "ok", CellRef::Single(0)),
            FieldDescriptor::new(2, "bad", CellRef::Single(99)),
            FieldDescriptor::new(3, "reversed", CellRef::from_indices(0, 2)),
        ];
        let err = resolve_all(&descs, &buffer()).unwrap_err();
        assert_eq!(err.field_id(), 2);
    }

    #[test]
    fn test_resolve_all_lenient() {
        let descs = vec![
            FieldDescriptor::new(1, "ok", CellRef::Single(0)),
            FieldDescriptor::new(2, "bad", CellRef::Single(99)),
            FieldDescriptor::new(3, "reversed", CellRef::from_indices(0, 2)),
            FieldDescriptor::new(4, "ok too", CellRef::from_indices(1, 0)),
        ];
        let (set, errors) = resolve_all_lenient(&descs, &buffer());

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).map(|f| f.values.clone()), Some(vec![10, 20]));
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[1], ResolveError::InvalidRange { .. }));
    }

    #[test]
    fn test_buffer_untouched() -> Result<()> {
        let buf = buffer();
        let before = buf.clone();
        let desc = FieldDescriptor::new(1, "X", CellRef::from_indices(3, 0));
        resolve_field(&desc, &buf)?;
        assert_eq!(buf, before);
        Ok(())
    }

    #[test]
    fn test_integer_views() -> Result<()> {
        let desc = FieldDescriptor::new(1, "SEC_COUNT", CellRef::from_indices(3, 0));
        let field = resolve_field(&desc, &buffer())?;
        assert_eq!(field.as_u64_le(), Some(0x281E140A));
        assert_eq!(field.as_u64_be(), Some(0x0A141E28));

        let wide = ResolvedField {
            descriptor: desc,
            values: vec![0; 9],
        };
        assert_eq!(wide.as_u64_le(), None);
        Ok(())
    }

    #[test]
    fn test_to_json() -> Result<()> {
        let descs = vec![
            FieldDescriptor::new(1, "Reserved", CellRef::from_indices(1, 0)),
            FieldDescriptor::new(2, "S_CMD_SET", CellRef::Single(3)),
        ];
        let json = resolve_all(&descs, &buffer())?.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"array":[{"id":1,"name":"Reserved","cells":"[1:0]","data":[10,20]},{"id":2,"name":"S_CMD_SET","cells":"[3]","data":[40]}]}"#
        );
        Ok(())
    }
}
