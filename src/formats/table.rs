//! Plain-text table rendering for resolved fields

use crate::core::resolver::{ResolvedField, ResolvedSet};
use prettytable::{format, Cell, Row, Table};

const HEADERS: [&str; 5] = ["ID", "Name", "Cells", "Data", "Hex"];

/// How many values are printed before the row is elided
const MAX_INLINE_VALUES: usize = 16;

/// Build the table for @set, one row per field
pub fn make_table(set: &ResolvedSet) -> Table {
    let mut table = Table::new();
    table.set_titles(Row::new(HEADERS.iter().map(|h| Cell::new(h)).collect()));

    for field in set {
        table.add_row(row(field));
    }

    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

/// Render @set as an aligned text table
pub fn render_table(set: &ResolvedSet) -> String {
    make_table(set).to_string()
}

fn row(field: &ResolvedField) -> Row {
    Row::new(vec![
        Cell::new(&field.id().to_string()),
        Cell::new(field.name()),
        Cell::new(&field.cells().to_string()),
        Cell::new(&format_decimal(&field.values)),
        Cell::new(&format_hex(&field.values)),
    ])
}

/// `[0, 1, 63]`
fn format_decimal(values: &[u8]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MAX_INLINE_VALUES)
        .map(|v| v.to_string())
        .collect();
    if values.len() > MAX_INLINE_VALUES {
        format!("[{}, ... +{}]", shown.join(", "), values.len() - MAX_INLINE_VALUES)
    } else {
        format!("[{}]", shown.join(", "))
    }
}

/// `00 01 3F`
fn format_hex(values: &[u8]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MAX_INLINE_VALUES)
        .map(|v| format!("{:02X}", v))
        .collect();
    if values.len() > MAX_INLINE_VALUES {
        format!("{} ...", shown.join(" "))
    } else {
        shown.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{CellRef, FieldDescriptor};

    fn field(id: u16, name: &str, cells: CellRef, values: Vec<u8>) -> ResolvedField {
        ResolvedField {
            descriptor: FieldDescriptor::new(id, name, cells),
            values,
        }
    }

    #[test]
    fn test_render_table() {
        let set = ResolvedSet::new(vec![
            field(1, "Reserved", CellRef::Range { high: 511, low: 506 }, vec![0; 6]),
            field(6, "Max packed read commands", CellRef::Single(501), vec![63]),
        ]);
        let table = render_table(&set);
        let lines: Vec<&str> = table.lines().collect();

        // Titles, separator, two rows
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("ID"));
        assert!(lines[0].contains("Hex"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].contains("Reserved"));
        assert!(lines[2].contains("[511:506]"));
        assert!(lines[2].contains("[0, 0, 0, 0, 0, 0]"));
        assert!(lines[3].contains("[501]"));
        assert!(lines[3].contains("[63]"));
        assert!(lines[3].trim_end().ends_with("3F"));
    }

    #[test]
    fn test_columns_aligned() {
        let set = ResolvedSet::new(vec![
            field(1, "A", CellRef::Single(0), vec![1]),
            field(200, "Longer name", CellRef::Single(1), vec![2]),
        ]);
        let table = render_table(&set);
        let lines: Vec<&str> = table.lines().collect();

        let col = lines[0].find("Cells").unwrap();
        assert_eq!(lines[2].find("[0]"), Some(col));
        assert_eq!(lines[3].find("[1]"), Some(col));

        let separators = |line: &str| -> Vec<usize> {
            line.char_indices()
                .filter(|&(_, c)| c == '|')
                .map(|(i, _)| i)
                .collect()
        };
        assert_eq!(separators(lines[0]), separators(lines[2]));
        assert_eq!(separators(lines[2]), separators(lines[3]));
    }

    #[test]
    fn test_empty_set() {
        let table = make_table(&ResolvedSet::default());
        assert!(table.is_empty());

        let text = table.to_string();
        assert!(text.lines().next().is_some_and(|l| l.contains("Name")));
    }

    #[test]
    fn test_long_values_elided() {
        assert_eq!(format_decimal(&[1, 2]), "[1, 2]");
        assert_eq!(format_hex(&[0x0A, 0xFF]), "0A FF");

        let long = vec![0u8; 20];
        assert!(format_decimal(&long).ends_with(", ... +4]"));
        assert!(format_hex(&long).ends_with(" ..."));
    }
}
