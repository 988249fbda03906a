// File format handlers
pub mod sheet;
pub mod table;

pub use sheet::{RegisterSheet, SheetData, SheetEntry, SheetError};
pub use table::{make_table, render_table};
