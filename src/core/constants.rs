// Constants shared by the decoder, parser and resolver
// Reference: JESD84-B51 section 7.4 (Extended CSD register)

/// Size of an Extended CSD register image in bytes
pub const EXT_CSD_LEN: usize = 512;

/// Value of `low_index` marking a single-cell field
pub const SINGLE_CELL_SENTINEL: u16 = u16::MAX;

/// Longest field name kept before truncation
pub const DEFAULT_MAX_NAME_LEN: usize = 127;

/// Most configuration records accepted in one file
pub const DEFAULT_MAX_RECORDS: usize = 4096;

/// Delimiter of the comma profile
pub const COMMA_DELIMITER: char = ',';

/// Delimiter of the colon profile
pub const COLON_DELIMITER: char = ':';

/// Names of the numeric record columns, in record order
pub const ID_FIELD: &str = "id";
pub const HIGH_INDEX_FIELD: &str = "high_index";
pub const LOW_INDEX_FIELD: &str = "low_index";
