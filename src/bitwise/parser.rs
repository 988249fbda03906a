// Parser combinators using nom for register sheet notation
// CSD slices look like `[511:506]` (high:low) or `[505]`

use crate::core::field::CellRef;
use nom::{
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res, opt},
    sequence::{delimited, preceded},
    IResult, Parser,
};

/// Parse a decimal cell index, surrounding whitespace allowed
pub fn parse_index(input: &str) -> IResult<&str, u16> {
    map_res(delimited(multispace0, digit1, multispace0), |s: &str| {
        s.parse::<u16>()
    })
    .parse(input)
}

/// Parse a CSD slice into a cell reference
///
/// The first number is the high index. A lone number is a single cell.
pub fn parse_csd_slice(input: &str) -> IResult<&str, CellRef> {
    let (input, (high, low)) = delimited(
        (multispace0, char('[')),
        (parse_index, opt(preceded(char(':'), parse_index))),
        (char(']'), multispace0),
    )
    .parse(input)?;

    let cells = match low {
        Some(low) => CellRef::Range { high, low },
        None => CellRef::Single(high),
    };
    Ok((input, cells))
}

/// Parse a complete CSD slice string, rejecting trailing input
pub fn csd_slice(input: &str) -> Option<CellRef> {
    all_consuming(parse_csd_slice)
        .parse(input)
        .ok()
        .map(|(_, cells)| cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("506"), Ok(("", 506)));
        assert_eq!(parse_index("  7 ]"), Ok(("]", 7)));
        assert!(parse_index("x").is_err());
        assert!(parse_index("70000").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            csd_slice("[511:506]"),
            Some(CellRef::Range { high: 511, low: 506 })
        );
        assert_eq!(
            csd_slice(" [ 511 : 506 ] "),
            Some(CellRef::Range { high: 511, low: 506 })
        );
    }

    #[test]
    fn test_parse_single() {
        assert_eq!(csd_slice("[505]"), Some(CellRef::Single(505)));
        assert_eq!(csd_slice("[0]"), Some(CellRef::Single(0)));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(csd_slice("505"), None);
        assert_eq!(csd_slice("[505"), None);
        assert_eq!(csd_slice("[1:2:3]"), None);
        assert_eq!(csd_slice("[a:b]"), None);
        assert_eq!(csd_slice("[]"), None);
        assert_eq!(csd_slice("[5] trailing"), None);
    }

    #[test]
    fn test_partial_parse_leaves_rest() {
        let (rest, cells) = parse_csd_slice("[3:1]tail").unwrap();
        assert_eq!(cells, CellRef::Range { high: 3, low: 1 });
        assert_eq!(rest, "tail");
    }
}
