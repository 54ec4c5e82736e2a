use itpkit::core::models::ids::AtomId;
use thiserror::Error;

/// Largest number of ids a single range may expand to.
pub const MAX_RANGE_LEN: u32 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Atom selection is empty. Expected ids or ranges (e.g., '15,20-22').")]
    Empty,

    #[error("Invalid atom id '{0}'. Expected a positive integer.")]
    InvalidId(String),

    #[error("Invalid range '{0}'. Expected 'START-END' with 1 <= START <= END.")]
    InvalidRange(String),

    #[error("Range '{range}' spans more than {max} atom ids.")]
    RangeTooLarge { range: String, max: u32 },
}

/// Parses a selection such as `15,20-22` into atom ids in the given order.
///
/// Items may be separated by commas or whitespace; ranges are inclusive.
pub fn parse_id_list(input: &str) -> Result<Vec<AtomId>, ParseError> {
    let mut ids = Vec::new();
    for item in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
    {
        match item.split_once('-') {
            Some((start, end)) => {
                let invalid = || ParseError::InvalidRange(item.to_string());
                let start = parse_positive(start).ok_or_else(invalid)?;
                let end = parse_positive(end).ok_or_else(invalid)?;
                if start > end {
                    return Err(invalid());
                }
                if end - start >= MAX_RANGE_LEN {
                    return Err(ParseError::RangeTooLarge {
                        range: item.to_string(),
                        max: MAX_RANGE_LEN,
                    });
                }
                ids.extend((start..=end).map(AtomId::new));
            }
            None => {
                let id = parse_positive(item).ok_or_else(|| ParseError::InvalidId(item.to_string()))?;
                ids.push(AtomId::new(id));
            }
        }
    }

    if ids.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(ids)
}

fn parse_positive(token: &str) -> Option<u32> {
    token.trim().parse::<u32>().ok().filter(|&value| value > 0)
}
