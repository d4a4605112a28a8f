use std::fmt;

use crate::error::ParseError;

/// A stretch of residues
///
/// By convention, start and end are 1-based and both inclusive, the way
/// residues are numbered in protein annotations and structure viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueRange {
    pub start: usize, // inclusive
    pub end: usize,   // inclusive
}

impl ResidueRange {
    pub fn new(start: usize, end: usize) -> Result<ResidueRange, ParseError> {
        if start == 0 {
            Err(ParseError::somewhere(
                "1-based residue positions",
                format!("{}-{}", start, end),
            ))
        } else if end < start {
            Err(ParseError::somewhere(
                "start <= end",
                format!("{}>{}", start, end),
            ))
        } else {
            Ok(ResidueRange { start, end })
        }
    }

    pub fn single(position: usize) -> Result<ResidueRange, ParseError> {
        Self::new(position, position)
    }

    /// Parse `start-end` or a single position
    pub fn parse(range: &str) -> Result<ResidueRange, ParseError> {
        let parts: Vec<&str> = range.trim().split('-').collect();
        let parse_position = |part: &str| {
            part.parse::<usize>()
                .map_err(|_| ParseError::somewhere("residue position", part.to_string()))
        };
        match parts.as_slice() {
            [position] => Self::single(parse_position(position)?),
            [start, end] => Self::new(parse_position(start)?, parse_position(end)?),
            _ => Err(ParseError::somewhere("start-end", range.to_string())),
        }
    }
}

impl fmt::Display for ResidueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
