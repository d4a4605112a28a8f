use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mutation::MutationDescriptor;

#[derive(Debug, Error)]
#[error("Expected {expected} {location} but observed: {observed}")]
pub struct ParseError {
    expected: &'static str,
    observed: String,
    location: Location,
}

#[derive(Debug)]
pub enum Location {
    Unknown,
    File { path: PathBuf, line: usize },
    Item { type_: &'static str, index: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => write!(f, "at unknown location"),
            Location::File { path, line } => {
                write!(f, "in file {} on line {}", path.display(), line)
            }
            Location::Item { type_, index } => {
                write!(f, "for {} at index {}", type_, index)
            }
        }
    }
}

impl ParseError {
    pub fn somewhere(expected: &'static str, observed: String) -> Self {
        Self {
            expected,
            observed,
            location: Location::Unknown,
        }
    }

    pub fn file(path: PathBuf, line: usize, expected: &'static str, observed: String) -> Self {
        Self {
            expected,
            observed,
            location: Location::File { path, line },
        }
    }

    pub fn item(
        type_: &'static str,
        index: usize,
        expected: &'static str,
        observed: String,
    ) -> Self {
        Self {
            expected,
            observed,
            location: Location::Item { type_, index },
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug, Error)]
pub struct FileError {
    path: Option<PathBuf>,
    #[source]
    source: FileErrorSource,
}

impl FileError {
    pub(crate) fn with_source<P: AsRef<Path>>(path: Option<P>, source: FileErrorSource) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source,
        }
    }

    pub fn io<P: AsRef<Path>>(path: Option<P>, error: std::io::Error) -> Self {
        Self::with_source(path, error.into())
    }

    pub fn parse<P: AsRef<Path>>(path: Option<P>, error: ParseError) -> Self {
        Self::with_source(path, error.into())
    }

    pub fn json<P: AsRef<Path>>(path: Option<P>, error: serde_json::Error) -> Self {
        Self::with_source(path, error.into())
    }

    pub fn csv<P: AsRef<Path>>(path: Option<P>, error: csv::Error) -> Self {
        Self::with_source(path, error.into())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Failed to work with file {}", path.display()),
            None => write!(f, "Failed to work with anonymous file"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileErrorSource {
    #[error("Failed to parse file")]
    Parse {
        #[from]
        source: ParseError,
    },
    #[error("Failed to read/write to file")]
    IO {
        #[from]
        source: std::io::Error,
    },
    #[error("Malformed JSON document")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Malformed delimited table")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

/// Failures while turning mutation notation into a mutant sequence.
///
/// Every variant aborts the whole batch: a partially mutated sequence is never
/// handed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Malformed mutation '{descriptor}': expected <residue><position><residue> such as G47A")]
    MalformedDescriptor { descriptor: String },
    #[error("Mutation {mutation}: position {position} is outside of the sequence (length {length})")]
    PositionOutOfBounds {
        mutation: MutationDescriptor,
        position: usize,
        length: usize,
    },
    #[error("Mutation {mutation}: expected residue '{expected}' at position {position} but found '{found}'")]
    ResidueMismatch {
        mutation: MutationDescriptor,
        position: usize,
        expected: char,
        found: char,
    },
}

/// A clinical variant whose protein change cannot be pinned to one residue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("Variant '{title}': protein change '{protein_change}' names {count} residue positions, expected exactly one")]
    MultiplePositions {
        title: String,
        protein_change: String,
        count: usize,
    },
    #[error("Variant '{title}': protein change '{protein_change}' does not name a residue position")]
    NoPosition {
        title: String,
        protein_change: String,
    },
    #[error("Variant '{title}': '{digits}' is not a valid residue position")]
    InvalidPosition { title: String, digits: String },
}

/// Catch-all error for top-level API
#[derive(Debug, Error)]
pub enum OrthomutError {
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error(transparent)]
    FileError(#[from] FileError),
    #[error(transparent)]
    MutationError(#[from] MutationError),
    #[error(transparent)]
    VariantError(#[from] VariantError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::file(
            PathBuf::from("sites.tsv"),
            3,
            "start-end",
            "12-".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Expected start-end in file sites.tsv on line 3 but observed: 12-"
        );

        let err = ParseError::item("ortholog record", 2, "a best_score field", "".to_string());
        assert_eq!(
            err.to_string(),
            "Expected a best_score field for ortholog record at index 2 but observed: "
        );
    }

    #[test]
    fn test_residue_mismatch_message() {
        let err = MutationError::ResidueMismatch {
            mutation: MutationDescriptor::new('G', 47, 'A'),
            position: 47,
            expected: 'G',
            found: 'M',
        };
        let message = err.to_string();
        assert!(message.contains("G47A"));
        assert!(message.contains("'G'"));
        assert!(message.contains("'M'"));
        assert!(message.contains("47"));
    }
}
