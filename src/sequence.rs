use std::fmt;
use std::iter::{IntoIterator, Iterator};

use tracing::debug;

use crate::error::{MutationError, ParseError};
use crate::mutation::MutationDescriptor;

/// Residues per line when a sequence is written out. Downstream tools rely on it.
pub const LINE_WIDTH: usize = 50;

/// An ordered run of residues without headers or whitespace
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    residues: String,
}

impl Sequence {
    pub fn new<S: Into<String>>(residues: S) -> Result<Self, ParseError> {
        let residues = residues.into();
        if residues.chars().any(char::is_whitespace) {
            return Err(ParseError::somewhere(
                "residues without whitespace",
                residues,
            ));
        }
        Ok(Self { residues })
    }

    pub fn as_str(&self) -> &str {
        &self.residues
    }

    /// Number of residues
    pub fn len(&self) -> usize {
        self.residues.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residue at a 1-based position
    pub fn residue(&self, position: usize) -> Option<char> {
        position
            .checked_sub(1)
            .and_then(|offset| self.residues.chars().nth(offset))
    }

    /// Apply one substitution and return the resulting sequence.
    ///
    /// The position has to lie within the sequence and the residue found there
    /// has to be the one the mutation expects.
    pub fn apply_mutation(&self, mutation: &MutationDescriptor) -> Result<Self, MutationError> {
        let length = self.len();
        let offset = match mutation.offset() {
            Some(offset) if offset < length => offset,
            _ => {
                return Err(MutationError::PositionOutOfBounds {
                    mutation: *mutation,
                    position: mutation.position,
                    length,
                })
            }
        };
        let found = self
            .residues
            .chars()
            .nth(offset)
            .expect("offset is within the sequence");
        if found != mutation.original {
            return Err(MutationError::ResidueMismatch {
                mutation: *mutation,
                position: mutation.position,
                expected: mutation.original,
                found,
            });
        }
        let residues = self
            .residues
            .chars()
            .enumerate()
            .map(|(i, c)| if i == offset { mutation.new } else { c })
            .collect();
        Ok(Self { residues })
    }

    /// Apply substitutions one after another.
    ///
    /// Each mutation is checked against the sequence produced by the ones before
    /// it, so the order matters. The first failure aborts the whole batch.
    pub fn apply_mutations(&self, mutations: &[MutationDescriptor]) -> Result<Self, MutationError> {
        let mut working = self.clone();
        for mutation in mutations {
            working = working.apply_mutation(mutation)?;
            debug!(%mutation, "applied mutation");
        }
        Ok(working)
    }

    /// Split the sequence into lines of at most `width` residues
    pub fn lines(&self, width: usize) -> SeqLines<'_> {
        SeqLines::new(&self.residues, width)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.residues)
    }
}

/// Consecutive, non-overlapping chunks of a sequence
pub struct SeqLines<'a> {
    seq: &'a str,
    width: usize,
}

impl<'a> SeqLines<'a> {
    pub fn new(seq: &'a str, width: usize) -> Self {
        assert!(width > 0, "line width must be positive");
        Self { seq, width }
    }
}

pub struct SeqLinesIterator<'a> {
    lines: SeqLines<'a>,
}

impl<'a> IntoIterator for SeqLines<'a> {
    type Item = &'a str;
    type IntoIter = SeqLinesIterator<'a>;
    fn into_iter(self) -> Self::IntoIter {
        SeqLinesIterator { lines: self }
    }
}

impl<'a> Iterator for SeqLinesIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = &mut self.lines;
        if lines.seq.is_empty() {
            None // iterator exhausted
        } else {
            let split = lines
                .seq
                .char_indices()
                .nth(lines.width)
                .map(|(i, _)| i)
                .unwrap_or_else(|| lines.seq.len());
            let (line, rest) = lines.seq.split_at(split);
            lines.seq = rest;
            Some(line)
        }
    }
}
