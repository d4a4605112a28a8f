use std::fmt;
use std::str::FromStr;

use crate::error::MutationError;

/// A single-residue substitution such as `G47A`
///
/// The position is 1-based, as in the usual protein notation. Residue letters
/// are not checked against the amino acid alphabet here; a descriptor only
/// becomes meaningful when it is checked against a concrete sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationDescriptor {
    pub original: char,
    pub position: usize,
    pub new: char,
}

impl MutationDescriptor {
    pub fn new(original: char, position: usize, new: char) -> Self {
        Self {
            original,
            position,
            new,
        }
    }

    /// The substitution that undoes this one
    pub fn inverse(&self) -> Self {
        Self::new(self.new, self.position, self.original)
    }

    /// Zero-based offset into a sequence, or `None` for the invalid position 0
    pub fn offset(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    /// Parse every descriptor or fail on the first malformed one
    pub fn parse_many<S: AsRef<str>>(descriptors: &[S]) -> Result<Vec<Self>, MutationError> {
        descriptors.iter().map(|d| d.as_ref().parse()).collect()
    }
}

impl fmt::Display for MutationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.original, self.position, self.new)
    }
}

/// Split text into maximal runs of ASCII letters and ASCII digits.
///
/// "G47A" becomes ["G", "47", "A"]. Returns `None` as soon as a character is
/// neither a letter nor a digit.
fn split_on_transition(text: &str) -> Option<Vec<&str>> {
    let mut runs = Vec::new();
    let mut run_start = 0;
    let mut in_letters: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let is_letter = if c.is_ascii_alphabetic() {
            true
        } else if c.is_ascii_digit() {
            false
        } else {
            return None;
        };
        match in_letters {
            Some(previous) if previous != is_letter => {
                runs.push(&text[run_start..i]);
                run_start = i;
            }
            _ => {}
        }
        in_letters = Some(is_letter);
    }
    if in_letters.is_some() {
        runs.push(&text[run_start..]);
    }
    Some(runs)
}

fn single_residue(run: &str) -> Option<char> {
    let mut chars = run.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

impl FromStr for MutationDescriptor {
    type Err = MutationError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let malformed = || MutationError::MalformedDescriptor {
            descriptor: descriptor.to_string(),
        };
        let runs = split_on_transition(descriptor).ok_or_else(malformed)?;
        match runs.as_slice() {
            [original, position, new] => {
                let original = single_residue(original).ok_or_else(malformed)?;
                let new = single_residue(new).ok_or_else(malformed)?;
                // the runs alternate, so a leading letter forces a digit run here
                let position = position.parse::<usize>().map_err(|_| malformed())?;
                Ok(Self::new(original, position, new))
            }
            _ => Err(malformed()),
        }
    }
}
