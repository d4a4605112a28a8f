//! Residue positions and pathogenicity colors from clinical variant records.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{FileError, VariantError};

/// A parenthetical protein-level change such as `(p.Arg41Gln)`
static PROTEIN_CHANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*p\.[^)]*)\)").unwrap());

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

const PROTEIN_MARKER: &str = "p.";

/// One record of a clinical-variant listing
///
/// Only the fields needed downstream are kept; everything else in the
/// upstream JSON is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantRecord {
    #[serde(default)]
    pub title: Option<String>,
    pub significance: Significance,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Significance {
    pub description: String,
}

impl VariantRecord {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            significance: Significance {
                description: description.to_string(),
            },
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// The protein change without its `p.` marker, if the title has one
    pub fn protein_change(&self) -> Option<String> {
        PROTEIN_CHANGE
            .captures(self.title())
            .and_then(|caps| caps.get(1))
            .map(|inner| inner.as_str().replacen(PROTEIN_MARKER, "", 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
}

impl Color {
    /// Red for pathogenic, green for benign, nothing for anything else
    pub fn classify(description: &str) -> Option<Self> {
        let description = description.to_lowercase();
        if description.contains("pathogenic") {
            Some(Self::Red)
        } else if description.contains("benign") {
            Some(Self::Green)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedPosition {
    pub position: usize,
    pub classification_label: String,
    pub color: Option<Color>,
}

fn residue_position(title: &str, protein_change: &str) -> Result<usize, VariantError> {
    let digit_runs: Vec<&str> = DIGIT_RUN
        .find_iter(protein_change)
        .map(|m| m.as_str())
        .collect();
    let digits = match digit_runs.as_slice() {
        [digits] => *digits,
        [] => {
            return Err(VariantError::NoPosition {
                title: title.to_string(),
                protein_change: protein_change.to_string(),
            })
        }
        _ => {
            return Err(VariantError::MultiplePositions {
                title: title.to_string(),
                protein_change: protein_change.to_string(),
                count: digit_runs.len(),
            })
        }
    };
    match digits.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(VariantError::InvalidPosition {
            title: title.to_string(),
            digits: digits.to_string(),
        }),
    }
}

/// Pin every protein-level variant to its residue and classify it.
///
/// Records without a protein change in their title are skipped. A protein
/// change that does not name exactly one residue position fails the whole batch.
pub fn extract_positions(records: &[VariantRecord]) -> Result<Vec<AnnotatedPosition>, VariantError> {
    let mut result = Vec::new();
    for record in records {
        let protein_change = match record.protein_change() {
            Some(change) => change,
            None => {
                debug!(title = record.title(), "no protein change, skipping");
                continue;
            }
        };
        let label = &record.significance.description;
        result.push(AnnotatedPosition {
            position: residue_position(record.title(), &protein_change)?,
            classification_label: label.clone(),
            color: Color::classify(label),
        });
    }
    Ok(result)
}

pub fn read_variant_file<P: AsRef<Path>>(path: P) -> Result<Vec<VariantRecord>, FileError> {
    let file = File::open(&path).map_err(|e| FileError::io(Some(&path), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| FileError::json(Some(&path), e))
}
