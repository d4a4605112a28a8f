use std::convert::TryFrom;
use std::path::Path;

use tabfile::Tabfile;

use crate::error::{FileError, ParseError};
use crate::interval::ResidueRange;

/// Functional site categories as reported by protein feature tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKind {
    ActiveSite,
    BindingSite,
    Other(String),
}

impl From<&str> for SiteKind {
    fn from(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "active site" | "active_site" => Self::ActiveSite,
            "binding site" | "binding_site" => Self::BindingSite,
            _ => Self::Other(kind.trim().to_string()),
        }
    }
}

impl std::fmt::Display for SiteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActiveSite => write!(f, "Active site"),
            Self::BindingSite => write!(f, "Binding site"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAnnotation {
    pub kind: SiteKind,              // col 0
    pub range: ResidueRange,         // col 1
    pub description: Option<String>, // col 2, optional
}

impl SiteAnnotation {
    pub fn new(kind: SiteKind, range: ResidueRange, description: Option<String>) -> Self {
        Self {
            kind,
            range,
            description,
        }
    }
}

impl TryFrom<&[&str]> for SiteAnnotation {
    type Error = ParseError;
    fn try_from(fields: &[&str]) -> Result<Self, Self::Error> {
        if fields.len() < 2 {
            return Err(ParseError::somewhere(
                "at least 2 columns",
                fields.join("\t"),
            ));
        }
        let description = fields
            .get(2)
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(String::from);
        Ok(Self::new(
            fields[0].into(),
            ResidueRange::parse(fields[1])?,
            description,
        ))
    }
}

/// Read tab-separated site annotations: `kind`, `start-end` and an optional
/// free-text description. Lines starting with `#` are ignored.
pub fn read_site_annotations_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<SiteAnnotation>, FileError> {
    let mut result = Vec::new();
    let tabfile = match Tabfile::open(&path) {
        Ok(tf) => tf.comment_character('#'),
        Err(e) => return Err(FileError::io(Some(&path), e)),
    };
    for record_result in tabfile {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => return Err(FileError::io(Some(&path), e)),
        };
        let tokens = record.fields();
        if tokens.iter().all(|t| t.trim().is_empty()) {
            continue;
        }
        let site = SiteAnnotation::try_from(&tokens[..]).map_err(|e| {
            let err = ParseError::file(
                path.as_ref().to_path_buf(),
                record.line_number(),
                "<kind>\\t<start>-<end>[\\t<description>]",
                format!("{} ({})", record.line(), e),
            );
            FileError::parse(Some(&path), err)
        })?;
        result.push(site);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_kind() {
        assert_eq!(SiteKind::from("Active site"), SiteKind::ActiveSite);
        assert_eq!(SiteKind::from("binding site"), SiteKind::BindingSite);
        assert_eq!(SiteKind::from("Binding_site"), SiteKind::BindingSite);
        assert_eq!(
            SiteKind::from("Metal binding"),
            SiteKind::Other("Metal binding".to_string())
        );
        assert_eq!(SiteKind::ActiveSite.to_string(), "Active site");
    }

    #[test]
    fn test_site_from_fields() {
        let fields: &[&str] = &["Active site", "112", "Proton donor"];
        let site = SiteAnnotation::try_from(fields).unwrap();
        assert_eq!(site.kind, SiteKind::ActiveSite);
        assert_eq!(site.range, ResidueRange::single(112).unwrap());
        assert_eq!(site.description.as_deref(), Some("Proton donor"));

        let fields: &[&str] = &["Binding site", "84-86", ""];
        let site = SiteAnnotation::try_from(fields).unwrap();
        assert_eq!(site.range, ResidueRange::new(84, 86).unwrap());
        assert_eq!(site.description, None);

        let fields: &[&str] = &["Binding site"];
        assert!(SiteAnnotation::try_from(fields).is_err());
        let fields: &[&str] = &["Binding site", "86-84"];
        assert!(SiteAnnotation::try_from(fields).is_err());
    }
}
