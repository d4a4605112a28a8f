//! Ortholog candidate tables and the confidence filter that picks reliable ones.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{FileError, ParseError};

pub const ENTREZ_ID_COLUMN: &str = "entrez_id";
pub const SYMBOL_COLUMN: &str = "symbol";
pub const BEST_SCORE_COLUMN: &str = "best_score";
pub const BEST_SCORE_REV_COLUMN: &str = "best_score_rev";
pub const CONFIDENCE_COLUMN: &str = "confidence";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    ENTREZ_ID_COLUMN,
    SYMBOL_COLUMN,
    BEST_SCORE_COLUMN,
    BEST_SCORE_REV_COLUMN,
    CONFIDENCE_COLUMN,
];

pub const FILTERED_PREFIX: &str = "filtered_";

/// Whether a prediction method ranked this candidate as its best hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestScore {
    Yes,
    No,
    Other(String),
}

impl From<&str> for BestScore {
    fn from(s: &str) -> Self {
        match s {
            "Yes" => Self::Yes,
            "No" => Self::No,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for BestScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Qualitative confidence the scoring source attaches to a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confidence {
    High,
    Moderate,
    Low,
    Other(String),
}

impl Confidence {
    /// Only `high` and `moderate` count as support for orthology
    pub fn is_reliable(&self) -> bool {
        matches!(self, Self::High | Self::Moderate)
    }
}

impl From<&str> for Confidence {
    fn from(s: &str) -> Self {
        match s {
            "high" => Self::High,
            "moderate" => Self::Moderate,
            "low" => Self::Low,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Moderate => write!(f, "moderate"),
            Self::Low => write!(f, "low"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// One ortholog candidate.
///
/// `fields` holds the complete upstream row in the column order of the table
/// it came from, so that filtered tables keep every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthologRecord {
    pub entrez_id: String,
    pub symbol: String,
    pub best_score: BestScore,
    pub best_score_rev: BestScore,
    pub confidence: Confidence,
    pub fields: Vec<String>,
}

impl OrthologRecord {
    /// A record whose row consists of exactly the required columns
    pub fn new(
        entrez_id: &str,
        symbol: &str,
        best_score: BestScore,
        best_score_rev: BestScore,
        confidence: Confidence,
    ) -> Self {
        let fields = vec![
            entrez_id.to_string(),
            symbol.to_string(),
            best_score.to_string(),
            best_score_rev.to_string(),
            confidence.to_string(),
        ];
        Self {
            entrez_id: entrez_id.to_string(),
            symbol: symbol.to_string(),
            best_score,
            best_score_rev,
            confidence,
            fields,
        }
    }

    /// Any one of the three independent signals is enough
    pub fn is_reliable(&self) -> bool {
        self.best_score == BestScore::Yes
            || self.best_score_rev == BestScore::Yes
            || self.confidence.is_reliable()
    }
}

/// Keep the candidates that are likely the true ortholog, in input order
pub fn filter_orthologs(records: &[OrthologRecord]) -> Vec<OrthologRecord> {
    records.iter().filter(|r| r.is_reliable()).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthologTable {
    pub columns: Vec<String>,
    pub records: Vec<OrthologRecord>,
}

fn column_index(columns: &[String], name: &str) -> Result<usize, ParseError> {
    columns.iter().position(|c| c == name).ok_or_else(|| {
        ParseError::somewhere(
            "columns entrez_id, symbol, best_score, best_score_rev and confidence",
            columns.join(","),
        )
    })
}

impl OrthologTable {
    /// Build typed records from raw rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ParseError> {
        let entrez_idx = column_index(&columns, ENTREZ_ID_COLUMN)?;
        let symbol_idx = column_index(&columns, SYMBOL_COLUMN)?;
        let best_score_idx = column_index(&columns, BEST_SCORE_COLUMN)?;
        let best_score_rev_idx = column_index(&columns, BEST_SCORE_REV_COLUMN)?;
        let confidence_idx = column_index(&columns, CONFIDENCE_COLUMN)?;

        let mut records = Vec::with_capacity(rows.len());
        for (i, fields) in rows.into_iter().enumerate() {
            if fields.len() != columns.len() {
                return Err(ParseError::item(
                    "ortholog row",
                    i,
                    "one field per column",
                    format!("{} fields for {} columns", fields.len(), columns.len()),
                ));
            }
            records.push(OrthologRecord {
                entrez_id: fields[entrez_idx].clone(),
                symbol: fields[symbol_idx].clone(),
                best_score: fields[best_score_idx].as_str().into(),
                best_score_rev: fields[best_score_rev_idx].as_str().into(),
                confidence: fields[confidence_idx].as_str().into(),
                fields,
            });
        }
        Ok(Self { columns, records })
    }

    /// Same columns, only the reliable records
    pub fn filtered(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            records: filter_orthologs(&self.records),
        }
    }

    pub fn from_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<Self, FileError> {
        let (columns, rows) =
            read_rows(reader, delimiter).map_err(|e| FileError::csv(None::<&Path>, e))?;
        Self::from_rows(columns, rows).map_err(|e| FileError::parse(None::<&Path>, e))
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, FileError> {
        let file = File::open(&path).map_err(|e| FileError::io(Some(&path), e))?;
        let (columns, rows) = read_rows(BufReader::new(file), delimiter)
            .map_err(|e| FileError::csv(Some(&path), e))?;
        let table =
            Self::from_rows(columns, rows).map_err(|e| FileError::parse(Some(&path), e))?;
        debug!(path = %path.as_ref().display(), records = table.records.len(), "read ortholog table");
        Ok(table)
    }

    pub fn write<W: io::Write>(&self, out: W, delimiter: u8) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(out);
        writer.write_record(&self.columns)?;
        for record in &self.records {
            writer.write_record(&record.fields)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<(), FileError> {
        let file = File::create(&path).map_err(|e| FileError::io(Some(&path), e))?;
        self.write(BufWriter::new(file), delimiter)
            .map_err(|e| FileError::csv(Some(&path), e))?;
        info!(path = %path.as_ref().display(), records = self.records.len(), "wrote ortholog table");
        Ok(())
    }
}

fn read_rows<R: io::Read>(
    reader: R,
    delimiter: u8,
) -> csv::Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);
    let columns = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok((columns, rows))
}

/// `filtered_<name>` next to the original table
pub fn filtered_output_path<P: AsRef<Path>>(table: P) -> PathBuf {
    let table = table.as_ref();
    let name = table
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    table.with_file_name(format!("{}{}", FILTERED_PREFIX, name))
}

/// Response of the DIOPT `get_orthologs_from_entrez` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DioptResponse {
    pub search_details: SearchDetails,
    #[serde(default)]
    pub results: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDetails {
    #[serde(default)]
    pub gene_details: Vec<GeneDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneDetails {
    pub symbol: String,
}

/// Orthologs of one query gene, normalized into a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DioptOrthologs {
    pub query_symbol: String,
    pub table: OrthologTable,
}

impl DioptOrthologs {
    /// File name the table is saved under
    pub fn file_name(&self) -> String {
        format!("{}_orthologs.csv", self.query_symbol)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl DioptResponse {
    /// Turn the per-candidate objects into rows.
    ///
    /// Rows keep response order. Columns are `entrez_id` and `symbol` followed by
    /// all other fields in order of first appearance.
    pub fn into_orthologs(self, entrez_id: &str) -> Result<DioptOrthologs, ParseError> {
        let query_symbol = match self.search_details.gene_details.first() {
            Some(details) => details.symbol.clone(),
            None => {
                return Err(ParseError::somewhere(
                    "gene details for the query gene",
                    "an empty gene_details list".to_string(),
                ))
            }
        };
        let candidates = match self.results.get(entrez_id) {
            Some(Value::Object(candidates)) if !candidates.is_empty() => candidates,
            Some(other) => {
                return Err(ParseError::somewhere(
                    "a non-empty object of ortholog candidates",
                    other.to_string(),
                ))
            }
            None => {
                return Err(ParseError::somewhere(
                    "orthologs for the query gene",
                    format!("no results for entrez id {}", entrez_id),
                ))
            }
        };

        let mut columns = vec![ENTREZ_ID_COLUMN.to_string(), SYMBOL_COLUMN.to_string()];
        let mut objects = Vec::with_capacity(candidates.len());
        for (i, (candidate_id, value)) in candidates.iter().enumerate() {
            let object = match value {
                Value::Object(object) => object,
                other => {
                    return Err(ParseError::item(
                        "DIOPT ortholog",
                        i,
                        "a JSON object",
                        other.to_string(),
                    ))
                }
            };
            for key in &[BEST_SCORE_COLUMN, BEST_SCORE_REV_COLUMN, CONFIDENCE_COLUMN] {
                if !object.contains_key(*key) {
                    return Err(ParseError::item(
                        "DIOPT ortholog",
                        i,
                        "best_score, best_score_rev and confidence fields",
                        format!("candidate {} without {}", candidate_id, key),
                    ));
                }
            }
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            objects.push((candidate_id, object));
        }

        let rows = objects
            .into_iter()
            .map(|(candidate_id, object)| {
                columns
                    .iter()
                    .map(|column| {
                        if column == ENTREZ_ID_COLUMN {
                            candidate_id.clone()
                        } else {
                            object.get(column).map(render).unwrap_or_default()
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(DioptOrthologs {
            query_symbol,
            table: OrthologTable::from_rows(columns, rows)?,
        })
    }
}

pub fn read_diopt_file<P: AsRef<Path>>(path: P, entrez_id: &str) -> Result<DioptOrthologs, FileError> {
    let file = File::open(&path).map_err(|e| FileError::io(Some(&path), e))?;
    let response: DioptResponse =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| FileError::json(Some(&path), e))?;
    response
        .into_orthologs(entrez_id)
        .map_err(|e| FileError::parse(Some(&path), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, best_score: &str, best_score_rev: &str, confidence: &str) -> OrthologRecord {
        OrthologRecord::new(
            id,
            &format!("sym{}", id),
            best_score.into(),
            best_score_rev.into(),
            confidence.into(),
        )
    }

    #[test]
    fn test_enums_from_str() {
        assert_eq!(BestScore::from("Yes"), BestScore::Yes);
        assert_eq!(BestScore::from("No"), BestScore::No);
        assert_eq!(BestScore::from("yes"), BestScore::Other("yes".to_string()));
        assert_eq!(Confidence::from("high"), Confidence::High);
        assert_eq!(Confidence::from("moderate"), Confidence::Moderate);
        assert_eq!(Confidence::from("low"), Confidence::Low);
        assert_eq!(Confidence::from("High"), Confidence::Other("High".to_string()));
        assert_eq!(Confidence::from("").to_string(), "");
    }

    #[test]
    fn test_filter_keeps_best_score() {
        let records = vec![record("1", "Yes", "No", "low"), record("2", "No", "No", "low")];
        let filtered = filter_orthologs(&records);
        assert_eq!(filtered, vec![records[0].clone()]);
    }

    #[test]
    fn test_filter_signals_are_independent() {
        let records = vec![
            record("1", "No", "Yes", "low"),
            record("2", "No", "No", "high"),
            record("3", "No", "No", "moderate"),
            record("4", "No", "No", "low"),
            record("5", "NA", "", "unknown"),
            record("6", "Yes", "Yes", "high"),
        ];
        let ids: Vec<String> = filter_orthologs(&records)
            .into_iter()
            .map(|r| r.entrez_id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "6"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            record("1", "No", "No", "low"),
            record("2", "No", "No", "moderate"),
            record("3", "Yes", "No", "low"),
        ];
        let once = filter_orthologs(&records);
        assert_eq!(filter_orthologs(&once), once);
        assert!(filter_orthologs(&[]).is_empty());
    }

    #[test]
    fn test_from_rows_keeps_extra_columns() {
        let columns: Vec<String> = vec!["entrez_id", "symbol", "score", "best_score", "best_score_rev", "confidence"]
            .into_iter()
            .map(String::from)
            .collect();
        let rows = vec![vec!["42", "CG1", "13", "No", "No", "high"]
            .into_iter()
            .map(String::from)
            .collect()];
        let table = OrthologTable::from_rows(columns, rows).unwrap();
        assert_eq!(table.records[0].confidence, Confidence::High);
        assert_eq!(table.records[0].fields[2], "13");
    }

    #[test]
    fn test_from_rows_rejects_bad_tables() {
        let columns = vec!["entrez_id".to_string(), "symbol".to_string()];
        assert!(OrthologTable::from_rows(columns, vec![]).is_err());

        let columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = vec![vec!["1".to_string(), "CG1".to_string()]];
        assert!(OrthologTable::from_rows(columns, rows).is_err());
    }

    #[test]
    fn test_csv_round_trip_with_quoted_fields() {
        let text = "entrez_id,symbol,methods,best_score,best_score_rev,confidence\n\
                    31,Adgf-A,\"['Compara', 'Ensembl']\",Yes,Yes,high\n\
                    32,Adgf-B,[],No,No,low\n";
        let table = OrthologTable::from_reader(text.as_bytes(), b',').unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].fields[2], "['Compara', 'Ensembl']");

        let mut out = Vec::new();
        table.filtered().write(&mut out, b',').unwrap();
        let written = String::from_utf8(out).unwrap();
        assert_eq!(
            written,
            "entrez_id,symbol,methods,best_score,best_score_rev,confidence\n\
             31,Adgf-A,\"['Compara', 'Ensembl']\",Yes,Yes,high\n"
        );
    }

    #[test]
    fn test_filtered_output_path() {
        assert_eq!(
            filtered_output_path("out/ADA2_orthologs.csv"),
            PathBuf::from("out/filtered_ADA2_orthologs.csv")
        );
        assert_eq!(
            filtered_output_path("t.csv"),
            PathBuf::from("filtered_t.csv")
        );
    }

    const DIOPT_RESPONSE: &str = r#"{
        "search_details": {"gene_details": [{"symbol": "ADA2", "geneid": 51816}]},
        "results": {
            "51816": {
                "36300": {"symbol": "Adgf-A", "score": 9, "best_score": "Yes", "best_score_rev": "No", "confidence": "moderate"},
                "36299": {"symbol": "Adgf-B", "score": 3, "best_score": "No", "best_score_rev": "No", "confidence": "low", "alignment": null},
                "38180": {"symbol": "Adgf-D", "best_score": "No", "best_score_rev": "Yes", "confidence": "low"}
            }
        }
    }"#;

    #[test]
    fn test_diopt_response() {
        let response: DioptResponse = serde_json::from_str(DIOPT_RESPONSE).unwrap();
        let orthologs = response.into_orthologs("51816").unwrap();
        assert_eq!(orthologs.query_symbol, "ADA2");
        assert_eq!(orthologs.file_name(), "ADA2_orthologs.csv");
        let table = &orthologs.table;
        assert_eq!(
            table.columns,
            vec!["entrez_id", "symbol", "score", "best_score", "best_score_rev", "confidence", "alignment"]
        );
        let ids: Vec<&str> = table.records.iter().map(|r| r.entrez_id.as_str()).collect();
        assert_eq!(ids, vec!["36300", "36299", "38180"]);
        assert_eq!(table.records[0].fields[2], "9");
        assert_eq!(table.records[1].fields[6], "");
        assert_eq!(table.records[2].fields[2], "");

        let filtered = table.filtered();
        let ids: Vec<&str> = filtered.records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(ids, vec!["Adgf-A", "Adgf-D"]);
    }

    #[test]
    fn test_diopt_response_errors() {
        let response: DioptResponse = serde_json::from_str(DIOPT_RESPONSE).unwrap();
        assert!(response.into_orthologs("1234").is_err());

        let missing_confidence = r#"{
            "search_details": {"gene_details": [{"symbol": "ADA2"}]},
            "results": {"51816": {"36300": {"symbol": "Adgf-A", "best_score": "Yes", "best_score_rev": "No"}}}
        }"#;
        let response: DioptResponse = serde_json::from_str(missing_confidence).unwrap();
        assert!(response.into_orthologs("51816").is_err());

        let no_details = r#"{"search_details": {"gene_details": []}, "results": {}}"#;
        let response: DioptResponse = serde_json::from_str(no_details).unwrap();
        assert!(response.into_orthologs("51816").is_err());
    }
}
