//! Reading and writing protein sequence text.
//!
//! Single proteins come as plain text where lines starting with `>` are headers
//! and every other line contributes residues. Multi-record files are FASTA and
//! go through rust-bio.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bio::io::fasta;
use tracing::{info, warn};

use crate::error::{FileError, FileErrorSource, ParseError};
use crate::sequence::Sequence;

pub const HEADER_SENTINEL: char = '>';
pub const MUTANT_PREFIX: &str = "MUTANT_";

/// A header (without the leading `>`) and its residues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub header: String,
    pub sequence: Sequence,
}

impl FastaRecord {
    pub fn new(header: String, sequence: Sequence) -> Self {
        Self { header, sequence }
    }

    /// First whitespace-delimited token of the header
    pub fn id(&self) -> &str {
        self.header.split_whitespace().next().unwrap_or("")
    }

    /// Everything in the header after the id
    pub fn description(&self) -> Option<&str> {
        self.header
            .trim_start()
            .split_once(char::is_whitespace)
            .map(|(_, desc)| desc.trim_start())
            .filter(|desc| !desc.is_empty())
    }

    /// The gene identifier, i.e. the part of the id before the first `|`
    pub fn gene_id(&self) -> &str {
        self.id().split('|').next().unwrap_or("")
    }

    /// Header line marking this record as a mutant of the original
    pub fn mutant_header(&self) -> String {
        format!("{}{}{}", HEADER_SENTINEL, MUTANT_PREFIX, self.header)
    }
}

impl TryFrom<fasta::Record> for FastaRecord {
    type Error = ParseError;

    fn try_from(record: fasta::Record) -> Result<Self, Self::Error> {
        let header = match record.desc() {
            Some(desc) => format!("{} {}", record.id(), desc),
            None => record.id().to_string(),
        };
        let residues = String::from_utf8(record.seq().to_vec()).map_err(|e| {
            ParseError::somewhere("UTF-8 residues", String::from_utf8_lossy(e.as_bytes()).into_owned())
        })?;
        Ok(Self::new(header, Sequence::new(residues)?))
    }
}

/// Write residues as lines of `width` characters
pub fn write_wrapped<W: Write>(out: &mut W, sequence: &Sequence, width: usize) -> io::Result<()> {
    for line in sequence.lines(width) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn strip_whitespace(line: &str) -> String {
    line.split_whitespace().collect()
}

/// Read protein text as a single record.
///
/// All non-header lines are concatenated. If there are several header lines,
/// the last one names the record; without any header the record name is empty.
/// Only trailing whitespace is removed from the header.
pub fn parse_protein_text(text: &str) -> Result<FastaRecord, ParseError> {
    let mut header = None;
    let mut residues = String::new();
    let mut header_count = 0;
    for line in text.lines() {
        if let Some(h) = line.strip_prefix(HEADER_SENTINEL) {
            header = Some(h.trim_end().to_string());
            header_count += 1;
        } else {
            residues.push_str(&strip_whitespace(line));
        }
    }
    if header_count > 1 {
        warn!(
            header_count,
            "found several header lines; residues are concatenated and the last header is used"
        );
    }
    if residues.is_empty() {
        return Err(ParseError::somewhere(
            "at least one residue",
            "an empty sequence".to_string(),
        ));
    }
    Ok(FastaRecord::new(
        header.unwrap_or_default(),
        Sequence::new(residues)?,
    ))
}

pub fn read_protein_file<P: AsRef<Path>>(path: P) -> Result<FastaRecord, FileError> {
    let text = std::fs::read_to_string(&path).map_err(|e| FileError::io(Some(&path), e))?;
    parse_protein_text(&text).map_err(|e| FileError::parse(Some(&path), e))
}

/// Read all records of a multi-record FASTA stream
pub fn read_fasta_records<R: Read>(reader: R) -> Result<Vec<FastaRecord>, FileErrorSource> {
    let mut result = Vec::new();
    for (i, record) in fasta::Reader::new(reader).records().enumerate() {
        let record = record?;
        let record = FastaRecord::try_from(record).map_err(|e| {
            ParseError::item("FASTA record", i + 1, "a protein sequence", e.to_string())
        })?;
        result.push(record);
    }
    Ok(result)
}

pub fn read_fasta_file<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>, FileError> {
    let file = File::open(&path).map_err(|e| FileError::io(Some(&path), e))?;
    read_fasta_records(file).map_err(|e| FileError::with_source(Some(&path), e))
}

/// Keep the longest record for every gene.
///
/// Genes are reported in order of first appearance. On a tie the earlier
/// record wins.
pub fn longest_per_gene(records: Vec<FastaRecord>) -> Vec<FastaRecord> {
    let mut result: Vec<FastaRecord> = Vec::new();
    for record in records {
        match result.iter_mut().find(|r| r.gene_id() == record.gene_id()) {
            Some(best) => {
                if record.sequence.len() > best.sequence.len() {
                    *best = record;
                }
            }
            None => result.push(record),
        }
    }
    result
}

/// `<dir>/<name up to the first '.'>_mutant.txt` next to the input file
pub fn mutant_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or("");
    input.with_file_name(format!("{}_mutant.txt", stem))
}

/// Write a header line followed by the wrapped sequence
pub fn write_sequence_file<P: AsRef<Path>>(
    path: P,
    header_line: &str,
    sequence: &Sequence,
    width: usize,
) -> Result<(), FileError> {
    let io_err = |e| FileError::io(Some(&path), e);
    let mut out = BufWriter::new(File::create(&path).map_err(io_err)?);
    writeln!(out, "{}", header_line).map_err(io_err)?;
    write_wrapped(&mut out, sequence, width).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    info!(path = %path.as_ref().display(), residues = sequence.len(), "wrote sequence");
    Ok(())
}

/// Write records as FASTA, one sequence line per record
pub fn write_fasta_records<W: Write>(out: W, records: &[FastaRecord]) -> io::Result<()> {
    let mut writer = fasta::Writer::new(out);
    for record in records {
        writer.write(
            record.id(),
            record.description(),
            record.sequence.as_str().as_bytes(),
        )?;
    }
    writer.flush()
}

pub fn write_fasta_file<P: AsRef<Path>>(path: P, records: &[FastaRecord]) -> Result<(), FileError> {
    let file = File::create(&path).map_err(|e| FileError::io(Some(&path), e))?;
    write_fasta_records(file, records).map_err(|e| FileError::io(Some(&path), e))?;
    info!(path = %path.as_ref().display(), records = records.len(), "wrote FASTA");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::LINE_WIDTH;

    #[test]
    fn test_parse_protein_text() {
        let text = ">NP_001273.1 adenosine deaminase 2 [Homo sapiens]\nMLVDGPSERPALCFLLLAVAMSFFGSALSIDETRAHLLLKEKMMRLGGRLVLNTKEELANERLMTLKIAEMKEAMRTLIFPPSMHFFQAKHLIERSQVFNILRMMPKGAALHLHDIGIVTMDWLVRNVTYRPHCHICFTPRGIMQFRFAHPTPRPSEKCSKWILLEDYRKRVQNVTEFDDSLLRNFTLVTQHPEVIYTNQNVVWSKFETIFFTISGLIHYAPVFRDYVFRSMQEFYEDNVLYMEIRARLLPVYELSGEHHDEEWSVKTYQEVAQKFVETHPEFIGIKIKIYS\n";
        let record = parse_protein_text(text).unwrap();
        assert_eq!(
            record.header,
            "NP_001273.1 adenosine deaminase 2 [Homo sapiens]"
        );
        assert_eq!(record.id(), "NP_001273.1");
        assert!(record.sequence.as_str().starts_with("MLVDGPS"));
        assert_eq!(
            record.mutant_header(),
            ">MUTANT_NP_001273.1 adenosine deaminase 2 [Homo sapiens]"
        );
    }

    #[test]
    fn test_parse_protein_text_joins_lines() {
        let record = parse_protein_text(">p1\nMKV\n  LA \r\nG H\n").unwrap();
        assert_eq!(record.sequence.as_str(), "MKVLAGH");
    }

    #[test]
    fn test_parse_protein_text_without_header() {
        let record = parse_protein_text("MKVLA\n").unwrap();
        assert_eq!(record.header, "");
        assert_eq!(record.mutant_header(), ">MUTANT_");
    }

    #[test]
    fn test_parse_protein_text_last_header_wins() {
        let record = parse_protein_text(">first\nMK\n>second\nVL\n").unwrap();
        assert_eq!(record.header, "second");
        assert_eq!(record.sequence.as_str(), "MKVL");
    }

    #[test]
    fn test_parse_protein_text_empty() {
        assert!(parse_protein_text(">only a header\n").is_err());
        assert!(parse_protein_text("").is_err());
    }

    #[test]
    fn test_parse_protein_text_keeps_leading_header_space() {
        let record = parse_protein_text(">  NP_1 spaced \nMK\n").unwrap();
        assert_eq!(record.header, "  NP_1 spaced");
        assert_eq!(record.mutant_header(), ">MUTANT_  NP_1 spaced");
        assert_eq!(record.id(), "NP_1");
    }

    #[test]
    fn test_write_sequence_wrapped() {
        let mut out = Vec::new();
        write_wrapped(&mut out, &Sequence::new("A".repeat(101)).unwrap(), LINE_WIDTH).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 50);
        assert_eq!(lines[1].len(), 50);
        assert_eq!(lines[2], "A");
        assert!(text.ends_with("A\n"));
    }

    #[test]
    fn test_description() {
        let record = FastaRecord::new("51816|NP_2 isoform b".to_string(), Sequence::new("MK").unwrap());
        assert_eq!(record.id(), "51816|NP_2");
        assert_eq!(record.description(), Some("isoform b"));
        let bare = FastaRecord::new("100|NP_3".to_string(), Sequence::new("MK").unwrap());
        assert_eq!(bare.description(), None);
    }

    #[test]
    fn test_read_fasta_records() {
        let text = ">51816|a isoform 1\nMKV\nLA\n>51816|b isoform 2\nMK\n>100|c\nMKVLAG\n";
        let records = read_fasta_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sequence.as_str(), "MKVLA");
        assert_eq!(records[0].header, "51816|a isoform 1");
        assert_eq!(records[0].gene_id(), "51816");
        assert_eq!(records[2].id(), "100|c");
        assert_eq!(records[2].gene_id(), "100");

        assert!(read_fasta_records("MKV\n>x\nMK\n".as_bytes()).is_err());
        assert!(read_fasta_records("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_write_fasta_records() {
        let records = vec![
            FastaRecord::new("51816|NP_2 isoform b".to_string(), Sequence::new("MKVLAG").unwrap()),
            FastaRecord::new("100|NP_3".to_string(), Sequence::new("MK").unwrap()),
        ];
        let mut out = Vec::new();
        write_fasta_records(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ">51816|NP_2 isoform b\nMKVLAG\n>100|NP_3\nMK\n");
        assert_eq!(read_fasta_records(text.as_bytes()).unwrap(), records);
    }

    #[test]
    fn test_longest_per_gene() {
        let text = ">1|a\nMK\n>2|a\nMKVLA\n>1|b\nMKVL\n>1|c\nMKVL\n>2|b\nM\n";
        let longest = longest_per_gene(read_fasta_records(text.as_bytes()).unwrap());
        let ids: Vec<&str> = longest.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1|b", "2|a"]);
    }

    #[test]
    fn test_mutant_output_path() {
        assert_eq!(
            mutant_output_path("data/ADA2.txt"),
            PathBuf::from("data/ADA2_mutant.txt")
        );
        assert_eq!(
            mutant_output_path("ADA2.protein.faa"),
            PathBuf::from("ADA2_mutant.txt")
        );
        assert_eq!(mutant_output_path("ADA2"), PathBuf::from("ADA2_mutant.txt"));
    }
}
