pub mod error;
pub mod fasta;
pub mod interval;
mod mutation;
pub mod ortholog;
pub mod script;
pub mod sequence;
mod site_annotation;
pub mod variant;

use std::path::{Path, PathBuf};

use tracing::info;

pub use crate::error::{MutationError, OrthomutError, VariantError};
pub use crate::fasta::FastaRecord;
pub use crate::interval::ResidueRange;
pub use crate::mutation::MutationDescriptor;
pub use crate::ortholog::{filter_orthologs, OrthologRecord, OrthologTable};
pub use crate::script::ScriptEmitter;
pub use crate::sequence::{Sequence, LINE_WIDTH};
pub use crate::site_annotation::{read_site_annotations_from_file, SiteAnnotation, SiteKind};
pub use crate::variant::{extract_positions, AnnotatedPosition, Color, VariantRecord};

/// Apply point mutations to a reference record.
///
/// All descriptors are parsed before anything is applied, so a typo late in
/// the list fails just as early as a bad residue.
pub fn mutate_record<S: AsRef<str>>(
    reference: &FastaRecord,
    mutations: &[S],
) -> Result<FastaRecord, MutationError> {
    let descriptors = MutationDescriptor::parse_many(mutations)?;
    let mutant = reference.sequence.apply_mutations(&descriptors)?;
    Ok(FastaRecord::new(reference.header.clone(), mutant))
}

/// Read a protein file, apply the mutations and write `<name>_mutant.txt`
/// next to it. Nothing is written unless every mutation applies.
pub fn make_mutant_file<P: AsRef<Path>, S: AsRef<str>>(
    input: P,
    mutations: &[S],
) -> Result<PathBuf, OrthomutError> {
    let reference = fasta::read_protein_file(&input)?;
    let mutant = mutate_record(&reference, mutations)?;
    let output = fasta::mutant_output_path(&input);
    fasta::write_sequence_file(&output, &reference.mutant_header(), &mutant.sequence, LINE_WIDTH)?;
    Ok(output)
}

/// Filter an ortholog table file and save the reliable candidates as
/// `filtered_<name>` next to it
pub fn filter_ortholog_file<P: AsRef<Path>>(
    table: P,
    delimiter: u8,
) -> Result<(OrthologTable, PathBuf), OrthomutError> {
    let all = OrthologTable::read_from_file(&table, delimiter)?;
    let filtered = all.filtered();
    info!(
        candidates = all.records.len(),
        kept = filtered.records.len(),
        "filtered orthologs"
    );
    let output = ortholog::filtered_output_path(&table);
    filtered.write_to_file(&output, delimiter)?;
    Ok((filtered, output))
}

/// Normalize a saved DIOPT response, write the full table to `out_dir` and
/// its filtered companion beside it. Returns the paths of both tables.
pub fn tabulate_diopt_response<P: AsRef<Path>, D: AsRef<Path>>(
    response: P,
    entrez_id: &str,
    out_dir: D,
) -> Result<(PathBuf, PathBuf), OrthomutError> {
    let orthologs = ortholog::read_diopt_file(&response, entrez_id)?;
    let table_path = out_dir.as_ref().join(orthologs.file_name());
    orthologs.table.write_to_file(&table_path, b',')?;
    let (_, filtered_path) = filter_ortholog_file(&table_path, b',')?;
    Ok((table_path, filtered_path))
}

/// Color known clinical variants by pathogenicity
pub fn color_variants<P: AsRef<Path>, Q: AsRef<Path>>(
    variants: P,
    script: Q,
) -> Result<Vec<AnnotatedPosition>, OrthomutError> {
    let records = variant::read_variant_file(&variants)?;
    let positions = extract_positions(&records)?;
    info!(
        records = records.len(),
        positions = positions.len(),
        "extracted variant positions"
    );
    script::write_position_script_file(&script, &positions)?;
    Ok(positions)
}

/// Color active and binding sites
pub fn color_sites<P: AsRef<Path>, Q: AsRef<Path>>(
    sites: P,
    script: Q,
) -> Result<Vec<SiteAnnotation>, OrthomutError> {
    let sites = read_site_annotations_from_file(&sites)?;
    script::write_site_script_file(&script, &sites)?;
    Ok(sites)
}

/// Keep the longest protein of every gene in a multi-record FASTA file
pub fn longest_isoforms<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Vec<FastaRecord>, OrthomutError> {
    let records = fasta::read_fasta_file(&input)?;
    let total = records.len();
    let longest = fasta::longest_per_gene(records);
    info!(records = total, genes = longest.len(), "selected longest isoforms");
    fasta::write_fasta_file(&output, &longest)?;
    Ok(longest)
}
