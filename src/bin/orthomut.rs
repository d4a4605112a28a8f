//! orthomut CLI
//!
//! Ortholog filtering, protein point mutations and PyMOL coloring scripts.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use orthomut::script::{DEFAULT_SITE_SCRIPT, DEFAULT_VARIANT_SCRIPT};

#[derive(Parser)]
#[command(name = "orthomut")]
#[command(author, version, about = "Ortholog filtering, protein mutants and structure coloring")]
#[command(
    long_about = "Ortholog filtering, protein mutants and structure coloring.

Every tool is a subcommand. The point mutation tool takes the protein file and
the mutations as positional arguments after `mutate`:
  orthomut mutate <INPUT_PROTEIN_FILE> <MUTATION>...

Examples:
  orthomut mutate ADA2.txt G47A Y453C
  orthomut filter-orthologs ADA2_orthologs.csv
  orthomut diopt-orthologs diopt_response.json 51816
  orthomut color-variants ADA2_clinvar.json -o color_code_script.pml"
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply point mutations to a protein and write <name>_mutant.txt
    Mutate {
        /// Protein text file; lines starting with '>' are headers
        input_protein_file: PathBuf,

        /// Mutations such as G47A, applied in the given order
        #[arg(required = true)]
        mutations: Vec<String>,
    },

    /// Keep reliable orthologs and write filtered_<table> next to the table
    FilterOrthologs {
        /// Ortholog table with entrez_id, symbol, best_score, best_score_rev and confidence columns
        table: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
    },

    /// Tabulate a saved DIOPT ortholog response and filter it
    DioptOrthologs {
        /// JSON response of get_orthologs_from_entrez
        response: PathBuf,

        /// Entrez id of the query gene
        entrez_id: String,

        /// Directory for the ortholog tables
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Color clinical variants by pathogenicity
    ColorVariants {
        /// JSON array of clinical variant records
        variants: PathBuf,

        /// Output PyMOL script
        #[arg(short, long, default_value = DEFAULT_VARIANT_SCRIPT)]
        output: PathBuf,
    },

    /// Color active and binding sites
    ColorSites {
        /// Tab-separated kind, start-end and optional description
        sites: PathBuf,

        /// Output PyMOL script
        #[arg(short, long, default_value = DEFAULT_SITE_SCRIPT)]
        output: PathBuf,
    },

    /// Keep the longest protein per gene of a multi-record FASTA file
    LongestIsoforms {
        input: PathBuf,
        output: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Mutate {
            input_protein_file,
            mutations,
        } => {
            let output = orthomut::make_mutant_file(&input_protein_file, mutations.as_slice())
                .with_context(|| {
                    format!(
                        "Could not create a mutant of {}",
                        input_protein_file.display()
                    )
                })?;
            info!(output = %output.display(), "mutant written");
            println!("{}", output.display());
        }
        Commands::FilterOrthologs { table, delimiter } => {
            let (filtered, output) = orthomut::filter_ortholog_file(&table, delimiter_byte(delimiter)?)
                .with_context(|| format!("Could not filter orthologs in {}", table.display()))?;
            println!(
                "Kept {} orthologs in {}",
                filtered.records.len(),
                output.display()
            );
        }
        Commands::DioptOrthologs {
            response,
            entrez_id,
            out_dir,
        } => {
            let (table, filtered) =
                orthomut::tabulate_diopt_response(&response, &entrez_id, &out_dir).with_context(
                    || format!("No DIOPT orthologs found for {}", entrez_id),
                )?;
            println!("{}\n{}", table.display(), filtered.display());
        }
        Commands::ColorVariants { variants, output } => {
            let positions = orthomut::color_variants(&variants, &output)
                .with_context(|| format!("Could not color variants from {}", variants.display()))?;
            println!(
                "Colored {} variant positions in {}",
                positions.iter().filter(|p| p.color.is_some()).count(),
                output.display()
            );
        }
        Commands::ColorSites { sites, output } => {
            orthomut::color_sites(&sites, &output)
                .with_context(|| format!("Could not color sites from {}", sites.display()))?;
            println!("{}", output.display());
        }
        Commands::LongestIsoforms { input, output } => {
            let longest = orthomut::longest_isoforms(&input, &output)
                .with_context(|| format!("Could not select isoforms from {}", input.display()))?;
            println!("Wrote {} proteins to {}", longest.len(), output.display());
        }
    }
    Ok(())
}
