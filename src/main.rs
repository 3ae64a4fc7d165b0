use anyhow::*;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use phospho_sites::io::schema::ColumnNames;
use phospho_sites::io::table::{Delimiter, InputOptions, OutputOptions};
use phospho_sites::{run_pipeline, DemotedSiteCase, PipelineConfig, PHOSPHO_SITE_SCORE_THRESHOLD};

/// Formats phospho-peptides with a '*' after their validated phospho-site and keeps, for each
/// peptide, the observation with the lowest p-value.
#[derive(Debug, Parser)]
#[command(name = "phospho-sites", version)]
struct Cli {
    /// Path to the dataset to be processed
    dataset_path: PathBuf,

    /// Name of the column containing phospho-peptide sequence, including phosphorylation probability scores
    #[arg(short = 's', long)]
    sequence: String,

    /// Name of the column containing position of phospho-site in peptide sequence
    #[arg(short = 'x', long)]
    position: String,

    /// Name of the column containing fold change
    #[arg(short = 'f', long)]
    fold_change: String,

    /// Name of the column containing p values
    #[arg(short = 'p', long)]
    p_value: String,

    /// (If using the --protein-info flag) Name of the column containing gene names
    #[arg(short = 'g', long)]
    gene_name: Option<String>,

    /// (If using the --protein-info flag) Name of the column containing protein IDs
    #[arg(short = 'i', long)]
    protein_id: Option<String>,

    /// Output file path
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Include header row in output file
    #[arg(long)]
    header: bool,

    /// Include protein ID and gene name columns in output file (requires -i and -g arguments)
    #[arg(long, requires_all = ["protein_id", "gene_name"])]
    protein_info: bool,

    /// Minimal phosphorylation probability score of a phospho-site
    #[arg(long, default_value_t = PHOSPHO_SITE_SCORE_THRESHOLD)]
    threshold: f64,

    /// Write alternative phospho-sites of ambiguous peptides in lowercase
    #[arg(long)]
    lowercase_alternatives: bool,

    /// Write every row with a validated phospho-site instead of the best row of each peptide
    #[arg(long)]
    keep_all: bool,

    #[arg(long, value_enum, default_value_t = Delimiter::Comma)]
    input_delimiter: Delimiter,

    #[arg(long, value_enum, default_value_t = Delimiter::Comma)]
    output_delimiter: Delimiter,

    /// Log every processed row
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let columns = ColumnNames {
            sequence: self.sequence,
            position: self.position,
            fold_change: self.fold_change,
            p_value: self.p_value,
            protein_id: self.protein_id,
            gene_name: self.gene_name,
        };

        PipelineConfig {
            score_threshold: self.threshold,
            demoted_site_case: if self.lowercase_alternatives { DemotedSiteCase::Lowercase } else { DemotedSiteCase::Preserve },
            aggregate: !self.keep_all,
            input: InputOptions { delimiter: self.input_delimiter },
            output: OutputOptions {
                delimiter: self.output_delimiter,
                include_header: self.header,
                include_protein_info: self.protein_info,
            },
            ..PipelineConfig::new(self.dataset_path, self.output, columns)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info,phospho_sites=debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {

    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!(?cli, "parsed arguments");

    let config = cli.into_config();
    run_pipeline(&config)?;

    Ok(())
}
