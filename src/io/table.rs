use anyhow::*;
use csv::{Reader, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::phospho::aggregation::PeptideRecord;
use crate::phospho::constants::OUTPUT_DECIMAL_PRECISION;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, clap::ValueEnum)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct InputOptions {
    pub delimiter: Delimiter,
}

#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct OutputOptions {
    pub delimiter: Delimiter,
    pub include_header: bool,
    pub include_protein_info: bool,
}

const PEPTIDE_HEADER: [&str; 3] = ["peptide", "fc", "p"];
const PROTEIN_PEPTIDE_HEADER: [&str; 5] = ["protein_id", "gene_name", "peptide", "fc", "p"];

#[derive(Serialize)]
struct PeptideRow<'a> {
    peptide: &'a str,
    fc: String,
    p: String,
}

#[derive(Serialize)]
struct ProteinPeptideRow<'a> {
    protein_id: &'a str,
    gene_name: &'a str,
    peptide: &'a str,
    fc: String,
    p: String,
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.*}", OUTPUT_DECIMAL_PRECISION, value)
}

pub fn open_table_reader(path: &Path, options: &InputOptions) -> Result<Reader<File>> {

    if !path.exists() {
        bail!("Invalid path (file does not exist): {}", path.display());
    }

    // Rows shorter than the header are reported when the row is extracted
    let reader = ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("can't open dataset {}", path.display()))?;

    Ok(reader)
}

/// Writes the peptide records as a delimited table and returns the number of written records.
pub fn write_peptide_records<'a, W, I>(writer: W, records: I, options: &OutputOptions) -> Result<usize>
    where W: io::Write, I: IntoIterator<Item = &'a PeptideRecord> {

    let mut csv_writer = WriterBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .has_headers(false)
        .from_writer(writer);

    if options.include_header {
        if options.include_protein_info {
            csv_writer.write_record(PROTEIN_PEPTIDE_HEADER)?;
        } else {
            csv_writer.write_record(PEPTIDE_HEADER)?;
        }
    }

    let mut n_records = 0;
    for record in records {
        let fc = format_decimal(record.fold_change);
        let p = format_decimal(record.p_value);

        if options.include_protein_info {
            let (protein_id, gene_name) = record.protein_info.as_ref()
                .map(|info| (info.protein_id.as_str(), info.gene_name.as_str()))
                .unwrap_or(("", ""));

            csv_writer.serialize(ProteinPeptideRow { protein_id, gene_name, peptide: &record.peptide, fc, p })?;
        } else {
            csv_writer.serialize(PeptideRow { peptide: &record.peptide, fc, p })?;
        }

        n_records += 1;
    }

    csv_writer.flush()?;

    Ok(n_records)
}

pub fn save_peptide_records<'a, I>(path: &Path, records: I, options: &OutputOptions) -> Result<usize>
    where I: IntoIterator<Item = &'a PeptideRecord> {

    let file = File::create(path).with_context(|| format!("can't create output file {}", path.display()))?;

    write_peptide_records(io::BufWriter::new(file), records, options)
}
