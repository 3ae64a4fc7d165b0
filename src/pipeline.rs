use anyhow::*;
use csv::{Reader, StringRecord};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::io::schema::{ColumnNames, ColumnSchema};
use crate::io::table::{open_table_reader, save_peptide_records, InputOptions, OutputOptions};
use crate::phospho::aggregation::{AggregationOutcome, PeptideAggregator, PeptideRecord};
use crate::phospho::annotator::annotate_peptide;
use crate::phospho::constants::PHOSPHO_SITE_SCORE_THRESHOLD;
use crate::phospho::model::DemotedSiteCase;
use crate::phospho::selector::select_candidate;

#[derive(Clone, PartialEq, Debug)]
pub struct PipelineConfig {
    pub dataset_path: PathBuf,
    pub output_path: PathBuf,
    pub columns: ColumnNames,
    pub score_threshold: f64,
    pub demoted_site_case: DemotedSiteCase,
    /// When false, every row with a confident site is written, duplicated peptides included.
    pub aggregate: bool,
    pub input: InputOptions,
    pub output: OutputOptions,
}

impl PipelineConfig {
    pub fn new(dataset_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, columns: ColumnNames) -> PipelineConfig {
        PipelineConfig {
            dataset_path: dataset_path.into(),
            output_path: output_path.into(),
            columns,
            score_threshold: PHOSPHO_SITE_SCORE_THRESHOLD,
            demoted_site_case: DemotedSiteCase::default(),
            aggregate: true,
            input: InputOptions::default(),
            output: OutputOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            bail!("score threshold must be within [0, 1], got {}", self.score_threshold);
        }

        if self.output.include_protein_info && (self.columns.protein_id.is_none() || self.columns.gene_name.is_none()) {
            bail!("protein info output requires both the protein ID and the gene name column names");
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Default, Eq, PartialEq, Debug)]
pub struct PipelineSummary {
    pub rows_read: u64,
    pub rows_skipped: u64,
    // rows discarded or superseded because their peptide was already seen
    pub duplicates_merged: u64,
    pub records_written: usize,
}

#[derive(Clone, Debug)]
pub struct ProcessedTable {
    pub records: Vec<PeptideRecord>,
    pub summary: PipelineSummary,
}

enum RecordCollector {
    Aggregated(PeptideAggregator),
    All(Vec<PeptideRecord>),
}

impl RecordCollector {
    fn collect(&mut self, record: PeptideRecord) -> AggregationOutcome {
        match self {
            RecordCollector::Aggregated(aggregator) => aggregator.offer(record),
            RecordCollector::All(records) => {
                records.push(record);
                AggregationOutcome::Inserted
            }
        }
    }

    fn into_records(self) -> Vec<PeptideRecord> {
        match self {
            RecordCollector::Aggregated(aggregator) => aggregator.into_records(),
            RecordCollector::All(records) => records,
        }
    }
}

pub fn process_table<R: io::Read>(reader: &mut Reader<R>, config: &PipelineConfig) -> Result<ProcessedTable> {

    let headers = reader.headers().context("can't read the header row")?.clone();
    let schema = ColumnSchema::resolve(&headers, &config.columns, config.output.include_protein_info)?;
    debug!(?schema, "resolved input columns");

    let mut collector = if config.aggregate {
        RecordCollector::Aggregated(PeptideAggregator::new())
    } else {
        RecordCollector::All(Vec::new())
    };

    let mut summary = PipelineSummary::default();
    let mut row = StringRecord::new();

    while reader.read_record(&mut row).with_context(|| format!("can't read row {}", summary.rows_read + 1))? {
        summary.rows_read += 1;
        let row_number = summary.rows_read;

        let observation = schema.extract(&row, row_number)?;

        let candidates = annotate_peptide(observation.raw_sequence, config.score_threshold, config.demoted_site_case)
            .with_context(|| format!("can't annotate the sequence at row {}", row_number))?;

        // Positions are 1-based, zero or negative ones can't point to a site
        let selected = usize::try_from(observation.position).ok()
            .and_then(|position| select_candidate(&candidates, position));
        debug!(
            row = row_number,
            sequence = observation.raw_sequence,
            ?candidates,
            position = observation.position,
            ?selected,
            "processed peptide"
        );

        let peptide = match selected {
            Some(peptide) => peptide.to_string(),
            None => {
                summary.rows_skipped += 1;
                continue;
            }
        };

        let outcome = collector.collect(PeptideRecord {
            peptide,
            fold_change: observation.fold_change,
            p_value: observation.p_value,
            protein_info: observation.protein_info,
        });

        if outcome != AggregationOutcome::Inserted {
            summary.duplicates_merged += 1;
        }
    }

    let records = collector.into_records();
    summary.records_written = records.len();

    Ok(ProcessedTable { records, summary })
}

/// Reads the dataset, selects the phospho-site of each row and writes the retained peptides.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {

    config.validate()?;

    info!(
        dataset = %config.dataset_path.display(),
        score_threshold = config.score_threshold,
        demoted_sites = %config.demoted_site_case,
        aggregate = config.aggregate,
        "reading dataset"
    );

    let mut reader = open_table_reader(&config.dataset_path, &config.input)?;
    let processed = process_table(&mut reader, config)?;

    let n_written = save_peptide_records(&config.output_path, &processed.records, &config.output)?;
    let summary = PipelineSummary { records_written: n_written, ..processed.summary };

    info!(
        rows_read = summary.rows_read,
        rows_skipped = summary.rows_skipped,
        duplicates_merged = summary.duplicates_merged,
        records_written = summary.records_written,
        output = %config.output_path.display(),
        "wrote peptide table"
    );

    Ok(summary)
}
