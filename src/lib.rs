//! Phospho-site disambiguation of quantified phospho-peptides.
//!
//! Raw sequences such as `QMEVLY(1)AWEFLS(0.95)FAD` carry a localization probability after each
//! candidate residue. Every confident residue yields one candidate sequence marked with `*`, the
//! candidate matching the reported site position is kept, and duplicated peptides are merged by
//! keeping the observation with the smallest p-value.

pub mod io;
pub mod phospho;
pub mod pipeline;

pub use phospho::aggregation::{PeptideAggregator, PeptideRecord, ProteinInfo};
pub use phospho::annotator::annotate_peptide;
pub use phospho::constants::{PHOSPHO_SITE_SCORE_THRESHOLD, SITE_MARKER};
pub use phospho::model::DemotedSiteCase;
pub use phospho::selector::select_candidate;
pub use pipeline::{run_pipeline, PipelineConfig, PipelineSummary};
