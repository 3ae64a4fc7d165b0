use indexmap::map::Entry;
use indexmap::IndexMap;

#[derive(Clone, PartialEq, Debug)]
pub struct ProteinInfo {
    pub protein_id: String,
    pub gene_name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PeptideRecord {
    pub peptide: String,
    pub fold_change: f64,
    pub p_value: f64,
    pub protein_info: Option<ProteinInfo>,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum AggregationOutcome {
    Inserted,
    Replaced,
    Rejected,
}

// Records are kept in the order their peptide was first seen
#[derive(Clone, Default, Debug)]
pub struct PeptideAggregator {
    record_by_peptide: IndexMap<String, PeptideRecord>,
}

impl PeptideAggregator {
    pub fn new() -> PeptideAggregator {
        PeptideAggregator::default()
    }

    pub fn offer(&mut self, record: PeptideRecord) -> AggregationOutcome {
        match self.record_by_peptide.entry(record.peptide.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(record);
                AggregationOutcome::Inserted
            }
            Entry::Occupied(mut entry) => {
                // NaN p-values never win
                if record.p_value < entry.get().p_value {
                    entry.insert(record);
                    AggregationOutcome::Replaced
                } else {
                    AggregationOutcome::Rejected
                }
            }
        }
    }

    pub fn into_records(self) -> Vec<PeptideRecord> {
        self.record_by_peptide.into_values().collect()
    }
}
