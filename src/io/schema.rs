use anyhow::*;
use csv::StringRecord;

use crate::phospho::aggregation::ProteinInfo;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Clone, Default, PartialEq, Debug)]
pub struct ColumnNames {
    pub sequence: String,
    pub position: String,
    pub fold_change: String,
    pub p_value: String,
    pub protein_id: Option<String>,
    pub gene_name: Option<String>,
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ProteinColumns {
    pub protein_id: usize,
    pub gene_name: usize,
}

/// Column indices resolved once against the header row.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ColumnSchema {
    pub sequence: usize,
    pub position: usize,
    pub fold_change: usize,
    pub p_value: usize,
    pub protein: Option<ProteinColumns>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Observation<'r> {
    pub raw_sequence: &'r str,
    // Reported as-is, out-of-range positions simply match no candidate
    pub position: i64,
    pub fold_change: f64,
    pub p_value: f64,
    pub protein_info: Option<ProteinInfo>,
}

fn find_column(headers: &[&str], name: &str) -> Result<usize> {
    headers.iter().position(|header| *header == name).ok_or_else(
        || anyhow!("can't find column '{}' in the header ({})", name, headers.join(", "))
    )
}

impl ColumnSchema {

    pub fn resolve(headers: &StringRecord, names: &ColumnNames, with_protein_info: bool) -> Result<ColumnSchema> {

        // Spreadsheet exports often start with a BOM which would stick to the first column name
        let headers: Vec<&str> = headers.iter()
            .map(|header| header.trim_start_matches(BYTE_ORDER_MARK).trim())
            .collect();

        let protein = if with_protein_info {
            let protein_id_col = names.protein_id.as_deref().ok_or_else(|| anyhow!("protein ID column name is missing"))?;
            let gene_name_col = names.gene_name.as_deref().ok_or_else(|| anyhow!("gene name column name is missing"))?;

            Some(ProteinColumns {
                protein_id: find_column(&headers, protein_id_col)?,
                gene_name: find_column(&headers, gene_name_col)?,
            })
        } else {
            None
        };

        Ok(ColumnSchema {
            sequence: find_column(&headers, &names.sequence)?,
            position: find_column(&headers, &names.position)?,
            fold_change: find_column(&headers, &names.fold_change)?,
            p_value: find_column(&headers, &names.p_value)?,
            protein: protein,
        })
    }

    // row_number is 1-based and only used in error messages
    pub fn extract<'r>(&self, record: &'r StringRecord, row_number: u64) -> Result<Observation<'r>> {

        let get_field = |col_idx: usize| -> Result<&'r str> {
            record.get(col_idx).ok_or_else(
                || anyhow!("row {} has {} fields, column #{} is missing", row_number, record.len(), col_idx + 1)
            )
        };

        let position_str = get_field(self.position)?.trim();
        let position: i64 = position_str.parse().with_context(
            || format!("invalid position '{}' at row {}", position_str, row_number)
        )?;

        let fold_change = parse_float_field(get_field(self.fold_change)?, "fold change", row_number)?;
        let p_value = parse_float_field(get_field(self.p_value)?, "p-value", row_number)?;

        let protein_info = match self.protein {
            Some(protein_cols) => Some(ProteinInfo {
                protein_id: get_field(protein_cols.protein_id)?.to_string(),
                gene_name: get_field(protein_cols.gene_name)?.to_string(),
            }),
            None => None,
        };

        Ok(Observation {
            raw_sequence: get_field(self.sequence)?,
            position,
            fold_change,
            p_value,
            protein_info,
        })
    }
}

fn parse_float_field(value: &str, field_name: &str, row_number: u64) -> Result<f64> {
    let value = value.trim();
    let parsed: f64 = fast_float::parse(value).with_context(
        || format!("invalid {} '{}' at row {}", field_name, value, row_number)
    )?;

    Ok(parsed)
}
