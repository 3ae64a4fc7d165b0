
// Minimal phosphoRS/ptmRS-like localization probability for a residue to be reported as a phospho-site
pub const PHOSPHO_SITE_SCORE_THRESHOLD: f64 = 0.95;

pub const SITE_MARKER: char = '*';

pub const SCORE_OPENING_CHAR: char = '(';
pub const SCORE_CLOSING_CHAR: char = ')';

// Number of decimals used when exporting fold changes and p-values
pub const OUTPUT_DECIMAL_PRECISION: usize = 10;
