use std::fmt;

use itertools::Itertools;

use crate::phospho::constants::*;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScoredResidue {
    pub residue: char,
    pub score: Option<f64>,
}

impl ScoredResidue {
    pub fn is_site(&self, score_threshold: f64) -> bool {
        self.score.map_or(false, |score| score >= score_threshold)
    }
}

/// A raw annotated sequence such as `PSVEPPLS(1)QETFSDL`, split into residues.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct AnnotatedPeptide {
    pub residues: Vec<ScoredResidue>,
}

impl AnnotatedPeptide {
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn sequence(&self) -> String {
        self.residues.iter().map(|r| r.residue).collect()
    }

    // A score carried by the last residue is ignored, no site marker can follow the final residue
    pub fn site_indices(&self, score_threshold: f64) -> Vec<usize> {
        let last_idx = self.residues.len().saturating_sub(1);
        self.residues.iter()
            .positions(|r| r.is_site(score_threshold))
            .filter(|idx| *idx < last_idx)
            .collect()
    }
}

/// How sites other than the last one of a peptide are rendered in its candidate sequences.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub enum DemotedSiteCase {
    #[default]
    Preserve,
    Lowercase,
}

impl DemotedSiteCase {
    pub fn render(&self, residue: char) -> char {
        match self {
            DemotedSiteCase::Preserve => residue,
            DemotedSiteCase::Lowercase => residue.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for DemotedSiteCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn count_residues(peptide: &str) -> usize {
    peptide.chars().filter(|c| c.is_alphabetic()).count()
}

pub fn strip_site_markers(peptide: &str) -> String {
    peptide.chars()
        .filter(|c| *c != SITE_MARKER)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_indices_skip_the_last_residue() {
        let peptide = AnnotatedPeptide {
            residues: vec![
                ScoredResidue { residue: 'S', score: Some(0.99) },
                ScoredResidue { residue: 'P', score: None },
                ScoredResidue { residue: 'T', score: Some(0.5) },
                ScoredResidue { residue: 'Y', score: Some(1.0) },
            ],
        };

        assert_eq!(peptide.site_indices(0.95), vec![0]);
        assert_eq!(peptide.site_indices(0.4), vec![0, 2]);
        assert_eq!(peptide.sequence(), "SPTY");
    }

    #[test]
    fn residues_are_counted_without_markers() {
        assert_eq!(count_residues("PSVEPPLS*QETFSDL"), 15);
        assert_eq!(count_residues("qmevly*AWEFLS"), 12);
        assert_eq!(strip_site_markers("QMEVLy*AWEFLs*FAD"), "QMEVLYAWEFLSFAD");
    }
}
