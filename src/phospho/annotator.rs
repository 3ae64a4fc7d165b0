use anyhow::*;
use lazy_static::lazy_static;
use regex::Regex;

use crate::phospho::constants::*;
use crate::phospho::model::*;

lazy_static! {
    // A residue optionally followed by its localization probability, e.g. "S(0.98)"
    static ref SCORED_RESIDUE_REGEX: Regex = Regex::new(r"(\p{Alphabetic})(?:\(([^()]*)\))?").unwrap();
}

/// Parses a raw sequence such as `QMEVLY(1)AWEFLS(0.95)FAD` into its residues and scores.
pub fn parse_annotated_peptide(raw_sequence: &str) -> Result<AnnotatedPeptide> {

    let raw_sequence = raw_sequence.trim();
    let mut residues: Vec<ScoredResidue> = Vec::with_capacity(raw_sequence.len());

    // Each match must start where the previous one ended, anything in between is not a residue
    let mut expected_offset = 0;
    for caps in SCORED_RESIDUE_REGEX.captures_iter(raw_sequence) {
        let token = caps.get(0).unwrap(); // safe because group 0 is always defined
        if token.start() != expected_offset {
            bail!("{}", describe_invalid_chunk(raw_sequence, expected_offset, token.start()));
        }

        let residue = caps[1].chars().next().unwrap(); // safe because the group matches a single char
        let score = match caps.get(2) {
            Some(score_match) => {
                let score_str = score_match.as_str().trim();
                let score: f64 = fast_float::parse(score_str).with_context(
                    || format!("invalid phosphorylation score '{}' in sequence '{}'", score_str, raw_sequence)
                )?;
                Some(score)
            }
            None => None,
        };

        residues.push(ScoredResidue { residue, score });
        expected_offset = token.end();
    }

    if expected_offset != raw_sequence.len() {
        bail!("{}", describe_invalid_chunk(raw_sequence, expected_offset, raw_sequence.len()));
    }

    Ok(AnnotatedPeptide { residues })
}

fn describe_invalid_chunk(raw_sequence: &str, start: usize, end: usize) -> String {
    let chunk = &raw_sequence[start..end];

    if chunk.starts_with(SCORE_OPENING_CHAR) && start == 0 {
        format!("phosphorylation score '{}' is not preceded by a residue in sequence '{}'", chunk, raw_sequence)
    } else if chunk.starts_with(SCORE_OPENING_CHAR) && !chunk.contains(SCORE_CLOSING_CHAR) {
        format!("unterminated phosphorylation score '{}' in sequence '{}'", chunk, raw_sequence)
    } else {
        format!("unexpected characters '{}' at offset {} in sequence '{}'", chunk, start, raw_sequence)
    }
}

// Every site is followed by a marker, all sites but the last one are rendered as demoted sites
pub fn format_fully_annotated_sequence(
    peptide: &AnnotatedPeptide,
    score_threshold: f64,
    demoted_site_case: DemotedSiteCase
) -> String {

    let site_indices = peptide.site_indices(score_threshold);
    let last_site_idx = site_indices.last().copied();

    let mut annotated_seq = String::with_capacity(peptide.len() + site_indices.len());
    for (idx, scored_residue) in peptide.residues.iter().enumerate() {
        let residue = scored_residue.residue;
        if site_indices.binary_search(&idx).is_err() {
            annotated_seq.push(residue);
        } else {
            if Some(idx) == last_site_idx {
                annotated_seq.push(residue);
            } else {
                annotated_seq.push(demoted_site_case.render(residue));
            }
            annotated_seq.push(SITE_MARKER);
        }
    }

    annotated_seq
}

/// Builds one candidate sequence per phospho-site, ordered by site position, each one carrying a
/// single site marker.
pub fn format_candidate_sequences(
    peptide: &AnnotatedPeptide,
    score_threshold: f64,
    demoted_site_case: DemotedSiteCase
) -> Vec<String> {

    let annotated_seq = format_fully_annotated_sequence(peptide, score_threshold, demoted_site_case);
    let segments: Vec<&str> = annotated_seq.split(SITE_MARKER).collect();

    // No ambiguity to solve with a single site (or none at all)
    if segments.len() <= 2 {
        return vec![annotated_seq];
    }

    // Put back a single marker in each of the slots left by the split
    (1..segments.len()).map(|n_leading_segments| {
        let (leading, trailing) = segments.split_at(n_leading_segments);
        format!("{}{}{}", leading.concat(), SITE_MARKER, trailing.concat())
    }).collect()
}

pub fn annotate_peptide(
    raw_sequence: &str,
    score_threshold: f64,
    demoted_site_case: DemotedSiteCase
) -> Result<Vec<String>> {
    let peptide = parse_annotated_peptide(raw_sequence)?;
    Ok(format_candidate_sequences(&peptide, score_threshold, demoted_site_case))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_STRING_1: &str = "PSVEPPLS(1)QETFSDL";
    const DEMO_STRING_2: &str = "QMEVLY(1)AWEFLS(0.95)FAD";

    fn annotate(raw_sequence: &str) -> Vec<String> {
        annotate_peptide(raw_sequence, PHOSPHO_SITE_SCORE_THRESHOLD, DemotedSiteCase::Preserve).unwrap()
    }

    #[test]
    fn parses_residues_and_scores() {
        let peptide = parse_annotated_peptide(DEMO_STRING_2).unwrap();

        assert_eq!(peptide.len(), 15);
        assert_eq!(peptide.sequence(), "QMEVLYAWEFLSFAD");
        assert_eq!(peptide.residues[5], ScoredResidue { residue: 'Y', score: Some(1.0) });
        assert_eq!(peptide.residues[11], ScoredResidue { residue: 'S', score: Some(0.95) });
        assert_eq!(peptide.residues.iter().filter(|r| r.score.is_some()).count(), 2);
    }

    #[test]
    fn single_site_gives_a_single_candidate() {
        assert_eq!(annotate(DEMO_STRING_1), vec!["PSVEPPLS*QETFSDL"]);
    }

    #[test]
    fn each_site_gives_its_own_candidate() {
        assert_eq!(annotate(DEMO_STRING_2), vec!["QMEVLY*AWEFLSFAD", "QMEVLYAWEFLS*FAD"]);
        assert_eq!(
            format_fully_annotated_sequence(&parse_annotated_peptide(DEMO_STRING_2).unwrap(), 0.95, DemotedSiteCase::Preserve),
            "QMEVLY*AWEFLS*FAD"
        );
    }

    #[test]
    fn demoted_sites_can_be_lowercased() {
        let peptide = parse_annotated_peptide(DEMO_STRING_2).unwrap();
        assert_eq!(format_fully_annotated_sequence(&peptide, 0.95, DemotedSiteCase::Lowercase), "QMEVLy*AWEFLS*FAD");

        // Only the last site keeps its case, whichever site gets the marker
        let candidates = annotate_peptide(DEMO_STRING_2, 0.95, DemotedSiteCase::Lowercase).unwrap();
        assert_eq!(candidates, vec!["QMEVLy*AWEFLSFAD", "QMEVLyAWEFLS*FAD"]);

        let candidates = annotate_peptide("S(0.99)T(0.97)Y(0.96)K", 0.95, DemotedSiteCase::Lowercase).unwrap();
        assert_eq!(candidates, vec!["s*tYK", "st*YK", "stY*K"]);

        // Nothing to demote with a single site
        let candidates = annotate_peptide(DEMO_STRING_1, 0.95, DemotedSiteCase::Lowercase).unwrap();
        assert_eq!(candidates, vec!["PSVEPPLS*QETFSDL"]);
    }

    #[test]
    fn low_scores_are_not_marked() {
        assert_eq!(annotate("PEPS(0.5)TIDES(0.949)K"), vec!["PEPSTIDESK"]);
        assert_eq!(annotate("PEPTIDE"), vec!["PEPTIDE"]);
        assert_eq!(annotate(""), vec![""]);
    }

    #[test]
    fn threshold_is_a_parameter() {
        let candidates = annotate_peptide("PEPS(0.5)TIDES(0.9)K", 0.5, DemotedSiteCase::Preserve).unwrap();
        assert_eq!(candidates, vec!["PEPS*TIDESK", "PEPSTIDES*K"]);
    }

    #[test]
    fn score_on_the_last_residue_is_ignored() {
        assert_eq!(annotate("PEPTIDES(1)"), vec!["PEPTIDES"]);
        assert_eq!(annotate("PS(1)EPTIDES(1)"), vec!["PS*EPTIDES"]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(annotate("  PSVEPPLS( 1 )QETFSDL \t"), vec!["PSVEPPLS*QETFSDL"]);
    }

    #[test]
    fn candidates_preserve_the_residue_sequence() {
        let raw_sequences = [
            DEMO_STRING_1,
            DEMO_STRING_2,
            "S(0.99)T(0.97)Y(0.96)K",
            "AS(1)DFT(0.2)GHY(0.999)KLS(0.95)R",
        ];

        for raw_sequence in raw_sequences {
            let residues = parse_annotated_peptide(raw_sequence).unwrap().sequence();
            for case in [DemotedSiteCase::Preserve, DemotedSiteCase::Lowercase] {
                for candidate in annotate_peptide(raw_sequence, 0.95, case).unwrap() {
                    assert_eq!(candidate.matches(SITE_MARKER).count(), 1, "{}", candidate);
                    assert_eq!(strip_site_markers(&candidate), residues);
                }
            }
        }
    }

    #[test]
    fn candidate_count_matches_site_count() {
        assert_eq!(annotate("S(0.99)T(0.97)Y(0.96)K").len(), 3);
        assert_eq!(annotate("AS(1)DFT(0.2)GHY(0.999)KLS(0.95)R").len(), 3);
        assert_eq!(annotate("AS(0.1)K").len(), 1);
    }

    #[test]
    fn malformed_sequences_are_rejected() {
        let err = parse_annotated_peptide("(1)PEPTIDE").unwrap_err();
        assert!(err.to_string().contains("not preceded by a residue"), "{}", err);

        let err = parse_annotated_peptide("PEPS(0.9").unwrap_err();
        assert!(err.to_string().contains("unterminated"), "{}", err);

        let err = parse_annotated_peptide("PEP-TIDE").unwrap_err();
        assert!(err.to_string().contains("unexpected characters '-'"), "{}", err);

        let err = parse_annotated_peptide("PEPS(high)K").unwrap_err();
        assert!(err.to_string().contains("invalid phosphorylation score 'high'"), "{}", err);
    }
}
