use crate::phospho::constants::SITE_MARKER;
use crate::phospho::model::count_residues;

/// Returns the first candidate whose site marker directly follows the residue at `position` (1-based).
///
/// `None` means that the reported position is not a confident phospho-site of this peptide.
pub fn select_candidate<S: AsRef<str>>(candidates: &[S], position: usize) -> Option<&str> {
    candidates.iter()
        .map(|candidate| candidate.as_ref())
        .find(|candidate| is_site_at_position(candidate, position))
}

pub fn is_site_at_position(candidate: &str, position: usize) -> bool {

    // A marker is never placed after the final residue
    if position == count_residues(candidate) {
        return false;
    }

    let mut aa_index = 0;
    let mut chars = candidate.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_alphabetic() {
            aa_index += 1;
            if aa_index == position {
                return chars.peek() == Some(&SITE_MARKER);
            }
        }
    }

    false
}
