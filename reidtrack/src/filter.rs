//! Containment-based suppression of overlapping candidates

use crate::bbox::Bbox;

/// Check if `inner` is contained in a different rectangle `outer`.
/// Identical rectangles do not contain each other.
#[inline]
fn is_nested(inner: &Bbox, outer: &Bbox) -> bool {
    inner != outer && outer.intersection(inner).as_ref() == Some(inner)
}

/// Filter out candidates that are fully contained within another candidate.
///
/// Survivors keep detector order. Duplicated rectangles both survive unless a
/// third, larger rectangle swallows them.
pub fn filter_contained(candidates: &[Bbox]) -> Vec<Bbox> {
    let filtered: Vec<Bbox> = candidates
        .iter()
        .enumerate()
        .filter(|(i, candidate)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, other)| *i != j && is_nested(candidate, other))
        })
        .map(|(_, candidate)| *candidate)
        .collect();

    let removed = candidates.len() - filtered.len();
    if removed > 0 {
        log::debug!(
            "Removed {} nested candidates, {} remain",
            removed,
            filtered.len()
        );
    }

    filtered
}
