//! Best-candidate selection among scored masks.
//!
//! The inference engine returns several candidate masks per decode,
//! each with a confidence score. The session always presents exactly
//! one of them, chosen here.

/// Index of the highest-scoring candidate.
///
/// Ties resolve to the lowest index (first seen wins), so repeated
/// calls with identical input are deterministic and stable. NaN
/// scores never win a comparison and therefore can only be selected
/// when every score is NaN and index 0 is returned by default.
///
/// Returns `None` for an empty score slice.
#[must_use]
pub fn best_candidate(scores: &[f32]) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }

    let mut best = 0;
    for (index, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = index;
        }
    }
    Some(best)
}
