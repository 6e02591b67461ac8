use std::cmp::Ordering;

use crate::Note;

/// Fixed-dimension vector produced by one embedding model.
///
/// Vectors are only comparable when they come from the same provider and model version.
pub type EmbeddingVector = Vec<f32>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
	pub note: Note,
	pub score: f64,
}

/// Cosine of the angle between `lhs` and `rhs`.
///
/// Both slices must have the same length. A zero-magnitude side has no direction, so the pair
/// scores `0.0`; any other non-finite outcome is also reported as `0.0`. The result is clamped
/// to `[-1.0, 1.0]` to absorb rounding.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f64 {
	debug_assert_eq!(lhs.len(), rhs.len(), "cosine_similarity needs equal dimensions");

	let mut dot = 0.0_f64;
	let mut lhs_norm = 0.0_f64;
	let mut rhs_norm = 0.0_f64;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		let (l, r) = (f64::from(*l), f64::from(*r));

		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	let score = dot / (lhs_norm.sqrt() * rhs_norm.sqrt());

	if !score.is_finite() {
		return 0.0;
	}

	score.clamp(-1.0, 1.0)
}

/// Descending order with NaN sorted last.
pub fn cmp_score_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Orders candidates by descending score and keeps the first `k`.
///
/// The sort is stable, so equal scores keep their input order.
pub fn rank_top_k(mut scored: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
	scored.sort_by(|left, right| cmp_score_desc(left.score, right.score));
	scored.truncate(k);

	scored
}
