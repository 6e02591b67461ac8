pub mod note;
pub mod ranking;

pub use note::Note;
pub use ranking::{
	EmbeddingVector, ScoredCandidate, cmp_score_desc, cosine_similarity, rank_top_k,
};
