//! Similarity ranking of a user's notes against a free-text query.
//!
//! The query and every candidate are embedded concurrently, at most
//! `max_concurrent_embeddings` calls in flight at once. All embeddings must succeed before any
//! score is computed; the first failure aborts the outstanding calls and fails the whole ranking.

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};

use notewise_config::EmbeddingProviderConfig;
use notewise_domain::{EmbeddingVector, Note, ScoredCandidate, cosine_similarity, rank_top_k};

use crate::{EmbeddingProvider, Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct RankerLimits {
	pub top_k: usize,
	pub max_concurrent_embeddings: usize,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
	Query,
	Candidate(usize),
}

/// Returns the `top_k` candidates most similar to `query`, best first.
///
/// Equal scores keep the candidates' input order. An empty candidate list short-circuits without
/// calling the provider.
pub async fn rank_notes(
	provider: Arc<dyn EmbeddingProvider>,
	cfg: Arc<EmbeddingProviderConfig>,
	limits: RankerLimits,
	query: &str,
	candidates: Vec<Note>,
) -> Result<Vec<ScoredCandidate>> {
	let query = validate_query(query)?;

	if candidates.is_empty() {
		return Ok(Vec::new());
	}

	let texts = candidates.iter().map(Note::searchable_text).collect::<Vec<_>>();
	let (query_vector, candidate_vectors) =
		embed_all(provider, cfg, limits.max_concurrent_embeddings, query, texts).await?;

	for vector in &candidate_vectors {
		if vector.len() != query_vector.len() {
			return Err(Error::DimensionMismatch {
				expected: query_vector.len(),
				actual: vector.len(),
			});
		}
	}

	let scored = candidates
		.into_iter()
		.zip(candidate_vectors)
		.map(|(note, vector)| ScoredCandidate {
			score: cosine_similarity(&query_vector, &vector),
			note,
		})
		.collect();

	Ok(rank_top_k(scored, limits.top_k))
}

pub fn validate_query(query: &str) -> Result<&str> {
	let trimmed = query.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidQuery { message: "Search query is required.".to_string() });
	}

	Ok(trimmed)
}

async fn embed_all(
	provider: Arc<dyn EmbeddingProvider>,
	cfg: Arc<EmbeddingProviderConfig>,
	max_in_flight: usize,
	query: &str,
	texts: Vec<String>,
) -> Result<(EmbeddingVector, Vec<EmbeddingVector>)> {
	let limiter = Arc::new(Semaphore::new(max_in_flight.max(1)));
	let mut tasks = JoinSet::new();
	let mut candidate_vectors: Vec<Option<EmbeddingVector>> = vec![None; texts.len()];
	let mut query_vector = None;

	tracing::debug!(candidates = texts.len(), max_in_flight, "Embedding fan-out started.");

	let jobs = std::iter::once((Slot::Query, query.to_string()))
		.chain(texts.into_iter().enumerate().map(|(idx, text)| (Slot::Candidate(idx), text)));

	for (slot, text) in jobs {
		let provider = provider.clone();
		let cfg = cfg.clone();
		let limiter = limiter.clone();

		tasks.spawn(async move {
			let Ok(_permit) = limiter.acquire_owned().await else {
				return (slot, Err("embedding limiter closed".to_string()));
			};
			let result = provider.embed(&cfg, &text).await.map_err(|err| err.to_string());

			(slot, result)
		});
	}

	while let Some(joined) = tasks.join_next().await {
		let (slot, result) = match joined {
			Ok(done) => done,
			Err(err) => {
				tasks.abort_all();

				return Err(Error::EmbeddingUnavailable {
					message: format!("Embedding task failed: {err}."),
				});
			},
		};
		let vector = match result {
			Ok(vector) => vector,
			Err(message) => {
				tasks.abort_all();

				tracing::warn!(?slot, error = %message, "Embedding call failed. Aborting search.");

				return Err(Error::EmbeddingUnavailable { message });
			},
		};

		match slot {
			Slot::Query => query_vector = Some(vector),
			Slot::Candidate(idx) => candidate_vectors[idx] = Some(vector),
		}
	}

	let query_vector = query_vector.ok_or_else(|| Error::EmbeddingUnavailable {
		message: "Query embedding is missing.".to_string(),
	})?;
	let candidate_vectors = candidate_vectors
		.into_iter()
		.collect::<Option<Vec<_>>>()
		.ok_or_else(|| Error::EmbeddingUnavailable {
			message: "Candidate embedding is missing.".to_string(),
		})?;

	Ok((query_vector, candidate_vectors))
}
