use std::time::{Duration, Instant};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

use notewise_domain::ScoredCandidate;

use crate::{
	Error, NotewiseService, Result,
	ranker::{self, RankerLimits},
};

#[derive(Debug, Clone)]
pub struct SearchRequest {
	/// Authenticated owner; candidates are limited to this user's notes.
	pub user_id: String,
	pub query: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
	pub id: String,
	pub notes: String,
	pub transcript: String,
	#[serde(serialize_with = "crate::time_serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(serialize_with = "crate::time_serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	pub score: f64,
}
impl From<ScoredCandidate> for SearchItem {
	fn from(candidate: ScoredCandidate) -> Self {
		let ScoredCandidate { note, score } = candidate;

		Self {
			id: note.id,
			notes: note.notes,
			transcript: note.transcript,
			created_at: note.created_at,
			timestamp: note.timestamp,
			score,
		}
	}
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
	pub trace_id: Uuid,
	pub items: Vec<SearchItem>,
}

impl NotewiseService {
	/// Ranks the user's notes against `req.query` and returns the best matches.
	///
	/// Either the full ranking is returned or an error; nothing partial. The whole operation,
	/// note loading included, is bounded by `search.timeout_ms`.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let trace_id = Uuid::new_v4();
		let span = tracing::info_span!("search", %trace_id, user_id = %req.user_id);

		async move {
			let query = ranker::validate_query(&req.query)?;
			let timeout_ms = self.cfg.search.timeout_ms;
			let started = Instant::now();
			let (candidate_count, ranked) =
				tokio::time::timeout(Duration::from_millis(timeout_ms), self.rank(&req.user_id, query))
					.await
					.map_err(|_| Error::Timeout { timeout_ms })??;

			tracing::info!(
				candidates = candidate_count,
				returned = ranked.len(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				"Search completed."
			);

			Ok(SearchResponse { trace_id, items: ranked.into_iter().map(SearchItem::from).collect() })
		}
		.instrument(span)
		.await
	}

	async fn rank(&self, user_id: &str, query: &str) -> Result<(usize, Vec<ScoredCandidate>)> {
		let candidates = self.store.list_notes_for_user(user_id).await?;
		let candidate_count = candidates.len();
		let limits = RankerLimits {
			top_k: self.cfg.search.top_k as usize,
			max_concurrent_embeddings: self.cfg.search.max_concurrent_embeddings as usize,
		};
		let ranked = ranker::rank_notes(
			self.providers.embedding.clone(),
			self.embedding_cfg.clone(),
			limits,
			query,
			candidates,
		)
		.await?;

		Ok((candidate_count, ranked))
	}
}
