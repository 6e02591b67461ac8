pub mod ranker;
pub mod search;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use search::{SearchItem, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use notewise_config::{Config, EmbeddingProviderConfig};
use notewise_domain::{EmbeddingVector, Note};
use notewise_providers::embedding::EmbeddingClient;
use notewise_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns one text into a vector. Calls are independent and may run concurrently.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, notewise_providers::Result<EmbeddingVector>>;
}

/// Read-only source of search candidates.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn list_notes_for_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<Note>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	/// HTTP-backed providers built from `providers.*` configuration.
	pub fn from_config(cfg: &Config) -> notewise_providers::Result<Self> {
		let client = EmbeddingClient::new(&cfg.providers.embedding)?;

		Ok(Self::new(Arc::new(HttpEmbedding { client })))
	}
}

pub struct NotewiseService {
	pub cfg: Config,
	pub store: Arc<dyn NoteStore>,
	pub providers: Providers,
	embedding_cfg: Arc<EmbeddingProviderConfig>,
}
impl NotewiseService {
	pub fn new(cfg: Config, store: Arc<dyn NoteStore>, providers: Providers) -> Self {
		let embedding_cfg = Arc::new(cfg.providers.embedding.clone());

		Self { cfg, store, providers, embedding_cfg }
	}
}

struct HttpEmbedding {
	client: EmbeddingClient,
}
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, notewise_providers::Result<EmbeddingVector>> {
		Box::pin(self.client.embed(cfg, text))
	}
}

impl NoteStore for Db {
	fn list_notes_for_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move { Ok(queries::list_notes_for_user(self, user_id).await?) })
	}
}
