use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	/// Inputs longer than this many characters are rejected before any request is made.
	#[serde(default = "default_max_input_chars")]
	pub max_input_chars: usize,
	/// Total attempts per input, including the first one.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Base delay for exponential backoff between transient failures.
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
	/// Upper bound on in-flight embedding calls within a single search request.
	pub max_concurrent_embeddings: u32,
	/// Deadline for the whole ranking step, embeddings included.
	pub timeout_ms: u64,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k: 5, max_concurrent_embeddings: 8, timeout_ms: 30_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub api_auth_token: Option<String>,
	/// Header carrying the user id forwarded by the authentication proxy.
	pub user_header: String,
}
impl Default for Security {
	fn default() -> Self {
		Self {
			bind_localhost_only: true,
			api_auth_token: None,
			user_header: "x-notewise-user-id".to_string(),
		}
	}
}

fn default_max_input_chars() -> usize {
	// 8191 tokens at roughly four characters per token.
	32_000
}

fn default_max_attempts() -> u32 {
	3
}

fn default_retry_backoff_ms() -> u64 {
	250
}
