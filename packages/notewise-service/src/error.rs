pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Embedding unavailable: {message}")]
	EmbeddingUnavailable { message: String },
	#[error("Embedding dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Search timed out after {timeout_ms} ms.")]
	Timeout { timeout_ms: u64 },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<notewise_storage::Error> for Error {
	fn from(err: notewise_storage::Error) -> Self {
		match err {
			notewise_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			notewise_storage::Error::InvalidArgument(message) => Self::Storage { message },
		}
	}
}
