use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding input is empty.")]
	EmptyInput,
	#[error("Embedding input has {chars} characters; the limit is {limit}.")]
	InputTooLarge { chars: usize, limit: usize },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error("Provider responded with {status}: {body}")]
	Status { status: StatusCode, body: String },
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// Whether another attempt could succeed: timeouts, connection failures, throttling and
	/// server-side errors.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Reqwest(err) => err.is_timeout() || err.is_connect(),
			Self::Status { status, .. } =>
				*status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
			_ => false,
		}
	}
}
