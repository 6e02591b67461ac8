use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use notewise_config::EmbeddingProviderConfig;

use crate::{Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;
const MAX_BACKOFF_SHIFT: u32 = 16;

/// HTTP client for an OpenAI-compatible embeddings endpoint.
#[derive(Clone)]
pub struct EmbeddingClient {
	client: Client,
}
impl EmbeddingClient {
	pub fn new(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.build()?;

		Ok(Self { client })
	}

	/// Embeds one text, retrying transient failures with exponential backoff.
	pub async fn embed(&self, cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
		validate_input(text, cfg.max_input_chars)?;

		let mut attempt = 1;

		loop {
			match self.request(cfg, text).await {
				Ok(vector) => return Ok(vector),
				Err(err) if err.is_transient() && attempt < cfg.max_attempts => {
					let delay = backoff_delay(cfg.retry_backoff_ms, attempt);

					tracing::warn!(
						provider_id = %cfg.provider_id,
						attempt,
						delay_ms = delay.as_millis() as u64,
						error = %err,
						"Embedding request failed. Retrying."
					);

					tokio::time::sleep(delay).await;

					attempt += 1;
				},
				Err(err) => return Err(err),
			}
		}
	}

	async fn request(&self, cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
		let url = format!("{}{}", cfg.api_base, cfg.path);
		let body = serde_json::json!({
			"model": cfg.model,
			"input": [text],
			"dimensions": cfg.dimensions,
		});
		let res = self.client.post(url).json(&body).send().await?;
		let status = res.status();

		if !status.is_success() {
			let body = res.text().await.unwrap_or_default();

			return Err(Error::Status {
				status,
				body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
			});
		}

		let json: Value = res.json().await?;
		let mut vectors = parse_embedding_response(json)?;

		if vectors.len() != 1 {
			return Err(Error::InvalidResponse {
				message: format!("Expected one embedding, got {}.", vectors.len()),
			});
		}

		let vector = vectors.remove(0);

		if vector.len() != cfg.dimensions as usize {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding has {} dimensions; expected {}.",
					vector.len(),
					cfg.dimensions
				),
			});
		}

		Ok(vector)
	}
}

/// Rejects only zero-length text. Whitespace is sent as is; a note with blank fields still embeds.
pub fn validate_input(text: &str, max_chars: usize) -> Result<()> {
	if text.is_empty() {
		return Err(Error::EmptyInput);
	}

	let chars = text.chars().count();

	if chars > max_chars {
		return Err(Error::InputTooLarge { chars, limit: max_chars });
	}

	Ok(())
}

/// Delay before retry number `attempt` (1-based): `base_ms * 2^(attempt - 1)`.
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
	let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);

	Duration::from_millis(base_ms.saturating_mul(1_u64 << shift))
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
