mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Postgres, Providers, Search, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes and validates a TOML document.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::validation("service.http_bind", "non-empty"));
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level", "non-empty"));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::validation("storage.postgres.pool_max_conns", "greater than zero"));
	}

	let embedding = &cfg.providers.embedding;

	if embedding.api_key.trim().is_empty() {
		return Err(Error::validation("providers.embedding.api_key", "non-empty"));
	}
	if embedding.api_base.trim().is_empty() {
		return Err(Error::validation("providers.embedding.api_base", "non-empty"));
	}
	if embedding.dimensions == 0 {
		return Err(Error::validation("providers.embedding.dimensions", "greater than zero"));
	}
	if embedding.timeout_ms == 0 {
		return Err(Error::validation("providers.embedding.timeout_ms", "greater than zero"));
	}
	if embedding.max_input_chars == 0 {
		return Err(Error::validation("providers.embedding.max_input_chars", "greater than zero"));
	}
	if embedding.max_attempts == 0 {
		return Err(Error::validation("providers.embedding.max_attempts", "at least one"));
	}
	for value in embedding.default_headers.values() {
		if !value.is_string() {
			return Err(Error::validation(
				"providers.embedding.default_headers values",
				"strings",
			));
		}
	}

	if cfg.search.top_k == 0 {
		return Err(Error::validation("search.top_k", "greater than zero"));
	}
	if cfg.search.max_concurrent_embeddings == 0 {
		return Err(Error::validation("search.max_concurrent_embeddings", "greater than zero"));
	}
	if cfg.search.timeout_ms == 0 {
		return Err(Error::validation("search.timeout_ms", "greater than zero"));
	}

	let header = cfg.security.user_header.as_str();

	if header.is_empty()
		|| !header.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
	{
		return Err(Error::validation(
			"security.user_header",
			"a non-empty header name of letters, digits, '-' or '_'",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}

	cfg.security.user_header = cfg.security.user_header.trim().to_ascii_lowercase();

	let api_base = cfg.providers.embedding.api_base.trim_end_matches('/').to_string();

	cfg.providers.embedding.api_base = api_base;
}
