mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Engine, Postgres, Search, Service, Storage, Synchronization};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.engine.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.engine.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.engine.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.engine.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.storage.engine.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.engine.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.engine.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.engine.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.batch_size == 0 {
		return Err(Error::Validation {
			message: "sync.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.lease_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "sync.lease_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.interval_seconds == 0 {
		return Err(Error::Validation {
			message: "sync.interval_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_page_size == 0 {
		return Err(Error::Validation {
			message: "search.default_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_page_size < cfg.search.default_page_size {
		return Err(Error::Validation {
			message: "search.max_page_size must be at least search.default_page_size.".to_string(),
		});
	}
	if cfg.search.featured_tier_cap == 0 {
		return Err(Error::Validation {
			message: "search.featured_tier_cap must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A trailing slash would produce double slashes when request paths are
	// appended to the engine url.
	while cfg.storage.engine.url.ends_with('/') {
		cfg.storage.engine.url.pop();
	}
}
