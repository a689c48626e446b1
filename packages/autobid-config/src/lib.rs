mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Listing, Postgres, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

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
	if cfg.listing.max_page_size == 0 {
		return Err(Error::Validation {
			message: "listing.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.listing.default_page_size == 0
		|| cfg.listing.default_page_size > cfg.listing.max_page_size
	{
		return Err(Error::Validation {
			message: "listing.default_page_size must be in the range 1-listing.max_page_size."
				.to_string(),
		});
	}
	if cfg.listing.facet_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "listing.facet_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let level = cfg.service.log_level.trim();

	cfg.service.log_level =
		if level.is_empty() { types::default_log_level() } else { level.to_string() };
}
