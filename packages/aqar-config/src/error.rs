use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read the configuration at {path:?}: {source}.")]
	Read { path: PathBuf, source: io::Error },
	#[error("Invalid TOML in the configuration at {path:?}: {source}.")]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("{message}")]
	Validation { message: String },
}
