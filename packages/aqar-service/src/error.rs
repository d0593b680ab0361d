pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Another sync run holds the lease.")]
	SyncBusy,
	#[error("Engine rejected {failed} of {total} documents: {message}")]
	ImportRejected { failed: usize, total: usize, message: String },
	#[error("Engine error: {message}")]
	Engine { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<aqar_engine::Error> for Error {
	fn from(err: aqar_engine::Error) -> Self {
		Self::Engine { message: err.to_string() }
	}
}
impl From<aqar_storage::Error> for Error {
	fn from(err: aqar_storage::Error) -> Self {
		match err {
			aqar_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			aqar_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
