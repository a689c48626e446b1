pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Timed out after {timeout_ms} ms: {operation}.")]
	Timeout { operation: &'static str, timeout_ms: u64 },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}

	pub(crate) fn not_found(entity: &str, id: i64) -> Self {
		Self::NotFound { message: format!("{entity} {id} does not exist.") }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<autobid_storage::Error> for Error {
	fn from(err: autobid_storage::Error) -> Self {
		match err {
			autobid_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			autobid_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			autobid_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}
