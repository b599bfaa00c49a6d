pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { field: String, message: String },
	#[error("Corpus error: {message}")]
	Corpus { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl Error {
	pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
		Self::InvalidRequest { field: field.to_string(), message: message.into() }
	}
}

impl From<caselex_domain::Error> for Error {
	fn from(err: caselex_domain::Error) -> Self {
		Self::Corpus { message: err.to_string() }
	}
}

impl From<caselex_providers::Error> for Error {
	fn from(err: caselex_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
