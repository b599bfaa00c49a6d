pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read corpus file at {path:?}.")]
	ReadCorpus { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse corpus JSON.")]
	ParseCorpus(#[from] serde_json::Error),
	#[error("Invalid corpus: {message}")]
	InvalidCorpus { message: String },
}
