pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Catalog fetch failed: {0}")]
	Fetch(#[source] scholar_providers::Error),
	#[error("Provider error: {0}")]
	Provider(#[from] scholar_providers::Error),
	#[error(transparent)]
	Normalize(#[from] scholar_domain::NormalizeError),
	#[error("Storage error: {0}")]
	Storage(#[from] scholar_storage::Error),
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
