use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O failed for {path:?}.")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Invalid JSON in {path:?}.")]
	Json {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
}
