use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to prepare {path:?}.")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
