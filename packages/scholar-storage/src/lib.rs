pub mod checkpoint;
pub mod error;
pub mod report;

pub use checkpoint::CheckpointStore;
pub use error::{Error, Result};
pub use report::ReportStore;

use std::path::Path;

use time::{Date, macros::format_description};

/// Calendar key used in stored file names, `YYYY-MM-DD`.
pub fn date_key(date: Date) -> String {
	let format = format_description!("[year]-[month]-[day]");

	date.format(format).unwrap_or_else(|_| date.to_string())
}

pub(crate) async fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
	T: ?Sized + serde::Serialize,
{
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent)
			.await
			.map_err(|source| Error::Io { path: parent.to_path_buf(), source })?;
	}

	let payload = serde_json::to_vec_pretty(value)
		.map_err(|source| Error::Json { path: path.to_path_buf(), source })?;

	tokio::fs::write(path, payload)
		.await
		.map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	#[test]
	fn formats_zero_padded_date_key() {
		assert_eq!(date_key(date!(2025 - 03 - 07)), "2025-03-07");
	}
}
