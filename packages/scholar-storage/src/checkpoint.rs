use std::path::PathBuf;

use time::Date;

use scholar_domain::Document;

use crate::{Error, Result};

/// Raw fetched documents keyed by calendar date, written before scoring starts so a crash
/// later in the run does not require fetching again.
#[derive(Clone, Debug)]
pub struct CheckpointStore {
	dir: PathBuf,
}
impl CheckpointStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn path_for(&self, date: Date) -> PathBuf {
		self.dir.join(format!("checkpoint_{}.json", crate::date_key(date)))
	}

	/// Writes the checkpoint for `date`, replacing any earlier one.
	pub async fn save(&self, documents: &[Document], date: Date) -> Result<PathBuf> {
		let path = self.path_for(date);

		crate::write_json(&path, documents).await?;

		tracing::info!(path = %path.display(), count = documents.len(), "Checkpoint saved.");

		Ok(path)
	}

	/// Reads the checkpoint for `date`, or `None` when it was never written.
	pub async fn load(&self, date: Date) -> Result<Option<Vec<Document>>> {
		let path = self.path_for(date);
		let payload = match tokio::fs::read(&path).await {
			Ok(payload) => payload,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(source) => return Err(Error::Io { path, source }),
		};
		let documents =
			serde_json::from_slice(&payload).map_err(|source| Error::Json { path, source })?;

		Ok(Some(documents))
	}
}
