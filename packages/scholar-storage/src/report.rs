use std::path::{Path, PathBuf};

use time::Date;

use scholar_domain::Document;

use crate::{Error, Result};

/// Daily report files under `{root}/YYYY/MM/`.
#[derive(Clone, Debug)]
pub struct ReportStore {
	root: PathBuf,
}
impl ReportStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn month_dir(&self, date: Date) -> PathBuf {
		self.root.join(format!("{:04}", date.year())).join(format!("{:02}", u8::from(date.month())))
	}

	pub fn metadata_path(&self, date: Date) -> PathBuf {
		self.month_dir(date).join(format!("{}_daily.json", crate::date_key(date)))
	}

	pub fn digest_path(&self, date: Date) -> PathBuf {
		self.month_dir(date).join(format!("{}_daily.md", crate::date_key(date)))
	}

	/// Writes the full ranked document set as JSON.
	pub async fn save_metadata(&self, documents: &[Document], date: Date) -> Result<PathBuf> {
		let path = self.metadata_path(date);

		crate::write_json(&path, documents).await?;

		tracing::info!(path = %path.display(), count = documents.len(), "Report metadata saved.");

		Ok(path)
	}

	pub async fn save_digest(&self, digest: &str, date: Date) -> Result<PathBuf> {
		let path = self.digest_path(date);

		write_text(&path, digest).await?;

		tracing::info!(path = %path.display(), "Report digest saved.");

		Ok(path)
	}
}

async fn write_text(path: &Path, contents: &str) -> Result<()> {
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent)
			.await
			.map_err(|source| Error::Io { path: parent.to_path_buf(), source })?;
	}

	tokio::fs::write(path, contents)
		.await
		.map_err(|source| Error::Io { path: path.to_path_buf(), source })
}
