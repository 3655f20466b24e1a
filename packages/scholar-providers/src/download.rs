use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use reqwest::Client;

use crate::{Error, Result};

/// Fetches remote assets (PDFs) onto the local disk.
#[derive(Clone, Debug)]
pub struct AssetDownloader {
	client: Client,
}
impl AssetDownloader {
	pub fn new(cfg: &scholar_config::DownloadProviderConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.user_agent(cfg.user_agent.as_str())
			.build()?;

		Ok(Self { client })
	}

	/// Downloads `url` to `dest` unless `dest` already exists.
	///
	/// The body is written to a sibling `.part` file first and renamed into place, so an
	/// interrupted download never leaves a truncated file under the final name.
	pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
		if tokio::fs::try_exists(dest).await.map_err(|source| io_error(dest, source))? {
			tracing::info!(path = %dest.display(), "Asset already exists. Skipping download.");

			return Ok(dest.to_path_buf());
		}
		if let Some(parent) = dest.parent() {
			tokio::fs::create_dir_all(parent).await.map_err(|source| io_error(parent, source))?;
		}

		let res = self.client.get(url).send().await?;
		let bytes = crate::check_status(res).await?.bytes().await?;

		persist(&bytes, dest).await?;

		tracing::info!(url, path = %dest.display(), bytes = bytes.len(), "Asset downloaded.");

		Ok(dest.to_path_buf())
	}
}

/// Writes `bytes` to the `.part` sibling of `dest` and renames it into place. The partial
/// file is removed when either step fails.
async fn persist(bytes: &[u8], dest: &Path) -> Result<()> {
	let partial = partial_path(dest);
	let written = match tokio::fs::write(&partial, bytes).await {
		Ok(()) => tokio::fs::rename(&partial, dest).await.map_err(|source| io_error(dest, source)),
		Err(source) => Err(io_error(&partial, source)),
	};

	if written.is_err()
		&& let Err(err) = tokio::fs::remove_file(&partial).await
		&& err.kind() != std::io::ErrorKind::NotFound
	{
		tracing::warn!(path = %partial.display(), error = %err, "Failed to remove partial asset.");
	}

	written
}

fn partial_path(dest: &Path) -> PathBuf {
	let mut name = dest.file_name().map(|name| name.to_os_string()).unwrap_or_default();

	name.push(".part");

	dest.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
	Error::Io { path: path.to_path_buf(), source }
}

#[cfg(test)]
mod tests {
	use scholar_testkit::TempDir;

	use super::*;

	#[tokio::test]
	async fn persist_renames_into_place() {
		let dir = TempDir::new("scholar_persist").expect("Failed to create temp dir.");
		let dest = dir.path().join("paper.pdf");

		persist(b"%PDF-1.7", &dest).await.expect("persist failed");

		assert_eq!(std::fs::read(&dest).expect("read failed"), b"%PDF-1.7");
		assert!(!partial_path(&dest).exists());
	}

	#[tokio::test]
	async fn failed_rename_removes_partial_file() {
		let dir = TempDir::new("scholar_persist").expect("Failed to create temp dir.");
		let dest = dir.path().join("paper.pdf");

		// A non-empty directory under the final name makes the rename fail.
		std::fs::create_dir_all(dest.join("occupied")).expect("Failed to create blocker.");

		let err = persist(b"%PDF-1.7", &dest).await.expect_err("rename should fail");

		assert!(matches!(err, Error::Io { ref path, .. } if path == &dest), "{err}");
		assert!(!partial_path(&dest).exists());
	}

	#[test]
	fn partial_file_sits_next_to_destination() {
		let dest = Path::new("data/inbox/[2501.00001v1] Title.pdf");

		assert_eq!(partial_path(dest), PathBuf::from("data/inbox/[2501.00001v1] Title.pdf.part"));
	}
}
