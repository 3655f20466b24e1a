//! Shared fixtures for workspace tests: scratch directories, a valid configuration,
//! synthetic documents and a concurrency probe for fake providers.

mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicUsize, Ordering},
};

use time::macros::datetime;
use uuid::Uuid;

use scholar_config::{
	CatalogProviderConfig, Config, Daily, DownloadProviderConfig, LlmProviderConfig, Providers,
	Report, Retry, Scoring, Service,
};
use scholar_domain::Document;

/// Scratch directory removed on drop.
pub struct TempDir {
	path: PathBuf,
}
impl TempDir {
	pub fn new(prefix: &str) -> Result<Self> {
		let path = env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path).map_err(|source| Error::Io { path: path.clone(), source })?;

		Ok(Self { path })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}
impl Drop for TempDir {
	fn drop(&mut self) {
		if let Err(err) = fs::remove_dir_all(&self.path) {
			eprintln!("Test directory cleanup failed for {:?}: {err}.", self.path);
		}
	}
}

/// Tracks how many callers are inside a section at once and the highest count seen.
#[derive(Debug, Default)]
pub struct ConcurrencyTracker {
	active: AtomicUsize,
	peak: AtomicUsize,
}
impl ConcurrencyTracker {
	pub fn enter(&self) -> ActiveGuard<'_> {
		let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;

		self.peak.fetch_max(now, Ordering::SeqCst);

		ActiveGuard { tracker: self }
	}

	pub fn active(&self) -> usize {
		self.active.load(Ordering::SeqCst)
	}

	pub fn peak(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}
}

pub struct ActiveGuard<'a> {
	tracker: &'a ConcurrencyTracker,
}
impl Drop for ActiveGuard<'_> {
	fn drop(&mut self) {
		self.tracker.active.fetch_sub(1, Ordering::SeqCst);
	}
}

/// A configuration that passes validation, with zero pacing and millisecond retry delays.
pub fn sample_config(data_dir: &Path) -> Config {
	Config {
		service: Service { log_level: "info".to_string(), data_dir: data_dir.to_path_buf() },
		providers: Providers {
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "test-model".to_string(),
				temperature: 0.3,
				max_tokens: 1_000,
				timeout_ms: 1_000,
				default_headers: Default::default(),
			},
			catalog: CatalogProviderConfig {
				api_base: "http://127.0.0.1:9/api/query".to_string(),
				page_size: 100,
				max_results: 3_000,
				page_delay_ms: 0,
				timeout_ms: 1_000,
			},
			download: DownloadProviderConfig {
				timeout_ms: 1_000,
				user_agent: "scholar-test".to_string(),
				pacing_ms: 0,
			},
		},
		scoring: Scoring {
			batch_size: 25,
			concurrency: 4,
			notable_threshold: 4.0,
			pacing_ms: 0,
			parse_retries: 1,
			retry: Retry { max_attempts: 3, base_delay_ms: 1, max_delay_ms: 5 },
		},
		daily: Daily {
			subjects: vec!["cs.CR".to_string(), "cs.AI".to_string()],
			user_profile: "Security researcher interested in fuzzing.".to_string(),
			negative_patterns: vec!["Survey papers".to_string()],
			white_list_keywords: vec!["fuzzing".to_string()],
			days_back: 1,
			download_threshold: 4.0,
			report_threshold: 3.5,
		},
		report: Report { top_k: 15, send_threshold: 2.0 },
	}
}

/// `n` unscored documents titled `Paper {i}` with distinct source URLs.
pub fn sample_documents(n: usize) -> Vec<Document> {
	(0..n)
		.map(|i| {
			let mut document = Document::new(
				format!("http://arxiv.org/abs/2501.{i:05}v1"),
				format!("Paper {i}"),
				format!("Abstract of paper {i}."),
				datetime!(2025-01-02 08:00 UTC),
			);

			document.authors = vec![format!("Author {i}")];
			document.categories = vec!["cs.CR".to_string()];

			document
		})
		.collect()
}

/// Batch-local ids listed in a scoring prompt, in prompt order.
pub fn ids_in_prompt(user_content: &str) -> Vec<usize> {
	user_content
		.lines()
		.filter_map(|line| line.strip_prefix("ID: "))
		.filter_map(|rest| rest.split(" | ").next())
		.filter_map(|id| id.trim().parse().ok())
		.collect()
}

/// Titles listed in a scoring prompt, in prompt order.
pub fn titles_in_prompt(user_content: &str) -> Vec<String> {
	user_content
		.lines()
		.filter_map(|line| line.split_once(" | Title: "))
		.map(|(_, title)| title.to_string())
		.collect()
}
