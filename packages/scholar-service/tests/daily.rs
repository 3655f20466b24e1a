use std::{
	path::{Path, PathBuf},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use time::macros::datetime;

use scholar_config::Config;
use scholar_domain::Document;
use scholar_providers::{CatalogQuery, Error as ProviderError};
use scholar_service::{
	AssetProvider, BoxFuture, CatalogProvider, DailyFlow, Error, ModelProvider, Providers,
	RunOptions,
};
use scholar_testkit::{TempDir, ids_in_prompt, sample_config, sample_documents, titles_in_prompt};

struct FakeCatalog {
	documents: Vec<Document>,
	status: Option<u16>,
	calls: AtomicUsize,
	queries: Mutex<Vec<CatalogQuery>>,
}
impl FakeCatalog {
	fn returning(documents: Vec<Document>) -> Arc<Self> {
		Arc::new(Self {
			documents,
			status: None,
			calls: AtomicUsize::new(0),
			queries: Mutex::new(Vec::new()),
		})
	}

	fn failing(status: u16) -> Arc<Self> {
		Arc::new(Self {
			documents: Vec::new(),
			status: Some(status),
			calls: AtomicUsize::new(0),
			queries: Mutex::new(Vec::new()),
		})
	}

	fn last_query(&self) -> CatalogQuery {
		self.queries
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.last()
			.cloned()
			.expect("Catalog was never queried.")
	}
}
impl CatalogProvider for FakeCatalog {
	fn search<'a>(
		&'a self,
		query: &'a CatalogQuery,
	) -> BoxFuture<'a, scholar_providers::Result<Vec<Document>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.queries.lock().unwrap_or_else(|err| err.into_inner()).push(query.clone());

		let result = match self.status {
			Some(status) => Err(ProviderError::Status { status, body: "catalog down".to_string() }),
			None => Ok(self.documents.clone()),
		};

		Box::pin(async move { result })
	}
}

/// Scores `Paper 0` at 4.5 and everything else at `baseline`.
struct TitleModel {
	baseline: f64,
}
impl ModelProvider for TitleModel {
	fn invoke<'a>(
		&'a self,
		_system_prompt: &'a str,
		user_content: &'a str,
		_json_mode: bool,
	) -> BoxFuture<'a, scholar_providers::Result<String>> {
		let records: Vec<serde_json::Value> = ids_in_prompt(user_content)
			.into_iter()
			.zip(titles_in_prompt(user_content))
			.map(|(id, title)| {
				let score = if title == "Paper 0" { 4.5 } else { self.baseline };

				serde_json::json!({ "id": id, "score": score, "reason": format!("About {title}.") })
			})
			.collect();

		Box::pin(async move { Ok(serde_json::Value::Array(records).to_string()) })
	}
}

#[derive(Default)]
struct FakeAssets {
	urls: Mutex<Vec<String>>,
}
impl AssetProvider for FakeAssets {
	fn download<'a>(
		&'a self,
		url: &'a str,
		dest: &'a Path,
	) -> BoxFuture<'a, scholar_providers::Result<PathBuf>> {
		Box::pin(async move {
			self.urls.lock().unwrap_or_else(|err| err.into_inner()).push(url.to_string());

			if let Some(parent) = dest.parent() {
				std::fs::create_dir_all(parent).map_err(|source| ProviderError::Io {
					path: parent.to_path_buf(),
					source,
				})?;
			}

			std::fs::write(dest, b"%PDF-1.4")
				.map_err(|source| ProviderError::Io { path: dest.to_path_buf(), source })?;

			Ok(dest.to_path_buf())
		})
	}
}

struct Harness {
	dir: TempDir,
	catalog: Arc<FakeCatalog>,
	assets: Arc<FakeAssets>,
	flow: DailyFlow,
}

fn harness(catalog: Arc<FakeCatalog>, baseline: f64) -> Harness {
	let dir = TempDir::new("scholar_daily").expect("Failed to create temp dir.");
	let cfg: Config = sample_config(dir.path());
	let assets = Arc::new(FakeAssets::default());
	let providers =
		Providers::new(Arc::new(TitleModel { baseline }), catalog.clone(), assets.clone());

	Harness { flow: DailyFlow::new(cfg, providers), dir, catalog, assets }
}

fn now() -> time::OffsetDateTime {
	datetime!(2025-01-02 12:00 UTC)
}

#[tokio::test]
async fn full_run_scores_downloads_and_reports() {
	let h = harness(FakeCatalog::returning(sample_documents(6)), 1.0);
	let summary = h.flow.run_at(RunOptions::default(), now()).await.expect("Run failed.");

	assert_eq!(summary.fetched, 6);
	assert_eq!(summary.scored, 6);
	assert_eq!(summary.downloaded, 1);

	let checkpoint = summary.checkpoint_path.expect("Checkpoint should be saved.");
	let metadata = summary.metadata_path.expect("Metadata should be saved.");
	let digest = summary.digest_path.expect("Digest should be written.");

	assert_eq!(checkpoint, h.dir.path().join("raw_cache/checkpoint_2025-01-02.json"));
	assert_eq!(metadata, h.dir.path().join("reports/daily/2025/01/2025-01-02_daily.json"));
	assert!(digest.exists());

	let ranked: Vec<Document> = serde_json::from_str(
		&std::fs::read_to_string(&metadata).expect("Failed to read metadata."),
	)
	.expect("Metadata is not valid JSON.");

	assert_eq!(ranked.len(), 6);
	assert_eq!(ranked[0].title, "Paper 0");
	assert_eq!(ranked[0].score, Some(4.5));
	assert!(ranked.windows(2).all(|pair| pair[0].score_or_zero() >= pair[1].score_or_zero()));

	let local = ranked[0].local_path.clone().expect("Top document should be downloaded.");

	assert_eq!(local, h.dir.path().join("inbox/[2501.00000v1] Paper 0.pdf"));
	assert!(local.exists());
	assert_eq!(
		*h.assets.urls.lock().unwrap_or_else(|err| err.into_inner()),
		vec!["http://arxiv.org/pdf/2501.00000v1".to_string()]
	);
	assert!(ranked[1..].iter().all(|document| document.local_path.is_none()));

	let digest = std::fs::read_to_string(digest).expect("Failed to read digest.");

	assert!(digest.starts_with("# Scholar Daily: 1 Papers Selected (2025-01-02)"));
}

#[tokio::test]
async fn builds_catalog_query_from_config() {
	let h = harness(FakeCatalog::returning(sample_documents(1)), 1.0);
	let options = RunOptions { days_back: Some(3), ..Default::default() };

	h.flow.run_at(options, now()).await.expect("Run failed.");

	let query = h.catalog.last_query();

	assert_eq!(query.query, "cat:cs.CR OR cat:cs.AI");
	assert_eq!(query.since, datetime!(2024-12-30 12:00 UTC));
	assert_eq!(query.max_results, 3_000);
}

#[tokio::test]
async fn digest_is_skipped_without_notable_documents() {
	let mut documents = sample_documents(4);

	documents.remove(0);

	let h = harness(FakeCatalog::returning(documents), 1.0);
	let summary = h.flow.run_at(RunOptions::default(), now()).await.expect("Run failed.");

	assert!(summary.metadata_path.is_some());
	assert!(summary.digest_path.is_none());
	assert_eq!(summary.downloaded, 0);
}

#[tokio::test]
async fn force_report_writes_digest_anyway() {
	let mut documents = sample_documents(4);

	documents.remove(0);

	let h = harness(FakeCatalog::returning(documents), 1.0);
	let options = RunOptions { force_report: true, ..Default::default() };
	let summary = h.flow.run_at(options, now()).await.expect("Run failed.");

	assert!(summary.digest_path.is_some_and(|path| path.exists()));
}

#[tokio::test]
async fn limit_truncates_after_checkpoint() {
	let h = harness(FakeCatalog::returning(sample_documents(6)), 1.0);
	let options = RunOptions { limit: Some(2), ..Default::default() };
	let summary = h.flow.run_at(options, now()).await.expect("Run failed.");

	assert_eq!(h.catalog.last_query().max_results, 2);
	assert_eq!(summary.fetched, 6);
	assert_eq!(summary.scored, 2);

	let checkpoint = h
		.flow
		.checkpoints()
		.load(now().date())
		.await
		.expect("Failed to load checkpoint.")
		.expect("Checkpoint should exist.");

	assert_eq!(checkpoint.len(), 6);
}

#[tokio::test]
async fn fetch_failure_aborts_after_retries() {
	let h = harness(FakeCatalog::failing(503), 1.0);
	let err = h.flow.run_at(RunOptions::default(), now()).await.expect_err("Run should fail.");

	assert!(matches!(err, Error::Fetch(_)));
	assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 3);
	assert!(!h.dir.path().join("raw_cache").exists());
	assert!(!h.dir.path().join("reports").exists());
}

#[tokio::test]
async fn empty_catalog_ends_the_run_quietly() {
	let h = harness(FakeCatalog::returning(Vec::new()), 1.0);
	let summary = h.flow.run_at(RunOptions::default(), now()).await.expect("Run failed.");

	assert_eq!(summary.fetched, 0);
	assert!(summary.checkpoint_path.is_none());
	assert!(summary.metadata_path.is_none());
}
