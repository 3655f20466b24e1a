//! One daily run: fetch, checkpoint, score, download, rank and report.

use std::{path::PathBuf, time::Duration};

use time::OffsetDateTime;

use scholar_config::Config;
use scholar_domain::{Document, asset_file_name, rank_by_score};
use scholar_providers::{CatalogQuery, subjects_query};
use scholar_storage::{CheckpointStore, ReportStore};

use crate::{
	BatchScorer, Error, Providers, Result, RetryPolicy, RetryableCaller, ScoringScheduler, prompt,
	report,
};

#[derive(Clone, Debug, Default)]
pub struct RunOptions {
	/// Overrides `daily.days_back`.
	pub days_back: Option<u32>,
	/// Caps how many documents are fetched and scored.
	pub limit: Option<usize>,
	/// Writes the digest even when nothing reaches `daily.report_threshold`.
	pub force_report: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub fetched: usize,
	pub scored: usize,
	pub downloaded: usize,
	pub checkpoint_path: Option<PathBuf>,
	pub metadata_path: Option<PathBuf>,
	pub digest_path: Option<PathBuf>,
}

pub struct DailyFlow {
	cfg: Config,
	providers: Providers,
	caller: RetryableCaller,
	checkpoints: CheckpointStore,
	reports: ReportStore,
	inbox_dir: PathBuf,
}
impl DailyFlow {
	pub fn new(cfg: Config, providers: Providers) -> Self {
		let data_dir = cfg.service.data_dir.clone();
		let caller = RetryableCaller::new(RetryPolicy::from_config(&cfg.scoring.retry));

		Self {
			cfg,
			providers,
			caller,
			checkpoints: CheckpointStore::new(data_dir.join("raw_cache")),
			reports: ReportStore::new(data_dir.join("reports").join("daily")),
			inbox_dir: data_dir.join("inbox"),
		}
	}

	pub fn checkpoints(&self) -> &CheckpointStore {
		&self.checkpoints
	}

	pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
		self.run_at(options, OffsetDateTime::now_utc()).await
	}

	/// Runs the flow as if the current time were `now`. Dates in file names are UTC.
	pub async fn run_at(&self, options: RunOptions, now: OffsetDateTime) -> Result<RunSummary> {
		let days_back = options.days_back.unwrap_or(self.cfg.daily.days_back);

		tracing::info!(days_back, limit = ?options.limit, "Daily run started.");

		let mut summary = RunSummary::default();
		let mut documents = self.fetch(days_back, options.limit, now).await?;

		summary.fetched = documents.len();

		if documents.is_empty() {
			tracing::info!("No new documents found.");

			return Ok(summary);
		}

		let date = now.date();

		match self.checkpoints.save(&documents, date).await {
			Ok(path) => summary.checkpoint_path = Some(path),
			Err(err) => tracing::warn!(error = %err, "Failed to save checkpoint. Continuing."),
		}

		if let Some(limit) = options.limit
			&& documents.len() > limit
		{
			tracing::warn!(limit, fetched = documents.len(), "Limiting documents for this run.");

			documents.truncate(limit);
		}

		let mut documents = self.score(documents).await;

		summary.scored = documents.len();

		rank_by_score(&mut documents);

		summary.downloaded = self.download_notable(&mut documents).await;
		summary.metadata_path = Some(self.reports.save_metadata(&documents, date).await?);

		let qualified = report::count_at_least(&documents, self.cfg.daily.report_threshold);

		if qualified > 0 || options.force_report {
			let date_key = scholar_storage::date_key(date);
			let digest = report::render_digest(&documents, &date_key, &self.cfg.report);

			tracing::info!(qualified, forced = options.force_report, "Writing digest.");

			summary.digest_path = Some(self.reports.save_digest(&digest, date).await?);
		} else {
			tracing::info!("No document reached the report threshold. Digest skipped.");
		}

		tracing::info!(
			fetched = summary.fetched,
			scored = summary.scored,
			downloaded = summary.downloaded,
			"Daily run finished."
		);

		Ok(summary)
	}

	async fn fetch(
		&self,
		days_back: u32,
		limit: Option<usize>,
		now: OffsetDateTime,
	) -> Result<Vec<Document>> {
		if self.cfg.daily.subjects.is_empty() {
			return Err(Error::InvalidRequest { message: "No subjects configured.".to_string() });
		}

		let query = CatalogQuery {
			query: subjects_query(&self.cfg.daily.subjects),
			since: now - time::Duration::days(i64::from(days_back)),
			max_results: limit.unwrap_or(self.cfg.providers.catalog.max_results as usize),
		};

		self.caller
			.call("catalog", || self.providers.catalog.search(&query))
			.await
			.map_err(Error::Fetch)
	}

	async fn score(&self, documents: Vec<Document>) -> Vec<Document> {
		let scoring = &self.cfg.scoring;
		let scorer = BatchScorer::new(self.providers.model.clone(), self.caller.clone(), scoring);
		let system_prompt = prompt::build_system_prompt(&self.cfg.daily);

		ScoringScheduler::new(scorer)
			.score_all(
				documents,
				scoring.batch_size as usize,
				scoring.concurrency as usize,
				&system_prompt,
			)
			.await
	}

	/// Downloads every document at or above `daily.download_threshold`, recording where it
	/// landed. Failures are logged and skipped.
	async fn download_notable(&self, documents: &mut [Document]) -> usize {
		let threshold = self.cfg.daily.download_threshold;
		let pacing = Duration::from_millis(self.cfg.providers.download.pacing_ms);
		let targets: Vec<usize> = documents
			.iter()
			.enumerate()
			.filter(|(_, document)| document.score_or_zero() >= threshold)
			.map(|(position, _)| position)
			.collect();

		if targets.is_empty() {
			tracing::info!(threshold, "No documents to download.");

			return 0;
		}

		let mut downloaded = 0;

		for (n, &position) in targets.iter().enumerate() {
			let document = &mut documents[position];
			let dest = self.inbox_dir.join(asset_file_name(document));
			let url = document.pdf_url.clone();
			let result =
				self.caller.call("download", || self.providers.assets.download(&url, &dest)).await;

			match result {
				Ok(path) => {
					document.local_path = Some(path);
					downloaded += 1;
				},
				Err(err) => tracing::error!(
					url = %url,
					position = n + 1,
					targets = targets.len(),
					error = %err,
					"Download failed."
				),
			}

			if !pacing.is_zero() && n + 1 < targets.len() {
				tokio::time::sleep(pacing).await;
			}
		}

		tracing::info!(downloaded, targets = targets.len(), "Downloads finished.");

		downloaded
	}
}
