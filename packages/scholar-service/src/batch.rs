use std::{collections::HashMap, sync::Arc, time::Duration};

use scholar_config::Scoring;
use scholar_domain::{Assessment, Batch, Document, ScoreRecord};

use crate::{ModelProvider, Result, RetryableCaller};

const USER_CONTENT_PREFIX: &str = "Please analyze these papers:\n\n";

/// Result of scoring one batch. Both variants hand back every document of the batch, in
/// batch order, with its scoring fields written.
#[derive(Clone, Debug)]
pub enum BatchOutcome {
	Scored { documents: Vec<Document>, hits: usize },
	Failed { documents: Vec<Document>, reason: String },
}
impl BatchOutcome {
	pub fn into_documents(self) -> Vec<Document> {
		match self {
			Self::Scored { documents, .. } | Self::Failed { documents, .. } => documents,
		}
	}
}

/// Scores one batch with a single model call, absorbing every failure into zero scores.
#[derive(Clone)]
pub struct BatchScorer {
	model: Arc<dyn ModelProvider>,
	caller: RetryableCaller,
	notable_threshold: f64,
	parse_retries: u32,
	pacing: Duration,
}
impl BatchScorer {
	pub fn new(model: Arc<dyn ModelProvider>, caller: RetryableCaller, cfg: &Scoring) -> Self {
		Self {
			model,
			caller,
			notable_threshold: cfg.notable_threshold,
			parse_retries: cfg.parse_retries,
			pacing: Duration::from_millis(cfg.pacing_ms),
		}
	}

	pub async fn score(&self, batch: Batch, system_prompt: &str) -> BatchOutcome {
		let Batch { index, total, mut documents } = batch;

		tracing::info!(batch = index, total, size = documents.len(), "Scoring batch.");

		let user_content = build_user_content(&documents);
		let result = self.request_records(index, system_prompt, &user_content).await;

		if !self.pacing.is_zero() {
			tokio::time::sleep(self.pacing).await;
		}

		match result {
			Ok(records) => {
				let hits = self.apply_records(index, &mut documents, records);

				tracing::info!(batch = index, total, hits, "Batch scored.");

				BatchOutcome::Scored { documents, hits }
			},
			Err(err) => {
				let reason = format!("batch error: {err}");

				tracing::error!(batch = index, total, error = %err, "Batch failed.");

				for document in &mut documents {
					document.apply_assessment(Assessment::failed(reason.clone()));
				}

				BatchOutcome::Failed { documents, reason }
			},
		}
	}

	async fn request_records(
		&self,
		index: usize,
		system_prompt: &str,
		user_content: &str,
	) -> Result<Vec<ScoreRecord>> {
		let mut parse_attempts = 0;

		loop {
			let raw = self
				.caller
				.call("model", || self.model.invoke(system_prompt, user_content, true))
				.await?;

			match scholar_domain::normalize(&raw) {
				Ok(records) => return Ok(records),
				Err(err) if parse_attempts < self.parse_retries => {
					parse_attempts += 1;

					tracing::warn!(
						batch = index,
						parse_attempts,
						error = %err,
						"Model response is not parseable. Asking again."
					);
				},
				Err(err) => return Err(err.into()),
			}
		}
	}

	fn apply_records(
		&self,
		index: usize,
		documents: &mut [Document],
		records: Vec<ScoreRecord>,
	) -> usize {
		let mut by_id = HashMap::with_capacity(records.len());

		for record in records {
			if let Some(id) = record.id {
				by_id.entry(id).or_insert(record);
			}
		}

		let mut hits = 0;

		for (local_id, document) in documents.iter_mut().enumerate() {
			let Some(record) = by_id.get(&local_id) else {
				document.apply_assessment(Assessment::omitted());

				continue;
			};

			document.apply_assessment(Assessment::from_record(record));

			if record.score >= self.notable_threshold {
				hits += 1;

				tracing::info!(
					batch = index,
					score = record.score,
					title = %document.title,
					"Notable document."
				);
			}
		}

		hits
	}
}

/// The user message for one batch. Ids are positions within the batch.
pub fn build_user_content(documents: &[Document]) -> String {
	let mut content = String::from(USER_CONTENT_PREFIX);

	for (local_id, document) in documents.iter().enumerate() {
		content.push_str(&format!(
			"ID: {local_id} | Title: {}\nAbstract: {}\n---\n",
			document.title, document.summary
		));
	}

	content
}
