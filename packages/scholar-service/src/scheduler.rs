use std::{collections::HashMap, sync::Arc};

use tokio::{
	sync::Semaphore,
	task::{self, JoinSet},
};

use scholar_domain::{Assessment, Batch, Document, partition};

use crate::{BatchOutcome, BatchScorer};

/// Runs [`BatchScorer`]s over a bounded pool and gathers every document exactly once.
#[derive(Clone)]
pub struct ScoringScheduler {
	scorer: Arc<BatchScorer>,
}
impl ScoringScheduler {
	pub fn new(scorer: BatchScorer) -> Self {
		Self { scorer: Arc::new(scorer) }
	}

	/// Scores `documents` in batches of `batch_size`, at most `concurrency` at a time.
	///
	/// The result holds every input document once, in batch completion order. A batch whose
	/// worker dies is still returned, with zero scores.
	pub async fn score_all(
		&self,
		documents: Vec<Document>,
		batch_size: usize,
		concurrency: usize,
		system_prompt: &str,
	) -> Vec<Document> {
		let input_len = documents.len();
		let batches = partition(documents, batch_size);
		let total = batches.len();
		let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
		let system_prompt: Arc<str> = Arc::from(system_prompt);
		let mut pending: HashMap<task::Id, Batch> = HashMap::with_capacity(total);
		let mut unscheduled = Vec::new();
		let mut tasks = JoinSet::new();

		tracing::info!(documents = input_len, batches = total, concurrency, "Scoring started.");

		for batch in batches {
			// The semaphore is never closed while this function holds it.
			let Ok(permit) = semaphore.clone().acquire_owned().await else {
				unscheduled.push(batch);

				continue;
			};
			let scorer = self.scorer.clone();
			let system_prompt = system_prompt.clone();
			let kept = batch.clone();
			let handle = tasks.spawn(async move {
				let _permit = permit;

				scorer.score(batch, &system_prompt).await
			});

			pending.insert(handle.id(), kept);
		}

		let mut scored = Vec::with_capacity(input_len);
		let mut hits = 0;
		let mut failed = 0;
		let mut crashed = 0;

		while let Some(joined) = tasks.join_next_with_id().await {
			match joined {
				Ok((id, outcome)) => {
					pending.remove(&id);

					match &outcome {
						BatchOutcome::Scored { hits: batch_hits, .. } => hits += batch_hits,
						BatchOutcome::Failed { .. } => failed += 1,
					}

					scored.extend(outcome.into_documents());
				},
				Err(err) => {
					let Some(batch) = pending.remove(&err.id()) else {
						tracing::error!(error = %err, "Scoring worker crashed without a batch.");

						continue;
					};

					tracing::error!(
						batch = batch.index,
						size = batch.len(),
						error = %err,
						"Scoring worker crashed. Degrading its batch."
					);

					crashed += 1;

					scored.extend(degrade(batch, &format!("worker crashed: {err}")));
				},
			}
		}

		for batch in unscheduled {
			tracing::error!(batch = batch.index, size = batch.len(), "Degrading unscheduled batch.");

			crashed += 1;

			scored.extend(degrade(batch, "worker crashed: batch was never scheduled"));
		}

		tracing::info!(
			documents = scored.len(),
			batches = total,
			hits,
			failed,
			crashed,
			"Scoring finished."
		);

		scored
	}
}

fn degrade(batch: Batch, reason: &str) -> Vec<Document> {
	batch
		.documents
		.into_iter()
		.map(|mut document| {
			document.apply_assessment(Assessment::failed(reason));

			document
		})
		.collect()
}
