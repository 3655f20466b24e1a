use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::record::ScoreRecord;

/// Reason recorded when the model response has no record for a document's local index.
pub const OMITTED_REASON: &str = "omitted by model";

const MISSING_FIELD: &str = "N/A";

/// One catalog entry under evaluation.
///
/// Metadata is fixed at fetch time. The scoring fields stay `None` until the batch that owns
/// the document applies an [`Assessment`], and `local_path` is only set by the download stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub doc_id: Uuid,
	pub title: String,
	pub authors: Vec<String>,
	pub summary: String,
	#[serde(with = "time::serde::rfc3339")]
	pub published_at: OffsetDateTime,
	pub source_url: String,
	pub pdf_url: String,
	pub categories: Vec<String>,
	pub journal_ref: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary_zh: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub local_path: Option<PathBuf>,
}
impl Document {
	pub fn new(
		source_url: impl Into<String>,
		title: impl Into<String>,
		summary: impl Into<String>,
		published_at: OffsetDateTime,
	) -> Self {
		let source_url = source_url.into();

		Self {
			doc_id: doc_id_for(&source_url),
			title: title.into(),
			authors: Vec::new(),
			summary: summary.into(),
			published_at,
			pdf_url: source_url.replacen("/abs/", "/pdf/", 1),
			source_url,
			categories: Vec::new(),
			journal_ref: MISSING_FIELD.to_string(),
			score: None,
			reason: None,
			summary_zh: None,
			local_path: None,
		}
	}

	/// Catalog-local identifier, the last path segment of the source URL.
	pub fn arxiv_id(&self) -> &str {
		self.source_url.trim_end_matches('/').rsplit('/').next().unwrap_or(&self.source_url)
	}

	pub fn score_or_zero(&self) -> f64 {
		self.score.unwrap_or(0.0)
	}

	pub fn apply_assessment(&mut self, assessment: Assessment) {
		self.score = Some(assessment.score);
		self.reason = Some(assessment.reason);
		self.summary_zh = assessment.summary_zh;
	}
}

/// Scoring fields written onto a [`Document`] by the batch that owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct Assessment {
	pub score: f64,
	pub reason: String,
	pub summary_zh: Option<String>,
}
impl Assessment {
	pub fn from_record(record: &ScoreRecord) -> Self {
		Self {
			score: record.score,
			reason: record.reason.clone().unwrap_or_else(|| MISSING_FIELD.to_string()),
			summary_zh: Some(
				record.summary_zh.clone().unwrap_or_else(|| MISSING_FIELD.to_string()),
			),
		}
	}

	pub fn omitted() -> Self {
		Self { score: 0.0, reason: OMITTED_REASON.to_string(), summary_zh: None }
	}

	pub fn failed(reason: impl Into<String>) -> Self {
		Self { score: 0.0, reason: reason.into(), summary_zh: None }
	}
}

pub fn doc_id_for(source_url: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_URL, source_url.as_bytes())
}

/// Sorts by descending score, with unscored documents ranked as zero.
///
/// Ties fall back to newest publication first, then ascending source URL, so the result does
/// not depend on the order batches finished in.
pub fn rank_by_score(documents: &mut [Document]) {
	documents.sort_by(|a, b| {
		b.score_or_zero()
			.total_cmp(&a.score_or_zero())
			.then_with(|| b.published_at.cmp(&a.published_at))
			.then_with(|| a.source_url.cmp(&b.source_url))
	});
}
