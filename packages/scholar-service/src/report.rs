use scholar_config::Report;
use scholar_domain::Document;

const MISSING_FIELD: &str = "N/A";

/// Number of documents scoring at least `threshold`.
pub fn count_at_least(documents: &[Document], threshold: f64) -> usize {
	documents.iter().filter(|document| document.score_or_zero() >= threshold).count()
}

/// Title line of the daily digest.
pub fn digest_subject(documents: &[Document], date_key: &str, report: &Report) -> String {
	let qualified = count_at_least(documents, report.send_threshold);

	format!("Scholar Daily: {qualified} Papers Selected ({date_key})")
}

/// Markdown digest of an already ranked document set, showing the first `top_k`.
pub fn render_digest(documents: &[Document], date_key: &str, report: &Report) -> String {
	let shown = documents.len().min(report.top_k as usize);
	let hidden = documents.len() - shown;
	let mut out = String::new();

	out.push_str(&format!("# {}\n\n", digest_subject(documents, date_key, report)));
	out.push_str(&format!("{} documents scored. Showing the top {shown}.\n\n", documents.len()));

	for (rank, document) in documents.iter().take(shown).enumerate() {
		out.push_str(&format!(
			"## {}. [{:.1}] {}\n\n",
			rank + 1,
			document.score_or_zero(),
			document.title
		));
		out.push_str(&format!("- Authors: {}\n", joined_or_missing(&document.authors)));
		out.push_str(&format!("- Published: {}\n", document.published_at.date()));
		out.push_str(&format!("- Categories: {}\n", joined_or_missing(&document.categories)));
		out.push_str(&format!("- Journal: {}\n", document.journal_ref));
		out.push_str(&format!("- Link: {}\n", document.source_url));

		if let Some(path) = &document.local_path {
			out.push_str(&format!("- Local copy: {}\n", path.display()));
		}

		out.push_str(&format!(
			"\n{}\n\n",
			document.reason.as_deref().unwrap_or(MISSING_FIELD)
		));

		if let Some(summary) = document.summary_zh.as_deref().filter(|s| *s != MISSING_FIELD) {
			out.push_str(&format!("> {summary}\n\n"));
		}
	}

	if hidden > 0 {
		out.push_str(&format!("_{hidden} more documents not shown._\n"));
	}

	out
}

fn joined_or_missing(items: &[String]) -> String {
	if items.is_empty() { MISSING_FIELD.to_string() } else { items.join(", ") }
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn scored(id: u32, score: f64) -> Document {
		let mut document = Document::new(
			format!("http://arxiv.org/abs/2501.{id:05}v1"),
			format!("Paper {id}"),
			"Abstract.",
			datetime!(2025-01-02 08:00 UTC),
		);

		document.score = Some(score);
		document.reason = Some(format!("Reason {id}."));

		document
	}

	#[test]
	fn shows_top_k_and_counts_hidden() {
		let documents = vec![scored(1, 4.5), scored(2, 3.0), scored(3, 1.0)];
		let report = Report { top_k: 2, send_threshold: 2.0 };
		let digest = render_digest(&documents, "2025-01-02", &report);

		assert!(digest.starts_with("# Scholar Daily: 2 Papers Selected (2025-01-02)\n"));
		assert!(digest.contains("## 1. [4.5] Paper 1"));
		assert!(digest.contains("## 2. [3.0] Paper 2"));
		assert!(!digest.contains("Paper 3"));
		assert!(digest.contains("_1 more documents not shown._"));
	}

	#[test]
	fn renders_one_entry_block() {
		let mut document = scored(7, 4.5);

		document.authors = vec!["Ada".to_string(), "Grace".to_string()];
		document.summary_zh = Some("摘要".to_string());

		let report = Report { top_k: 15, send_threshold: 2.0 };
		let expected = "\
# Scholar Daily: 1 Papers Selected (2025-01-02)

1 documents scored. Showing the top 1.

## 1. [4.5] Paper 7

- Authors: Ada, Grace
- Published: 2025-01-02
- Categories: N/A
- Journal: N/A
- Link: http://arxiv.org/abs/2501.00007v1

Reason 7.

> 摘要

";

		assert_eq!(render_digest(&[document], "2025-01-02", &report), expected);
	}

	#[test]
	fn no_hidden_line_when_everything_fits() {
		let documents = vec![scored(1, 4.5)];
		let report = Report { top_k: 15, send_threshold: 2.0 };

		assert!(!render_digest(&documents, "2025-01-02", &report).contains("not shown"));
	}
}
