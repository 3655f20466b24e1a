//! Filesystem-safe names for downloaded assets.

use crate::document::Document;

pub const DEFAULT_MAX_LENGTH: usize = 200;

const FALLBACK_NAME: &str = "untitled_file";
const RESERVED: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Replaces reserved characters with `_`, drops control characters, trims surrounding
/// whitespace and dots, and truncates to `max_length` characters.
pub fn sanitize_filename(name: &str, max_length: usize) -> String {
	let replaced: String = name
		.chars()
		.filter(|c| !c.is_control())
		.map(|c| if RESERVED.contains(&c) { '_' } else { c })
		.collect();
	let trimmed = trim_name(&replaced);
	let truncated: String = trimmed.chars().take(max_length).collect();
	let truncated = trim_name(&truncated);

	if truncated.is_empty() { FALLBACK_NAME.to_string() } else { truncated.to_string() }
}

/// Inbox file name for a document: `[{arxiv_id}] {title}.pdf`.
pub fn asset_file_name(document: &Document) -> String {
	let stem = format!("[{}] {}", document.arxiv_id(), document.title);

	format!("{}.pdf", sanitize_filename(&stem, DEFAULT_MAX_LENGTH))
}

fn trim_name(name: &str) -> &str {
	name.trim_matches(|c: char| c.is_whitespace() || c == '.')
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn replaces_reserved_characters() {
		assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j", 200), "a_b_c_d_e_f_g_h_i_j");
	}

	#[test]
	fn drops_control_characters_and_trims() {
		assert_eq!(sanitize_filename("  ..Deep\tLearning\n..  ", 200), "DeepLearning");
	}

	#[test]
	fn truncates_by_characters() {
		let name = "é".repeat(300);

		assert_eq!(sanitize_filename(&name, DEFAULT_MAX_LENGTH).chars().count(), 200);
	}

	#[test]
	fn falls_back_when_nothing_remains() {
		assert_eq!(sanitize_filename("", 200), FALLBACK_NAME);
		assert_eq!(sanitize_filename(" ... ", 200), FALLBACK_NAME);
	}

	#[test]
	fn builds_inbox_file_name() {
		let doc = Document::new(
			"http://arxiv.org/abs/2501.00001v1",
			"Fuzzing: A Survey?",
			"Abstract",
			datetime!(2025-01-01 00:00 UTC),
		);

		assert_eq!(asset_file_name(&doc), "[2501.00001v1] Fuzzing_ A Survey_.pdf");
	}
}
