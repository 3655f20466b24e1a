use scholar_config::Daily;

const OUTPUT_FORMAT: &str = "\
## Output format
Return a JSON array with one object per paper, using the ID given in the input:
[{\"id\": 0, \"score\": 4.5, \"reason\": \"One sentence on why.\", \"summary_zh\": \"一句话中文摘要\"}]
Score from 0 (irrelevant) to 5 (must read). Do not skip any paper.";

/// System prompt for scoring, built from the reader profile and keyword lists.
pub fn build_system_prompt(daily: &Daily) -> String {
	let mut prompt = String::from(
		"You screen newly published research papers for a single reader and rate how \
		 relevant each one is to them.\n\n",
	);

	prompt.push_str(&format!("## Reader profile\n{}\n\n", daily.user_profile.trim()));

	push_list(
		&mut prompt,
		"## Always rate highly when the paper is about",
		&daily.white_list_keywords,
	);
	push_list(&mut prompt, "## Rate low when the paper matches", &daily.negative_patterns);

	prompt.push_str(OUTPUT_FORMAT);

	prompt
}

fn push_list(prompt: &mut String, heading: &str, items: &[String]) {
	if items.is_empty() {
		return;
	}

	prompt.push_str(heading);
	prompt.push('\n');

	for item in items {
		prompt.push_str(&format!("- {item}\n"));
	}

	prompt.push('\n');
}

#[cfg(test)]
mod tests {
	use super::*;

	fn daily(white_list: &[&str], negative: &[&str]) -> Daily {
		Daily {
			subjects: vec!["cs.CR".to_string()],
			user_profile: "  Fuzzing and binary analysis.  ".to_string(),
			negative_patterns: negative.iter().map(|s| s.to_string()).collect(),
			white_list_keywords: white_list.iter().map(|s| s.to_string()).collect(),
			days_back: 1,
			download_threshold: 4.0,
			report_threshold: 3.5,
		}
	}

	#[test]
	fn includes_profile_and_lists() {
		let prompt = build_system_prompt(&daily(&["fuzzing"], &["pure theory"]));

		assert!(prompt.contains("## Reader profile\nFuzzing and binary analysis.\n"));
		assert!(prompt.contains("- fuzzing\n"));
		assert!(prompt.contains("- pure theory\n"));
		assert!(prompt.contains("JSON"));
	}

	#[test]
	fn omits_empty_sections() {
		let prompt = build_system_prompt(&daily(&[], &[]));

		assert!(!prompt.contains("Always rate highly"));
		assert!(!prompt.contains("Rate low"));
	}
}
