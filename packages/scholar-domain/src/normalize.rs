//! Turns raw model output into a list of [`ScoreRecord`]s.
//!
//! Models asked for JSON do not reliably return it: the payload may sit inside a markdown
//! fence, be wrapped in an object, be a single record, or carry prose around it. The
//! functions here are pure and never touch the network.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::record::ScoreRecord;

const SNIPPET_CHARS: usize = 100;
const LIST_KEYS: [&str; 4] = ["papers", "results", "items", "list"];

static LEADING_FENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\A```(?:json)?\s*").expect("leading fence pattern is valid"));
static TRAILING_FENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\s*```\z").expect("trailing fence pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
	#[error("Model response is not valid JSON. Snippet: {snippet:?}")]
	ParseFailure { snippet: String },
}

pub fn normalize(raw: &str) -> Result<Vec<ScoreRecord>, NormalizeError> {
	let value = extract_json(raw)?;

	Ok(coerce_list(value).iter().map(ScoreRecord::from_value).collect())
}

/// Parses the JSON payload of `raw`, falling back to the outermost bracketed region.
pub fn extract_json(raw: &str) -> Result<Value, NormalizeError> {
	let cleaned = strip_fences(raw);

	if cleaned.is_empty() {
		return Err(parse_failure(cleaned));
	}
	if let Ok(value) = serde_json::from_str(cleaned) {
		return Ok(value);
	}

	bracketed_region(cleaned)
		.and_then(|region| serde_json::from_str(region).ok())
		.ok_or_else(|| parse_failure(cleaned))
}

/// Coerces a parsed payload into a list of candidate records.
pub fn coerce_list(value: Value) -> Vec<Value> {
	match value {
		Value::Array(items) => items,
		Value::Object(mut map) => {
			for key in LIST_KEYS {
				if matches!(map.get(key), Some(Value::Array(_)))
					&& let Some(Value::Array(items)) = map.remove(key)
				{
					return items;
				}
			}

			vec![Value::Object(map)]
		},
		_ => Vec::new(),
	}
}

fn strip_fences(raw: &str) -> &str {
	let trimmed = raw.trim();
	let start = LEADING_FENCE.find(trimmed).map(|m| m.end()).unwrap_or(0);
	let rest = &trimmed[start..];
	let end = TRAILING_FENCE.find(rest).map(|m| m.start()).unwrap_or(rest.len());

	rest[..end].trim()
}

fn bracketed_region(text: &str) -> Option<&str> {
	let start = text.find(['[', '{'])?;
	let end = text.rfind([']', '}'])?;

	(end > start).then(|| &text[start..=end])
}

fn parse_failure(text: &str) -> NormalizeError {
	NormalizeError::ParseFailure { snippet: text.chars().take(SNIPPET_CHARS).collect() }
}
