use serde_json::Value;

/// One scoring result as returned by the model.
///
/// `id` is the position of the document inside its own batch, never a global identifier.
/// It is `None` when the model left it out or sent something that is not an integer.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRecord {
	pub id: Option<usize>,
	pub score: f64,
	pub reason: Option<String>,
	pub summary_zh: Option<String>,
}
impl ScoreRecord {
	pub fn from_value(value: &Value) -> Self {
		Self {
			id: value.get("id").and_then(local_id),
			score: value.get("score").and_then(numeric).unwrap_or(0.0),
			reason: value.get("reason").and_then(text),
			summary_zh: value.get("summary_zh").and_then(text),
		}
	}
}

fn local_id(value: &Value) -> Option<usize> {
	match value {
		Value::Number(number) => {
			if let Some(id) = number.as_u64() {
				return usize::try_from(id).ok();
			}

			let float = number.as_f64()?;

			(float >= 0.0 && float.fract() == 0.0 && float <= usize::MAX as f64)
				.then_some(float as usize)
		},
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}
}

fn numeric(value: &Value) -> Option<f64> {
	let number = match value {
		Value::Number(number) => number.as_f64(),
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}?;

	number.is_finite().then_some(number)
}

fn text(value: &Value) -> Option<String> {
	match value {
		Value::String(raw) => Some(raw.clone()),
		Value::Null => None,
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn accepts_integer_like_ids() {
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 3 })).id, Some(3));
		assert_eq!(ScoreRecord::from_value(&json!({ "id": "4" })).id, Some(4));
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 5.0 })).id, Some(5));
	}

	#[test]
	fn rejects_missing_or_non_integer_ids() {
		assert_eq!(ScoreRecord::from_value(&json!({ "score": 1 })).id, None);
		assert_eq!(ScoreRecord::from_value(&json!({ "id": "abc" })).id, None);
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 1.5 })).id, None);
		assert_eq!(ScoreRecord::from_value(&json!({ "id": -1 })).id, None);
		assert_eq!(ScoreRecord::from_value(&json!("not an object")).id, None);
	}

	#[test]
	fn coerces_scores_and_defaults_non_numeric_to_zero() {
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 0, "score": "4.5" })).score, 4.5);
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 0, "score": "high" })).score, 0.0);
		assert_eq!(ScoreRecord::from_value(&json!({ "id": 0 })).score, 0.0);
	}

	#[test]
	fn keeps_reason_and_localized_summary() {
		let record = ScoreRecord::from_value(&json!({
			"id": 2,
			"score": 3,
			"reason": "Relevant to fuzzing.",
			"summary_zh": "模糊测试",
		}));

		assert_eq!(record.reason.as_deref(), Some("Relevant to fuzzing."));
		assert_eq!(record.summary_zh.as_deref(), Some("模糊测试"));
		assert_eq!(record.score, 3.0);
	}
}
