use crate::document::Document;

/// Contiguous slice of the full document sequence, scored together in one model call.
///
/// `index` is 1-based and, together with `total`, exists for logging only.
#[derive(Clone, Debug)]
pub struct Batch {
	pub index: usize,
	pub total: usize,
	pub documents: Vec<Document>,
}
impl Batch {
	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}
}

/// Splits `documents` into `ceil(n / batch_size)` batches, preserving order.
///
/// A `batch_size` of zero is treated as one.
pub fn partition(documents: Vec<Document>, batch_size: usize) -> Vec<Batch> {
	let size = batch_size.max(1);
	let total = documents.len().div_ceil(size);
	let mut remaining = documents.into_iter();
	let mut batches = Vec::with_capacity(total);

	for index in 1..=total {
		let documents: Vec<Document> = remaining.by_ref().take(size).collect();

		batches.push(Batch { index, total, documents });
	}

	batches
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	fn docs(n: usize) -> Vec<Document> {
		(0..n)
			.map(|i| {
				Document::new(
					format!("http://arxiv.org/abs/{i}"),
					format!("Paper {i}"),
					"Abstract",
					datetime!(2025-01-01 00:00 UTC),
				)
			})
			.collect()
	}

	#[test]
	fn batch_count_is_ceiling_and_concatenation_restores_input() {
		for n in [0_usize, 1, 2, 7, 25, 26, 51] {
			for size in [1_usize, 2, 5, 25, 100] {
				let input = docs(n);
				let batches = partition(input.clone(), size);

				assert_eq!(batches.len(), n.div_ceil(size), "n={n} size={size}");
				assert!(batches.iter().all(|batch| batch.len() <= size));
				assert!(batches.iter().all(|batch| batch.total == batches.len()));

				let joined: Vec<Document> =
					batches.into_iter().flat_map(|batch| batch.documents).collect();

				assert_eq!(joined, input, "n={n} size={size}");
			}
		}
	}

	#[test]
	fn only_last_batch_may_be_short() {
		let batches = partition(docs(7), 3);
		let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
		let indexes: Vec<usize> = batches.iter().map(|batch| batch.index).collect();

		assert_eq!(sizes, vec![3, 3, 1]);
		assert_eq!(indexes, vec![1, 2, 3]);
	}

	#[test]
	fn zero_batch_size_is_treated_as_one() {
		assert_eq!(partition(docs(3), 0).len(), 3);
	}
}
