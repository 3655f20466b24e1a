//! Bounded exponential backoff around remote calls.

use std::{
	fmt::Display,
	future::Future,
	time::{Duration, Instant},
};

/// Classifies a failure as transient (worth another attempt) or fatal.
pub trait Retryable {
	fn is_retryable(&self) -> bool;
}
impl Retryable for scholar_providers::Error {
	fn is_retryable(&self) -> bool {
		scholar_providers::Error::is_retryable(self)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
}
impl RetryPolicy {
	pub fn from_config(cfg: &scholar_config::Retry) -> Self {
		Self {
			max_attempts: cfg.max_attempts,
			base_delay: Duration::from_millis(cfg.base_delay_ms),
			max_delay: Duration::from_millis(cfg.max_delay_ms),
		}
	}

	/// Delay before the attempt that follows attempt number `attempt` (1-based):
	/// `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
	pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
		let exp = attempt.max(1).saturating_sub(1).min(16);

		self.base_delay.saturating_mul(1 << exp).min(self.max_delay)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_secs(2),
			max_delay: Duration::from_secs(10),
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct RetryableCaller {
	policy: RetryPolicy,
}
impl RetryableCaller {
	pub fn new(policy: RetryPolicy) -> Self {
		Self { policy }
	}

	/// Runs `op` until it succeeds, fails fatally, or the attempt ceiling is reached.
	///
	/// The last error is returned unchanged.
	pub async fn call<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
	where
		E: Retryable + Display,
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		let started = Instant::now();
		let max_attempts = self.policy.max_attempts.max(1);
		let mut attempt = 1;

		loop {
			match op().await {
				Ok(value) => {
					tracing::debug!(
						label,
						attempts = attempt,
						elapsed_ms = started.elapsed().as_millis() as u64,
						"Remote call succeeded."
					);

					return Ok(value);
				},
				Err(err) => {
					let retryable = err.is_retryable();

					if !retryable || attempt >= max_attempts {
						tracing::warn!(
							label,
							attempts = attempt,
							retryable,
							elapsed_ms = started.elapsed().as_millis() as u64,
							error = %err,
							"Remote call failed."
						);

						return Err(err);
					}

					let delay = self.policy.backoff_for_attempt(attempt);

					tracing::warn!(
						label,
						attempt,
						delay_ms = delay.as_millis() as u64,
						error = %err,
						"Remote call failed. Retrying."
					);
					tokio::time::sleep(delay).await;

					attempt += 1;
				},
			}
		}
	}
}
