use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Failed to write {path:?}.")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Remote returned status {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// Whether another attempt of the same request could succeed.
	///
	/// Transport failures, timeouts, throttling and server errors are transient. Client
	/// errors such as bad credentials, and anything wrong with the payload itself, are not.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Reqwest(err) =>
				err.is_timeout() || err.is_connect() || err.is_request() || err.is_body(),
			Self::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn status(status: u16) -> Error {
		Error::Status { status, body: String::new() }
	}

	#[test]
	fn classifies_status_codes() {
		assert!(status(503).is_retryable());
		assert!(status(500).is_retryable());
		assert!(status(429).is_retryable());
		assert!(status(408).is_retryable());
		assert!(!status(401).is_retryable());
		assert!(!status(400).is_retryable());
		assert!(!status(404).is_retryable());
	}

	#[test]
	fn payload_errors_are_fatal() {
		assert!(!Error::InvalidResponse { message: "empty".to_string() }.is_retryable());
		assert!(!Error::InvalidConfig { message: "bad".to_string() }.is_retryable());
	}
}
