pub mod arxiv;
pub mod download;
pub mod error;
pub mod llm;

pub use arxiv::{ArxivClient, CatalogQuery, parse_feed, subjects_query};
pub use download::AssetDownloader;
pub use error::{Error, Result};
pub use llm::{ChatReply, LlmClient, TokenUsage};

use reqwest::{
	Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

const ERROR_BODY_CHARS: usize = 500;

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: format!("Default header {key} must be a string."),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Turns a non-success response into [`Error::Status`], keeping a bounded body excerpt.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();

	Err(Error::Status {
		status: status.as_u16(),
		body: body.chars().take(ERROR_BODY_CHARS).collect(),
	})
}
