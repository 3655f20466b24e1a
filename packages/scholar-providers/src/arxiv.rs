//! arXiv Atom API search.

use std::time::Duration;

use quick_xml::{
	Reader,
	events::{BytesStart, Event},
};
use reqwest::Client;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use scholar_domain::Document;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("scholar/", env!("CARGO_PKG_VERSION"));
const API_ERROR_MARKER: &str = "/api/errors";

/// One catalog search: documents matching `query`, newest first, published at or after
/// `since`, at most `max_results` of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
	pub query: String,
	pub since: OffsetDateTime,
	pub max_results: usize,
}

/// Builds `cat:a OR cat:b` from subject codes.
pub fn subjects_query(subjects: &[String]) -> String {
	subjects.iter().map(|subject| format!("cat:{subject}")).collect::<Vec<_>>().join(" OR ")
}

#[derive(Clone, Debug)]
pub struct ArxivClient {
	client: Client,
	cfg: scholar_config::CatalogProviderConfig,
}
impl ArxivClient {
	pub fn new(cfg: &scholar_config::CatalogProviderConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.user_agent(USER_AGENT)
			.build()?;

		Ok(Self { client, cfg: cfg.clone() })
	}

	/// Pages through results sorted by submission date, stopping at the first entry older
	/// than `query.since`. The configured `max_results` caps every query.
	pub async fn search(&self, query: &CatalogQuery) -> Result<Vec<Document>> {
		let limit = query.max_results.min(self.cfg.max_results as usize);
		let page_size = self.cfg.page_size.max(1) as usize;
		let mut documents = Vec::new();
		let mut start = 0;

		tracing::info!(query = %query.query, since = %query.since, limit, "Searching arXiv.");

		while documents.len() < limit {
			if start > 0 && self.cfg.page_delay_ms > 0 {
				tokio::time::sleep(Duration::from_millis(self.cfg.page_delay_ms)).await;
			}

			let requested = page_size.min(limit - documents.len());
			let page = self.fetch_page(&query.query, start, requested).await?;
			let fetched = page.len();
			let mut reached_cutoff = false;

			for document in page {
				if document.published_at < query.since {
					tracing::info!(
						published_at = %document.published_at,
						"Reached the publication cutoff."
					);

					reached_cutoff = true;

					break;
				}

				documents.push(document);

				if documents.len() >= limit {
					break;
				}
			}

			if reached_cutoff || fetched < requested {
				break;
			}

			start += fetched;
		}

		tracing::info!(count = documents.len(), "Fetched documents from arXiv.");

		Ok(documents)
	}

	async fn fetch_page(&self, query: &str, start: usize, max_results: usize) -> Result<Vec<Document>> {
		let params = [
			("search_query", query.to_string()),
			("start", start.to_string()),
			("max_results", max_results.to_string()),
			("sortBy", "submittedDate".to_string()),
			("sortOrder", "descending".to_string()),
		];
		let res = self.client.get(&self.cfg.api_base).query(&params).send().await?;
		let body = crate::check_status(res).await?.text().await?;

		tracing::debug!(start, max_results, bytes = body.len(), "Fetched arXiv page.");

		parse_feed(&body)
	}
}

#[derive(Default)]
struct EntryBuilder {
	id: Option<String>,
	title: Option<String>,
	summary: Option<String>,
	published: Option<String>,
	journal_ref: Option<String>,
	pdf_url: Option<String>,
	authors: Vec<String>,
	categories: Vec<String>,
}
impl EntryBuilder {
	fn build(self) -> Result<Option<Document>> {
		let Some(id) = self.id else {
			tracing::warn!("Skipping arXiv entry without an id.");

			return Ok(None);
		};

		if id.contains(API_ERROR_MARKER) {
			return Err(Error::InvalidResponse {
				message: format!(
					"arXiv rejected the query: {}",
					self.summary.as_deref().unwrap_or("no details")
				),
			});
		}

		let Some(published) = self.published else {
			tracing::warn!(id = %id, "Skipping arXiv entry without a publication date.");

			return Ok(None);
		};
		let published_at = OffsetDateTime::parse(&published, &Rfc3339).map_err(|err| {
			Error::InvalidResponse {
				message: format!("Entry {id} has an invalid publication date {published:?}: {err}"),
			}
		})?;
		let mut document = Document::new(
			id,
			self.title.unwrap_or_default(),
			self.summary.unwrap_or_default(),
			published_at,
		);

		document.authors = self.authors;
		document.categories = self.categories;

		if let Some(pdf_url) = self.pdf_url {
			document.pdf_url = pdf_url;
		}
		if let Some(journal_ref) = self.journal_ref.filter(|value| !value.is_empty()) {
			document.journal_ref = journal_ref;
		}

		Ok(Some(document))
	}

	fn absorb_attributes(&mut self, element: &BytesStart<'_>) -> Result<()> {
		match element.local_name().as_ref() {
			b"link" => {
				let title = attribute(element, b"title")?;
				let href = attribute(element, b"href")?;

				if title.as_deref() == Some("pdf")
					&& let Some(href) = href
				{
					self.pdf_url = Some(href);
				}
			},
			b"category" =>
				if let Some(term) = attribute(element, b"term")? {
					self.categories.push(term);
				},
			_ => {},
		}

		Ok(())
	}
}

/// Parses one Atom response page into documents, in feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<Document>> {
	let mut reader = Reader::from_str(xml);
	let mut buf = Vec::new();
	let mut documents = Vec::new();
	let mut entry: Option<EntryBuilder> = None;
	let mut in_author = false;
	let mut text = String::new();

	loop {
		match reader.read_event_into(&mut buf).map_err(xml_error)? {
			Event::Start(ref e) => {
				text.clear();

				match e.local_name().as_ref() {
					b"entry" => entry = Some(EntryBuilder::default()),
					b"author" => in_author = true,
					_ =>
						if let Some(entry) = entry.as_mut() {
							entry.absorb_attributes(e)?;
						},
				}
			},
			Event::Empty(ref e) =>
				if let Some(entry) = entry.as_mut() {
					entry.absorb_attributes(e)?;
				},
			Event::Text(e) => text.push_str(&e.unescape().map_err(xml_error)?),
			Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
			Event::End(ref e) => {
				let name = e.local_name();
				let value = collapse_whitespace(&text);

				text.clear();

				if name.as_ref() == b"entry" {
					if let Some(builder) = entry.take()
						&& let Some(document) = builder.build()?
					{
						documents.push(document);
					}
				} else if let Some(entry) = entry.as_mut() {
					match name.as_ref() {
						b"author" => in_author = false,
						b"name" if in_author => entry.authors.push(value),
						b"id" => entry.id = Some(value),
						b"title" => entry.title = Some(value),
						b"summary" => entry.summary = Some(value),
						b"published" => entry.published = Some(value),
						b"journal_ref" => entry.journal_ref = Some(value),
						_ => {},
					}
				}
			},
			Event::Eof => break,
			_ => {},
		}

		buf.clear();
	}

	Ok(documents)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
	for attr in element.attributes() {
		let attr = attr.map_err(|err| Error::InvalidResponse {
			message: format!("Malformed attribute in arXiv feed: {err}"),
		})?;

		if attr.key.local_name().as_ref() == key {
			return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
		}
	}

	Ok(None)
}

fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn xml_error(err: quick_xml::Error) -> Error {
	Error::InvalidResponse { message: format!("Failed to parse arXiv feed: {err}") }
}
