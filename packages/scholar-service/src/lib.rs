pub mod batch;
pub mod daily;
pub mod error;
pub mod prompt;
pub mod report;
pub mod retry;
pub mod scheduler;

pub use batch::{BatchOutcome, BatchScorer};
pub use daily::{DailyFlow, RunOptions, RunSummary};
pub use error::{Error, Result};
pub use retry::{RetryPolicy, Retryable, RetryableCaller};
pub use scheduler::ScoringScheduler;

use std::{
	future::Future,
	path::{Path, PathBuf},
	pin::Pin,
	sync::Arc,
};

use scholar_config::Config;
use scholar_domain::Document;
use scholar_providers::{ArxivClient, AssetDownloader, CatalogQuery, LlmClient};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chat model that returns raw assistant text for one system and one user message.
pub trait ModelProvider
where
	Self: Send + Sync,
{
	fn invoke<'a>(
		&'a self,
		system_prompt: &'a str,
		user_content: &'a str,
		json_mode: bool,
	) -> BoxFuture<'a, scholar_providers::Result<String>>;
}

pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a CatalogQuery,
	) -> BoxFuture<'a, scholar_providers::Result<Vec<Document>>>;
}

pub trait AssetProvider
where
	Self: Send + Sync,
{
	fn download<'a>(
		&'a self,
		url: &'a str,
		dest: &'a Path,
	) -> BoxFuture<'a, scholar_providers::Result<PathBuf>>;
}

#[derive(Clone)]
pub struct Providers {
	pub model: Arc<dyn ModelProvider>,
	pub catalog: Arc<dyn CatalogProvider>,
	pub assets: Arc<dyn AssetProvider>,
}
impl Providers {
	pub fn new(
		model: Arc<dyn ModelProvider>,
		catalog: Arc<dyn CatalogProvider>,
		assets: Arc<dyn AssetProvider>,
	) -> Self {
		Self { model, catalog, assets }
	}

	/// HTTP-backed providers for the configured endpoints.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let model = LlmClient::new(&cfg.providers.llm)?;
		let catalog = ArxivClient::new(&cfg.providers.catalog)?;
		let assets = AssetDownloader::new(&cfg.providers.download)?;

		Ok(Self::new(Arc::new(model), Arc::new(catalog), Arc::new(assets)))
	}
}

impl ModelProvider for LlmClient {
	fn invoke<'a>(
		&'a self,
		system_prompt: &'a str,
		user_content: &'a str,
		json_mode: bool,
	) -> BoxFuture<'a, scholar_providers::Result<String>> {
		Box::pin(async move {
			self.chat(system_prompt, user_content, json_mode).await.map(|reply| reply.content)
		})
	}
}

impl CatalogProvider for ArxivClient {
	fn search<'a>(
		&'a self,
		query: &'a CatalogQuery,
	) -> BoxFuture<'a, scholar_providers::Result<Vec<Document>>> {
		Box::pin(ArxivClient::search(self, query))
	}
}

impl AssetProvider for AssetDownloader {
	fn download<'a>(
		&'a self,
		url: &'a str,
		dest: &'a Path,
	) -> BoxFuture<'a, scholar_providers::Result<PathBuf>> {
		Box::pin(AssetDownloader::download(self, url, dest))
	}
}
