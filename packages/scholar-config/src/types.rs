use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub scoring: Scoring,
	pub daily: Daily,
	pub report: Report,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
	/// Root for checkpoints, downloaded assets and reports.
	#[serde(default = "default_data_dir")]
	pub data_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	pub catalog: CatalogProviderConfig,
	#[serde(default)]
	pub download: DownloadProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// Optional in the file. Falls back to `SCHOLAR_LLM_API_KEY` when blank.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogProviderConfig {
	#[serde(default = "default_catalog_api_base")]
	pub api_base: String,
	pub page_size: u32,
	/// Upper bound on a single search, applied when the caller passes no limit.
	pub max_results: u32,
	pub page_delay_ms: u64,
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DownloadProviderConfig {
	pub timeout_ms: u64,
	pub user_agent: String,
	pub pacing_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scoring {
	pub batch_size: u32,
	pub concurrency: u32,
	pub notable_threshold: f64,
	#[serde(default)]
	pub pacing_ms: u64,
	#[serde(default = "default_parse_retries")]
	pub parse_retries: u32,
	pub retry: Retry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Retry {
	pub max_attempts: u32,
	pub base_delay_ms: u64,
	pub max_delay_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Daily {
	pub subjects: Vec<String>,
	pub user_profile: String,
	#[serde(default)]
	pub negative_patterns: Vec<String>,
	#[serde(default)]
	pub white_list_keywords: Vec<String>,
	#[serde(default = "default_days_back")]
	pub days_back: u32,
	pub download_threshold: f64,
	pub report_threshold: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Report {
	pub top_k: u32,
	pub send_threshold: f64,
}

impl Default for DownloadProviderConfig {
	fn default() -> Self {
		Self {
			timeout_ms: 30_000,
			user_agent: default_user_agent(),
			pacing_ms: 1_000,
		}
	}
}

fn default_data_dir() -> PathBuf {
	PathBuf::from("data")
}

fn default_catalog_api_base() -> String {
	"http://export.arxiv.org/api/query".to_string()
}

fn default_user_agent() -> String {
	concat!("scholar/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_parse_retries() -> u32 {
	1
}

fn default_days_back() -> u32 {
	1
}
