mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CatalogProviderConfig, Config, Daily, DownloadProviderConfig, LlmProviderConfig, Providers,
	Report, Retry, Scoring, Service,
};

use std::{env, fs, path::Path};

pub const LLM_API_KEY_ENV: &str = "SCHOLAR_LLM_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, env::var(LLM_API_KEY_ENV).ok());

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.llm.api_key.trim().is_empty() {
		return Err(Error::MissingCredential {
			key: "providers.llm.api_key",
			env: LLM_API_KEY_ENV,
		});
	}

	for (label, value) in [
		("providers.llm.api_base", &cfg.providers.llm.api_base),
		("providers.llm.model", &cfg.providers.llm.model),
		("providers.catalog.api_base", &cfg.providers.catalog.api_base),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !cfg.providers.llm.temperature.is_finite() || cfg.providers.llm.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number of zero or greater."
				.to_string(),
		});
	}
	if cfg.providers.llm.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.catalog.page_size == 0 {
		return Err(Error::Validation {
			message: "providers.catalog.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.catalog.max_results == 0 {
		return Err(Error::Validation {
			message: "providers.catalog.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.batch_size == 0 {
		return Err(Error::Validation {
			message: "scoring.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.concurrency == 0 {
		return Err(Error::Validation {
			message: "scoring.concurrency must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.retry.max_attempts == 0 {
		return Err(Error::Validation {
			message: "scoring.retry.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.scoring.retry.base_delay_ms > cfg.scoring.retry.max_delay_ms {
		return Err(Error::Validation {
			message: "scoring.retry.base_delay_ms must not exceed scoring.retry.max_delay_ms."
				.to_string(),
		});
	}

	for (label, value) in [
		("scoring.notable_threshold", cfg.scoring.notable_threshold),
		("daily.download_threshold", cfg.daily.download_threshold),
		("daily.report_threshold", cfg.daily.report_threshold),
		("report.send_threshold", cfg.report.send_threshold),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
	}

	if cfg.daily.subjects.is_empty() {
		return Err(Error::Validation {
			message: "daily.subjects must contain at least one category.".to_string(),
		});
	}
	if cfg.daily.subjects.iter().any(|subject| subject.trim().is_empty()) {
		return Err(Error::Validation {
			message: "daily.subjects entries must be non-empty.".to_string(),
		});
	}
	if cfg.daily.days_back == 0 {
		return Err(Error::Validation {
			message: "daily.days_back must be greater than zero.".to_string(),
		});
	}
	if cfg.report.top_k == 0 {
		return Err(Error::Validation {
			message: "report.top_k must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config, env_api_key: Option<String>) {
	let api_key = cfg.providers.llm.api_key.trim().to_string();

	cfg.providers.llm.api_key = if api_key.is_empty() {
		env_api_key.map(|key| key.trim().to_string()).unwrap_or_default()
	} else {
		api_key
	};

	for subject in &mut cfg.daily.subjects {
		*subject = subject.trim().to_string();
	}

	cfg.daily.negative_patterns.retain(|pattern| !pattern.trim().is_empty());
	cfg.daily.white_list_keywords.retain(|keyword| !keyword.trim().is_empty());

	while cfg.providers.llm.api_base.ends_with('/') {
		cfg.providers.llm.api_base.pop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = include_str!("../tests/fixtures/sample_config.template.toml");

	fn sample() -> Config {
		toml::from_str(SAMPLE).expect("Failed to parse sample config.")
	}

	#[test]
	fn blank_api_key_falls_back_to_environment_value() {
		let mut cfg = sample();

		cfg.providers.llm.api_key = "  ".to_string();

		normalize(&mut cfg, Some(" from-env ".to_string()));

		assert_eq!(cfg.providers.llm.api_key, "from-env");
	}

	#[test]
	fn explicit_api_key_wins_over_environment() {
		let mut cfg = sample();

		normalize(&mut cfg, Some("from-env".to_string()));

		assert_eq!(cfg.providers.llm.api_key, "test-key");
	}

	#[test]
	fn trailing_slashes_are_trimmed_from_api_base() {
		let mut cfg = sample();

		cfg.providers.llm.api_base = "https://api.example.com//".to_string();

		normalize(&mut cfg, None);

		assert_eq!(cfg.providers.llm.api_base, "https://api.example.com");
	}
}
