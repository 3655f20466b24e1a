use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scholar_service::{DailyFlow, Providers, RunOptions};

#[derive(Debug, Parser)]
#[command(
	version = scholar_cli::VERSION,
	rename_all = "kebab",
	styles = scholar_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", global = true, default_value = "scholar.toml")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch, score, download and report today's documents.
	Daily(DailyArgs),
}

#[derive(Debug, clap::Args)]
pub struct DailyArgs {
	/// Look back this many days instead of `daily.days_back`.
	#[arg(long, value_name = "N")]
	pub days: Option<u32>,
	/// Score at most this many documents.
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
	/// Write the digest even when nothing reaches the report threshold.
	#[arg(long)]
	pub force_report: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scholar_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	match args.command {
		Command::Daily(daily) => {
			let providers = Providers::from_config(&config)?;
			let flow = DailyFlow::new(config, providers);
			let options = RunOptions {
				days_back: daily.days,
				limit: daily.limit,
				force_report: daily.force_report,
			};
			let summary = flow.run(options).await?;

			tracing::info!(
				fetched = summary.fetched,
				scored = summary.scored,
				downloaded = summary.downloaded,
				metadata = ?summary.metadata_path,
				digest = ?summary.digest_path,
				"Done."
			);
		},
	}

	Ok(())
}
