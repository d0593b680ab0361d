pub mod indexer;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aqar_engine::http::HttpSearchEngine;
use aqar_service::AqarService;
use aqar_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = aqar_cli::VERSION,
	rename_all = "kebab",
	styles = aqar_cli::styles(),
)]
pub struct Args {
	/// Path to the TOML configuration file.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single synchronization pass and exit.
	#[arg(long)]
	pub once: bool,
	/// Restart from the origin cursor and re-index every listing.
	#[arg(long)]
	pub force: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = aqar_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let engine = HttpSearchEngine::new(&config.storage.engine)?;
	let service = AqarService::new(config, db, Arc::new(engine));

	indexer::run_indexer(service, args.once, args.force).await
}
