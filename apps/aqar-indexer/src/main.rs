use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = aqar_indexer::Args::parse();

	aqar_indexer::run(args).await
}
