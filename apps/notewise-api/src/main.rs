use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = notewise_api::Args::parse();

	notewise_api::run(args).await
}
