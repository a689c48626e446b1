use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = autobid_api::Args::parse();

	autobid_api::run(args).await
}
