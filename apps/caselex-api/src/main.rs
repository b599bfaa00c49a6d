use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = caselex_api::Args::parse();

	caselex_api::run(args).await
}
