mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use petrocalc::config::Config;
use petrocalc::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = Config::load_with(cli.config)?;
    observability::init_tracing(&config.logging);

    match cli.command {
        Commands::Run(args) => app::run(config, args).await?,
        Commands::Download(args) => app::download(config, args).await?,
        Commands::Config => app::show_config(&config)?,
    }

    Ok(())
}
