use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chaptercrawl::app::AppContext;
use chaptercrawl::cli::{commands, Cli, Commands};
use chaptercrawl::config::Config;
use chaptercrawl::store::Layout;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let ctx = AppContext::new(config)?;

    let aborted = match &cli.command {
        Commands::Parallel { urls, .. } => {
            let layout = cli.layout.unwrap_or(Layout::Range);
            commands::run_parallel(&ctx, urls, layout).await?.is_aborted()
        }
        Commands::Chain(args) => {
            let layout = cli.layout.unwrap_or(Layout::PerChapter);
            commands::run_chain(&ctx, args, layout)
                .await?
                .is_some_and(|report| report.is_aborted())
        }
        Commands::Status { json } => {
            commands::print_status(&ctx, *json)?;
            false
        }
        Commands::Tabs => {
            commands::list_tabs(&ctx).await?;
            false
        }
    };

    Ok(if aborted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
