pub mod commands;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::store::Layout;

#[derive(Parser)]
#[command(name = "chaptercrawl")]
#[command(
    about = "Scrape serialized chapters through a running browser's debug port",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.config/chaptercrawl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug port host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Debug port number
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Directory chapter files are written to and scanned from
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Delay between batches or chain steps, in milliseconds
    #[arg(long, global = true)]
    pub delay: Option<u64>,

    /// How captured chapters are split into files
    #[arg(long, value_enum, global = true)]
    pub layout: Option<Layout>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.devtools.host = host.clone();
        }
        if let Some(port) = self.port {
            config.devtools.port = port;
        }
        if let Some(output) = &self.output {
            config.output.chapters_dir = output.clone();
        }
        if let Some(delay) = self.delay {
            config.crawler.delay_ms = delay;
        }
        match &self.command {
            Commands::Parallel {
                parallel: Some(n), ..
            } => config.crawler.parallel_tabs = n.get(),
            Commands::Chain(ChainArgs { max: Some(n), .. }) => config.crawler.max_posts = n.get(),
            _ => {}
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape several posts at once, one tab each
    Parallel {
        /// Post URLs to scrape
        #[arg(required = true)]
        urls: Vec<String>,

        /// Number of tabs used at once
        #[arg(long)]
        parallel: Option<NonZeroUsize>,
    },
    /// Follow "next chapter" links from a starting post
    Chain(ChainArgs),
    /// Show which chapters are already captured
    Status {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the browser's open tabs
    Tabs,
}

#[derive(Args)]
#[command(group(
    clap::ArgGroup::new("limit")
        .required(true)
        .args(["count", "target", "auto"]),
))]
pub struct ChainArgs {
    /// Post to start from
    #[arg(long)]
    pub url: String,

    /// Number of posts to visit
    #[arg(long)]
    pub count: Option<NonZeroUsize>,

    /// Keep going until this chapter should be captured
    #[arg(long)]
    pub target: Option<u32>,

    /// Follow links until they run out
    #[arg(long)]
    pub auto: bool,

    /// Upper bound on posts for --auto
    #[arg(long)]
    pub max: Option<NonZeroUsize>,
}
