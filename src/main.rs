use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use tokio_util::sync::CancellationToken;
use toraba::{
    configuration::{get_configuration, Settings},
    startup::{run, Command},
};

#[derive(Parser, Debug)]
#[command(name = "toraba")]
#[command(about = "Collects job postings from toranet.jp as JSON lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Maximum number of job pages to scrape")]
    max_jobs: Option<usize>,

    #[arg(long, global = true, help = "Attempts per request before giving up")]
    max_retries: Option<u32>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    timeout: Option<u64>,

    #[arg(long, global = true, help = "Listing pages to walk (at most 10)")]
    max_pages: Option<u32>,

    #[arg(long, global = true, help = "Concurrent detail fetches (1-4)")]
    concurrency: Option<usize>,

    #[arg(long, global = true, help = "Log which strategy produced each field")]
    debug: bool,

    #[arg(long, global = true, help = "Log the first part of every fetched page")]
    dump_html: bool,

    #[arg(long, global = true, help = "Treat the listing page as the detail page")]
    direct_listing: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the listing for a keyword and scrape every job found.
    Search { keyword: String },
    /// Scrape a single job detail page.
    Detail { url: String },
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(max_jobs) = self.max_jobs {
            settings.search.max_jobs = max_jobs;
        }
        if let Some(max_retries) = self.max_retries {
            settings.http.max_retries = max_retries;
        }
        if let Some(timeout) = self.timeout {
            settings.http.timeout_secs = timeout;
        }
        if let Some(max_pages) = self.max_pages {
            settings.search.max_pages = max_pages;
        }
        if let Some(concurrency) = self.concurrency {
            settings.search.concurrency = concurrency;
        }
        settings.debug.enabled |= self.debug;
        settings.debug.dump_html |= self.dump_html;
        settings.search.direct_listing |= self.direct_listing;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = get_configuration().context("Failed to read configuration.")?;
    cli.apply(&mut settings);

    let default_filter = match (settings.debug.dump_html, settings.debug.enabled) {
        (true, _) => "info,toraba=trace",
        (false, true) => "debug",
        (false, false) => "info",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing up");
            ctrl_c.cancel();
        }
    });

    let command = match cli.command {
        Commands::Search { keyword } => Command::Search { keyword },
        Commands::Detail { url } => Command::Detail { url },
    };

    run(settings, command, cancel).await
}
