use std::io::Write;

use tokio_util::sync::CancellationToken;

use crate::{
    configuration::Settings,
    domain::JobRecord,
    services::{scrape_detail, search_jobs, FetchPage, Fetcher, SearchOutcome},
};

pub enum Command {
    Search { keyword: String },
    Detail { url: String },
}

/// Writes one normalized record per line as JSON.
pub fn write_records<W: Write>(out: &mut W, records: &[JobRecord]) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, &record.clone().normalized())?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn report(outcome: &SearchOutcome) {
    for failure in &outcome.failures {
        log::warn!("{}: {}", failure.url, failure.error);
    }
    if outcome.aborted {
        log::error!("Stopped early after {} failed job page(s)", outcome.failures.len());
    }
    if outcome.cancelled {
        log::warn!("Interrupted, {} record(s) collected", outcome.records.len());
    }
}

pub async fn run_with<F: FetchPage, W: Write>(
    settings: &Settings,
    command: Command,
    fetcher: &F,
    cancel: &CancellationToken,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Search { keyword } => {
            let outcome = search_jobs(&keyword, settings, fetcher, cancel).await?;
            report(&outcome);
            write_records(out, &outcome.records)
        }
        Command::Detail { url } => {
            let record = scrape_detail(&url, settings, fetcher, cancel).await?;
            write_records(out, &[record])
        }
    }
}

pub async fn run(settings: Settings, command: Command, cancel: CancellationToken) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(&settings)?;
    let stdout = std::io::stdout();
    run_with(&settings, command, &fetcher, &cancel, &mut stdout.lock()).await
}
