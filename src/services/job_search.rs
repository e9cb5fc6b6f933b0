use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::{
    configuration::Settings,
    domain::JobRecord,
    error::ScrapeError,
    services::{fetcher::FetchPage, field_resolver::FieldResolver, listing_paginator::ListingPaginator},
};

/// Failed detail pages tolerated before a run gives up.
pub const MAX_FAILURE_BUDGET: usize = 10;

#[derive(Debug)]
pub struct DetailFailure {
    pub url: String,
    pub error: ScrapeError,
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub listing_url: String,
    pub pages_fetched: u32,
    pub records: Vec<JobRecord>,
    pub failures: Vec<DetailFailure>,
    /// Too many detail pages failed and the rest were skipped.
    pub aborted: bool,
    pub cancelled: bool,
}

struct ErrorBudget {
    limit: usize,
    spent: usize,
}

impl ErrorBudget {
    fn new(planned: usize) -> Self {
        ErrorBudget {
            limit: (planned / 2).min(MAX_FAILURE_BUDGET),
            spent: 0,
        }
    }

    /// Returns `true` once the budget is overdrawn.
    fn spend(&mut self) -> bool {
        self.spent += 1;
        self.spent > self.limit
    }
}

/// Collects job links for `keyword` and resolves each detail page.
///
/// Listing-phase errors end the search. Detail-phase errors are recorded per
/// URL and the remaining pages are still scraped, unless the error budget
/// runs out or the token is cancelled, in which case the records gathered so
/// far are returned.
pub async fn search_jobs<F: FetchPage>(
    keyword: &str,
    settings: &Settings,
    fetcher: &F,
    cancel: &CancellationToken,
) -> Result<SearchOutcome, ScrapeError> {
    let paginator = ListingPaginator::new(settings, fetcher)?;
    let collected = paginator.collect_links(keyword, cancel).await?;

    let resolver = FieldResolver::new(settings);
    let planned = collected.links.len();
    let mut budget = ErrorBudget::new(planned);
    let mut outcome = SearchOutcome {
        listing_url: collected.listing_url,
        pages_fetched: collected.pages_fetched,
        records: Vec::with_capacity(planned),
        failures: vec![],
        aborted: false,
        cancelled: false,
    };

    let resolver = &resolver;
    let mut details = futures::stream::iter(collected.links.iter().enumerate())
        .map(|(i, url)| async move {
            log::info!("Scraping job {}/{}: {}", i + 1, planned, url);
            (url, resolver.scrape(url, fetcher, cancel).await)
        })
        .buffered(settings.search.concurrency());

    let mut processed = 0;
    while let Some((url, result)) = details.next().await {
        processed += 1;
        match result {
            Ok(record) => outcome.records.push(record),
            Err(ScrapeError::Cancelled) => {
                log::warn!("Cancelled after {} of {} job(s)", processed - 1, planned);
                outcome.cancelled = true;
                break;
            }
            Err(error) => {
                log::warn!("Failed to scrape {}: {}", url, error);
                outcome.failures.push(DetailFailure {
                    url: url.clone(),
                    error,
                });
                if budget.spend() && processed < planned {
                    log::error!(
                        "{} of {} job pages failed, giving up on the remaining {}",
                        outcome.failures.len(),
                        planned,
                        planned - processed
                    );
                    outcome.aborted = true;
                    break;
                }
            }
        }
    }

    log::info!(
        "Scraped {} job(s), {} failed, from {}",
        outcome.records.len(),
        outcome.failures.len(),
        outcome.listing_url
    );
    Ok(outcome)
}

/// Resolves a single detail page given directly by URL.
pub async fn scrape_detail<F: FetchPage>(
    url: &str,
    settings: &Settings,
    fetcher: &F,
    cancel: &CancellationToken,
) -> Result<JobRecord, ScrapeError> {
    FieldResolver::new(settings).scrape(url, fetcher, cancel).await
}
