use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use tokio_util::sync::CancellationToken;

use crate::{
    configuration::Settings,
    domain::UrlClassifier,
    error::ScrapeError,
    services::retry_policy::{pause, RetryPolicy},
};

const DUMP_LIMIT: usize = 10_000;

/// Anything that can turn a URL into a page body.
#[async_trait]
pub trait FetchPage: Send + Sync {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, ScrapeError>;
}

pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
    classifier: UrlClassifier,
    dump_html: bool,
}

fn header(value: &str) -> Result<HeaderValue, ScrapeError> {
    HeaderValue::from_str(value).map_err(|e| ScrapeError::ClientSetup(e.to_string()))
}

/// The same browser-like header set goes out with every request.
pub fn browser_headers(settings: &Settings) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header(&settings.http.user_agent)?);
    headers.insert(
        ACCEPT,
        header("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")?,
    );
    headers.insert(ACCEPT_LANGUAGE, header("ja,en-US;q=0.9,en;q=0.8")?);
    headers.insert(
        REFERER,
        header(&format!("{}/", settings.site.base_url.trim_end_matches('/')))?,
    );
    headers.insert(UPGRADE_INSECURE_REQUESTS, header("1")?);
    headers.insert(CACHE_CONTROL, header("max-age=0")?);
    Ok(headers)
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers(settings)?)
            .timeout(settings.http.timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::ClientSetup(e.to_string()))?;

        Ok(Fetcher {
            client,
            policy: RetryPolicy::from_settings(&settings.http, &settings.politeness),
            classifier: UrlClassifier::new(&settings.site.target_domain),
            dump_html: settings.debug.dump_html,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        log::debug!("Status {} for {}", status.as_u16(), url);
        if !status.is_success() {
            return Err(ScrapeError::FetchHttpError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> ScrapeError {
    match error.is_timeout() {
        true => ScrapeError::FetchTimeout {
            url: url.to_string(),
        },
        false => ScrapeError::FetchTransportError {
            url: url.to_string(),
            message: error.to_string(),
        },
    }
}

#[async_trait]
impl FetchPage for Fetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, ScrapeError> {
        if !self.classifier.is_in_scope(url) {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        let max_attempts = self.policy.max_attempts();
        let mut attempts = 0;

        loop {
            pause(self.policy.delay_before(attempts), cancel).await?;
            attempts += 1;
            log::debug!("GET {} (attempt {}/{})", url, attempts, max_attempts);

            let result = tokio::select! {
                result = self.fetch_once(url) => result,
                _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
            };

            match result {
                Ok(body) => {
                    if self.dump_html {
                        let head: String = body.chars().take(DUMP_LIMIT).collect();
                        log::trace!("Body of {}:\n{}", url, head);
                    }
                    return Ok(body);
                }
                Err(e) if self.policy.should_retry(attempts, &e) => {
                    log::warn!("{}, retrying ({}/{})", e, attempts, max_attempts);
                }
                Err(e) if e.is_retryable() => {
                    return Err(ScrapeError::RetriesExhausted {
                        url: url.to_string(),
                        attempts,
                        cause: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
