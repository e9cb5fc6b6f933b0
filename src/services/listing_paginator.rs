use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    configuration::{Settings, SiteSettings},
    domain::{Document, UrlClassifier},
    error::ScrapeError,
    services::{
        fetcher::FetchPage,
        link_ranker::{LinkRanker, ListingPage},
        retry_policy::pause,
    },
};

/// Headings that mean a "listing" is really a single posting.
pub const DETAIL_HEADING_WORDS: [&str; 2] = ["求人情報", "仕事内容"];

pub struct CollectedLinks {
    pub listing_url: String,
    pub links: Vec<String>,
    pub pages_fetched: u32,
}

pub fn site_origin(site: &SiteSettings) -> Result<Url, ScrapeError> {
    Url::parse(&site.base_url)
        .and_then(|base| base.join("/"))
        .map_err(|e| ScrapeError::InvalidUrl(format!("{} ({})", site.base_url, e)))
}

pub fn listing_url(site: &SiteSettings, keyword: &str) -> Result<String, ScrapeError> {
    let mut url = site_origin(site)?;
    url.path_segments_mut()
        .map_err(|_| ScrapeError::InvalidUrl(site.base_url.clone()))?
        .pop_if_empty()
        .extend(["prefectures", site.region.as_str(), "job_search", "kw", keyword.trim()]);

    Ok(url.to_string())
}

pub fn page_url(listing_url: &str, page_number: u32) -> String {
    format!("{}/page/{}", listing_url.trim_end_matches('/'), page_number)
}

fn looks_like_detail_page(document: &Document) -> bool {
    document
        .select("h1, h2")
        .iter()
        .any(|heading| {
            let text = heading.text();
            DETAIL_HEADING_WORDS.iter().any(|&w| text.contains(w))
        })
}

enum PageLinks {
    Links(Vec<String>),
    Empty { is_detail_page: bool },
}

pub struct ListingPaginator<'a, F: FetchPage> {
    settings: &'a Settings,
    fetcher: &'a F,
    classifier: UrlClassifier,
    ranker: LinkRanker,
    origin: Url,
}

impl<'a, F: FetchPage> ListingPaginator<'a, F> {
    pub fn new(settings: &'a Settings, fetcher: &'a F) -> Result<Self, ScrapeError> {
        let classifier = UrlClassifier::new(&settings.site.target_domain);
        Ok(ListingPaginator {
            settings,
            fetcher,
            ranker: LinkRanker::new(classifier.clone()),
            classifier,
            origin: site_origin(&settings.site)?,
        })
    }

    fn read_page(
        &self,
        page_number: u32,
        url: &str,
        body: &str,
        listing_url: &str,
    ) -> Result<PageLinks, ScrapeError> {
        let document = Document::parse(url, body)?;
        let page = ListingPage::scan(page_number, &document, &self.origin, &self.classifier);
        let links = self
            .ranker
            .rank_links(&page, listing_url, self.settings.search.max_jobs());

        match links.is_empty() {
            true => Ok(PageLinks::Empty {
                is_detail_page: looks_like_detail_page(&document),
            }),
            false => Ok(PageLinks::Links(links)),
        }
    }

    pub async fn collect_links(
        &self,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<CollectedLinks, ScrapeError> {
        let listing = listing_url(&self.settings.site, keyword)?;
        log::info!("Searching '{}' at {}", keyword, listing);

        if self.settings.search.direct_listing {
            log::info!("Using the listing page directly as the detail page");
            return Ok(CollectedLinks {
                links: vec![listing.clone()],
                listing_url: listing,
                pages_fetched: 0,
            });
        }

        let max_jobs = self.settings.search.max_jobs();
        let page_cap = self.settings.search.page_cap();

        let body = self.fetcher.fetch(&listing, cancel).await?;
        let first_links = match self.read_page(1, &listing, &body, &listing)? {
            PageLinks::Links(links) => links,
            PageLinks::Empty {
                is_detail_page: true,
            } => {
                log::info!("Listing page {} looks like a detail page, using it directly", listing);
                return Ok(CollectedLinks {
                    links: vec![listing.clone()],
                    listing_url: listing,
                    pages_fetched: 1,
                });
            }
            PageLinks::Empty {
                is_detail_page: false,
            } => return Err(ScrapeError::NoLinksFound(listing)),
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut links: Vec<String> = vec![];
        for link in first_links {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }

        let mut page_number = 1;
        while links.len() < max_jobs && page_number < page_cap {
            page_number += 1;
            pause(self.settings.politeness.page_delay.sample(), cancel).await?;

            let url = page_url(&listing, page_number);
            let body = match self.fetcher.fetch(&url, cancel).await {
                Ok(body) => body,
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) => {
                    log::info!("No more pages after page {}: {}", page_number - 1, e);
                    page_number -= 1;
                    break;
                }
            };

            let page_links = match self.read_page(page_number, &url, &body, &listing) {
                Ok(PageLinks::Links(page_links)) => page_links,
                Ok(PageLinks::Empty { .. }) => {
                    log::info!("Page {} has no job links, stopping", page_number);
                    break;
                }
                Err(e) => {
                    log::info!("Stopping at unreadable page {}: {}", page_number, e);
                    break;
                }
            };

            let before = links.len();
            for link in page_links {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
            if links.len() == before {
                log::info!("Page {} only repeats earlier links, stopping", page_number);
                break;
            }
        }

        links.truncate(max_jobs);
        log::info!("Collected {} job links from {} page(s)", links.len(), page_number);

        Ok(CollectedLinks {
            listing_url: listing,
            links,
            pages_fetched: page_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_encodes_keyword_as_path_segment() {
        let site = SiteSettings::default();

        assert_eq!(
            listing_url(&site, "看護師").unwrap(),
            "https://toranet.jp/prefectures/tokyo/job_search/kw/%E7%9C%8B%E8%AD%B7%E5%B8%AB"
        );
        assert_eq!(
            listing_url(&site, "看護 師/夜勤").unwrap(),
            "https://toranet.jp/prefectures/tokyo/job_search/kw/%E7%9C%8B%E8%AD%B7%20%E5%B8%AB%2F%E5%A4%9C%E5%8B%A4"
        );
    }

    #[test]
    fn page_url_appends_page_segment() {
        assert_eq!(
            page_url("https://toranet.jp/prefectures/tokyo/job_search/kw/abc", 3),
            "https://toranet.jp/prefectures/tokyo/job_search/kw/abc/page/3"
        );
    }

    #[test]
    fn detail_heading_is_recognised() {
        let document = Document::parse(
            "https://toranet.jp/prefectures/tokyo/job_search/kw/abc",
            "<html><body><h2>仕事内容</h2><p>外来業務</p></body></html>",
        )
        .unwrap();
        assert!(looks_like_detail_page(&document));

        let document = Document::parse(
            "https://toranet.jp/prefectures/tokyo/job_search/kw/abc",
            "<html><body><h2>検索結果</h2></body></html>",
        )
        .unwrap();
        assert!(!looks_like_detail_page(&document));
    }
}
