use std::collections::HashSet;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::{Document, UrlClassifier};

pub const DETAIL_WORDS: [&str; 2] = ["詳細", "求人"];

static DETAIL_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"job.*detail|kyujin|recruit").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub anchor_text: String,
    pub css_classes: HashSet<String>,
    pub looks_like_detail: bool,
}

impl CandidateLink {
    pub fn new(url: String, anchor_text: String, css_classes: HashSet<String>) -> Self {
        let looks_like_detail = DETAIL_WORDS.iter().any(|&w| anchor_text.contains(w))
            || anchor_text.to_lowercase().contains("job")
            || url.to_lowercase().contains("detail");

        CandidateLink {
            url,
            anchor_text,
            css_classes,
            looks_like_detail,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingPage {
    pub page_number: u32,
    pub url: String,
    pub links: Vec<CandidateLink>,
}

/// Resolves an href against the site root. Non-http targets give `None`.
pub fn absolute_url(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let url = origin.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

impl ListingPage {
    pub fn scan(
        page_number: u32,
        document: &Document,
        origin: &Url,
        classifier: &UrlClassifier,
    ) -> Self {
        let links: Vec<CandidateLink> = document
            .select("a[href]")
            .into_iter()
            .filter_map(|a_tag| {
                let url = absolute_url(origin, a_tag.attr("href")?)?;
                match classifier.is_in_scope(&url) {
                    true => Some(CandidateLink::new(
                        url,
                        a_tag.text(),
                        a_tag.classes().into_iter().collect(),
                    )),
                    false => None,
                }
            })
            .collect();

        log::debug!(
            "Found {} in-scope links on page {} ({})",
            links.len(),
            page_number,
            document.url()
        );

        ListingPage {
            page_number,
            url: document.url().to_string(),
            links,
        }
    }
}

pub struct LinkRanker {
    classifier: UrlClassifier,
}

impl LinkRanker {
    pub fn new(classifier: UrlClassifier) -> Self {
        LinkRanker { classifier }
    }

    /// Detail-looking links first, then detail-like paths, then any other
    /// on-site link outside the listing itself.
    pub fn rank_links(&self, page: &ListingPage, exclude_url: &str, max_jobs: usize) -> Vec<String> {
        let candidates = || page.links.iter().filter(|link| link.url != exclude_url);

        let detail_text = candidates().filter(|link| link.looks_like_detail);
        let detail_path = candidates().filter(|link| DETAIL_PATH.is_match(&link.url));
        let last_resort = candidates().filter(|link| {
            !link.url.contains(exclude_url) && self.classifier.is_target_domain(&link.url)
        });

        detail_text
            .chain(detail_path)
            .chain(last_resort)
            .map(|link| link.url.clone())
            .unique()
            .take(max_jobs)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    const LISTING: &str = "https://toranet.jp/prefectures/tokyo/job_search/kw/abc";

    fn link(url: &str, text: &str) -> CandidateLink {
        CandidateLink::new(url.to_string(), text.to_string(), HashSet::new())
    }

    fn page(links: Vec<CandidateLink>) -> ListingPage {
        ListingPage {
            page_number: 1,
            url: LISTING.to_string(),
            links,
        }
    }

    fn ranker() -> LinkRanker {
        LinkRanker::new(UrlClassifier::new("toranet.jp"))
    }

    #[test]
    fn detail_text_outranks_paths() {
        let page = page(vec![
            link("https://toranet.jp/prefectures/tokyo/area", "エリア"),
            link("https://toranet.jp/kyujin/2", "渋谷クリニック"),
            link("https://toranet.jp/prefectures/tokyo/job_detail/1", "詳細を見る"),
        ]);

        assert_eq!(
            ranker().rank_links(&page, LISTING, 10),
            vec![
                "https://toranet.jp/prefectures/tokyo/job_detail/1",
                "https://toranet.jp/kyujin/2",
                "https://toranet.jp/prefectures/tokyo/area",
            ]
        );
    }

    #[test]
    fn listing_and_its_pages_are_not_last_resort_links() {
        let page = page(vec![
            link(LISTING, "看護師の求人"),
            link(&format!("{LISTING}/page/2"), "次へ"),
            link("https://toranet.jp/prefectures/tokyo", "東京都"),
        ]);

        assert_eq!(
            ranker().rank_links(&page, LISTING, 10),
            vec!["https://toranet.jp/prefectures/tokyo"]
        );
    }

    #[test]
    fn never_more_than_max_and_never_duplicates() {
        let links = (0..30)
            .map(|i| link(&format!("https://toranet.jp/job_detail/{}", i % 7), "詳細"))
            .collect();
        let ranked = ranker().rank_links(&page(links), LISTING, 5);

        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked.iter().unique().count(), ranked.len());

        let links = (0..30)
            .map(|i| link(&format!("https://toranet.jp/job_detail/{}", i % 3), "詳細"))
            .collect();
        assert_eq!(ranker().rank_links(&page(links), LISTING, 5).len(), 3);
    }

    #[test]
    fn scan_resolves_and_filters_links() {
        let html = r##"
            <html><body>
              <a href="/prefectures/tokyo/job_detail/1" class="jobLink card">看護師 求人詳細</a>
              <a href="job_detail/2">詳細</a>
              <a href="https://toranet.jp/favorite_jobs/add/1">お気に入り</a>
              <a href="https://example.com/about">会社概要</a>
              <a href="javascript:void(0)">開く</a>
              <a href="#top">上へ</a>
              <a>no href</a>
            </body></html>
        "##;
        let document = Document::parse(LISTING, html).unwrap();
        let origin = Url::parse("https://toranet.jp/").unwrap();
        let listing = ListingPage::scan(1, &document, &origin, &UrlClassifier::new("toranet.jp"));

        let urls: Vec<&str> = listing.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://toranet.jp/prefectures/tokyo/job_detail/1",
                "https://toranet.jp/job_detail/2",
            ]
        );
        assert!(listing.links[0].css_classes.contains("jobLink"));
        assert!(listing.links[0].looks_like_detail);
    }
}
