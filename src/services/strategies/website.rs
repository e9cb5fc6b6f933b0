use super::{run_cascade, Probe, Strategy};
use crate::domain::{Document, UrlClassifier};

pub const SELECTORS: [&str; 4] = [
    "div.corpLink a",
    "a.company-url",
    "a[href*=\"http\"]",
    "a[target=\"_blank\"]",
];

pub const STRATEGIES: [Strategy; 1] = [Strategy {
    name: "outbound links",
    run: outbound_links,
}];

fn outbound_links(document: &Document) -> Probe {
    let candidates = SELECTORS
        .iter()
        .flat_map(|css| document.select(css))
        .filter_map(|node| node.attr("href"))
        .map(|href| href.trim().to_string())
        .collect();
    Probe::Candidates(candidates)
}

/// The employer's own site: an absolute http(s) link that leaves the job board.
pub fn accept(href: &str, classifier: &UrlClassifier) -> Option<String> {
    let plausible = href.len() > 10
        && href.starts_with("http")
        && !href.contains(classifier.target_domain())
        && !classifier.is_target_domain(href);
    plausible.then(|| href.to_string())
}

pub fn resolve(document: &Document, classifier: &UrlClassifier) -> Option<String> {
    run_cascade("website_url", &STRATEGIES, document, |href| accept(href, classifier))
}
