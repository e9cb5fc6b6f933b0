use once_cell::sync::Lazy;
use regex::Regex;

use super::{run_cascade, selector_texts, Probe, Strategy, CORPORATE_TOKENS};
use crate::domain::{
    normalizer::{clean_facility_name, BOILERPLATE_WORDS},
    Document,
};

pub const MAX_NAME_CHARS: usize = 60;
/// Only the top of the page is scanned for corporate names.
const SCAN_ELEMENTS: usize = 20;

pub const SELECTORS: [&str; 10] = [
    "div.corpNameWrap > span",
    "div.corpName",
    "h1.company-name",
    "div.company-name",
    "div.corpInfo",
    "span.name",
    ".corp-name",
    ".company",
    "h1",
    "h2",
];

static TITLE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|｜\-－–—/／:：]").unwrap());

pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "structural selectors",
        run: structural,
    },
    Strategy {
        name: "corporate suffix",
        run: corporate_suffix,
    },
    Strategy {
        name: "title segments",
        run: title_segments,
    },
    Strategy {
        name: "title",
        run: title_stripped,
    },
];

fn structural(document: &Document) -> Probe {
    selector_texts(document, &SELECTORS)
}

fn corporate_suffix(document: &Document) -> Probe {
    let candidates = document
        .select("div, span, p")
        .into_iter()
        .take(SCAN_ELEMENTS)
        .map(|node| node.text())
        .filter(|text| {
            let len = text.chars().count();
            len > 5 && len < 50 && CORPORATE_TOKENS.iter().any(|&t| text.contains(t))
        })
        .collect();
    Probe::Candidates(candidates)
}

fn title_segments(document: &Document) -> Probe {
    let Some(title) = document.title() else {
        return Probe::none();
    };
    let candidates = TITLE_SEPARATORS
        .split(&title)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !BOILERPLATE_WORDS.iter().any(|&w| segment.contains(w)))
        .map(str::to_string)
        .collect();
    Probe::Candidates(candidates)
}

fn title_stripped(document: &Document) -> Probe {
    let Some(mut title) = document.title() else {
        return Probe::none();
    };
    for word in BOILERPLATE_WORDS {
        title = title.replace(word, " ");
    }
    Probe::Candidates(vec![title])
}

pub fn accept(raw: &str) -> Option<String> {
    let name = clean_facility_name(raw);
    let plausible = !name.is_empty()
        && name.chars().count() <= MAX_NAME_CHARS
        && !BOILERPLATE_WORDS.contains(&name.as_str());
    plausible.then_some(name)
}

pub fn resolve(document: &Document) -> Option<String> {
    run_cascade("facility_name", &STRATEGIES, document, accept)
}
