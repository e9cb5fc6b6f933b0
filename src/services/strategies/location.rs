use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    company_section, full_text, label_adjacent, labeled_content, run_cascade, selector_texts,
    table_row, Probe, Strategy,
};
use crate::domain::{
    normalizer::{clean_address, normalize},
    Document,
};

pub const LABELS: [&str; 4] = ["本社所在地", "所在地", "住所", "勤務地"];
pub const SELECTORS: [&str; 5] = [
    "div.corpAddress",
    ".address",
    "[itemprop=\"address\"]",
    "span.address",
    "p.address",
];
const MAX_ADDRESS_CHARS: usize = 120;
/// A real address names an administrative unit or carries a block number.
const ADDRESS_MARKERS: [char; 7] = ['都', '道', '府', '県', '市', '区', '町'];

static FULL_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:本社所在地|所在地|住所|勤務地)[\s:：]*([^\n]{4,80})").unwrap());

pub const STRATEGIES: [Strategy; 6] = [
    Strategy {
        name: "labeled content",
        run: labeled,
    },
    Strategy {
        name: "structural selectors",
        run: structural,
    },
    Strategy {
        name: "company info section",
        run: section,
    },
    Strategy {
        name: "label adjacency",
        run: adjacent,
    },
    Strategy {
        name: "table row",
        run: table,
    },
    Strategy {
        name: "full text",
        run: free_text,
    },
];

fn labeled(document: &Document) -> Probe {
    labeled_content(document, &LABELS).or_none()
}

fn structural(document: &Document) -> Probe {
    selector_texts(document, &SELECTORS)
}

fn section(document: &Document) -> Probe {
    company_section(document, &LABELS)
}

fn adjacent(document: &Document) -> Probe {
    label_adjacent(document, &LABELS)
}

fn table(document: &Document) -> Probe {
    table_row(document, &LABELS)
}

fn free_text(document: &Document) -> Probe {
    full_text(document, &FULL_TEXT)
}

/// Drops everything up to and including an embedded facility name.
fn after_facility(text: &str, facility_name: Option<&str>) -> String {
    match facility_name.filter(|name| !name.is_empty()) {
        Some(name) => match text.find(name) {
            Some(start) => text[start + name.len()..].to_string(),
            None => text.to_string(),
        },
        None => text.to_string(),
    }
}

pub fn accept(raw: &str, facility_name: Option<&str>) -> Option<String> {
    let address = clean_address(&after_facility(&normalize(raw), facility_name));
    let len = address.chars().count();
    let plausible = len >= 4
        && len <= MAX_ADDRESS_CHARS
        && address
            .chars()
            .any(|c| ADDRESS_MARKERS.contains(&c) || c.is_numeric());
    plausible.then_some(address)
}

pub fn resolve(document: &Document, facility_name: Option<&str>) -> Option<String> {
    run_cascade("location", &STRATEGIES, document, |raw| {
        accept(raw, facility_name)
    })
}
