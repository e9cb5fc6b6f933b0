//! Named, ordered extraction strategies, one table per field.
//!
//! A strategy looks at the parsed page and returns raw candidates in
//! priority order. The cascade normalizes and filters each candidate and
//! stops at the first one that survives. A strategy can also report that the
//! page states the field explicitly empty, which ends the cascade with no
//! value.

pub mod description;
pub mod facility;
pub mod location;
pub mod phone_number;
pub mod representative;
pub mod website;

use regex::Regex;

use crate::domain::{Document, Node};

/// Content cells on detail pages, each preceded by its heading.
pub const CONTENT_SELECTOR: &str = ".jobDtlText";
pub const COMPANY_SECTIONS: &str = "div.corpInfo, section.corpInfo, div.companyInfo, section.companyInfo, div.company-info, section.company-info, #companyInfo";
pub const LABEL_ELEMENTS: &str = "dt, th, h3, h4, h5, span, p, div, li, strong, b, label";
/// Longer text is content, not a label.
pub const LABEL_MAX_CHARS: usize = 16;

pub const CORPORATE_TOKENS: [&str; 16] = [
    "株式会社",
    "有限会社",
    "合同会社",
    "医療法人",
    "社会福祉法人",
    "一般社団法人",
    "学校法人",
    "法人",
    "(株)",
    "（株）",
    "会社",
    "クリニック",
    "病院",
    "医院",
    "薬局",
    "保育園",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Candidates(Vec<String>),
    /// The page has the field but leaves it blank.
    Vacant,
}

impl Probe {
    pub fn none() -> Self {
        Probe::Candidates(vec![])
    }

    /// For fields where a blank value should not stop the cascade.
    pub fn or_none(self) -> Self {
        match self {
            Probe::Vacant => Probe::none(),
            probe => probe,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: fn(&Document) -> Probe,
}

pub fn run_cascade<T>(
    field: &str,
    strategies: &[Strategy],
    document: &Document,
    accept: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    for strategy in strategies {
        match (strategy.run)(document) {
            Probe::Vacant => {
                log::debug!("{}: left blank on the page ({})", field, strategy.name);
                return None;
            }
            Probe::Candidates(candidates) => {
                if let Some(value) = candidates.iter().find_map(|raw| accept(raw)) {
                    log::debug!("{}: matched by {}", field, strategy.name);
                    return Some(value);
                }
            }
        }
    }

    log::debug!("{}: no strategy matched on {}", field, document.url());
    None
}

pub fn mentions(text: &str, labels: &[&str]) -> bool {
    labels.iter().any(|&label| text.contains(label))
}

fn is_label(node: &Node<'_>, labels: &[&str]) -> bool {
    let text = node.own_text();
    !text.is_empty() && text.chars().count() <= LABEL_MAX_CHARS && mentions(&text, labels)
}

/// `.jobDtlText` cells whose heading names one of `labels`. A blank first
/// match makes the whole probe vacant.
pub fn labeled_content(document: &Document, labels: &[&str]) -> Probe {
    labeled_content_where(document, |heading| mentions(heading, labels))
}

pub fn labeled_content_where(document: &Document, is_heading: impl Fn(&str) -> bool) -> Probe {
    let mut candidates = vec![];

    for content in document.select(CONTENT_SELECTOR) {
        let Some(heading) = content.prev_element() else {
            continue;
        };
        let heading_text = heading.text();
        if heading_text.chars().count() > LABEL_MAX_CHARS || !is_heading(&heading_text) {
            continue;
        }

        match content.text() {
            text if text.is_empty() && candidates.is_empty() => return Probe::Vacant,
            text if text.is_empty() => {}
            text => candidates.push(text),
        }
    }

    Probe::Candidates(candidates)
}

/// Text after a label, either inline (`代表者：山田`) or in the next element.
pub fn label_values(nodes: Vec<Node<'_>>, labels: &[&str]) -> Vec<String> {
    nodes
        .into_iter()
        .filter(|node| is_label(node, labels))
        .filter_map(|node| {
            let own = node.own_text();
            // earliest label, longest on ties: "代表者" before "代表"
            let inline = labels
                .iter()
                .filter_map(|&label| own.find(label).map(|start| (start, label)))
                .min_by_key(|&(start, label)| (start, std::cmp::Reverse(label.len())))
                .map(|(start, label)| own[start + label.len()..].trim_start_matches([' ', ':', '：']).trim())
                .filter(|rest| !rest.is_empty())
                .map(str::to_string);

            inline.or_else(|| {
                node.next_element()
                    .map(|value| value.text())
                    .filter(|text| !text.is_empty())
            })
        })
        .collect()
}

pub fn company_section(document: &Document, labels: &[&str]) -> Probe {
    let candidates = document
        .select(COMPANY_SECTIONS)
        .into_iter()
        .flat_map(|section| label_values(section.select(LABEL_ELEMENTS), labels))
        .collect();
    Probe::Candidates(candidates)
}

pub fn label_adjacent(document: &Document, labels: &[&str]) -> Probe {
    Probe::Candidates(label_values(document.select(LABEL_ELEMENTS), labels))
}

/// Table rows (`th` → `td`) and definition lists (`dt` → `dd`).
pub fn table_row(document: &Document, labels: &[&str]) -> Probe {
    let mut candidates = vec![];

    for row in document.select("tr") {
        let cells = row.select("th, td");
        let header = cells.iter().position(|cell| {
            let text = cell.text();
            text.chars().count() <= LABEL_MAX_CHARS && mentions(&text, labels)
        });
        if let Some(value) = header.and_then(|i| cells.get(i + 1)) {
            candidates.push(value.text());
        }
    }

    for term in document.select("dt") {
        let text = term.text();
        if text.chars().count() > LABEL_MAX_CHARS || !mentions(&text, labels) {
            continue;
        }
        if let Some(definition) = term.next_element().filter(|n| n.name() == "dd") {
            candidates.push(definition.text());
        }
    }

    Probe::Candidates(candidates.into_iter().filter(|c| !c.is_empty()).collect())
}

pub fn selector_texts(document: &Document, selectors: &[&str]) -> Probe {
    let candidates = selectors
        .iter()
        .flat_map(|css| document.select(css))
        .map(|node| node.text())
        .filter(|text| !text.is_empty())
        .collect();
    Probe::Candidates(candidates)
}

/// First capture group of every match over the page's text lines.
pub fn full_text(document: &Document, pattern: &Regex) -> Probe {
    let text = document.text_lines();
    let candidates = pattern
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    Probe::Candidates(candidates)
}
