use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    company_section, full_text, labeled_content_where, mentions, run_cascade, table_row, Probe, Strategy,
    CORPORATE_TOKENS,
};
use crate::domain::{normalizer::clean_person_name, Document};

pub const LABELS: [&str; 6] = ["代表者", "代表取締役", "代表", "院長", "理事長", "施設長"];
pub const MAX_NAME_CHARS: usize = 30;

const HONORIFICS: [&str; 5] = ["様", "氏", "殿", "君", "先生"];
const PLACEHOLDERS: [&str; 7] = ["氏名", "名前", "代表者名", "担当者", "name", "Name", "NAME"];
const CLOSING_BRACKETS: [char; 8] = [')', '）', ']', '］', '】', '」', '』', '>'];
/// `代表電話`, `代表番号` and the like head a phone number, not a person.
const PHONE_HEADING_WORDS: [&str; 5] = ["電話", "番号", "TEL", "Tel", "FAX"];

static FULL_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:代表者|代表取締役|理事長|院長|施設長)名?[\s:：]+([^\n]{2,30})").unwrap()
});

static PROSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[。、をへ]|です|ます|ください|と一緒|について|において").unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "labeled content",
        run: labeled,
    },
    Strategy {
        name: "company info section",
        run: section,
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
    labeled_content_where(document, |heading| {
        mentions(heading, &LABELS) && !mentions(heading, &PHONE_HEADING_WORDS)
    })
}

fn section(document: &Document) -> Probe {
    company_section(document, &LABELS)
}

fn table(document: &Document) -> Probe {
    table_row(document, &LABELS)
}

fn free_text(document: &Document) -> Probe {
    full_text(document, &FULL_TEXT)
}

/// Filters out values that are clearly not a person's name.
pub fn is_plausible_name(name: &str) -> bool {
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return false;
    }
    if HONORIFICS.contains(&name) || PLACEHOLDERS.contains(&name) {
        return false;
    }
    if name.ends_with(CLOSING_BRACKETS) {
        return false;
    }
    if CORPORATE_TOKENS.iter().any(|&token| name.contains(token)) || PROSE.is_match(name) {
        return false;
    }
    if name
        .chars()
        .all(|c| c.is_numeric() || c.is_whitespace() || matches!(c, '-' | '－' | '.'))
    {
        return false;
    }

    let identifier_like = IDENTIFIER.is_match(name)
        && name.chars().any(|c| c.is_ascii_digit() || c == '_');
    !identifier_like
}

pub fn accept(raw: &str) -> Option<String> {
    let name = clean_person_name(raw);
    is_plausible_name(&name).then_some(name)
}

pub fn resolve(document: &Document) -> Option<String> {
    run_cascade("representative", &STRATEGIES, document, accept)
}
