//! String cleaning shared by every field cascade.
//!
//! All functions are pure and total, and each is a fixpoint of its cleaning
//! step, so applying one twice gives the same result as applying it once.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

const SETTLE_LIMIT: usize = 32;

pub const EDGE_PUNCTUATION: [char; 29] = [
    ':', '：', '、', '。', ',', '，', '・', '|', '｜', '/', '／', '-', '－', '‐', '–', '—', '~',
    '〜', '*', '＊', '■', '□', '●', '◆', '★', '※', '>', '＞', '＝',
];

pub const BOILERPLATE_WORDS: [&str; 9] = [
    "求人詳細",
    "求人情報",
    "採用情報",
    "募集要項",
    "求人",
    "募集",
    "転職",
    "詳細",
    "とらばーゆ",
];

pub const ROLE_TOKENS: [&str; 13] = [
    "准看護師",
    "正看護師",
    "看護師",
    "介護福祉士",
    "介護職",
    "介護士",
    "薬剤師",
    "歯科衛生士",
    "歯科助手",
    "保育士",
    "医療事務",
    "受付",
    "正社員",
];

pub const PERSON_PREFIXES: [&str; 9] = [
    "代表取締役社長",
    "代表取締役",
    "代表者",
    "理事長",
    "施設長",
    "院長",
    "園長",
    "社長",
    "代表",
];

pub const PERSON_STOP_LABELS: [&str; 14] = [
    "電話番号",
    "電話",
    "TEL",
    "Tel",
    "事業内容",
    "業務内容",
    "所在地",
    "住所",
    "応募方法",
    "応募後のプロセス",
    "選考プロセス",
    "設立",
    "資本金",
    "従業員数",
];

pub const ADDRESS_PREFIXES: [&str; 5] = ["本社所在地", "所在地", "勤務地", "住所", "アクセス"];

pub const ADDRESS_STOP_LABELS: [&str; 12] = [
    "電話番号",
    "電話",
    "TEL",
    "Tel",
    "FAX",
    "事業内容",
    "業務内容",
    "代表者",
    "応募方法",
    "応募後のプロセス",
    "選考プロセス",
    "設立",
];

fn alternation(words: &[&str]) -> String {
    words.iter().map(|w| regex::escape(w)).join("|")
}

static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"【[^】]*】|\[[^\]]*\]|［[^］]*］|\([^)]*\)|（[^）]*）|〔[^〕]*〕|<[^>]*>").unwrap()
});

static BOILERPLATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:の)?(?:{})$", alternation(&BOILERPLATE_WORDS))).unwrap()
});

static BOILERPLATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{})(?:[\s:：]|$)", alternation(&BOILERPLATE_WORDS))).unwrap()
});

static ROLE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:[\s/／・|｜\-－]|の)(?:{})$",
        alternation(&ROLE_TOKENS)
    ))
    .unwrap()
});

static ROLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{})(?:[\s/／・|｜\-－:：])",
        alternation(&ROLE_TOKENS)
    ))
    .unwrap()
});

static PERSON_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:{})(?:[\s:：]+|$)",
        alternation(&PERSON_PREFIXES)
    ))
    .unwrap()
});

static PERSON_STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{}|東京都|北海道|京都府|大阪府|\p{{Han}}{{2,3}}県",
        alternation(&PERSON_STOP_LABELS)
    ))
    .unwrap()
});

static ADDRESS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{})[\s:：]*", alternation(&ADDRESS_PREFIXES))).unwrap()
});

static ADDRESS_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(&alternation(&ADDRESS_STOP_LABELS)).unwrap());

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\u{3000}]*\n").unwrap());

fn settle(input: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = step(input);
    for _ in 0..SETTLE_LIMIT {
        let next = step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn collapse_step(s: &str) -> String {
    s.split_whitespace()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c))
        .to_string()
}

fn cut_at(s: &str, stop: &Regex) -> String {
    match stop.find(s) {
        Some(m) => s[..m.start()].to_string(),
        None => s.to_string(),
    }
}

/// Whitespace runs become one space, edges lose whitespace and punctuation.
pub fn normalize(s: &str) -> String {
    settle(s, collapse_step)
}

pub fn clean_facility_name(s: &str) -> String {
    settle(s, |s| {
        let s = collapse_step(s);
        let s = BRACKETED.replace_all(&s, " ");
        let s = collapse_step(&s);
        let s = BOILERPLATE_SUFFIX.replace(&s, "");
        let s = BOILERPLATE_PREFIX.replace(&s, "");
        let s = ROLE_SUFFIX.replace(&s, "");
        let s = ROLE_PREFIX.replace(&s, "");
        collapse_step(&s)
    })
}

pub fn clean_person_name(s: &str) -> String {
    settle(s, |s| {
        let s = collapse_step(s);
        let s = PERSON_PREFIX.replace(&s, "");
        collapse_step(&cut_at(&s, &PERSON_STOP))
    })
}

pub fn clean_address(s: &str) -> String {
    settle(s, |s| {
        let s = collapse_step(s);
        let s = ADDRESS_PREFIX.replace(&s, "");
        collapse_step(&cut_at(&s, &ADDRESS_STOP))
    })
}

/// Paragraphs stay separated by one blank line, everything inside collapses.
pub fn clean_description(s: &str) -> String {
    settle(s, |s| {
        let s = s.replace("\r\n", "\n").replace('\r', "\n");
        BLANK_LINES
            .split(&s)
            .map(|paragraph| paragraph.split_whitespace().join(" "))
            .filter(|paragraph| !paragraph.is_empty())
            .join("\n\n")
    })
}
