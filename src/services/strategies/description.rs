use itertools::Itertools;

use super::{run_cascade, table_row, Probe, Strategy};
use crate::domain::{normalizer::clean_description, Document};

pub const LABELS: [&str; 3] = ["仕事内容", "業務内容", "職務内容"];
/// Words that introduce the description somewhere near it in the markup.
pub const KEYWORDS: [&str; 5] = ["仕事内容", "業務内容", "職務内容", "お仕事", "職種"];

pub const INTRO_SELECTOR: &str = "div.jobDtlText.jobIntro";
pub const GENERIC_SELECTORS: [&str; 10] = [
    "div.job-description",
    "div.description",
    "div[class*=\"job\"][class*=\"description\"]",
    "div[class*=\"description\"]",
    "div.jobDetail",
    "div.jobContent",
    "div.kyujin-detail",
    "section.detail",
    "div.detail-content",
    "div.job-content",
];
pub const CONTAINERS: &str = "div.main-content, div.content, div.detail, div.job, article, section";

pub const STRATEGIES: [Strategy; 5] = [
    Strategy {
        name: "table row",
        run: table,
    },
    Strategy {
        name: "job intro",
        run: intro,
    },
    Strategy {
        name: "generic selectors",
        run: generic,
    },
    Strategy {
        name: "keyword proximity",
        run: proximity,
    },
    Strategy {
        name: "content containers",
        run: containers,
    },
];

fn paragraphs(texts: impl Iterator<Item = String>) -> String {
    texts.filter(|text| !text.is_empty()).join("\n\n")
}

fn table(document: &Document) -> Probe {
    table_row(document, &LABELS)
}

fn intro(document: &Document) -> Probe {
    let text = paragraphs(document.select(INTRO_SELECTOR).iter().map(|n| n.text()));
    Probe::Candidates(vec![text])
}

fn generic(document: &Document) -> Probe {
    let candidates = GENERIC_SELECTORS
        .iter()
        .map(|css| paragraphs(document.select(css).iter().map(|n| n.text())))
        .collect();
    Probe::Candidates(candidates)
}

fn proximity(document: &Document) -> Probe {
    let candidates = KEYWORDS
        .iter()
        .flat_map(|keyword| document.elements_with_text(keyword))
        .filter_map(|owner| {
            owner
                .next_element()
                .or_else(|| owner.parent_element().and_then(|parent| parent.next_element()))
                .map(|content| content.text())
        })
        .collect();
    Probe::Candidates(candidates)
}

fn containers(document: &Document) -> Probe {
    let candidates = document
        .select(CONTAINERS)
        .iter()
        .map(|container| {
            let blocks = container
                .select("p, div")
                .into_iter()
                .filter(|block| block.has_class_containing("text") || block.has_class_containing("content"))
                .map(|block| block.text());
            paragraphs(blocks)
        })
        .collect();
    Probe::Candidates(candidates)
}

pub fn accept(raw: &str) -> Option<String> {
    let description = clean_description(raw);
    let plausible = description.chars().count() >= 2 && !KEYWORDS.contains(&description.as_str());
    plausible.then_some(description)
}

pub fn resolve(document: &Document) -> Option<String> {
    run_cascade("job_description", &STRATEGIES, document, accept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_html(html: &str) -> Option<String> {
        let document = Document::parse("https://toranet.jp/job_detail/1", html).unwrap();
        resolve(&document)
    }

    #[test]
    fn table_row_description_comes_first() {
        let html = r#"<html><body>
            <div class="description">一般的な説明</div>
            <table><tr><th>仕事内容</th><td>外来での診療補助業務</td></tr></table>
        </body></html>"#;
        assert_eq!(resolve_html(html).as_deref(), Some("外来での診療補助業務"));
    }

    #[test]
    fn generic_matches_are_joined_as_paragraphs() {
        let html = r#"<html><body>
            <div class="description">病棟での看護業務</div>
            <div class="description">夜勤は月4回程度</div>
        </body></html>"#;
        assert_eq!(
            resolve_html(html).as_deref(),
            Some("病棟での看護業務\n\n夜勤は月4回程度")
        );
    }

    #[test]
    fn keyword_heading_points_at_next_block() {
        let html = r#"<html><body>
            <h3>お仕事について</h3>
            <p>訪問先での入浴介助をお任せします。</p>
        </body></html>"#;
        assert_eq!(
            resolve_html(html).as_deref(),
            Some("訪問先での入浴介助をお任せします。")
        );
    }

    #[test]
    fn nothing_to_read() {
        assert_eq!(resolve_html("<html><body><p>x</p></body></html>"), None);
    }
}
