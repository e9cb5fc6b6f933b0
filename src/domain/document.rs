use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

pub fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::error!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

pub struct Document {
    html: Html,
    url: String,
}

impl Document {
    /// Only fails when the body is not markup at all; html5ever recovers from
    /// everything else.
    pub fn parse(url: &str, raw: &str) -> Result<Self, ScrapeError> {
        let reason = match raw.trim() {
            "" => Some("empty document"),
            body if !body.contains('<') => Some("response is not an HTML document"),
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(ScrapeError::ParseError {
                url: url.to_string(),
                reason: reason.to_string(),
            });
        }

        Ok(Document {
            html: Html::parse_document(raw),
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn select(&self, css: &str) -> Vec<Node<'_>> {
        match compile(css) {
            Some(selector) => self.html.select(&selector).map(Node).collect(),
            None => vec![],
        }
    }

    pub fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = compile(css)?;
        self.html.select(&selector).next().map(Node)
    }

    pub fn title(&self) -> Option<String> {
        self.select_first("title")
            .map(|title| title.text())
            .filter(|title| !title.is_empty())
    }

    /// Every visible text node, trimmed, one per line.
    pub fn text_lines(&self) -> String {
        self.html
            .root_element()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let parent = node.parent().and_then(ElementRef::wrap)?;
                match SKIPPED_ELEMENTS.contains(&parent.value().name()) {
                    true => None,
                    false => Some(text.trim().to_string()),
                }
            })
            .filter(|line| !line.is_empty())
            .join("\n")
    }

    /// Elements owning a visible text node that contains `needle`.
    pub fn elements_with_text(&self, needle: &str) -> Vec<Node<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter(|node| node.value().as_text().is_some_and(|t| t.contains(needle)))
            .filter_map(|node| node.parent().and_then(ElementRef::wrap))
            .filter(|parent| !SKIPPED_ELEMENTS.contains(&parent.value().name()))
            .filter(|parent| parent.value().name() != "title")
            .map(Node)
            .collect()
    }
}

/// An element node. Text nodes never get one of these.
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn name(&self) -> &'a str {
        self.0.value().name()
    }

    /// All descendant text, whitespace collapsed.
    pub fn text(&self) -> String {
        self.0.text().flat_map(str::split_whitespace).join(" ")
    }

    /// Only the text nodes directly under this element.
    pub fn own_text(&self) -> String {
        self.0
            .children()
            .filter_map(|child| child.value().as_text())
            .flat_map(|t| t.split_whitespace())
            .join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.value().classes().map(str::to_string).collect()
    }

    pub fn has_class_containing(&self, needle: &str) -> bool {
        self.0.value().classes().any(|class| class.contains(needle))
    }

    pub fn next_element(&self) -> Option<Node<'a>> {
        self.0.next_siblings().find_map(ElementRef::wrap).map(Node)
    }

    pub fn prev_element(&self) -> Option<Node<'a>> {
        self.0.prev_siblings().find_map(ElementRef::wrap).map(Node)
    }

    pub fn parent_element(&self) -> Option<Node<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Node)
    }

    pub fn select(&self, css: &str) -> Vec<Node<'a>> {
        match compile(css) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => vec![],
        }
    }
}
