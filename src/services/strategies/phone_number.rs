use super::{labeled_content, run_cascade, Probe, Strategy};
use crate::domain::{
    phone::{find_phone, find_phone_in_element, find_short_run, PhoneNumber},
    Document,
};

pub const LABELS: [&str; 5] = ["電話番号", "TEL", "Tel", "電話", "連絡先"];
pub const SELECTORS: [&str; 7] = [
    "div.tel",
    "div.phone",
    "span.tel",
    "span.phone",
    "p.tel",
    "a[href^=\"tel:\"]",
    "div.contact",
];

/// Strategies that read dedicated phone elements, the only place a short
/// digit run is worth keeping.
const ELEMENT_STRATEGIES: [Strategy; 2] = [
    Strategy {
        name: "labeled content",
        run: labeled,
    },
    Strategy {
        name: "structural selectors",
        run: structural,
    },
];

const FULL_TEXT_STRATEGIES: [Strategy; 1] = [Strategy {
    name: "full text",
    run: free_text,
}];

fn labeled(document: &Document) -> Probe {
    labeled_content(document, &LABELS).or_none()
}

fn structural(document: &Document) -> Probe {
    let mut candidates = vec![];
    for node in SELECTORS.iter().flat_map(|css| document.select(css)) {
        if let Some(href) = node.attr("href") {
            candidates.push(href.trim_start_matches("tel:").to_string());
        }
        candidates.push(node.text());
    }
    Probe::Candidates(candidates)
}

fn free_text(document: &Document) -> Probe {
    Probe::Candidates(vec![document.text_lines()])
}

pub fn resolve(document: &Document) -> Option<PhoneNumber> {
    run_cascade("phone_number", &ELEMENT_STRATEGIES, document, |raw| {
        find_phone_in_element(raw).map(PhoneNumber::Confirmed)
    })
    .or_else(|| {
        run_cascade("phone_number", &FULL_TEXT_STRATEGIES, document, |raw| {
            find_phone(raw).map(PhoneNumber::Confirmed)
        })
    })
    .or_else(|| run_cascade("phone_number (short run)", &ELEMENT_STRATEGIES, document, find_short_run))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_html(html: &str) -> Option<PhoneNumber> {
        let document = Document::parse("https://toranet.jp/job_detail/1", html).unwrap();
        resolve(&document)
    }

    #[test]
    fn tel_link_is_read() {
        let html = r#"<html><body><a href="tel:0312345678">電話する</a></body></html>"#;
        assert_eq!(
            resolve_html(html),
            Some(PhoneNumber::Confirmed("03-1234-5678".to_string()))
        );
    }

    #[test]
    fn labeled_number_beats_other_numbers_on_the_page() {
        let html = r#"<html><body>
            <p>お問い合わせ 0120-000-111</p>
            <div><h3>電話番号</h3><div class="jobDtlText">０３－９８７６－５４３２</div></div>
        </body></html>"#;
        assert_eq!(
            resolve_html(html),
            Some(PhoneNumber::Confirmed("03-9876-5432".to_string()))
        );
    }

    #[test]
    fn short_run_only_from_phone_elements() {
        let html = r#"<html><body><div class="tel">内線 12345</div></body></html>"#;
        assert_eq!(
            resolve_html(html),
            Some(PhoneNumber::LowConfidence("12345".to_string()))
        );

        let html = r#"<html><body><p>会員番号 12345</p></body></html>"#;
        assert_eq!(resolve_html(html), None);
    }

    #[test]
    fn postal_code_row_is_not_a_phone() {
        let html = r#"<html><body><table>
            <tr><th>郵便番号</th><td>100-0005</td></tr>
            <tr><th>所在地</th><td>東京都千代田区丸の内1-1</td></tr>
        </table></body></html>"#;
        assert_eq!(resolve_html(html), None);
    }

    #[test]
    fn free_dial_remainder_in_a_phone_element() {
        let html = r#"<html><body><div class="tel">777-1234</div></body></html>"#;
        assert_eq!(
            resolve_html(html),
            Some(PhoneNumber::Confirmed("0120-777-1234".to_string()))
        );
    }
}
