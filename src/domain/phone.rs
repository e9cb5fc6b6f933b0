use once_cell::sync::Lazy;
use regex::Regex;

pub const FREE_DIAL_PREFIX: &str = "0120";
/// Subscriber blocks that only ever appear behind the free-dial prefix on the
/// site, so a bare `777-1234` can be read as `0120-777-1234`.
pub const FREE_DIAL_CONTINUATIONS: [&str; 2] = ["777", "100"];

const LABEL_WINDOW: usize = 24;
const POSTAL_MARKERS: [&str; 2] = ["〒", "郵便番号"];

static PHONE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)電話番号|TEL|電話|フリーダイヤル|フリーコール|連絡先").unwrap());

static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])(0[0-9]{1,4}[-( ]?[0-9]{1,4}[-) ]?[0-9]{3,4})(?:[^0-9]|$)").unwrap()
});

static SEVEN_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9\-])([0-9]{3})-?([0-9]{4})(?:[^0-9\-]|$)").unwrap());

static SHORT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{5,6})(?:[^0-9]|$)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumber {
    Confirmed(String),
    /// A short digit run found next to a phone label, left unformatted.
    LowConfidence(String),
}

/// Full-width digits, dashes and parentheses become their ASCII forms.
pub fn to_ascii_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '－' | '‐' | '―' | '−' | '–' | '—' => '-',
            '（' => '(',
            '）' => ')',
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

pub fn format_digits(digits: &str) -> Option<String> {
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match digits.len() {
        10 if digits.starts_with(FREE_DIAL_PREFIX) => Some(format!(
            "{}-{}-{}",
            &digits[..4],
            &digits[4..7],
            &digits[7..]
        )),
        10 => Some(format!(
            "{}-{}-{}",
            &digits[..2],
            &digits[2..6],
            &digits[6..]
        )),
        11 => Some(format!(
            "{}-{}-{}",
            &digits[..3],
            &digits[3..7],
            &digits[7..]
        )),
        _ => None,
    }
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn first_formatted(text: &str) -> Option<String> {
    PHONE_NUMBER
        .captures_iter(text)
        .filter_map(|caps| format_digits(&digits_of(&caps[1])))
        .next()
}

fn is_postal_code(preceding: &str) -> bool {
    let preceding = preceding.trim_end_matches(|c: char| c.is_whitespace() || c == ':' || c == '：');
    POSTAL_MARKERS.iter().any(|marker| preceding.ends_with(marker))
}

fn free_dial_remainder(text: &str) -> Option<String> {
    SEVEN_DIGITS.captures_iter(text).find_map(|caps| {
        let head = caps.get(1)?;
        let is_postal_code = is_postal_code(&text[..head.start()]);
        match !is_postal_code && FREE_DIAL_CONTINUATIONS.contains(&head.as_str()) {
            true => Some(format!("{}-{}-{}", FREE_DIAL_PREFIX, head.as_str(), &caps[2])),
            false => None,
        }
    })
}

/// Finds a confirmed phone number: numbers right after a phone label win over
/// the first number anywhere in the text. A bare free-dial remainder only
/// counts inside a label window.
pub fn find_phone(text: &str) -> Option<String> {
    let text = to_ascii_digits(text);

    let labeled = PHONE_LABEL.find_iter(&text).find_map(|label| {
        let window: String = text[label.end()..].chars().take(LABEL_WINDOW).collect();
        first_formatted(&window).or_else(|| free_dial_remainder(&window))
    });

    labeled.or_else(|| first_formatted(&text))
}

/// Like [`find_phone`], for text taken from a dedicated phone element, where
/// a bare free-dial remainder may stand on its own.
pub fn find_phone_in_element(text: &str) -> Option<String> {
    find_phone(text).or_else(|| free_dial_remainder(&to_ascii_digits(text)))
}

/// A 5-6 digit run, only meaningful when the text came from a phone element.
pub fn find_short_run(text: &str) -> Option<PhoneNumber> {
    let text = to_ascii_digits(text);
    SHORT_RUN
        .captures(&text)
        .map(|caps| PhoneNumber::LowConfidence(caps[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_digit_count() {
        assert_eq!(format_digits("0312345678").as_deref(), Some("03-1234-5678"));
        assert_eq!(format_digits("09012345678").as_deref(), Some("090-1234-5678"));
        assert_eq!(format_digits("0120123456").as_deref(), Some("0120-123-456"));
        assert_eq!(format_digits("031234567"), None);
        assert_eq!(format_digits("03-1234-5678"), None);
    }

    #[test]
    fn finds_numbers_in_text() {
        assert_eq!(
            find_phone("お問い合わせ 03(1234)5678 まで").as_deref(),
            Some("03-1234-5678")
        );
        assert_eq!(
            find_phone("ＴＥＬ：０９０－１２３４－５６７８").as_deref(),
            Some("090-1234-5678")
        );
        assert_eq!(
            find_phone("フリーダイヤル 0120-123-456（平日9時〜）").as_deref(),
            Some("0120-123-456")
        );
    }

    #[test]
    fn labeled_number_beats_earlier_number() {
        assert_eq!(
            find_phone("FAX 03-9999-0000 電話番号 03-1234-5678").as_deref(),
            Some("03-1234-5678")
        );
    }

    #[test]
    fn rebuilds_free_dial_from_known_remainder() {
        assert_eq!(find_phone("フリーダイヤル 777-1234").as_deref(), Some("0120-777-1234"));
        assert_eq!(find_phone("〒777-1234 東京都"), None);
        assert_eq!(find_phone("受付 555-1234"), None);
    }

    #[test]
    fn postal_codes_are_never_free_dial() {
        assert_eq!(find_phone("郵便番号\n100-0005\n東京都千代田区丸の内"), None);
        assert_eq!(find_phone("千代田区 100-0005"), None);
        assert_eq!(find_phone_in_element("郵便番号：100-0005"), None);
        assert_eq!(find_phone_in_element("〒100-0005"), None);
        assert_eq!(
            find_phone_in_element("100-1234").as_deref(),
            Some("0120-100-1234")
        );
    }

    #[test]
    fn short_runs_are_low_confidence() {
        assert_eq!(
            find_short_run("内線 12345"),
            Some(PhoneNumber::LowConfidence("12345".to_string()))
        );
        assert_eq!(find_short_run("1234"), None);
        assert_eq!(find_phone("内線 12345"), None);
    }
}
