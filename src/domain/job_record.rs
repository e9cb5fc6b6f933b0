use serde::Serialize;

use crate::domain::normalizer::{clean_address, clean_description, clean_facility_name, clean_person_name};

/// Stands in for every field the page did not yield.
pub const UNKNOWN: &str = "情報なし";
pub const SHORT_DESCRIPTION_LEN: usize = 100;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneConfidence {
    Confirmed,
    Low,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub facility_name: String,
    pub representative: String,
    pub location: String,
    pub phone_number: String,
    pub phone_confidence: PhoneConfidence,
    pub website_url: String,
    pub job_description: String,
    pub short_description: String,
    pub source_url: String,
}

impl JobRecord {
    pub fn unknown(source_url: &str) -> Self {
        JobRecord {
            facility_name: UNKNOWN.to_string(),
            representative: UNKNOWN.to_string(),
            location: UNKNOWN.to_string(),
            phone_number: UNKNOWN.to_string(),
            phone_confidence: PhoneConfidence::Unknown,
            website_url: UNKNOWN.to_string(),
            job_description: UNKNOWN.to_string(),
            short_description: UNKNOWN.to_string(),
            source_url: source_url.to_string(),
        }
    }

    /// Runs the field cleaners again, for consumers that display records.
    pub fn normalized(self) -> Self {
        let job_description = or_unknown(clean_description(&self.job_description));
        JobRecord {
            facility_name: or_unknown(clean_facility_name(&self.facility_name)),
            representative: or_unknown(clean_person_name(&self.representative)),
            location: or_unknown(clean_address(&self.location)),
            short_description: short_description(&job_description),
            job_description,
            ..self
        }
    }
}

pub fn or_unknown(value: String) -> String {
    match value.trim().is_empty() {
        true => UNKNOWN.to_string(),
        false => value,
    }
}

pub fn short_description(description: &str) -> String {
    match description.chars().count() > SHORT_DESCRIPTION_LEN {
        true => {
            let head: String = description.chars().take(SHORT_DESCRIPTION_LEN).collect();
            format!("{}{}", head, ELLIPSIS)
        }
        false => description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_truncates_by_code_point() {
        let long = "看".repeat(150);
        let short = short_description(&long);

        assert_eq!(short.chars().count(), SHORT_DESCRIPTION_LEN + ELLIPSIS.len());
        assert!(short.ends_with(ELLIPSIS));
        assert_eq!(short_description("外来業務"), "外来業務");
        assert_eq!(short_description(&"a".repeat(100)), "a".repeat(100));
    }

    #[test]
    fn unknown_record_has_every_field() {
        let record = JobRecord::unknown("https://toranet.jp/job_detail/1");
        let json = serde_json::to_value(&record).unwrap();

        for key in [
            "facility_name",
            "representative",
            "location",
            "phone_number",
            "website_url",
            "job_description",
            "short_description",
        ] {
            assert_eq!(json[key], UNKNOWN, "{key}");
        }
        assert_eq!(json["phone_confidence"], "unknown");
        assert_eq!(json["source_url"], "https://toranet.jp/job_detail/1");
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let record = JobRecord {
            facility_name: " 渋谷クリニックの求人詳細 ".to_string(),
            representative: "院長 山田 太郎 東京都渋谷区".to_string(),
            location: "所在地：東京都渋谷区1-2-3 TEL 03-1234-5678".to_string(),
            job_description: "外来\n\n\n夜勤なし".to_string(),
            ..JobRecord::unknown("https://toranet.jp/job_detail/1")
        };

        let once = record.normalized();
        assert_eq!(once.facility_name, "渋谷クリニック");
        assert_eq!(once.representative, "山田 太郎");
        assert_eq!(once.location, "東京都渋谷区1-2-3");
        assert_eq!(once.short_description, "外来\n\n夜勤なし");
        assert_eq!(once.clone().normalized(), once);
    }

    #[test]
    fn sentinel_survives_normalization() {
        let record = JobRecord::unknown("https://toranet.jp/job_detail/1").normalized();
        assert_eq!(record, JobRecord::unknown("https://toranet.jp/job_detail/1"));
    }
}
