use tokio_util::sync::CancellationToken;

use crate::{
    configuration::{DelayRange, Settings},
    domain::{
        job_record::{or_unknown, short_description},
        phone::PhoneNumber,
        Document, JobRecord, PhoneConfidence, UrlClassifier,
    },
    error::ScrapeError,
    services::{
        fetcher::FetchPage,
        retry_policy::pause,
        strategies::{description, facility, location, phone_number, representative, website},
    },
};

/// Turns one detail page into a [`JobRecord`].
pub struct FieldResolver {
    classifier: UrlClassifier,
    detail_delay: DelayRange,
}

impl FieldResolver {
    pub fn new(settings: &Settings) -> Self {
        FieldResolver {
            classifier: UrlClassifier::new(&settings.site.target_domain),
            detail_delay: settings.politeness.detail_delay,
        }
    }

    /// Every field the page does not yield comes back as the sentinel.
    pub fn resolve(&self, url: &str, body: &str) -> Result<JobRecord, ScrapeError> {
        let document = Document::parse(url, body)?;

        let facility_name = facility::resolve(&document);
        let representative = representative::resolve(&document);
        let location = location::resolve(&document, facility_name.as_deref());
        let phone = phone_number::resolve(&document);
        let website_url = website::resolve(&document, &self.classifier);
        let job_description = or_unknown(description::resolve(&document).unwrap_or_default());

        let (phone_number, phone_confidence) = match phone {
            Some(PhoneNumber::Confirmed(number)) => (number, PhoneConfidence::Confirmed),
            Some(PhoneNumber::LowConfidence(digits)) => (digits, PhoneConfidence::Low),
            None => (String::new(), PhoneConfidence::Unknown),
        };

        let record = JobRecord {
            facility_name: or_unknown(facility_name.unwrap_or_default()),
            representative: or_unknown(representative.unwrap_or_default()),
            location: or_unknown(location.unwrap_or_default()),
            phone_number: or_unknown(phone_number),
            phone_confidence,
            website_url: or_unknown(website_url.unwrap_or_default()),
            short_description: short_description(&job_description),
            job_description,
            source_url: url.to_string(),
        };

        log::debug!(
            "Resolved {}: facility={}, representative={}, phone={}",
            url,
            record.facility_name,
            record.representative,
            record.phone_number
        );
        Ok(record)
    }

    /// Fetches a detail page after the politeness delay and resolves it.
    pub async fn scrape<F: FetchPage>(
        &self,
        url: &str,
        fetcher: &F,
        cancel: &CancellationToken,
    ) -> Result<JobRecord, ScrapeError> {
        if !self.classifier.is_in_scope(url) {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        pause(self.detail_delay.sample(), cancel).await?;
        let body = fetcher.fetch(url, cancel).await?;
        self.resolve(url, &body)
    }
}
