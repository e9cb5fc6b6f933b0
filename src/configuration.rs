use std::{path::PathBuf, time::Duration};

use rand::Rng;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// The listing walk never goes past this many pages, whatever the config says.
pub const HARD_PAGE_CAP: u32 = 10;
pub const MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site: SiteSettings,
    pub search: SearchSettings,
    pub http: HttpSettings,
    pub politeness: PolitenessSettings,
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub base_url: String,
    pub target_domain: String,
    pub region: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            base_url: "https://toranet.jp".to_string(),
            target_domain: "toranet.jp".to_string(),
            region: "tokyo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_jobs: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub concurrency: usize,
    /// Treat the listing page itself as the only detail page.
    pub direct_listing: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            max_jobs: 10,
            max_pages: HARD_PAGE_CAP,
            concurrency: 1,
            direct_listing: false,
        }
    }
}

impl SearchSettings {
    pub fn max_jobs(&self) -> usize {
        self.max_jobs.max(1)
    }

    pub fn page_cap(&self) -> u32 {
        self.max_pages.clamp(1, HARD_PAGE_CAP)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            max_retries: 5,
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        DelayRange { min_ms, max_ms }
    }

    pub fn sample(&self) -> Duration {
        match self.max_ms > self.min_ms {
            true => Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms)),
            false => Duration::from_millis(self.min_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolitenessSettings {
    /// Waited before every outbound request, first attempt included.
    pub request_jitter: DelayRange,
    pub page_delay: DelayRange,
    pub detail_delay: DelayRange,
    pub retry_backoff_base_ms: u64,
    pub retry_backoff_max_ms: u64,
}

impl Default for PolitenessSettings {
    fn default() -> Self {
        PolitenessSettings {
            request_jitter: DelayRange::new(100, 500),
            page_delay: DelayRange::new(500, 1500),
            detail_delay: DelayRange::new(500, 2000),
            retry_backoff_base_ms: 2000,
            retry_backoff_max_ms: 10_000,
        }
    }
}

impl PolitenessSettings {
    /// No waiting at all. Only sensible against a local server.
    pub fn none() -> Self {
        PolitenessSettings {
            request_jitter: DelayRange::new(0, 0),
            page_delay: DelayRange::new(0, 0),
            detail_delay: DelayRange::new(0, 0),
            retry_backoff_base_ms: 0,
            retry_backoff_max_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub enabled: bool,
    /// Log fetched bodies at trace level.
    pub dump_html: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    get_configuration_from(configuration_directory)
}

pub fn get_configuration_from(directory: PathBuf) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::{DelayRange, SearchSettings, HARD_PAGE_CAP};

    #[test]
    fn page_cap_never_exceeds_hard_cap() {
        let search = SearchSettings {
            max_pages: 50,
            ..SearchSettings::default()
        };
        assert_eq!(search.page_cap(), HARD_PAGE_CAP);

        let search = SearchSettings {
            max_pages: 0,
            ..SearchSettings::default()
        };
        assert_eq!(search.page_cap(), 1);
    }

    #[test]
    fn concurrency_is_bounded() {
        let search = SearchSettings {
            concurrency: 16,
            ..SearchSettings::default()
        };
        assert_eq!(search.concurrency(), 4);
    }

    #[test]
    fn delay_range_stays_within_bounds() {
        let range = DelayRange::new(10, 20);
        for _ in 0..50 {
            let d = range.sample().as_millis();
            assert!((10..=20).contains(&d));
        }
        assert_eq!(DelayRange::new(7, 3).sample().as_millis(), 7);
    }

    #[test]
    fn missing_configuration_file_falls_back_to_defaults() {
        let settings =
            super::get_configuration_from(std::env::temp_dir().join("toraba-no-such-dir")).unwrap();

        assert_eq!(settings.site.target_domain, "toranet.jp");
        assert_eq!(settings.search.max_jobs, 10);
        assert_eq!(settings.http.max_retries, 5);
    }
}
