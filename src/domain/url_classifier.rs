use url::Url;

pub const DENY_FRAGMENTS: [&str; 5] = ["favorite_jobs", "login", "register", "contact", "about"];
pub const JOB_TOKENS: [&str; 3] = ["job", "kyujin", "prefectures"];
pub const DETAIL_TOKEN: &str = "job_detail";

#[derive(Debug, Clone)]
pub struct UrlClassifier {
    target_domain: String,
}

impl UrlClassifier {
    pub fn new(target_domain: &str) -> Self {
        UrlClassifier {
            target_domain: target_domain.to_lowercase(),
        }
    }

    pub fn target_domain(&self) -> &str {
        &self.target_domain
    }

    pub fn is_in_scope(&self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }

        if let Some(fragment) = DENY_FRAGMENTS.iter().find(|&&d| url.contains(d)) {
            log::debug!("Skipping url {} (denied fragment '{}')", url, fragment);
            return false;
        }

        let valid = (self.is_target_domain(url) && JOB_TOKENS.iter().any(|&t| url.contains(t)))
            || url.contains(DETAIL_TOKEN);

        if !valid {
            log::debug!("Skipping url {} (not a job resource)", url);
        }
        valid
    }

    pub fn is_target_domain(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed_url) => match parsed_url.host_str() {
                Some("") | None => false,
                Some(host) => {
                    let host = host.to_lowercase();
                    host == self.target_domain
                        || host
                            .strip_suffix(&self.target_domain)
                            .is_some_and(|rest| rest.ends_with('.'))
                }
            },
            Err(_) => false,
        }
    }
}
