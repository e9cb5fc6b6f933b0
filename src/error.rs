#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("request to {url} timed out")]
    FetchTimeout { url: String },

    #[error("HTTP error {status} from {url}")]
    FetchHttpError { url: String, status: u16 },

    #[error("transport error on {url}: {message}")]
    FetchTransportError { url: String, message: String },

    #[error("failed to parse {url}: {reason}")]
    ParseError { url: String, reason: String },

    #[error("no job links found on {0}, the site layout may have changed")]
    NoLinksFound(String),

    #[error("gave up on {url} after {attempts} attempts: {cause}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        cause: Box<ScrapeError>,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("could not build http client: {0}")]
    ClientSetup(String),
}

impl ScrapeError {
    /// 503, timeouts and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScrapeError::FetchHttpError { status, .. } => *status == 503,
            ScrapeError::FetchTimeout { .. } | ScrapeError::FetchTransportError { .. } => true,
            _ => false,
        }
    }
}
