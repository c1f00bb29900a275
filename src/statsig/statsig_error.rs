use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsigError>;

#[derive(Error, Debug)]
pub enum StatsigError {
    #[error("Was unable to gracefully shutdown the Statsig store")]
    ShutdownFailure,
    #[error("Background sync task '{0}' panicked")]
    SyncTaskPanicked(&'static str),

    #[error("Request to {endpoint} failed")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {endpoint} returned status {status}")]
    RequestFailed {
        endpoint: String,
        status: u16,
    },
    #[error("Failed to parse {what}")]
    MalformedPayload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed config specs cache record: {0}")]
    MalformedCache(String),

    #[error("Content length invalid for id list '{0}'")]
    MissingContentLength(String),
    #[error("Seek range invalid for id list '{list_name}' (leading character {leading:?})")]
    InvalidRange {
        list_name: String,
        leading: Option<char>,
    },
}

impl StatsigError {
    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        // reqwest errors carry the full url, which may include query secrets
        StatsigError::Network {
            endpoint: endpoint.to_string(),
            source: source.without_url(),
        }
    }
}
