use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Comment service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Comment service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Comment service did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Invalid comment service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn from_request(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Request(e)
        }
    }
}
