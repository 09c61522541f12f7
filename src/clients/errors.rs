use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Upstream request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("LastFM error {code}: {message}")]
    LastFMError { code: u32, message: String },

    #[error("LastFM Deserialization error: {0}")]
    LastFMDeserializationError(#[from] serde_json::Error),

    #[error("No recent tracks for user {0:?}")]
    NoRecentTracks(String),

    #[error("Image fetch from {url} failed with status {status}")]
    ImageFetch {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected upstream response: {0}")]
    InvalidResponse(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else {
            Error::Http(err)
        }
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
