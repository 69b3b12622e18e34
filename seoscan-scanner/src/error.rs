use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Rate limited (429) for {0}")]
    RateLimited(String),

    #[error("Timeout for {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
