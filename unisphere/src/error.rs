use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Statistics for {array_id} are older than {minutes} minutes (last available at {last_available})")]
    RecencyNotMet {
        array_id: String,
        minutes: u32,
        last_available: i64,
    },
    #[error("Unisphere returned {status} for {url}: {message}")]
    Status { status: u16, url: String, message: String },
    #[error("Request to Unisphere failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode Unisphere response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unisphere response is missing {0}")]
    MissingField(String),
    #[error("Invalid Unisphere URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Failed to read CA certificate {path:?}: {source}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_recency_not_met(&self) -> bool {
        matches!(self, ApiError::RecencyNotMet { .. })
    }
}
