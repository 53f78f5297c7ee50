use reqwest::StatusCode;

/// Failures of the tender/bid data source.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The only error a report request surfaces to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        #[source]
        source: ApiError,
    },
}

impl ReportError {
    pub fn fetch(collection: &'static str, source: ApiError) -> Self {
        ReportError::Fetch { collection, source }
    }
}
