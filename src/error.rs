use thiserror::Error;

/// Failures at the collaborator boundary (record retrieval, audit sink).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("storage io error: {0}")]
    Io(String),

    #[error("malformed record data: {0}")]
    Parse(String),

    #[error("backend request failed: {0}")]
    Http(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to retrieve analytics data: {0}")]
    Source(#[from] SourceError),
}
