/// Error types for the FREQ dashboard engine
use thiserror::Error;

/// Main error type for dashboard operations
#[derive(Error, Debug)]
pub enum FreqError {
    /// The transport could not complete the request
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} returned by {url}")]
    Status { status: u16, url: String },

    /// The request exceeded the configured lifetime
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Failed to decode a response body
    #[error("Failed to parse response: {0}")]
    ResponseParse(#[from] serde_json::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// A date range whose start lies after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Stage name not part of the workflow
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// Stage graph contains a cycle through the named stage
    #[error("Stage graph has a cycle through {0}")]
    CyclicStageGraph(String),

    /// Color string that is not `#rgb` or `#rrggbb`
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Durable client storage refused a read or write
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Type alias for Results using FreqError
pub type Result<T> = std::result::Result<T, FreqError>;
