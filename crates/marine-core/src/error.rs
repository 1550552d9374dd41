//! Error types for Marine Insights

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network unreachable, timeout, or a body that could not be read/decoded
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {path}")]
    HttpStatus { status: u16, path: String },

    /// The backend answered and put an explicit `error` field in the body
    #[error("{0}")]
    Backend(String),

    /// Body decoded but matches none of the known shapes
    #[error("Unexpected response shape: {0}")]
    SchemaMismatch(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure came from the wire rather than from local input.
    ///
    /// A malformed body counts as a transport fault.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Json(_))
    }

    /// Whether the backend itself reported the failure in the response body
    pub fn is_backend_reported(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = Error::HttpStatus {
            status: 503,
            path: "/predict/csv".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from /predict/csv");
        assert!(!err.is_transport());
        assert!(!err.is_backend_reported());
    }

    #[test]
    fn test_backend_error_shows_raw_message() {
        let err = Error::Backend("CSV must contain columns: date, value".into());
        assert_eq!(err.to_string(), "CSV must contain columns: date, value");
        assert!(err.is_backend_reported());
    }

    #[test]
    fn test_malformed_json_counts_as_transport() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(err.is_transport());
    }
}
