use std::fmt;
use thiserror::Error;

/// The error type for IoT Hub service operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input (client, id, spec) was absent; detected before any I/O
    InvalidArg,

    /// The service reported that the configuration already exists
    ConfigurationExist,

    /// The service reported that the configuration does not exist
    ConfigurationNotExist,

    /// The signing or transport layer could not be constructed or invoked
    HttpApi,

    /// The response body could not be parsed, or a request body could not be built
    Json,

    /// Unexpected errors (request building, unmapped status codes, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message without the kind prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this error was reported by the service for a specific configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ConfigurationExist | ErrorKind::ConfigurationNotExist
        )
    }
}

// Convenience constructors
impl Error {
    /// Create an invalid argument error
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArg, message)
    }

    /// Create a configuration exist error
    pub fn configuration_exist(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationExist, message)
    }

    /// Create a configuration not exist error
    pub fn configuration_not_exist(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationNotExist, message)
    }

    /// Create an http api error
    pub fn http_api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HttpApi, message)
    }

    /// Create a json error
    pub fn json(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Json, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArg => write!(f, "invalid argument"),
            ErrorKind::ConfigurationExist => write!(f, "configuration exists"),
            ErrorKind::ConfigurationNotExist => write!(f, "configuration does not exist"),
            ErrorKind::HttpApi => write!(f, "http api error"),
            ErrorKind::Json => write!(f, "json error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ErrorKind::InvalidArg, "invalid argument")]
    #[test_case(ErrorKind::ConfigurationExist, "configuration exists")]
    #[test_case(ErrorKind::ConfigurationNotExist, "configuration does not exist")]
    #[test_case(ErrorKind::HttpApi, "http api error")]
    #[test_case(ErrorKind::Json, "json error")]
    #[test_case(ErrorKind::Unexpected, "unexpected error")]
    fn test_error_kind_display(kind: ErrorKind, expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn test_error_display_and_source() {
        let err = Error::http_api("failed to send request")
            .with_source(anyhow::anyhow!("connection refused"));

        assert_eq!(err.kind(), ErrorKind::HttpApi);
        assert_eq!(err.message(), "failed to send request");
        assert_eq!(err.to_string(), "http api error: failed to send request");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_serde_json_error_is_json_kind() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Json);
    }
}
