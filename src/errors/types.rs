//! Error type definitions for m3u-probe

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist acquisition errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Reachability check errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Playback sink errors
    #[error("Playback error: {message}")]
    Playback { message: String },

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while acquiring raw playlist text
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request did not finish in time
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// The request could not be sent or the body could not be read
    #[error("Network error: {url} - {message}")]
    Network { url: String, message: String },

    /// The body was not valid text
    #[error("Decode error: {origin} - {message}")]
    Decode { origin: String, message: String },

    /// A local playlist file could not be read
    #[error("Unreadable file: {path} - {message}")]
    File { path: String, message: String },
}

/// Errors raised by a single channel's reachability check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The request failed before a status was received
    #[error("Network error: {message}")]
    Network { message: String },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a playback error
    pub fn playback<S: Into<String>>(message: S) -> Self {
        Self::Playback {
            message: message.into(),
        }
    }
}

impl SourceError {
    pub fn network<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl ProbeError {
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::validation("no playlist source given");
        assert_eq!(err.to_string(), "Validation error: no playlist source given");

        let err: AppError = SourceError::Http {
            status: 404,
            url: "http://example.com/list.m3u".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Source error: HTTP error: 404 - http://example.com/list.m3u"
        );

        let err: AppError = ProbeError::network("connection refused").into();
        assert_eq!(err.to_string(), "Probe error: Network error: connection refused");
    }
}
