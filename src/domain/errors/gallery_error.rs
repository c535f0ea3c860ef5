//! Gallery listing error types.

use thiserror::Error;

/// Errors raised while fetching a page of the listing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GalleryError {
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("malformed listing response: {message}")]
    Decode { message: String },

    #[error("invalid gallery URL: {message}")]
    InvalidUrl { message: String },

    #[error("unexpected gallery error: {message}")]
    Unexpected { message: String },
}

impl GalleryError {
    /// Creates HTTP status error.
    #[must_use]
    pub const fn http(status: u16) -> Self {
        Self::Http { status }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether retrying the same request can succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status } => *status >= 500 || *status == 429,
            Self::Decode { .. } | Self::InvalidUrl { .. } | Self::Unexpected { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_http_message_matches_listing_client() {
        assert_eq!(GalleryError::http(404).to_string(), "HTTP error! status: 404");
    }

    #[test_case(GalleryError::network("reset"), true ; "network")]
    #[test_case(GalleryError::http(503), true ; "server_error")]
    #[test_case(GalleryError::http(429), true ; "rate_limited")]
    #[test_case(GalleryError::http(400), false ; "bad_request")]
    #[test_case(GalleryError::decode("eof"), false ; "decode")]
    fn test_is_recoverable(error: GalleryError, expected: bool) {
        assert_eq!(error.is_recoverable(), expected);
    }
}
