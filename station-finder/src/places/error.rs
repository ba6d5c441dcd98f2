//! Places client error types.

/// Errors from the Places HTTP client (and the mock that stands in for it).
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    /// HTTP request failed (network error, client timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing API key
    #[error("unauthorized: check API_KEY_PLACES")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by Places API")]
    RateLimited,

    /// The place ID is unknown or no longer valid
    #[error("place not found")]
    PlaceNotFound,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be parsed or converted
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Client could not be built from its settings
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The call did not settle within its deadline
    #[error("request timed out")]
    Timeout,

    /// Service unavailable for a reason not covered above
    #[error("places service unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PlacesError::PlaceNotFound;
        assert_eq!(err.to_string(), "place not found");

        let err = PlacesError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = PlacesError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected string"));

        assert_eq!(PlacesError::Timeout.to_string(), "request timed out");

        let err = PlacesError::InvalidConfig("API key is not a valid header value".into());
        assert_eq!(
            err.to_string(),
            "invalid client configuration: API key is not a valid header value"
        );
    }
}
