//! Failures raised while talking to the price API

/// Normalized failure of a price API request.
///
/// The `Display` text of each variant is the message shown to the user in
/// the dashboard's error banner.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("API Error: {status} - {}", .message.as_deref().unwrap_or("Unknown error"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// No response was received, including timeouts.
    #[error("No response received from server. Please check your internet connection.")]
    Network(String),

    /// The request could not be built or sent.
    #[error("Request Error: {0}")]
    Request(String),

    /// The body did not match the expected shape.
    #[error("Unexpected Error: Invalid data structure received from API")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::Request(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Http {
                status: status.as_u16(),
                message: None,
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
