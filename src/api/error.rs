//! Error handling for the API module

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to decode a JSON document from the server
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The server answered 2xx but flagged the operation as unsuccessful.
    #[error("Request rejected by server: {message}")]
    Rejected { message: String },

    /// The response envelope did not carry the expected `data` payload.
    #[error("Response from {endpoint} is missing its data payload")]
    MissingData { endpoint: String },

    /// Some entries of a listing did not have the expected shape.
    #[error("{discarded} malformed entries in response from {endpoint}")]
    Malformed { endpoint: String, discarded: usize },

    /// The request was abandoned because its view went away.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        ApiError::Http {
            status,
            message: extract_server_message(&message).unwrap_or(message),
        }
    }

    /// Whether the error means the stored token is missing, stale or not allowed.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }

    /// A short message suitable for showing to the user.
    ///
    /// Transport and authentication failures collapse into generic wording;
    /// server-side rejections keep the server message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status: 401, .. } | ApiError::Http { status: 403, .. } => {
                "Your session is invalid or has expired. Please log in again.".to_string()
            }
            ApiError::Http { status, .. } if (500..=599).contains(status) => {
                "The server is having trouble right now. Please try again.".to_string()
            }
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Rejected { message } if !message.is_empty() => message.clone(),
            ApiError::Cancelled => "Request cancelled.".to_string(),
            _ => "Something went wrong while talking to the server. Please try again.".to_string(),
        }
    }
}

/// Pulls `message` out of a JSON error body, if the body is one.
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
