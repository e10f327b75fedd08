use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: check the Dashboard API key")]
    AuthError,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ApiError { status, .. } => Some(*status),
            ApiError::AuthError => Some(401),
            ApiError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The only status code resources treat specially
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Builds the error for a non-success response body
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::AuthError;
        }

        let errors = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.errors)
            .unwrap_or_default();
        let message = if errors.is_empty() {
            body.trim().to_string()
        } else {
            errors.join("; ")
        };

        ApiError::ApiError {
            status,
            message,
            errors,
        }
    }
}

/// Dashboard error envelope: `{"errors": ["..."]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}
