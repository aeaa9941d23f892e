use thiserror::Error;

/// Every way a call to the remote tracker can fail.
///
/// Transport failures, non-success statuses and bodies that do not match the
/// expected shape all surface as this one type; callers decide what a failed
/// call means for their own workflow.
#[derive(Error, Debug)]
pub enum RemoteServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Request timeout after {attempts} attempts")]
    Timeout { attempts: usize },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl RemoteServiceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteServiceError::RateLimitExceeded { .. } => true,
            RemoteServiceError::ServerError { status, .. } if *status >= 500 => true,
            RemoteServiceError::Timeout { .. } => true,
            RemoteServiceError::RequestFailed(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    /// HTTP status reported by the tracker, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteServiceError::RateLimitExceeded { .. } => Some(429),
            RemoteServiceError::AuthenticationFailed { .. } => Some(401),
            RemoteServiceError::Forbidden { .. } => Some(403),
            RemoteServiceError::NotFound { .. } => Some(404),
            RemoteServiceError::BadRequest { .. } => Some(400),
            RemoteServiceError::ServerError { status, .. }
            | RemoteServiceError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            RemoteServiceError::AuthenticationFailed { .. } => {
                Some("Check the username and password configured for this source")
            }
            RemoteServiceError::Forbidden { .. } => {
                Some("The service account lacks permission for this project")
            }
            RemoteServiceError::RateLimitExceeded { .. } => {
                Some("Reduce request frequency and try again later")
            }
            RemoteServiceError::NotFound { .. } => Some("Check if the issue key or id is correct"),
            RemoteServiceError::BadRequest { .. } => {
                Some("Review the ticket fields mapped for this source")
            }
            RemoteServiceError::Timeout { .. } => {
                Some("Check your network connection or try again later")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteServiceError>;
