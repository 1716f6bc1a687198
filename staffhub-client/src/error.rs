//! Client error types

use shared::error::AppError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => AppError::not_authenticated(),
            ClientError::Forbidden(msg) => {
                AppError::not_authenticated().with_detail("reason", msg)
            }
            ClientError::NotFound(resource) => AppError::not_found(resource),
            ClientError::Validation(msg) => AppError::validation(msg),
            ClientError::InvalidResponse(msg) => AppError::invalid_format(msg),
            ClientError::Serialization(e) => AppError::invalid_format(e.to_string()),
            ClientError::Http(e) => AppError::backend(e.to_string()),
            ClientError::Internal(msg) => AppError::backend(msg),
            ClientError::Config(msg) => AppError::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_maps_to_app_error_taxonomy() {
        let err: AppError = ClientError::NotFound("Employee e1".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = ClientError::Unauthorized.into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err: AppError = ClientError::Validation("bad payload".to_string()).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err: AppError = ClientError::InvalidResponse("not an object".to_string()).into();
        assert_eq!(err.code, ErrorCode::InvalidFormat);

        let err: AppError = ClientError::Internal("boom".to_string()).into();
        assert_eq!(err.code, ErrorCode::BackendError);
    }
}
