use thiserror::Error;

/// Main service error type
///
/// Companion behavior itself never fails; these cover the outer surfaces
/// (configuration, the WebSocket protocol, serialization).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid client message: {message}")]
    InvalidMessage { message: String },

    #[error("Serialization failed")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Config { .. } => "config_error",
            ServiceError::InvalidMessage { .. } => "invalid_message",
            ServiceError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether a client that triggered this error can keep using its session
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ServiceError::InvalidMessage { .. })
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_recoverability() {
        let err = ServiceError::InvalidMessage {
            message: "missing field `text`".to_string(),
        };
        assert_eq!(err.error_code(), "invalid_message");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Invalid client message: missing field `text`"
        );

        let err = ServiceError::Config {
            message: "tick_ms must be positive".to_string(),
        };
        assert_eq!(err.error_code(), "config_error");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_serde_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ServiceError = parse.unwrap_err().into();
        assert_eq!(err.error_code(), "serialization_error");
        assert!(!err.is_recoverable());
    }
}
