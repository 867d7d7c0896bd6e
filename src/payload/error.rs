//! Payload error types
//!
//! Errors raised while decoding and normalizing a single query payload.
//! Any of these aborts that one query only.

use thiserror::Error;

/// Errors that can occur while normalizing a query payload
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The payload JSON does not match the expected shape
    #[error("Invalid payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The timezone is not a known IANA zone name
    #[error("Invalid payload: unknown timezone '{0}'")]
    UnknownTimezone(String),
}

/// Result type for payload operations
pub type PayloadResult<T> = Result<T, PayloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PayloadError::UnknownTimezone("Mars/Olympus".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid payload: unknown timezone 'Mars/Olympus'"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: PayloadError = json_err.into();
        assert!(matches!(err, PayloadError::Decode(_)));
        assert!(err.to_string().starts_with("Invalid payload"));
    }
}
