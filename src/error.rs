//! Central error types for Ferricord.
//!
//! All errors implement `Serialize` so they can cross the Tauri IPC
//! boundary as plain message strings.

use serde::Serialize;
use thiserror::Error;

/// Main error type for Ferricord operations.
#[derive(Error, Debug)]
pub enum FerricordError {
    /// Window management failed
    #[error("Window error: {0}")]
    Window(#[from] tauri::Error),

    /// Reading or writing persisted state failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding/encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A capture source selection flow is already active
    #[error("A capture source selection is already in progress")]
    PickerBusy,

    /// Favicon payload could not be decoded
    #[error("Invalid favicon: {0}")]
    Favicon(String),

    /// URL failed to parse
    #[error("Invalid URL: {0}")]
    Url(String),

    /// A privileged command was invoked from the wrong window
    #[error("Operation not permitted for window \"{0}\"")]
    Forbidden(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Serialize as the error message string, which is what the webview side
/// receives from a rejected invoke.
impl Serialize for FerricordError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<String> for FerricordError {
    fn from(msg: String) -> Self {
        FerricordError::Other(msg)
    }
}

impl From<&str> for FerricordError {
    fn from(msg: &str) -> Self {
        FerricordError::Other(msg.to_string())
    }
}

/// Type alias for Results using FerricordError.
pub type FerricordResult<T> = Result<T, FerricordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FerricordError::Favicon("bad payload".to_string());
        assert_eq!(err.to_string(), "Invalid favicon: bad payload");
    }

    #[test]
    fn test_error_serialization() {
        let err = FerricordError::PickerBusy;
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("already in progress"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FerricordError = io_err.into();
        assert!(matches!(err, FerricordError::Persistence(_)));
    }

    #[test]
    fn test_from_string() {
        let err: FerricordError = "boom".into();
        assert!(matches!(err, FerricordError::Other(_)));
    }

    #[test]
    fn test_forbidden_names_the_window() {
        let err = FerricordError::Forbidden("settings".to_string());
        assert!(err.to_string().contains("settings"));
    }
}
