//! Error types for persisted run output.

use std::fmt;
use std::io;

/// Errors that can occur while writing or reading run output files.
#[derive(Debug)]
pub enum RecordError {
    /// An I/O error occurred creating, writing, or reading a file.
    Io(io::Error),
    /// A file could not be serialized or parsed as JSON.
    Json(serde_json::Error),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for RecordError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_is_source() {
        let err = RecordError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("I/O error"));
        assert!(err.source().is_some());
    }

    #[test]
    fn json_error_displays() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = RecordError::from(parse);
        assert!(err.to_string().starts_with("JSON error"));
    }
}
