use std::error::Error as StdError;

use thiserror::Error;

/// Condition tags for prompt failures, for consumers that want to
/// branch on what went wrong rather than parse the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PromptErrorKind {
    /// The input stream could not supply a line (end of input, an I/O
    /// failure, or a corrupted stream such as non-UTF-8 bytes).
    ReadFailure,
    /// The prompt text could not be written to the output stream.
    WriteFailure,
    /// The terminal refused to toggle echo.
    EchoFailure,
}

/// A failure raised by one of the prompters.
///
/// Prompters guarantee that terminal echo has already been restored by
/// the time one of these surfaces, so callers may freely print the
/// message without it being swallowed by a no-echo terminal.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct PromptError {
    /// What part of the prompt cycle failed.
    pub kind: PromptErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl PromptError {
    /// Creates a read failure with no underlying cause (e.g. end of input).
    pub fn read_failure() -> Self {
        Self {
            kind: PromptErrorKind::ReadFailure,
            source: None,
            msg: "Failed to read value".to_string(),
        }
    }

    /// Creates a read failure that retains the originating I/O error.
    pub fn read_failure_from(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            kind: PromptErrorKind::ReadFailure,
            source: Some(Box::new(source)),
            msg: "Failed to read value".to_string(),
        }
    }

    /// Creates a write failure that retains the originating I/O error.
    pub fn write_failure_from(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            kind: PromptErrorKind::WriteFailure,
            source: Some(Box::new(source)),
            msg: "Failed to write prompt".to_string(),
        }
    }

    /// Creates an echo-toggle failure that retains the originating I/O error.
    pub fn echo_failure_from(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            kind: PromptErrorKind::EchoFailure,
            source: Some(Box::new(source)),
            msg: "Failed to toggle terminal echo".to_string(),
        }
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_read_failure_message() {
        let err = PromptError::read_failure();
        assert_eq!(err.kind, PromptErrorKind::ReadFailure);
        assert!(err.to_string().contains("Failed to read value"));
    }

    #[test]
    fn test_read_failure_retains_source() {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, "bad bytes");
        let err = PromptError::read_failure_from(io_err);
        assert_eq!(err.kind, PromptErrorKind::ReadFailure);
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_write_failure_kind() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err = PromptError::write_failure_from(io_err);
        assert_eq!(err.kind, PromptErrorKind::WriteFailure);
    }
}
