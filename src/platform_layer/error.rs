use std::io;

// Errors raised by the platform side: terminal I/O, unparseable operator input,
// and failures writing exported galleries.
#[derive(Debug)]
pub enum PlatformError {
    Io(io::Error),
    InvalidInput(String),
    ExportFailed(String),
    // The event handler's lock was poisoned by a panic on another thread.
    HandlerUnavailable,
}

impl From<io::Error> for PlatformError {
    fn from(err: io::Error) -> Self {
        PlatformError::Io(err)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Io(e) => write!(f, "I/O Error: {}", e),
            PlatformError::InvalidInput(s) => write!(f, "Invalid Input: {}", s),
            PlatformError::ExportFailed(s) => write!(f, "Export Failed: {}", s),
            PlatformError::HandlerUnavailable => write!(f, "Event handler is unavailable"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
