use std::os::unix::io::RawFd;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Poll error: {0}")]
    PollError(String),

    #[error("File descriptor {0} cannot be watched by select()")]
    FdOutOfRange(RawFd),
}

pub type Result<T> = std::result::Result<T, LoopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: LoopError = std::io::Error::from(std::io::ErrorKind::Interrupted).into();
        assert!(matches!(err, LoopError::IoError(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LoopError::FdOutOfRange(4096).to_string(),
            "File descriptor 4096 cannot be watched by select()"
        );
        assert_eq!(
            LoopError::ConfigError("bad".to_string()).to_string(),
            "Configuration error: bad"
        );
    }
}
