//! Error types for hardware collaborators and score storage

use thiserror::Error;

/// Failure reported by a hardware collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Peripheral was not detected at startup
    #[error("{0} not present")]
    Absent(&'static str),
    /// Transient bus or device failure
    #[error("bus error: {0}")]
    Bus(String),
}

/// Failure reading or writing the score record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt score record on line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}
