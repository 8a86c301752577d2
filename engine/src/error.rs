use std::fmt;

/// Errors reported by a script execution service.
#[derive(Debug)]
pub enum EngineError {
    /// The service was used before `initialize` succeeded.
    NotInitialized,
    AlreadyInitialized,
    /// `execute` was handed an empty code string.
    EmptyCode,
    /// The configured heap could not be set up.
    HeapAllocation(usize),
    ExecutionFailed(String),
    Io(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotInitialized => write!(f, "engine not initialized"),
            EngineError::AlreadyInitialized => write!(f, "engine already initialized"),
            EngineError::EmptyCode => write!(f, "empty code string"),
            EngineError::HeapAllocation(size) => {
                write!(f, "failed to allocate {} byte heap", size)
            }
            EngineError::ExecutionFailed(msg) => write!(f, "execution failed: {}", msg),
            EngineError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::Io(error.to_string())
    }
}
