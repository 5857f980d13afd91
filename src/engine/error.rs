use std::fmt;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
            EngineState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Errors reported by the engine facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The audio device could not be opened or started. Safe to retry.
    Initialization(String),
    /// A note or parameter call arrived outside `Ready`; it was dropped.
    NotReady { state: EngineState },
    /// Note name outside the 128-note table; nothing was triggered.
    InvalidNote(String),
    /// The command queue to the audio thread is full; the command was dropped.
    QueueFull,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Initialization(reason) => {
                write!(f, "Audio initialization failed: {}", reason)
            }
            EngineError::NotReady { state } => {
                write!(f, "Engine is not ready (state: {})", state)
            }
            EngineError::InvalidNote(name) => write!(f, "Unknown note '{}'", name),
            EngineError::QueueFull => write!(f, "Command queue is full"),
        }
    }
}

impl std::error::Error for EngineError {}
