//! Error types for the gradient and sampling engines

use thiserror::Error;

/// Errors that can occur while evaluating expectations, gradients or shots
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Forward and adjoint circuits differ in length
    #[error("Circuit length mismatch: forward has {expected} gates, adjoint has {actual}")]
    CircuitLengthMismatch { expected: usize, actual: usize },

    /// A measurement key has no column in the sampling key map
    #[error("Measurement key '{0}' not present in key map")]
    UnknownMeasureKey(String),

    /// The worker thread pool could not be constructed
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Error from the state engine
    #[error(transparent)]
    State(#[from] rhoq_state::StateError),

    /// Error from circuit construction or parameter resolution
    #[error(transparent)]
    Core(#[from] rhoq_core::CoreError),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
