//! Error types for density-matrix state operations

use thiserror::Error;

/// Errors that can occur inside the state engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Dimension mismatch between a state and an operand
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Memory allocation overflow
    #[error("Cannot allocate packed density matrix for {num_qubits} qubits")]
    AllocationError { num_qubits: usize },

    /// The dispatcher received a gate it cannot apply in this context
    #[error("Unknown gate '{0}' in dispatch")]
    UnknownGate(String),

    /// The channel sub-dispatcher was exhausted
    #[error("Unknown channel '{0}' in dispatch")]
    UnknownChannel(String),

    /// Error from circuit-level construction or parameter resolution
    #[error(transparent)]
    Core(#[from] rhoq_core::CoreError),
}

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;
