//! Error types for rhoq circuit construction

use thiserror::Error;

/// Errors that can occur while building gates, circuits and Hamiltonians
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Invalid qubit index used
    #[error("Invalid qubit index {index}: circuit has only {num_qubits} qubits")]
    InvalidQubit { index: usize, num_qubits: usize },

    /// Gate applied to wrong number of qubits
    #[error("Gate '{gate}' requires {expected} object qubits, but {actual} were provided")]
    InvalidQubitCount {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// A qubit is listed twice, or a control overlaps an object qubit
    #[error("Qubit {0} listed more than once in gate operation")]
    QubitConflict(usize),

    /// A parameterized gate was evaluated against a binding missing one of its names
    #[error("Parameter '{0}' not found in binding")]
    MissingParameter(String),

    /// The Hermitian adjoint of this gate does not exist
    #[error("Gate '{0}' has no Hermitian adjoint")]
    NotInvertible(String),

    /// Generic validation error
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Create an invalid qubit error
    pub fn invalid_qubit(index: usize, num_qubits: usize) -> Self {
        Self::InvalidQubit { index, num_qubits }
    }

    /// Create an invalid qubit count error
    pub fn invalid_qubit_count(gate: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQubitCount {
            gate: gate.into(),
            expected,
            actual,
        }
    }
}

/// Result type for rhoq-core operations
pub type Result<T> = std::result::Result<T, CoreError>;
