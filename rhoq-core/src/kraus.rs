//! Kraus operator value type
//!
//! Quantum channels are described by a set of Kraus operators {K_i}
//! satisfying the completeness relation Σ K_i† K_i = I. The engine trusts
//! the caller on completeness; only shape is validated here.

use crate::error::{CoreError, Result};
use num_complex::Complex64;

/// A single Kraus operator acting on one qubit
///
/// The matrix is stored row-major as a flattened 2×2.
#[derive(Clone, Debug, PartialEq)]
pub struct KrausOperator {
    matrix: [Complex64; 4],
}

impl KrausOperator {
    /// Create a Kraus operator from a row-major 2×2 matrix
    pub fn new(matrix: [Complex64; 4]) -> Self {
        Self { matrix }
    }

    /// Create from a slice, validating the 2×2 shape
    pub fn from_slice(elements: &[Complex64]) -> Result<Self> {
        if elements.len() != 4 {
            return Err(CoreError::ValidationError(format!(
                "Kraus operator must be a 2x2 matrix, got {} elements",
                elements.len()
            )));
        }
        Ok(Self {
            matrix: [elements[0], elements[1], elements[2], elements[3]],
        })
    }

    /// Matrix element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * 2 + col]
    }

    /// Row-major matrix elements
    #[inline]
    pub fn matrix(&self) -> &[Complex64; 4] {
        &self.matrix
    }

    /// Conjugate transpose of this operator
    pub fn adjoint(&self) -> Self {
        Self {
            matrix: [
                self.matrix[0].conj(),
                self.matrix[2].conj(),
                self.matrix[1].conj(),
                self.matrix[3].conj(),
            ],
        }
    }
}
