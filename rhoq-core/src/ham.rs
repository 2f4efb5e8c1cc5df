//! Hamiltonians as weighted Pauli-string sums or dense matrices
//!
//! The gradient and expectation engines consume either form: term lists
//! contract against ρ one permuted diagonal at a time, dense matrices go
//! through the packed trace product. Term lists can be materialized into a
//! dense matrix when a sidecar copy of H is needed.

use crate::error::{CoreError, Result};
use num_complex::Complex64;

/// Single-qubit Pauli operator appearing in a term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    /// Parse from a character
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            _ => Err(CoreError::ValidationError(format!(
                "Unknown Pauli operator '{}'",
                c
            ))),
        }
    }
}

/// A weighted Pauli string: coeff · Π (Pauli on qubit)
///
/// Qubits absent from `ops` carry the identity. An empty `ops` list is the
/// weighted identity term.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliTerm {
    coeff: f64,
    ops: Vec<(usize, Pauli)>,
}

impl PauliTerm {
    /// Create a term, rejecting duplicate qubits
    pub fn new(coeff: f64, ops: Vec<(usize, Pauli)>) -> Result<Self> {
        for i in 0..ops.len() {
            for j in (i + 1)..ops.len() {
                if ops[i].0 == ops[j].0 {
                    return Err(CoreError::QubitConflict(ops[i].0));
                }
            }
        }
        Ok(Self { coeff, ops })
    }

    /// The weighted identity term
    pub fn identity(coeff: f64) -> Self {
        Self {
            coeff,
            ops: Vec::new(),
        }
    }

    /// Term weight
    #[inline]
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// (qubit, Pauli) factors
    #[inline]
    pub fn ops(&self) -> &[(usize, Pauli)] {
        &self.ops
    }

    /// Largest qubit index referenced
    pub fn max_qubit(&self) -> Option<usize> {
        self.ops.iter().map(|(q, _)| *q).max()
    }
}

/// A Hermitian observable over `n` qubits
#[derive(Debug, Clone)]
pub enum Hamiltonian {
    /// Sum of weighted Pauli strings
    Terms {
        num_qubits: usize,
        terms: Vec<PauliTerm>,
    },
    /// Dense 2^n × 2^n matrix, row-major
    Dense {
        num_qubits: usize,
        matrix: Vec<Complex64>,
    },
}

impl Hamiltonian {
    /// Build from a term list
    ///
    /// # Errors
    /// Fails if any term references a qubit outside the register.
    pub fn from_terms(num_qubits: usize, terms: Vec<PauliTerm>) -> Result<Self> {
        for term in &terms {
            if let Some(max) = term.max_qubit() {
                if max >= num_qubits {
                    return Err(CoreError::invalid_qubit(max, num_qubits));
                }
            }
        }
        Ok(Self::Terms { num_qubits, terms })
    }

    /// Build from a dense matrix
    ///
    /// # Errors
    /// Fails if the matrix is not 2^n × 2^n.
    pub fn from_dense(num_qubits: usize, matrix: Vec<Complex64>) -> Result<Self> {
        let dim = 1usize << num_qubits;
        if matrix.len() != dim * dim {
            return Err(CoreError::ValidationError(format!(
                "Dense Hamiltonian for {} qubits needs {} elements, got {}",
                num_qubits,
                dim * dim,
                matrix.len()
            )));
        }
        Ok(Self::Dense { num_qubits, matrix })
    }

    /// Single Pauli Z on one qubit
    pub fn z(num_qubits: usize, qubit: usize) -> Result<Self> {
        Self::from_terms(num_qubits, vec![PauliTerm::new(1.0, vec![(qubit, Pauli::Z)])?])
    }

    /// Single Pauli X on one qubit
    pub fn x(num_qubits: usize, qubit: usize) -> Result<Self> {
        Self::from_terms(num_qubits, vec![PauliTerm::new(1.0, vec![(qubit, Pauli::X)])?])
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        match self {
            Hamiltonian::Terms { num_qubits, .. } | Hamiltonian::Dense { num_qubits, .. } => {
                *num_qubits
            }
        }
    }

    /// Materialize as a dense row-major matrix
    pub fn to_dense(&self) -> Vec<Complex64> {
        match self {
            Hamiltonian::Dense { matrix, .. } => matrix.clone(),
            Hamiltonian::Terms { num_qubits, terms } => {
                let dim = 1usize << num_qubits;
                let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];
                for term in terms {
                    let (flip, phase) = compile_term(term);
                    for col in 0..dim {
                        let row = col ^ flip;
                        matrix[row * dim + col] += phase(col) * term.coeff;
                    }
                }
                matrix
            }
        }
    }
}

/// Flip mask and per-column phase of a Pauli string
///
/// P|c⟩ = α(c)|c ^ flip⟩ with α(c) = i^{n_Y} · (−1)^{popcount(c & (Y|Z))}.
fn compile_term(term: &PauliTerm) -> (usize, impl Fn(usize) -> Complex64 + '_) {
    let mut flip = 0usize;
    let mut yz = 0usize;
    let mut n_y = 0u32;
    for (q, p) in term.ops() {
        match p {
            Pauli::X => flip |= 1 << q,
            Pauli::Y => {
                flip |= 1 << q;
                yz |= 1 << q;
                n_y += 1;
            }
            Pauli::Z => yz |= 1 << q,
        }
    }
    let i_pow = match n_y % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    };
    (flip, move |col: usize| {
        let sign = if (col & yz).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        i_pow * sign
    })
}
