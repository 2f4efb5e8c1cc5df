//! Quantum circuit representation

use crate::error::{CoreError, Result};
use crate::gate::GateRecord;
use crate::parameter::ParameterBinding;

/// An ordered sequence of gate records over a fixed number of qubits
///
/// # Example
/// ```
/// use rhoq_core::{Circuit, GateRecord};
///
/// let mut circ = Circuit::new(2);
/// circ.push(GateRecord::h(0)).unwrap();
/// circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
/// assert_eq!(circ.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<GateRecord>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Create a circuit with pre-allocated gate capacity
    pub fn with_capacity(num_qubits: usize, capacity: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::with_capacity(capacity),
        }
    }

    /// Number of qubits
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of gate records
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the circuit has no gates
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Append a gate record
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidQubit`] if the record references a
    /// qubit outside this circuit.
    pub fn push(&mut self, gate: GateRecord) -> Result<()> {
        let max = gate.max_qubit();
        if max >= self.num_qubits {
            return Err(CoreError::invalid_qubit(max, self.num_qubits));
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Iterate over the gate records in application order
    pub fn gates(&self) -> impl Iterator<Item = &GateRecord> {
        self.gates.iter()
    }

    /// Gate record at `index`
    pub fn get(&self, index: usize) -> Option<&GateRecord> {
        self.gates.get(index)
    }

    /// Whether any gate is a non-unitary channel
    pub fn has_channel(&self) -> bool {
        self.gates.iter().any(GateRecord::is_channel)
    }

    /// Whether any gate is a measurement
    pub fn has_measure(&self) -> bool {
        self.gates.iter().any(GateRecord::is_measure)
    }

    /// Whether any gate has a symbolic angle requiring a gradient under
    /// the given binding
    pub fn requires_grad(&self, binding: &ParameterBinding) -> bool {
        self.gates
            .iter()
            .any(|g| g.kind().expr().is_some_and(|e| e.requires_grad(binding)))
    }

    /// Element-wise Hermitian adjoint: gates reversed, each daggered
    ///
    /// # Errors
    /// Fails if any gate has no adjoint (e.g. measurements).
    pub fn herm(&self) -> Result<Circuit> {
        let mut gates = Vec::with_capacity(self.gates.len());
        for gate in self.gates.iter().rev() {
            gates.push(gate.dagger()?);
        }
        Ok(Circuit {
            num_qubits: self.num_qubits,
            gates,
        })
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} gates)",
            self.num_qubits,
            self.len()
        )?;
        for (i, gate) in self.gates.iter().enumerate() {
            writeln!(f, "  {}: {}", i, gate)?;
        }
        Ok(())
    }
}
