//! Density-matrix state container
//!
//! A [`DensityState`] owns the packed lower-triangular ρ buffer, its
//! dimension metadata and a seeded RNG. Gate application dispatches into
//! the policy kernels; measurement and circuit execution live here because
//! they consume the RNG. Copies are deep and re-seed the RNG from the
//! stored seed, so a copied state replays the same measurement outcomes.

use crate::dispatch;
use crate::error::{Result, StateError};
use crate::index::{idx_map, packed_len};
use crate::kernels::expect::{self, compile_term, load_any, CompiledTerm};
use crate::kernels::measure;
use crate::precision::{cplx, Cplx, Real};
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rhoq_core::{Circuit, GateKind, GateRecord, Hamiltonian, ParameterBinding};
use std::collections::HashMap;
use std::fmt;

/// An n-qubit mixed state ρ with exclusive ownership of its buffer
///
/// # Example
/// ```
/// use rhoq_state::DensityState;
/// use rhoq_core::{GateRecord, ParameterBinding};
///
/// let mut state = DensityState::<f64>::new(1, 42).unwrap();
/// let pr = ParameterBinding::new();
/// state.apply_gate(&GateRecord::h(0), &pr).unwrap();
/// assert!((state.trace() - 1.0).abs() < 1e-10);
/// ```
pub struct DensityState<T: Real = f64> {
    num_qubits: usize,
    dim: usize,
    seed: u64,
    rng: StdRng,
    rho: Vec<Cplx<T>>,
}

impl<T: Real> DensityState<T> {
    /// Create a state initialized to |0…0⟩⟨0…0|
    ///
    /// # Errors
    /// Returns [`StateError::AllocationError`] if the packed buffer size
    /// overflows.
    pub fn new(num_qubits: usize, seed: u64) -> Result<Self> {
        let dim = 1usize
            .checked_shl(num_qubits as u32)
            .ok_or(StateError::AllocationError { num_qubits })?;
        let len = dim
            .checked_mul(dim + 1)
            .map(|n| n / 2)
            .ok_or(StateError::AllocationError { num_qubits })?;

        let mut rho = vec![Cplx::zero(); len];
        rho[0] = cplx(1.0, 0.0);

        Ok(Self {
            num_qubits,
            dim,
            seed,
            rng: StdRng::seed_from_u64(seed),
            rho,
        })
    }

    /// Build a state around an existing packed buffer
    ///
    /// The buffer is trusted to be Hermitian in the packed convention;
    /// its trace is not validated. Used by the gradient engine for
    /// observable sidecars.
    pub fn from_packed(num_qubits: usize, seed: u64, rho: Vec<Cplx<T>>) -> Result<Self> {
        let dim = 1usize << num_qubits;
        if rho.len() != packed_len(dim) {
            return Err(StateError::DimensionMismatch {
                expected: packed_len(dim),
                actual: rho.len(),
            });
        }
        Ok(Self {
            num_qubits,
            dim,
            seed,
            rng: StdRng::seed_from_u64(seed),
            rho,
        })
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension 2^n
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Seed this state's RNG was created from
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The packed lower-triangular buffer
    #[inline]
    pub fn packed(&self) -> &[Cplx<T>] {
        &self.rho
    }

    /// Mutable access to the packed buffer
    #[inline]
    pub fn packed_mut(&mut self) -> &mut [Cplx<T>] {
        &mut self.rho
    }

    /// Reset to |0…0⟩⟨0…0|
    pub fn reset(&mut self) {
        for v in self.rho.iter_mut() {
            *v = Cplx::zero();
        }
        self.rho[0] = cplx(1.0, 0.0);
    }

    /// Deep copy with a different RNG seed
    pub fn fork(&self, seed: u64) -> Self {
        Self {
            num_qubits: self.num_qubits,
            dim: self.dim,
            seed,
            rng: StdRng::seed_from_u64(seed),
            rho: self.rho.clone(),
        }
    }

    /// Matrix element ρ[r, c] in either index order
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Cplx<T> {
        load_any(&self.rho, r, c)
    }

    /// Unpack into a dense row-major d×d matrix
    pub fn qs(&self) -> Vec<Cplx<T>> {
        let mut dense = vec![Cplx::zero(); self.dim * self.dim];
        for r in 0..self.dim {
            for c in 0..self.dim {
                dense[r * self.dim + c] = self.get(r, c);
            }
        }
        dense
    }

    /// Overwrite ρ from a dense d×d matrix, keeping the lower triangle
    pub fn set_qs(&mut self, dense: &[Cplx<T>]) -> Result<()> {
        if dense.len() != self.dim * self.dim {
            return Err(StateError::DimensionMismatch {
                expected: self.dim * self.dim,
                actual: dense.len(),
            });
        }
        for r in 0..self.dim {
            for c in 0..=r {
                self.rho[idx_map(r, c)] = dense[r * self.dim + c];
            }
        }
        Ok(())
    }

    /// Overwrite ρ with the projector |ψ⟩⟨ψ| of a pure state
    pub fn set_pure(&mut self, amplitudes: &[Cplx<T>]) -> Result<()> {
        if amplitudes.len() != self.dim {
            return Err(StateError::DimensionMismatch {
                expected: self.dim,
                actual: amplitudes.len(),
            });
        }
        for r in 0..self.dim {
            for c in 0..=r {
                self.rho[idx_map(r, c)] = amplitudes[r] * amplitudes[c].conj();
            }
        }
        Ok(())
    }

    /// Tr(ρ)
    pub fn trace(&self) -> T {
        expect::trace(&self.rho, self.dim).re
    }

    /// Tr(ρ²); 1 for pure states, down to 1/d for the maximally mixed
    pub fn purity(&self) -> T {
        let mut acc = T::zero();
        for r in 0..self.dim {
            acc += self.rho[idx_map(r, r)].norm_sqr();
            for c in 0..r {
                acc += T::from_f64(2.0) * self.rho[idx_map(r, c)].norm_sqr();
            }
        }
        acc
    }

    /// Apply a gate record in place, dispatching to the matching kernel
    ///
    /// Measurement records are executed with the state RNG and their
    /// outcome discarded; use [`DensityState::apply_measure`] to observe
    /// it.
    pub fn apply_gate(&mut self, gate: &GateRecord, pr: &ParameterBinding) -> Result<()> {
        if gate.is_measure() {
            self.apply_measure(gate)?;
            return Ok(());
        }
        dispatch::apply_gate(&mut self.rho, self.dim, self.num_qubits, gate, pr)
    }

    /// Write the angle derivative of a parametric gate's action into ρ
    ///
    /// ρ ← ∂U/∂θ ρ U† + U ρ (∂U/∂θ)†, zeroed outside the control support.
    pub fn apply_gate_diff(&mut self, gate: &GateRecord, pr: &ParameterBinding) -> Result<()> {
        dispatch::apply_diff(&mut self.rho, self.dim, self.num_qubits, gate, pr)
    }

    /// Measure one qubit in the computational basis, collapsing ρ
    pub fn apply_measure(&mut self, gate: &GateRecord) -> Result<u8> {
        let GateKind::Measure { .. } = gate.kind() else {
            return Err(StateError::UnknownGate(gate.kind().name().to_string()));
        };
        let index = gate.objs()[0];
        if index >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index,
                num_qubits: self.num_qubits,
            });
        }
        let obj_mask = 1usize << index;
        let p1 = measure::one_probability(&self.rho, obj_mask, self.dim);
        let draw: f64 = self.rng.gen();
        let outcome = u8::from(draw < p1.to_f64());
        let prob = if outcome == 1 { p1 } else { T::one() - p1 };
        measure::project(&mut self.rho, obj_mask, outcome, prob, self.dim);
        Ok(outcome)
    }

    /// Apply a circuit, collecting measurement outcomes by key
    pub fn apply_circuit(
        &mut self,
        circ: &Circuit,
        pr: &ParameterBinding,
    ) -> Result<HashMap<String, u8>> {
        if circ.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                actual: circ.num_qubits(),
            });
        }
        let mut outcomes = HashMap::new();
        for gate in circ.gates() {
            if let GateKind::Measure { key } = gate.kind() {
                let bit = self.apply_measure(gate)?;
                outcomes.insert(key.clone(), bit);
            } else {
                self.apply_gate(gate, pr)?;
            }
        }
        Ok(outcomes)
    }

    /// Conjugate by an observable: ρ ← H ρ H†
    pub fn apply_hamiltonian(&mut self, ham: &Hamiltonian) -> Result<()> {
        if ham.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                actual: ham.num_qubits(),
            });
        }
        match ham {
            Hamiltonian::Terms { terms, .. } => {
                let compiled: Vec<CompiledTerm<T>> = terms.iter().map(compile_term).collect();
                let mut out = vec![Cplx::zero(); self.rho.len()];
                for left in &compiled {
                    for right in &compiled {
                        for r in 0..self.dim {
                            let rf = r ^ left.flip;
                            let lphase = left.phase(rf).scale(left.coeff);
                            for c in 0..=r {
                                let cf = c ^ right.flip;
                                let rphase = right.phase(c).scale(right.coeff);
                                out[idx_map(r, c)] +=
                                    lphase * rphase * load_any(&self.rho, rf, cf);
                            }
                        }
                    }
                }
                self.rho = out;
            }
            Hamiltonian::Dense { matrix, .. } => {
                let d = self.dim;
                let h: Vec<Cplx<T>> = matrix.iter().map(|v| cplx(v.re, v.im)).collect();
                let dense = self.qs();
                let mut tmp = vec![Cplx::zero(); d * d];
                for r in 0..d {
                    for c in 0..d {
                        let mut acc: Cplx<T> = Cplx::zero();
                        for k in 0..d {
                            acc += h[r * d + k] * dense[k * d + c];
                        }
                        tmp[r * d + c] = acc;
                    }
                }
                for r in 0..d {
                    for c in 0..=r {
                        let mut acc: Cplx<T> = Cplx::zero();
                        for k in 0..d {
                            acc += tmp[r * d + k] * h[c * d + k].conj();
                        }
                        self.rho[idx_map(r, c)] = acc;
                    }
                }
            }
        }
        Ok(())
    }

    /// Expectation value Tr(Hρ)
    pub fn expectation(&self, ham: &Hamiltonian) -> Result<Cplx<T>> {
        if ham.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                actual: ham.num_qubits(),
            });
        }
        expect::expectation(&self.rho, ham, self.dim)
    }

    /// Render the first `limit` rows of ρ for inspection
    pub fn display(&self, limit: usize) -> String {
        let rows = limit.min(self.dim);
        let mut out = format!("DensityState({} qubits, dim {})\n", self.num_qubits, self.dim);
        for r in 0..rows {
            for c in 0..self.dim.min(limit) {
                let v = self.get(r, c);
                out.push_str(&format!("({:.4}, {:.4}) ", v.re, v.im));
            }
            out.push('\n');
        }
        out
    }
}

impl<T: Real> Clone for DensityState<T> {
    /// Deep copy; the RNG restarts from the stored seed
    fn clone(&self) -> Self {
        self.fork(self.seed)
    }
}

impl<T: Real> fmt::Debug for DensityState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DensityState {{ qubits: {}, dim: {}, trace: {:.6} }}",
            self.num_qubits,
            self.dim,
            self.trace()
        )
    }
}
