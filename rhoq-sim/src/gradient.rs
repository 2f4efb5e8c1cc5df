//! Analytic expectation gradients through forward and adjoint circuits
//!
//! For f(θ) = Tr(H · C ρ₀ C†) the engine produces f and ∂f/∂θ for every
//! gradient-requiring parameter, without finite differences. Two walks are
//! used:
//!
//! - **Reversible** (no channels): evolve ρ_S = C ρ₀ C† once, then step
//!   through the adjoint circuit. At each gate the state sidecar is rolled
//!   back first; for differentiable gates the derivative kernel is applied
//!   to a scratch copy at the forward angle and contracted with the
//!   observable sidecar ρ_H, which is stepped afterwards. Contributions
//!   accumulate with the negated coefficients of the adjoint gate's
//!   expression.
//! - **Noise** (any channel present): the inverse evolution does not
//!   exist, so the state is re-evolved from the initial snapshot up to
//!   each differentiable gate while ρ_H walks backwards through the
//!   adjoint records (channels step by their adjoint map). Quadratic in
//!   gate count but correct under arbitrary channels; contributions
//!   accumulate with the forward coefficients.
//!
//! Batching follows the binding × Hamiltonian grid: one binding runs
//! inline, many bindings fan out over `batch_threads`; Hamiltonian
//! sidecars process in chunks of `mea_threads` (clamped to 15) sharing a
//! single state walk per chunk.

use crate::error::{Result, SimError};
use ahash::AHashMap;
use rayon::prelude::*;
use rhoq_core::{Circuit, GateRecord, Hamiltonian, ParameterBinding};
use rhoq_state::{dispatch, packed_from_ham, trace_product, Cplx, DensityState, Real};
use num_traits::Zero;

/// Ceiling on concurrent Hamiltonian sidecars per chunk
const MEA_THREADS_CAP: usize = 15;

/// Thread-count knobs for batched gradient evaluation
#[derive(Debug, Clone)]
pub struct GradConfig {
    /// Worker threads for parallel bindings; 0 uses the ambient rayon pool
    pub batch_threads: usize,
    /// Hamiltonian sidecars per chunk, clamped to min(15, M)
    pub mea_threads: usize,
}

impl Default for GradConfig {
    fn default() -> Self {
        Self {
            batch_threads: 0,
            mea_threads: MEA_THREADS_CAP,
        }
    }
}

/// Gradient evaluator over a template state, circuit pair and observables
///
/// The output shape is `[binding][hamiltonian][1 + P]`: entry 0 is the
/// expectation value, entries 1..=P follow the parameter order (encoder
/// names first, ansatz names second).
pub struct GradOps<'a, T: Real> {
    state: &'a DensityState<T>,
    circ: &'a Circuit,
    herm_circ: &'a Circuit,
    hams: &'a [Hamiltonian],
    params: Vec<String>,
    config: GradConfig,
}

impl<'a, T: Real> GradOps<'a, T> {
    /// Create an evaluator
    ///
    /// `herm_circ` must be the element-wise Hermitian adjoint of `circ`
    /// (see [`Circuit::herm`]); the lengths are checked here and a
    /// mismatch is an error for both walk modes.
    pub fn new(
        state: &'a DensityState<T>,
        circ: &'a Circuit,
        herm_circ: &'a Circuit,
        hams: &'a [Hamiltonian],
    ) -> Result<Self> {
        if circ.len() != herm_circ.len() {
            return Err(SimError::CircuitLengthMismatch {
                expected: circ.len(),
                actual: herm_circ.len(),
            });
        }
        if circ.num_qubits() != state.num_qubits() {
            return Err(rhoq_state::StateError::DimensionMismatch {
                expected: state.num_qubits(),
                actual: circ.num_qubits(),
            }
            .into());
        }
        for ham in hams {
            if ham.num_qubits() != state.num_qubits() {
                return Err(rhoq_state::StateError::DimensionMismatch {
                    expected: state.num_qubits(),
                    actual: ham.num_qubits(),
                }
                .into());
            }
        }
        Ok(Self {
            state,
            circ,
            herm_circ,
            hams,
            params: Vec::new(),
            config: GradConfig::default(),
        })
    }

    /// Fix the gradient column order: encoder names first, ansatz second
    pub fn with_params(mut self, encoder: &[&str], ansatz: &[&str]) -> Self {
        self.params = encoder
            .iter()
            .chain(ansatz.iter())
            .map(|s| s.to_string())
            .collect();
        self
    }

    /// Override the threading configuration
    pub fn with_config(mut self, config: GradConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of gradient columns
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// Evaluate all bindings against all Hamiltonians
    ///
    /// A single binding is evaluated inline; multiple bindings are
    /// partitioned across worker threads.
    pub fn run(&self, bindings: &[ParameterBinding]) -> Result<Vec<Vec<Vec<Cplx<T>>>>> {
        if bindings.len() == 1 {
            return Ok(vec![self.one_multi(&bindings[0])?]);
        }
        match self.config.batch_threads {
            0 => bindings.par_iter().map(|pr| self.one_multi(pr)).collect(),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n.min(bindings.len().max(1)))
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?;
                pool.install(|| bindings.par_iter().map(|pr| self.one_multi(pr)).collect())
            }
        }
    }

    /// Evaluate one binding against a single Hamiltonian
    pub fn one_one(&self, pr: &ParameterBinding) -> Result<Vec<Cplx<T>>> {
        self.one_multi(pr)?.into_iter().next().ok_or_else(|| {
            SimError::State(rhoq_state::StateError::DimensionMismatch {
                expected: 1,
                actual: 0,
            })
        })
    }

    /// Evaluate one binding against every Hamiltonian
    pub fn one_multi(&self, pr: &ParameterBinding) -> Result<Vec<Vec<Cplx<T>>>> {
        let num_params = self.params.len();
        let index: AHashMap<&str, usize> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        // forward evolution once, shared by values and the reversible walk
        let mut rho_s = self.state.clone();
        for gate in self.circ.gates() {
            rho_s.apply_gate(gate, pr)?;
        }

        let values: Vec<Cplx<T>> = self
            .hams
            .iter()
            .map(|h| rho_s.expectation(h))
            .collect::<rhoq_state::Result<_>>()?;

        let mut grads = vec![vec![Cplx::zero(); num_params]; self.hams.len()];
        let mea = self.config.mea_threads.min(MEA_THREADS_CAP).max(1);
        let chunk_size = mea.min(self.hams.len().max(1));

        if self.circ.has_channel() {
            for (chunk_i, chunk) in self.hams.chunks(chunk_size).enumerate() {
                self.noise_walk(pr, chunk, chunk_i * chunk_size, &index, &mut grads)?;
            }
        } else {
            for (chunk_i, chunk) in self.hams.chunks(chunk_size).enumerate() {
                self.reversible_walk(
                    pr,
                    &rho_s,
                    chunk,
                    chunk_i * chunk_size,
                    &index,
                    &mut grads,
                )?;
            }
        }

        Ok(values
            .into_iter()
            .zip(grads)
            .map(|(f, g)| {
                let mut row = Vec::with_capacity(1 + num_params);
                row.push(f);
                row.extend(g);
                row
            })
            .collect())
    }

    fn reversible_walk(
        &self,
        pr: &ParameterBinding,
        rho_end: &DensityState<T>,
        chunk: &[Hamiltonian],
        offset: usize,
        index: &AHashMap<&str, usize>,
        grads: &mut [Vec<Cplx<T>>],
    ) -> Result<()> {
        let dim = self.state.dim();
        let num_qubits = self.state.num_qubits();
        let n = self.circ.len();

        let mut walk = rho_end.clone();
        let mut sidecars: Vec<Vec<Cplx<T>>> = chunk
            .iter()
            .map(|h| packed_from_ham(h, dim))
            .collect::<rhoq_state::Result<_>>()?;

        for j in 0..n {
            let i = n - 1 - j;
            let adj = self.herm_circ.get(j).expect("length checked");
            let fwd = self.circ.get(i).expect("length checked");

            // roll the state back past this gate first
            walk.apply_gate(adj, pr)?;

            if is_differentiable(fwd, pr) {
                let mut delta = walk.clone();
                delta.apply_gate_diff(fwd, pr)?;
                let readouts: Vec<T> = sidecars
                    .par_iter()
                    .map(|h| trace_product(h, delta.packed(), dim).re)
                    .collect();
                // the adjoint gate carries the negated expression
                let expr = adj.kind().expr().ok_or_else(|| {
                    SimError::State(rhoq_state::StateError::UnknownGate(format!(
                        "adjoint of {} is not parametric",
                        fwd.kind().name()
                    )))
                })?;
                for (s, g) in readouts.iter().enumerate() {
                    for (name, coeff) in expr.terms() {
                        if let Some(&p) = index.get(name) {
                            if pr.requires_grad(name) {
                                grads[offset + s][p] +=
                                    Cplx::new(T::from_f64(-coeff) * *g, T::zero());
                            }
                        }
                    }
                }
            }

            sidecars
                .par_iter_mut()
                .try_for_each(|h| dispatch::apply_gate(h, dim, num_qubits, adj, pr))?;
        }
        Ok(())
    }

    fn noise_walk(
        &self,
        pr: &ParameterBinding,
        chunk: &[Hamiltonian],
        offset: usize,
        index: &AHashMap<&str, usize>,
        grads: &mut [Vec<Cplx<T>>],
    ) -> Result<()> {
        let dim = self.state.dim();
        let num_qubits = self.state.num_qubits();
        let n = self.circ.len();

        let mut sidecars: Vec<Vec<Cplx<T>>> = chunk
            .iter()
            .map(|h| packed_from_ham(h, dim))
            .collect::<rhoq_state::Result<_>>()?;

        for i in (0..n).rev() {
            let fwd = self.circ.get(i).expect("length checked");
            let adj = self.herm_circ.get(n - 1 - i).expect("length checked");

            if is_differentiable(fwd, pr) {
                // re-evolve from the initial snapshot up to this gate
                let mut delta = self.state.clone();
                for gate in self.circ.gates().take(i) {
                    delta.apply_gate(gate, pr)?;
                }
                delta.apply_gate_diff(fwd, pr)?;
                let readouts: Vec<T> = sidecars
                    .par_iter()
                    .map(|h| trace_product(h, delta.packed(), dim).re)
                    .collect();
                let expr = fwd.kind().expr().expect("checked by is_differentiable");
                for (s, g) in readouts.iter().enumerate() {
                    for (name, coeff) in expr.terms() {
                        if let Some(&p) = index.get(name) {
                            if pr.requires_grad(name) {
                                grads[offset + s][p] +=
                                    Cplx::new(T::from_f64(coeff) * *g, T::zero());
                            }
                        }
                    }
                }
            }

            // ρ_H walks backwards through the adjoint records; channels
            // step by their adjoint map
            sidecars
                .par_iter_mut()
                .try_for_each(|h| dispatch::apply_gate(h, dim, num_qubits, adj, pr))?;
        }
        Ok(())
    }
}

fn is_differentiable(gate: &GateRecord, pr: &ParameterBinding) -> bool {
    gate.kind()
        .expr()
        .map(|e| e.requires_grad(pr))
        .unwrap_or(false)
}
