//! Packed density-matrix state engine for rhoq
//!
//! The density matrix of an n-qubit mixed state is Hermitian, so only its
//! lower triangle is stored: a flat buffer of length d(d+1)/2 with
//! d = 2^n. Gate kernels transform ρ ← GρG† in place, enumerating 2×2 or
//! 4×4 blocks through the bit-mask scheme in [`index`]; channels apply
//! their Kraus sets block-wise and measurement collapses ρ with a fused
//! conditional-multiply pass.
//!
//! The engine is generic over the scalar precision ([`Real`]), runs its
//! kernel outer loops in parallel above a dimension threshold, and never
//! validates physicality of caller-supplied Kraus sets.
//!
//! # Example
//!
//! ```
//! use rhoq_core::{Circuit, GateRecord, Hamiltonian, ParameterBinding};
//! use rhoq_state::DensityState;
//!
//! let mut circ = Circuit::new(2);
//! circ.push(GateRecord::h(0)).unwrap();
//! circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
//!
//! let mut state = DensityState::<f64>::new(2, 42).unwrap();
//! state.apply_circuit(&circ, &ParameterBinding::new()).unwrap();
//!
//! let zz = Hamiltonian::z(2, 0).unwrap();
//! let e = state.expectation(&zz).unwrap();
//! assert!(e.re.abs() < 1e-10);
//! ```

pub mod dispatch;
pub mod error;
pub mod index;
pub mod kernels;
pub mod precision;
pub mod state;

pub use error::{Result, StateError};
pub use index::{idx_map, packed_len, DoubleQubitMask, SingleQubitMask};
pub use kernels::expect::{expectation, packed_from_ham, trace, trace_product};
pub use precision::{cplx, Cplx, Real};
pub use state::DensityState;
