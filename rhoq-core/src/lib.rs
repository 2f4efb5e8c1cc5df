//! Core types for the rhoq density-matrix simulator
//!
//! This crate provides the circuit-facing data model: gate records as a
//! closed tagged enumeration, circuits and their Hermitian adjoints,
//! symbolic parameter expressions with bindings, Pauli-term Hamiltonians
//! and the Kraus operator value type. Nothing here owns or mutates a
//! density matrix; the numeric engine lives in `rhoq-state`.
//!
//! # Quick start
//!
//! ```
//! use rhoq_core::{Circuit, GateRecord, ParameterBinding};
//!
//! let mut circ = Circuit::new(2);
//! circ.push(GateRecord::h(0)).unwrap();
//! circ.push(GateRecord::cnot(1, 0).unwrap()).unwrap();
//! circ.push(GateRecord::rx(0, "theta")).unwrap();
//!
//! let pr = ParameterBinding::new().with("theta", 0.5);
//! assert!(circ.requires_grad(&pr));
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod ham;
pub mod kraus;
pub mod parameter;

pub use circuit::Circuit;
pub use error::{CoreError, Result};
pub use gate::{GateKind, GateRecord};
pub use ham::{Hamiltonian, Pauli, PauliTerm};
pub use kraus::KrausOperator;
pub use num_complex::Complex64;
pub use parameter::{ParameterBinding, ParameterExpr};
