//! Expectation, gradient and sampling engines for rhoq
//!
//! Built on the `rhoq-state` density-matrix engine: [`GradOps`] walks a
//! circuit and its Hermitian adjoint to produce expectation values with
//! analytic parameter gradients (batched over bindings and Hamiltonians),
//! and [`sampling`] runs independent measurement trajectories against
//! copies of a state.
//!
//! # Example
//!
//! ```
//! use rhoq_core::{Circuit, GateRecord, Hamiltonian, ParameterBinding};
//! use rhoq_sim::GradOps;
//! use rhoq_state::DensityState;
//!
//! let state = DensityState::<f64>::new(1, 0).unwrap();
//! let mut circ = Circuit::new(1);
//! circ.push(GateRecord::rx(0, "theta")).unwrap();
//! let herm = circ.herm().unwrap();
//! let hams = [Hamiltonian::z(1, 0).unwrap()];
//!
//! let ops = GradOps::new(&state, &circ, &herm, &hams)
//!     .unwrap()
//!     .with_params(&[], &["theta"]);
//! let pr = ParameterBinding::new().with("theta", 0.5);
//! let row = ops.one_one(&pr).unwrap();
//! assert!((row[0].re - 0.5_f64.cos()).abs() < 1e-10);
//! ```

pub mod error;
pub mod gradient;
pub mod sampling;

pub use error::{Result, SimError};
pub use gradient::{GradConfig, GradOps};
pub use sampling::sampling;
