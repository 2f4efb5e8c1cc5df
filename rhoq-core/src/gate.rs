//! Gate records: a closed enumeration of gate kinds plus placement
//!
//! Gates are plain data. A [`GateKind`] carries only the payload its
//! variant uses (an angle expression, a channel parameter, a Kraus set);
//! a [`GateRecord`] pairs a kind with its object and control qubits.
//! The numeric engine dispatches on the kind; nothing here touches ρ.

use crate::error::{CoreError, Result};
use crate::kraus::KrausOperator;
use crate::parameter::ParameterExpr;
use smallvec::SmallVec;
use std::fmt;

/// The closed set of gate identifiers understood by the engine
#[derive(Clone, Debug, PartialEq)]
pub enum GateKind {
    /// Identity (no-op)
    I,
    /// Pauli X; with controls this is CNOT / Toffoli
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
    /// Hadamard
    H,
    /// Phase gate diag(1, i)
    S,
    /// Adjoint phase gate diag(1, -i)
    Sdag,
    /// T gate diag(1, e^{iπ/4})
    T,
    /// Adjoint T gate
    Tdag,
    /// Exchange of two qubit axes
    Swap,
    /// SWAP with an i phase on the exchanged amplitudes
    ISwap { daggered: bool },
    /// Rotation exp(-iθX/2)
    Rx(ParameterExpr),
    /// Rotation exp(-iθY/2)
    Ry(ParameterExpr),
    /// Rotation exp(-iθZ/2)
    Rz(ParameterExpr),
    /// Two-qubit rotation exp(-iθ XX/2)
    Rxx(ParameterExpr),
    /// Two-qubit rotation exp(-iθ YY/2)
    Ryy(ParameterExpr),
    /// Two-qubit rotation exp(-iθ ZZ/2)
    Rzz(ParameterExpr),
    /// Phase shift diag(1, e^{iθ})
    PhaseShift(ParameterExpr),
    /// Computational-basis measurement, outcomes keyed by `key`
    Measure { key: String },
    /// Amplitude damping channel with decay probability γ
    AmplitudeDamping { gamma: f64 },
    /// Adjoint of the amplitude damping channel, Σ Kᵢ†(·)Kᵢ
    AdjointAmplitudeDamping { gamma: f64 },
    /// Phase damping channel with damping probability γ
    PhaseDamping { gamma: f64 },
    /// Pauli channel (1-p)ρ + pₓXρX + p_yYρY + p_zZρZ
    PauliChannel { px: f64, py: f64, pz: f64 },
    /// Explicit single-qubit Kraus channel Σ KᵢρKᵢ†
    Kraus { ops: Vec<KrausOperator> },
}

impl GateKind {
    /// Short identifier used in errors and circuit listings
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::I => "I",
            GateKind::X => "X",
            GateKind::Y => "Y",
            GateKind::Z => "Z",
            GateKind::H => "H",
            GateKind::S => "S",
            GateKind::Sdag => "Sdag",
            GateKind::T => "T",
            GateKind::Tdag => "Tdag",
            GateKind::Swap => "SWAP",
            GateKind::ISwap { daggered: false } => "ISWAP",
            GateKind::ISwap { daggered: true } => "ISWAPdag",
            GateKind::Rx(_) => "RX",
            GateKind::Ry(_) => "RY",
            GateKind::Rz(_) => "RZ",
            GateKind::Rxx(_) => "Rxx",
            GateKind::Ryy(_) => "Ryy",
            GateKind::Rzz(_) => "Rzz",
            GateKind::PhaseShift(_) => "PS",
            GateKind::Measure { .. } => "Measure",
            GateKind::AmplitudeDamping { .. } => "AD",
            GateKind::AdjointAmplitudeDamping { .. } => "hAD",
            GateKind::PhaseDamping { .. } => "PD",
            GateKind::PauliChannel { .. } => "PL",
            GateKind::Kraus { .. } => "Kraus",
        }
    }

    /// Number of object qubits this kind acts on
    pub fn num_objs(&self) -> usize {
        match self {
            GateKind::Swap
            | GateKind::ISwap { .. }
            | GateKind::Rxx(_)
            | GateKind::Ryy(_)
            | GateKind::Rzz(_) => 2,
            _ => 1,
        }
    }

    /// Whether this kind is a non-unitary channel
    pub fn is_channel(&self) -> bool {
        matches!(
            self,
            GateKind::AmplitudeDamping { .. }
                | GateKind::AdjointAmplitudeDamping { .. }
                | GateKind::PhaseDamping { .. }
                | GateKind::PauliChannel { .. }
                | GateKind::Kraus { .. }
        )
    }

    /// Whether this kind is a measurement
    pub fn is_measure(&self) -> bool {
        matches!(self, GateKind::Measure { .. })
    }

    /// The symbolic angle expression for parametric kinds
    pub fn expr(&self) -> Option<&ParameterExpr> {
        match self {
            GateKind::Rx(e)
            | GateKind::Ry(e)
            | GateKind::Rz(e)
            | GateKind::Rxx(e)
            | GateKind::Ryy(e)
            | GateKind::Rzz(e)
            | GateKind::PhaseShift(e) => Some(e),
            _ => None,
        }
    }
}

/// A gate kind applied to specific object and control qubits
#[derive(Clone, Debug, PartialEq)]
pub struct GateRecord {
    kind: GateKind,
    objs: SmallVec<[usize; 2]>,
    ctrls: SmallVec<[usize; 2]>,
}

impl GateRecord {
    /// Create a gate record, validating arity and qubit placement
    ///
    /// # Errors
    /// - [`CoreError::InvalidQubitCount`] if the object count does not
    ///   match the kind
    /// - [`CoreError::QubitConflict`] if a qubit appears twice among
    ///   objects and controls
    /// - [`CoreError::ValidationError`] for controls on measurements or
    ///   channels, and for out-of-range channel probabilities
    pub fn new(kind: GateKind, objs: &[usize], ctrls: &[usize]) -> Result<Self> {
        if objs.len() != kind.num_objs() {
            return Err(CoreError::invalid_qubit_count(
                kind.name(),
                kind.num_objs(),
                objs.len(),
            ));
        }

        let all: SmallVec<[usize; 4]> = objs.iter().chain(ctrls.iter()).copied().collect();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                if all[i] == all[j] {
                    return Err(CoreError::QubitConflict(all[i]));
                }
            }
        }

        if !ctrls.is_empty() && (kind.is_channel() || kind.is_measure()) {
            return Err(CoreError::ValidationError(format!(
                "{} gates cannot take control qubits",
                kind.name()
            )));
        }

        match &kind {
            GateKind::AmplitudeDamping { gamma }
            | GateKind::AdjointAmplitudeDamping { gamma }
            | GateKind::PhaseDamping { gamma } => {
                if !(0.0..=1.0).contains(gamma) {
                    return Err(CoreError::ValidationError(format!(
                        "Damping coefficient must be in [0,1], got {}",
                        gamma
                    )));
                }
            }
            GateKind::PauliChannel { px, py, pz } => {
                if *px < 0.0 || *py < 0.0 || *pz < 0.0 || px + py + pz > 1.0 {
                    return Err(CoreError::ValidationError(format!(
                        "Pauli probabilities must be non-negative with sum <= 1, got ({}, {}, {})",
                        px, py, pz
                    )));
                }
            }
            GateKind::Kraus { ops } => {
                if ops.is_empty() {
                    return Err(CoreError::ValidationError(
                        "Kraus channel requires at least one operator".to_string(),
                    ));
                }
            }
            _ => {}
        }

        Ok(Self {
            kind,
            objs: SmallVec::from_slice(objs),
            ctrls: SmallVec::from_slice(ctrls),
        })
    }

    /// Get the gate kind
    #[inline]
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Object qubits
    #[inline]
    pub fn objs(&self) -> &[usize] {
        &self.objs
    }

    /// Control qubits
    #[inline]
    pub fn ctrls(&self) -> &[usize] {
        &self.ctrls
    }

    /// Largest qubit index referenced by this record
    pub fn max_qubit(&self) -> usize {
        self.objs
            .iter()
            .chain(self.ctrls.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Whether the record is a channel
    #[inline]
    pub fn is_channel(&self) -> bool {
        self.kind.is_channel()
    }

    /// Whether the record is a measurement
    #[inline]
    pub fn is_measure(&self) -> bool {
        self.kind.is_measure()
    }

    /// Builder pattern: attach control qubits
    pub fn with_ctrls(self, ctrls: &[usize]) -> Result<Self> {
        Self::new(self.kind, &self.objs, ctrls)
    }

    /// Element-wise Hermitian adjoint of this record
    ///
    /// Rotation and phase-shift angles are negated, S/T swap with their
    /// adjoints, channels map to their adjoint channel and Kraus sets are
    /// daggered. Measurements have no adjoint.
    pub fn dagger(&self) -> Result<Self> {
        let kind = match &self.kind {
            GateKind::S => GateKind::Sdag,
            GateKind::Sdag => GateKind::S,
            GateKind::T => GateKind::Tdag,
            GateKind::Tdag => GateKind::T,
            GateKind::ISwap { daggered } => GateKind::ISwap {
                daggered: !daggered,
            },
            GateKind::Rx(e) => GateKind::Rx(-e.clone()),
            GateKind::Ry(e) => GateKind::Ry(-e.clone()),
            GateKind::Rz(e) => GateKind::Rz(-e.clone()),
            GateKind::Rxx(e) => GateKind::Rxx(-e.clone()),
            GateKind::Ryy(e) => GateKind::Ryy(-e.clone()),
            GateKind::Rzz(e) => GateKind::Rzz(-e.clone()),
            GateKind::PhaseShift(e) => GateKind::PhaseShift(-e.clone()),
            GateKind::Measure { .. } => {
                return Err(CoreError::NotInvertible(self.kind.name().to_string()))
            }
            GateKind::AmplitudeDamping { gamma } => {
                GateKind::AdjointAmplitudeDamping { gamma: *gamma }
            }
            GateKind::AdjointAmplitudeDamping { gamma } => {
                GateKind::AmplitudeDamping { gamma: *gamma }
            }
            GateKind::Kraus { ops } => GateKind::Kraus {
                ops: ops.iter().map(KrausOperator::adjoint).collect(),
            },
            other => other.clone(),
        };
        Ok(Self {
            kind,
            objs: self.objs.clone(),
            ctrls: self.ctrls.clone(),
        })
    }

    // Convenience constructors for the common gates. Single-qubit
    // uncontrolled records cannot conflict, so these are infallible.

    pub fn i(obj: usize) -> Self {
        Self::single(GateKind::I, obj)
    }

    pub fn x(obj: usize) -> Self {
        Self::single(GateKind::X, obj)
    }

    pub fn y(obj: usize) -> Self {
        Self::single(GateKind::Y, obj)
    }

    pub fn z(obj: usize) -> Self {
        Self::single(GateKind::Z, obj)
    }

    pub fn h(obj: usize) -> Self {
        Self::single(GateKind::H, obj)
    }

    pub fn s(obj: usize) -> Self {
        Self::single(GateKind::S, obj)
    }

    pub fn sdag(obj: usize) -> Self {
        Self::single(GateKind::Sdag, obj)
    }

    pub fn t(obj: usize) -> Self {
        Self::single(GateKind::T, obj)
    }

    pub fn tdag(obj: usize) -> Self {
        Self::single(GateKind::Tdag, obj)
    }

    /// Controlled-X on `obj` gated by `ctrl`
    pub fn cnot(obj: usize, ctrl: usize) -> Result<Self> {
        Self::new(GateKind::X, &[obj], &[ctrl])
    }

    pub fn swap(q0: usize, q1: usize) -> Result<Self> {
        Self::new(GateKind::Swap, &[q0, q1], &[])
    }

    pub fn iswap(q0: usize, q1: usize) -> Result<Self> {
        Self::new(GateKind::ISwap { daggered: false }, &[q0, q1], &[])
    }

    pub fn rx(obj: usize, angle: impl Into<ParameterExpr>) -> Self {
        Self::single(GateKind::Rx(angle.into()), obj)
    }

    pub fn ry(obj: usize, angle: impl Into<ParameterExpr>) -> Self {
        Self::single(GateKind::Ry(angle.into()), obj)
    }

    pub fn rz(obj: usize, angle: impl Into<ParameterExpr>) -> Self {
        Self::single(GateKind::Rz(angle.into()), obj)
    }

    pub fn rxx(q0: usize, q1: usize, angle: impl Into<ParameterExpr>) -> Result<Self> {
        Self::new(GateKind::Rxx(angle.into()), &[q0, q1], &[])
    }

    pub fn ryy(q0: usize, q1: usize, angle: impl Into<ParameterExpr>) -> Result<Self> {
        Self::new(GateKind::Ryy(angle.into()), &[q0, q1], &[])
    }

    pub fn rzz(q0: usize, q1: usize, angle: impl Into<ParameterExpr>) -> Result<Self> {
        Self::new(GateKind::Rzz(angle.into()), &[q0, q1], &[])
    }

    pub fn phase_shift(obj: usize, angle: impl Into<ParameterExpr>) -> Self {
        Self::single(GateKind::PhaseShift(angle.into()), obj)
    }

    pub fn measure(obj: usize, key: impl Into<String>) -> Self {
        Self::single(GateKind::Measure { key: key.into() }, obj)
    }

    pub fn amplitude_damping(obj: usize, gamma: f64) -> Result<Self> {
        Self::new(GateKind::AmplitudeDamping { gamma }, &[obj], &[])
    }

    pub fn phase_damping(obj: usize, gamma: f64) -> Result<Self> {
        Self::new(GateKind::PhaseDamping { gamma }, &[obj], &[])
    }

    pub fn pauli_channel(obj: usize, px: f64, py: f64, pz: f64) -> Result<Self> {
        Self::new(GateKind::PauliChannel { px, py, pz }, &[obj], &[])
    }

    pub fn kraus(obj: usize, ops: Vec<KrausOperator>) -> Result<Self> {
        Self::new(GateKind::Kraus { ops }, &[obj], &[])
    }

    fn single(kind: GateKind, obj: usize) -> Self {
        Self {
            kind,
            objs: SmallVec::from_slice(&[obj]),
            ctrls: SmallVec::new(),
        }
    }
}

impl fmt::Display for GateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind.name())?;
        for (i, q) in self.objs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "q{}", q)?;
        }
        if !self.ctrls.is_empty() {
            write!(f, "; ctrl")?;
            for q in &self.ctrls {
                write!(f, " q{}", q)?;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_validation() {
        let result = GateRecord::new(GateKind::Swap, &[0], &[]);
        assert!(matches!(
            result,
            Err(CoreError::InvalidQubitCount { expected: 2, .. })
        ));
    }

    #[test]
    fn test_qubit_conflict() {
        assert!(matches!(
            GateRecord::cnot(1, 1),
            Err(CoreError::QubitConflict(1))
        ));
        assert!(matches!(
            GateRecord::swap(0, 0),
            Err(CoreError::QubitConflict(0))
        ));
    }

    #[test]
    fn test_controlled_channel_rejected() {
        let ad = GateRecord::amplitude_damping(0, 0.1).unwrap();
        assert!(ad.with_ctrls(&[1]).is_err());
    }

    #[test]
    fn test_gamma_range() {
        assert!(GateRecord::amplitude_damping(0, 1.5).is_err());
        assert!(GateRecord::pauli_channel(0, 0.5, 0.4, 0.3).is_err());
    }

    #[test]
    fn test_dagger_rotation_negates_angle() {
        let g = GateRecord::rx(0, "theta");
        let dag = g.dagger().unwrap();
        match dag.kind() {
            GateKind::Rx(e) => assert_eq!(e.coeff("theta"), -1.0),
            _ => panic!("expected RX"),
        }
    }

    #[test]
    fn test_dagger_involution() {
        let g = GateRecord::s(0);
        assert_eq!(g.dagger().unwrap().dagger().unwrap(), g);
        let g = GateRecord::iswap(0, 1).unwrap();
        assert_eq!(g.dagger().unwrap().dagger().unwrap(), g);
    }

    #[test]
    fn test_dagger_measure_fails() {
        let m = GateRecord::measure(0, "m0");
        assert!(matches!(m.dagger(), Err(CoreError::NotInvertible(_))));
    }

    #[test]
    fn test_display() {
        let g = GateRecord::cnot(1, 0).unwrap();
        assert_eq!(format!("{}", g), "X(q1; ctrl q0)");
    }
}
