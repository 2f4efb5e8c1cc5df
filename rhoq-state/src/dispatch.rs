//! Gate dispatcher: map a gate record onto the matching kernel
//!
//! A pure switch over the gate enumeration. Parametric gates resolve their
//! angle as a linear combination against the binding before dispatch;
//! measurement is handled by the state container (it needs the RNG), and
//! channel kinds branch into the channel sub-dispatcher. The derivative
//! dispatcher serves the gradient engine and rejects non-differentiable
//! kinds.

use crate::error::{Result, StateError};
use crate::index::{DoubleQubitMask, SingleQubitMask};
use crate::kernels::channel::{
    apply_amplitude_damping, apply_kraus, apply_pauli_channel, apply_phase_damping,
};
use crate::kernels::diag::apply_zlike;
use crate::kernels::single::{apply_single, apply_xlike, SingleOp};
use crate::kernels::two::{apply_two, TwoOp};
use crate::kernels::{M2, M4};
use crate::precision::{cplx, Cplx, Real};
use num_traits::Zero;
use rhoq_core::{GateKind, GateRecord, ParameterBinding, ParameterExpr};

fn check_qubits(gate: &GateRecord, num_qubits: usize) -> Result<()> {
    let index = gate.max_qubit();
    if index >= num_qubits {
        return Err(StateError::InvalidQubitIndex { index, num_qubits });
    }
    Ok(())
}

fn angle(expr: &ParameterExpr, pr: &ParameterBinding) -> Result<f64> {
    Ok(expr.combination(pr)?)
}

fn rx_mat<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    [[cplx(c, 0.0), cplx(0.0, -s)], [cplx(0.0, -s), cplx(c, 0.0)]]
}

fn rx_diff<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    [[cplx(-s, 0.0), cplx(0.0, -c)], [cplx(0.0, -c), cplx(-s, 0.0)]]
}

fn ry_mat<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    [[cplx(c, 0.0), cplx(-s, 0.0)], [cplx(s, 0.0), cplx(c, 0.0)]]
}

fn ry_diff<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    [[cplx(-s, 0.0), cplx(-c, 0.0)], [cplx(c, 0.0), cplx(-s, 0.0)]]
}

fn rz_mat<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    [[cplx(c, -s), Cplx::zero()], [Cplx::zero(), cplx(c, s)]]
}

fn rz_diff<T: Real>(theta: f64) -> M2<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    [[cplx(-s, -c), Cplx::zero()], [Cplx::zero(), cplx(-s, c)]]
}

fn ps_mat<T: Real>(theta: f64) -> M2<T> {
    [
        [cplx(1.0, 0.0), Cplx::zero()],
        [Cplx::zero(), cplx(theta.cos(), theta.sin())],
    ]
}

fn ps_diff<T: Real>(theta: f64) -> M2<T> {
    [
        [Cplx::zero(), Cplx::zero()],
        [Cplx::zero(), cplx(-theta.sin(), theta.cos())],
    ]
}

fn h_mat<T: Real>() -> M2<T> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    [[cplx(h, 0.0), cplx(h, 0.0)], [cplx(h, 0.0), cplx(-h, 0.0)]]
}

fn y_mat<T: Real>() -> M2<T> {
    [[Cplx::zero(), cplx(0.0, -1.0)], [cplx(0.0, 1.0), Cplx::zero()]]
}

fn swap_mat<T: Real>() -> M4<T> {
    let mut m = [[Cplx::zero(); 4]; 4];
    m[0][0] = cplx(1.0, 0.0);
    m[1][2] = cplx(1.0, 0.0);
    m[2][1] = cplx(1.0, 0.0);
    m[3][3] = cplx(1.0, 0.0);
    m
}

fn iswap_mat<T: Real>(daggered: bool) -> M4<T> {
    let phase = if daggered { -1.0 } else { 1.0 };
    let mut m = [[Cplx::zero(); 4]; 4];
    m[0][0] = cplx(1.0, 0.0);
    m[1][2] = cplx(0.0, phase);
    m[2][1] = cplx(0.0, phase);
    m[3][3] = cplx(1.0, 0.0);
    m
}

fn rxx_mat<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        m[i][i] = cplx(c, 0.0);
        m[i][3 - i] = cplx(0.0, -s);
    }
    m
}

fn rxx_diff<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        m[i][i] = cplx(-s, 0.0);
        m[i][3 - i] = cplx(0.0, -c);
    }
    m
}

fn ryy_mat<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        m[i][i] = cplx(c, 0.0);
        // YY has -1 on the outer anti-diagonal, +1 on the inner
        let sign = if i == 0 || i == 3 { 1.0 } else { -1.0 };
        m[i][3 - i] = cplx(0.0, sign * s);
    }
    m
}

fn ryy_diff<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        m[i][i] = cplx(-s, 0.0);
        let sign = if i == 0 || i == 3 { 1.0 } else { -1.0 };
        m[i][3 - i] = cplx(0.0, sign * c);
    }
    m
}

fn rzz_mat<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        let sign = if i == 0 || i == 3 { -1.0 } else { 1.0 };
        m[i][i] = cplx(c, sign * s);
    }
    m
}

fn rzz_diff<T: Real>(theta: f64) -> M4<T> {
    let (c, s) = ((theta / 2.0).cos() / 2.0, (theta / 2.0).sin() / 2.0);
    let mut m = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        let sign = if i == 0 || i == 3 { -1.0 } else { 1.0 };
        m[i][i] = cplx(-s, sign * c);
    }
    m
}

/// Apply a gate record: ρ ← G ρ G†
///
/// Measurement and channel kinds are not unitaries and report
/// [`StateError::UnknownGate`]; route them through the container or the
/// channel dispatcher.
pub fn apply_gate<T: Real>(
    rho: &mut [Cplx<T>],
    dim: usize,
    num_qubits: usize,
    gate: &GateRecord,
    pr: &ParameterBinding,
) -> Result<()> {
    check_qubits(gate, num_qubits)?;
    let objs = gate.objs();
    let ctrls = gate.ctrls();
    match gate.kind() {
        GateKind::I => Ok(()),
        GateKind::X => {
            apply_xlike(rho, &SingleQubitMask::new(objs[0], ctrls), dim);
            Ok(())
        }
        GateKind::Y => {
            let m = y_mat::<T>();
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Z => {
            apply_zlike(rho, &SingleQubitMask::new(objs[0], ctrls), cplx(-1.0, 0.0), dim);
            Ok(())
        }
        GateKind::S => {
            apply_zlike(rho, &SingleQubitMask::new(objs[0], ctrls), cplx(0.0, 1.0), dim);
            Ok(())
        }
        GateKind::Sdag => {
            apply_zlike(rho, &SingleQubitMask::new(objs[0], ctrls), cplx(0.0, -1.0), dim);
            Ok(())
        }
        GateKind::T => {
            let h = std::f64::consts::FRAC_1_SQRT_2;
            apply_zlike(rho, &SingleQubitMask::new(objs[0], ctrls), cplx(h, h), dim);
            Ok(())
        }
        GateKind::Tdag => {
            let h = std::f64::consts::FRAC_1_SQRT_2;
            apply_zlike(rho, &SingleQubitMask::new(objs[0], ctrls), cplx(h, -h), dim);
            Ok(())
        }
        GateKind::H => {
            let m = h_mat::<T>();
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::PhaseShift(expr) => {
            let theta = angle(expr, pr)?;
            apply_zlike(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                cplx(theta.cos(), theta.sin()),
                dim,
            );
            Ok(())
        }
        GateKind::Rx(expr) => {
            let m = rx_mat::<T>(angle(expr, pr)?);
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Ry(expr) => {
            let m = ry_mat::<T>(angle(expr, pr)?);
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Rz(expr) => {
            let m = rz_mat::<T>(angle(expr, pr)?);
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Swap => {
            let m = swap_mat::<T>();
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::ISwap { daggered } => {
            let m = iswap_mat::<T>(*daggered);
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Rxx(expr) => {
            let m = rxx_mat::<T>(angle(expr, pr)?);
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Ryy(expr) => {
            let m = ryy_mat::<T>(angle(expr, pr)?);
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        GateKind::Rzz(expr) => {
            let m = rzz_mat::<T>(angle(expr, pr)?);
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Unitary(&m),
                dim,
            );
            Ok(())
        }
        kind if kind.is_channel() => apply_channel(rho, dim, num_qubits, gate),
        kind => Err(StateError::UnknownGate(kind.name().to_string())),
    }
}

/// Channel sub-dispatcher: ρ ← Σ Kᵢ ρ Kᵢ†
pub fn apply_channel<T: Real>(
    rho: &mut [Cplx<T>],
    dim: usize,
    num_qubits: usize,
    gate: &GateRecord,
) -> Result<()> {
    check_qubits(gate, num_qubits)?;
    let mask = SingleQubitMask::new(gate.objs()[0], &[]);
    match gate.kind() {
        GateKind::AmplitudeDamping { gamma } => {
            apply_amplitude_damping(rho, &mask, *gamma, false, dim);
            Ok(())
        }
        GateKind::AdjointAmplitudeDamping { gamma } => {
            apply_amplitude_damping(rho, &mask, *gamma, true, dim);
            Ok(())
        }
        GateKind::PhaseDamping { gamma } => {
            apply_phase_damping(rho, &mask, *gamma, dim);
            Ok(())
        }
        GateKind::PauliChannel { px, py, pz } => {
            apply_pauli_channel(rho, &mask, *px, *py, *pz, dim);
            Ok(())
        }
        GateKind::Kraus { ops } => {
            apply_kraus(rho, &mask, ops, dim);
            Ok(())
        }
        kind => Err(StateError::UnknownChannel(kind.name().to_string())),
    }
}

/// Derivative dispatcher: ρ ← ∂U/∂θ ρ U† + U ρ (∂U/∂θ)†
///
/// Only the rotation families and the phase shift are differentiable;
/// anything else reports [`StateError::UnknownGate`].
pub fn apply_diff<T: Real>(
    rho: &mut [Cplx<T>],
    dim: usize,
    num_qubits: usize,
    gate: &GateRecord,
    pr: &ParameterBinding,
) -> Result<()> {
    check_qubits(gate, num_qubits)?;
    let objs = gate.objs();
    let ctrls = gate.ctrls();
    match gate.kind() {
        GateKind::Rx(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (rx_mat::<T>(theta), rx_diff::<T>(theta));
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::Ry(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (ry_mat::<T>(theta), ry_diff::<T>(theta));
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::Rz(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (rz_mat::<T>(theta), rz_diff::<T>(theta));
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::PhaseShift(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (ps_mat::<T>(theta), ps_diff::<T>(theta));
            apply_single(
                rho,
                &SingleQubitMask::new(objs[0], ctrls),
                SingleOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::Rxx(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (rxx_mat::<T>(theta), rxx_diff::<T>(theta));
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::Ryy(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (ryy_mat::<T>(theta), ryy_diff::<T>(theta));
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        GateKind::Rzz(expr) => {
            let theta = angle(expr, pr)?;
            let (u, du) = (rzz_mat::<T>(theta), rzz_diff::<T>(theta));
            apply_two(
                rho,
                &DoubleQubitMask::new(objs[0], objs[1], ctrls),
                TwoOp::Derivative { u: &u, du: &du },
                dim,
            );
            Ok(())
        }
        kind => Err(StateError::UnknownGate(format!(
            "derivative of {}",
            kind.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::packed_len;

    const TOL: f64 = 1e-12;

    fn ground(dim: usize) -> Vec<Cplx<f64>> {
        let mut rho = vec![Cplx::zero(); packed_len(dim)];
        rho[0] = cplx(1.0, 0.0);
        rho
    }

    #[test]
    fn test_rx_composition() {
        // Rx(θ)·Rx(φ) = Rx(θ+φ)
        let pr = ParameterBinding::new();
        let mut a = ground(2);
        apply_gate(&mut a, 2, 1, &GateRecord::rx(0, 0.3), &pr).unwrap();
        apply_gate(&mut a, 2, 1, &GateRecord::rx(0, 0.4), &pr).unwrap();
        let mut b = ground(2);
        apply_gate(&mut b, 2, 1, &GateRecord::rx(0, 0.7), &pr).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < TOL);
        }
    }

    #[test]
    fn test_unitary_round_trips() {
        let pr = ParameterBinding::new();
        let gates = vec![
            GateRecord::h(0),
            GateRecord::s(0),
            GateRecord::t(1),
            GateRecord::rx(0, 0.5),
            GateRecord::ry(1, 1.1),
            GateRecord::rz(0, -0.4),
            GateRecord::phase_shift(1, 0.9),
            GateRecord::cnot(1, 0).unwrap(),
            GateRecord::swap(0, 1).unwrap(),
            GateRecord::iswap(0, 1).unwrap(),
            GateRecord::rxx(0, 1, 0.6).unwrap(),
            GateRecord::ryy(0, 1, 0.2).unwrap(),
            GateRecord::rzz(0, 1, -0.8).unwrap(),
        ];
        for gate in gates {
            let mut rho = ground(4);
            // move off the fixed point first
            apply_gate(&mut rho, 4, 2, &GateRecord::h(0), &pr).unwrap();
            apply_gate(&mut rho, 4, 2, &GateRecord::ry(1, 0.8), &pr).unwrap();
            let before = rho.clone();
            apply_gate(&mut rho, 4, 2, &gate, &pr).unwrap();
            apply_gate(&mut rho, 4, 2, &gate.dagger().unwrap(), &pr).unwrap();
            for (x, y) in rho.iter().zip(before.iter()) {
                assert!((x - y).norm() < TOL, "round trip failed for {}", gate);
            }
        }
    }

    #[test]
    fn test_unknown_derivative() {
        let pr = ParameterBinding::new();
        let mut rho = ground(2);
        let result = apply_diff(&mut rho, 2, 1, &GateRecord::h(0), &pr);
        assert!(matches!(result, Err(StateError::UnknownGate(_))));
    }

    #[test]
    fn test_non_channel_in_channel_dispatch() {
        let mut rho = ground(2);
        let result = apply_channel(&mut rho, 2, 1, &GateRecord::h(0));
        assert!(matches!(result, Err(StateError::UnknownChannel(_))));
    }

    #[test]
    fn test_out_of_range_qubit() {
        let pr = ParameterBinding::new();
        let mut rho = ground(2);
        let result = apply_gate(&mut rho, 2, 1, &GateRecord::h(1), &pr);
        assert!(matches!(
            result,
            Err(StateError::InvalidQubitIndex { index: 1, .. })
        ));
    }
}
