//! Kraus channel kernels
//!
//! Channels act on the object axis only (no controls): every block of ρ
//! transforms as B ← Σᵢ Kᵢ B Kᵢ†. Amplitude damping, its adjoint, phase
//! damping and the Pauli channel have closed per-block forms and run fully
//! in place; an explicit Kraus set accumulates through a scratch buffer.

use super::single::{apply_single, SingleOp};
use super::{for_each_base, M2, RhoView};
use crate::index::SingleQubitMask;
use crate::precision::{cplx, Cplx, Real};
use num_traits::Zero;
use rhoq_core::KrausOperator;

/// Amplitude damping Σ KᵢρKᵢ†, or its adjoint map Σ Kᵢ†ρKᵢ
///
/// K0 = diag(1, √(1-γ)), K1 = √γ·|0⟩⟨1|. The adjoint map propagates an
/// observable backwards through the channel for gradients.
pub(crate) fn apply_amplitude_damping<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    gamma: f64,
    adjoint: bool,
    dim: usize,
) {
    let g = T::from_f64(gamma);
    let keep = (T::one() - g).sqrt();
    let view = RhoView::new(rho);
    for_each_base(dim / 2, dim, |k| {
        let r0 = mask.expand(k);
        let r1 = r0 | mask.obj_mask;
        for l in 0..=k {
            let c0 = mask.expand(l);
            let c1 = c0 | mask.obj_mask;
            let b00 = view.load(r0, c0);
            let b01 = view.load_any(r0, c1);
            let b10 = view.load(r1, c0);
            let b11 = view.load(r1, c1);
            if adjoint {
                view.store(r0, c0, b00);
                view.store_any(r0, c1, b01.scale(keep));
                view.store(r1, c0, b10.scale(keep));
                view.store(r1, c1, b11.scale(T::one() - g) + b00.scale(g));
            } else {
                view.store(r0, c0, b00 + b11.scale(g));
                view.store_any(r0, c1, b01.scale(keep));
                view.store(r1, c0, b10.scale(keep));
                view.store(r1, c1, b11.scale(T::one() - g));
            }
        }
    });
}

/// Phase damping: off-diagonal entries of the object axis shrink by √(1-γ)
pub(crate) fn apply_phase_damping<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    gamma: f64,
    dim: usize,
) {
    let keep = Cplx::new((T::one() - T::from_f64(gamma)).sqrt(), T::zero());
    let view = RhoView::new(rho);
    for_each_base(dim / 2, dim, |k| {
        let r0 = mask.expand(k);
        let r1 = r0 | mask.obj_mask;
        for l in 0..k {
            let c0 = mask.expand(l);
            let c1 = c0 | mask.obj_mask;
            view.scale(r1, c0, keep);
            view.scale_any(r0, c1, keep);
        }
        view.scale(r1, r0, keep);
    });
}

/// Pauli channel (1-p)ρ + pₓXρX + p_yYρY + p_zZρZ
pub(crate) fn apply_pauli_channel<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    px: f64,
    py: f64,
    pz: f64,
    dim: usize,
) {
    let (px, py, pz) = (T::from_f64(px), T::from_f64(py), T::from_f64(pz));
    let stay = T::one() - px - py - pz;
    let diag_keep = stay + pz;
    let diag_swap = px + py;
    let off_keep = stay - pz;
    let off_swap = px - py;
    let view = RhoView::new(rho);
    for_each_base(dim / 2, dim, |k| {
        let r0 = mask.expand(k);
        let r1 = r0 | mask.obj_mask;
        for l in 0..=k {
            let c0 = mask.expand(l);
            let c1 = c0 | mask.obj_mask;
            let b00 = view.load(r0, c0);
            let b01 = view.load_any(r0, c1);
            let b10 = view.load(r1, c0);
            let b11 = view.load(r1, c1);
            view.store(r0, c0, b00.scale(diag_keep) + b11.scale(diag_swap));
            view.store(r1, c1, b11.scale(diag_keep) + b00.scale(diag_swap));
            view.store(r1, c0, b10.scale(off_keep) + b01.scale(off_swap));
            view.store_any(r0, c1, b01.scale(off_keep) + b10.scale(off_swap));
        }
    });
}

/// Explicit Kraus channel: accumulate Σ KᵢρKᵢ† in a scratch buffer, then
/// copy back
pub(crate) fn apply_kraus<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    ops: &[KrausOperator],
    dim: usize,
) {
    let mut scratch = vec![Cplx::zero(); rho.len()];
    for op in ops {
        let e = op.matrix();
        let m: M2<T> = [
            [cplx(e[0].re, e[0].im), cplx(e[1].re, e[1].im)],
            [cplx(e[2].re, e[2].im), cplx(e[3].re, e[3].im)],
        ];
        let mut term = rho.to_vec();
        apply_single(&mut term, mask, SingleOp::Unitary(&m), dim);
        for (acc, t) in scratch.iter_mut().zip(term.iter()) {
            *acc += *t;
        }
    }
    rho.copy_from_slice(&scratch);
}
