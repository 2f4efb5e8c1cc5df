//! Single-qubit gate kernels
//!
//! The generic kernel applies an arbitrary 2×2 matrix on both sides of ρ,
//! block by block. Control handling follows the four regimes: when both
//! the row and column base satisfy the control condition the block
//! transforms as M·B·M†; when only the row satisfies it the block is
//! left-multiplied; when only the column does, right-multiplied by the
//! adjoint; otherwise the block is untouched. The derivative form writes
//! ∂(UρU†)/∂θ instead, zeroing blocks outside the control support.

use super::{for_each_base, M2, RhoView};
use crate::index::SingleQubitMask;
use crate::precision::{Cplx, Real};
use num_traits::Zero;

/// Block transformation selector for [`apply_single`]
#[derive(Clone, Copy)]
pub(crate) enum SingleOp<'a, T: Real> {
    /// ρ ← U ρ U†
    Unitary(&'a M2<T>),
    /// ρ ← ∂U/∂θ ρ U† + U ρ (∂U/∂θ)†
    Derivative { u: &'a M2<T>, du: &'a M2<T> },
}

#[inline]
fn lmul<T: Real>(m: &M2<T>, b: &M2<T>) -> M2<T> {
    let mut out = [[Cplx::zero(); 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = m[i][0] * b[0][j] + m[i][1] * b[1][j];
        }
    }
    out
}

#[inline]
fn rmul_dag<T: Real>(b: &M2<T>, m: &M2<T>) -> M2<T> {
    let mut out = [[Cplx::zero(); 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = b[i][0] * m[j][0].conj() + b[i][1] * m[j][1].conj();
        }
    }
    out
}

#[inline]
fn add<T: Real>(a: &M2<T>, b: &M2<T>) -> M2<T> {
    let mut out = [[Cplx::zero(); 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}

/// Apply a 2×2 matrix transformation to every block of ρ
pub(crate) fn apply_single<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    op: SingleOp<'_, T>,
    dim: usize,
) {
    let view = RhoView::new(rho);
    for_each_base(dim / 2, dim, |k| {
        let r0 = mask.expand(k);
        let r1 = r0 | mask.obj_mask;
        for l in 0..=k {
            let c0 = mask.expand(l);
            let c1 = c0 | mask.obj_mask;
            let row_hit = mask.ctrl_hit(r0);
            let col_hit = mask.ctrl_hit(c0);
            if !row_hit && !col_hit {
                if let SingleOp::Derivative { .. } = op {
                    // the derivative has no support outside the controls
                    let z = Cplx::zero();
                    view.store(r0, c0, z);
                    view.store_any(r0, c1, z);
                    view.store(r1, c0, z);
                    view.store(r1, c1, z);
                }
                continue;
            }

            let block = [
                [view.load(r0, c0), view.load_any(r0, c1)],
                [view.load(r1, c0), view.load(r1, c1)],
            ];
            let out = match (op, row_hit, col_hit) {
                (SingleOp::Unitary(u), true, true) => rmul_dag(&lmul(u, &block), u),
                (SingleOp::Unitary(u), true, false) => lmul(u, &block),
                (SingleOp::Unitary(u), false, true) => rmul_dag(&block, u),
                (SingleOp::Derivative { u, du }, true, true) => add(
                    &rmul_dag(&lmul(du, &block), u),
                    &rmul_dag(&lmul(u, &block), du),
                ),
                (SingleOp::Derivative { du, .. }, true, false) => lmul(du, &block),
                (SingleOp::Derivative { du, .. }, false, true) => rmul_dag(&block, du),
                (_, false, false) => unreachable!(),
            };
            view.store(r0, c0, out[0][0]);
            view.store_any(r0, c1, out[0][1]);
            view.store(r1, c0, out[1][0]);
            view.store(r1, c1, out[1][1]);
        }
    });
}

/// X-like kernel: exchange along the object axis (X, CNOT, Toffoli)
///
/// The full transformation reverses the block; the one-sided regimes swap
/// the row pair or the column pair only.
pub(crate) fn apply_xlike<T: Real>(rho: &mut [Cplx<T>], mask: &SingleQubitMask, dim: usize) {
    let view = RhoView::new(rho);
    for_each_base(dim / 2, dim, |k| {
        let r0 = mask.expand(k);
        let r1 = r0 | mask.obj_mask;
        for l in 0..=k {
            let c0 = mask.expand(l);
            let c1 = c0 | mask.obj_mask;
            let row_hit = mask.ctrl_hit(r0);
            let col_hit = mask.ctrl_hit(c0);
            if !row_hit && !col_hit {
                continue;
            }

            let block = [
                [view.load(r0, c0), view.load_any(r0, c1)],
                [view.load(r1, c0), view.load(r1, c1)],
            ];
            let out = if row_hit && col_hit {
                [[block[1][1], block[1][0]], [block[0][1], block[0][0]]]
            } else if row_hit {
                [block[1], block[0]]
            } else {
                [
                    [block[0][1], block[0][0]],
                    [block[1][1], block[1][0]],
                ]
            };
            view.store(r0, c0, out[0][0]);
            view.store_any(r0, c1, out[0][1]);
            view.store(r1, c0, out[1][0]);
            view.store(r1, c1, out[1][1]);
        }
    });
}
