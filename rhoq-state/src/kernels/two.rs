//! Two-qubit gate kernels
//!
//! Same block scheme as the single-qubit kernel with 4×4 blocks over
//! dim/4 bases. SWAP, iSWAP and the two-qubit rotations all route through
//! the generic matrix path; the derivative form serves Rxx/Ryy/Rzz.

use super::{for_each_base, M4, RhoView};
use crate::index::DoubleQubitMask;
use crate::precision::{Cplx, Real};
use num_traits::Zero;

/// Block transformation selector for [`apply_two`]
#[derive(Clone, Copy)]
pub(crate) enum TwoOp<'a, T: Real> {
    /// ρ ← U ρ U†
    Unitary(&'a M4<T>),
    /// ρ ← ∂U/∂θ ρ U† + U ρ (∂U/∂θ)†
    Derivative { u: &'a M4<T>, du: &'a M4<T> },
}

#[inline]
fn lmul<T: Real>(m: &M4<T>, b: &M4<T>) -> M4<T> {
    let mut out = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let mut acc = Cplx::zero();
            for k in 0..4 {
                acc = acc + m[i][k] * b[k][j];
            }
            out[i][j] = acc;
        }
    }
    out
}

#[inline]
fn rmul_dag<T: Real>(b: &M4<T>, m: &M4<T>) -> M4<T> {
    let mut out = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            let mut acc = Cplx::zero();
            for k in 0..4 {
                acc = acc + b[i][k] * m[j][k].conj();
            }
            out[i][j] = acc;
        }
    }
    out
}

#[inline]
fn add<T: Real>(a: &M4<T>, b: &M4<T>) -> M4<T> {
    let mut out = [[Cplx::zero(); 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}

/// Apply a 4×4 matrix transformation to every block of ρ
pub(crate) fn apply_two<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &DoubleQubitMask,
    op: TwoOp<'_, T>,
    dim: usize,
) {
    let view = RhoView::new(rho);
    for_each_base(dim / 4, dim, |k| {
        let rows = mask.members(mask.expand(k));
        for l in 0..=k {
            let cols = mask.members(mask.expand(l));
            let row_hit = mask.ctrl_hit(rows[0]);
            let col_hit = mask.ctrl_hit(cols[0]);
            if !row_hit && !col_hit {
                if let TwoOp::Derivative { .. } = op {
                    for i in 0..4 {
                        for j in 0..4 {
                            view.store_any(rows[i], cols[j], Cplx::zero());
                        }
                    }
                }
                continue;
            }

            let mut block = [[Cplx::zero(); 4]; 4];
            for i in 0..4 {
                for j in 0..4 {
                    block[i][j] = view.load_any(rows[i], cols[j]);
                }
            }
            let out = match (op, row_hit, col_hit) {
                (TwoOp::Unitary(u), true, true) => rmul_dag(&lmul(u, &block), u),
                (TwoOp::Unitary(u), true, false) => lmul(u, &block),
                (TwoOp::Unitary(u), false, true) => rmul_dag(&block, u),
                (TwoOp::Derivative { u, du }, true, true) => add(
                    &rmul_dag(&lmul(du, &block), u),
                    &rmul_dag(&lmul(u, &block), du),
                ),
                (TwoOp::Derivative { du, .. }, true, false) => lmul(du, &block),
                (TwoOp::Derivative { du, .. }, false, true) => rmul_dag(&block, du),
                (_, false, false) => unreachable!(),
            };
            for i in 0..4 {
                for j in 0..4 {
                    view.store_any(rows[i], cols[j], out[i][j]);
                }
            }
        }
    });
}
