//! Z-like diagonal kernel
//!
//! Gates diagonal in the computational basis (Z, S, S†, T, T†, phase
//! shift) multiply the |1⟩ projection of the object axis by a value v.
//! On ρ this scales (r1, c0) by v, (r0, c1) by conj(v) and (r1, c1) by
//! |v|², all in place with no temporaries.

use super::{for_each_base, RhoView};
use crate::index::SingleQubitMask;
use crate::precision::{Cplx, Real};

/// Apply diag(1, v) on both sides of ρ
pub(crate) fn apply_zlike<T: Real>(
    rho: &mut [Cplx<T>],
    mask: &SingleQubitMask,
    val: Cplx<T>,
    dim: usize,
) {
    let view = RhoView::new(rho);
    let norm = Cplx::new(val.norm_sqr(), T::zero());
    if mask.ctrl_mask == 0 {
        for_each_base(dim / 2, dim, |k| {
            let r0 = mask.expand(k);
            let r1 = r0 | mask.obj_mask;
            for l in 0..k {
                let c0 = mask.expand(l);
                let c1 = c0 | mask.obj_mask;
                view.scale(r1, c1, norm);
                view.scale(r1, c0, val);
                view.scale_any(r0, c1, val.conj());
            }
            // diagonal block
            view.scale(r1, r0, val);
            view.scale(r1, r1, norm);
        });
    } else {
        for_each_base(dim / 2, dim, |k| {
            let r0 = mask.expand(k);
            let r1 = r0 | mask.obj_mask;
            let row_hit = mask.ctrl_hit(r0);
            for l in 0..k {
                let c0 = mask.expand(l);
                let col_hit = mask.ctrl_hit(c0);
                if !row_hit && !col_hit {
                    continue;
                }
                let c1 = c0 | mask.obj_mask;
                if row_hit && col_hit {
                    view.scale(r1, c1, norm);
                    view.scale(r1, c0, val);
                    view.scale_any(r0, c1, val.conj());
                } else if row_hit {
                    // rows rotate, columns stay
                    view.scale(r1, c1, val);
                    view.scale(r1, c0, val);
                } else {
                    view.scale(r1, c1, val.conj());
                    view.scale_any(r0, c1, val.conj());
                }
            }
            if row_hit {
                view.scale(r1, r0, val);
                view.scale(r1, r1, norm);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::packed_len;
    use crate::kernels::single::{apply_single, SingleOp};
    use crate::precision::cplx;
    use num_traits::Zero;

    const TOL: f64 = 1e-12;

    fn plus_state() -> Vec<Cplx<f64>> {
        // (|0⟩ + |1⟩)/√2 as a density matrix
        let mut rho: Vec<Cplx<f64>> = vec![Cplx::zero(); packed_len(2)];
        rho[0] = cplx(0.5, 0.0);
        rho[1] = cplx(0.5, 0.0);
        rho[2] = cplx(0.5, 0.0);
        rho
    }

    #[test]
    fn test_z_flips_coherence_sign() {
        let mut rho = plus_state();
        let mask = SingleQubitMask::new(0, &[]);
        apply_zlike(&mut rho, &mask, cplx(-1.0, 0.0), 2);
        let view = RhoView::new(&mut rho);
        assert!((view.load(1, 0).re + 0.5).abs() < TOL);
        assert!((view.load(0, 0).re - 0.5).abs() < TOL);
        assert!((view.load(1, 1).re - 0.5).abs() < TOL);
    }

    #[test]
    fn test_s_sdag_round_trip() {
        let mut rho = plus_state();
        let orig = rho.clone();
        let mask = SingleQubitMask::new(0, &[]);
        apply_zlike(&mut rho, &mask, cplx(0.0, 1.0), 2);
        apply_zlike(&mut rho, &mask, cplx(0.0, -1.0), 2);
        for (a, b) in rho.iter().zip(orig.iter()) {
            assert!((a - b).norm() < TOL);
        }
    }

    #[test]
    fn test_zlike_matches_generic_kernel() {
        // diag(1, e^{iθ}) through the diagonal kernel equals the generic path
        let theta = 0.7_f64;
        let v = cplx(theta.cos(), theta.sin());
        let mask = SingleQubitMask::new(1, &[]);

        let mut a: Vec<Cplx<f64>> = vec![Cplx::zero(); packed_len(4)];
        // a structured Hermitian test matrix
        for r in 0..4usize {
            for c in 0..=r {
                let re = 0.1 * (r as f64 + 1.0);
                let im = if r == c { 0.0 } else { 0.05 * (c as f64 + 1.0) };
                a[crate::index::idx_map(r, c)] = cplx(re, im);
            }
        }
        let mut b = a.clone();

        apply_zlike(&mut a, &mask, v, 4);
        let u = [[cplx(1.0, 0.0), Cplx::zero()], [Cplx::zero(), v]];
        apply_single(&mut b, &mask, SingleOp::Unitary(&u), 4);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < TOL);
        }
    }
}
