//! Measurement projection kernel
//!
//! The marginal for outcome 1 is a diagonal conditional collect; the
//! post-measurement state is produced by a single fused pass over the
//! packed triangle that scales surviving entries and zeroes the rest.

use crate::index::idx_map;
use crate::precision::{Cplx, Real};
use num_traits::Zero;

/// Probability of measuring |1⟩ on the object qubit
pub(crate) fn one_probability<T: Real>(rho: &[Cplx<T>], obj_mask: usize, dim: usize) -> T {
    let mut p = T::zero();
    for r in 0..dim {
        if r & obj_mask != 0 {
            p += rho[idx_map(r, r)].re;
        }
    }
    p
}

/// Collapse the object qubit to `outcome` and renormalize by `prob`
pub(crate) fn project<T: Real>(
    rho: &mut [Cplx<T>],
    obj_mask: usize,
    outcome: u8,
    prob: T,
    dim: usize,
) {
    let target = if outcome == 1 { obj_mask } else { 0 };
    let factor = T::one() / prob;
    let mut i = 0;
    for r in 0..dim {
        let row_keep = r & obj_mask == target;
        for c in 0..=r {
            if row_keep && c & obj_mask == target {
                rho[i] = rho[i].scale(factor);
            } else {
                rho[i] = Cplx::zero();
            }
            i += 1;
        }
    }
}
