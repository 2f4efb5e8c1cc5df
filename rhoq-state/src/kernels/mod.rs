//! In-place policy kernels over the packed density matrix
//!
//! Every kernel walks row bases k and column bases l ≤ k, transforming one
//! 2×2 (or 4×4) block of ρ at a time. Blocks read their entries into local
//! temporaries before writing, so the mirrored (r0, c1) entry is never
//! consumed after being overwritten. Above a dimension threshold the outer
//! k loop is distributed with rayon; distinct (k, l) blocks write disjoint
//! packed entries by construction of the mask scheme, so iterations need
//! no synchronization.

pub mod channel;
pub mod diag;
pub mod expect;
pub mod measure;
pub mod single;
pub mod two;

use crate::index::idx_map;
use crate::precision::{Cplx, Real};
use rayon::prelude::*;
use std::marker::PhantomData;

/// Dimension at which kernels switch from serial to parallel outer loops
pub(crate) const DIM_TH: usize = 1 << 7;

/// 2×2 complex matrix, row-major
pub(crate) type M2<T> = [[Cplx<T>; 2]; 2];

/// 4×4 complex matrix, row-major
pub(crate) type M4<T> = [[Cplx<T>; 4]; 4];

/// Shared view of the packed buffer for the parallel outer loop.
///
/// Loop iterations handed out by [`for_each_base`] must touch disjoint
/// packed entries; the block enumeration guarantees this.
#[derive(Clone, Copy)]
pub(crate) struct RhoView<'a, T> {
    ptr: *mut Cplx<T>,
    _marker: PhantomData<&'a mut [Cplx<T>]>,
}

unsafe impl<T> Send for RhoView<'_, T> {}
unsafe impl<T> Sync for RhoView<'_, T> {}

impl<'a, T: Real> RhoView<'a, T> {
    #[inline]
    pub fn new(rho: &'a mut [Cplx<T>]) -> Self {
        Self {
            ptr: rho.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    /// Read entry (r, c) with r ≥ c
    #[inline]
    pub fn load(&self, r: usize, c: usize) -> Cplx<T> {
        unsafe { *self.ptr.add(idx_map(r, c)) }
    }

    /// Write entry (r, c) with r ≥ c
    #[inline]
    pub fn store(&self, r: usize, c: usize, value: Cplx<T>) {
        unsafe { *self.ptr.add(idx_map(r, c)) = value }
    }

    /// Read entry (r, c) in either order, conjugating above the diagonal
    #[inline]
    pub fn load_any(&self, r: usize, c: usize) -> Cplx<T> {
        if r >= c {
            self.load(r, c)
        } else {
            self.load(c, r).conj()
        }
    }

    /// Write entry (r, c) in either order, conjugating above the diagonal
    #[inline]
    pub fn store_any(&self, r: usize, c: usize, value: Cplx<T>) {
        if r >= c {
            self.store(r, c, value)
        } else {
            self.store(c, r, value.conj())
        }
    }

    /// Multiply entry (r, c) with r ≥ c in place
    #[inline]
    pub fn scale(&self, r: usize, c: usize, factor: Cplx<T>) {
        unsafe {
            let p = self.ptr.add(idx_map(r, c));
            *p = *p * factor;
        }
    }

    /// Multiply entry (r, c) in either order, conjugating the factor above
    /// the diagonal
    #[inline]
    pub fn scale_any(&self, r: usize, c: usize, factor: Cplx<T>) {
        if r >= c {
            self.scale(r, c, factor)
        } else {
            self.scale(c, r, factor.conj())
        }
    }
}

/// Run `body` over every base index, in parallel above the threshold
#[inline]
pub(crate) fn for_each_base<F>(bases: usize, dim: usize, body: F)
where
    F: Fn(usize) + Send + Sync,
{
    if dim >= DIM_TH {
        (0..bases).into_par_iter().for_each(body);
    } else {
        for k in 0..bases {
            body(k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::cplx;

    #[test]
    fn test_view_round_trip() {
        let mut rho = vec![Cplx::<f64>::new(0.0, 0.0); 6];
        let view = RhoView::new(&mut rho);
        view.store(2, 1, cplx(1.0, 2.0));
        assert_eq!(view.load(2, 1), cplx(1.0, 2.0));
        // mirrored access conjugates
        assert_eq!(view.load_any(1, 2), cplx(1.0, -2.0));
        view.store_any(1, 2, cplx(0.0, 1.0));
        assert_eq!(view.load(2, 1), cplx(0.0, -1.0));
    }
}
