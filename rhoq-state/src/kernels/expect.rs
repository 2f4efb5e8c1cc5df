//! Expectation values and packed-matrix contractions
//!
//! A Pauli string is a signed permutation P|c⟩ = α(c)|c ^ flip⟩ with
//! α(c) = i^{n_Y}·(−1)^{popcount(c & (Y|Z))}, so Tr(Pρ) sums one permuted
//! diagonal of ρ per term. Dense observables contract through the packed
//! trace product.

use crate::error::{Result, StateError};
use crate::index::{idx_map, packed_len};
use crate::precision::{cplx, Cplx, Real};
use num_traits::Zero;
use rhoq_core::{Hamiltonian, Pauli, PauliTerm};

/// Flip mask and phase data of one compiled Pauli term
pub(crate) struct CompiledTerm<T: Real> {
    pub coeff: T,
    pub flip: usize,
    pub yz: usize,
    pub i_pow: Cplx<T>,
}

pub(crate) fn compile_term<T: Real>(term: &PauliTerm) -> CompiledTerm<T> {
    let mut flip = 0usize;
    let mut yz = 0usize;
    let mut n_y = 0u32;
    for (q, p) in term.ops() {
        match p {
            Pauli::X => flip |= 1 << q,
            Pauli::Y => {
                flip |= 1 << q;
                yz |= 1 << q;
                n_y += 1;
            }
            Pauli::Z => yz |= 1 << q,
        }
    }
    let i_pow = match n_y % 4 {
        0 => cplx(1.0, 0.0),
        1 => cplx(0.0, 1.0),
        2 => cplx(-1.0, 0.0),
        _ => cplx(0.0, -1.0),
    };
    CompiledTerm {
        coeff: T::from_f64(term.coeff()),
        flip,
        yz,
        i_pow,
    }
}

impl<T: Real> CompiledTerm<T> {
    /// α(c): the phase P contributes on input basis state c
    #[inline]
    pub fn phase(&self, c: usize) -> Cplx<T> {
        if (c & self.yz).count_ones() % 2 == 0 {
            self.i_pow
        } else {
            -self.i_pow
        }
    }
}

/// Read a packed entry in either index order
#[inline]
pub(crate) fn load_any<T: Real>(rho: &[Cplx<T>], r: usize, c: usize) -> Cplx<T> {
    if r >= c {
        rho[idx_map(r, c)]
    } else {
        rho[idx_map(c, r)].conj()
    }
}

/// Trace of the packed matrix
pub fn trace<T: Real>(rho: &[Cplx<T>], dim: usize) -> Cplx<T> {
    let mut acc = Cplx::zero();
    for r in 0..dim {
        acc += rho[idx_map(r, r)];
    }
    acc
}

/// Tr(A·B) for two packed Hermitian matrices
pub fn trace_product<T: Real>(a: &[Cplx<T>], b: &[Cplx<T>], dim: usize) -> Cplx<T> {
    let mut acc = Cplx::zero();
    for r in 0..dim {
        acc += a[idx_map(r, r)] * b[idx_map(r, r)];
        for c in 0..r {
            let i = idx_map(r, c);
            acc += a[i] * b[i].conj() + a[i].conj() * b[i];
        }
    }
    acc
}

/// Tr(Hρ) over a packed ρ
///
/// The imaginary part is ≈ 0 for Hermitian H up to rounding.
pub fn expectation<T: Real>(rho: &[Cplx<T>], ham: &Hamiltonian, dim: usize) -> Result<Cplx<T>> {
    match ham {
        Hamiltonian::Terms { terms, .. } => {
            let mut acc = Cplx::zero();
            for term in terms {
                let ct = compile_term::<T>(term);
                let mut term_acc = Cplx::zero();
                for r in 0..dim {
                    let x = r ^ ct.flip;
                    term_acc += ct.phase(x) * load_any(rho, x, r);
                }
                acc += term_acc.scale(ct.coeff);
            }
            Ok(acc)
        }
        Hamiltonian::Dense { matrix, .. } => {
            let packed = packed_from_dense::<T>(matrix, dim)?;
            Ok(trace_product(&packed, rho, dim))
        }
    }
}

/// Materialize a Hamiltonian into packed lower-triangular storage
pub fn packed_from_ham<T: Real>(ham: &Hamiltonian, dim: usize) -> Result<Vec<Cplx<T>>> {
    match ham {
        Hamiltonian::Terms { terms, .. } => {
            let mut packed = vec![Cplx::zero(); packed_len(dim)];
            for term in terms {
                let ct = compile_term::<T>(term);
                for c in 0..dim {
                    let r = c ^ ct.flip;
                    if r >= c {
                        packed[idx_map(r, c)] += ct.phase(c).scale(ct.coeff);
                    }
                }
            }
            Ok(packed)
        }
        Hamiltonian::Dense { matrix, .. } => packed_from_dense(matrix, dim),
    }
}

fn packed_from_dense<T: Real>(matrix: &[num_complex::Complex64], dim: usize) -> Result<Vec<Cplx<T>>> {
    if matrix.len() != dim * dim {
        return Err(StateError::DimensionMismatch {
            expected: dim * dim,
            actual: matrix.len(),
        });
    }
    let mut packed = vec![Cplx::zero(); packed_len(dim)];
    for r in 0..dim {
        for c in 0..=r {
            let v = matrix[r * dim + c];
            packed[idx_map(r, c)] = cplx(v.re, v.im);
        }
    }
    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhoq_core::Hamiltonian;

    const TOL: f64 = 1e-12;

    fn ground(dim: usize) -> Vec<Cplx<f64>> {
        let mut rho = vec![Cplx::zero(); packed_len(dim)];
        rho[0] = cplx(1.0, 0.0);
        rho
    }

    #[test]
    fn test_z_on_ground() {
        let ham = Hamiltonian::z(1, 0).unwrap();
        let e = expectation(&ground(2), &ham, 2).unwrap();
        assert!((e.re - 1.0).abs() < TOL && e.im.abs() < TOL);
    }

    #[test]
    fn test_x_on_plus_state() {
        let mut rho = ground(2);
        rho[idx_map(0, 0)] = cplx(0.5, 0.0);
        rho[idx_map(1, 0)] = cplx(0.5, 0.0);
        rho[idx_map(1, 1)] = cplx(0.5, 0.0);
        let ham = Hamiltonian::x(1, 0).unwrap();
        let e = expectation(&rho, &ham, 2).unwrap();
        assert!((e.re - 1.0).abs() < TOL);
        let z = Hamiltonian::z(1, 0).unwrap();
        let e = expectation(&rho, &z, 2).unwrap();
        assert!(e.re.abs() < TOL);
    }

    #[test]
    fn test_terms_match_dense_contraction() {
        // Tr(Hρ) from the term path equals the dense trace product
        let mut rho = vec![Cplx::zero(); packed_len(4)];
        rho[idx_map(0, 0)] = cplx(0.4, 0.0);
        rho[idx_map(3, 0)] = cplx(0.2, 0.1);
        rho[idx_map(2, 1)] = cplx(0.0, -0.1);
        rho[idx_map(1, 1)] = cplx(0.3, 0.0);
        rho[idx_map(2, 2)] = cplx(0.2, 0.0);
        rho[idx_map(3, 3)] = cplx(0.1, 0.0);

        let ham = Hamiltonian::from_terms(
            2,
            vec![
                rhoq_core::PauliTerm::new(0.7, vec![(0, rhoq_core::Pauli::X), (1, rhoq_core::Pauli::Y)])
                    .unwrap(),
                rhoq_core::PauliTerm::new(-0.3, vec![(1, rhoq_core::Pauli::Z)]).unwrap(),
            ],
        )
        .unwrap();
        let by_terms = expectation::<f64>(&rho, &ham, 4).unwrap();
        let dense = Hamiltonian::from_dense(2, ham.to_dense()).unwrap();
        let by_dense = expectation::<f64>(&rho, &dense, 4).unwrap();
        assert!((by_terms - by_dense).norm() < TOL);
    }

    #[test]
    fn test_packed_from_terms_matches_dense() {
        let ham = Hamiltonian::from_terms(
            2,
            vec![rhoq_core::PauliTerm::new(0.5, vec![(0, rhoq_core::Pauli::Y)]).unwrap()],
        )
        .unwrap();
        let a = packed_from_ham::<f64>(&ham, 4).unwrap();
        let dense = Hamiltonian::from_dense(2, ham.to_dense()).unwrap();
        let b = packed_from_ham::<f64>(&dense, 4).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < TOL);
        }
    }
}
