//! Inverse kernels: `dest := A^{-1}`.
//!
//! The algorithm is dispatched on the operand's shape: reciprocal for
//! diagonal, substitution for triangular (band-limited sums for banded
//! triangles), LDL for the symmetry classes, and Gauss-Jordan with partial
//! pivoting for the general square case. The destination is validated
//! against [`Shape::inverse_shape`] before anything is written.
//!
//! A structurally zero pivot is numerical degeneracy, not a contract
//! violation, and is reported through the `Result` channel as
//! [`ShapedError::Singular`].

use crate::alias::{alias_check, AliasCheck};
use crate::element_op::Conjugation;
use crate::matrix::Matrix;
use crate::matview::{MatView, MatViewMut};
use crate::scalar::Scalar;
use crate::shape::{is_assignable, Shape};
use crate::{ops, Result, ShapedError};

/// `dest := A^{-1}`.
///
/// # Errors
///
/// [`ShapedError::Singular`] when a pivot is exactly zero.
///
/// # Panics
///
/// Panics on a non-square operand, an extent mismatch, or a destination
/// shape that cannot hold the inverse's shape.
pub fn invert_into<T: Scalar>(a: &MatView<'_, T>, dest: &mut MatViewMut<'_, T>) -> Result<()> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "inverse of a non-square matrix");
    assert!(
        dest.nrows() == n && dest.ncols() == n,
        "invert_into destination extent mismatch"
    );
    let inv_shape = a.shape().inverse_shape();
    assert!(
        is_assignable(inv_shape, dest.shape()),
        "inverse of {:?} has shape {:?}, which is not assignable to {:?}",
        a.shape(),
        inv_shape,
        dest.shape()
    );

    match alias_check(a.storage_range(), dest.storage_range()) {
        AliasCheck::Disjoint => invert_dispatch(a, dest),
        // the operand is read throughout; any overlap with the destination
        // routes the result through a temporary
        _ => {
            let (lo, hi) = dest.bandwidths();
            let mut buf = vec![T::zero(); n * n];
            let mut tmp = MatViewMut::new_banded(
                &mut buf,
                0,
                n,
                n,
                1,
                n as isize,
                Conjugation::NonConj,
                dest.shape(),
                lo,
                hi,
            )
            .expect("temporary view over fresh dense storage");
            invert_dispatch(a, &mut tmp)?;
            ops::mat_copy_into(&tmp.as_view(), dest);
            Ok(())
        }
    }
}

fn invert_dispatch<T: Scalar>(a: &MatView<'_, T>, dest: &mut MatViewMut<'_, T>) -> Result<()> {
    let f = a.shape().flags();
    if a.shape() == Shape::Diagonal {
        diagonal_inverse(a, dest)
    } else if f.symmetric || f.hermitian {
        ldl_inverse(a, dest, f.hermitian)
    } else if f.upper != f.lower {
        triangular_inverse(a, dest, f.lower)
    } else {
        gauss_jordan_inverse(a, dest)
    }
}

fn diagonal_inverse<T: Scalar>(a: &MatView<'_, T>, dest: &mut MatViewMut<'_, T>) -> Result<()> {
    let n = a.nrows();
    dest.fill(T::zero());
    for i in 0..n {
        let d = a.get(i, i);
        if d.is_zero() {
            return Err(ShapedError::Singular(i));
        }
        dest.set(i, i, T::one() / d);
    }
    Ok(())
}

/// Column-by-column substitution: solve `A x = e_j` for each basis column.
/// The inner sums run over the operand's logical band only, so a banded
/// triangle pays band cost per column even though its inverse is full.
fn triangular_inverse<T: Scalar>(
    a: &MatView<'_, T>,
    dest: &mut MatViewMut<'_, T>,
    lower: bool,
) -> Result<()> {
    let n = a.nrows();
    dest.fill(T::zero());
    let mut x = vec![T::zero(); n];
    for j in 0..n {
        if lower {
            for i in j..n {
                let e = if i == j { T::one() } else { T::zero() };
                let (llo, _) = a.logical_bandwidths();
                let k_start = i.saturating_sub(llo).max(j);
                let mut acc = e;
                for k in k_start..i {
                    acc = acc - a.get(i, k) * x[k];
                }
                let d = a.get(i, i);
                if d.is_zero() {
                    return Err(ShapedError::Singular(i));
                }
                x[i] = acc / d;
            }
            for i in j..n {
                if dest.is_stored(i, j) {
                    dest.set(i, j, x[i]);
                }
            }
        } else {
            for ii in 0..=j {
                let i = j - ii;
                let e = if i == j { T::one() } else { T::zero() };
                let (_, lhi) = a.logical_bandwidths();
                let k_end = (i + lhi).min(j);
                let mut acc = e;
                for k in (i + 1)..=k_end {
                    acc = acc - a.get(i, k) * x[k];
                }
                let d = a.get(i, i);
                if d.is_zero() {
                    return Err(ShapedError::Singular(i));
                }
                x[i] = acc / d;
            }
            for i in 0..=j {
                if dest.is_stored(i, j) {
                    dest.set(i, j, x[i]);
                }
            }
        }
    }
    Ok(())
}

/// LDL factorization of the symmetry classes, then column solves.
///
/// `A = L D L^T` for symmetric operands and `A = L D L^H` for Hermitian
/// ones, with `L` unit lower and `D` diagonal. For Hermitian operands `D`
/// is real by definition; its imaginary residue is truncated, not kept.
fn ldl_inverse<T: Scalar>(
    a: &MatView<'_, T>,
    dest: &mut MatViewMut<'_, T>,
    hermitian: bool,
) -> Result<()> {
    let n = a.nrows();
    // work holds L strictly below the diagonal and D on it
    let mut w = Matrix::from_fn(n, n, |i, j| if i >= j { a.get(i, j) } else { T::zero() });

    for j in 0..n {
        let mut d = w[(j, j)];
        for k in 0..j {
            let l = w[(j, k)];
            let sq = if hermitian { l * l.conj() } else { l * l };
            d = d - sq * w[(k, k)];
        }
        if hermitian {
            d = d.zero_imag();
        }
        if d.is_zero() {
            return Err(ShapedError::Singular(j));
        }
        w[(j, j)] = d;
        for i in (j + 1)..n {
            let mut v = w[(i, j)];
            for k in 0..j {
                let ljk = if hermitian { w[(j, k)].conj() } else { w[(j, k)] };
                v = v - w[(i, k)] * ljk * w[(k, k)];
            }
            w[(i, j)] = v / d;
        }
    }

    let mut x = vec![T::zero(); n];
    for j in 0..n {
        // forward: L y = e_j
        for i in 0..n {
            let mut acc = if i == j { T::one() } else { T::zero() };
            for k in 0..i {
                acc = acc - w[(i, k)] * x[k];
            }
            x[i] = acc;
        }
        // diagonal: z = D^{-1} y
        for (i, xi) in x.iter_mut().enumerate() {
            *xi = *xi / w[(i, i)];
        }
        // backward: L^T x = z (or L^H x = z)
        for ii in 0..n {
            let i = n - 1 - ii;
            let mut acc = x[i];
            for k in (i + 1)..n {
                let lki = if hermitian { w[(k, i)].conj() } else { w[(k, i)] };
                acc = acc - lki * x[k];
            }
            x[i] = acc;
        }
        for i in 0..n {
            if dest.is_stored(i, j) {
                dest.set(i, j, x[i]);
            }
        }
    }
    Ok(())
}

fn gauss_jordan_inverse<T: Scalar>(a: &MatView<'_, T>, dest: &mut MatViewMut<'_, T>) -> Result<()> {
    let n = a.nrows();
    let mut work = Matrix::from_view(a);
    let mut inv = Matrix::<T>::identity(n);

    for k in 0..n {
        // partial pivot on the largest modulus in column k
        let mut p = k;
        let mut best = work[(k, k)].modulus();
        for i in (k + 1)..n {
            let m = work[(i, k)].modulus();
            if m > best {
                best = m;
                p = i;
            }
        }
        if work[(p, k)].is_zero() {
            return Err(ShapedError::Singular(k));
        }
        if p != k {
            for j in 0..n {
                let (a1, a2) = (work[(k, j)], work[(p, j)]);
                work[(k, j)] = a2;
                work[(p, j)] = a1;
                let (b1, b2) = (inv[(k, j)], inv[(p, j)]);
                inv[(k, j)] = b2;
                inv[(p, j)] = b1;
            }
        }
        let pivot = work[(k, k)];
        let inv_pivot = T::one() / pivot;
        for j in 0..n {
            work[(k, j)] = work[(k, j)] * inv_pivot;
            inv[(k, j)] = inv[(k, j)] * inv_pivot;
        }
        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = work[(i, k)];
            if factor.is_zero() {
                continue;
            }
            for j in 0..n {
                work[(i, j)] = work[(i, j)] - factor * work[(k, j)];
                inv[(i, j)] = inv[(i, j)] - factor * inv[(k, j)];
            }
        }
    }
    ops::mat_copy_into(&inv.view(), dest);
    Ok(())
}
