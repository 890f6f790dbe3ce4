//! Householder reflections through views.
//!
//! A reflector `H = I - tau * v * v^H` is generated from a column split into
//! its leading element and the remaining run, stored scaled so the leading
//! element of `v` is an implicit one. The sign of the shift is chosen to
//! avoid cancellation, and the formulas stay exact for real element types.

use crate::alias::same_storage;
use crate::matview::MatViewMut;
use crate::ops;
use crate::scalar::Scalar;
use crate::view::{VecView, VecViewMut};
use num_traits::{Float, Zero};

/// Build a reflector annihilating `x` below the leading element `x0`.
///
/// On return `x` holds the reflector tail (scaled by the implicit leading
/// one). Returns `(tau, r)` where `r` is the value the leading element takes
/// after applying the reflector. A numerically zero column yields the
/// identity reflector `(0, x0)`.
pub fn make_reflector<T: Scalar>(x0: T, x: &mut VecViewMut<'_, T>) -> (T, T) {
    let mut norm_sq = x0.modulus() * x0.modulus();
    for i in 0..x.len() {
        let v = x.get(i);
        norm_sq = norm_sq + v.modulus() * v.modulus();
    }
    if norm_sq.is_zero() {
        return (T::zero(), x0);
    }
    let norm = norm_sq.sqrt();
    let alpha = x0.modulus();
    // sigma carries the phase of x0 so that v0 = x0 + sigma cannot cancel
    let sigma = if alpha.is_zero() {
        T::from_real(norm)
    } else {
        T::from_real(norm) * (x0 / T::from_real(alpha))
    };
    let v0 = x0 + sigma;
    let tau = v0 / sigma;
    ops::scale(x, T::one() / v0);
    (tau, -sigma)
}

/// Apply `H = I - tau * v * v^H` from the left, where `v` is the reflector
/// tail with an implicit leading one. The matrix must have `v.len() + 1`
/// rows.
///
/// # Panics
///
/// Panics on an extent mismatch. The reflector must not share storage with
/// the matrix.
pub fn apply_reflector<T: Scalar>(tau: T, v: &VecView<'_, T>, m: &mut MatViewMut<'_, T>) {
    assert_eq!(
        m.nrows(),
        v.len() + 1,
        "reflector length {} does not match {} rows",
        v.len(),
        m.nrows()
    );
    debug_assert!(
        !same_storage(v.storage_range(), m.storage_range()),
        "reflector aliases the matrix it is applied to"
    );
    if tau.is_zero() {
        return;
    }
    for j in 0..m.ncols() {
        let mut dot = m.get(0, j);
        for i in 0..v.len() {
            dot = dot + v.get(i).conj() * m.get(i + 1, j);
        }
        dot = dot * tau;
        let head = m.get(0, j);
        m.set(0, j, head - dot);
        for i in 0..v.len() {
            let old = m.get(i + 1, j);
            m.set(i + 1, j, old - dot * v.get(i));
        }
    }
}
