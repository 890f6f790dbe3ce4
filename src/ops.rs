//! Element-wise kernels over views.
//!
//! Every kernel has a generic strided loop that goes through logical
//! `get`/`set` (stride, conjugation and shape all respected) and, where the
//! descriptors allow it, a fast path that operates on the underlying slices
//! directly. The fast-path decision is delegated to [`crate::blas`], the
//! boundary an external BLAS-backed routine would use.

use crate::blas;
use crate::matview::{MatView, MatViewMut};
use crate::scalar::Scalar;
use crate::shape::is_assignable;
use crate::view::{VecView, VecViewMut};

/// `dest := src`, element by element.
///
/// # Panics
///
/// Panics if the extents differ.
pub fn copy_into<T: Scalar>(src: &VecView<'_, T>, dest: &mut VecViewMut<'_, T>) {
    assert_eq!(
        src.len(),
        dest.len(),
        "copy_into extent mismatch: {} vs {}",
        src.len(),
        dest.len()
    );
    if blas::copy_fast(src, dest) {
        return;
    }
    for i in 0..src.len() {
        dest.set(i, src.get(i));
    }
}

/// `dest *= alpha`, in place.
///
/// Source and destination are the exact same view: the one aliasing pattern
/// that is always write-order safe, since each element depends only on the
/// value it replaces.
pub fn scale<T: Scalar>(dest: &mut VecViewMut<'_, T>, alpha: T) {
    if blas::scale_fast(dest, alpha) {
        return;
    }
    for i in 0..dest.len() {
        let v = dest.get(i);
        dest.set(i, alpha * v);
    }
}

/// `y += alpha * x`.
///
/// # Panics
///
/// Panics if the extents differ.
pub fn axpy<T: Scalar>(alpha: T, x: &VecView<'_, T>, y: &mut VecViewMut<'_, T>) {
    assert_eq!(
        x.len(),
        y.len(),
        "axpy extent mismatch: {} vs {}",
        x.len(),
        y.len()
    );
    if alpha.is_zero() {
        return;
    }
    for i in 0..x.len() {
        let v = y.get(i);
        y.set(i, v + alpha * x.get(i));
    }
}

/// `dest := alpha * x + beta * dest`.
pub fn axpby<T: Scalar>(alpha: T, x: &VecView<'_, T>, beta: T, dest: &mut VecViewMut<'_, T>) {
    assert_eq!(x.len(), dest.len(), "axpby extent mismatch");
    for i in 0..x.len() {
        let acc = if beta.is_zero() {
            T::zero()
        } else {
            beta * dest.get(i)
        };
        dest.set(i, acc + alpha * x.get(i));
    }
}

/// Inner product `sum_i x_i * y_i` of the logical elements.
///
/// Conjugation comes from the views; pass `x.conjugate()` for `x^H y`.
///
/// # Panics
///
/// Panics if the extents differ.
pub fn dot<T: Scalar>(x: &VecView<'_, T>, y: &VecView<'_, T>) -> T {
    assert_eq!(x.len(), y.len(), "dot extent mismatch: {} vs {}", x.len(), y.len());
    let mut acc = T::zero();
    for i in 0..x.len() {
        acc = acc + x.get(i) * y.get(i);
    }
    acc
}

/// Exchange the logical contents of two equal-length views.
///
/// # Panics
///
/// Panics if the extents differ.
pub fn swap<T: Scalar>(a: &mut VecViewMut<'_, T>, b: &mut VecViewMut<'_, T>) {
    assert_eq!(a.len(), b.len(), "swap extent mismatch");
    for i in 0..a.len() {
        let va = a.get(i);
        let vb = b.get(i);
        a.set(i, vb);
        b.set(i, va);
    }
}

/// `dest := src` over the destination's stored region.
///
/// # Panics
///
/// Panics on extent mismatches, and fatally if the source shape is not
/// assignable to the destination shape.
pub fn mat_copy_into<T: Scalar>(src: &MatView<'_, T>, dest: &mut MatViewMut<'_, T>) {
    assert!(
        src.nrows() == dest.nrows() && src.ncols() == dest.ncols(),
        "mat_copy_into extent mismatch: {}x{} vs {}x{}",
        src.nrows(),
        src.ncols(),
        dest.nrows(),
        dest.ncols()
    );
    assert!(
        is_assignable(src.shape(), dest.shape()),
        "{:?} is not assignable to {:?}",
        src.shape(),
        dest.shape()
    );
    for j in 0..dest.ncols() {
        let span = dest.stored_col_span(j);
        for i in span {
            if dest.is_stored(i, j) {
                dest.set(i, j, src.get(i, j));
            }
        }
    }
}

/// Scale every stored element of a matrix view in place.
///
/// Each stored cell is visited exactly once, so reflected symmetric pairs
/// are scaled once, and a Hermitian diagonal stays real.
pub fn mat_scale<T: Scalar>(dest: &mut MatViewMut<'_, T>, alpha: T) {
    for j in 0..dest.ncols() {
        let span = dest.stored_col_span(j);
        for i in span {
            if dest.is_stored(i, j) {
                let v = dest.get(i, j);
                dest.set(i, j, alpha * v);
            }
        }
    }
}
