//! Shape-aware multiply kernels.
//!
//! The kernels validate the destination against [`product_shape`] before
//! writing, restrict every inner loop to the operands' logical bands, and
//! resolve source/destination aliasing through the temporary policy: an
//! overlap that is not provably write-order safe is materialized into a
//! fresh container first.

use crate::alias::{alias_check, AliasCheck};
use crate::element_op::Conjugation;
use crate::matrix::Matrix;
use crate::matview::{MatView, MatViewMut};
use crate::scalar::Scalar;
use crate::shape::{is_assignable, product_shape, Shape};
use crate::vector::Vector;
use crate::view::{VecView, VecViewMut};
use crate::ops;

/// Column-block width for the dense matrix product. Keeps a block of the
/// destination and the corresponding rows of the left operand resident in
/// cache across the inner loops.
pub const MM_BLOCK: usize = 32;

/// `y := alpha * A * x + beta * y`.
///
/// The inner loop runs over the logical band of each row only, so banded
/// and triangular operands cost what their fill costs. If `x` shares
/// storage with `y` it is copied out first.
///
/// # Panics
///
/// Panics on extent mismatches.
pub fn mat_vec_into<T: Scalar>(
    alpha: T,
    a: &MatView<'_, T>,
    x: &VecView<'_, T>,
    beta: T,
    y: &mut VecViewMut<'_, T>,
) {
    assert_eq!(
        a.ncols(),
        x.len(),
        "mat_vec extent mismatch: {}x{} * {}",
        a.nrows(),
        a.ncols(),
        x.len()
    );
    assert_eq!(a.nrows(), y.len(), "mat_vec destination extent mismatch");
    debug_assert_eq!(product_shape(a.shape(), Shape::Vector), Shape::Vector);

    match alias_check(x.storage_range(), y.storage_range()) {
        AliasCheck::Disjoint => mat_vec_core(alpha, a, x, beta, y),
        // x is read while y is written; any overlap forces a copy of x
        _ => {
            let tmp = Vector::from_view(x);
            mat_vec_core(alpha, a, &tmp.view(), beta, y);
        }
    }
}

fn mat_vec_core<T: Scalar>(
    alpha: T,
    a: &MatView<'_, T>,
    x: &VecView<'_, T>,
    beta: T,
    y: &mut VecViewMut<'_, T>,
) {
    for i in 0..a.nrows() {
        let mut acc = T::zero();
        for j in a.logical_row_span(i) {
            acc = acc + a.get(i, j) * x.get(j);
        }
        let prior = if beta.is_zero() {
            T::zero()
        } else {
            beta * y.get(i)
        };
        y.set(i, alpha * acc + prior);
    }
}

/// `dest := alpha * A * B`.
///
/// The destination shape must be able to hold [`product_shape`] of the
/// operands; only the destination's stored region is computed. Sources that
/// share storage with the destination are routed through a temporary
/// matching the destination's shape and extent.
///
/// # Panics
///
/// Panics on extent mismatches, and fatally if the product shape is not
/// assignable to the destination shape.
pub fn mat_mat_into<T: Scalar>(
    alpha: T,
    a: &MatView<'_, T>,
    b: &MatView<'_, T>,
    dest: &mut MatViewMut<'_, T>,
) {
    assert_eq!(
        a.ncols(),
        b.nrows(),
        "mat_mat inner extent mismatch: {}x{} * {}x{}",
        a.nrows(),
        a.ncols(),
        b.nrows(),
        b.ncols()
    );
    assert!(
        dest.nrows() == a.nrows() && dest.ncols() == b.ncols(),
        "mat_mat destination extent mismatch"
    );
    let ps = product_shape(a.shape(), b.shape());
    assert!(
        is_assignable(ps, dest.shape()),
        "product of {:?} and {:?} has shape {:?}, which is not assignable to {:?}",
        a.shape(),
        b.shape(),
        ps,
        dest.shape()
    );

    let dest_range = dest.storage_range();
    let overlap = alias_check(a.storage_range(), dest_range) != AliasCheck::Disjoint
        || alias_check(b.storage_range(), dest_range) != AliasCheck::Disjoint;
    if overlap {
        // materialize into a temporary of the destination's shape and
        // extent, then copy through
        let (m, n) = (dest.nrows(), dest.ncols());
        let (lo, hi) = dest.bandwidths();
        let mut buf = vec![T::zero(); m * n];
        let mut tmp = MatViewMut::new_banded(
            &mut buf,
            0,
            m,
            n,
            1,
            m as isize,
            Conjugation::NonConj,
            dest.shape(),
            lo,
            hi,
        )
        .expect("temporary view over fresh dense storage");
        mat_mat_core(alpha, a, b, &mut tmp);
        ops::mat_copy_into(&tmp.as_view(), dest);
    } else {
        mat_mat_core(alpha, a, b, dest);
    }
}

fn mat_mat_core<T: Scalar>(
    alpha: T,
    a: &MatView<'_, T>,
    b: &MatView<'_, T>,
    dest: &mut MatViewMut<'_, T>,
) {
    let k_extent = a.ncols();
    let n = dest.ncols();
    for j0 in (0..n).step_by(MM_BLOCK) {
        let j1 = (j0 + MM_BLOCK).min(n);
        for j in j0..j1 {
            let span = dest.stored_col_span(j);
            for i in span {
                if !dest.is_stored(i, j) {
                    continue;
                }
                // intersect the logical bands of row i of A and column j of B
                let ra = a.logical_row_span(i);
                let rb = b.logical_col_span(j);
                let k_start = ra.start.max(rb.start);
                let k_end = ra.end.min(rb.end).min(k_extent);
                let mut acc = T::zero();
                for k in k_start..k_end {
                    acc = acc + a.get(i, k) * b.get(k, j);
                }
                dest.set(i, j, alpha * acc);
            }
        }
    }
}

/// `alpha * A * B` materialized into a new dense matrix.
///
/// Structural zeros of the product shape come out as explicit zeros.
pub fn mat_mat<T: Scalar>(alpha: T, a: &MatView<'_, T>, b: &MatView<'_, T>) -> Matrix<T> {
    let mut out = Matrix::zeros(a.nrows(), b.ncols());
    mat_mat_into(alpha, a, b, &mut out.view_mut());
    out
}

/// `alpha * A * x` materialized into a new vector.
pub fn mat_vec<T: Scalar>(alpha: T, a: &MatView<'_, T>, x: &VecView<'_, T>) -> Vector<T> {
    let mut out = Vector::zeros(a.nrows());
    mat_vec_into(alpha, a, x, T::zero(), &mut out.view_mut());
    out
}

/// `dest := alpha * A + beta * B`, element-wise over the destination's
/// stored region, validated against [`crate::shape::sum_shape`].
///
/// # Panics
///
/// Panics on extent mismatches, and fatally if the sum shape is not
/// assignable to the destination shape.
pub fn mat_add_into<T: Scalar>(
    alpha: T,
    a: &MatView<'_, T>,
    beta: T,
    b: &MatView<'_, T>,
    dest: &mut MatViewMut<'_, T>,
) {
    assert!(
        a.nrows() == b.nrows() && a.ncols() == b.ncols(),
        "mat_add extent mismatch: {}x{} + {}x{}",
        a.nrows(),
        a.ncols(),
        b.nrows(),
        b.ncols()
    );
    assert!(dest.nrows() == a.nrows() && dest.ncols() == a.ncols());
    let ss = crate::shape::sum_shape(a.shape(), b.shape());
    assert!(
        is_assignable(ss, dest.shape()),
        "sum of {:?} and {:?} has shape {:?}, which is not assignable to {:?}",
        a.shape(),
        b.shape(),
        ss,
        dest.shape()
    );
    for j in 0..dest.ncols() {
        let span = dest.stored_col_span(j);
        for i in span {
            if dest.is_stored(i, j) {
                dest.set(i, j, alpha * a.get(i, j) + beta * b.get(i, j));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{BandMatrix, SymMatrix};
    use approx::assert_relative_eq;

    fn naive_mul(a: &MatView<'_, f64>, b: &MatView<'_, f64>) -> Matrix<f64> {
        Matrix::from_fn(a.nrows(), b.ncols(), |i, j| {
            (0..a.ncols()).map(|k| a.get(i, k) * b.get(k, j)).sum()
        })
    }

    #[test]
    fn dense_product_matches_naive() {
        let a = Matrix::from_fn(4, 3, |i, j| (i * 3 + j + 1) as f64);
        let b = Matrix::from_fn(3, 5, |i, j| (i as f64) - (j as f64) * 0.5);
        let c = mat_mat(2.0, &a.view(), &b.view());
        let r = naive_mul(&a.view(), &b.view());
        for i in 0..4 {
            for j in 0..5 {
                assert_relative_eq!(c[(i, j)], 2.0 * r[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn banded_product_matches_dense_reference() {
        let n = 6;
        let mut a = BandMatrix::<f64>::banded(n, n, 1, 1).unwrap();
        let mut b = BandMatrix::<f64>::banded(n, n, 2, 0).unwrap();
        {
            let mut av = a.view_mut();
            let mut bv = b.view_mut();
            for j in 0..n {
                for i in 0..n {
                    if av.is_stored(i, j) {
                        av.set(i, j, (i + 2 * j + 1) as f64);
                    }
                    if bv.is_stored(i, j) {
                        bv.set(i, j, (i as f64) - (j as f64) + 1.0);
                    }
                }
            }
        }
        let dense_a = Matrix::from_view(&a.view());
        let dense_b = Matrix::from_view(&b.view());
        let expected = naive_mul(&dense_a.view(), &dense_b.view());
        let got = mat_mat(1.0, &a.view(), &b.view());
        for i in 0..n {
            for j in 0..n {
                assert_relative_eq!(got[(i, j)], expected[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn symmetric_mat_vec_uses_reflection() {
        let n = 4;
        let mut s = SymMatrix::<f64>::symmetric(n);
        s.fill_lower(|i, j| (i + j) as f64 + 1.0);
        let x = Vector::from_fn(n, |i| (i + 1) as f64);
        let y = mat_vec(1.0, &s.view(), &x.view());
        let dense = Matrix::from_view(&s.view());
        let expected = mat_vec(1.0, &dense.view(), &x.view());
        for i in 0..n {
            assert_relative_eq!(y[i], expected[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn unit_triangular_product_stays_unit() {
        let n = 4;
        let a = Matrix::from_fn(n, n, |i, j| (i * n + j) as f64 * 0.25 + 1.0);
        let b = Matrix::from_fn(n, n, |i, j| (i as f64) - 0.5 * (j as f64) + 2.0);
        let ua = a.unit_lower_triangle();
        let ub = b.unit_lower_triangle();
        assert_eq!(
            product_shape(ua.shape(), ub.shape()),
            Shape::UnitLowerTriangular
        );
        let mut store = vec![0.0f64; n * n];
        let mut dest = MatViewMut::new(
            &mut store,
            0,
            n,
            n,
            1,
            n as isize,
            Conjugation::NonConj,
            Shape::UnitLowerTriangular,
        )
        .unwrap();
        mat_mat_into(1.0, &ua, &ub, &mut dest);
        let expected = naive_mul(&Matrix::from_view(&ua).view(), &Matrix::from_view(&ub).view());
        for i in 0..n {
            for j in 0..n {
                assert_relative_eq!(dest.get(i, j), expected[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    #[should_panic(expected = "not assignable")]
    fn product_shape_violation_is_fatal() {
        let n = 3;
        let a = Matrix::from_fn(n, n, |i, j| ((i + 1) * (j + 1)) as f64);
        let b = Matrix::<f64>::identity(n);
        let mut store = vec![0.0f64; n * n];
        let mut dest = MatViewMut::new(
            &mut store,
            0,
            n,
            n,
            1,
            n as isize,
            Conjugation::NonConj,
            Shape::LowerTriangular,
        )
        .unwrap();
        mat_mat_into(1.0, &a.view(), &b.view(), &mut dest);
    }

    #[test]
    fn mat_add_symmetric_pair() {
        let n = 3;
        let mut s1 = SymMatrix::<f64>::symmetric(n);
        let mut s2 = SymMatrix::<f64>::symmetric(n);
        s1.fill_lower(|i, j| (i + j) as f64);
        s2.fill_lower(|i, j| (i * j) as f64 + 1.0);
        let mut out = SymMatrix::<f64>::symmetric(n);
        mat_add_into(1.0, &s1.view(), 2.0, &s2.view(), &mut out.view_mut());
        assert_relative_eq!(out.get(0, 2), s1.get(0, 2) + 2.0 * s2.get(0, 2));
        assert_eq!(out.get(0, 2), out.get(2, 0));
    }
}
