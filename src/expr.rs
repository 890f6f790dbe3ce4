//! Deferred composite expressions.
//!
//! A composite captures operand views and a scalar without computing
//! anything; assignment to a destination view materializes it. The
//! lifecycle is enforced by move semantics: `assign_to` consumes the
//! composite, so it cannot be retained past the statement that materializes
//! it, and the operand borrows it holds end there.
//!
//! Materialization always follows the same order: shape compatibility of
//! the destination is checked first (fatally, naming both shapes), then
//! source/destination aliasing decides between direct evaluation and a
//! temporary, then the per-shape kernel runs.

use crate::alias::{alias_check, AliasCheck};
use crate::matview::{MatView, MatViewMut};
use crate::multiply;
use crate::ops;
use crate::scalar::Scalar;
use crate::shape::{is_assignable, product_shape, Shape};
use crate::solve;
use crate::vector::Vector;
use crate::view::{VecView, VecViewMut};
use crate::Result;

/// `alpha * A`, deferred.
#[derive(Debug, Clone, Copy)]
pub struct ScaledMat<'a, T: Scalar> {
    alpha: T,
    a: MatView<'a, T>,
}

/// Build a deferred `alpha * A`.
pub fn scaled<T: Scalar>(alpha: T, a: MatView<'_, T>) -> ScaledMat<'_, T> {
    ScaledMat { alpha, a }
}

impl<'a, T: Scalar> ScaledMat<'a, T> {
    /// Shape of the materialized result.
    pub fn shape(&self) -> Shape {
        self.a.shape()
    }

    /// Rescale the deferred expression.
    pub fn scale(self, factor: T) -> ScaledMat<'a, T> {
        ScaledMat {
            alpha: factor * self.alpha,
            a: self.a,
        }
    }

    /// Materialize into `dest`.
    ///
    /// # Panics
    ///
    /// Panics fatally if the operand shape is not assignable to the
    /// destination shape.
    pub fn assign_to(self, dest: &mut MatViewMut<'_, T>) {
        assert!(
            is_assignable(self.a.shape(), dest.shape()),
            "{:?} is not assignable to {:?}",
            self.a.shape(),
            dest.shape()
        );
        assert!(
            self.a.nrows() == dest.nrows() && self.a.ncols() == dest.ncols(),
            "scaled assignment extent mismatch"
        );
        match alias_check(self.a.storage_range(), dest.storage_range()) {
            AliasCheck::Disjoint => {
                for j in 0..dest.ncols() {
                    let span = dest.stored_col_span(j);
                    for i in span {
                        if dest.is_stored(i, j) {
                            dest.set(i, j, self.alpha * self.a.get(i, j));
                        }
                    }
                }
            }
            // an equal address range does not imply an equal element map
            // (a transposed view covers the same range), so any overlap is
            // resolved through a temporary; pure in-place scaling should go
            // through `ops::mat_scale` instead
            _ => {
                let tmp = crate::matrix::Matrix::from_view(&self.a);
                let scaled_view = tmp.view();
                for j in 0..dest.ncols() {
                    let span = dest.stored_col_span(j);
                    for i in span {
                        if dest.is_stored(i, j) {
                            dest.set(i, j, self.alpha * scaled_view.get(i, j));
                        }
                    }
                }
            }
        }
    }
}

/// `alpha * A * B`, deferred.
#[derive(Debug, Clone, Copy)]
pub struct MatMatProd<'a, T: Scalar> {
    alpha: T,
    a: MatView<'a, T>,
    b: MatView<'a, T>,
}

impl<'a, T: Scalar> MatMatProd<'a, T> {
    /// Shape of the materialized product.
    pub fn shape(&self) -> Shape {
        product_shape(self.a.shape(), self.b.shape())
    }

    /// Rescale the deferred product.
    pub fn scale(self, factor: T) -> MatMatProd<'a, T> {
        MatMatProd {
            alpha: factor * self.alpha,
            ..self
        }
    }

    /// Materialize into `dest`; see [`multiply::mat_mat_into`] for the
    /// shape and aliasing rules.
    pub fn assign_to(self, dest: &mut MatViewMut<'_, T>) {
        multiply::mat_mat_into(self.alpha, &self.a, &self.b, dest);
    }

    /// Materialize into a fresh dense matrix.
    pub fn eval(self) -> crate::matrix::Matrix<T> {
        multiply::mat_mat(self.alpha, &self.a, &self.b)
    }
}

/// `alpha * A * x`, deferred.
#[derive(Debug, Clone, Copy)]
pub struct MatVecProd<'a, T: Scalar> {
    alpha: T,
    a: MatView<'a, T>,
    x: VecView<'a, T>,
}

impl<'a, T: Scalar> MatVecProd<'a, T> {
    /// Rescale the deferred product.
    pub fn scale(self, factor: T) -> MatVecProd<'a, T> {
        MatVecProd {
            alpha: factor * self.alpha,
            ..self
        }
    }

    /// Materialize into `dest`.
    pub fn assign_to(self, dest: &mut VecViewMut<'_, T>) {
        multiply::mat_vec_into(self.alpha, &self.a, &self.x, T::zero(), dest);
    }

    /// Materialize into a fresh vector.
    pub fn eval(self) -> Vector<T> {
        multiply::mat_vec(self.alpha, &self.a, &self.x)
    }
}

/// A scalar divided by a matrix: `alpha * A^{-1}`, deferred.
#[derive(Debug, Clone, Copy)]
pub struct ScalarQuot<'a, T: Scalar> {
    alpha: T,
    a: MatView<'a, T>,
}

/// Build a deferred `alpha / A`.
pub fn scalar_div<T: Scalar>(alpha: T, a: MatView<'_, T>) -> ScalarQuot<'_, T> {
    ScalarQuot { alpha, a }
}

impl<'a, T: Scalar> ScalarQuot<'a, T> {
    /// Shape of the materialized result.
    pub fn shape(&self) -> Shape {
        self.a.shape().inverse_shape()
    }

    /// Materialize into `dest`: the operand's inverse is computed directly
    /// into the destination's storage, then rescaled in place.
    ///
    /// # Errors
    ///
    /// [`crate::ShapedError::Singular`] when the operand is not invertible.
    ///
    /// # Panics
    ///
    /// Panics fatally if the inverse's shape is not assignable to the
    /// destination shape.
    pub fn assign_to(self, dest: &mut MatViewMut<'_, T>) -> Result<()> {
        solve::invert_into(&self.a, dest)?;
        if self.alpha != T::one() {
            ops::mat_scale(dest, self.alpha);
        }
        Ok(())
    }
}

// Operator sugar building composites. The composite holds borrows of both
// operands, so the product of two views is deferred for free.
impl<'a, T: Scalar> core::ops::Mul<MatView<'a, T>> for MatView<'a, T> {
    type Output = MatMatProd<'a, T>;

    fn mul(self, rhs: MatView<'a, T>) -> MatMatProd<'a, T> {
        MatMatProd {
            alpha: T::one(),
            a: self,
            b: rhs,
        }
    }
}

impl<'a, T: Scalar> core::ops::Mul<VecView<'a, T>> for MatView<'a, T> {
    type Output = MatVecProd<'a, T>;

    fn mul(self, rhs: VecView<'a, T>) -> MatVecProd<'a, T> {
        MatVecProd {
            alpha: T::one(),
            a: self,
            x: rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use approx::assert_relative_eq;

    #[test]
    fn scaled_assignment_into_matching_shape() {
        let m = Matrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
        let mut out = Matrix::<f64>::zeros(3, 3);
        scaled(2.0, m.lower_triangle()).assign_to(&mut out.lower_triangle_mut());
        assert_eq!(out[(2, 0)], 12.0);
        assert_eq!(out[(0, 2)], 0.0);
    }

    #[test]
    #[should_panic(expected = "not assignable")]
    fn scaled_assignment_shape_violation_is_fatal() {
        let m = Matrix::from_fn(3, 3, |i, j| (i + j) as f64);
        let mut out = Matrix::<f64>::zeros(3, 3);
        // Rectangular data cannot be assigned through a triangular window
        scaled(1.0, m.view()).assign_to(&mut out.lower_triangle_mut());
    }

    #[test]
    fn product_composite_materializes_once() {
        let a = Matrix::from_fn(2, 3, |i, j| (i + j) as f64);
        let b = Matrix::from_fn(3, 2, |i, j| (i as f64) - (j as f64));
        let c = (a.view() * b.view()).scale(3.0).eval();
        let r = multiply::mat_mat(3.0, &a.view(), &b.view());
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(c[(i, j)], r[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn mat_vec_composite() {
        let a = Matrix::from_fn(3, 3, |i, j| if i == j { 2.0 } else { 0.0 });
        let x = Vector::from_fn(3, |i| (i + 1) as f64);
        let y = (a.view() * x.view()).eval();
        assert_eq!(y.as_slice(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn scalar_over_matrix_inverts_then_rescales() {
        let n = 3;
        let m = Matrix::from_fn(n, n, |i, j| {
            if i >= j {
                2.0 + (i + j) as f64
            } else {
                0.0
            }
        });
        let l = m.lower_triangle();
        let mut out = Matrix::<f64>::zeros(n, n);
        scalar_div(2.0, l).assign_to(&mut out.lower_triangle_mut()).unwrap();
        // out = 2 * L^{-1}, so L * out = 2 I
        let p = multiply::mat_mat(1.0, &l, &out.lower_triangle());
        for i in 0..n {
            for j in 0..n {
                let want = if i == j { 2.0 } else { 0.0 };
                assert_relative_eq!(p[(i, j)], want, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn quot_reports_singularity() {
        let z = Matrix::<f64>::zeros(2, 2);
        let mut out = Matrix::<f64>::zeros(2, 2);
        assert!(scalar_div(1.0, z.view()).assign_to(&mut out.view_mut()).is_err());
    }

    #[test]
    fn composite_shape_prediction() {
        let m = Matrix::from_fn(3, 3, |i, j| (i + j) as f64);
        let p = m.lower_triangle() * m.lower_triangle();
        assert_eq!(p.shape(), Shape::LowerTriangular);
        let q = scalar_div(1.0, m.unit_upper_triangle());
        assert_eq!(q.shape(), Shape::UnitUpperTriangular);
    }
}
