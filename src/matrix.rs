//! Owning matrix containers: dense, banded, symmetric/Hermitian.
//!
//! Each container owns one contiguous buffer sized to its shape and extents
//! and exposes a canonical shaped view plus derived views. Dense storage is
//! column-major. Band storage packs the diagonals LAPACK-style: `ld = lo +
//! hi + 1` rows per column, element `(i, j)` at `j * ld + (hi + i - j)`,
//! which makes a band matrix an ordinary strided view with `row_step = 1`
//! and `col_step = ld - 1`.

use crate::element_op::Conjugation;
use crate::matview::{MatView, MatViewMut};
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::{multiply, ops, Result, ShapedError};

/// A dense column-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Scalar> Matrix<T> {
    /// An `m x n` matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Build from a function of `(row, col)`.
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut m = Self::zeros(nrows, ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                m.data[i + j * nrows] = f(i, j);
            }
        }
        m
    }

    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Materialize the logical elements of any view into a new dense matrix.
    pub fn from_view(v: &MatView<'_, T>) -> Self {
        Self::from_fn(v.nrows(), v.ncols(), |i, j| v.get(i, j))
    }

    /// The canonical rectangular view.
    pub fn view(&self) -> MatView<'_, T> {
        MatView::new(
            &self.data,
            0,
            self.nrows,
            self.ncols,
            1,
            self.nrows as isize,
            Conjugation::NonConj,
            Shape::Rectangular,
        )
        .expect("canonical view of an owned buffer is always valid")
    }

    /// The canonical mutable view.
    pub fn view_mut(&mut self) -> MatViewMut<'_, T> {
        let (m, n) = (self.nrows, self.ncols);
        MatViewMut::new(
            &mut self.data,
            0,
            m,
            n,
            1,
            m as isize,
            Conjugation::NonConj,
            Shape::Rectangular,
        )
        .expect("canonical view of an owned buffer is always valid")
    }

    fn shaped_view(&self, shape: Shape) -> MatView<'_, T> {
        MatView::new(
            &self.data,
            0,
            self.nrows,
            self.ncols,
            1,
            self.nrows as isize,
            Conjugation::NonConj,
            shape,
        )
        .expect("shaped view over dense square storage")
    }

    fn shaped_view_mut(&mut self, shape: Shape) -> MatViewMut<'_, T> {
        let (m, n) = (self.nrows, self.ncols);
        MatViewMut::new(
            &mut self.data,
            0,
            m,
            n,
            1,
            m as isize,
            Conjugation::NonConj,
            shape,
        )
        .expect("shaped view over dense square storage")
    }

    /// Upper-triangular view of a square matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square (as do the other triangle views).
    pub fn upper_triangle(&self) -> MatView<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view(Shape::UpperTriangular)
    }

    /// Lower-triangular view of a square matrix.
    pub fn lower_triangle(&self) -> MatView<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view(Shape::LowerTriangular)
    }

    /// Unit-upper-triangular view (diagonal implicitly one).
    pub fn unit_upper_triangle(&self) -> MatView<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view(Shape::UnitUpperTriangular)
    }

    /// Unit-lower-triangular view (diagonal implicitly one).
    pub fn unit_lower_triangle(&self) -> MatView<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view(Shape::UnitLowerTriangular)
    }

    /// Mutable upper-triangular view.
    pub fn upper_triangle_mut(&mut self) -> MatViewMut<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view_mut(Shape::UpperTriangular)
    }

    /// Mutable lower-triangular view.
    pub fn lower_triangle_mut(&mut self) -> MatViewMut<'_, T> {
        assert_eq!(self.nrows, self.ncols, "triangle view of a non-square matrix");
        self.shaped_view_mut(Shape::LowerTriangular)
    }

    /// Scale every element in place (identical-view aliasing fast path).
    pub fn scale_mut(&mut self, alpha: T) {
        ops::mat_scale(&mut self.view_mut(), alpha);
    }

    /// Replace `self` with `alpha * self * b`.
    ///
    /// The destination aliases the left operand by construction, an overlap
    /// that is not provably write-order safe, so the product is materialized
    /// into a temporary and moved in.
    pub fn mul_assign_right(&mut self, alpha: T, b: &MatView<'_, T>) {
        let tmp = multiply::mat_mat(alpha, &self.view(), b);
        *self = tmp;
    }

    /// Replace the contents with `nrows * ncols` elements drawn from
    /// `values` in column-major order.
    ///
    /// # Errors
    ///
    /// Returns [`ShapedError::ExtentMismatch`] if `values` runs short.
    pub fn resize_and_fill<I>(&mut self, nrows: usize, ncols: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let want = nrows * ncols;
        let mut iter = values.into_iter();
        let mut data = Vec::with_capacity(want);
        for k in 0..want {
            match iter.next() {
                Some(v) => data.push(v),
                None => {
                    return Err(ShapedError::ExtentMismatch {
                        expected: want,
                        found: k,
                    })
                }
            }
        }
        self.data = data;
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }
}

impl<T: Scalar> core::ops::Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.nrows && j < self.ncols);
        &self.data[i + j * self.nrows]
    }
}

impl<T: Scalar> core::ops::IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.nrows && j < self.ncols);
        &mut self.data[i + j * self.nrows]
    }
}

/// A banded matrix in packed diagonal storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
    lo: usize,
    hi: usize,
    shape: Shape,
}

impl<T: Scalar> BandMatrix<T> {
    fn with_shape(nrows: usize, ncols: usize, lo: usize, hi: usize, shape: Shape) -> Result<Self> {
        if (lo >= nrows.max(1)) || (hi >= ncols.max(1)) {
            return Err(ShapedError::BandWidth {
                lo,
                hi,
                rows: nrows,
                cols: ncols,
            });
        }
        if shape.is_square_required() && nrows != ncols {
            return Err(ShapedError::NonSquare {
                rows: nrows,
                cols: ncols,
            });
        }
        let ld = lo + hi + 1;
        Ok(Self {
            data: vec![T::zero(); ld * ncols],
            nrows,
            ncols,
            lo,
            hi,
            shape,
        })
    }

    /// A general band matrix with `lo` sub- and `hi` super-diagonals.
    ///
    /// # Errors
    ///
    /// Returns [`ShapedError::BandWidth`] when a band width reaches the
    /// corresponding extent.
    pub fn banded(nrows: usize, ncols: usize, lo: usize, hi: usize) -> Result<Self> {
        Self::with_shape(nrows, ncols, lo, hi, Shape::Band)
    }

    /// An upper-banded square matrix.
    pub fn upper(n: usize, hi: usize) -> Result<Self> {
        Self::with_shape(n, n, 0, hi, Shape::UpperBand)
    }

    /// A lower-banded square matrix.
    pub fn lower(n: usize, lo: usize) -> Result<Self> {
        Self::with_shape(n, n, lo, 0, Shape::LowerBand)
    }

    /// An upper-banded matrix with implicit unit diagonal.
    pub fn unit_upper(n: usize, hi: usize) -> Result<Self> {
        Self::with_shape(n, n, 0, hi, Shape::UnitUpperBand)
    }

    /// A lower-banded matrix with implicit unit diagonal.
    pub fn unit_lower(n: usize, lo: usize) -> Result<Self> {
        Self::with_shape(n, n, lo, 0, Shape::UnitLowerBand)
    }

    /// A symmetric band matrix with bandwidth `k`; the lower band is stored.
    pub fn symmetric(n: usize, k: usize) -> Result<Self> {
        Self::with_shape(n, n, k, 0, Shape::SymmetricBand)
    }

    /// A Hermitian band matrix with bandwidth `k`.
    pub fn hermitian(n: usize, k: usize) -> Result<Self> {
        Self::with_shape(n, n, k, 0, Shape::HermitianBand)
    }

    /// A real-symmetric band matrix with bandwidth `k`.
    ///
    /// # Panics
    ///
    /// Panics for complex element types; the shape asserts real elements.
    pub fn real_symmetric(n: usize, k: usize) -> Result<Self> {
        assert!(
            !T::IS_COMPLEX,
            "RealSymmetricBand requires a real element type"
        );
        Self::with_shape(n, n, k, 0, Shape::RealSymmetricBand)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Stored sub-/super-diagonal counts.
    #[inline]
    pub fn bandwidths(&self) -> (usize, usize) {
        (self.lo, self.hi)
    }

    /// View steps for packed band storage. For a single stored diagonal
    /// (`ld == 1`) the usual `col_step = ld - 1` would be zero; `(2, -1)`
    /// maps the diagonal cells to the same addresses with nonzero steps.
    fn band_steps(ld: usize) -> (isize, isize) {
        if ld == 1 {
            (2, -1)
        } else {
            (1, (ld - 1) as isize)
        }
    }

    /// The canonical banded view.
    pub fn view(&self) -> MatView<'_, T> {
        let ld = self.lo + self.hi + 1;
        let (rs, cs) = Self::band_steps(ld);
        MatView::new_banded(
            &self.data,
            self.hi,
            self.nrows,
            self.ncols,
            rs,
            cs,
            Conjugation::NonConj,
            self.shape,
            self.lo,
            self.hi,
        )
        .expect("canonical view of packed band storage is always valid")
    }

    /// The canonical mutable banded view.
    pub fn view_mut(&mut self) -> MatViewMut<'_, T> {
        let ld = self.lo + self.hi + 1;
        let (rs, cs) = Self::band_steps(ld);
        let (m, n, lo, hi, shape) = (self.nrows, self.ncols, self.lo, self.hi, self.shape);
        MatViewMut::new_banded(
            &mut self.data,
            hi,
            m,
            n,
            rs,
            cs,
            Conjugation::NonConj,
            shape,
            lo,
            hi,
        )
        .expect("canonical view of packed band storage is always valid")
    }

    /// Scale every stored element in place.
    pub fn scale_mut(&mut self, alpha: T) {
        ops::mat_scale(&mut self.view_mut(), alpha);
    }
}

/// A symmetric or Hermitian matrix over full square storage; the lower
/// triangle is authoritative and the upper-triangle slots are never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct SymMatrix<T> {
    data: Vec<T>,
    n: usize,
    shape: Shape,
}

impl<T: Scalar> SymMatrix<T> {
    fn with_shape(n: usize, shape: Shape) -> Self {
        Self {
            data: vec![T::zero(); n * n],
            n,
            shape,
        }
    }

    /// An `n x n` symmetric matrix of zeros.
    pub fn symmetric(n: usize) -> Self {
        Self::with_shape(n, Shape::Symmetric)
    }

    /// An `n x n` Hermitian matrix of zeros.
    pub fn hermitian(n: usize) -> Self {
        Self::with_shape(n, Shape::Hermitian)
    }

    /// An `n x n` real-symmetric matrix of zeros.
    ///
    /// # Panics
    ///
    /// Panics for complex element types.
    pub fn real_symmetric(n: usize) -> Self {
        assert!(!T::IS_COMPLEX, "RealSymmetric requires a real element type");
        Self::with_shape(n, Shape::RealSymmetric)
    }

    /// Fill the stored (lower) triangle from a function of `(row, col)`.
    pub fn fill_lower(&mut self, mut f: impl FnMut(usize, usize) -> T) {
        let n = self.n;
        let mut v = self.view_mut();
        for j in 0..n {
            for i in j..n {
                v.set(i, j, f(i, j));
            }
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The canonical symmetric/Hermitian view.
    pub fn view(&self) -> MatView<'_, T> {
        MatView::new(
            &self.data,
            0,
            self.n,
            self.n,
            1,
            self.n as isize,
            Conjugation::NonConj,
            self.shape,
        )
        .expect("canonical view of an owned buffer is always valid")
    }

    /// The canonical mutable view.
    pub fn view_mut(&mut self) -> MatViewMut<'_, T> {
        let (n, shape) = (self.n, self.shape);
        MatViewMut::new(
            &mut self.data,
            0,
            n,
            n,
            1,
            n as isize,
            Conjugation::NonConj,
            shape,
        )
        .expect("canonical view of an owned buffer is always valid")
    }

    /// Logical element access with reflection.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.view().get(i, j)
    }

    /// Logical element write with reflection and Hermitian-diagonal
    /// realness enforcement.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.view_mut().set(i, j, value);
    }

    /// Scale every stored element in place.
    ///
    /// The read and the write go through the exact same view, which is the
    /// provably safe aliasing pattern; each stored element is visited once,
    /// so reflected pairs are scaled exactly once.
    pub fn scale_mut(&mut self, alpha: T) {
        ops::mat_scale(&mut self.view_mut(), alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn dense_views_and_triangles() {
        let m = Matrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64);
        assert_eq!(m[(1, 2)], 5.0);
        let u = m.upper_triangle();
        assert_eq!(u.get(0, 2), 2.0);
        assert_eq!(u.get(2, 0), 0.0);
        let ul = m.unit_lower_triangle();
        assert_eq!(ul.get(1, 1), 1.0);
        assert_eq!(ul.get(2, 1), 7.0);
    }

    #[test]
    fn identity_times_scale() {
        let mut m = Matrix::<f64>::identity(3);
        m.scale_mut(4.0);
        assert_eq!(m[(1, 1)], 4.0);
        assert_eq!(m[(0, 1)], 0.0);
    }

    #[test]
    fn band_storage_round_trip() {
        let mut b = BandMatrix::<f64>::banded(5, 5, 1, 2).unwrap();
        {
            let mut v = b.view_mut();
            v.set(2, 1, -3.0);
            v.set(0, 2, 8.0);
            v.set(4, 4, 1.5);
        }
        let v = b.view();
        assert_eq!(v.get(2, 1), -3.0);
        assert_eq!(v.get(0, 2), 8.0);
        assert_eq!(v.get(4, 4), 1.5);
        assert_eq!(v.get(4, 0), 0.0);
    }

    #[test]
    fn band_width_validation() {
        assert!(BandMatrix::<f64>::banded(3, 3, 3, 0).is_err());
        assert!(BandMatrix::<f64>::banded(3, 3, 2, 2).is_ok());
    }

    #[test]
    fn sym_matrix_reflects() {
        let mut s = SymMatrix::<f64>::symmetric(3);
        s.set(0, 2, 5.0);
        assert_eq!(s.get(2, 0), 5.0);
        assert_eq!(s.get(0, 2), 5.0);
    }

    #[test]
    fn herm_matrix_diagonal_realness() {
        let mut h = SymMatrix::<Complex64>::hermitian(2);
        h.set(0, 0, Complex64::new(2.0, 1e-12));
        assert_eq!(h.get(0, 0).im, 0.0);
    }

    #[test]
    fn mul_assign_right_aliased_product() {
        // self = self * b with the destination aliasing the left operand
        let mut a = Matrix::from_fn(2, 2, |i, j| (1 + i * 2 + j) as f64);
        let b = Matrix::from_fn(2, 2, |i, j| if i == j { 2.0 } else { 1.0 });
        let expected = multiply::mat_mat(1.0, &a.view(), &b.view());
        a.mul_assign_right(1.0, &b.view());
        assert_eq!(a, expected);
    }
}
