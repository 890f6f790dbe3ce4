//! Two-dimensional shape-tagged strided views.
//!
//! A [`MatView`] describes element access over a 2D block of a borrowed
//! buffer: per-axis extents and signed steps, stored band widths, a
//! [`Conjugation`] flag, and the [`Shape`] tag that decides which cells are
//! stored at all.
//!
//! Logical element access goes through the shape:
//!
//! - cells outside the stored region read as structural zeros;
//! - the diagonal of a unit-diagonal shape reads as one and rejects writes;
//! - symmetric and Hermitian views store the lower triangle and reflect
//!   accesses to the upper triangle (conjugating for Hermitian);
//! - writes to a Hermitian diagonal truncate the imaginary part to exactly
//!   zero: the diagonal is real by definition, so accumulated rounding is
//!   discarded rather than tolerated.
//!
//! Deriving sub-views (`transpose`, `conjugate`, `sub_triangle`, `sub_band`,
//! `diagonal_at`, ...) never copies; it only recomputes the geometry.

use crate::alias::StorageRange;
use crate::element_op::Conjugation;
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::view::{VecView, VecViewMut};
use crate::{Result, ShapedError};

/// Shared access geometry of matrix views. `lo`/`hi` are the *stored*
/// sub-/super-diagonal counts; symmetry classes keep `hi == 0` and reflect.
#[derive(Debug, Clone, Copy)]
struct Geom {
    offset: usize,
    nrows: usize,
    ncols: usize,
    row_step: isize,
    col_step: isize,
    lo: usize,
    hi: usize,
    conj: Conjugation,
    shape: Shape,
}

impl Geom {
    #[inline]
    fn raw_index(&self, i: usize, j: usize) -> usize {
        (self.offset as isize + i as isize * self.row_step + j as isize * self.col_step) as usize
    }

    #[inline]
    fn in_stored_band(&self, i: usize, j: usize) -> bool {
        let d = i as isize - j as isize;
        -(self.hi as isize) <= d && d <= self.lo as isize
    }

    #[inline]
    fn is_stored(&self, i: usize, j: usize) -> bool {
        self.in_stored_band(i, j) && !(self.shape.has_unit_diagonal() && i == j)
    }

    /// Stored sub-/super-diagonal counts.
    #[inline]
    fn bandwidths(&self) -> (usize, usize) {
        (self.lo, self.hi)
    }

    /// Logical fill band: for symmetry classes the stored lower band
    /// mirrors across the diagonal.
    #[inline]
    fn logical_bandwidths(&self) -> (usize, usize) {
        let f = self.shape.flags();
        if f.symmetric || f.hermitian {
            (self.lo, self.lo)
        } else {
            (self.lo, self.hi)
        }
    }

    /// Stored row span of column `j`, as `start..end`.
    fn stored_col_span(&self, j: usize) -> core::ops::Range<usize> {
        let start = j.saturating_sub(self.hi);
        let end = (j + self.lo + 1).min(self.nrows);
        start..end.max(start)
    }

    /// Logical row span of column `j` (reflection included).
    fn logical_col_span(&self, j: usize) -> core::ops::Range<usize> {
        let (llo, lhi) = self.logical_bandwidths();
        let start = j.saturating_sub(lhi);
        let end = (j + llo + 1).min(self.nrows);
        start..end.max(start)
    }

    /// Logical column span of row `i` (reflection included).
    fn logical_row_span(&self, i: usize) -> core::ops::Range<usize> {
        let (llo, lhi) = self.logical_bandwidths();
        let start = i.saturating_sub(llo);
        let end = (i + lhi + 1).min(self.ncols);
        start..end.max(start)
    }

    /// Min/max raw indices over the band-bounded region (diagonal included),
    /// or `None` when nothing is stored. Extremes of the linear index map
    /// occur at vertices of the region polygon.
    fn raw_extremes(&self) -> Option<(usize, usize)> {
        if self.nrows == 0 || self.ncols == 0 {
            return None;
        }
        let m = self.nrows as isize;
        let n = self.ncols as isize;
        let lo = self.lo as isize;
        let hi = self.hi as isize;
        let mut min: Option<isize> = None;
        let mut max: Option<isize> = None;
        let mut visit = |i: isize, j: isize| {
            if i < 0 || i >= m || j < 0 || j >= n {
                return;
            }
            let d = i - j;
            if d < -hi || d > lo {
                return;
            }
            let idx = self.offset as isize + i * self.row_step + j * self.col_step;
            min = Some(min.map_or(idx, |v: isize| v.min(idx)));
            max = Some(max.map_or(idx, |v: isize| v.max(idx)));
        };
        for i in [0, m - 1] {
            for j in [(i - lo).max(0), (i + hi).min(n - 1)] {
                visit(i, j);
            }
        }
        for j in [0, n - 1] {
            for i in [(j - hi).max(0), (j + lo).min(m - 1)] {
                visit(i, j);
            }
        }
        match (min, max) {
            (Some(a), Some(b)) => Some((a as usize, b as usize)),
            _ => None,
        }
    }

    fn validate(&self, buf_len: usize) -> Result<()> {
        if !self.shape.describes_data() || self.shape == Shape::Vector {
            return Err(ShapedError::InvalidShape(self.shape));
        }
        if self.shape.is_square_required() && self.nrows != self.ncols {
            return Err(ShapedError::NonSquare {
                rows: self.nrows,
                cols: self.ncols,
            });
        }
        if self.row_step == 0 || self.col_step == 0 {
            return Err(ShapedError::ZeroStep);
        }
        if let Some((lo_idx, hi_idx)) = self.raw_extremes() {
            // a negative extreme wrapped around in the usize cast
            if lo_idx > hi_idx || hi_idx >= buf_len {
                return Err(ShapedError::ViewBounds {
                    needed: hi_idx.wrapping_add(1),
                    len: buf_len,
                });
            }
        }
        Ok(())
    }

    fn transposed(&self) -> Geom {
        Geom {
            offset: self.offset,
            nrows: self.ncols,
            ncols: self.nrows,
            row_step: self.col_step,
            col_step: self.row_step,
            lo: self.hi,
            hi: self.lo,
            conj: self.conj,
            shape: self.shape.transposed(),
        }
    }

    /// Principal square sub-block `[i1, i2) x [i1, i2)` keeping the shape.
    fn principal(&self, i1: usize, i2: usize, lo: usize, hi: usize) -> Geom {
        let len = i2 - i1;
        Geom {
            offset: if len == 0 {
                self.offset
            } else {
                self.raw_index(i1, i1)
            },
            nrows: len,
            ncols: len,
            row_step: self.row_step,
            col_step: self.col_step,
            lo,
            hi,
            conj: self.conj,
            shape: self.shape,
        }
    }
}

/// Default stored band widths for a dense (non-band-packed) geometry.
pub(crate) fn dense_bandwidths(shape: Shape, nrows: usize, ncols: usize) -> (usize, usize) {
    if shape == Shape::Diagonal {
        return (0, 0);
    }
    let f = shape.flags();
    let full_lo = nrows.saturating_sub(1);
    let full_hi = ncols.saturating_sub(1);
    if f.symmetric || f.hermitian {
        (full_lo, 0)
    } else {
        (
            if f.lower { full_lo } else { 0 },
            if f.upper { full_hi } else { 0 },
        )
    }
}

/// An immutable shape-tagged 2D strided view.
#[derive(Debug, Clone, Copy)]
pub struct MatView<'a, T> {
    data: &'a [T],
    geom: Geom,
}

/// A mutable shape-tagged 2D strided view.
#[derive(Debug)]
pub struct MatViewMut<'a, T> {
    data: &'a mut [T],
    geom: Geom,
}

impl<'a, T: Scalar> MatView<'a, T> {
    /// Create a dense-geometry view: stored band widths derived from the
    /// shape and extents.
    ///
    /// # Errors
    ///
    /// [`ShapedError::InvalidShape`] for `Null`/`Invalid`/`Vector` shapes,
    /// [`ShapedError::NonSquare`] when a square-only shape gets rectangular
    /// extents, [`ShapedError::ZeroStep`] for a zero step, and
    /// [`ShapedError::ViewBounds`] if any stored cell falls outside `data`.
    pub fn new(
        data: &'a [T],
        offset: usize,
        nrows: usize,
        ncols: usize,
        row_step: isize,
        col_step: isize,
        conj: Conjugation,
        shape: Shape,
    ) -> Result<Self> {
        let (lo, hi) = dense_bandwidths(shape, nrows, ncols);
        Self::new_banded(data, offset, nrows, ncols, row_step, col_step, conj, shape, lo, hi)
    }

    /// Create a view with explicit stored band widths (`lo` sub-diagonals,
    /// `hi` super-diagonals).
    ///
    /// # Errors
    ///
    /// Same conditions as [`MatView::new`], plus
    /// [`ShapedError::InvalidShape`] when the band widths contradict the
    /// shape (e.g. a nonzero `lo` for an upper shape).
    #[allow(clippy::too_many_arguments)]
    pub fn new_banded(
        data: &'a [T],
        offset: usize,
        nrows: usize,
        ncols: usize,
        row_step: isize,
        col_step: isize,
        conj: Conjugation,
        shape: Shape,
        lo: usize,
        hi: usize,
    ) -> Result<Self> {
        check_band_shape(shape, lo, hi)?;
        let geom = Geom {
            offset,
            nrows,
            ncols,
            row_step,
            col_step,
            lo,
            hi,
            conj,
            shape,
        };
        geom.validate(data.len())?;
        Ok(Self { data, geom })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.geom.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.geom.ncols
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.geom.shape
    }

    #[inline]
    pub fn conj_flag(&self) -> Conjugation {
        self.geom.conj
    }

    #[inline]
    pub fn row_step(&self) -> isize {
        self.geom.row_step
    }

    #[inline]
    pub fn col_step(&self) -> isize {
        self.geom.col_step
    }

    /// Stored sub-/super-diagonal counts.
    #[inline]
    pub fn bandwidths(&self) -> (usize, usize) {
        self.geom.bandwidths()
    }

    /// Logical fill band, with symmetry reflection applied.
    #[inline]
    pub fn logical_bandwidths(&self) -> (usize, usize) {
        self.geom.logical_bandwidths()
    }

    /// Whether cell `(i, j)` is physically stored.
    #[inline]
    pub fn is_stored(&self, i: usize, j: usize) -> bool {
        self.geom.is_stored(i, j)
    }

    /// Raw pointer to the stored cell `(0, 0)` position of the view origin.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        unsafe { self.data.as_ptr().add(self.geom.offset) }
    }

    /// Byte-address interval over the stored region, `None` when empty.
    pub fn storage_range(&self) -> Option<StorageRange> {
        self.geom.raw_extremes().map(|(lo, hi)| {
            let base = self.data.as_ptr();
            unsafe { StorageRange::new(base.add(lo) as usize, base.add(hi) as usize) }
        })
    }

    /// Logical element `(i, j)`: structural zeros, the implicit unit
    /// diagonal, symmetry reflection, and conjugation all applied.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nrows` or `j >= ncols`.
    pub fn get(&self, i: usize, j: usize) -> T {
        let g = &self.geom;
        assert!(
            i < g.nrows && j < g.ncols,
            "index ({i}, {j}) out of bounds for {}x{}",
            g.nrows,
            g.ncols
        );
        let f = g.shape.flags();
        if f.unit_diagonal && i == j {
            return T::one();
        }
        if (f.symmetric || f.hermitian) && i < j {
            if !g.in_stored_band(j, i) {
                return T::zero();
            }
            let v = self.data[g.raw_index(j, i)];
            let v = if f.hermitian { v.conj() } else { v };
            return g.conj.apply(v);
        }
        if !g.in_stored_band(i, j) {
            return T::zero();
        }
        g.conj.apply(self.data[g.raw_index(i, j)])
    }

    /// The transpose. Symmetric views are returned unchanged; Hermitian
    /// views come back with the conjugation flag toggled (`A^T = conj(A)`);
    /// otherwise extents, steps and band widths swap.
    pub fn transpose(&self) -> MatView<'a, T> {
        let f = self.geom.shape.flags();
        if f.symmetric {
            return *self;
        }
        if f.hermitian {
            return self.conjugate();
        }
        MatView {
            data: self.data,
            geom: self.geom.transposed(),
        }
    }

    /// The same view with the conjugation flag toggled. No data touched.
    pub fn conjugate(&self) -> MatView<'a, T> {
        let mut geom = self.geom;
        geom.conj = geom.conj.toggled();
        MatView { data: self.data, geom }
    }

    /// The conjugate transpose.
    pub fn adjoint(&self) -> MatView<'a, T> {
        self.transpose().conjugate()
    }

    /// Rectangular sub-block `[i1, i2) x [j1, j2)`.
    ///
    /// # Panics
    ///
    /// Panics unless the view is `Rectangular` and the ranges are within
    /// bounds.
    pub fn sub_matrix(&self, i1: usize, i2: usize, j1: usize, j2: usize) -> MatView<'a, T> {
        let g = &self.geom;
        assert!(
            g.shape == Shape::Rectangular,
            "sub_matrix requires a Rectangular view, got {:?}",
            g.shape
        );
        assert!(
            i1 <= i2 && i2 <= g.nrows && j1 <= j2 && j2 <= g.ncols,
            "sub_matrix [{i1},{i2})x[{j1},{j2}) out of {}x{}",
            g.nrows,
            g.ncols
        );
        let (m, n) = (i2 - i1, j2 - j1);
        let geom = Geom {
            offset: if m == 0 || n == 0 {
                g.offset
            } else {
                g.raw_index(i1, j1)
            },
            nrows: m,
            ncols: n,
            row_step: g.row_step,
            col_step: g.col_step,
            lo: m.saturating_sub(1),
            hi: n.saturating_sub(1),
            conj: g.conj,
            shape: Shape::Rectangular,
        };
        MatView { data: self.data, geom }
    }

    /// Principal sub-block `[i1, i2)` of a triangular view, keeping shape.
    ///
    /// # Panics
    ///
    /// Panics unless the view's shape is (unit-)triangular, banded or not.
    pub fn sub_triangle(&self, i1: usize, i2: usize) -> MatView<'a, T> {
        let g = &self.geom;
        let f = g.shape.flags();
        assert!(
            (f.upper != f.lower) && !f.symmetric && !f.hermitian,
            "sub_triangle requires a triangular view, got {:?}",
            g.shape
        );
        assert!(i1 <= i2 && i2 <= g.nrows, "sub_triangle [{i1},{i2}) out of {}", g.nrows);
        let len = i2 - i1;
        let cap = len.saturating_sub(1);
        let geom = g.principal(i1, i2, g.lo.min(cap), g.hi.min(cap));
        MatView { data: self.data, geom }
    }

    /// Principal sub-block `[i1, i2)` of a symmetric/Hermitian view.
    ///
    /// # Panics
    ///
    /// Panics unless the view is a symmetry class.
    pub fn sub_symmetric(&self, i1: usize, i2: usize) -> MatView<'a, T> {
        let g = &self.geom;
        let f = g.shape.flags();
        assert!(
            f.symmetric || f.hermitian,
            "sub_symmetric requires a symmetric or Hermitian view, got {:?}",
            g.shape
        );
        assert!(i1 <= i2 && i2 <= g.nrows, "sub_symmetric [{i1},{i2}) out of {}", g.nrows);
        let cap = (i2 - i1).saturating_sub(1);
        let geom = g.principal(i1, i2, g.lo.min(cap), 0);
        MatView { data: self.data, geom }
    }

    /// Principal sub-block `[i1, i2)` of a banded view with narrowed band
    /// widths.
    ///
    /// # Panics
    ///
    /// Panics unless the view is banded and `new_lo <= lo`, `new_hi <= hi`.
    pub fn sub_band(&self, i1: usize, i2: usize, new_lo: usize, new_hi: usize) -> MatView<'a, T> {
        let g = &self.geom;
        assert!(
            g.shape.is_banded(),
            "sub_band requires a banded view, got {:?}",
            g.shape
        );
        assert!(i1 <= i2 && i2 <= g.nrows && i2 <= g.ncols);
        assert!(
            new_lo <= g.lo && new_hi <= g.hi,
            "sub_band widths ({new_lo}, {new_hi}) exceed ({}, {})",
            g.lo,
            g.hi
        );
        let geom = g.principal(i1, i2, new_lo, new_hi);
        MatView { data: self.data, geom }
    }

    /// Vector view along diagonal `d` (`0` is the main diagonal, positive
    /// super-diagonals, negative sub-diagonals). The step is
    /// `row_step + col_step`.
    ///
    /// # Panics
    ///
    /// Panics if diagonal `d` is not stored: outside the stored band, or the
    /// implicit diagonal of a unit shape. Symmetry classes store only
    /// `d <= 0`; reach super-diagonals through `transpose`.
    pub fn diagonal_at(&self, d: isize) -> VecView<'a, T> {
        let g = &self.geom;
        assert!(
            -(g.lo as isize) <= d && d <= g.hi as isize,
            "diagonal {d} is not stored for {:?} with bandwidths ({}, {})",
            g.shape,
            g.lo,
            g.hi
        );
        assert!(
            !(g.shape.has_unit_diagonal() && d == 0),
            "diagonal 0 of {:?} is implicit and not stored",
            g.shape
        );
        let (start, len) = diagonal_geometry(g, d);
        // geometry derived from a validated view
        unsafe { VecView::new_unchecked(self.data, start, len, g.row_step + g.col_step, g.conj) }
    }

    /// Row `i` of a rectangular view.
    ///
    /// # Panics
    ///
    /// Panics unless the view is `Rectangular` and `i < nrows`.
    pub fn row(&self, i: usize) -> VecView<'a, T> {
        assert!(
            self.geom.shape == Shape::Rectangular,
            "row() requires a Rectangular view, got {:?}; use row_range for structured shapes",
            self.geom.shape
        );
        self.row_range(i, 0, self.geom.ncols)
    }

    /// Column `j` of a rectangular view.
    ///
    /// # Panics
    ///
    /// Panics unless the view is `Rectangular` and `j < ncols`.
    pub fn col(&self, j: usize) -> VecView<'a, T> {
        assert!(
            self.geom.shape == Shape::Rectangular,
            "col() requires a Rectangular view, got {:?}; use col_range for structured shapes",
            self.geom.shape
        );
        self.col_range(j, 0, self.geom.nrows)
    }

    /// Stored run `[j1, j2)` of row `i`.
    ///
    /// # Panics
    ///
    /// Panics if any requested cell is not stored.
    pub fn row_range(&self, i: usize, j1: usize, j2: usize) -> VecView<'a, T> {
        let g = &self.geom;
        assert!(i < g.nrows && j1 <= j2 && j2 <= g.ncols);
        if j1 < j2 {
            assert!(
                g.is_stored(i, j1) && g.is_stored(i, j2 - 1),
                "row run ({i}, [{j1},{j2})) leaves the stored region of {:?}",
                g.shape
            );
        }
        let start = if j1 == j2 { g.offset } else { g.raw_index(i, j1) };
        unsafe { VecView::new_unchecked(self.data, start, j2 - j1, g.col_step, g.conj) }
    }

    /// Stored run `[i1, i2)` of column `j`.
    ///
    /// # Panics
    ///
    /// Panics if any requested cell is not stored.
    pub fn col_range(&self, j: usize, i1: usize, i2: usize) -> VecView<'a, T> {
        let g = &self.geom;
        assert!(j < g.ncols && i1 <= i2 && i2 <= g.nrows);
        if i1 < i2 {
            assert!(
                g.is_stored(i1, j) && g.is_stored(i2 - 1, j),
                "column run ([{i1},{i2}), {j}) leaves the stored region of {:?}",
                g.shape
            );
        }
        let start = if i1 == i2 { g.offset } else { g.raw_index(i1, j) };
        unsafe { VecView::new_unchecked(self.data, start, i2 - i1, g.row_step, g.conj) }
    }

    /// Stored row span of column `j`.
    #[inline]
    pub fn stored_col_span(&self, j: usize) -> core::ops::Range<usize> {
        self.geom.stored_col_span(j)
    }

    /// Logical (reflection-included) row span of column `j`.
    #[inline]
    pub fn logical_col_span(&self, j: usize) -> core::ops::Range<usize> {
        self.geom.logical_col_span(j)
    }

    /// Logical (reflection-included) column span of row `i`.
    #[inline]
    pub fn logical_row_span(&self, i: usize) -> core::ops::Range<usize> {
        self.geom.logical_row_span(i)
    }
}

fn check_band_shape(shape: Shape, lo: usize, hi: usize) -> Result<()> {
    let f = shape.flags();
    let bad = (!f.lower && !f.symmetric && !f.hermitian && lo != 0 && shape != Shape::Diagonal)
        || (!f.upper && !f.symmetric && !f.hermitian && hi != 0 && shape != Shape::Diagonal)
        || ((f.symmetric || f.hermitian) && hi != 0)
        || (shape == Shape::Diagonal && (lo != 0 || hi != 0));
    if bad {
        return Err(ShapedError::InvalidShape(shape));
    }
    Ok(())
}

fn diagonal_geometry(g: &Geom, d: isize) -> (usize, usize) {
    let len = if d >= 0 {
        g.nrows.min(g.ncols.saturating_sub(d as usize))
    } else {
        g.ncols.min(g.nrows.saturating_sub((-d) as usize))
    };
    if len == 0 {
        return (g.offset, 0);
    }
    let start = if d >= 0 {
        (g.offset as isize + d * g.col_step) as usize
    } else {
        (g.offset as isize + (-d) * g.row_step) as usize
    };
    (start, len)
}

impl<'a, T: Scalar> MatViewMut<'a, T> {
    /// Create a mutable dense-geometry view.
    ///
    /// # Errors
    ///
    /// Same conditions as [`MatView::new`].
    pub fn new(
        data: &'a mut [T],
        offset: usize,
        nrows: usize,
        ncols: usize,
        row_step: isize,
        col_step: isize,
        conj: Conjugation,
        shape: Shape,
    ) -> Result<Self> {
        let (lo, hi) = dense_bandwidths(shape, nrows, ncols);
        Self::new_banded(data, offset, nrows, ncols, row_step, col_step, conj, shape, lo, hi)
    }

    /// Create a mutable view with explicit stored band widths.
    ///
    /// # Errors
    ///
    /// Same conditions as [`MatView::new_banded`].
    #[allow(clippy::too_many_arguments)]
    pub fn new_banded(
        data: &'a mut [T],
        offset: usize,
        nrows: usize,
        ncols: usize,
        row_step: isize,
        col_step: isize,
        conj: Conjugation,
        shape: Shape,
        lo: usize,
        hi: usize,
    ) -> Result<Self> {
        check_band_shape(shape, lo, hi)?;
        let geom = Geom {
            offset,
            nrows,
            ncols,
            row_step,
            col_step,
            lo,
            hi,
            conj,
            shape,
        };
        geom.validate(data.len())?;
        Ok(Self { data, geom })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.geom.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.geom.ncols
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.geom.shape
    }

    #[inline]
    pub fn conj_flag(&self) -> Conjugation {
        self.geom.conj
    }

    #[inline]
    pub fn bandwidths(&self) -> (usize, usize) {
        self.geom.bandwidths()
    }

    #[inline]
    pub fn logical_bandwidths(&self) -> (usize, usize) {
        self.geom.logical_bandwidths()
    }

    #[inline]
    pub fn is_stored(&self, i: usize, j: usize) -> bool {
        self.geom.is_stored(i, j)
    }

    /// Reborrow as an immutable view.
    #[inline]
    pub fn as_view(&self) -> MatView<'_, T> {
        MatView {
            data: self.data,
            geom: self.geom,
        }
    }

    /// Byte-address interval over the stored region, `None` when empty.
    pub fn storage_range(&self) -> Option<StorageRange> {
        self.as_view().storage_range()
    }

    /// Logical element `(i, j)`; see [`MatView::get`].
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.as_view().get(i, j)
    }

    /// Store `value` as logical element `(i, j)`.
    ///
    /// Writes to the reflected triangle of a symmetry class are remapped to
    /// the stored cell (conjugated for Hermitian). Writes to a Hermitian
    /// diagonal truncate the imaginary part to exactly zero.
    ///
    /// # Panics
    ///
    /// Panics on out-of-bounds indices, on writes to the implicit diagonal
    /// of a unit shape, and on writes outside the stored band.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let g = &self.geom;
        assert!(
            i < g.nrows && j < g.ncols,
            "index ({i}, {j}) out of bounds for {}x{}",
            g.nrows,
            g.ncols
        );
        let f = g.shape.flags();
        assert!(
            !(f.unit_diagonal && i == j),
            "write to the implicit unit diagonal of {:?}",
            g.shape
        );
        let (i, j, value) = if (f.symmetric || f.hermitian) && i < j {
            (j, i, if f.hermitian { value.conj() } else { value })
        } else {
            (i, j, value)
        };
        assert!(
            g.in_stored_band(i, j),
            "write to ({i}, {j}) outside the stored region of {:?}",
            g.shape
        );
        let value = if f.hermitian && i == j {
            value.zero_imag()
        } else {
            value
        };
        let idx = g.raw_index(i, j);
        let stored = g.conj.apply(value);
        self.data[idx] = stored;
    }

    /// Write `value` to every stored cell.
    pub fn fill(&mut self, value: T) {
        for j in 0..self.geom.ncols {
            let span = self.geom.stored_col_span(j);
            for i in span {
                if self.geom.is_stored(i, j) {
                    self.set(i, j, value);
                }
            }
        }
    }

    /// Consume into the transposed view; see [`MatView::transpose`].
    pub fn transpose(self) -> MatViewMut<'a, T> {
        let f = self.geom.shape.flags();
        if f.symmetric {
            return self;
        }
        if f.hermitian {
            return self.conjugate();
        }
        MatViewMut {
            geom: self.geom.transposed(),
            data: self.data,
        }
    }

    /// Consume into a view with the conjugation flag toggled.
    pub fn conjugate(self) -> MatViewMut<'a, T> {
        let mut geom = self.geom;
        geom.conj = geom.conj.toggled();
        MatViewMut { data: self.data, geom }
    }

    /// Mutable rectangular sub-block; see [`MatView::sub_matrix`].
    pub fn sub_matrix_mut(
        &mut self,
        i1: usize,
        i2: usize,
        j1: usize,
        j2: usize,
    ) -> MatViewMut<'_, T> {
        let sub = self.as_view().sub_matrix(i1, i2, j1, j2).geom;
        MatViewMut {
            data: &mut *self.data,
            geom: sub,
        }
    }

    /// Mutable diagonal view; see [`MatView::diagonal_at`].
    pub fn diagonal_at_mut(&mut self, d: isize) -> VecViewMut<'_, T> {
        let g = &self.geom;
        assert!(
            -(g.lo as isize) <= d && d <= g.hi as isize,
            "diagonal {d} is not stored for {:?} with bandwidths ({}, {})",
            g.shape,
            g.lo,
            g.hi
        );
        assert!(
            !(g.shape.has_unit_diagonal() && d == 0),
            "diagonal 0 of {:?} is implicit and not stored",
            g.shape
        );
        let step = g.row_step + g.col_step;
        let (start, len) = diagonal_geometry(g, d);
        let conj = g.conj;
        unsafe { VecViewMut::new_unchecked(self.data, start, len, step, conj) }
    }

    /// Mutable stored run `[i1, i2)` of column `j`; see
    /// [`MatView::col_range`].
    pub fn col_range_mut(&mut self, j: usize, i1: usize, i2: usize) -> VecViewMut<'_, T> {
        let g = &self.geom;
        assert!(j < g.ncols && i1 <= i2 && i2 <= g.nrows);
        if i1 < i2 {
            assert!(
                g.is_stored(i1, j) && g.is_stored(i2 - 1, j),
                "column run ([{i1},{i2}), {j}) leaves the stored region of {:?}",
                g.shape
            );
        }
        let start = if i1 == i2 { g.offset } else { g.raw_index(i1, j) };
        let (step, conj, len) = (g.row_step, g.conj, i2 - i1);
        unsafe { VecViewMut::new_unchecked(self.data, start, len, step, conj) }
    }

    /// Mutable stored run `[j1, j2)` of row `i`; see [`MatView::row_range`].
    pub fn row_range_mut(&mut self, i: usize, j1: usize, j2: usize) -> VecViewMut<'_, T> {
        let g = &self.geom;
        assert!(i < g.nrows && j1 <= j2 && j2 <= g.ncols);
        if j1 < j2 {
            assert!(
                g.is_stored(i, j1) && g.is_stored(i, j2 - 1),
                "row run ({i}, [{j1},{j2})) leaves the stored region of {:?}",
                g.shape
            );
        }
        let start = if j1 == j2 { g.offset } else { g.raw_index(i, j1) };
        let (step, conj, len) = (g.col_step, g.conj, j2 - j1);
        unsafe { VecViewMut::new_unchecked(self.data, start, len, step, conj) }
    }

    /// Stored row span of column `j`.
    #[inline]
    pub fn stored_col_span(&self, j: usize) -> core::ops::Range<usize> {
        self.geom.stored_col_span(j)
    }

    /// Logical row span of column `j`.
    #[inline]
    pub fn logical_col_span(&self, j: usize) -> core::ops::Range<usize> {
        self.geom.logical_col_span(j)
    }

    /// Logical column span of row `i`.
    #[inline]
    pub fn logical_row_span(&self, i: usize) -> core::ops::Range<usize> {
        self.geom.logical_row_span(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::same_storage;
    use num_complex::Complex64;

    // 4x4 column-major buffer: element (i, j) = i + 4*j
    fn dense() -> Vec<f64> {
        (0..16).map(|k| k as f64).collect()
    }

    fn view(data: &[f64], shape: Shape) -> MatView<'_, f64> {
        MatView::new(data, 0, 4, 4, 1, 4, Conjugation::NonConj, shape).unwrap()
    }

    #[test]
    fn rectangular_access_and_transpose() {
        let d = dense();
        let m = view(&d, Shape::Rectangular);
        assert_eq!(m.get(2, 3), 14.0);
        let t = m.transpose();
        assert_eq!(t.shape(), Shape::Rectangular);
        assert_eq!(t.get(3, 2), 14.0);
        assert_eq!(t.nrows(), 4);
    }

    #[test]
    fn triangular_structural_zeros() {
        let d = dense();
        let u = view(&d, Shape::UpperTriangular);
        assert_eq!(u.get(0, 2), 8.0);
        assert_eq!(u.get(2, 0), 0.0);
        let l = view(&d, Shape::LowerTriangular);
        assert_eq!(l.get(2, 0), 2.0);
        assert_eq!(l.get(0, 2), 0.0);
    }

    #[test]
    fn unit_diagonal_reads_one_and_rejects_writes() {
        let d = dense();
        let u = view(&d, Shape::UnitUpperTriangular);
        assert_eq!(u.get(1, 1), 1.0);
        assert_eq!(u.get(0, 3), 12.0);
        assert_eq!(u.get(3, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "implicit unit diagonal")]
    fn unit_diagonal_write_is_fatal() {
        let mut d = dense();
        let mut u =
            MatViewMut::new(&mut d, 0, 4, 4, 1, 4, Conjugation::NonConj, Shape::UnitLowerTriangular)
                .unwrap();
        u.set(1, 1, 5.0);
    }

    #[test]
    fn symmetric_reflection() {
        let d = dense();
        let s = view(&d, Shape::Symmetric);
        // upper triangle reflects the stored lower triangle
        assert_eq!(s.get(0, 2), s.get(2, 0));
        assert_eq!(s.get(1, 3), 7.0);
        // transpose of a symmetric view is itself
        let t = s.transpose();
        assert_eq!(t.conj_flag(), s.conj_flag());
        assert_eq!(t.get(1, 3), s.get(1, 3));
    }

    #[test]
    fn symmetric_write_remaps_to_stored_triangle() {
        let mut d = dense();
        let mut s =
            MatViewMut::new(&mut d, 0, 4, 4, 1, 4, Conjugation::NonConj, Shape::Symmetric).unwrap();
        s.set(0, 3, 99.0);
        assert_eq!(s.get(3, 0), 99.0);
        assert_eq!(s.get(0, 3), 99.0);
        // the stored cell is in the lower triangle: (3, 0) = 3 + 4*0
        assert_eq!(d[3], 99.0);
    }

    #[test]
    fn hermitian_diagonal_is_forced_real() {
        let mut d: Vec<Complex64> = vec![Complex64::new(0.0, 0.0); 16];
        let mut h =
            MatViewMut::new(&mut d, 0, 4, 4, 1, 4, Conjugation::NonConj, Shape::Hermitian).unwrap();
        h.set(2, 2, Complex64::new(3.0, 0.25));
        assert_eq!(h.get(2, 2), Complex64::new(3.0, 0.0));
        // off-diagonal reflected write conjugates
        let z = Complex64::new(1.0, 2.0);
        h.set(0, 2, z);
        assert_eq!(h.get(0, 2), z);
        assert_eq!(h.get(2, 0), z.conj());
    }

    #[test]
    fn hermitian_transpose_toggles_conjugation() {
        let d: Vec<Complex64> = (0..16).map(|k| Complex64::new(k as f64, 1.0)).collect();
        let h = MatView::new(&d, 0, 4, 4, 1, 4, Conjugation::NonConj, Shape::Hermitian).unwrap();
        let t = h.transpose();
        assert_eq!(t.shape(), Shape::Hermitian);
        assert!(t.conj_flag().is_conj());
        let a = h.adjoint();
        assert_eq!(a.conj_flag(), h.conj_flag());
    }

    #[test]
    fn diagonal_views() {
        let d = dense();
        let m = view(&d, Shape::Rectangular);
        let main = m.diagonal_at(0);
        assert_eq!(main.iter().collect::<Vec<_>>(), vec![0.0, 5.0, 10.0, 15.0]);
        let sup = m.diagonal_at(1);
        assert_eq!(sup.iter().collect::<Vec<_>>(), vec![4.0, 9.0, 14.0]);
        let sub = m.diagonal_at(-2);
        assert_eq!(sub.iter().collect::<Vec<_>>(), vec![2.0, 7.0]);
        assert_eq!(main.step(), 5);
    }

    #[test]
    fn banded_geometry() {
        // 5x5 band with lo=1, hi=2 in LAPACK-style packed storage:
        // ld = 4, offset = hi, row_step = 1, col_step = ld - 1
        let ld = 4usize;
        let n = 5usize;
        let data: Vec<f64> = (0..ld * n).map(|k| k as f64).collect();
        let b = MatView::new_banded(
            &data,
            2,
            n,
            n,
            1,
            (ld - 1) as isize,
            Conjugation::NonConj,
            Shape::Band,
            1,
            2,
        )
        .unwrap();
        assert!(b.is_stored(0, 0));
        assert!(b.is_stored(1, 0));
        assert!(!b.is_stored(2, 0));
        assert!(b.is_stored(0, 2));
        assert!(!b.is_stored(0, 3));
        assert_eq!(b.get(3, 1), 0.0);
        // diagonal step is row_step + col_step = ld
        let diag = b.diagonal_at(0);
        assert_eq!(diag.len(), 5);
        assert_eq!(diag.step(), ld as isize);
        let sup2 = b.diagonal_at(2);
        assert_eq!(sup2.len(), 3);
    }

    #[test]
    fn sub_views_share_storage() {
        let d = dense();
        let m = view(&d, Shape::Rectangular);
        let a = m.sub_matrix(0, 3, 0, 3);
        let b = m.sub_matrix(2, 4, 2, 4);
        let c = m.sub_matrix(0, 2, 2, 4);
        assert!(same_storage(a.storage_range(), b.storage_range()));
        assert!(same_storage(m.storage_range(), c.storage_range()));
        let lone = m.sub_matrix(3, 4, 0, 1);
        assert!(!same_storage(lone.storage_range(), c.storage_range()));
    }

    #[test]
    fn sub_triangle_keeps_shape() {
        let d = dense();
        let u = view(&d, Shape::UnitUpperTriangular);
        let s = u.sub_triangle(1, 4);
        assert_eq!(s.shape(), Shape::UnitUpperTriangular);
        assert_eq!(s.nrows(), 3);
        assert_eq!(s.get(0, 1), u.get(1, 2));
        assert_eq!(s.get(0, 0), 1.0);
    }

    #[test]
    fn square_shapes_reject_rectangular_extents() {
        let d = dense();
        assert!(matches!(
            MatView::new(&d, 0, 2, 4, 1, 4, Conjugation::NonConj, Shape::Symmetric),
            Err(ShapedError::NonSquare { .. })
        ));
    }

    #[test]
    fn poison_shapes_rejected_at_construction() {
        let d = dense();
        for s in [Shape::Null, Shape::Invalid, Shape::Vector] {
            assert!(matches!(
                MatView::new(&d, 0, 4, 4, 1, 4, Conjugation::NonConj, s),
                Err(ShapedError::InvalidShape(_))
            ));
        }
    }
}
