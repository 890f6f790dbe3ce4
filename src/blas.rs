//! Boundary for external BLAS-backed copy/scale collaborators.
//!
//! For any view this module exposes the minimal descriptor an external
//! fast-path routine needs (base pointer, extent, step, conjugation flag,
//! and for matrices the layout and leading dimension), plus the
//! compatibility predicates that decide whether the generic element-wise
//! loop can be bypassed. The slice-backed fast paths below stand in for the
//! external routine; when step or conjugation are incompatible the kernels
//! in [`crate::ops`] fall back to the generic loop.

use crate::element_op::Conjugation;
use crate::matview::MatView;
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::view::{VecView, VecViewMut};

/// BLAS matrix layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlasLayout {
    /// Rows are contiguous: `col_step == 1`.
    RowMajor,
    /// Columns are contiguous: `row_step == 1`.
    ColMajor,
}

/// Descriptor of a vector view for an external routine.
#[derive(Debug, Clone, Copy)]
pub struct BlasVec<T> {
    pub ptr: *const T,
    pub len: usize,
    pub step: isize,
    pub conj: Conjugation,
}

/// Descriptor of a BLAS-compatible dense matrix view.
#[derive(Debug, Clone, Copy)]
pub struct BlasMat<T> {
    pub ptr: *const T,
    pub layout: BlasLayout,
    pub rows: usize,
    pub cols: usize,
    /// Leading dimension: step between consecutive columns (`ColMajor`) or
    /// rows (`RowMajor`).
    pub ld: usize,
    pub conj: Conjugation,
}

/// Extract the descriptor of any vector view. Always succeeds; whether an
/// external routine can consume it depends on its own step/conjugation
/// requirements.
pub fn vec_descriptor<T: Scalar>(view: &VecView<'_, T>) -> BlasVec<T> {
    BlasVec {
        ptr: view.as_ptr(),
        len: view.len(),
        step: view.step(),
        conj: view.conj_flag(),
    }
}

/// Extract a dense-matrix descriptor, or `None` when the view is not
/// expressible to BLAS: structured shapes, or neither axis unit-stride.
pub fn mat_descriptor<T: Scalar>(view: &MatView<'_, T>) -> Option<BlasMat<T>> {
    if view.shape() != Shape::Rectangular {
        return None;
    }
    let (rs, cs) = (view.row_step(), view.col_step());
    if rs == 1 && cs >= view.nrows() as isize {
        return Some(BlasMat {
            ptr: view.as_ptr(),
            layout: BlasLayout::ColMajor,
            rows: view.nrows(),
            cols: view.ncols(),
            ld: cs as usize,
            conj: view.conj_flag(),
        });
    }
    if cs == 1 && rs >= view.ncols() as isize {
        return Some(BlasMat {
            ptr: view.as_ptr(),
            layout: BlasLayout::RowMajor,
            rows: view.nrows(),
            cols: view.ncols(),
            ld: rs as usize,
            conj: view.conj_flag(),
        });
    }
    None
}

/// Whether a vector view is contiguous in the forward direction.
#[inline]
pub fn is_contiguous<T: Scalar>(view: &VecView<'_, T>) -> bool {
    view.step() == 1
}

/// Fast copy when both views are unit-stride and the conjugation flags
/// agree (the raw values transfer unchanged). Returns `false` when the
/// generic loop must run instead.
pub fn copy_fast<T: Scalar>(src: &VecView<'_, T>, dest: &mut VecViewMut<'_, T>) -> bool {
    if src.conj_flag() != dest.conj_flag() {
        return false;
    }
    let Some(s) = src.contiguous_slice() else {
        return false;
    };
    let Some(d) = dest.contiguous_slice_mut() else {
        return false;
    };
    d.copy_from_slice(s);
    true
}

/// Fast in-place scale when the view is unit-stride. A conjugated view
/// scales the raw values by `conj(alpha)`, which is the same logical result.
pub fn scale_fast<T: Scalar>(dest: &mut VecViewMut<'_, T>, alpha: T) -> bool {
    let alpha = dest.conj_flag().apply(alpha);
    let Some(d) = dest.contiguous_slice_mut() else {
        return false;
    };
    for x in d.iter_mut() {
        *x = alpha * *x;
    }
    true
}
