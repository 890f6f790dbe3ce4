//! Shape-classified dense and banded linear algebra over strided views.
//!
//! This crate provides a closed shape algebra, aliasing-aware strided views,
//! and the owning containers and kernels built on top of them.
//!
//! # Core Types
//!
//! - [`Shape`]: closed enumeration of structural sparsity/symmetry classes,
//!   with [`product_shape`], [`sum_shape`] and [`is_assignable`] predicting
//!   derived structure without touching elements
//! - [`VecView`] / [`VecViewMut`], [`MatView`] / [`MatViewMut`]: zero-copy
//!   strided views with a runtime conjugation flag and, for matrices, a
//!   shape tag and stored band widths
//! - [`Vector`], [`Matrix`], [`BandMatrix`], [`SymMatrix`]: owning
//!   containers, each exposing one canonical view
//!
//! # Shaped access
//!
//! Logical element access goes through the shape tag: structural zeros read
//! as zero, implicit unit diagonals read as one, symmetric and Hermitian
//! views reflect across the diagonal, and Hermitian diagonal writes truncate
//! the imaginary part to exactly zero.
//!
//! ```rust
//! use strided_shapes::{product_shape, Matrix, Shape};
//!
//! let m = Matrix::from_fn(3, 3, |i, j| (1 + i * 3 + j) as f64);
//! let u = m.upper_triangle();
//! assert_eq!(u.get(2, 0), 0.0); // structural zero
//! assert_eq!(u.get(0, 2), m[(0, 2)]);
//!
//! // a lower-band times an upper-triangular operand fills both triangles
//! assert_eq!(
//!     product_shape(Shape::LowerBand, Shape::UpperTriangular),
//!     Shape::Rectangular
//! );
//! ```
//!
//! # Aliasing
//!
//! Before any kernel writes through a destination view it classifies the
//! overlap with every source ([`alias_check`]): disjoint storage is
//! evaluated directly, the identical-view pattern (pure in-place scaling) is
//! a safe fast path, and any other overlap is materialized through a
//! temporary container first. The overlap test normalizes address ranges, so
//! reversed (negative-step) views compare correctly.
//!
//! # Error model
//!
//! Construction and validation errors and numerical degeneracy (a singular
//! pivot) are reported through [`Result`]. Contract violations (sub-range
//! bounds, zero steps, writes to structural zeros, shape-incompatible
//! assignment) panic with a message naming the shapes involved.

mod alias;
mod blas;
mod element_op;
mod expr;
mod givens;
mod householder;
mod matrix;
mod matview;
mod multiply;
mod ops;
mod scalar;
mod shape;
mod solve;
mod vector;
mod view;

// ============================================================================
// Shape algebra
// ============================================================================
pub use shape::{is_assignable, product_shape, sum_shape, Shape, ShapeFlags};

// ============================================================================
// Element and conjugation model
// ============================================================================
pub use element_op::Conjugation;
pub use scalar::{RealScalar, Scalar};

// ============================================================================
// Views and aliasing
// ============================================================================
pub use alias::{alias_check, same_storage, AliasCheck, StorageRange};
pub use matview::{MatView, MatViewMut};
pub use view::{VecIter, VecView, VecViewMut};

// ============================================================================
// Owning containers
// ============================================================================
pub use matrix::{BandMatrix, Matrix, SymMatrix};
pub use vector::Vector;

// ============================================================================
// Kernels and composites
// ============================================================================
pub use expr::{scalar_div, scaled, MatMatProd, MatVecProd, ScalarQuot, ScaledMat};
pub use givens::{make_givens, Givens};
pub use householder::{apply_reflector, make_reflector};
pub use multiply::{mat_add_into, mat_mat, mat_mat_into, mat_vec, mat_vec_into, MM_BLOCK};
pub use ops::{axpby, axpy, copy_into, dot, mat_copy_into, mat_scale, scale, swap};
pub use solve::invert_into;

// ============================================================================
// External fast-path boundary
// ============================================================================
pub use blas::{is_contiguous, mat_descriptor, vec_descriptor, BlasLayout, BlasMat, BlasVec};

// ============================================================================
// Error types
// ============================================================================

/// Errors reported through the `Result` channel: construction/validation
/// failures and numerical degeneracy. Contract violations panic instead.
#[derive(Debug, thiserror::Error)]
pub enum ShapedError {
    /// A view would touch elements outside its buffer.
    #[error("view exceeds buffer: needs {needed} elements, buffer has {len}")]
    ViewBounds { needed: usize, len: usize },

    /// A zero step is not a valid traversal.
    #[error("zero step is not a valid traversal")]
    ZeroStep,

    /// The shape cannot describe data in this position.
    #[error("shape {0:?} cannot describe data here")]
    InvalidShape(Shape),

    /// A square-only shape was given rectangular extents.
    #[error("non-square extents: rows={rows}, cols={cols}")]
    NonSquare { rows: usize, cols: usize },

    /// Band widths reach past the matrix extents.
    #[error("band widths ({lo}, {hi}) too wide for {rows}x{cols}")]
    BandWidth {
        lo: usize,
        hi: usize,
        rows: usize,
        cols: usize,
    },

    /// A fill source ran short of the requested extent.
    #[error("extent mismatch: expected {expected}, found {found}")]
    ExtentMismatch { expected: usize, found: usize },

    /// A structurally zero pivot was hit during inversion.
    #[error("singular pivot at index {0}")]
    Singular(usize),
}

/// Result type for shaped operations.
pub type Result<T> = std::result::Result<T, ShapedError>;
