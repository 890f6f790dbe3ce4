//! Closed shape algebra for matrix structure.
//!
//! A [`Shape`] tags a matrix (or vector) with its structural sparsity pattern
//! and symmetry class. The algebra answers three questions about pairs of
//! shapes without looking at any element:
//!
//! - [`product_shape`]: the shape of `A * B`
//! - [`sum_shape`]: the shape of `A + B`
//! - [`is_assignable`]: whether data logically shaped `S1` may be written
//!   through a destination of shape `S2` without symmetrization or fill-in
//!
//! All three are pure functions implemented as exhaustive case analysis over
//! the closed enumeration; there is no fallback arm, so adding a shape
//! without extending the tables is a compile error.
//!
//! [`Shape::Null`] is a pure absence marker acting as the identity of the
//! algebra. [`Shape::Invalid`] is a poison tag: it never describes data and
//! [`product_shape`]/[`sum_shape`] treat it as a programming error.

/// Structural classification of a matrix or vector.
///
/// The `Unit*` shapes have an implicit diagonal of ones that is not stored.
/// The `*Band` shapes restrict fill to a diagonal band. `RealSymmetric` is a
/// symmetric matrix known to have real elements (and is therefore also
/// Hermitian); `Symmetric` and `Hermitian` are the general complex classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Rectangular,
    Diagonal,
    UpperTriangular,
    LowerTriangular,
    UnitUpperTriangular,
    UnitLowerTriangular,
    Band,
    UpperBand,
    LowerBand,
    UnitUpperBand,
    UnitLowerBand,
    RealSymmetric,
    Symmetric,
    Hermitian,
    RealSymmetricBand,
    SymmetricBand,
    HermitianBand,
    /// One-dimensional data; products with any matrix shape stay `Vector`.
    Vector,
    /// Absence of an operand; identity element of the shape algebra.
    Null,
    /// Poison value. Never describes data.
    Invalid,
}

/// Structural flags derived from a [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeFlags {
    /// The shape only exists for square extents.
    pub square: bool,
    /// `A == A^T` holds structurally.
    pub symmetric: bool,
    /// `A == A^H` holds structurally (diagonal real by definition).
    pub hermitian: bool,
    /// Fill above the diagonal is possible.
    pub upper: bool,
    /// Fill below the diagonal is possible.
    pub lower: bool,
    /// Fill is restricted to a diagonal band.
    pub banded: bool,
    /// The diagonal is implicitly one and not stored.
    pub unit_diagonal: bool,
}

impl Shape {
    /// Every member of the closed enumeration, in declaration order.
    pub const ALL: [Shape; 20] = [
        Shape::Rectangular,
        Shape::Diagonal,
        Shape::UpperTriangular,
        Shape::LowerTriangular,
        Shape::UnitUpperTriangular,
        Shape::UnitLowerTriangular,
        Shape::Band,
        Shape::UpperBand,
        Shape::LowerBand,
        Shape::UnitUpperBand,
        Shape::UnitLowerBand,
        Shape::RealSymmetric,
        Shape::Symmetric,
        Shape::Hermitian,
        Shape::RealSymmetricBand,
        Shape::SymmetricBand,
        Shape::HermitianBand,
        Shape::Vector,
        Shape::Null,
        Shape::Invalid,
    ];

    /// Classify this shape.
    ///
    /// Total over the enumeration. No shape reports contradictory flags:
    /// in particular `unit_diagonal` never coexists with `symmetric` or
    /// `hermitian` because no such shape is a member of the enumeration.
    pub const fn flags(self) -> ShapeFlags {
        const fn f(
            square: bool,
            symmetric: bool,
            hermitian: bool,
            upper: bool,
            lower: bool,
            banded: bool,
            unit_diagonal: bool,
        ) -> ShapeFlags {
            ShapeFlags {
                square,
                symmetric,
                hermitian,
                upper,
                lower,
                banded,
                unit_diagonal,
            }
        }
        match self {
            Shape::Rectangular => f(false, false, false, true, true, false, false),
            Shape::Diagonal => f(true, true, false, false, false, true, false),
            Shape::UpperTriangular => f(true, false, false, true, false, false, false),
            Shape::LowerTriangular => f(true, false, false, false, true, false, false),
            Shape::UnitUpperTriangular => f(true, false, false, true, false, false, true),
            Shape::UnitLowerTriangular => f(true, false, false, false, true, false, true),
            Shape::Band => f(false, false, false, true, true, true, false),
            Shape::UpperBand => f(true, false, false, true, false, true, false),
            Shape::LowerBand => f(true, false, false, false, true, true, false),
            Shape::UnitUpperBand => f(true, false, false, true, false, true, true),
            Shape::UnitLowerBand => f(true, false, false, false, true, true, true),
            Shape::RealSymmetric => f(true, true, true, true, true, false, false),
            Shape::Symmetric => f(true, true, false, true, true, false, false),
            Shape::Hermitian => f(true, false, true, true, true, false, false),
            Shape::RealSymmetricBand => f(true, true, true, true, true, true, false),
            Shape::SymmetricBand => f(true, true, false, true, true, true, false),
            Shape::HermitianBand => f(true, false, true, true, true, true, false),
            Shape::Vector => f(false, false, false, false, false, false, false),
            Shape::Null => f(false, false, false, false, false, false, false),
            Shape::Invalid => f(false, false, false, false, false, false, false),
        }
    }

    #[inline]
    pub const fn is_square_required(self) -> bool {
        self.flags().square
    }

    #[inline]
    pub const fn is_symmetric(self) -> bool {
        self.flags().symmetric
    }

    #[inline]
    pub const fn is_hermitian(self) -> bool {
        self.flags().hermitian
    }

    #[inline]
    pub const fn has_upper(self) -> bool {
        self.flags().upper
    }

    #[inline]
    pub const fn has_lower(self) -> bool {
        self.flags().lower
    }

    #[inline]
    pub const fn is_banded(self) -> bool {
        self.flags().banded
    }

    #[inline]
    pub const fn has_unit_diagonal(self) -> bool {
        self.flags().unit_diagonal
    }

    /// Whether this shape may describe actual element data.
    #[inline]
    pub const fn describes_data(self) -> bool {
        !matches!(self, Shape::Null | Shape::Invalid)
    }

    /// Shape of the algebraic inverse.
    ///
    /// The inverse of a banded triangular matrix is a full triangular matrix
    /// and the inverse of a general band matrix is dense; symmetry classes
    /// are preserved. `Vector` and `Invalid` have no inverse and map to the
    /// poison tag.
    pub const fn inverse_shape(self) -> Shape {
        match self {
            Shape::Rectangular => Shape::Rectangular,
            Shape::Diagonal => Shape::Diagonal,
            Shape::UpperTriangular => Shape::UpperTriangular,
            Shape::LowerTriangular => Shape::LowerTriangular,
            Shape::UnitUpperTriangular => Shape::UnitUpperTriangular,
            Shape::UnitLowerTriangular => Shape::UnitLowerTriangular,
            Shape::Band => Shape::Rectangular,
            Shape::UpperBand => Shape::UpperTriangular,
            Shape::LowerBand => Shape::LowerTriangular,
            Shape::UnitUpperBand => Shape::UnitUpperTriangular,
            Shape::UnitLowerBand => Shape::UnitLowerTriangular,
            Shape::RealSymmetric => Shape::RealSymmetric,
            Shape::Symmetric => Shape::Symmetric,
            Shape::Hermitian => Shape::Hermitian,
            Shape::RealSymmetricBand => Shape::RealSymmetric,
            Shape::SymmetricBand => Shape::Symmetric,
            Shape::HermitianBand => Shape::Hermitian,
            Shape::Vector => Shape::Invalid,
            Shape::Null => Shape::Null,
            Shape::Invalid => Shape::Invalid,
        }
    }

    /// The same shape with the implicit unit diagonal materialized.
    ///
    /// Identity for shapes without a unit diagonal.
    pub const fn with_explicit_diagonal(self) -> Shape {
        match self {
            Shape::UnitUpperTriangular => Shape::UpperTriangular,
            Shape::UnitLowerTriangular => Shape::LowerTriangular,
            Shape::UnitUpperBand => Shape::UpperBand,
            Shape::UnitLowerBand => Shape::LowerBand,
            s => s,
        }
    }

    /// The same shape with the diagonal made implicitly one.
    ///
    /// Identity for shapes with no unit-diagonal counterpart.
    pub const fn with_unit_diagonal(self) -> Shape {
        match self {
            Shape::UpperTriangular => Shape::UnitUpperTriangular,
            Shape::LowerTriangular => Shape::UnitLowerTriangular,
            Shape::UpperBand => Shape::UnitUpperBand,
            Shape::LowerBand => Shape::UnitLowerBand,
            s => s,
        }
    }

    /// Shape of the transpose.
    ///
    /// Symmetry classes are fixed points; transposing a Hermitian view
    /// additionally toggles its conjugation flag, which is handled at the
    /// view level, not here.
    pub const fn transposed(self) -> Shape {
        match self {
            Shape::UpperTriangular => Shape::LowerTriangular,
            Shape::LowerTriangular => Shape::UpperTriangular,
            Shape::UnitUpperTriangular => Shape::UnitLowerTriangular,
            Shape::UnitLowerTriangular => Shape::UnitUpperTriangular,
            Shape::UpperBand => Shape::LowerBand,
            Shape::LowerBand => Shape::UpperBand,
            Shape::UnitUpperBand => Shape::UnitLowerBand,
            Shape::UnitLowerBand => Shape::UnitUpperBand,
            s => s,
        }
    }
}

const fn lower_product(unit: bool, banded: bool) -> Shape {
    match (unit, banded) {
        (true, true) => Shape::UnitLowerBand,
        (true, false) => Shape::UnitLowerTriangular,
        (false, true) => Shape::LowerBand,
        (false, false) => Shape::LowerTriangular,
    }
}

const fn upper_product(unit: bool, banded: bool) -> Shape {
    match (unit, banded) {
        (true, true) => Shape::UnitUpperBand,
        (true, false) => Shape::UnitUpperTriangular,
        (false, true) => Shape::UpperBand,
        (false, false) => Shape::UpperTriangular,
    }
}

/// Shape of the product `S1 * S2`.
///
/// Total over all non-`Invalid` pairs. `Null` is the identity; any `Vector`
/// operand yields `Vector`. The result is the tightest shape implied by the
/// operands' fill patterns: structure survives only while at least one side
/// of the diagonal stays empty, or while both operands are banded.
///
/// # Panics
///
/// Panics if either operand is [`Shape::Invalid`].
pub fn product_shape(s1: Shape, s2: Shape) -> Shape {
    assert!(
        s1 != Shape::Invalid && s2 != Shape::Invalid,
        "product_shape called with poison operand: {s1:?} * {s2:?}"
    );
    if s1 == Shape::Null {
        return s2;
    }
    if s2 == Shape::Null {
        return s1;
    }
    if s1 == Shape::Vector || s2 == Shape::Vector {
        return Shape::Vector;
    }

    let f1 = s1.flags();
    let f2 = s2.flags();
    let no_upper = !f1.upper && !f2.upper;
    let no_lower = !f1.lower && !f2.lower;
    let unit = f1.unit_diagonal && f2.unit_diagonal;
    let banded = f1.banded && f2.banded;

    if no_upper && no_lower {
        Shape::Diagonal
    } else if no_upper {
        lower_product(unit, banded)
    } else if no_lower {
        upper_product(unit, banded)
    } else if banded {
        Shape::Band
    } else {
        Shape::Rectangular
    }
}

/// Shape of the sum `S1 + S2`.
///
/// Total over all non-`Invalid` pairs and commutative. `Null` is the
/// identity; any `Vector` operand yields `Vector`. A sum is symmetric
/// (Hermitian) only when *both* operands are; the sum of unit-diagonal
/// shapes is never unit (the diagonal sums to two).
///
/// # Panics
///
/// Panics if either operand is [`Shape::Invalid`].
pub fn sum_shape(s1: Shape, s2: Shape) -> Shape {
    assert!(
        s1 != Shape::Invalid && s2 != Shape::Invalid,
        "sum_shape called with poison operand: {s1:?} + {s2:?}"
    );
    if s1 == Shape::Null {
        return s2;
    }
    if s2 == Shape::Null {
        return s1;
    }
    if s1 == Shape::Vector || s2 == Shape::Vector {
        return Shape::Vector;
    }

    let f1 = s1.flags();
    let f2 = s2.flags();
    let no_upper = !f1.upper && !f2.upper;
    let no_lower = !f1.lower && !f2.lower;
    let banded = f1.banded && f2.banded;

    if no_upper && no_lower {
        return Shape::Diagonal;
    }
    if no_upper {
        return lower_product(false, banded);
    }
    if no_lower {
        return upper_product(false, banded);
    }

    let real_sym =
        |s: Shape| matches!(s, Shape::RealSymmetric | Shape::RealSymmetricBand);
    if f1.symmetric && f2.symmetric {
        if real_sym(s1) && real_sym(s2) {
            if banded {
                Shape::RealSymmetricBand
            } else {
                Shape::RealSymmetric
            }
        } else if banded {
            Shape::SymmetricBand
        } else {
            Shape::Symmetric
        }
    } else if f1.hermitian && f2.hermitian {
        if banded {
            Shape::HermitianBand
        } else {
            Shape::Hermitian
        }
    } else if banded {
        Shape::Band
    } else {
        Shape::Rectangular
    }
}

/// Whether data logically shaped `src` may be assigned through a destination
/// of shape `dst`.
///
/// True iff every structural zero implied by `src` is also implied by `dst`
/// and the unit-diagonal/symmetry/Hermitian constraints of `dst` are
/// satisfiable from `src`. Reflexive for every shape. `Null` sources are
/// vacuously assignable anywhere (there is nothing to write); nothing but
/// `Null` is assignable into a `Null` destination.
pub fn is_assignable(src: Shape, dst: Shape) -> bool {
    if src == Shape::Null {
        return true;
    }
    if dst == Shape::Null {
        return false;
    }
    if (src == Shape::Vector) != (dst == Shape::Vector) {
        return false;
    }

    let f1 = src.flags();
    let f2 = dst.flags();
    if f1.upper && !f2.upper {
        return false;
    }
    if f1.lower && !f2.lower {
        return false;
    }
    if f2.unit_diagonal && !f1.unit_diagonal {
        return false;
    }
    if f2.banded && !f1.banded {
        return false;
    }
    if f2.symmetric && !f1.symmetric {
        return false;
    }
    if f2.hermitian && !f1.hermitian {
        return false;
    }
    true
}
