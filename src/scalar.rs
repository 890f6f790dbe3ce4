//! Element-type classification for shaped views.
//!
//! Every view in this crate is generic over a [`Scalar`]: a numeric element
//! that knows whether it is real or complex, how to conjugate itself, and how
//! to project onto its real part. Real types implement all of this trivially
//! (conjugation is the identity), so kernels can be written once for the
//! complex case and remain exact for reals.

use core::fmt::Debug;
use core::ops::Neg;
use num_complex::Complex;
use num_traits::{Float, Num, One, Zero};

/// Trait for the real component type of a [`Scalar`].
///
/// Blanket-implemented for every real float that is its own real type
/// (`f32`, `f64`).
pub trait RealScalar: Scalar<Real = Self> + Float + PartialOrd {}

impl<T: Scalar<Real = T> + Float + PartialOrd> RealScalar for T {}

/// Trait for matrix/vector element types.
///
/// Covers real floats (`f32`, `f64`) and complex numbers (`Complex<f32>`,
/// `Complex<f64>`). The associated [`Scalar::Real`] type is `Self` for reals
/// and the component type for complex numbers.
pub trait Scalar:
    Copy + PartialEq + Debug + Zero + One + Num + Neg<Output = Self> + 'static
{
    /// The real component type.
    type Real: RealScalar;

    /// Whether this element type carries an imaginary component.
    const IS_COMPLEX: bool;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Imaginary part (zero for reals).
    fn im(self) -> Self::Real;

    /// Absolute value / modulus.
    fn modulus(self) -> Self::Real;

    /// Promote a real value into `Self`.
    fn from_real(r: Self::Real) -> Self;

    /// Truncate the imaginary part to exactly zero.
    ///
    /// For reals this is the identity. Used when writing to positions that
    /// are real-valued by mathematical definition (Hermitian diagonals): any
    /// accumulated rounding in the imaginary component is discarded, not
    /// merely tolerated.
    fn zero_imag(self) -> Self;

    /// Machine epsilon of the underlying real type.
    fn epsilon() -> Self::Real;
}

macro_rules! impl_scalar_real {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                type Real = $t;
                const IS_COMPLEX: bool = false;

                #[inline] fn conj(self) -> $t { self }
                #[inline] fn re(self) -> $t { self }
                #[inline] fn im(self) -> $t { 0.0 }
                #[inline] fn modulus(self) -> $t { Float::abs(self) }
                #[inline] fn from_real(r: $t) -> $t { r }
                #[inline] fn zero_imag(self) -> $t { self }
                #[inline] fn epsilon() -> $t { <$t as Float>::epsilon() }
            }
        )*
    };
}

impl_scalar_real!(f32, f64);

impl<T: RealScalar> Scalar for Complex<T> {
    type Real = T;
    const IS_COMPLEX: bool = true;

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn im(self) -> T {
        self.im
    }

    #[inline]
    fn modulus(self) -> T {
        self.norm()
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }

    #[inline]
    fn zero_imag(self) -> Self {
        Complex::new(self.re, T::zero())
    }

    #[inline]
    fn epsilon() -> T {
        <T as Float>::epsilon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn real_conj_is_identity() {
        assert_eq!(3.5f64.conj(), 3.5);
        assert_eq!((-2.0f32).conj(), -2.0);
        assert!(!f64::IS_COMPLEX);
    }

    #[test]
    fn complex_conj_flips_imaginary() {
        let z = Complex64::new(1.0, -2.0);
        assert_eq!(z.conj(), Complex64::new(1.0, 2.0));
        assert!(Complex64::IS_COMPLEX);
    }

    #[test]
    fn zero_imag_truncates_exactly() {
        let z = Complex64::new(4.0, 1e-300);
        let t = z.zero_imag();
        assert_eq!(t.im, 0.0);
        assert_eq!(t.re, 4.0);
    }

    #[test]
    fn modulus_and_parts() {
        let z = Complex64::new(3.0, 4.0);
        assert_eq!(z.modulus(), 5.0);
        assert_eq!(z.re(), 3.0);
        assert_eq!(z.im(), 4.0);
        assert_eq!(Complex64::from_real(2.0), Complex64::new(2.0, 0.0));
    }
}
