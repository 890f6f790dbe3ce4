//! Givens rotations through views.

use crate::scalar::Scalar;
use crate::view::VecViewMut;
use num_traits::{Float, One, Zero};

/// A plane rotation `[c, s; -conj(s), c]` with real `c`.
#[derive(Debug, Clone, Copy)]
pub struct Givens<T: Scalar> {
    pub c: T::Real,
    pub s: T,
}

/// Compute the rotation with `G * [a; b] = [r; 0]`, returning `(G, r)`.
///
/// Stable for both real and complex elements; `c` is always real and
/// nonnegative.
pub fn make_givens<T: Scalar>(a: T, b: T) -> (Givens<T>, T) {
    if b.is_zero() {
        return (
            Givens {
                c: T::Real::one(),
                s: T::zero(),
            },
            a,
        );
    }
    if a.is_zero() {
        let bm = b.modulus();
        return (
            Givens {
                c: T::Real::zero(),
                s: b.conj() / T::from_real(bm),
            },
            T::from_real(bm),
        );
    }
    let am = a.modulus();
    let r_mod = (am * am + b.modulus() * b.modulus()).sqrt();
    let phase = a / T::from_real(am);
    let g = Givens {
        c: am / r_mod,
        s: phase * b.conj() / T::from_real(r_mod),
    };
    (g, phase * T::from_real(r_mod))
}

impl<T: Scalar> Givens<T> {
    /// Apply the rotation to paired elements of two equal-length views
    /// (e.g. two rows of a matrix).
    ///
    /// # Panics
    ///
    /// Panics if the extents differ.
    pub fn apply(&self, x: &mut VecViewMut<'_, T>, y: &mut VecViewMut<'_, T>) {
        assert_eq!(x.len(), y.len(), "givens apply extent mismatch");
        let c = T::from_real(self.c);
        for i in 0..x.len() {
            let xi = x.get(i);
            let yi = y.get(i);
            x.set(i, c * xi + self.s * yi);
            y.set(i, c * yi - self.s.conj() * xi);
        }
    }

    /// The inverse rotation.
    pub fn inverse(&self) -> Givens<T> {
        Givens {
            c: self.c,
            s: -self.s,
        }
    }
}
