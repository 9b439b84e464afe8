//! Scalar abstraction for convolution element types
//!
//! The operator engine is generic over its element type: real kernels use
//! `f64`, oscillatory kernels use `Complex64`. Both are unified behind the
//! [`ConvScalar`] trait, which combines nalgebra's `ComplexField` (modulus,
//! conjugation, construction from a real part) with ndarray's `LinalgScalar`
//! (the arithmetic required by dense contractions).

use nalgebra::ComplexField;
use ndarray::{ArrayBase, Data, Dimension, LinalgScalar};
use num_complex::Complex64;

/// Element type of kernel projections and operator blocks.
///
/// The real magnitude type is always `f64`; singular values and norms are
/// reported as `f64` regardless of whether the elements are real or complex.
pub trait ConvScalar: ComplexField<RealField = f64> + LinalgScalar + Send + Sync {}

impl ConvScalar for f64 {}
impl ConvScalar for Complex64 {}

/// Frobenius norm of a tensor of any dimensionality.
///
/// Empty tensors have norm zero.
pub fn normf<Q, S, D>(a: &ArrayBase<S, D>) -> f64
where
    Q: ConvScalar,
    S: Data<Elem = Q>,
    D: Dimension,
{
    a.iter().map(|q| q.modulus_squared()).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_normf_real() {
        let a = Array1::from(vec![3.0, 4.0]);
        assert!((normf(&a) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn test_normf_complex() {
        let a = Array1::from(vec![Complex64::new(3.0, 4.0)]);
        assert!((normf(&a) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn test_normf_empty() {
        let a = Array2::<f64>::zeros((0, 0));
        assert_eq!(normf(&a), 0.0);
    }
}
