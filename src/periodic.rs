//! Gaussian kernel summed over periodic images
//!
//! The periodised operator at (n, l) is the sum of the free-space Gaussian
//! over translations l + R * 2^n for R in [-maxR, maxR]. The kernel owns a
//! full inner Gaussian operator so image projections land in (and are
//! served from) the inner cache.

use ndarray::Array1;
use num_traits::Zero;

use crate::gaussian::GaussianKernel1D;
use crate::numeric::ConvScalar;
use crate::operator::{Convolution1D, ConvolutionKernel, Level, Translation};
use crate::transform::aligned_add;

/// 1-D Gaussian convolution summed over periodic translations.
pub struct PeriodicKernel1D<Q: ConvScalar> {
    max_r: i64,
    inner: Convolution1D<Q, GaussianKernel1D<Q>>,
}

impl<Q: ConvScalar> PeriodicKernel1D<Q> {
    /// Periodised Gaussian with image range `max_r`.
    ///
    /// # Panics
    /// Panics if `max_r` is negative or the Gaussian parameters are
    /// rejected by [`GaussianKernel1D::new`].
    pub fn new(k: usize, max_r: i64, coeff: Q, expnt: f64) -> Self {
        assert!(max_r >= 0, "image range must be non-negative, got {}", max_r);
        Self {
            max_r,
            inner: Convolution1D::new(k, GaussianKernel1D::new(k, coeff, expnt)),
        }
    }

    pub fn max_r(&self) -> i64 {
        self.max_r
    }

    /// The free-space operator whose projections are being summed.
    pub fn inner(&self) -> &Convolution1D<Q, GaussianKernel1D<Q>> {
        &self.inner
    }
}

impl<Q: ConvScalar> ConvolutionKernel<Q> for PeriodicKernel1D<Q> {
    fn rnlp(&self, n: Level, l: Translation) -> Array1<Q> {
        assert!((0..62).contains(&n), "level {} out of range for image arithmetic", n);
        let twon = 1_i64 << n;
        let twok = 2 * self.inner.k();
        let mut acc = vec![Q::zero(); twok];
        for r in -self.max_r..=self.max_r {
            let image = self.inner.get_rnlp(n, r * twon + l);
            aligned_add(&mut acc, image.as_slice().expect("standard layout"));
        }
        Array1::from(acc)
    }

    fn issmall(&self, n: Level, l: Translation) -> bool {
        assert!((0..62).contains(&n), "level {} out of range for image arithmetic", n);
        let twon = 1_i64 << n;
        (-self.max_r..=self.max_r).all(|r| self.inner.issmall(n, r * twon + l))
    }

    fn natural_level(&self) -> Level {
        self.inner.natural_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_image_sum_matches_manual_accumulation() {
        let k = 3;
        let per = PeriodicKernel1D::new(k, 2, 1.0, 1.0);
        let v = per.rnlp(0, 0);

        // Same summands through an independent free-space operator.
        let free = Convolution1D::new(k, GaussianKernel1D::new(k, 1.0, 1.0));
        let mut expected = vec![0.0; 2 * k];
        for r in -2..=2 {
            let img = free.get_rnlp(0, r);
            for p in 0..expected.len() {
                expected[p] += img[p];
            }
        }
        for p in 0..expected.len() {
            assert_abs_diff_eq!(v[p], expected[p], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_zero_image_range_reduces_to_free_space() {
        let k = 2;
        let per = PeriodicKernel1D::new(k, 0, 1.0, 4.0);
        let free = GaussianKernel1D::new(k, 1.0, 4.0);
        let v = per.rnlp(1, 1);
        let w = free.rnlp(1, 1);
        for p in 0..v.len() {
            // The periodic path serves the projection through the inner
            // engine, which refines below the natural level; agreement is
            // up to the recursion round-off.
            assert_abs_diff_eq!(v[p], w[p], epsilon = 1e-13);
        }
    }

    #[test]
    fn test_issmall_requires_all_images_small() {
        let per = PeriodicKernel1D::new(2, 1, 1.0, 1e6);
        // natural level of the inner Gaussian
        let n = per.natural_level();
        assert!(n > 0);
        // l = 0 has the R = 0 image on top of the box: never small.
        assert!(!per.issmall(0, 0));
        // Halfway between images is far from all of them, but a full
        // period lands exactly on the R = 1 image.
        let nn = 5;
        let twon = 1_i64 << nn;
        assert!(per.issmall(nn, twon / 2));
        assert!(!per.issmall(nn, twon));
    }

    #[test]
    fn test_natural_level_delegates() {
        let per = PeriodicKernel1D::new(2, 1, 1.0, 16.0);
        assert_eq!(per.natural_level(), 3);
    }
}
