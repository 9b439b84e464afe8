//! Gaussian kernel with closed-form screening
//!
//! The kernel is coeff * exp(-expnt * x^2) with coeff and expnt given in
//! *simulation* coordinates [0, 1]. Projections are computed by high-order
//! Gauss-Legendre quadrature on subintervals sized from the exponent, with
//! an absolute-error screen that stops as soon as a subinterval (and hence
//! all later ones) contributes below 1e-22.

use ndarray::Array1;
use num_traits::Zero;

use crate::gauss::gauss_legendre;
use crate::legendre::legendre_scaling_functions;
use crate::numeric::ConvScalar;
use crate::operator::{ConvolutionKernel, Level, Translation, MAX_ORDER};

/// 1-D Gaussian convolution kernel.
#[derive(Debug, Clone)]
pub struct GaussianKernel1D<Q: ConvScalar> {
    k: usize,
    npt: usize,
    coeff: Q,
    expnt: f64,
    natlev: Level,
    quad_x: Array1<f64>,
    quad_w: Array1<f64>,
}

impl<Q: ConvScalar> GaussianKernel1D<Q> {
    /// Create the kernel for scaling order `k`.
    ///
    /// A Gaussian restricted to a unit box is resolved by a polynomial of
    /// order about 21, so matrix elements against polynomials of order
    /// 2k - 1 integrate exactly with a rule of k + 11 points.
    ///
    /// # Panics
    /// Panics unless `k` is in `1..=MAX_ORDER` and `expnt` is positive.
    pub fn new(k: usize, coeff: Q, expnt: f64) -> Self {
        assert!(
            (1..=MAX_ORDER).contains(&k),
            "scaling function order must be in 1..={}, got {}",
            MAX_ORDER,
            k
        );
        assert!(expnt > 0.0, "Gaussian exponent must be positive, got {}", expnt);

        let npt = k + 11;
        let (quad_x, quad_w) = gauss_legendre(npt, 0.0, 1.0);
        let natlev = (0.5 * expnt.log2()).floor() as Level + 1;
        Self {
            k,
            npt,
            coeff,
            expnt,
            natlev,
            quad_x,
            quad_w,
        }
    }

    pub fn coeff(&self) -> Q {
        self.coeff
    }

    pub fn expnt(&self) -> f64 {
        self.expnt
    }
}

impl<Q: ConvScalar> ConvolutionKernel<Q> for GaussianKernel1D<Q> {
    /// Projection onto the double-order scaling functions of box (n, l):
    ///
    ///   v[p] = coeff * (1/sqrt 2)^n * int exp(-beta x^2) phi~_p(x - l) dx
    ///
    /// over x in [l, l+1], with beta = expnt * 4^-n. Negative translations
    /// fold onto positive ones through phi~_p(1 - z) = (-1)^p phi~_p(z).
    fn rnlp(&self, n: Level, l: Translation) -> Array1<Q> {
        let twok = 2 * self.k;
        let mut v = vec![Q::zero(); twok];

        let lkeep = l;
        let lx = if l < 0 { -l - 1 } else { l };

        // Rescale onto level n so the integration range is [l, l+1].
        let scaledcoeff = self.coeff * Q::from_real(0.5_f64.sqrt().powi(n));
        let beta = self.expnt * 0.25_f64.powi(n);

        // Subdivide into boxes of width ~ 1/sqrt(beta): the Gaussian decays
        // by e^-49 ~ 5e-22 within seven such boxes, so at most seven matter.
        let h = 1.0 / beta.sqrt();
        let nbox = ((1.0 / h) as i64).max(1);
        let h = 1.0 / nbox as f64;

        // Boxes whose left edge already satisfies beta * x^2 > argmax
        // contribute below 1e-22, as do all later ones.
        let argmax = (1e-22 / (scaledcoeff.modulus() * h)).ln().abs();

        let mut phix = [0.0_f64; 2 * MAX_ORDER];
        for b in 0..nbox {
            let xlo = b as f64 * h + lx as f64;
            if beta * xlo * xlo > argmax {
                break;
            }
            for i in 0..self.npt {
                let xx = xlo + h * self.quad_x[i];
                let ee = scaledcoeff
                    * Q::from_real((-beta * xx * xx).exp() * self.quad_w[i] * h);
                legendre_scaling_functions(xx - lx as f64, &mut phix[..twok]);
                for p in 0..twok {
                    v[p] = v[p] + ee * Q::from_real(phix[p]);
                }
            }
        }

        if lkeep < 0 {
            for p in (1..twok).step_by(2) {
                v[p] = -v[p];
            }
        }

        Array1::from(v)
    }

    /// A block is negligible once the Gaussian has decayed below about
    /// 5e-22 over the whole gap between the boxes.
    fn issmall(&self, n: Level, l: Translation) -> bool {
        let beta = self.expnt * 0.25_f64.powi(n);
        let ll = (if l > 0 { l - 1 } else if l < 0 { -1 - l } else { 0 }) as f64;
        beta * ll * ll > 49.0
    }

    fn natural_level(&self) -> Level {
        self.natlev
    }
}
