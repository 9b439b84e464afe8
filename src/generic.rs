//! Generic kernel over an arbitrary functor
//!
//! Brute-force (adaptive quadrature) projections for kernels without a
//! closed form. The functor is evaluated in *simulation* coordinates. At
//! construction the kernel probes outward at its natural level until
//! several consecutive boxes on both sides are zero, which fixes the
//! operator's support radius for the pruning predicate.

use std::marker::PhantomData;

use ndarray::Array1;

use crate::adquad::adq1;
use crate::gauss::gauss_legendre;
use crate::legendre::legendre_scaling_functions;
use crate::numeric::{normf, ConvScalar};
use crate::operator::{ConvolutionKernel, Level, Translation, MAX_ORDER};

/// Quadrature seed order for the adaptive integrator.
const NPT: usize = 20;

/// Projections below this norm count as zero during the support probe.
const PROBE_ZERO_NORM: f64 = 1e-12;

/// Consecutive zero boxes required before the support radius is declared.
const PROBE_ZERO_RUN: usize = 3;

/// Tolerance handed to the adaptive integrator.
const RNLP_TOL: f64 = 1e-12;

/// 1-D convolution kernel over a caller-supplied functor.
pub struct GenericKernel1D<Q: ConvScalar, F: Fn(f64) -> Q> {
    k: usize,
    op: F,
    /// Translation beyond which the operator is zero at the natural level.
    maxl: Translation,
    quad_x: Vec<f64>,
    quad_w: Vec<f64>,
    _q: PhantomData<Q>,
}

impl<Q: ConvScalar, F: Fn(f64) -> Q> GenericKernel1D<Q, F> {
    /// Wrap `op`, probing its support at the natural level.
    ///
    /// # Panics
    /// Panics unless `k` is in `1..=MAX_ORDER`, or if the adaptive
    /// quadrature fails on the functor.
    pub fn new(k: usize, op: F) -> Self {
        assert!(
            (1..=MAX_ORDER).contains(&k),
            "scaling function order must be in 1..={}, got {}",
            MAX_ORDER,
            k
        );
        let (quad_x, quad_w) = gauss_legendre(NPT, 0.0, 1.0);
        let mut kern = Self {
            k,
            op,
            maxl: Translation::MAX - 1,
            quad_x: quad_x.to_vec(),
            quad_w: quad_w.to_vec(),
            _q: PhantomData,
        };

        // Walk outward at the natural level, tracking +l and -l in
        // parallel, until several consecutive boxes are zero on both
        // sides. That translation bounds the support of the operator.
        let natl = kern.natural_level();
        let mut nzero = 0;
        for lx in 0..(1_i64 << natl) {
            let rp = kern.rnlp(natl, lx);
            let rm = kern.rnlp(natl, -lx);
            if normf(&rp) < PROBE_ZERO_NORM && normf(&rm) < PROBE_ZERO_NORM {
                nzero += 1;
            } else {
                nzero = 0;
            }
            if nzero == PROBE_ZERO_RUN {
                kern.maxl = lx - 2;
                break;
            }
        }
        log::debug!(
            "generic kernel support probe: k={}, maxl={}",
            k,
            kern.maxl
        );
        kern
    }

    pub fn maxl(&self) -> Translation {
        self.maxl
    }
}

impl<Q: ConvScalar, F: Fn(f64) -> Q> ConvolutionKernel<Q> for GenericKernel1D<Q, F> {
    fn rnlp(&self, n: Level, l: Translation) -> Array1<Q> {
        let twok = 2 * self.k;
        let fac = 0.5_f64.powi(n);
        let sqrtfac = fac.sqrt();
        let lf = l as f64;
        let integrand = |x: f64| {
            let mut phix = [0.0_f64; 2 * MAX_ORDER];
            legendre_scaling_functions(x - lf, &mut phix[..twok]);
            let f = (self.op)(fac * x) * Q::from_real(sqrtfac);
            Array1::from_iter((0..twok).map(|p| f * Q::from_real(phix[p])))
        };
        adq1(lf, lf + 1.0, &integrand, RNLP_TOL, &self.quad_x, &self.quad_w).unwrap_or_else(
            |e| {
                panic!(
                    "generic kernel projection failed at n={}, l={}: {}",
                    n, l, e
                )
            },
        )
    }

    fn issmall(&self, n: Level, l: Translation) -> bool {
        let mut lx = if l < 0 { 1 - l } else { l };
        // Nearest-neighbor coupling is never pruned: the block assembly
        // looks two levels below, where 0, 1 have become 0..7.
        if lx <= 7 {
            return false;
        }

        // Rescale the translation onto the natural level before comparing
        // with the probed support radius.
        let d = self.natural_level() - n;
        if d >= 0 {
            lx = lx.checked_shl(d as u32).unwrap_or(Translation::MAX);
        } else {
            lx >>= (-d).min(63) as u32;
        }
        lx >= self.maxl
    }
}
