//! The 1-D convolution operator engine
//!
//! [`Convolution1D`] precomputes and caches the action of a
//! translation-invariant kernel on the multiwavelet basis, in the
//! nonstandard form required by the surrounding multiresolution analysis.
//! The kernel itself enters through the [`ConvolutionKernel`] capability:
//! a direct projection `rnlp`, a pruning predicate `issmall`, and the
//! natural level at which direct quadrature takes over from two-scale
//! recursion. The engine owns the shared filters and the three caches.
//!
//! All public operations are pure functions of their (level, translation)
//! key; the only side effect is cache population. Returned handles point at
//! cached tensors and must be copied before mutation.

use std::sync::Arc;

use ndarray::{Array1, Array2};
use num_traits::Zero;

use crate::autocorr::autoc;
use crate::block::BlockApprox;
use crate::cache::SimpleCache;
use crate::numeric::ConvScalar;
use crate::transform::{copy_2d_patch, fast_transpose, transform, transform_vec};
use crate::twoscale::two_scale_hg;

/// Refinement depth; box width is 2^-n.
pub type Level = i32;
/// Signed box index at a level.
pub type Translation = i64;

/// Level at which kernels without a better estimate switch from recursion to
/// direct quadrature.
pub const DEFAULT_NATURAL_LEVEL: Level = 13;

/// Largest supported scaling function order.
pub const MAX_ORDER: usize = 30;

/// Kernel capability consumed by the engine.
///
/// Implementations must be deterministic: the engine assumes that two
/// evaluations at the same key produce the same value, and caches freely.
pub trait ConvolutionKernel<Q: ConvScalar> {
    /// Projection of the kernel onto the 2k double-order scaling functions
    /// of box (n, l):
    ///
    ///   v[p] = (1/sqrt 2)^n * int K(2^-n (z + l)) phi~_p(z) dz,  z in [0, 1].
    fn rnlp(&self, n: Level, l: Translation) -> Array1<Q>;

    /// True if the block at (n, l) is expected to be negligible.
    fn issmall(&self, n: Level, l: Translation) -> bool;

    /// Level at which direct quadrature becomes preferable to refinement.
    fn natural_level(&self) -> Level {
        DEFAULT_NATURAL_LEVEL
    }
}

/// Multilevel convolution operator over a kernel capability.
///
/// Generic over the element type `Q` (real or complex) and the kernel `K`.
/// The operator handle is externally immutable; caches use interior
/// mutability and may be shared across threads behind an `Arc`.
pub struct Convolution1D<Q: ConvScalar, K: ConvolutionKernel<Q>> {
    k: usize,
    kernel: K,
    /// Autocorrelation projector, (k*k) x 4k.
    c: Array2<Q>,
    /// Transposed two-scale filter at order k, 2k x 2k.
    hgt: Array2<Q>,
    /// Transposed two-scale filter at order 2k, 4k x 4k.
    hgt2k: Array2<Q>,
    rnlp_cache: SimpleCache<Array1<Q>>,
    rnlij_cache: SimpleCache<Array2<Q>>,
    ns_cache: SimpleCache<BlockApprox<Q>>,
}

impl<Q: ConvScalar, K: ConvolutionKernel<Q>> Convolution1D<Q, K> {
    /// Build the operator for scaling function order `k`.
    ///
    /// # Panics
    /// Panics if `k` is outside `1..=MAX_ORDER` or if filter generation
    /// fails for the requested order.
    pub fn new(k: usize, kernel: K) -> Self {
        assert!(
            (1..=MAX_ORDER).contains(&k),
            "scaling function order must be in 1..={}, got {}",
            MAX_ORDER,
            k
        );

        let c = autoc(k)
            .unwrap_or_else(|e| panic!("autocorrelation coefficients unavailable for k={}: {}", k, e));
        let hg = two_scale_hg(k)
            .unwrap_or_else(|e| panic!("two-scale filter unavailable for k={}: {}", k, e));
        let hg2k = two_scale_hg(2 * k)
            .unwrap_or_else(|e| panic!("two-scale filter unavailable for k={}: {}", 2 * k, e));

        log::debug!("convolution operator ready: k={}, natural level {}", k, kernel.natural_level());

        Self {
            k,
            kernel,
            c: c.mapv(Q::from_real),
            hgt: hg.t().mapv(Q::from_real),
            hgt2k: hg2k.t().mapv(Q::from_real),
            rnlp_cache: SimpleCache::new(),
            rnlij_cache: SimpleCache::new(),
            ns_cache: SimpleCache::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Level at which the kernel integrates directly.
    pub fn natural_level(&self) -> Level {
        self.kernel.natural_level()
    }

    /// Pruning predicate, forwarded from the kernel.
    pub fn issmall(&self, n: Level, l: Translation) -> bool {
        self.kernel.issmall(n, l)
    }

    /// Cached projection of the kernel onto the double-order scaling
    /// functions of box (n, l), length 2k.
    ///
    /// Below the natural level the value is refined from the two child
    /// boxes through the order-2k two-scale filter; at and above it the
    /// kernel integrates directly. Screened-out keys hold the zero vector.
    pub fn get_rnlp(&self, n: Level, l: Translation) -> Arc<Array1<Q>> {
        if let Some(r) = self.rnlp_cache.get(n, l) {
            return r;
        }

        let twok = 2 * self.k;
        let r = if self.kernel.issmall(n, l) {
            Array1::zeros(twok)
        } else if n < self.kernel.natural_level() {
            let fine0 = self.get_rnlp(n + 1, 2 * l);
            let fine1 = self.get_rnlp(n + 1, 2 * l + 1);
            let mut r4 = Vec::with_capacity(2 * twok);
            r4.extend_from_slice(as_slice1(&fine0));
            r4.extend_from_slice(as_slice1(&fine1));
            let lifted = transform_vec(&Array1::from(r4), &self.hgt2k);
            Array1::from_iter(lifted.iter().take(twok).copied())
        } else {
            self.kernel.rnlp(n, l)
        };

        self.rnlp_cache.set(n, l, r)
    }

    /// Cached k x k correlation block
    ///
    ///   r(i, j) = int K(x - y) phi_i^{n,l}(x) phi_j^{n,0}(y) dx dy,
    ///
    /// computed by contracting the autocorrelation projector with the
    /// kernel projections at translations l-1 and l.
    pub fn rnlij(&self, n: Level, l: Translation) -> Arc<Array2<Q>> {
        if let Some(r) = self.rnlij_cache.get(n, l) {
            return r;
        }

        let k = self.k;
        let twok = 2 * k;
        let pm = self.get_rnlp(n, l - 1);
        let pp = self.get_rnlp(n, l);
        let mut r4 = Vec::with_capacity(2 * twok);
        r4.extend_from_slice(as_slice1(&pm));
        r4.extend_from_slice(as_slice1(&pp));
        let scale = Q::from_real(0.5_f64.powf(0.5 * n as f64));
        for q in r4.iter_mut() {
            *q = *q * scale;
        }

        let rij = self.c.dot(&Array1::from(r4));
        let rij = Array2::from_shape_vec((k, k), rij.to_vec()).expect("k*k contraction");
        // No symmetrization is applied at l == 0; the correct treatment for
        // complex elements is unresolved.
        self.rnlij_cache.set(n, l, rij)
    }

    /// Cached nonstandard-form block for (n, l), with SVD factors and norms.
    ///
    /// Assembled from the three scale-(n+1) correlation blocks laid out by
    /// quadrants and lifted through the two-scale filter on both sides; the
    /// result is transposed into the orientation the application loop
    /// expects. Screened-out keys hold the empty sentinel.
    pub fn nonstandard(&self, n: Level, l: Translation) -> Arc<BlockApprox<Q>> {
        if let Some(b) = self.ns_cache.get(n, l) {
            return b;
        }

        let k = self.k;
        let twok = 2 * k;
        let data = if self.kernel.issmall(n, l) {
            BlockApprox::empty()
        } else {
            log::trace!("assembling nonstandard block at n={}, l={}", n, l);
            let r0 = self.rnlij(n + 1, 2 * l);
            let rp = self.rnlij(n + 1, 2 * l + 1);
            let rm = self.rnlij(n + 1, 2 * l - 1);

            let mut rbuf = vec![Q::zero(); twok * twok];
            copy_2d_patch(&mut rbuf, twok, as_slice2(&r0), k, k, k);
            copy_2d_patch(&mut rbuf[twok * k + k..], twok, as_slice2(&r0), k, k, k);
            copy_2d_patch(&mut rbuf[twok * k..], twok, as_slice2(&rp), k, k, k);
            copy_2d_patch(&mut rbuf[k..], twok, as_slice2(&rm), k, k, k);
            let assembled =
                Array2::from_shape_vec((twok, twok), rbuf).expect("quadrant assembly");

            let lifted = transform(&assembled, &self.hgt);

            // Column-major orientation for the application loop.
            let mut tbuf = vec![Q::zero(); twok * twok];
            fast_transpose(twok, twok, as_slice2(&lifted), &mut tbuf);
            let r = Array2::from_shape_vec((twok, twok), tbuf).expect("transpose");

            let mut sub = vec![Q::zero(); k * k];
            copy_2d_patch(&mut sub, k, as_slice2(&r), twok, k, k);
            let t = Array2::from_shape_vec((k, k), sub).expect("scaling sub-block");

            BlockApprox::new(r, t)
        };

        self.ns_cache.set(n, l, data)
    }
}

/// Cached tensors are always standard-layout; expose the backing slice.
fn as_slice1<Q: ConvScalar>(a: &Array1<Q>) -> &[Q] {
    a.as_slice().expect("standard layout")
}

fn as_slice2<Q: ConvScalar>(a: &Array2<Q>) -> &[Q] {
    a.as_slice().expect("standard layout")
}
