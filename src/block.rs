//! Cached nonstandard-form block with its low-rank factors
//!
//! A [`BlockApprox`] bundles one assembled 2k x 2k block `r`, its k x k
//! scaling sub-block `t` (the top-left quadrant of `r`), thin SVD factors of
//! both, and the norms the application layer screens against.
//!
//! The stored singular value arrays are NOT ordinary singular values: after
//! factorization they are transformed into normalized suffix sums,
//!
//!   s[i] = (sigma_i + sigma_{i+1} + ... + sigma_{n-1}) / (sigma_0 + ... + sigma_{n-1}),
//!
//! a relative-remaining-mass profile that starts at 1 and decays. A consumer
//! picks an application rank as the smallest `i` with `s[i] < rel_tol`,
//! without re-summing tails. The right factors `rvt`/`tvt` are pre-scaled by
//! the raw singular values, so `u * vt` reconstructs the block directly.

use ndarray::{Array1, Array2};

use crate::numeric::{normf, ConvScalar};
use crate::svd::svd_factor;

/// Blocks whose Frobenius norm is at or below this are stored as the empty
/// sentinel: every tensor field empty, every norm zero.
pub const EMPTY_BLOCK_FROBENIUS_THRESHOLD: f64 = 1e-20;

/// Note that if `rnormf` is zero then *all* of the tensors are empty.
#[derive(Debug, Clone)]
pub struct BlockApprox<Q: ConvScalar> {
    /// Full nonstandard-form block, 2k x 2k.
    pub r: Array2<Q>,
    /// Scaling-scaling sub-block, k x k; equals `r[0..k, 0..k]`.
    pub t: Array2<Q>,
    /// SVD factors of `r` (right factor pre-scaled by the singular values).
    pub ru: Array2<Q>,
    pub rvt: Array2<Q>,
    /// SVD factors of `t`.
    pub tu: Array2<Q>,
    pub tvt: Array2<Q>,
    /// Normalized suffix-sum profiles of the singular values (see module
    /// docs); `rs[0] == 1` whenever the block is non-empty.
    pub rs: Array1<f64>,
    pub ts: Array1<f64>,
    /// Operator norms (total singular value mass before normalization).
    pub rnorm: f64,
    pub tnorm: f64,
    /// Frobenius norms.
    pub rnormf: f64,
    pub tnormf: f64,
    /// Frobenius norm of `r` with the k x k scaling quadrant zeroed.
    pub nsnormf: f64,
}

impl<Q: ConvScalar> BlockApprox<Q> {
    /// Build the approximation bundle from an assembled block and its
    /// scaling sub-block.
    ///
    /// Computing the factors is expensive, so it is skipped for blocks that
    /// fall below [`EMPTY_BLOCK_FROBENIUS_THRESHOLD`]; those come back as
    /// the empty sentinel.
    ///
    /// # Panics
    /// Panics if the SVD fails to converge, which for the well-conditioned
    /// blocks produced by the engine indicates a broken kernel.
    pub fn new(r: Array2<Q>, t: Array2<Q>) -> Self {
        let rnormf = normf(&r);
        if rnormf <= EMPTY_BLOCK_FROBENIUS_THRESHOLD {
            return Self {
                r,
                t,
                ru: Array2::zeros((0, 0)),
                rvt: Array2::zeros((0, 0)),
                tu: Array2::zeros((0, 0)),
                tvt: Array2::zeros((0, 0)),
                rs: Array1::zeros(0),
                ts: Array1::zeros(0),
                rnorm: 0.0,
                tnorm: 0.0,
                rnormf: 0.0,
                tnormf: 0.0,
                nsnormf: 0.0,
            };
        }

        let tnormf = normf(&t);
        let (tu, ts, tvt, tnorm) = make_approx(&t);
        let (ru, rs, rvt, rnorm) = make_approx(&r);

        // Frobenius norm of r with the scaling-scaling quadrant zeroed out.
        let k = t.nrows();
        let mut ns2 = 0.0;
        for ((i, j), q) in r.indexed_iter() {
            if i >= k || j >= k {
                ns2 += q.modulus_squared();
            }
        }
        let nsnormf = ns2.sqrt();

        Self {
            r,
            t,
            ru,
            rvt,
            tu,
            tvt,
            rs,
            ts,
            rnorm,
            tnorm,
            rnormf,
            tnormf,
            nsnormf,
        }
    }

    /// The empty sentinel installed for screened-out (n, l) keys.
    pub(crate) fn empty() -> Self {
        Self::new(Array2::zeros((0, 0)), Array2::zeros((0, 0)))
    }

    pub fn is_empty(&self) -> bool {
        self.rnormf == 0.0
    }

    /// Smallest rank whose remaining relative mass in the full block falls
    /// below `rel_tol`. Empty blocks report rank 0.
    pub fn rank_for(&self, rel_tol: f64) -> usize {
        self.rs
            .iter()
            .position(|&s| s < rel_tol)
            .unwrap_or(self.rs.len())
    }
}

/// Factorize `m`, pre-scale the right factor, and convert the singular
/// values into the normalized suffix-sum profile. Returns
/// (u, profile, scaled vt, total mass).
fn make_approx<Q: ConvScalar>(m: &Array2<Q>) -> (Array2<Q>, Array1<f64>, Array2<Q>, f64) {
    let n = m.nrows();
    let factors = svd_factor(m).unwrap_or_else(|e| panic!("block factorization failed: {}", e));
    let u = factors.u;
    let mut s = factors.s;
    let mut vt = factors.vt;

    for i in 0..n {
        let si = Q::from_real(s[i]);
        for j in 0..n {
            vt[[i, j]] = vt[[i, j]] * si;
        }
    }

    for i in (0..n.saturating_sub(1)).rev() {
        s[i] += s[i + 1];
    }
    let norm = s[0];
    if norm > 0.0 {
        let inv = 1.0 / norm;
        s.mapv_inplace(|v| v * inv);
    }
    (u, s, vt, norm)
}
