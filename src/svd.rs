//! Thin SVD wrapper
//!
//! Bridges the ndarray blocks used throughout the engine to nalgebra's SVD.
//! Singular values come back re-sorted in descending order with a stable,
//! deterministic permutation so repeated factorizations of the same block
//! are identical.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use thiserror::Error;

use crate::numeric::ConvScalar;

#[derive(Debug, Error)]
pub enum SvdError {
    #[error("singular value decomposition did not converge for a {rows}x{cols} block")]
    NonConvergence { rows: usize, cols: usize },
}

/// Thin SVD factors `M = U * diag(s) * Vt`.
#[derive(Debug, Clone)]
pub struct SvdFactors<Q: ConvScalar> {
    pub u: Array2<Q>,
    pub s: Array1<f64>,
    pub vt: Array2<Q>,
}

/// Factorize a dense block. `s` is non-increasing.
pub fn svd_factor<Q: ConvScalar>(m: &Array2<Q>) -> Result<SvdFactors<Q>, SvdError> {
    let (nr, nc) = m.dim();
    let rank = nr.min(nc);
    let dm = DMatrix::from_fn(nr, nc, |i, j| m[[i, j]]);
    let svd = dm
        .try_svd(true, true, f64::EPSILON, 0)
        .ok_or(SvdError::NonConvergence { rows: nr, cols: nc })?;
    let u = svd.u.ok_or(SvdError::NonConvergence { rows: nr, cols: nc })?;
    let vt = svd
        .v_t
        .ok_or(SvdError::NonConvergence { rows: nr, cols: nc })?;
    let sv = svd.singular_values;

    let mut order: Vec<usize> = (0..rank).collect();
    order.sort_by(|&a, &b| sv[b].partial_cmp(&sv[a]).unwrap_or(std::cmp::Ordering::Equal));

    let u_arr = Array2::from_shape_fn((nr, rank), |(i, r)| u[(i, order[r])]);
    let vt_arr = Array2::from_shape_fn((rank, nc), |(r, j)| vt[(order[r], j)]);
    let s_arr = Array1::from_iter(order.iter().map(|&r| sv[r]));
    Ok(SvdFactors {
        u: u_arr,
        s: s_arr,
        vt: vt_arr,
    })
}
