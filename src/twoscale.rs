//! Two-scale filter generation for the Legendre multiwavelet family
//!
//! The filter hg is the 2k x 2k orthogonal matrix relating the order-k basis
//! on a box to the order-k bases on its two children:
//!
//!   phi_i(x) = sum_j ( hg[i][j]   * sqrt(2) phi_j(2x)
//!            +         hg[i][k+j] * sqrt(2) phi_j(2x-1) )   for i < k,
//!   psi_i(x) = same expansion with rows k..2k                for the wavelets.
//!
//! The scaling rows are exact refinement coefficients, computed by Gauss
//! quadrature of polynomial integrands. The wavelet rows are the Alpert
//! completion: project the double-order scaling functions phi_k..phi_{2k-1}
//! onto the child space and orthonormalize against everything built so far,
//! which gives wavelet i the usual k+i vanishing moments. All arithmetic
//! runs in TwoFloat so the rounded f64 filter is orthogonal to well below
//! f64 round-off; the engine's multilevel recursion is sensitive to this.

use ndarray::Array2;
use thiserror::Error;
use twofloat::TwoFloat;

use crate::gauss::gauss_legendre_twofloat;
use crate::legendre::legendre_scaling_functions_twofloat;

/// Largest filter order the generator supports. The engine uses orders up to
/// twice its scaling order, so this bounds the operator order at half of it.
pub const MAX_TWOSCALE_ORDER: usize = 64;

#[derive(Debug, Error)]
pub enum TwoScaleError {
    #[error("two-scale filter order {0} outside supported range 1..={MAX_TWOSCALE_ORDER}")]
    UnsupportedOrder(usize),
    #[error("wavelet completion degenerated at row {row} (residual norm {residual:.3e})")]
    DegenerateCompletion { row: usize, residual: f64 },
}

/// Generate the 2k x 2k two-scale filter for order k.
///
/// Rows 0..k are the scaling function refinement coefficients, rows k..2k
/// the wavelet coefficients. The matrix is orthogonal.
pub fn two_scale_hg(k: usize) -> Result<Array2<f64>, TwoScaleError> {
    if k < 1 || k > MAX_TWOSCALE_ORDER {
        return Err(TwoScaleError::UnsupportedOrder(k));
    }
    let twok = 2 * k;

    // Candidate rows in child-space coordinates. Row i < twok holds the
    // coordinates of phi_i (order-2k family) against the orthonormal child
    // basis { sqrt(2) phi_j(2x) , sqrt(2) phi_j(2x-1) }, j < k:
    //
    //   a[i][j]   = (1/sqrt2) int phi_i(y/2)     phi_j(y) dy
    //   a[i][k+j] = (1/sqrt2) int phi_i((y+1)/2) phi_j(y) dy
    //
    // Integrands are polynomials of degree < 3k, exact for a 2k-point rule.
    let npt = twok;
    let (x, w) = gauss_legendre_twofloat(npt);

    let zero = TwoFloat::from(0.0);
    let half = TwoFloat::from(0.5);
    let one = TwoFloat::from(1.0);
    let inv_sqrt2 = half.sqrt();

    let mut a = vec![vec![zero; twok]; twok];
    let mut phi_y = vec![zero; k];
    let mut phi_left = vec![zero; twok];
    let mut phi_right = vec![zero; twok];
    for q in 0..npt {
        let y = x[q];
        legendre_scaling_functions_twofloat(y, &mut phi_y);
        legendre_scaling_functions_twofloat(y * half, &mut phi_left);
        legendre_scaling_functions_twofloat((y + one) * half, &mut phi_right);
        for i in 0..twok {
            let wl = w[q] * phi_left[i] * inv_sqrt2;
            let wr = w[q] * phi_right[i] * inv_sqrt2;
            for j in 0..k {
                a[i][j] = a[i][j] + wl * phi_y[j];
                a[i][k + j] = a[i][k + j] + wr * phi_y[j];
            }
        }
    }

    // Rows 0..k are exact refinement coefficients of an orthonormal family
    // and are left untouched. Rows k..2k are orthonormalized against all
    // earlier rows; a second Gram-Schmidt pass keeps the loss of
    // orthogonality at the level of the TwoFloat round-off.
    for m in k..twok {
        for _pass in 0..2 {
            for r in 0..m {
                let mut dot = zero;
                for j in 0..twok {
                    dot = dot + a[m][j] * a[r][j];
                }
                for j in 0..twok {
                    a[m][j] = a[m][j] - dot * a[r][j];
                }
            }
        }
        let mut norm2 = zero;
        for j in 0..twok {
            norm2 = norm2 + a[m][j] * a[m][j];
        }
        let norm = norm2.sqrt();
        if f64::from(norm) < 1e-10 {
            return Err(TwoScaleError::DegenerateCompletion {
                row: m,
                residual: f64::from(norm),
            });
        }
        for j in 0..twok {
            a[m][j] = a[m][j] / norm;
        }
    }

    let mut hg = Array2::zeros((twok, twok));
    for i in 0..twok {
        for j in 0..twok {
            hg[[i, j]] = f64::from(a[i][j]);
        }
    }
    Ok(hg)
}
