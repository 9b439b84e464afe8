//! Autocorrelation projection coefficients
//!
//! The correlation block between two scaling-function boxes separated by l
//! reduces to kernel projections on the double-order Legendre family via the
//! cross-correlation functions
//!
//!   Phi_ij(t) = int phi_i(v + t) phi_j(v) dv ,   t in [-1, 1],
//!
//! which are piecewise polynomials of degree < 2k on [-1, 0] and [0, 1] and
//! therefore expand exactly in the double-order basis. `autoc` returns those
//! expansion coefficients as a (k*k) x 4k matrix: row i*k + j holds
//! <Phi_ij(.-1), phi~_p> in columns 0..2k (pairing with the projection at
//! translation l-1) and <Phi_ij, phi~_p> in columns 2k..4k (pairing with the
//! projection at translation l).
//!
//! The orientation binds the row index of the correlation block to the box
//! at translation l and the column index to the box at 0; this is what makes
//! the nonstandard-form quadrant layout in the engine come out right.

use ndarray::Array2;
use thiserror::Error;

use crate::gauss::gauss_legendre;
use crate::legendre::legendre_scaling_functions;
use crate::twoscale::MAX_TWOSCALE_ORDER;

#[derive(Debug, Error)]
pub enum AutocorrError {
    #[error("autocorrelation order {0} outside supported range 1..={}", MAX_TWOSCALE_ORDER / 2)]
    UnsupportedOrder(usize),
}

/// Cross-correlation matrix Phi_ij(t) for a fixed offset t, integrated over
/// `v` in [lo, hi] with a reseated copy of the supplied rule. The result is
/// a dense k x k row-major buffer.
fn cross_correlation(
    k: usize,
    t: f64,
    lo: f64,
    hi: f64,
    ux: &[f64],
    uw: &[f64],
    phi_a: &mut [f64],
    phi_b: &mut [f64],
    out: &mut [f64],
) {
    out.iter_mut().for_each(|o| *o = 0.0);
    let len = hi - lo;
    if len <= 0.0 {
        return;
    }
    for r in 0..ux.len() {
        let v = lo + len * ux[r];
        let wr = uw[r] * len;
        legendre_scaling_functions(v + t, phi_a);
        legendre_scaling_functions(v, phi_b);
        for i in 0..k {
            let wa = wr * phi_a[i];
            for j in 0..k {
                out[i * k + j] += wa * phi_b[j];
            }
        }
    }
}

/// Generate the autocorrelation projection matrix for order k.
///
/// Shape (k*k, 4k); see the module docs for the column convention.
pub fn autoc(k: usize) -> Result<Array2<f64>, AutocorrError> {
    if k < 1 || 2 * k > MAX_TWOSCALE_ORDER {
        return Err(AutocorrError::UnsupportedOrder(k));
    }
    let twok = 2 * k;

    // Outer integrand: Phi_ij (degree < 2k in t on each unit interval) times
    // phi~_p (degree < 2k), so 2k points are exact. The inner correlation
    // integrand has degree < 2k - 1, so k points are exact.
    let (zx, zw) = gauss_legendre(twok, 0.0, 1.0);
    let (ux, uw) = gauss_legendre(k, 0.0, 1.0);
    let ux = ux.to_vec();
    let uw = uw.to_vec();

    let mut c = Array2::zeros((k * k, 2 * twok));
    let mut phit = vec![0.0; twok];
    let mut phi_a = vec![0.0; k];
    let mut phi_b = vec![0.0; k];
    let mut minus = vec![0.0; k * k];
    let mut plus = vec![0.0; k * k];
    for q in 0..zx.len() {
        let z = zx[q];
        legendre_scaling_functions(z, &mut phit);
        // Phi_ij(z - 1): support v in [1-z, 1].
        cross_correlation(k, z - 1.0, 1.0 - z, 1.0, &ux, &uw, &mut phi_a, &mut phi_b, &mut minus);
        // Phi_ij(z): support v in [0, 1-z].
        cross_correlation(k, z, 0.0, 1.0 - z, &ux, &uw, &mut phi_a, &mut phi_b, &mut plus);
        for ij in 0..k * k {
            let wm = zw[q] * minus[ij];
            let wp = zw[q] * plus[ij];
            for p in 0..twok {
                c[[ij, p]] += wm * phit[p];
                c[[ij, twok + p]] += wp * phit[p];
            }
        }
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_order() {
        assert!(autoc(0).is_err());
        assert!(autoc(MAX_TWOSCALE_ORDER / 2 + 1).is_err());
    }

    #[test]
    fn test_parity_between_halves() {
        // Phi_ij(t) = Phi_ji(-t) together with phi~_p(1-z) = (-1)^p phi~_p(z)
        // gives c[j,i][p] == (-1)^p c[i,j][2k+p].
        let k = 4;
        let twok = 2 * k;
        let c = autoc(k).unwrap();
        for i in 0..k {
            for j in 0..k {
                for p in 0..twok {
                    let sign = if p % 2 == 0 { 1.0 } else { -1.0 };
                    let lhs = c[[j * k + i, p]];
                    let rhs = sign * c[[i * k + j, twok + p]];
                    assert!(
                        (lhs - rhs).abs() < 1e-13,
                        "i={} j={} p={}: {} vs {}",
                        i,
                        j,
                        p,
                        lhs,
                        rhs
                    );
                }
            }
        }
    }

    #[test]
    fn test_reconstructs_cross_correlation() {
        // The double-order expansion is exact, so summing it back against
        // phi~_p must reproduce Phi_ij pointwise.
        let k = 3;
        let twok = 2 * k;
        let c = autoc(k).unwrap();
        let (ux, uw) = gauss_legendre(k, 0.0, 1.0);
        let ux = ux.to_vec();
        let uw = uw.to_vec();
        let mut phi_a = vec![0.0; k];
        let mut phi_b = vec![0.0; k];
        let mut direct = vec![0.0; k * k];
        let mut phit = vec![0.0; twok];
        for &z in &[0.15, 0.5, 0.85] {
            cross_correlation(k, z, 0.0, 1.0 - z, &ux, &uw, &mut phi_a, &mut phi_b, &mut direct);
            legendre_scaling_functions(z, &mut phit);
            for i in 0..k {
                for j in 0..k {
                    let recon: f64 = (0..twok)
                        .map(|p| c[[i * k + j, twok + p]] * phit[p])
                        .sum();
                    assert!(
                        (recon - direct[i * k + j]).abs() < 1e-13,
                        "z={} i={} j={}: {} vs {}",
                        z,
                        i,
                        j,
                        recon,
                        direct[i * k + j]
                    );
                }
            }
        }
    }

    #[test]
    fn test_zeroth_row_total_mass() {
        // Phi_00(t) = 1 - |t|, so the p = 0 coefficients on each side are
        // int (1-|t|) dt over a unit interval = 1/2.
        let k = 2;
        let twok = 2 * k;
        let c = autoc(k).unwrap();
        assert!((c[[0, 0]] - 0.5).abs() < 1e-14);
        assert!((c[[0, twok]] - 0.5).abs() < 1e-14);
    }
}
