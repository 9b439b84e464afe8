//! Legendre scaling function evaluation
//!
//! The multiwavelet basis on a unit box is built from the first k Legendre
//! scaling functions phi_p(x) = sqrt(2p+1) * P_p(2x - 1) on [0, 1], which
//! are orthonormal. Kernel projections use the double-order family (the
//! first 2k functions of the same sequence).

use twofloat::TwoFloat;

/// Evaluate the first `out.len()` Legendre scaling functions at `x`.
///
/// `x` is expected in [0, 1]; the recurrence itself is valid everywhere.
pub fn legendre_scaling_functions(x: f64, out: &mut [f64]) {
    let n = out.len();
    if n == 0 {
        return;
    }
    let t = 2.0 * x - 1.0;
    let mut p0 = 1.0;
    let mut p1 = t;
    out[0] = 1.0;
    if n > 1 {
        out[1] = 3.0_f64.sqrt() * p1;
    }
    for p in 2..n {
        let pf = p as f64;
        let p2 = ((2.0 * pf - 1.0) * t * p1 - (pf - 1.0) * p0) / pf;
        out[p] = (2.0 * pf + 1.0).sqrt() * p2;
        p0 = p1;
        p1 = p2;
    }
}

/// TwoFloat variant of [`legendre_scaling_functions`], used by the filter
/// generation pipeline.
pub(crate) fn legendre_scaling_functions_twofloat(x: TwoFloat, out: &mut [TwoFloat]) {
    let n = out.len();
    if n == 0 {
        return;
    }
    let t = TwoFloat::from(2.0) * x - TwoFloat::from(1.0);
    let mut p0 = TwoFloat::from(1.0);
    let mut p1 = t;
    out[0] = TwoFloat::from(1.0);
    if n > 1 {
        out[1] = TwoFloat::from(3.0).sqrt() * p1;
    }
    for p in 2..n {
        let a = TwoFloat::from(2.0 * p as f64 - 1.0);
        let b = TwoFloat::from(p as f64 - 1.0);
        let c = TwoFloat::from(p as f64);
        let p2 = (a * t * p1 - b * p0) / c;
        out[p] = TwoFloat::from(2.0 * p as f64 + 1.0).sqrt() * p2;
        p0 = p1;
        p1 = p2;
    }
}
