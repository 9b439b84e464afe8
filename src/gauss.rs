//! Gauss-Legendre quadrature rule generation
//!
//! Nodes and weights are found by Newton iteration on the Legendre
//! polynomial recurrence, starting from Chebyshev initial guesses. An
//! extended-precision (`TwoFloat`) variant refines the f64 nodes further;
//! it feeds the two-scale filter generation, where the downstream
//! Gram-Schmidt completion is sensitive to quadrature error.

use ndarray::Array1;
use twofloat::TwoFloat;

/// Gauss-Legendre nodes and weights on the interval [a, b].
///
/// # Panics
/// Panics if `npt` is zero or `a >= b`.
pub fn gauss_legendre(npt: usize, a: f64, b: f64) -> (Array1<f64>, Array1<f64>) {
    assert!(npt > 0, "quadrature rule needs at least one point");
    assert!(a < b, "quadrature interval [{}, {}] is empty", a, b);

    let (x, w) = nodes_weights(npt);
    // Reseat from [-1, 1] onto [a, b].
    let xm = 0.5 * (b + a);
    let xl = 0.5 * (b - a);
    let x = Array1::from_iter(x.iter().map(|&xi| xm + xl * xi));
    let w = Array1::from_iter(w.iter().map(|&wi| xl * wi));
    (x, w)
}

/// Legendre polynomial P_n and its derivative at x, by the three-term
/// recurrence.
fn legendre_polynomial_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p0 = 1.0;
    let mut p1 = x;
    let mut dp0 = 0.0;
    let mut dp1 = 1.0;
    for j in 2..=n {
        let jf = j as f64;
        let p2 = ((2.0 * jf - 1.0) * x * p1 - (jf - 1.0) * p0) / jf;
        let dp2 = ((2.0 * jf - 1.0) * (p1 + x * dp1) - (jf - 1.0) * dp0) / jf;
        p0 = p1;
        p1 = p2;
        dp0 = dp1;
        dp1 = dp2;
    }
    (p1, dp1)
}

fn legendre_polynomial_and_derivative_twofloat(n: usize, x: TwoFloat) -> (TwoFloat, TwoFloat) {
    if n == 0 {
        return (TwoFloat::from(1.0), TwoFloat::from(0.0));
    }
    let mut p0 = TwoFloat::from(1.0);
    let mut p1 = x;
    let mut dp0 = TwoFloat::from(0.0);
    let mut dp1 = TwoFloat::from(1.0);
    for j in 2..=n {
        let a = TwoFloat::from(2.0 * j as f64 - 1.0);
        let b = TwoFloat::from(j as f64 - 1.0);
        let c = TwoFloat::from(j as f64);
        let p2 = (a * x * p1 - b * p0) / c;
        let dp2 = (a * (p1 + x * dp1) - b * dp0) / c;
        p0 = p1;
        p1 = p2;
        dp0 = dp1;
        dp1 = dp2;
    }
    (p1, dp1)
}

/// Nodes and weights on [-1, 1] in f64.
fn nodes_weights(n: usize) -> (Vec<f64>, Vec<f64>) {
    if n == 1 {
        return (vec![0.0], vec![2.0]);
    }
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    let m = (n + 1) / 2;
    for i in 0..m {
        // Chebyshev initial guess, then Newton.
        let mut z = (std::f64::consts::PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p0, p1) = legendre_polynomial_and_derivative(n, z);
            let dz = p0 / p1;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let (_, p1) = legendre_polynomial_and_derivative(n, z);
        let weight = 2.0 / ((1.0 - z * z) * p1 * p1);
        x[i] = -z;
        x[n - 1 - i] = z;
        w[i] = weight;
        w[n - 1 - i] = weight;
    }
    (x, w)
}

/// Nodes and weights on [0, 1] in TwoFloat precision.
///
/// Starts from the converged f64 nodes and applies a few extra Newton steps
/// in double-double arithmetic, then recomputes the weights.
pub(crate) fn gauss_legendre_twofloat(n: usize) -> (Vec<TwoFloat>, Vec<TwoFloat>) {
    assert!(n > 0, "quadrature rule needs at least one point");
    let (x64, _) = nodes_weights(n);

    let one = TwoFloat::from(1.0);
    let half = TwoFloat::from(0.5);
    let mut x = Vec::with_capacity(n);
    let mut w = Vec::with_capacity(n);
    for &xi in &x64 {
        let mut z = TwoFloat::from(xi);
        for _ in 0..3 {
            let (p0, p1) = legendre_polynomial_and_derivative_twofloat(n, z);
            z = z - p0 / p1;
        }
        let (_, p1) = legendre_polynomial_and_derivative_twofloat(n, z);
        let weight = TwoFloat::from(2.0) / ((one - z * z) * p1 * p1);
        // Reseat onto [0, 1].
        x.push((z + one) * half);
        w.push(weight * half);
    }
    (x, w)
}
