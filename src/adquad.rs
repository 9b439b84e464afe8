//! Recursive adaptive quadrature for vector-valued integrands
//!
//! Used by the generic kernel, whose projections cannot be screened the way
//! a closed-form Gaussian can. The interval estimate is compared against the
//! sum of its two halves; on disagreement both halves recurse with half the
//! tolerance. Smooth integrands terminate within a few bisections.

use ndarray::Array1;
use num_traits::Zero;
use thiserror::Error;

use crate::numeric::{normf, ConvScalar};

/// Bisection depth at which the integrand is declared non-convergent.
const MAX_BISECTIONS: usize = 30;

#[derive(Debug, Error)]
pub enum QuadratureError {
    #[error("adaptive quadrature did not converge on [{lo}, {hi}] after {depth} bisections")]
    NoConvergence { lo: f64, hi: f64, depth: usize },
}

/// Apply the rule (given on [0, 1]) to `f` over [lo, hi].
fn fixed_rule<Q, F>(lo: f64, hi: f64, f: &F, x: &[f64], w: &[f64]) -> Array1<Q>
where
    Q: ConvScalar,
    F: Fn(f64) -> Array1<Q>,
{
    let len = hi - lo;
    let mut acc: Vec<Q> = Vec::new();
    for i in 0..x.len() {
        let v = f(lo + len * x[i]);
        if acc.is_empty() {
            acc = vec![Q::zero(); v.len()];
        }
        let wi = Q::from_real(w[i] * len);
        for (a, q) in acc.iter_mut().zip(v.iter()) {
            *a = *a + *q * wi;
        }
    }
    Array1::from(acc)
}

fn split<Q, F>(
    lo: f64,
    hi: f64,
    whole: &Array1<Q>,
    f: &F,
    tol: f64,
    x: &[f64],
    w: &[f64],
    depth: usize,
) -> Result<Array1<Q>, QuadratureError>
where
    Q: ConvScalar,
    F: Fn(f64) -> Array1<Q>,
{
    let mid = 0.5 * (lo + hi);
    let left = fixed_rule(lo, mid, f, x, w);
    let right = fixed_rule(mid, hi, f, x, w);
    let sum = &left + &right;
    let err = normf(&(&sum - whole));
    if err <= tol {
        return Ok(sum);
    }
    if depth >= MAX_BISECTIONS {
        return Err(QuadratureError::NoConvergence { lo, hi, depth });
    }
    let l = split(lo, mid, &left, f, 0.5 * tol, x, w, depth + 1)?;
    let r = split(mid, hi, &right, f, 0.5 * tol, x, w, depth + 1)?;
    Ok(&l + &r)
}

/// Adaptive quadrature of `f` over [lo, hi] to tolerance `tol`, seeded with
/// the Gauss-Legendre rule (`x`, `w`) given on [0, 1].
pub fn adq1<Q, F>(
    lo: f64,
    hi: f64,
    f: &F,
    tol: f64,
    x: &[f64],
    w: &[f64],
) -> Result<Array1<Q>, QuadratureError>
where
    Q: ConvScalar,
    F: Fn(f64) -> Array1<Q>,
{
    let whole = fixed_rule(lo, hi, f, x, w);
    split(lo, hi, &whole, f, tol, x, w, 0)
}
