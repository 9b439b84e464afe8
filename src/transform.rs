//! Dense block manipulation primitives
//!
//! Small matrix helpers used by the nonstandard-form assembly. Sources and
//! destinations are always disjoint buffers, expressed as separate input and
//! output slices so the inner row loops can vectorize.

use ndarray::{Array1, Array2};

use crate::numeric::ConvScalar;

/// Transpose `a` (n x m, row-major) into `b` (m x n, row-major).
///
/// Blocks by four rows when possible; falls back to a straight copy when
/// either dimension is 1 (the result layout is then identical).
pub fn fast_transpose<T: Copy>(n: usize, m: usize, a: &[T], b: &mut [T]) {
    debug_assert!(a.len() >= n * m && b.len() >= n * m);
    if n == 1 || m == 1 {
        b[..n * m].copy_from_slice(&a[..n * m]);
        return;
    }

    let n4 = (n >> 2) << 2;
    let mut i = 0;
    while i < n4 {
        let a0 = &a[i * m..(i + 1) * m];
        let a1 = &a[(i + 1) * m..(i + 2) * m];
        let a2 = &a[(i + 2) * m..(i + 3) * m];
        let a3 = &a[(i + 3) * m..(i + 4) * m];
        for j in 0..m {
            let bi = j * n + i;
            b[bi] = a0[j];
            b[bi + 1] = a1[j];
            b[bi + 2] = a2[j];
            b[bi + 3] = a3[j];
        }
        i += 4;
    }
    for i in n4..n {
        for j in 0..m {
            b[j * n + i] = a[i * m + j];
        }
    }
}

/// Copy an `nrow` x `ncol` patch between buffers with distinct leading
/// dimensions. `out` may point into the middle of a larger matrix.
pub fn copy_2d_patch<T: Copy>(
    out: &mut [T],
    ldout: usize,
    inp: &[T],
    ldin: usize,
    nrow: usize,
    ncol: usize,
) {
    for i in 0..nrow {
        let o = i * ldout;
        let s = i * ldin;
        out[o..o + ncol].copy_from_slice(&inp[s..s + ncol]);
    }
}

/// Keep the leading `r` columns of an n x m source in a dense n x r
/// destination.
pub fn shrink<T: Copy>(n: usize, m: usize, r: usize, a: &[T], b: &mut [T]) {
    for i in 0..n {
        b[i * r..(i + 1) * r].copy_from_slice(&a[i * m..i * m + r]);
    }
}

/// Elementwise `a[i] += b[i]`.
pub fn aligned_add<Q: ConvScalar>(a: &mut [Q], b: &[Q]) {
    assert_eq!(a.len(), b.len());
    for (ai, bi) in a.iter_mut().zip(b.iter()) {
        *ai = *ai + *bi;
    }
}

/// Elementwise `a[i] -= b[i]`.
pub fn aligned_sub<Q: ConvScalar>(a: &mut [Q], b: &[Q]) {
    assert_eq!(a.len(), b.len());
    for (ai, bi) in a.iter_mut().zip(b.iter()) {
        *ai = *ai - *bi;
    }
}

/// Two-sided filter application `F^T * M * F` against a stored
/// pre-transposed filter.
pub fn transform<Q: ConvScalar>(m: &Array2<Q>, f: &Array2<Q>) -> Array2<Q> {
    f.t().dot(m).dot(f)
}

/// One-sided filter application `F^T * v`.
pub fn transform_vec<Q: ConvScalar>(v: &Array1<Q>, f: &Array2<Q>) -> Array1<Q> {
    f.t().dot(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_transpose(n: usize, m: usize, a: &[f64]) -> Vec<f64> {
        let mut b = vec![0.0; n * m];
        for i in 0..n {
            for j in 0..m {
                b[j * n + i] = a[i * m + j];
            }
        }
        b
    }

    #[test]
    fn test_fast_transpose_shapes() {
        for &(n, m) in &[(1, 7), (7, 1), (4, 4), (5, 3), (6, 9), (9, 2)] {
            let a: Vec<f64> = (0..n * m).map(|v| v as f64).collect();
            let mut b = vec![0.0; n * m];
            fast_transpose(n, m, &a, &mut b);
            assert_eq!(b, naive_transpose(n, m, &a), "n={} m={}", n, m);
        }
    }

    #[test]
    fn test_copy_2d_patch_into_quadrant() {
        // Place a 2x2 block into the lower-right quadrant of a 4x4 matrix.
        let src = [1.0, 2.0, 3.0, 4.0];
        let mut dst = [0.0; 16];
        copy_2d_patch(&mut dst[4 * 2 + 2..], 4, &src, 2, 2, 2);
        let expected = [
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 2.0, //
            0.0, 0.0, 3.0, 4.0,
        ];
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_shrink() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // 2x3
        let mut b = [0.0; 4];
        shrink(2, 3, 2, &a, &mut b);
        assert_eq!(b, [1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_aligned_add_sub() {
        let mut a = [1.0, 2.0];
        aligned_add(&mut a, &[10.0, 20.0]);
        assert_eq!(a, [11.0, 22.0]);
        aligned_sub(&mut a, &[1.0, 2.0]);
        assert_eq!(a, [10.0, 20.0]);
    }

    #[test]
    fn test_transform_is_two_sided_product() {
        let m = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let f = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        // Exchange matrix flips both indices.
        let r = transform(&m, &f);
        assert_eq!(r, Array2::from_shape_vec((2, 2), vec![4.0, 3.0, 2.0, 1.0]).unwrap());
    }

    #[test]
    fn test_transform_vec() {
        let v = Array1::from(vec![1.0, 2.0]);
        let f = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 1.0, 1.0]).unwrap();
        // f^T v = [1+2, 2]
        assert_eq!(transform_vec(&v, &f), Array1::from(vec![3.0, 2.0]));
    }
}
