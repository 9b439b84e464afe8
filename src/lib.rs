//! # mwconv: multiresolution convolution operators in one dimension
//!
//! Given a translation-invariant kernel K on the line, this crate
//! precomputes and caches the action of K on multiwavelet (Legendre scaling
//! function) bases at every scale and translation, in the *nonstandard
//! form* used by adaptive multiresolution solvers: for each level n and
//! translation l it produces the 2k x 2k block coupling the scaling and
//! wavelet spaces of the two boxes, together with thin SVD factors and the
//! norms an application loop screens against.
//!
//! Three kernels are provided: a closed-form Gaussian
//! ([`GaussianKernel1D`]), an adaptive-quadrature wrapper over an arbitrary
//! functor ([`GenericKernel1D`]), and a periodised Gaussian image sum
//! ([`PeriodicKernel1D`]). All three plug into the same engine,
//! [`Convolution1D`], which owns the two-scale filters, the
//! autocorrelation projector, and the per-key caches.
//!
//! Operations are logically pure functions of their (level, translation)
//! key; results are cached behind shared handles and never mutated.

pub mod adquad;
pub mod autocorr;
pub mod block;
pub mod cache;
pub mod gauss;
pub mod gaussian;
pub mod generic;
pub mod legendre;
pub mod numeric;
pub mod operator;
pub mod periodic;
pub mod svd;
pub mod transform;
pub mod twoscale;

// Re-export commonly used types and entry points
pub use block::{BlockApprox, EMPTY_BLOCK_FROBENIUS_THRESHOLD};
pub use cache::SimpleCache;
pub use gaussian::GaussianKernel1D;
pub use generic::GenericKernel1D;
pub use numeric::{normf, ConvScalar};
pub use operator::{
    Convolution1D, ConvolutionKernel, Level, Translation, DEFAULT_NATURAL_LEVEL, MAX_ORDER,
};
pub use periodic::PeriodicKernel1D;

// Re-export external dependencies for convenience
pub use ndarray::{Array1, Array2};
pub use num_complex::Complex64;
